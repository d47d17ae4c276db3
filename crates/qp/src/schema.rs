//! Parameter schemas: the [`QueryParams`] trait and checked, composable descriptor lists.

use crate::args::QueryArgs;
use crate::dependency::{Dependency, derive_dependency};
use crate::error::{SchemaError, ValidationErrors};
use crate::field::{FieldDescriptor, is_valid_name};
use crate::url::{UrlEncoding, to_url_with};
use std::collections::HashSet;

/// A typed set of HTTP query parameters.
///
/// Usually implemented with the [`query_params`](crate::query_params) attribute:
///
/// ```
/// use micro_qp::{query_params, QueryParams};
///
/// #[query_params]
/// #[derive(Debug)]
/// pub struct Sample {
///     /// A date in the format YYYY-MM-DD
///     pub since: Option<String>,
///     #[param(default = 20, ge = 0, le = 1000)]
///     pub limit: u32,
/// }
///
/// let sample = Sample::from_pairs([("since", "2021-01-01")]).unwrap();
/// assert_eq!(sample.since.as_deref(), Some("2021-01-01"));
/// assert_eq!(sample.limit, 20);
/// assert_eq!(sample.to_url().as_deref(), Some("?since=2021-01-01"));
/// ```
pub trait QueryParams: Sized {
    /// The schema's name, used in diagnostics and as the stem of the derived dependency's name.
    const NAME: &'static str;

    /// The schema's parameter names, composed schemas nested where they are declared.
    ///
    /// Known at compile time, so the attribute can reject a schema whose composed parameters
    /// repeat a name before it is ever used.
    const FIELD_NAMES: &'static [FieldName];

    /// The schema's fields, in declaration order. Composed schemas are inlined depth-first.
    fn fields() -> Vec<FieldDescriptor>;

    /// The validating constructor.
    ///
    /// Every field is checked; on failure the error lists all failing fields, each located by its
    /// bare field name.
    fn construct(args: &QueryArgs) -> Result<Self, ValidationErrors>;

    /// `(name, value)` for every field explicitly supplied at construction, in field order.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    /// Builds the schema from raw `(name, value)` pairs, see [`QueryParams::construct`].
    fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationErrors>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::construct(&QueryArgs::from_pairs(pairs))
    }

    /// Derives the request dependency for this schema, see [`derive_dependency`].
    fn dependency() -> Result<Dependency<Self>, SchemaError> {
        derive_dependency::<Self>()
    }

    /// Encodes the explicitly supplied fields as `?a=b&c=d`, or `None` if there are none.
    ///
    /// Values are written as-is, without percent-encoding. Use [`QueryParams::to_url_with`] with
    /// [`UrlEncoding::Percent`] if values may contain reserved characters.
    fn to_url(&self) -> Option<String> {
        to_url_with(self, UrlEncoding::Raw)
    }

    fn to_url_with(&self, encoding: UrlEncoding) -> Option<String> {
        to_url_with(self, encoding)
    }
}

/// One entry of [`QueryParams::FIELD_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldName {
    /// A parameter declared by the schema itself.
    Param(&'static str),
    /// The names of a composed schema, in its own order.
    Flatten(&'static [FieldName]),
}

impl FieldName {
    /// Number of parameters in `names`, composed schemas included.
    pub const fn count(names: &[FieldName]) -> usize {
        let mut count = 0;
        let mut i = 0;
        while i < names.len() {
            count += match names[i] {
                FieldName::Param(_) => 1,
                FieldName::Flatten(nested) => Self::count(nested),
            };
            i += 1;
        }
        count
    }

    /// The `n`th parameter name of `names` in depth-first order.
    pub const fn nth(names: &[FieldName], mut n: usize) -> Option<&'static str> {
        let mut i = 0;
        while i < names.len() {
            match names[i] {
                FieldName::Param(name) => {
                    if n == 0 {
                        return Some(name);
                    }
                    n -= 1;
                }
                FieldName::Flatten(nested) => {
                    let len = Self::count(nested);
                    if n < len {
                        return Self::nth(nested, n);
                    }
                    n -= len;
                }
            }
            i += 1;
        }
        None
    }

    /// The first name in `names` that repeats an earlier one, in depth-first order.
    ///
    /// Agrees with the field [`Schema::new`] reports as [`SchemaError::DuplicateField`].
    pub const fn duplicate(names: &[FieldName]) -> Option<&'static str> {
        let len = Self::count(names);
        let mut later = 1;
        while later < len {
            let mut earlier = 0;
            while earlier < later {
                if let (Some(a), Some(b)) = (Self::nth(names, earlier), Self::nth(names, later))
                    && same_name(a, b)
                {
                    return Some(b);
                }
                earlier += 1;
            }
            later += 1;
        }
        None
    }
}

const fn same_name(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Records which of a schema instance's fields were explicitly supplied.
///
/// Indexes are the positions of the schema's own fields; a composed schema's fields are tracked by
/// the component instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldsSet(u64);

impl FieldsSet {
    pub const MAX_FIELDS: usize = 64;

    pub const fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, index: usize) {
        if let Some(bit) = Self::bit(index) {
            self.0 |= bit;
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        Self::bit(index).is_some_and(|bit| self.0 & bit != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    fn bit(index: usize) -> Option<u64> {
        u32::try_from(index).ok().and_then(|shift| 1_u64.checked_shl(shift))
    }
}

/// A checked, ordered list of field descriptors.
///
/// Building a `Schema` verifies that every name is a usable query parameter name, that every field
/// has a type, and that no name occurs twice.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut seen = HashSet::with_capacity(fields.len());

        for field in &fields {
            if !is_valid_name(field.name()) {
                return Err(SchemaError::invalid_name(&name, field.name()));
            }
            if field.ty().type_name().is_empty() {
                return Err(SchemaError::missing_type(&name, field.name()));
            }
            if !seen.insert(field.name()) {
                return Err(SchemaError::duplicate_field(&name, field.name()));
            }
        }

        Ok(Self { name, fields })
    }

    /// The checked schema of `S`.
    pub fn of<S: QueryParams>() -> Result<Self, SchemaError> {
        Self::new(S::NAME, S::fields())
    }

    /// Concatenates `parts` in the given order into one schema called `name`.
    ///
    /// Fails with [`SchemaError::DuplicateField`] if two parts declare the same field.
    pub fn combine(name: impl Into<String>, parts: impl IntoIterator<Item = Schema>) -> Result<Self, SchemaError> {
        let fields = parts.into_iter().flat_map(|part| part.fields).collect();
        Self::new(name, fields)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<FieldDescriptor> {
        self.fields
    }
}
