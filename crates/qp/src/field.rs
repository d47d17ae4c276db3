//! Field descriptors: the per-field metadata a schema declares.

use crate::constraint::Constraint;
use crate::value::{QueryValue, ValueKind};
use std::fmt;

/// The declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamType {
    type_name: &'static str,
    kind: ValueKind,
    optional: bool,
}

impl ParamType {
    pub const fn new(type_name: &'static str, kind: ValueKind, optional: bool) -> Self {
        Self { type_name, kind, optional }
    }

    /// The type of a field declared as `T`.
    pub fn of<T: QueryValue>() -> Self {
        Self::new(std::any::type_name::<T>(), T::KIND, T::OPTIONAL)
    }

    /// The Rust type name, e.g. `core::option::Option<alloc::string::String>`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// What a field resolves to when it is absent from the query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefaultValue {
    /// No default, the field must be supplied.
    Required,
    /// An optional field that stays empty.
    Absent,
    /// A concrete default, in its query string form.
    Value(String),
}

impl DefaultValue {
    /// The default for a field whose default value is `value`.
    pub fn of<T: QueryValue>(value: &T) -> Self {
        value.to_raw().map_or(DefaultValue::Absent, DefaultValue::Value)
    }

    /// The default of a field of type `T` declared without an explicit default.
    pub fn implicit<T: QueryValue>() -> Self {
        if T::OPTIONAL { DefaultValue::Absent } else { DefaultValue::Required }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Required => write!(f, "required"),
            DefaultValue::Absent => write!(f, "none"),
            DefaultValue::Value(value) => write!(f, "{value}"),
        }
    }
}

/// One field of a parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: &'static str,
    ty: ParamType,
    default: DefaultValue,
    description: Option<&'static str>,
    constraints: Vec<Constraint>,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, ty: ParamType, default: DefaultValue) -> Self {
        Self { name, ty, default, description: None, constraints: Vec::new() }
    }

    /// A descriptor for a field of type `T` with the default it would get if none is declared.
    pub fn of<T: QueryValue>(name: &'static str) -> Self {
        Self::new(name, ParamType::of::<T>(), DefaultValue::implicit::<T>())
    }

    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    pub fn default(&self) -> &DefaultValue {
        &self.default
    }

    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_required(&self) -> bool {
        self.default == DefaultValue::Required
    }
}

/// Returns true if `name` can be used as a query parameter name.
///
/// Names must start with an ascii letter or `_`; the rest may also contain digits, `-` and `.`.
/// Anything that would need escaping in a query string is rejected.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
