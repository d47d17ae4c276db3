//! Derivation of a request dependency from a parameter schema.
//!
//! A request framework extracts the arguments of a dependency by looking at its declared
//! parameters. [`derive_dependency`] projects a schema's field descriptors onto such a parameter
//! list, one [`Parameter`] per field with the same name, type, default and description, and pairs
//! it with a body that builds the schema through its validating constructor.
//!
//! # Example
//! ```
//! use micro_qp::{query_params, QueryParams};
//!
//! #[query_params]
//! struct Sample {
//!     since: Option<String>,
//! }
//!
//! let dependency = Sample::dependency().unwrap();
//! assert_eq!(dependency.name(), "SampleQP");
//!
//! let sample = dependency.extract(Some("since=1")).unwrap();
//! assert_eq!(sample.since.as_deref(), Some("1"));
//! ```

use crate::args::QueryArgs;
use crate::constraint::Constraint;
use crate::error::{ErrorEntry, ErrorKind, QueryRejection, SchemaError, ValidationErrors};
use crate::field::{DefaultValue, FieldDescriptor, ParamType};
use crate::schema::{QueryParams, Schema};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Where an extracted parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Query,
}

impl ParamLocation {
    /// The first segment of the location path of an error raised for this parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Query => "query",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared parameter of a derived dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: &'static str,
    ty: ParamType,
    default: DefaultValue,
    description: Option<&'static str>,
    constraints: Vec<Constraint>,
    location: ParamLocation,
}

impl Parameter {
    /// The query parameter name, after any rename.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type the raw value is decoded into.
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    /// The value used when the parameter is absent from the query string.
    pub fn default(&self) -> &DefaultValue {
        &self.default
    }

    /// Help text taken from the field's attribute or doc comment.
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    /// Checks applied to a supplied value, in declaration order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Where the parameter is read from; always the query string.
    pub fn location(&self) -> ParamLocation {
        self.location
    }

    /// Whether leaving the parameter out is a validation error.
    pub fn is_required(&self) -> bool {
        self.default == DefaultValue::Required
    }
}

impl From<FieldDescriptor> for Parameter {
    fn from(field: FieldDescriptor) -> Self {
        Self {
            name: field.name(),
            ty: *field.ty(),
            default: field.default().clone(),
            description: field.description(),
            constraints: field.constraints().to_vec(),
            location: ParamLocation::Query,
        }
    }
}

/// The request dependency of the schema `S`.
///
/// Its [`parameters`](Dependency::parameters) mirror the schema's fields one to one; calling it
/// builds an `S` or fails with a `422` [`QueryRejection`].
pub struct Dependency<S> {
    name: String,
    parameters: Vec<Parameter>,
    _schema: PhantomData<fn() -> S>,
}

/// Derives the request dependency of `S` from its current field descriptors.
///
/// Nothing is cached: every call inspects the schema again and returns an equivalent dependency.
/// A malformed schema is reported as a [`SchemaError`] naming the schema and field at fault.
pub fn derive_dependency<S: QueryParams>() -> Result<Dependency<S>, SchemaError> {
    let schema = Schema::of::<S>()?;
    let name = format!("{}QP", schema.name());
    let parameters: Vec<Parameter> = schema.into_fields().into_iter().map(Parameter::from).collect();

    debug!(dependency = %name, parameters = parameters.len(), "derived query dependency");
    Ok(Dependency { name, parameters, _schema: PhantomData })
}

impl<S: QueryParams> Dependency<S> {
    /// The schema's name with a `QP` suffix. Informational only.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One parameter per schema field, in field order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The parameter called `name`, if the schema declares one.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Picks the arguments of the declared parameters out of `query`.
    ///
    /// Each parameter takes the last value supplied for its name; undeclared names are dropped.
    pub fn bind(&self, query: &QueryArgs) -> QueryArgs {
        let mut bound = QueryArgs::new();
        for parameter in &self.parameters {
            if let Some(value) = query.get(parameter.name) {
                trace!(parameter = parameter.name, len = value.len(), "bound query parameter");
                bound.push(parameter.name, value);
            }
        }
        bound
    }

    /// Builds an `S` from `args` with its validating constructor.
    ///
    /// A validation failure becomes a `422` rejection whose entries are located under `"query"`.
    pub fn call(&self, args: &QueryArgs) -> Result<S, QueryRejection> {
        S::construct(args).map_err(|errors| {
            debug!(dependency = %self.name, errors = errors.len(), "query validation failed");
            QueryRejection::from_validation(errors)
        })
    }

    /// Decodes a raw query string (without the `?`), binds it and calls the dependency.
    pub fn extract(&self, query: Option<&str>) -> Result<S, QueryRejection> {
        let args = match query {
            Some(query) => QueryArgs::parse(query).map_err(|e| {
                let mut errors = ValidationErrors::new();
                errors.push(ErrorEntry::whole(&ErrorKind::Malformed { reason: e.to_string() }));
                QueryRejection::from_validation(errors)
            })?,
            None => QueryArgs::new(),
        };

        self.call(&self.bind(&args))
    }
}

impl<S> Clone for Dependency<S> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), parameters: self.parameters.clone(), _schema: PhantomData }
    }
}

impl<S> fmt::Debug for Dependency<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency").field("name", &self.name).field("parameters", &self.parameters).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldName;
    use crate::value::{QueryValue, ValueKind};
    use http::StatusCode;

    // hand written schema: `page` is required, `size` defaults to 20 and is at most 100
    #[derive(Debug, PartialEq)]
    struct Page {
        page: u32,
        size: u32,
    }

    impl QueryParams for Page {
        const NAME: &'static str = "Page";
        const FIELD_NAMES: &'static [FieldName] = &[FieldName::Param("page"), FieldName::Param("size")];

        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<u32>("page").with_description("page number"),
                FieldDescriptor::of::<u32>("size")
                    .with_default(DefaultValue::of(&20_u32))
                    .with_constraint(Constraint::Le(100.0)),
            ]
        }

        fn construct(args: &QueryArgs) -> Result<Self, ValidationErrors> {
            let mut errors = ValidationErrors::new();
            let page = match args.get("page").map(<u32 as QueryValue>::from_raw) {
                Some(Ok(page)) => Some(page),
                Some(Err(kind)) => {
                    errors.push(ErrorEntry::new("page", &kind));
                    None
                }
                None => {
                    errors.push(ErrorEntry::new("page", &ErrorKind::Missing));
                    None
                }
            };
            let size = match args.get("size").map(<u32 as QueryValue>::from_raw) {
                Some(Ok(size)) if size > 100 => {
                    errors.push(ErrorEntry::new("size", &ErrorKind::NotLe { limit: 100.0 }));
                    None
                }
                Some(Ok(size)) => Some(size),
                Some(Err(kind)) => {
                    errors.push(ErrorEntry::new("size", &kind));
                    None
                }
                None => Some(20),
            };

            match (page, size) {
                (Some(page), Some(size)) if errors.is_empty() => Ok(Self { page, size }),
                _ => Err(errors),
            }
        }

        fn query_pairs(&self) -> Vec<(&'static str, String)> {
            vec![("page", self.page.to_string()), ("size", self.size.to_string())]
        }
    }

    #[test]
    fn test_parameters_mirror_fields() {
        let dependency = derive_dependency::<Page>().unwrap();
        let fields = Page::fields();

        assert_eq!(dependency.name(), "PageQP");
        assert_eq!(dependency.parameters().len(), fields.len());
        for (parameter, field) in dependency.parameters().iter().zip(&fields) {
            assert_eq!(parameter.name(), field.name());
            assert_eq!(parameter.ty(), field.ty());
            assert_eq!(parameter.default(), field.default());
            assert_eq!(parameter.description(), field.description());
            assert_eq!(parameter.constraints(), field.constraints());
            assert_eq!(parameter.location(), ParamLocation::Query);
        }

        let page = dependency.parameter("page").unwrap();
        assert!(page.is_required());
        assert_eq!(page.ty().kind(), ValueKind::Integer);
        assert!(!dependency.parameter("size").unwrap().is_required());
    }

    #[test]
    fn test_call_delegates_to_constructor() {
        let dependency = derive_dependency::<Page>().unwrap();
        let args = QueryArgs::from_pairs([("page", "3"), ("size", "50")]);

        assert_eq!(dependency.call(&args), Ok(Page::construct(&args).unwrap()));
        assert_eq!(dependency.call(&args), Ok(Page { page: 3, size: 50 }));
    }

    #[test]
    fn test_call_prefixes_errors_with_query() {
        let dependency = derive_dependency::<Page>().unwrap();
        let rejection = dependency.call(&QueryArgs::from_pairs([("size", "101")])).unwrap_err();

        assert_eq!(rejection.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let locs: Vec<_> = rejection.detail().entries().iter().map(ErrorEntry::loc).collect();
        assert_eq!(locs, [["query", "page"], ["query", "size"]]);
    }

    #[test]
    fn test_bind_does_not_log_values() {
        let dependency = derive_dependency::<Page>().unwrap();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(CapturedLog::default)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            dependency.bind(&QueryArgs::from_pairs([("page", "secret-token")]));
        });

        let log = CapturedLog::contents();
        assert!(log.contains("bound query parameter"), "{log}");
        assert!(log.contains("len=12"), "{log}");
        assert!(!log.contains("secret-token"), "{log}");
    }

    #[test]
    fn test_bind_drops_undeclared_and_keeps_last() {
        let dependency = derive_dependency::<Page>().unwrap();
        let query = QueryArgs::parse("page=1&utm_source=mail&page=2").unwrap();

        let bound = dependency.bind(&query);
        assert_eq!(bound.iter().collect::<Vec<_>>(), [("page", "2")]);
    }

    #[test]
    fn test_extract() {
        let dependency = derive_dependency::<Page>().unwrap();

        assert_eq!(dependency.extract(Some("page=2")), Ok(Page { page: 2, size: 20 }));

        let rejection = dependency.extract(None).unwrap_err();
        assert_eq!(rejection.detail().len(), 1);
        assert_eq!(rejection.detail().entries()[0].kind(), "value_error.missing");
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let first = derive_dependency::<Page>().unwrap();
        let second = derive_dependency::<Page>().unwrap();
        let args = QueryArgs::from_pairs([("page", "x")]);

        assert_eq!(first.name(), second.name());
        assert_eq!(first.parameters(), second.parameters());
        assert_eq!(first.call(&args), second.call(&args));
    }

    thread_local! {
        static LOG: std::cell::RefCell<Vec<u8>> = const { std::cell::RefCell::new(Vec::new()) };
    }

    // collects formatted log lines of the current thread
    #[derive(Default)]
    struct CapturedLog;

    impl CapturedLog {
        fn contents() -> String {
            LOG.with(|log| String::from_utf8_lossy(&log.borrow()).into_owned())
        }
    }

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            LOG.with(|log| log.borrow_mut().extend_from_slice(buf));
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl QueryParams for Broken {
        const NAME: &'static str = "Broken";
        const FIELD_NAMES: &'static [FieldName] = &[FieldName::Param("limit"), FieldName::Param("limit")];

        fn fields() -> Vec<FieldDescriptor> {
            vec![FieldDescriptor::of::<u32>("limit"), FieldDescriptor::of::<u32>("limit")]
        }

        fn construct(_args: &QueryArgs) -> Result<Self, ValidationErrors> {
            Ok(Broken)
        }

        fn query_pairs(&self) -> Vec<(&'static str, String)> {
            Vec::new()
        }
    }

    #[test]
    fn test_malformed_schema_fails_derivation() {
        assert_eq!(FieldName::duplicate(Broken::FIELD_NAMES), Some("limit"));

        let error = derive_dependency::<Broken>().unwrap_err();
        assert_eq!(error, SchemaError::duplicate_field("Broken", "limit"));
        assert_eq!(error.to_string(), "schema `Broken`: field `limit` is declared more than once");
    }
}
