//! Error types for query parameter schemas.
//!
//! There are two families of errors here and they must not be mixed up:
//!
//! - [`ValidationErrors`] / [`QueryRejection`]: raw request input failed one or more field
//!   constraints. This is a client error and ends up as a `422 Unprocessable Entity` response.
//! - [`SchemaError`]: the schema itself is malformed. This is a programmer error raised when a
//!   dependency is derived, and it never reaches a client as a `422`.

use crate::dependency::ParamLocation;
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// The reason a single field failed validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("field required")]
    Missing,

    #[error("value is not a valid integer")]
    Integer,

    #[error("value is not a valid float")]
    Float,

    #[error("value could not be parsed to a boolean")]
    Bool,

    #[error("ensure this value is greater than or equal to {limit}")]
    NotGe { limit: f64 },

    #[error("ensure this value is greater than {limit}")]
    NotGt { limit: f64 },

    #[error("ensure this value is less than or equal to {limit}")]
    NotLe { limit: f64 },

    #[error("ensure this value is less than {limit}")]
    NotLt { limit: f64 },

    #[error("ensure this value has at least {limit} characters")]
    MinLength { limit: usize },

    #[error("ensure this value has at most {limit} characters")]
    MaxLength { limit: usize },

    #[error("malformed query string: {reason}")]
    Malformed { reason: String },
}

impl ErrorKind {
    /// The machine readable `type` of this failure, as reported in [`ErrorEntry`].
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Missing => "value_error.missing",
            ErrorKind::Integer => "type_error.integer",
            ErrorKind::Float => "type_error.float",
            ErrorKind::Bool => "type_error.bool",
            ErrorKind::NotGe { .. } => "value_error.number.not_ge",
            ErrorKind::NotGt { .. } => "value_error.number.not_gt",
            ErrorKind::NotLe { .. } => "value_error.number.not_le",
            ErrorKind::NotLt { .. } => "value_error.number.not_lt",
            ErrorKind::MinLength { .. } => "value_error.any_str.min_length",
            ErrorKind::MaxLength { .. } => "value_error.any_str.max_length",
            ErrorKind::Malformed { .. } => "value_error.query",
        }
    }

    fn ctx(&self) -> Option<Map<String, Value>> {
        let limit = match self {
            ErrorKind::NotGe { limit } | ErrorKind::NotGt { limit } | ErrorKind::NotLe { limit } | ErrorKind::NotLt { limit } => {
                serde_json::Number::from_f64(*limit).map_or(Value::Null, Value::Number)
            }
            ErrorKind::MinLength { limit } | ErrorKind::MaxLength { limit } => Value::from(*limit),
            _ => return None,
        };

        let mut ctx = Map::new();
        ctx.insert("limit_value".into(), limit);
        Some(ctx)
    }
}

/// One record of a validation error report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    loc: Vec<String>,
    msg: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ctx: Option<Map<String, Value>>,
}

impl ErrorEntry {
    /// Creates an entry for the field called `field`.
    pub fn new(field: impl Into<String>, kind: &ErrorKind) -> Self {
        Self { loc: vec![field.into()], msg: kind.to_string(), kind: kind.code().to_owned(), ctx: kind.ctx() }
    }

    /// Creates an entry that is not tied to a single field.
    pub fn whole(kind: &ErrorKind) -> Self {
        Self { loc: Vec::new(), msg: kind.to_string(), kind: kind.code().to_owned(), ctx: kind.ctx() }
    }

    /// The location path of the failing value, e.g. `["query", "limit"]`.
    pub fn loc(&self) -> &[String] {
        &self.loc
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// The failure type, e.g. `value_error.number.not_le`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn ctx(&self) -> Option<&Map<String, Value>> {
        self.ctx.as_ref()
    }

    fn prefix(&mut self, segment: &str) {
        self.loc.insert(0, segment.to_owned());
    }
}

/// An ordered report of every field that failed validation.
#[derive(Error, Debug, Clone, Default, PartialEq, Serialize)]
#[error("{}", report(.entries))]
#[serde(transparent)]
pub struct ValidationErrors {
    entries: Vec<ErrorEntry>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ErrorEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ErrorEntry> {
        self.entries
    }

    /// Prepends `segment` to the location path of every entry.
    #[must_use]
    pub fn prefixed(mut self, segment: &str) -> Self {
        for entry in &mut self.entries {
            entry.prefix(segment);
        }
        self
    }
}

impl Extend<ErrorEntry> for ValidationErrors {
    fn extend<T: IntoIterator<Item = ErrorEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ErrorEntry;
    type IntoIter = std::vec::IntoIter<ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

fn report(entries: &[ErrorEntry]) -> String {
    let count = entries.len();
    let mut report = format!("{count} validation error{}", if count == 1 { "" } else { "s" });
    for entry in entries {
        report.push_str(&format!("\n{}\n  {} (type={})", entry.loc.join(" -> "), entry.msg, entry.kind));
    }
    report
}

/// A client facing rejection of query input: status `422` plus the query prefixed report.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{status}: {detail}")]
pub struct QueryRejection {
    #[serde(skip)]
    status: StatusCode,
    detail: ValidationErrors,
}

impl QueryRejection {
    /// Wraps the report of a failed construction, prefixing every location with `"query"`.
    pub fn from_validation(errors: ValidationErrors) -> Self {
        Self { status: StatusCode::UNPROCESSABLE_ENTITY, detail: errors.prefixed(ParamLocation::Query.as_str()) }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &ValidationErrors {
        &self.detail
    }

    /// The JSON body of the rejection: `{"detail": [...]}`.
    pub fn to_json(&self) -> Value {
        serde_json::json!({ "detail": self.detail })
    }
}

/// A malformed schema definition, detected when a dependency is derived.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema `{schema}`: field `{field}` is not a valid query parameter name")]
    InvalidName { schema: String, field: String },

    #[error("schema `{schema}`: field `{field}` is declared more than once")]
    DuplicateField { schema: String, field: String },

    #[error("schema `{schema}`: field `{field}` has no resolvable type")]
    MissingType { schema: String, field: String },
}

impl SchemaError {
    pub fn invalid_name<S: ToString, F: ToString>(schema: S, field: F) -> Self {
        Self::InvalidName { schema: schema.to_string(), field: field.to_string() }
    }

    pub fn duplicate_field<S: ToString, F: ToString>(schema: S, field: F) -> Self {
        Self::DuplicateField { schema: schema.to_string(), field: field.to_string() }
    }

    pub fn missing_type<S: ToString, F: ToString>(schema: S, field: F) -> Self {
        Self::MissingType { schema: schema.to_string(), field: field.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_from_kind() {
        let entry = ErrorEntry::new("limit", &ErrorKind::NotLe { limit: 1000.0 });

        assert_eq!(entry.loc(), ["limit"]);
        assert_eq!(entry.msg(), "ensure this value is less than or equal to 1000");
        assert_eq!(entry.kind(), "value_error.number.not_le");
        assert_eq!(entry.ctx().and_then(|ctx| ctx.get("limit_value")), Some(&serde_json::json!(1000.0)));
    }

    #[test]
    fn test_missing_has_no_ctx() {
        let entry = ErrorEntry::new("since", &ErrorKind::Missing);
        assert_eq!(entry.kind(), "value_error.missing");
        assert!(entry.ctx().is_none());
    }

    #[test]
    fn test_prefixed_keeps_order() {
        let mut errors = ValidationErrors::new();
        errors.push(ErrorEntry::new("a", &ErrorKind::Integer));
        errors.push(ErrorEntry::new("b", &ErrorKind::Bool));

        let errors = errors.prefixed("query");
        let locs: Vec<_> = errors.entries().iter().map(ErrorEntry::loc).collect();
        assert_eq!(locs, [["query", "a"], ["query", "b"]]);
    }

    #[test]
    fn test_rejection_json() {
        let mut errors = ValidationErrors::new();
        errors.push(ErrorEntry::new("flag", &ErrorKind::Bool));

        let rejection = QueryRejection::from_validation(errors);
        assert_eq!(rejection.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            rejection.to_json(),
            serde_json::json!({
                "detail": [{
                    "loc": ["query", "flag"],
                    "msg": "value could not be parsed to a boolean",
                    "type": "type_error.bool",
                }]
            })
        );
    }

    #[test]
    fn test_display() {
        let mut errors = ValidationErrors::new();
        errors.push(ErrorEntry::new("page", &ErrorKind::Integer));

        assert_eq!(errors.to_string(), "1 validation error\npage\n  value is not a valid integer (type=type_error.integer)");

        errors.push(ErrorEntry::new("size", &ErrorKind::Missing));
        let errors = errors.prefixed("query");
        let source: &dyn std::error::Error = &errors;
        assert!(source.to_string().starts_with("2 validation errors\nquery -> page\n"));
        assert!(source.to_string().ends_with("query -> size\n  field required (type=value_error.missing)"));
    }
}
