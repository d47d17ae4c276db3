//! Typed HTTP query parameter schemas.
//!
//! Declare the query parameters of an endpoint once, as a struct, and get:
//!
//! - a request [`Dependency`] whose parameter list mirrors the struct's fields and which parses and
//!   validates a query string into the struct, rejecting bad input with a `422` report located
//!   under `["query", <field>]`;
//! - [`QueryParams::to_url`], which writes the explicitly supplied fields back as `?a=b&c=d`.
//!
//! ```
//! use micro_qp::{query_params, QueryParams};
//!
//! #[query_params]
//! #[derive(Debug, PartialEq)]
//! pub struct Sample {
//!     /// A date in the format YYYY-MM-DD
//!     pub since: Option<String>,
//!     /// A date in the format YYYY-MM-DD
//!     pub until: Option<String>,
//! }
//!
//! let dependency = Sample::dependency().unwrap();
//! let sample = dependency.extract(Some("since=1")).unwrap();
//! assert_eq!(sample.since.as_deref(), Some("1"));
//! assert_eq!(sample.until, None);
//! assert_eq!(sample.to_url().as_deref(), Some("?since=1"));
//! ```

// lets the attribute macro's `::micro_qp` paths resolve inside this crate's own tests
extern crate self as micro_qp;

mod args;
mod constraint;
mod dependency;
mod error;
mod field;
mod schema;
mod url;
mod value;

pub use args::QueryArgs;
pub use constraint::Constraint;
pub use dependency::{derive_dependency, Dependency, ParamLocation, Parameter};
pub use error::{ErrorEntry, ErrorKind, QueryRejection, SchemaError, ValidationErrors};
pub use field::{DefaultValue, FieldDescriptor, ParamType};
pub use micro_qp_derive::query_params;
pub use schema::{FieldName, FieldsSet, QueryParams, Schema};
pub use url::{to_url, to_url_with, UrlEncoding};
pub use value::{QueryValue, ValueKind};

/// Support code for the `query_params` attribute. Not public API.
#[doc(hidden)]
pub mod __private {
    use crate::{Constraint, ErrorEntry, ErrorKind, FieldsSet, QueryArgs, QueryParams, QueryValue, ValidationErrors};

    /// Decodes and checks the field `name`, recording it in `set` if it was supplied.
    ///
    /// `default` yields the value of an absent field, `None` if the field is required.
    pub fn field<T, D>(
        args: &QueryArgs,
        name: &'static str,
        index: usize,
        default: D,
        constraints: &[Constraint],
        set: &mut FieldsSet,
        errors: &mut ValidationErrors,
    ) -> Option<T>
    where
        T: QueryValue,
        D: FnOnce() -> Option<T>,
    {
        let Some(raw) = args.get(name) else {
            let value = default();
            if value.is_none() {
                errors.push(ErrorEntry::new(name, &ErrorKind::Missing));
            }
            return value;
        };

        set.insert(index);
        let checked = T::from_raw(raw).and_then(|value| match constraints.iter().find_map(|c| c.check(&value).err()) {
            Some(kind) => Err(kind),
            None => Ok(value),
        });

        match checked {
            Ok(value) => Some(value),
            Err(kind) => {
                errors.push(ErrorEntry::new(name, &kind));
                None
            }
        }
    }

    /// Builds a composed schema from the same arguments, merging its errors into `errors`.
    pub fn nested<S: QueryParams>(args: &QueryArgs, errors: &mut ValidationErrors) -> Option<S> {
        match S::construct(args) {
            Ok(value) => Some(value),
            Err(nested) => {
                errors.extend(nested);
                None
            }
        }
    }

    /// A numeric bound given in the attribute, as the `f64` a [`Constraint`] holds.
    pub trait Bound {
        fn into_bound(self) -> f64;
    }

    macro_rules! impl_bound {
        ($($ty:ty),*) => {
            $(
                impl Bound for $ty {
                    #[allow(
                        trivial_numeric_casts,
                        clippy::cast_lossless,
                        clippy::cast_precision_loss,
                        reason = "bounds are compared as f64 like every numeric query value"
                    )]
                    fn into_bound(self) -> f64 {
                        self as f64
                    }
                }
            )*
        };
    }

    impl_bound!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

    pub fn bound<N: Bound>(n: N) -> f64 {
        n.into_bound()
    }

}
