//! URL query string extraction functionality
//!
//! This module implements [`FromRequest`] for [`Query<S>`], where `S` is a query parameter schema.
//! The schema's dependency is derived once per type and kept in the [`DependencyCache`]; each
//! request is then parsed, bound to the dependency's parameters and validated.
//!
//! [`DependencyCache`]: crate::DependencyCache

use crate::cache::DependencyCache;
use crate::extract::{FromRequest, Query};
use crate::RequestContext;
use async_trait::async_trait;
use micro_qp::{QueryParams, QueryRejection, SchemaError};
use thiserror::Error;

/// The ways extracting a [`Query`] can fail.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The query string does not satisfy the schema, answered with `422`.
    #[error(transparent)]
    Rejected(#[from] QueryRejection),

    /// The schema itself is malformed, answered with `500`.
    #[error("query schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Implements query string extraction for any query parameter schema
#[async_trait]
impl<S> FromRequest for Query<S>
where
    S: QueryParams + Send + 'static,
{
    type Output<'r> = S;
    type Error = QueryError;

    async fn from_request<'r>(req: &'r RequestContext<'_>) -> Result<Self::Output<'r>, Self::Error> {
        let dependency = DependencyCache::global().get_or_derive::<S>()?;
        Ok(dependency.extract(req.query())?)
    }
}
