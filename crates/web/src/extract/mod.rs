mod extract_query;
mod from_request;

pub use extract_query::QueryError;
pub use from_request::FromRequest;

/// Represented as json data
///
/// Only used on the response side here: a handler or a rejection returns `Json(value)`
/// to answer with an `application/json` body.
///
/// # Example
/// ```
/// # use micro_qp_web::extract::Json;
/// # #[allow(dead_code, reason = "doc example")]
/// fn handle() -> Json<Vec<&'static str>> {
///     Json(vec!["a", "b"])
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

/// Represented as url query data, validated against a query parameter schema
///
/// when request with url query, we can using this struct to inject data,
/// note: the struct must impl [`micro_qp::QueryParams`] and [`Send`]
///
/// # Example
/// ```
/// # use bytes::Bytes;
/// # use http::Response;
/// # use micro_qp::query_params;
/// # use micro_qp_web::extract::{FromRequest, Query};
/// # use micro_qp_web::{RequestContext, Responder};
/// #[query_params]
/// #[derive(Debug)]
/// struct Params {
///     since: Option<String>,
///     #[param(default = 20, le = 100)]
///     limit: u32,
/// }
///
/// # #[allow(dead_code, reason = "doc example")]
/// async fn handle(req: &RequestContext<'_>) -> Response<Bytes> {
///     match Query::<Params>::from_request(req).await {
///         Ok(params) => format!("received params: {:?}", params).response_to(req),
///         Err(rejection) => rejection.response_to(req),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query<S>(pub S);
