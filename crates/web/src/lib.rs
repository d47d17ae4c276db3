//! Request extraction for [`micro_qp`] query parameter schemas.
//!
//! The [`Query`](extract::Query) extractor turns the query string of a request into a validated
//! schema instance, and [`Responder`] turns a rejected query into a `422` JSON response:
//!
//! ```
//! # use http::{Request, StatusCode};
//! # use micro_qp::query_params;
//! # use micro_qp_web::extract::{FromRequest, Query};
//! # use micro_qp_web::{RequestContext, Responder};
//! #[query_params]
//! #[derive(Debug)]
//! struct Pagination {
//!     #[param(default = 100, ge = 0, le = 1000)]
//!     limit: u32,
//! }
//!
//! # tokio_test_block_on(async {
//! let (parts, ()) = Request::get("/items?limit=1001").body(()).unwrap().into_parts();
//! let req = RequestContext::new(&parts);
//!
//! let rejection = Query::<Pagination>::from_request(&req).await.unwrap_err();
//! assert_eq!(rejection.response_to(&req).status(), StatusCode::UNPROCESSABLE_ENTITY);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod cache;
mod request;
mod responder;

pub mod extract;

pub use cache::DependencyCache;
pub use request::RequestContext;
pub use responder::Responder;
