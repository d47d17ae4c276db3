//! Response handling module that converts results into HTTP responses.
//!
//! This module provides the [`Responder`] trait which defines how different types
//! can be converted into HTTP responses. Query rejections answer `422` with a JSON
//! `{"detail": [...]}` body; schema errors answer `500` and are logged, since they
//! are a bug in the application rather than bad input.

use crate::extract::{Json, QueryError};
use crate::RequestContext;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use micro_qp::QueryRejection;
use serde::Serialize;
use std::convert::Infallible;
use tracing::error;

const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// A trait for types that can be converted into HTTP responses.
pub trait Responder {
    fn response_to(self, req: &RequestContext) -> Response<Bytes>;
}

fn with_content_type(body: Bytes, content_type: &'static str) -> Response<Bytes> {
    let mut response = Response::new(body);
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// The Ok and Err variants must both implement Responder.
impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn response_to(self, req: &RequestContext) -> Response<Bytes> {
        match self {
            Ok(t) => t.response_to(req),
            Err(e) => e.response_to(req),
        }
    }
}

/// None case returns an empty response.
impl<T: Responder> Responder for Option<T> {
    fn response_to(self, req: &RequestContext) -> Response<Bytes> {
        match self {
            Some(t) => t.response_to(req),
            None => Response::new(Bytes::new()),
        }
    }
}

/// Implementation for (StatusCode, T) tuple allows setting a status code
/// along with the response content.
impl<T: Responder> Responder for (StatusCode, T) {
    fn response_to(self, req: &RequestContext) -> Response<Bytes> {
        let (status, responder) = self;
        let mut response = responder.response_to(req);
        *response.status_mut() = status;
        response
    }
}

impl<T: Responder> Responder for (T, StatusCode) {
    fn response_to(self, req: &RequestContext) -> Response<Bytes> {
        let (responder, status) = self;
        (status, responder).response_to(req)
    }
}

impl<T: Responder> Responder for Box<T> {
    fn response_to(self, req: &RequestContext) -> Response<Bytes> {
        (*self).response_to(req)
    }
}

impl Responder for () {
    fn response_to(self, _req: &RequestContext) -> Response<Bytes> {
        Response::new(Bytes::new())
    }
}

impl Responder for &'static str {
    fn response_to(self, _req: &RequestContext) -> Response<Bytes> {
        with_content_type(Bytes::from_static(self.as_bytes()), TEXT_PLAIN_UTF_8)
    }
}

impl Responder for String {
    fn response_to(self, _req: &RequestContext) -> Response<Bytes> {
        with_content_type(Bytes::from(self), TEXT_PLAIN_UTF_8)
    }
}

impl<T: Serialize> Responder for Json<T> {
    fn response_to(self, req: &RequestContext) -> Response<Bytes> {
        match serde_json::to_vec(&self.0) {
            Ok(body) => with_content_type(Bytes::from(body), APPLICATION_JSON),
            Err(e) => {
                error!(uri = %req.uri(), "failed to serialize json response: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").response_to(req)
            }
        }
    }
}

impl Responder for QueryRejection {
    fn response_to(self, req: &RequestContext) -> Response<Bytes> {
        (self.status(), Json(self.to_json())).response_to(req)
    }
}

impl Responder for QueryError {
    fn response_to(self, req: &RequestContext) -> Response<Bytes> {
        match self {
            QueryError::Rejected(rejection) => rejection.response_to(req),
            QueryError::Schema(e) => {
                error!(uri = %req.uri(), "query schema is malformed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").response_to(req)
            }
        }
    }
}

impl Responder for Infallible {
    fn response_to(self, _req: &RequestContext) -> Response<Bytes> {
        match self {}
    }
}
