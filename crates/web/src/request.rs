//! Request information handed to extractors and responders.
//!
//! [`RequestContext`] is a borrowed view over the head of an HTTP request (`http::request::Parts`),
//! so extraction never needs to own or consume the request.

use http::request::Parts;
use http::{HeaderMap, Method, Uri, Version};

/// Represents the context of an HTTP request, giving access to the request head.
///
/// The lifetime parameter ensures the context does not outlive the request it references.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'req> {
    parts: &'req Parts,
}

impl<'req> RequestContext<'req> {
    /// Creates a new RequestContext over the given request head
    pub fn new(parts: &'req Parts) -> Self {
        Self { parts }
    }

    /// Returns a reference to the underlying request head
    pub fn parts(&self) -> &'req Parts {
        self.parts
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &'req Method {
        &self.parts.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &'req Uri {
        &self.parts.uri
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &'req HeaderMap {
        &self.parts.headers
    }

    /// Returns the raw query string of the request, without the leading `?`
    pub fn query(&self) -> Option<&'req str> {
        self.parts.uri.query()
    }
}
