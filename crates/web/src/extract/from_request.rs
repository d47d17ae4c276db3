use crate::responder::Responder;
use crate::RequestContext;
use async_trait::async_trait;
use std::convert::Infallible;

/// A value that can be extracted from the head of an incoming request.
#[async_trait]
pub trait FromRequest {
    type Output<'r>: Send;
    type Error: Responder + Send;
    async fn from_request<'r>(req: &'r RequestContext<'_>) -> Result<Self::Output<'r>, Self::Error>;
}

/// Turns a failed extraction into `None`.
#[async_trait]
impl<T> FromRequest for Option<T>
where
    T: FromRequest,
{
    type Output<'r> = Option<T::Output<'r>>;
    type Error = T::Error;

    async fn from_request<'r>(req: &'r RequestContext<'_>) -> Result<Self::Output<'r>, Self::Error> {
        match T::from_request(req).await {
            Ok(t) => Ok(Some(t)),
            Err(_) => Ok(None),
        }
    }
}

/// Hands the extraction error to the caller instead of responding with it.
#[async_trait]
impl<T> FromRequest for Result<T, T::Error>
where
    T: FromRequest,
{
    type Output<'r> = Result<T::Output<'r>, T::Error>;
    type Error = Infallible;

    async fn from_request<'r>(req: &'r RequestContext<'_>) -> Result<Self::Output<'r>, Self::Error> {
        Ok(T::from_request(req).await)
    }
}

#[async_trait]
impl FromRequest for () {
    type Output<'r> = ();
    type Error = Infallible;

    async fn from_request<'r>(_req: &'r RequestContext<'_>) -> Result<Self::Output<'r>, Self::Error> {
        Ok(())
    }
}
