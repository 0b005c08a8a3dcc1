//! The user-supplied handler contract.

use std::future::Future;
use std::pin::Pin;

use crate::error::HandlerError;
use crate::model::{Request, Response};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Turns an abstract [`Request`] into an abstract [`Response`].
///
/// Implemented for every `Fn(Request) -> impl Future<Output = Result<Response, E>>`
/// where `E: Into<HandlerError>`; wrap synchronous functions in
/// [`SyncHandler`].
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request) -> BoxFuture<Result<Response, HandlerError>>;
}

impl<F, Fut, E> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, E>> + Send + 'static,
    E: Into<HandlerError>,
{
    fn call(&self, request: Request) -> BoxFuture<Result<Response, HandlerError>> {
        let fut = self(request);
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}

/// Adapts a synchronous function into a [`Handler`].
#[derive(Debug, Clone)]
pub struct SyncHandler<F>(pub F);

impl<F, E> Handler for SyncHandler<F>
where
    F: Fn(Request) -> Result<Response, E> + Send + Sync + 'static,
    E: Into<HandlerError>,
{
    fn call(&self, request: Request) -> BoxFuture<Result<Response, HandlerError>> {
        let result = (self.0)(request).map_err(Into::into);
        Box::pin(std::future::ready(result))
    }
}
