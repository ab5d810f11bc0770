use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, trace};

use crate::request::{Method, Request};
use crate::response::Response;

/// Something that turns a request into a response, possibly asynchronously.
///
/// Implemented for every `Fn(Request) -> impl Future<Output = Response>`.
pub trait Handler: Send + Sync {
    fn call(&self, request: Request) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request) -> BoxFuture<'static, Response> {
        self(request).boxed()
    }
}

/// Maps literal paths and methods to handlers.
///
/// A handler registered for [Method::Any] answers every method on its path
/// and blocks any further registration for that path. Registering a specific
/// method first and `Any` afterwards is allowed; `Any` still wins at lookup.
#[derive(Default)]
pub struct Router {
    routes: HashMap<String, HashMap<Method, Arc<dyn Handler>>>,
}

impl Router {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_handler_for_any<P: Into<String>>(&mut self, path: P, handler: Arc<dyn Handler>) -> Result<(), ConflictError> {
        self.add_handler(path.into(), Method::Any, handler)
    }

    pub fn add_handler_for_get<P: Into<String>>(&mut self, path: P, handler: Arc<dyn Handler>) -> Result<(), ConflictError> {
        self.add_handler(path.into(), Method::Get, handler)
    }

    pub fn add_handler_for_post<P: Into<String>>(&mut self, path: P, handler: Arc<dyn Handler>) -> Result<(), ConflictError> {
        self.add_handler(path.into(), Method::Post, handler)
    }

    fn add_handler(&mut self, path: String, method: Method, handler: Arc<dyn Handler>) -> Result<(), ConflictError> {
        if self.routes.get(&path).is_some_and(|methods| methods.contains_key(&Method::Any)) {
            debug!(%path, %method, "handler for any method already registered.");
            return Err(ConflictError { path });
        }
        debug!(%path, %method, "registered handler.");
        self.routes.entry(path).or_default().insert(method, handler);
        Ok(())
    }

    pub fn get_handler_for_path(&self, path: &str, method: Method) -> Option<Arc<dyn Handler>> {
        let methods = self.routes.get(path)?;
        methods
            .get(&Method::Any)
            .or_else(|| methods.get(&method))
            .cloned()
    }

    /// Runs the handler registered for the request's path and method, or
    /// returns `None` when there is none.
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn dispatch(&self, request: Request) -> Option<Response> {
        let Some(handler) = self.get_handler_for_path(&request.path, request.method) else {
            debug!("no handler found.");
            return None;
        };
        let response = handler.call(request).await;
        trace!(status = response.status_code, "handler finished.");
        Some(response)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictError {
    path: String,
}

impl ConflictError {
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "a handler for any method is already registered for {:?}", self.path)
    }
}

impl std::error::Error for ConflictError {}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::headers::Headers;
    use crate::response::Status;

    async fn do_nothing(_: Request) -> Response {
        Response::new(200, "OK", Headers::new(), "")
    }

    fn handler() -> Arc<dyn Handler> {
        Arc::new(do_nothing)
    }

    fn same(a: &Option<Arc<dyn Handler>>, b: &Arc<dyn Handler>) -> bool {
        a.as_ref().is_some_and(|a| Arc::ptr_eq(a, b))
    }

    #[test]
    fn test_post_only_matches_post() -> Result<(), Box<dyn Error>> {
        let mut router = Router::new();
        let h = handler();
        router.add_handler_for_post("/a/b/c", Arc::clone(&h))?;
        assert!(same(&router.get_handler_for_path("/a/b/c", Method::Post), &h));
        assert!(router.get_handler_for_path("/a/b/c", Method::Get).is_none());
        Ok(())
    }

    #[test]
    fn test_get_only_matches_get() -> Result<(), Box<dyn Error>> {
        let mut router = Router::new();
        let h = handler();
        router.add_handler_for_get("/1/2/3", Arc::clone(&h))?;
        assert!(same(&router.get_handler_for_path("/1/2/3", Method::Get), &h));
        assert!(router.get_handler_for_path("/1/2/3", Method::Post).is_none());
        Ok(())
    }

    #[test]
    fn test_any_blocks_later_registrations() -> Result<(), Box<dyn Error>> {
        let mut router = Router::new();
        let h1 = handler();
        router.add_handler_for_any("/p", Arc::clone(&h1))?;

        let err = router.add_handler_for_get("/p", handler()).unwrap_err();
        assert_eq!(err.path(), "/p");
        assert!(router.add_handler_for_post("/p", handler()).is_err());
        assert!(router.add_handler_for_any("/p", handler()).is_err());

        assert!(same(&router.get_handler_for_path("/p", Method::Get), &h1));
        assert!(same(&router.get_handler_for_path("/p", Method::Post), &h1));
        Ok(())
    }

    #[test]
    fn test_any_after_specific_is_allowed_and_wins() -> Result<(), Box<dyn Error>> {
        let mut router = Router::new();
        let get = handler();
        let any = handler();
        router.add_handler_for_get("9/8/7", Arc::clone(&get))?;
        router.add_handler_for_any("9/8/7", Arc::clone(&any))?;
        assert!(same(&router.get_handler_for_path("9/8/7", Method::Get), &any));
        assert!(same(&router.get_handler_for_path("9/8/7", Method::Post), &any));
        Ok(())
    }

    #[test]
    fn test_same_method_is_replaced() -> Result<(), Box<dyn Error>> {
        let mut router = Router::new();
        let second = handler();
        router.add_handler_for_get("/x", handler())?;
        router.add_handler_for_get("/x", Arc::clone(&second))?;
        assert!(same(&router.get_handler_for_path("/x", Method::Get), &second));
        Ok(())
    }

    #[test]
    fn test_miss_is_none() -> Result<(), Box<dyn Error>> {
        let mut router = Router::new();
        assert!(router.get_handler_for_path("/", Method::Get).is_none());
        router.add_handler_for_get("/a", handler())?;
        assert!(router.get_handler_for_path("/a/", Method::Get).is_none());
        assert!(router.get_handler_for_path("/A", Method::Get).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_calls_handler() -> Result<(), Box<dyn Error>> {
        let mut router = Router::new();
        router.add_handler_for_post(
            "/echo",
            Arc::new(|request: Request| async move {
                Response::builder().with_body(request.content)
            }),
        )?;

        let request = Request::new(Method::Post, "/echo", Headers::new(), "ping");
        let response = router.dispatch(request).await.ok_or("no response")?;
        assert_eq!(response.status_code, Status::OK.code());
        assert_eq!(response.content, "ping");
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_miss() {
        let router = Router::new();
        let request = Request::new(Method::Get, "/nowhere", Headers::new(), "");
        assert!(router.dispatch(request).await.is_none());
    }
}
