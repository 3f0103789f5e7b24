//! Request router.
//!
//! One radix tree per HTTP method. Every registered path is literal: brace
//! characters are escaped before insertion, so a prefix taken from the
//! environment can never turn into a route parameter or wildcard.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};

/// The route table.
///
/// Build it once at startup and hand it to [`App::new`](crate::App::new).
/// Registration methods return `Result<Self, Error>` so they chain with `?`.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for an exact method + path pair.
    ///
    /// ```rust
    /// # use cicd_backend::{Request, Router};
    /// # use http::{Method, StatusCode};
    /// # async fn health(_: Request) -> StatusCode { StatusCode::OK }
    /// # fn main() -> Result<(), cicd_backend::Error> {
    /// let router = Router::new()
    ///     .on(Method::GET, "/health", health)?
    ///     .get("/api/{literal}", health)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Result<Self, Error> {
        self.routes
            .entry(method)
            .or_default()
            .insert(escape(path), handler.into_boxed_handler())
            .map_err(|source| Error::Route { path: path.to_owned(), source })?;
        Ok(self)
    }

    /// Shorthand for `on(Method::GET, ..)`.
    pub fn get(self, path: &str, handler: impl Handler) -> Result<Self, Error> {
        self.on(Method::GET, path, handler)
    }

    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Option<BoxedHandler> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// `{` and `}` are parameter syntax in matchit; doubling them makes them
/// literal.
fn escape(path: &str) -> String {
    path.replace('{', "{{").replace('}', "}}")
}
