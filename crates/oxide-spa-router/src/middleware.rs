//! Handler units and the signals they return to the chain runner.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::{self, FutureExt};
use tracing::info;

use crate::error::BoxError;
use crate::request::Request;
use crate::router::Router;

/// A boxed future for async unit operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a unit tells the chain runner once it has settled.
#[derive(Debug)]
pub enum Flow {
    /// Hand the request to the next unit.
    Continue(Request),
    /// Stop the chain. No later unit runs.
    Halt,
}

/// Settled result of one unit.
pub type UnitResult = Result<Flow, BoxError>;

impl Flow {
    /// Settled result that stops the chain.
    pub fn halt() -> UnitResult {
        Ok(Self::Halt)
    }
}

/// One step of a handler chain.
///
/// Every unit, synchronous or not, is driven as a future: the runner awaits
/// it before starting the next one. The router handle is passed explicitly
/// so a unit can register routes or navigate elsewhere.
///
/// # Example
///
/// ```ignore
/// struct RequireLang;
///
/// impl Middleware for RequireLang {
///     fn call(&self, _router: Router, req: Request) -> BoxFuture<'static, UnitResult> {
///         Box::pin(async move {
///             if req.params.get("lang").is_some() {
///                 req.proceed()
///             } else {
///                 Flow::halt()
///             }
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync {
    /// Runs the unit against the request.
    fn call(&self, router: Router, req: Request) -> BoxFuture<'static, UnitResult>;
}

/// A shareable unit, as stored in a chain.
pub type Handler = Arc<dyn Middleware>;

struct AsyncUnit<F>(F);

impl<F, Fut> Middleware for AsyncUnit<F>
where
    F: Fn(Router, Request) -> Fut + Send + Sync,
    Fut: Future<Output = UnitResult> + Send + 'static,
{
    fn call(&self, router: Router, req: Request) -> BoxFuture<'static, UnitResult> {
        (self.0)(router, req).boxed()
    }
}

struct SyncUnit<F>(F);

impl<F> Middleware for SyncUnit<F>
where
    F: Fn(&Router, &mut Request) -> bool + Send + Sync,
{
    fn call(&self, router: Router, mut req: Request) -> BoxFuture<'static, UnitResult> {
        let flow = if (self.0)(&router, &mut req) {
            Flow::Continue(req)
        } else {
            Flow::Halt
        };
        future::ready(Ok(flow)).boxed()
    }
}

/// Wraps an async function as a unit.
///
/// ```ignore
/// let load = unit(|_router, mut req| async move {
///     req.set("loaded", true);
///     req.proceed()
/// });
/// ```
pub fn unit<F, Fut>(f: F) -> Handler
where
    F: Fn(Router, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = UnitResult> + Send + 'static,
{
    Arc::new(AsyncUnit(f))
}

/// Wraps a synchronous function as a unit. Returning `false` halts the chain.
pub fn sync_unit<F>(f: F) -> Handler
where
    F: Fn(&Router, &mut Request) -> bool + Send + Sync + 'static,
{
    Arc::new(SyncUnit(f))
}

/// Unit that lets the chain continue only when a check passes.
///
/// A rejected request halts the chain and, if configured, navigates to a
/// redirect path first.
pub struct Guard {
    check: Box<dyn Fn(&Request) -> bool + Send + Sync>,
    redirect: Option<String>,
}

impl Guard {
    /// Creates a guard from a check.
    pub fn new(check: impl Fn(&Request) -> bool + Send + Sync + 'static) -> Self {
        Self {
            check: Box::new(check),
            redirect: None,
        }
    }

    /// Navigates to `path` when the check fails.
    #[must_use]
    pub fn redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect = Some(path.into());
        self
    }

    /// Converts the guard into a chain unit.
    pub fn into_handler(self) -> Handler {
        Arc::new(self)
    }
}

impl Middleware for Guard {
    fn call(&self, router: Router, req: Request) -> BoxFuture<'static, UnitResult> {
        if (self.check)(&req) {
            return future::ready(req.proceed()).boxed();
        }

        reject(router, self.redirect.clone()).boxed()
    }
}

async fn reject(router: Router, redirect: Option<String>) -> UnitResult {
    if let Some(path) = redirect {
        router.navigate(&path).await?;
    }
    Flow::halt()
}

/// Unit that logs each dispatch and continues.
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn call(&self, _router: Router, req: Request) -> BoxFuture<'static, UnitResult> {
        info!(route = %req.route, pattern = %req.pattern, "navigation");
        future::ready(req.proceed()).boxed()
    }
}
