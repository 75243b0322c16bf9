//! Route registry and dispatcher.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::RouterConfig;
use crate::error::{Result, RouterError};
use crate::history::{History, MemoryHistory, NavigationListeners};
use crate::middleware::{Flow, Handler};
use crate::path::PathPattern;
use crate::request::{PathParams, Request};

/// Ordered units registered for one pattern.
type Chain = Arc<[Handler]>;

/// A single route definition.
struct Route {
    /// Compiled pattern; its source string is the registry key.
    pattern: PathPattern,
    /// Handler chain.
    chain: Chain,
}

/// Mutable router state. Never locked across an `.await`.
#[derive(Default)]
struct RouterState {
    /// Routes in registration order.
    routes: Vec<Route>,
    /// Last path handed to `resolve`.
    current: Option<String>,
}

impl RouterState {
    fn position(&self, pattern: &str) -> Option<usize> {
        self.routes
            .iter()
            .position(|r| r.pattern.pattern() == pattern)
    }
}

/// A chain picked for a path, ready to run.
struct Dispatch {
    pattern: String,
    params: PathParams,
    chain: Chain,
    fallback: bool,
}

struct Inner {
    state: Mutex<RouterState>,
    config: RouterConfig,
    history: Arc<dyn History>,
    listeners: Arc<NavigationListeners>,
}

/// Client-side router.
///
/// Cloning is cheap and every clone drives the same registry. Routes are
/// tried in registration order and the first match wins, so a broad
/// pattern registered early shadows narrower ones registered later.
#[derive(Clone)]
pub struct Router {
    inner: Arc<Inner>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a [`Router`].
#[derive(Default)]
pub struct RouterBuilder {
    config: RouterConfig,
    history: Option<Arc<dyn History>>,
    listeners: Option<Arc<NavigationListeners>>,
}

impl RouterBuilder {
    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the session history. Defaults to a fresh [`MemoryHistory`].
    #[must_use]
    pub fn history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    /// Shares a listener set with other routers. Defaults to a set owned
    /// by this router alone.
    #[must_use]
    pub fn listeners(mut self, listeners: Arc<NavigationListeners>) -> Self {
        self.listeners = Some(listeners);
        self
    }

    /// Builds the router and installs its listener set if needed.
    pub fn build(self) -> Router {
        let listeners = self.listeners.unwrap_or_default();
        listeners.install();

        Router {
            inner: Arc::new(Inner {
                state: Mutex::new(RouterState::default()),
                config: self.config,
                history: self
                    .history
                    .unwrap_or_else(|| Arc::new(MemoryHistory::default())),
                listeners,
            }),
        }
    }
}

impl Router {
    /// Creates a router with default configuration and in-memory history.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a router.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// Returns the session history.
    pub fn history(&self) -> &Arc<dyn History> {
        &self.inner.history
    }

    /// Returns the last resolved path.
    pub fn current_path(&self) -> Option<String> {
        self.inner.state.lock().current.clone()
    }

    /// Returns registered patterns in match order.
    pub fn patterns(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .routes
            .iter()
            .map(|r| r.pattern.pattern().to_string())
            .collect()
    }

    /// Registers a handler chain for `pattern`.
    ///
    /// Registering a pattern again replaces its chain but keeps its place in
    /// match order. If `pattern` is exactly the current path, the new chain
    /// runs right away.
    pub async fn register<I>(&self, pattern: &str, units: I) -> Result<()>
    where
        I: IntoIterator<Item = Handler>,
    {
        let compiled = PathPattern::parse_with(pattern, self.inner.config.pattern_options())?;
        let chain: Chain = units.into_iter().collect();

        let eager = {
            let mut state = self.inner.state.lock();
            let eager = state
                .current
                .clone()
                .filter(|current| current == pattern)
                .map(|current| {
                    let params = compiled.extract(&current);
                    Request::new(current, pattern, params)
                });

            let route = Route {
                pattern: compiled,
                chain: Arc::clone(&chain),
            };
            match state.position(pattern) {
                Some(index) => state.routes[index] = route,
                None => state.routes.push(route),
            }
            eager
        };
        debug!(pattern, units = chain.len(), "route registered");

        match eager {
            Some(req) => self.run_chain(pattern, &chain, req).await,
            None => Ok(()),
        }
    }

    /// Removes the chain for `pattern`. Returns whether one was registered.
    pub fn unregister(&self, pattern: &str) -> bool {
        let mut state = self.inner.state.lock();
        let removed = state
            .position(pattern)
            .map(|index| state.routes.remove(index))
            .is_some();
        if removed {
            debug!(pattern, "route unregistered");
        }
        removed
    }

    /// Pushes `path` onto the history and dispatches it.
    ///
    /// Navigating to the current path does nothing.
    pub async fn navigate(&self, path: &str) -> Result<()> {
        if self.is_current(path) {
            trace!(path, "already at path");
            return Ok(());
        }
        self.inner.history.push_state(path);
        self.resolve(path).await
    }

    /// Dispatches `path` without touching the history.
    ///
    /// The first registered pattern that matches runs; otherwise the
    /// fallback chain runs if one is registered. A repeat of the last
    /// resolved path is ignored.
    pub async fn resolve(&self, path: &str) -> Result<()> {
        let dispatch = {
            let mut state = self.inner.state.lock();
            if state.current.as_deref() == Some(path) {
                trace!(path, "already resolved");
                return Ok(());
            }
            state.current = Some(path.to_string());
            self.find(&state, path)
        };

        let Some(dispatch) = dispatch else {
            debug!(path, "no route matched");
            return Ok(());
        };

        debug!(
            path,
            pattern = %dispatch.pattern,
            fallback = dispatch.fallback,
            "dispatching"
        );
        let req = Request::new(path, dispatch.pattern.as_str(), dispatch.params);
        self.run_chain(&dispatch.pattern, &dispatch.chain, req).await
    }

    /// Dispatches the history's current location.
    pub async fn resolve_current(&self) -> Result<()> {
        let path = self.inner.history.location();
        self.resolve(&path).await
    }

    /// Entry point for `popstate`: dispatches the current location if the
    /// listeners are installed.
    pub async fn history_changed(&self) -> Result<()> {
        if !self.inner.listeners.is_installed() {
            trace!("history change ignored, listeners removed");
            return Ok(());
        }
        self.resolve_current().await
    }

    /// Entry point for link clicks and Enter keyups.
    ///
    /// Returns `true` when the link was handled in-app and the browser's
    /// default navigation should be suppressed.
    pub async fn link_activated(&self, href: &str) -> Result<bool> {
        if !self.inner.listeners.is_installed() || !is_app_path(href) {
            return Ok(false);
        }
        self.navigate(href).await?;
        Ok(true)
    }

    /// Removes the navigation listeners. Returns `false` if they were
    /// already removed.
    pub fn teardown_listeners(&self) -> bool {
        self.inner.listeners.teardown()
    }

    /// Builds a path for a registered pattern.
    pub fn url_for(&self, pattern: &str, params: &PathParams) -> Option<String> {
        let state = self.inner.state.lock();
        let index = state.position(pattern)?;
        state.routes[index].pattern.reverse(params)
    }

    fn is_current(&self, path: &str) -> bool {
        self.inner.state.lock().current.as_deref() == Some(path)
    }

    /// Picks the chain for `path`.
    fn find(&self, state: &RouterState, path: &str) -> Option<Dispatch> {
        if let Some(route) = state.routes.iter().find(|r| r.pattern.is_match(path)) {
            return Some(Dispatch {
                pattern: route.pattern.pattern().to_string(),
                params: route.pattern.extract(path),
                chain: Arc::clone(&route.chain),
                fallback: false,
            });
        }

        let fallback = &self.inner.config.fallback;
        state.position(fallback).map(|index| Dispatch {
            pattern: fallback.clone(),
            params: PathParams::new(),
            chain: Arc::clone(&state.routes[index].chain),
            fallback: true,
        })
    }

    /// Runs units one after another until one halts or fails.
    async fn run_chain(&self, pattern: &str, chain: &Chain, mut req: Request) -> Result<()> {
        for (index, unit) in chain.iter().enumerate() {
            match unit.call(self.clone(), req).await {
                Ok(Flow::Continue(next)) => req = next,
                Ok(Flow::Halt) => {
                    debug!(pattern, unit = index, "chain halted");
                    return Ok(());
                }
                Err(source) => {
                    warn!(pattern, unit = index, error = %source, "handler failed");
                    return Err(RouterError::Handler {
                        pattern: pattern.to_string(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Whether `href` is a path inside this app rather than an external URL.
fn is_app_path(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{sync_unit, unit};
    use crate::request::ParamValue;

    fn record(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> Handler {
        let log = Arc::clone(log);
        sync_unit(move |_, _| {
            log.lock().push(name.to_string());
            true
        })
    }

    #[tokio::test]
    async fn test_basic_routing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new();
        router.register("/", [record(&log, "home")]).await.unwrap();
        router.register("/users/:id", [record(&log, "user")]).await.unwrap();

        router.navigate("/users/7").await.unwrap();
        router.navigate("/").await.unwrap();
        assert_eq!(*log.lock(), vec!["user", "home"]);
        assert_eq!(router.current_path().as_deref(), Some("/"));
    }

    #[tokio::test]
    async fn test_first_registered_match_wins() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new();
        router.register("/posts/:slug", [record(&log, "slug")]).await.unwrap();
        router.register("/posts/new", [record(&log, "new")]).await.unwrap();

        router.navigate("/posts/new").await.unwrap();
        assert_eq!(*log.lock(), vec!["slug"]);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_position() {
        let router = Router::new();
        let noop = || sync_unit(|_, _| true);
        router.register("/a", [noop()]).await.unwrap();
        router.register("/b", [noop()]).await.unwrap();
        router.register("/a", [noop(), noop()]).await.unwrap();
        assert_eq!(router.patterns(), vec!["/a", "/b"]);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let router = Router::new();
        router.register("/about", [sync_unit(|_, _| true)]).await.unwrap();
        assert!(router.unregister("/about"));
        assert!(!router.unregister("/about"));
        assert!(router.patterns().is_empty());
    }

    #[tokio::test]
    async fn test_params_reach_units() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let router = Router::new();
        router
            .register(
                "/blog/:slug/:id",
                [unit(move |_, req| {
                    let sink = Arc::clone(&sink);
                    async move {
                        *sink.lock() = Some(req.params.clone());
                        req.proceed()
                    }
                })],
            )
            .await
            .unwrap();

        router.navigate("/blog/hello/12").await.unwrap();
        let params = seen.lock().clone().unwrap();
        assert_eq!(params.get("slug"), Some(&ParamValue::from("hello")));
        assert_eq!(params.number("id"), Some(12));
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_rejected() {
        let router = Router::new();
        let err = router.register("/:id(", [sync_unit(|_, _| true)]).await.unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
        assert!(router.patterns().is_empty());
    }

    #[tokio::test]
    async fn test_url_for() {
        let router = Router::new();
        router.register(r"/users/:id(\d+)", [sync_unit(|_, _| true)]).await.unwrap();

        let mut params = PathParams::new();
        params.insert("id", 42_i64);
        assert_eq!(router.url_for(r"/users/:id(\d+)", &params), Some("/users/42".to_string()));
        assert_eq!(router.url_for("/missing", &params), None);
    }

    #[test]
    fn test_is_app_path() {
        assert!(is_app_path("/about"));
        assert!(!is_app_path("//cdn.example.com/x"));
        assert!(!is_app_path("https://example.com"));
        assert!(!is_app_path("about"));
    }
}
