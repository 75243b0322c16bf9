//! # oxide-spa-router
//!
//! Client-side routing for single-page applications.
//!
//! This crate provides:
//! - Express-style path patterns (`:name`, `:name(\d+)`, `?`, `+`, `*`)
//! - Positional parameter extraction with integer coercion
//! - Ordered handler chains that may halt early or run asynchronously
//! - A `/404` fallback chain for unmatched paths
//! - History and listener interfaces for the browser glue
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_spa_router::{sync_unit, unit, Flow, Router};
//!
//! let router = Router::new();
//!
//! router
//!     .register("/blog/:slug/:id", [
//!         sync_unit(|_router, req| req.params.number("id").is_some()),
//!         unit(|_router, req| async move {
//!             render_post(&req.params).await?;
//!             req.proceed()
//!         }),
//!     ])
//!     .await?;
//!
//! router.register("/404", [unit(|_router, req| async move {
//!     show_not_found(&req.route);
//!     Flow::halt()
//! })]).await?;
//!
//! router.navigate("/blog/hello-world/123").await?;
//! ```
//!
//! ## Matching
//!
//! Patterns are tried in registration order and the first match wins.
//! Registering the same pattern again replaces its chain. Navigating to
//! the path that was resolved last does nothing.
//!
//! ## Handler Chains
//!
//! Units run one at a time. Each one receives the router handle and the
//! request, and either hands the request on ([`Request::proceed`]) or stops
//! the chain ([`Flow::halt`], or `false` from a [`sync_unit`]). Values put
//! in [`Request::state`] are visible to every later unit of the chain. A
//! unit error aborts the chain and is returned from `navigate`.
//!
//! ## Browser Glue
//!
//! ```ignore
//! // anchor click or Enter keyup
//! if router.link_activated(&href).await? {
//!     event.prevent_default();
//! }
//!
//! // popstate
//! router.history_changed().await?;
//! ```

mod config;
mod error;
mod history;
mod middleware;
mod path;
mod request;
mod router;

pub use config::RouterConfig;
pub use error::{BoxError, Result, RouterError};
pub use history::{History, MemoryHistory, NavigationListeners};
pub use middleware::{
    sync_unit, unit, BoxFuture, Flow, Guard, Handler, LoggingMiddleware, Middleware, UnitResult,
};
pub use path::{ParamDescriptor, PathPattern, PatternOptions};
pub use request::{ParamValue, Params, PathParams, Request};
pub use router::{Router, RouterBuilder};
