//! Tests for history, listeners and the navigation entry points.

mod common;

use std::sync::Arc;

use common::{Captured, Log};
use oxide_spa_router::{Guard, History, MemoryHistory, NavigationListeners, Router};

fn router_with_history(initial: &str) -> (Router, Arc<MemoryHistory>) {
    let history = Arc::new(MemoryHistory::new(initial));
    let router = Router::builder().history(Arc::clone(&history) as Arc<dyn History>).build();
    (router, history)
}

#[tokio::test]
async fn test_navigate_pushes_history_once() {
    let (router, history) = router_with_history("/");
    router.navigate("/a").await.unwrap();
    router.navigate("/a").await.unwrap();
    router.navigate("/b").await.unwrap();

    assert_eq!(history.entries(), vec!["/", "/a", "/b"]);
    assert_eq!(history.location(), "/b");
}

#[tokio::test]
async fn test_popstate_resolves_previous_entry() {
    let log = Log::new();
    let (router, history) = router_with_history("/");
    router.register("/a", [log.unit("a")]).await.unwrap();
    router.register("/b", [log.unit("b")]).await.unwrap();

    router.navigate("/a").await.unwrap();
    router.navigate("/b").await.unwrap();
    assert!(history.back());
    router.history_changed().await.unwrap();

    assert_eq!(log.entries(), vec!["a", "b", "a"]);
    assert_eq!(history.entries(), vec!["/", "/a", "/b"]);
    assert_eq!(router.current_path().as_deref(), Some("/a"));
}

#[tokio::test]
async fn test_popstate_for_already_resolved_path_is_ignored() {
    let log = Log::new();
    let (router, _history) = router_with_history("/");
    router.register("/a", [log.unit("a")]).await.unwrap();

    router.navigate("/a").await.unwrap();
    router.history_changed().await.unwrap();
    assert_eq!(log.entries(), vec!["a"]);
}

#[tokio::test]
async fn test_resolve_current_dispatches_initial_location() {
    let log = Log::new();
    let (router, history) = router_with_history("/start");
    router.register("/start", [log.unit("start")]).await.unwrap();
    assert!(log.entries().is_empty());

    router.resolve_current().await.unwrap();
    assert_eq!(log.entries(), vec!["start"]);
    assert_eq!(history.entries(), vec!["/start"]);
}

#[tokio::test]
async fn test_link_activation_intercepts_app_paths_only() {
    let log = Log::new();
    let (router, history) = router_with_history("/");
    router.register("/docs", [log.unit("docs")]).await.unwrap();

    assert!(router.link_activated("/docs").await.unwrap());
    assert!(!router.link_activated("https://example.com/docs").await.unwrap());
    assert!(!router.link_activated("//example.com/docs").await.unwrap());

    assert_eq!(log.entries(), vec!["docs"]);
    assert_eq!(history.entries(), vec!["/", "/docs"]);
}

#[tokio::test]
async fn test_teardown_stops_event_delivery() {
    let log = Log::new();
    let (router, history) = router_with_history("/");
    router.register("/a", [log.unit("a")]).await.unwrap();
    router.register("/b", [log.unit("b")]).await.unwrap();
    router.navigate("/a").await.unwrap();

    assert!(router.teardown_listeners());
    assert!(!router.teardown_listeners());

    assert!(!router.link_activated("/b").await.unwrap());
    history.push_state("/b");
    router.history_changed().await.unwrap();
    assert_eq!(log.entries(), vec!["a"]);

    router.navigate("/b").await.unwrap();
    assert_eq!(log.entries(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_listeners_are_per_router_by_default() {
    let log = Log::new();
    let first = Router::new();
    let second = Router::new();
    second.register("/x", [log.unit("x")]).await.unwrap();

    first.teardown_listeners();
    assert!(second.link_activated("/x").await.unwrap());
    assert_eq!(log.entries(), vec!["x"]);
}

#[tokio::test]
async fn test_shared_listeners_are_torn_down_for_everyone() {
    let listeners = Arc::new(NavigationListeners::new());
    let first = Router::builder().listeners(Arc::clone(&listeners)).build();
    let second = Router::builder().listeners(Arc::clone(&listeners)).build();
    assert!(listeners.is_installed());

    assert!(first.teardown_listeners());
    assert!(!second.link_activated("/x").await.unwrap());
    assert!(!second.teardown_listeners());
}

#[tokio::test]
async fn test_registering_the_current_path_runs_immediately() {
    let log = Log::new();
    let router = Router::new();
    router.navigate("/late").await.unwrap();

    router.register("/other", [log.unit("other")]).await.unwrap();
    assert!(log.entries().is_empty());

    router.register("/late", [log.unit("late")]).await.unwrap();
    assert_eq!(log.entries(), vec!["late"]);

    router.navigate("/late").await.unwrap();
    assert_eq!(log.entries(), vec!["late"]);
}

#[tokio::test]
async fn test_eager_registration_builds_a_fresh_request() {
    let captured = Captured::new();
    let router = Router::new();
    router.navigate("/settings").await.unwrap();
    router.register("/settings", [captured.unit()]).await.unwrap();

    let req = captured.last();
    assert_eq!(req.route, "/settings");
    assert_eq!(req.pattern, "/settings");
    assert!(req.params.is_empty());
    assert!(req.state.is_empty());
}

#[tokio::test]
async fn test_guard_redirects_through_the_router() {
    let log = Log::new();
    let (router, history) = router_with_history("/");
    router.register("/login", [log.unit("login")]).await.unwrap();
    router
        .register(
            "/admin",
            [
                Guard::new(|req| req.get_query("token").is_some())
                    .redirect("/login")
                    .into_handler(),
                log.unit("admin"),
            ],
        )
        .await
        .unwrap();

    router.navigate("/admin").await.unwrap();
    assert_eq!(log.entries(), vec!["login"]);
    assert_eq!(router.current_path().as_deref(), Some("/login"));
    assert_eq!(history.entries(), vec!["/", "/admin", "/login"]);

    router.navigate("/admin?token=t").await.unwrap();
    assert_eq!(log.entries(), vec!["login", "admin"]);
}
