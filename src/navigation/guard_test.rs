use std::sync::Mutex;

use serde_json::json;

use super::*;
use crate::api::LoginResponse;
use crate::navigation::{DEFAULT_ALLOW_LIST, PageStack};
use crate::session::test_helpers::{Harness, harness, harness_with_backend};
use crate::storage::{MemoryBackend, StorageBackend, TOKEN_KEY};

// =========================================================================
// Helpers
// =========================================================================

fn signed_in_harness() -> Harness {
    let backend = Arc::new(MemoryBackend::new());
    backend.write(TOKEN_KEY, json!("tok1")).unwrap();
    harness_with_backend(backend)
}

fn guard_over(h: &Harness) -> (NavigationGuard, Arc<PageStack>) {
    let stack = Arc::new(PageStack::with_root("/"));
    let guard = NavigationGuard::new(h.session.clone(), GuardPolicy::default(), stack.clone());
    (guard, stack)
}

/// Host that refuses every primitive and records what it was asked to do.
#[derive(Default)]
struct RefusingHost {
    calls: Mutex<Vec<(NavigationPrimitive, String)>>,
}

impl NavigationHost for RefusingHost {
    fn perform(&self, primitive: NavigationPrimitive, url: &str) -> Result<(), NavigationError> {
        self.calls.lock().unwrap().push((primitive, url.to_owned()));
        Err(NavigationError::Host("shell not ready".into()))
    }
}

const PROTECTED: [&str; 4] = ["/pages/index", "/pages/mine/index", "/pages/work/index", "/"];

// =========================================================================
// GuardPolicy::decide
// =========================================================================

#[test]
fn anonymous_protected_path_redirects_to_login() {
    let policy = GuardPolicy::default();
    for path in PROTECTED {
        let decision = policy.decide(AuthState::Anonymous, &NavigationIntent::parse(path));
        assert_eq!(decision, Decision::Redirect("/pages/login".into()), "path {path}");
        assert!(!decision.proceeds());
    }
}

#[test]
fn anonymous_allow_listed_path_proceeds() {
    let policy = GuardPolicy::default();
    for path in DEFAULT_ALLOW_LIST {
        assert_eq!(policy.decide(AuthState::Anonymous, &NavigationIntent::parse(path)), Decision::Allow);
    }
}

#[test]
fn anonymous_allow_list_ignores_query() {
    let policy = GuardPolicy::default();
    let intent = NavigationIntent::parse("/pages/login?redirect=/a");
    assert_eq!(policy.decide(AuthState::Anonymous, &intent), Decision::Allow);
}

#[test]
fn anonymous_allow_list_is_not_prefix_match() {
    let policy = GuardPolicy::default();
    let intent = NavigationIntent::parse("/pages/login/extra");
    assert!(!policy.decide(AuthState::Anonymous, &intent).proceeds());
}

#[test]
fn authenticated_login_page_redirects_home_regardless_of_query() {
    let policy = GuardPolicy::default();
    for url in ["/pages/login", "/pages/login?redirect=/a", "/pages/login?"] {
        let decision = policy.decide(AuthState::Authenticated, &NavigationIntent::parse(url));
        assert_eq!(decision, Decision::Redirect(HOME_PAGE.into()), "url {url}");
    }
}

#[test]
fn authenticated_other_paths_proceed() {
    let policy = GuardPolicy::default();
    for path in PROTECTED.into_iter().chain(["/pages/register"]) {
        assert_eq!(policy.decide(AuthState::Authenticated, &NavigationIntent::parse(path)), Decision::Allow);
    }
}

#[test]
fn custom_login_page() {
    let policy = GuardPolicy::new(AllowList::new(["/signin"]), "/signin");
    assert_eq!(policy.login_page(), "/signin");
    assert_eq!(
        policy.decide(AuthState::Anonymous, &NavigationIntent::parse("/pages/login")),
        Decision::Redirect("/signin".into())
    );
    assert_eq!(
        policy.decide(AuthState::Authenticated, &NavigationIntent::parse("/signin?x")),
        Decision::Redirect("/".into())
    );
}

#[test]
fn login_page_is_always_allow_listed() {
    let policy = GuardPolicy::new(AllowList::new(["/pages/register"]), "/signin");
    assert_eq!(policy.decide(AuthState::Anonymous, &NavigationIntent::parse("/signin?from=/x")), Decision::Allow);
    assert_eq!(policy.decide(AuthState::Anonymous, &NavigationIntent::parse("/pages/register")), Decision::Allow);
}

#[test]
fn auth_state_from_token() {
    assert_eq!(AuthState::from_token(""), AuthState::Anonymous);
    assert_eq!(AuthState::from_token("t"), AuthState::Authenticated);
}

// =========================================================================
// NavigationGuard
// =========================================================================

#[test]
fn anonymous_every_primitive_is_suppressed_and_relaunches_login() {
    let h = harness();
    for primitive in NavigationPrimitive::ALL {
        let (guard, stack) = guard_over(&h);
        assert!(!guard.dispatch(primitive, "/pages/mine/index"), "{primitive}");
        assert_eq!(stack.pages(), vec!["/pages/login"], "{primitive}");
    }
}

#[test]
fn anonymous_explicit_call_sites_share_the_policy() {
    let h = harness();
    let (guard, stack) = guard_over(&h);
    assert!(!guard.navigate_to("/pages/a"));
    assert!(!guard.redirect_to("/pages/b"));
    assert!(!guard.re_launch("/pages/c"));
    assert!(!guard.switch_tab("/pages/d"));
    assert_eq!(stack.pages(), vec!["/pages/login"]);
}

#[test]
fn anonymous_allow_listed_navigation_runs_unchanged() {
    let h = harness();
    let (guard, stack) = guard_over(&h);
    assert!(guard.navigate_to("/pages/register?from=login"));
    assert_eq!(stack.pages(), vec!["/", "/pages/register?from=login"]);
}

#[test]
fn authenticated_navigation_runs_unchanged() {
    let h = signed_in_harness();
    let (guard, stack) = guard_over(&h);
    assert!(guard.navigate_to("/pages/mine/index?tab=2"));
    assert!(guard.redirect_to("/pages/work/index"));
    assert_eq!(stack.pages(), vec!["/", "/pages/work/index"]);
}

#[test]
fn authenticated_login_visit_relaunches_home() {
    let h = signed_in_harness();
    let (guard, stack) = guard_over(&h);
    guard.navigate_to("/pages/mine/index");
    assert!(!guard.navigate_to("/pages/login?redirect=/x"));
    assert_eq!(stack.pages(), vec!["/"]);
}

#[test]
fn invoke_reports_without_performing_the_intent() {
    let h = harness();
    let (guard, stack) = guard_over(&h);
    let intent = NavigationIntent::parse("/pages/agreement");
    assert!(!guard.invoke(NavigationPrimitive::NavigateTo, &intent));
    assert_eq!(stack.pages(), vec!["/pages/login"]);

    let allowed = NavigationIntent::parse("/pages/common/privacy/index");
    assert!(guard.invoke(NavigationPrimitive::NavigateTo, &allowed));
    assert_eq!(stack.pages(), vec!["/pages/login"]);
}

#[test]
fn redirect_failure_is_swallowed() {
    let h = harness();
    let host = Arc::new(RefusingHost::default());
    let guard = NavigationGuard::new(h.session.clone(), GuardPolicy::default(), host.clone());

    assert!(!guard.navigate_to("/pages/mine/index"));
    let calls = host.calls.lock().unwrap();
    assert_eq!(*calls, vec![(NavigationPrimitive::ReLaunch, "/pages/login".to_owned())]);
    assert!(!h.session.is_authenticated());
}

#[test]
fn host_failure_on_allowed_navigation_is_swallowed() {
    let h = signed_in_harness();
    let host = Arc::new(RefusingHost::default());
    let guard = NavigationGuard::new(h.session.clone(), GuardPolicy::default(), host.clone());

    assert!(!guard.switch_tab("/pages/work/index"));
    assert_eq!(
        *host.calls.lock().unwrap(),
        vec![(NavigationPrimitive::SwitchTab, "/pages/work/index".to_owned())]
    );
    assert_eq!(h.session.token(), "tok1");
}

#[tokio::test]
async fn guard_reads_live_token_on_every_attempt() {
    let h = harness();
    let (guard, stack) = guard_over(&h);

    assert!(!guard.navigate_to("/pages/mine/index"));

    h.remote.push_login(Ok(LoginResponse { token: "tok1".into() }));
    h.session.login("bob", "pw", "", "").await.unwrap();
    assert!(guard.navigate_to("/pages/mine/index"));
    assert_eq!(stack.pages(), vec!["/pages/login", "/pages/mine/index"]);

    h.session.logout().await.unwrap();
    assert!(!guard.navigate_to("/pages/mine/index"));
    assert_eq!(stack.pages(), vec!["/pages/login"]);
}
