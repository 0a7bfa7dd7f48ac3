use std::{future::ready, rc::Rc, time::Duration};

use assert_call::{call, CallRecorder};
use futures::executor::block_on;
use pretty_assertions::assert_eq;

use crate::{
    object, History, Location, ManualClock, MemoryHistory, NavigationError, ParamError,
    ParamProvider, ParamValue, ProviderConfig, PushOutcome, Setter, Subscription,
};

fn setup(
    path: &str,
    config: ProviderConfig,
) -> (Rc<MemoryHistory>, Rc<ManualClock>, ParamProvider) {
    let history = MemoryHistory::new(path);
    let clock = Rc::new(ManualClock::new());
    let provider = ParamProvider::new(history.clone(), clock.clone(), config);
    (history, clock, provider)
}

fn record(history: &Rc<MemoryHistory>) -> Subscription {
    history
        .clone()
        .listen(Rc::new(|location: &Rc<Location>| call!("{}", location)))
}

const NO_OVERRIDES: [(&str, Option<&str>); 0] = [];

#[test]
fn follows_history_location() {
    let (history, _clock, provider) = setup("/", ProviderConfig::new());
    history.push("/y?a=1").unwrap();
    assert_eq!(provider.location().path(), "/y?a=1");
    assert!(Rc::ptr_eq(&provider.location(), &history.location()));
}

#[test]
fn same_location_returns_same_handle() {
    let (history, _clock, provider) = setup("/", ProviderConfig::new());
    let h1 = provider.search_params();
    let h2 = provider.search_params();
    assert!(Rc::ptr_eq(&h1, &h2));

    history.push("/").unwrap();
    let h3 = provider.search_params();
    assert!(!Rc::ptr_eq(&h1, &h3));
    assert!(Rc::ptr_eq(h3.location(), &history.location()));
}

#[test]
fn returning_to_cached_location_reuses_handle() {
    let (history, _clock, provider) = setup("/a", ProviderConfig::new());
    let ha = provider.search_params();
    history.push("/b").unwrap();
    let hb = provider.search_params();
    history.back();
    assert!(Rc::ptr_eq(&provider.search_params(), &ha));
    history.forward();
    assert!(Rc::ptr_eq(&provider.search_params(), &hb));
}

#[test]
fn cache_evicts_oldest_handle() {
    let (history, _clock, provider) = setup("/a", ProviderConfig::new().cache_capacity(2));
    let ha = provider.search_params();
    history.push("/b").unwrap();
    let hb = provider.search_params();
    history.push("/c").unwrap();
    let _hc = provider.search_params();
    assert_eq!(provider.cached_handles(), 2);

    history.back();
    assert!(Rc::ptr_eq(&provider.search_params(), &hb));
    history.back();
    assert!(!Rc::ptr_eq(&provider.search_params(), &ha));
    assert_eq!(provider.cached_handles(), 2);
}

#[test]
fn param_returns_same_pair() {
    let (_history, _clock, provider) = setup("/?a=3", ProviderConfig::new());
    let handle = provider.search_params();
    let p1 = handle.param("a", 0);
    let p2 = handle.param("a", 0);
    assert!(Rc::ptr_eq(&p1, &p2));
    assert_eq!(p1.value(), &ParamValue::Number(3.0));
}

#[test]
fn setter_is_shared_across_handles() {
    let mut cr = CallRecorder::new();
    let (history, _clock, provider) = setup("/", ProviderConfig::new().minimum_delay_ms(-1));
    let _s = record(&history);

    let s1 = provider.search_params().param("a", 0).setter().clone();
    history.push("/x?b=1").unwrap();
    cr.verify("/x?b=1");
    let s2 = provider.search_params().param("a", 0).setter().clone();
    assert!(Setter::ptr_eq(&s1, &s2));
    assert_eq!(provider.setter_count(), 1);

    s1.set(5).unwrap();
    cr.verify("/x?b=1&a=5");
}

#[test]
fn setter_is_keyed_by_name_and_default() {
    let (_history, _clock, provider) = setup("/", ProviderConfig::new());
    let handle = provider.search_params();
    let a = handle.param("a", 0).setter().clone();
    let b = handle.param("b", 0).setter().clone();
    let c = handle.param("c", false).setter().clone();
    assert!(!Setter::ptr_eq(&a, &b));
    assert!(!Setter::ptr_eq(&a, &c));
    assert_eq!(provider.setter_count(), 3);
}

#[test]
fn structurally_equal_defaults_share_setter() {
    let (history, _clock, provider) = setup("/", ProviderConfig::new());
    let s1 = provider.search_params().param("tags", ["x", "y"]).setter().clone();
    history.push("/").unwrap();
    let s2 = provider.search_params().param("tags", ["x", "y"]).setter().clone();
    history.push("/").unwrap();
    let s3 = provider.search_params().param("tags", ["x"]).setter().clone();
    assert!(Setter::ptr_eq(&s1, &s2));
    assert!(!Setter::ptr_eq(&s1, &s3));
    assert_eq!(provider.setter_count(), 2);
}

#[test]
fn setting_current_value_is_unchanged() {
    let (_history, _clock, provider) = setup("/?n=5&on=true", ProviderConfig::new());
    let handle = provider.search_params();
    assert_eq!(handle.param("n", 0).set(5).unwrap(), PushOutcome::Unchanged);
    assert_eq!(handle.param("on", false).set(true).unwrap(), PushOutcome::Unchanged);
    assert_eq!(handle.param("missing", "d").set("d").unwrap(), PushOutcome::Unchanged);
    assert!(!provider.has_pending());
}

#[test]
fn setting_default_removes_explicit_value() {
    let (history, _clock, provider) =
        setup("/?n=5&x=1", ProviderConfig::new().minimum_delay_ms(-1));
    let pair = provider.search_params().param("n", 5);
    assert_eq!(pair.value(), &ParamValue::Number(5.0));
    assert_eq!(pair.set(5).unwrap(), PushOutcome::Committed);
    assert_eq!(history.location().search, "?x=1");
}

#[test]
fn setting_default_object_removes_explicit_fields() {
    let (history, _clock, provider) =
        setup("/?ab=B&x=1", ProviderConfig::new().minimum_delay_ms(-1));
    let default = ParamValue::from(object([("b", "B")]));
    let pair = provider.search_params().param("a", default.clone());
    assert_eq!(pair.value(), &default);
    assert_eq!(pair.set(default).unwrap(), PushOutcome::Committed);
    assert_eq!(history.location().search, "?x=1");
}

#[test]
fn setter_rejects_other_kind() {
    let (_history, _clock, provider) = setup("/", ProviderConfig::new());
    let pair = provider.search_params().param("n", 0);
    let err = pair.set("x").unwrap_err();
    assert!(matches!(
        err,
        ParamError::KindMismatch { ref name, .. } if name == "n"
    ));
    assert_eq!(
        err.to_string(),
        "parameter `n` expects a number value, got a string value"
    );
}

#[test]
fn reads_include_uncommitted_writes() {
    let (_history, _clock, provider) = setup("/?a=1", ProviderConfig::new());
    let handle = provider.search_params();
    handle.param("b", "").set("two").unwrap();
    assert_eq!(handle.get("b").as_deref(), Some("two"));
    assert_eq!(
        handle.entries(),
        [
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "two".to_string())
        ]
    );
    assert_eq!(handle.get("c"), None);
}

#[test]
fn teardown_cancels_pending_commits() {
    let mut cr = CallRecorder::new();
    let (history, _clock, provider) = setup("/", ProviderConfig::new());
    let _s = record(&history);
    let handle = provider.search_params();
    let pair = handle.param("a", 0);
    pair.set(1).unwrap();
    assert!(provider.has_pending());

    provider.teardown();
    assert!(provider.is_torn_down());
    assert!(!provider.has_pending());
    assert_eq!(provider.update().unwrap(), 0);
    cr.verify(());

    assert!(matches!(pair.set(2), Err(ParamError::Detached)));
    assert!(matches!(
        handle.push([("a", Some(3))]),
        Err(ParamError::Detached)
    ));
    assert_eq!(provider.setter_count(), 0);
    assert_eq!(provider.cached_handles(), 0);
    assert_eq!(history.len(), 1);
}

#[test]
fn teardown_stops_following_history() {
    let (history, _clock, provider) = setup("/", ProviderConfig::new());
    provider.teardown();
    history.push("/z").unwrap();
    assert_eq!(provider.location().pathname, "/");
}

#[test]
fn dropping_provider_detaches_handles() {
    let (history, _clock, provider) = setup("/", ProviderConfig::new());
    let handle = provider.search_params();
    let setter = handle.param("a", 0).setter().clone();
    drop(provider);
    assert!(matches!(setter.set(1), Err(ParamError::Detached)));
    history.push("/after").unwrap();
    assert_eq!(history.len(), 2);
}

struct RefusingHistory {
    location: Rc<Location>,
}
impl History for RefusingHistory {
    fn location(&self) -> Rc<Location> {
        self.location.clone()
    }
    fn push(&self, path: &str) -> Result<(), NavigationError> {
        Err(NavigationError::new(path, "blocked"))
    }
    fn listen(self: Rc<Self>, _f: crate::Listener) -> Subscription {
        Subscription::empty()
    }
}

fn refusing(delay_ms: i64) -> ParamProvider {
    let history = Rc::new(RefusingHistory {
        location: Rc::new(Location::from_path("/p")),
    });
    ParamProvider::new(
        history,
        Rc::new(ManualClock::new()),
        ProviderConfig::new().minimum_delay_ms(delay_ms),
    )
}

#[test]
fn navigation_failure_surfaces_from_update() {
    let provider = refusing(200);
    let handle = provider.search_params();
    handle.push([("a", Some(1))]).unwrap();

    let err = provider.update().unwrap_err();
    assert!(matches!(
        err,
        ParamError::Navigation(ref e) if e.path == "/p?a=1"
    ));
    assert_eq!(err.to_string(), "navigation to `/p?a=1` failed: blocked");
    assert_eq!(handle.get("a").as_deref(), Some("1"));
    assert!(!handle.has_pending());
}

#[test]
fn navigation_failure_surfaces_from_immediate_push() {
    let provider = refusing(-1);
    let handle = provider.search_params();
    assert!(matches!(
        handle.push([("a", Some(1))]),
        Err(ParamError::Navigation(_))
    ));
    assert_eq!(handle.get("a").as_deref(), Some("1"));
}

#[test]
fn settle_waits_for_every_deadline() {
    let mut cr = CallRecorder::new();
    let (history, clock, provider) = setup("/", ProviderConfig::new().minimum_delay_ms(200));
    let _s = record(&history);
    let handle = provider.search_params();

    handle.push([("a", Some(1))]).unwrap();
    provider.update().unwrap();
    cr.verify("/?a=1");

    handle.push([("b", Some(2))]).unwrap();
    let sleeper = clock.clone();
    block_on(provider.settle(|d: Duration| {
        sleeper.advance(d);
        ready(())
    }))
    .unwrap();
    cr.verify("/?a=1&b=2");
    assert_eq!(clock.elapsed(), Duration::from_millis(200));
    assert!(!provider.has_pending());
}

#[test]
fn url_keeps_configured_params() {
    let (_history, _clock, provider) =
        setup("/p?a=1&b=2", ProviderConfig::new().keep(["a"]));
    assert_eq!(
        provider.url(Some("/q"), [("c", Some(3))]).unwrap(),
        "/q?a=1&c=3"
    );
    assert_eq!(provider.url(None, NO_OVERRIDES).unwrap(), "/p?a=1&b=2");
}
