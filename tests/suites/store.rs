use crate::common::{MemoryBackend, SECRET, create_test_config, follow_up_request};
use serde_json::json;
use signet::{
    BackendRegistry, CookieOverrides, Request, Response, SECURE_COOKIE_BACKEND, Session,
    SessionStore,
};
use std::sync::Arc;

fn registry_with_memory(memory: &MemoryBackend) -> Arc<BackendRegistry> {
    Arc::new(BackendRegistry::default().with("memory", memory.clone()))
}

#[test]
fn test_same_session_object_per_key() {
    let mut store = SessionStore::new(create_test_config(SECRET), Request::default()).unwrap();

    store
        .get_session(Some("foo"), None, &CookieOverrides::default())
        .unwrap()
        .insert("count", 1);
    let session = store
        .get_session(Some("foo"), None, &CookieOverrides::default())
        .unwrap();
    *session.get_mut("count").unwrap() = json!(2);

    let session = store
        .get_session(Some("foo"), Some(SECURE_COOKIE_BACKEND), &CookieOverrides::default())
        .unwrap();
    assert_eq!(session.get("count"), Some(&json!(2)));
}

#[test]
fn test_session_survives_round_trip() {
    let config = create_test_config(SECRET);
    let mut store = SessionStore::new(Arc::clone(&config), Request::default()).unwrap();
    store.session().unwrap().insert("uid", 42);
    store.session().unwrap().add_flash("welcome");

    let mut response = Response::new();
    store.save(&mut response).unwrap();

    let mut store = SessionStore::new(config, follow_up_request(&response)).unwrap();
    let session = store.session().unwrap();
    assert_eq!(session.get("uid"), Some(&json!(42)));
    assert_eq!(session.get_flashes(), vec![json!("welcome")]);
    assert!(session.get_flashes().is_empty());
}

#[test]
fn test_loaded_but_untouched_session_is_not_rewritten() {
    let config = create_test_config(SECRET);
    let mut store = SessionStore::new(Arc::clone(&config), Request::default()).unwrap();
    store.session().unwrap().insert("uid", 42);
    let mut response = Response::new();
    store.save(&mut response).unwrap();

    let mut store = SessionStore::new(config, follow_up_request(&response)).unwrap();
    let session = store.session().unwrap();
    assert_eq!(session.get("uid"), Some(&json!(42)));
    assert!(session.get_flashes().is_empty());

    let mut response = Response::new();
    store.save(&mut response).unwrap();
    assert!(response.set_cookie_headers().is_empty());
}

#[test]
fn test_multiple_named_sessions_commit_together() {
    let config = create_test_config(SECRET);
    let mut store = SessionStore::new(Arc::clone(&config), Request::default()).unwrap();
    store.session().unwrap().insert("uid", 42);
    store
        .get_session(Some("prefs"), None, &CookieOverrides::default().max_age(86_400))
        .unwrap()
        .insert("theme", "dark");
    store
        .set_cookie("lang", "pt", &CookieOverrides::default())
        .unwrap();

    let mut response = Response::new();
    store.save(&mut response).unwrap();

    let headers = response.set_cookie_headers();
    assert_eq!(headers.len(), 3);
    assert!(headers.iter().any(|h| h.starts_with("prefs=") && h.contains("Max-Age=86400")));

    let mut store = SessionStore::new(config, follow_up_request(&response)).unwrap();
    assert_eq!(
        store
            .get_session(Some("prefs"), None, &CookieOverrides::default())
            .unwrap()
            .get("theme"),
        Some(&json!("dark"))
    );
    assert_eq!(store.session().unwrap().get("uid"), Some(&json!(42)));
}

#[test]
fn test_pluggable_server_side_backend() {
    let memory = MemoryBackend::default();
    let config = create_test_config(SECRET);

    let mut store = SessionStore::with_backends(
        Arc::clone(&config),
        Request::default(),
        registry_with_memory(&memory),
    )
    .unwrap();
    store
        .get_session(Some("cart"), Some("memory"), &CookieOverrides::default())
        .unwrap()
        .insert("items", json!(["apple", "pear"]));

    let mut response = Response::new();
    store.save(&mut response).unwrap();
    assert_eq!(memory.len(), 1);

    let cookie = response.cookie_value("cart").unwrap();
    assert!(!cookie.contains("apple"));

    let mut store = SessionStore::with_backends(
        config,
        follow_up_request(&response),
        registry_with_memory(&memory),
    )
    .unwrap();
    let cart = store
        .get_session(Some("cart"), Some("memory"), &CookieOverrides::default())
        .unwrap();
    assert_eq!(cart.get("items"), Some(&json!(["apple", "pear"])));
    cart.insert("items", json!(["apple"]));

    let mut response = Response::new();
    store.save(&mut response).unwrap();
    assert_eq!(memory.len(), 1);
}

#[test]
fn test_memory_backend_as_default() {
    let memory = MemoryBackend::default();
    let config = Arc::new((*create_test_config(SECRET)).clone().with_default_backend("memory"));

    let mut store = SessionStore::with_backends(
        Arc::clone(&config),
        Request::default(),
        registry_with_memory(&memory),
    )
    .unwrap();
    store.session().unwrap().insert("uid", 7);
    let mut response = Response::new();
    store.save(&mut response).unwrap();

    let mut store = SessionStore::with_backends(
        config,
        follow_up_request(&response),
        registry_with_memory(&memory),
    )
    .unwrap();
    assert_eq!(store.session().unwrap().get("uid"), Some(&json!(7)));
}

#[test]
fn test_set_session_is_saved_when_modified() {
    let mut store = SessionStore::new(create_test_config(SECRET), Request::default()).unwrap();

    let mut session = Session::new();
    session.insert("imported", true);
    store
        .set_session("legacy", session, None, &CookieOverrides::default().path("/old"))
        .unwrap();
    store
        .set_session("ignored", Session::new(), None, &CookieOverrides::default())
        .unwrap();

    let mut response = Response::new();
    store.save(&mut response).unwrap();

    let headers = response.set_cookie_headers();
    assert_eq!(headers.len(), 1);
    assert!(headers[0].starts_with("legacy="));
    assert!(headers[0].ends_with("; Path=/old"));
}

#[test]
fn test_tampered_session_cookie_starts_fresh() {
    let config = create_test_config(SECRET);
    let mut store = SessionStore::new(Arc::clone(&config), Request::default()).unwrap();
    store.session().unwrap().insert("role", "user");
    let mut response = Response::new();
    store.save(&mut response).unwrap();

    let token = response.cookie_value("session").unwrap();
    let forged = token.replacen("|", "X|", 1);
    let mut store = SessionStore::new(config, Request::with_cookies([("session", forged)])).unwrap();

    let session = store.session().unwrap();
    assert!(session.is_empty());
    assert!(!session.is_modified());
}
