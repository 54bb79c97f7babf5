use super::*;
use crate::web::clock::FixedClock;
use crate::web::route::{AppRoute, Navigation, resolve};
use crate::web::storage::MemoryStorage;
use std::rc::Rc;
use std::time::Duration;

// =========================================================
// 辅助函数
// =========================================================

const NOW_SECS: i64 = 1_700_000_000;

pub(crate) fn make_token(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}

pub(crate) fn token_expiring_at(exp: i64) -> String {
    make_token(serde_json::json!({ "sub": "maria@example.com", "exp": exp }))
}

fn maria() -> Identity {
    Identity {
        id: 2,
        name: "Maria".to_string(),
        email: "maria@example.com".to_string(),
        ..Default::default()
    }
}

fn jwt_response(token: String) -> JwtResponse {
    JwtResponse {
        token,
        token_type: "Bearer".to_string(),
        user: maria(),
    }
}

fn create_store() -> (SessionStore<MemoryStorage, FixedClock>, MemoryStorage, FixedClock) {
    let storage = MemoryStorage::new();
    let clock = FixedClock::at_secs(NOW_SECS);
    let store = SessionStore::new(storage.clone(), clock.clone());
    (store, storage, clock)
}

fn record_notifications(
    store: &SessionStore<MemoryStorage, FixedClock>,
) -> Rc<RefCell<Vec<Option<String>>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    store.subscribe(move |identity| sink.borrow_mut().push(identity.map(|i| i.name.clone())));
    seen
}

// =========================================================
// establish / logout
// =========================================================

#[test]
fn test_establish_persists_token_and_identity() {
    let (store, storage, _) = create_store();
    let seen = record_notifications(&store);

    let identity = store
        .establish(&jwt_response(token_expiring_at(NOW_SECS + 3600)))
        .unwrap();

    assert_eq!(identity, maria());
    assert!(storage.contains(STORAGE_TOKEN_KEY));
    let stored: Identity = serde_json::from_str(&storage.get(STORAGE_USER_KEY).unwrap()).unwrap();
    assert_eq!(stored, maria());
    assert_eq!(store.current_identity(), Some(maria()));
    assert!(store.is_logged_in());
    assert_eq!(*seen.borrow(), vec![Some("Maria".to_string())]);
}

#[test]
fn test_establish_is_all_or_nothing() {
    let (store, storage, _) = create_store();
    storage.fail_writes_to(STORAGE_USER_KEY);
    let seen = record_notifications(&store);

    let result = store.establish(&jwt_response(token_expiring_at(NOW_SECS + 3600)));

    assert!(result.is_err());
    assert!(!storage.contains(STORAGE_TOKEN_KEY));
    assert!(!storage.contains(STORAGE_USER_KEY));
    assert_eq!(store.current_identity(), None);
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_failed_establish_keeps_previous_session() {
    let (store, storage, _) = create_store();
    let first = token_expiring_at(NOW_SECS + 3600);
    store.establish(&jwt_response(first.clone())).unwrap();

    storage.fail_writes_to(STORAGE_USER_KEY);
    let second = token_expiring_at(NOW_SECS + 7200);
    assert!(store.establish(&jwt_response(second)).is_err());

    assert_eq!(storage.get(STORAGE_TOKEN_KEY), Some(first));
    assert_eq!(store.current_identity(), Some(maria()));
}

#[test]
fn test_logout_clears_and_notifies_once() {
    let (store, storage, _) = create_store();
    store
        .establish(&jwt_response(token_expiring_at(NOW_SECS + 3600)))
        .unwrap();
    let seen = record_notifications(&store);

    store.logout();
    store.logout();

    assert!(!storage.contains(STORAGE_TOKEN_KEY));
    assert!(!storage.contains(STORAGE_USER_KEY));
    assert!(!store.is_logged_in());
    assert_eq!(*seen.borrow(), vec![None]);
}

#[test]
fn test_unsubscribed_listener_is_not_called() {
    let (store, _, _) = create_store();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let id = store.subscribe(move |_| counter.set(counter.get() + 1));
    store.unsubscribe(id);

    store
        .establish(&jwt_response(token_expiring_at(NOW_SECS + 3600)))
        .unwrap();

    assert_eq!(calls.get(), 0);
}

// =========================================================
// is_logged_in
// =========================================================

#[test]
fn test_no_token_means_logged_out() {
    let (store, _, _) = create_store();
    assert!(!store.is_logged_in());
    assert_eq!(store.token(), None);
}

#[test]
fn test_expired_token_logs_out_implicitly() {
    let (store, storage, clock) = create_store();
    store
        .establish(&jwt_response(token_expiring_at(NOW_SECS + 60)))
        .unwrap();
    let seen = record_notifications(&store);
    assert!(store.is_logged_in());

    clock.advance(Duration::from_secs(61));

    assert!(!store.is_logged_in());
    assert!(!storage.contains(STORAGE_TOKEN_KEY));
    assert!(!storage.contains(STORAGE_USER_KEY));
    assert_eq!(*seen.borrow(), vec![None]);
}

#[test]
fn test_token_expiring_exactly_now_is_expired() {
    let (store, _, _) = create_store();
    store
        .establish(&jwt_response(token_expiring_at(NOW_SECS)))
        .unwrap();

    assert!(!store.is_logged_in());
}

#[test]
fn test_malformed_tokens_log_out() {
    let not_an_object = format!("h.{}.s", URL_SAFE_NO_PAD.encode("\"nope\""));
    for bad in ["garbage", "a.%%%.c", "a..c", not_an_object.as_str()] {
        let (store, storage, _) = create_store();
        store.establish(&jwt_response(bad.to_string())).unwrap();

        assert!(!store.is_logged_in(), "token {:?} should be rejected", bad);
        assert!(!storage.contains(STORAGE_TOKEN_KEY));
        assert_eq!(store.current_identity(), None);
    }
}

#[test]
fn test_token_without_exp_never_expires() {
    let (store, _, clock) = create_store();
    store
        .establish(&jwt_response(make_token(serde_json::json!({ "sub": "x" }))))
        .unwrap();
    clock.advance(Duration::from_secs(10 * 365 * 24 * 3600));

    assert!(store.is_logged_in());
}

#[test]
fn test_padded_payload_is_accepted() {
    let (store, _, _) = create_store();
    let claims = serde_json::json!({ "exp": NOW_SECS + 100 }).to_string();
    let padded = base64::engine::general_purpose::URL_SAFE.encode(claims);
    store
        .establish(&jwt_response(format!("h.{}.s", padded)))
        .unwrap();

    assert!(store.is_logged_in());
}

// =========================================================
// 恢复 / 其他
// =========================================================

#[test]
fn test_session_is_restored_from_storage() {
    let (store, storage, clock) = create_store();
    store
        .establish(&jwt_response(token_expiring_at(NOW_SECS + 3600)))
        .unwrap();
    drop(store);

    let restored = SessionStore::new(storage, clock);
    assert_eq!(restored.current_identity(), Some(maria()));
    assert!(restored.is_logged_in());
}

#[test]
fn test_unreadable_stored_identity_is_discarded() {
    let storage = MemoryStorage::new();
    storage.set(STORAGE_TOKEN_KEY, &token_expiring_at(NOW_SECS + 3600));
    storage.set(STORAGE_USER_KEY, "{not json");

    let store = SessionStore::new(storage.clone(), FixedClock::at_secs(NOW_SECS));

    assert_eq!(store.current_identity(), None);
    assert!(!storage.contains(STORAGE_TOKEN_KEY));
    assert!(!store.is_logged_in());
}

#[test]
fn test_return_url_is_one_shot() {
    let (store, _, _) = create_store();
    assert_eq!(store.take_return_url(), "/dashboard");

    store.set_return_url("/donations");
    assert_eq!(store.take_return_url(), "/donations");
    assert_eq!(store.take_return_url(), "/dashboard");
}

#[test]
fn test_token_subject_prefers_sub_then_user_id() {
    let (store, _, _) = create_store();
    store
        .establish(&jwt_response(make_token(
            serde_json::json!({ "userId": 42, "exp": NOW_SECS + 60 }),
        )))
        .unwrap();
    assert_eq!(store.token_subject().as_deref(), Some("42"));

    store
        .establish(&jwt_response(token_expiring_at(NOW_SECS + 60)))
        .unwrap();
    assert_eq!(store.token_subject().as_deref(), Some("maria@example.com"));
}

#[test]
fn test_replace_identity_requires_session() {
    let (store, storage, _) = create_store();
    assert!(store.replace_identity(maria()).is_err());

    store
        .establish(&jwt_response(token_expiring_at(NOW_SECS + 3600)))
        .unwrap();
    let seen = record_notifications(&store);
    let renamed = Identity {
        name: "Maria Silva".to_string(),
        ..maria()
    };
    store.replace_identity(renamed.clone()).unwrap();

    assert_eq!(store.current_identity(), Some(renamed));
    assert!(storage.get(STORAGE_USER_KEY).unwrap().contains("Maria Silva"));
    assert_eq!(*seen.borrow(), vec![Some("Maria Silva".to_string())]);
}

// =========================================================
// 路由守卫
// =========================================================

#[test]
fn test_guard_redirects_then_returns_to_destination_after_login() {
    let (store, _, _) = create_store();

    assert_eq!(
        resolve("/create-donation", &store),
        Navigation::Redirect(AppRoute::Login)
    );

    store
        .establish(&jwt_response(token_expiring_at(NOW_SECS + 3600)))
        .unwrap();

    let destination = store.take_return_url();
    assert_eq!(destination, "/create-donation");
    assert_eq!(
        resolve(&destination, &store),
        Navigation::Proceed(AppRoute::CreateDonation)
    );
}

#[test]
fn test_guard_treats_expired_session_as_logged_out() {
    let (store, _, clock) = create_store();
    store
        .establish(&jwt_response(token_expiring_at(NOW_SECS + 10)))
        .unwrap();
    clock.advance(Duration::from_secs(20));

    assert_eq!(resolve("/dashboard", &store), Navigation::Redirect(AppRoute::Login));
    assert_eq!(store.current_identity(), None);
}
