use super::*;
use super::dashboard::{DashboardData, DonationStats, RequestStats};
use crate::error::ApiErrorStatus;
use crate::session::tests::{make_token, token_expiring_at};
use crate::web::clock::FixedClock;
use crate::web::http::MockHttpClient;
use crate::web::route::{AppRoute, Navigation, resolve};
use crate::web::storage::MemoryStorage;
use donamatch_shared::protocol::{DonationFilters, HttpMethod};
use donamatch_shared::{
    Donation, DonationPatch, DonationStatus, Identity, LoginRequest, Match, MatchStatus, RegisterRequest,
    STORAGE_TOKEN_KEY, STORAGE_USER_KEY, UpdateProfileRequest,
};
use serde_json::json;
use std::time::Duration;

// =========================================================
// 辅助函数
// =========================================================

const BASE: &str = "http://localhost:8080/api";
const NOW_SECS: i64 = 1_700_000_000;

type TestClient = ApiClient<MockHttpClient, MemoryStorage, FixedClock>;

struct Harness {
    api: TestClient,
    http: Rc<MockHttpClient>,
    storage: MemoryStorage,
    clock: FixedClock,
}

fn setup() -> Harness {
    let storage = MemoryStorage::new();
    let clock = FixedClock::at_secs(NOW_SECS);
    let session = Rc::new(SessionStore::new(storage.clone(), clock.clone()));
    let http = Rc::new(MockHttpClient::new());
    let api = ApiClient::new(&AppConfig::with_base_url(BASE), http.clone(), session);
    Harness {
        api,
        http,
        storage,
        clock,
    }
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

fn credentials() -> LoginRequest {
    LoginRequest {
        email: "maria@example.com".to_string(),
        password: "segredo".to_string(),
    }
}

fn mock_login(h: &Harness, token: &str) {
    h.http.mock_response(
        HttpMethod::Post,
        &url("/auth/login"),
        200,
        json!({
            "token": token,
            "type": "Bearer",
            "user": { "id": 2, "name": "Maria", "email": "maria@example.com" }
        }),
    );
}

async fn logged_in() -> Harness {
    let h = setup();
    mock_login(&h, &token_expiring_at(NOW_SECS + 3600));
    h.api.login(&credentials()).await.unwrap();
    h
}

fn bearer(h: &Harness) -> String {
    format!("Bearer {}", h.storage.get(STORAGE_TOKEN_KEY).unwrap())
}

fn sample_match(id: i64, status: MatchStatus) -> Match {
    Match {
        id,
        status,
        ..Default::default()
    }
}

// =========================================================
// 认证头
// =========================================================

#[tokio::test]
async fn test_login_never_carries_authorization() {
    let h = logged_in().await;

    // 已登录时再次登录也不附加令牌
    mock_login(&h, &token_expiring_at(NOW_SECS + 7200));
    h.api.login(&credentials()).await.unwrap();

    for request in h.http.requests.borrow().iter() {
        assert!(!request.headers.contains_key("Authorization"));
    }
    let last = h.http.last_request().unwrap();
    assert_eq!(last.method, HttpMethod::Post);
    assert_eq!(
        last.body.as_deref(),
        Some(r#"{"email":"maria@example.com","password":"segredo"}"#)
    );
    assert_eq!(
        last.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
}

#[tokio::test]
async fn test_register_never_carries_authorization() {
    let h = logged_in().await;
    h.http.mock_response(
        HttpMethod::Post,
        &url("/auth/register"),
        201,
        json!({ "id": 9, "name": "João", "email": "joao@example.com" }),
    );

    let identity = h
        .api
        .register(&RegisterRequest {
            name: "João".to_string(),
            email: "joao@example.com".to_string(),
            password: "123456".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(identity.id, 9);
    assert!(!h.http.last_request().unwrap().headers.contains_key("Authorization"));
    // 注册不改变当前会话
    assert_eq!(h.api.session().current_identity().map(|i| i.id), Some(2));
}

#[tokio::test]
async fn test_authenticated_requests_carry_bearer_token() {
    let h = logged_in().await;
    h.http
        .mock_response(HttpMethod::Get, &url("/donations/my"), 200, json!([]));

    h.api.my_donations().await.unwrap();

    let last = h.http.last_request().unwrap();
    assert_eq!(last.url, url("/donations/my"));
    assert_eq!(last.headers.get("Authorization"), Some(&bearer(&h)));
}

#[tokio::test]
async fn test_anonymous_requests_are_sent_without_header() {
    let h = setup();
    h.http.mock_response(
        HttpMethod::Get,
        &url("/donations/5"),
        200,
        json!({ "id": 5, "title": "Mesa" }),
    );

    let donation = h.api.get_donation(5).await.unwrap();

    assert_eq!(donation.title, "Mesa");
    assert!(!h.http.last_request().unwrap().headers.contains_key("Authorization"));
}

#[tokio::test]
async fn test_expired_session_is_cleared_instead_of_sent() {
    let h = logged_in().await;
    h.clock.advance(Duration::from_secs(3601));
    h.http
        .mock_response(HttpMethod::Get, &url("/matches/my-requests"), 200, json!([]));

    h.api.my_requests().await.unwrap();

    assert!(!h.http.last_request().unwrap().headers.contains_key("Authorization"));
    assert!(!h.storage.contains(STORAGE_TOKEN_KEY));
    assert_eq!(h.api.session().current_identity(), None);
}

// =========================================================
// 错误传播
// =========================================================

#[tokio::test]
async fn test_unauthorized_propagates_without_retry() {
    let h = logged_in().await;
    h.http.mock_raw(HttpMethod::Get, &url("/users/profile"), 401, "");
    let before = h.http.request_count();

    let err = h.api.get_profile().await.unwrap_err();

    assert_eq!(err.status, ApiErrorStatus::Unauthorized);
    assert_eq!(h.http.request_count(), before + 1);
    // 是否注销由视图决定
    assert!(h.api.session().is_logged_in());
}

#[tokio::test]
async fn test_server_message_is_surfaced() {
    let h = logged_in().await;
    let donation = Donation {
        id: 12,
        title: "Bicicleta".to_string(),
        ..Default::default()
    };
    h.http.mock_response(
        HttpMethod::Post,
        &url("/matches?donationId=12"),
        400,
        json!({ "message": "Você já solicitou esta doação" }),
    );

    let err = h.api.request_donation(&donation).await.unwrap_err();

    assert_eq!(err.server_message(), Some("Você já solicitou esta doação"));
    let sent = h.http.last_request().unwrap();
    assert_eq!(
        sent.body.as_deref(),
        Some(r#"{"message":"Olá! Tenho interesse em receber a doação: Bicicleta"}"#)
    );
}

#[tokio::test]
async fn test_failed_login_leaves_session_untouched() {
    let h = setup();
    h.http.mock_response(
        HttpMethod::Post,
        &url("/auth/login"),
        401,
        json!({ "message": "Bad credentials" }),
    );

    let err = h.api.login(&credentials()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!h.storage.contains(STORAGE_TOKEN_KEY));
    assert!(!h.api.session().is_logged_in());
}

#[tokio::test]
async fn test_network_failure_is_reported() {
    let h = setup();
    h.http.go_offline();

    let err = h.api.list_donations(DonationFilters::browse(0, 10)).await.unwrap_err();

    assert_eq!(err.status, ApiErrorStatus::Network);
    assert_eq!(err.spans()[0].operation, "api.send");
}

#[tokio::test]
async fn test_unparseable_success_body_is_serialization_error() {
    let h = setup();
    h.http
        .mock_raw(HttpMethod::Get, &url("/donations/1"), 200, "<html></html>");

    let err = h.api.get_donation(1).await.unwrap_err();

    assert_eq!(err.status, ApiErrorStatus::Serialization);
}

// =========================================================
// 领域服务
// =========================================================

#[tokio::test]
async fn test_list_donations_builds_query() {
    let h = setup();
    let expected = url("/donations?status=AVAILABLE&search=mesa+azul&page=0&size=10&sortBy=createdAt&sortDir=desc");
    h.http.mock_response(
        HttpMethod::Get,
        &expected,
        200,
        json!({
            "content": [{ "id": 1, "title": "Mesa azul", "status": "AVAILABLE" }],
            "totalElements": 1,
            "totalPages": 1,
            "size": 10,
            "number": 0
        }),
    );

    let mut filters = DonationFilters::browse(0, 10);
    filters.search = "mesa azul".to_string();
    let page = h.api.list_donations(filters).await.unwrap();

    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].status, DonationStatus::Available);
}

#[tokio::test]
async fn test_list_donations_omits_empty_filters() {
    let h = setup();
    let expected = url("/donations?category=Livros&page=0&size=10");
    h.http.mock_response(HttpMethod::Get, &expected, 200, json!({ "content": [] }));

    let filters = DonationFilters {
        category: "Livros".to_string(),
        page: Some(0),
        size: Some(10),
        ..Default::default()
    };
    let page = h.api.list_donations(filters).await.unwrap();

    assert!(page.content.is_empty());
    assert_eq!(h.http.last_request().unwrap().url, expected);
}

#[tokio::test]
async fn test_login_stores_token_and_minimal_user() {
    let h = setup();
    let token = token_expiring_at(NOW_SECS + 3600);
    h.http.mock_response(
        HttpMethod::Post,
        &url("/auth/login"),
        200,
        json!({ "token": token, "type": "Bearer", "user": { "id": 1, "name": "A" } }),
    );

    let identity = h
        .api
        .login(&LoginRequest {
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(identity.id, 1);
    assert_eq!(identity.name, "A");
    assert_eq!(h.storage.get(STORAGE_TOKEN_KEY), Some(token));
    assert!(h.storage.contains(STORAGE_USER_KEY));
    assert!(h.api.session().is_logged_in());
}

#[tokio::test]
async fn test_update_donation_sends_only_changed_fields() {
    let h = logged_in().await;
    h.http.mock_response(
        HttpMethod::Put,
        &url("/donations/7"),
        200,
        json!({ "id": 7, "title": "Mesa de jantar", "quantity": 2, "status": "AVAILABLE" }),
    );

    let patch = DonationPatch {
        title: Some("Mesa de jantar".to_string()),
        quantity: Some(2),
        ..Default::default()
    };
    let updated = h.api.update_donation(7, patch).await.unwrap();

    assert_eq!(updated.title, "Mesa de jantar");
    let sent = h.http.last_request().unwrap();
    assert_eq!(sent.method, HttpMethod::Put);
    assert_eq!(sent.body.as_deref(), Some(r#"{"title":"Mesa de jantar","quantity":2}"#));
    assert_eq!(sent.headers.get("Authorization"), Some(&bearer(&h)));
}

#[tokio::test]
async fn test_get_match_fetches_single_match() {
    let h = logged_in().await;
    h.http.mock_response(
        HttpMethod::Get,
        &url("/matches/31"),
        200,
        json!({
            "id": 31,
            "status": "IN_PROGRESS",
            "donation": { "id": 3, "title": "Livros de história" },
            "pickupNotes": "Portaria"
        }),
    );

    let m = h.api.get_match(31).await.unwrap();

    assert_eq!(m.status, MatchStatus::InProgress);
    assert_eq!(m.donation_title(), "Livros de história");
    assert_eq!(m.pickup_notes.as_deref(), Some("Portaria"));
    assert_eq!(h.http.last_request().unwrap().method, HttpMethod::Get);
}

#[tokio::test]
async fn test_delete_donation_accepts_empty_body() {
    let h = logged_in().await;
    h.http.mock_raw(HttpMethod::Delete, &url("/donations/3"), 204, "");

    h.api.delete_donation(3).await.unwrap();

    assert_eq!(h.http.last_request().unwrap().method, HttpMethod::Delete);
}

#[tokio::test]
async fn test_illegal_transition_is_never_sent() {
    let h = logged_in().await;
    let before = h.http.request_count();

    let err = h
        .api
        .update_match_status(&sample_match(4, MatchStatus::Pending), MatchStatus::Completed, None)
        .await
        .unwrap_err();

    assert_eq!(err.status, ApiErrorStatus::Validation);
    assert_eq!(h.http.request_count(), before);
}

#[tokio::test]
async fn test_legal_transition_is_sent_with_notes() {
    let h = logged_in().await;
    h.http.mock_response(
        HttpMethod::Put,
        &url("/matches/4/status"),
        200,
        json!({ "id": 4, "status": "APPROVED" }),
    );

    let updated = h
        .api
        .update_match_status(
            &sample_match(4, MatchStatus::Pending),
            MatchStatus::Approved,
            Some("Pode retirar amanhã".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(updated.status, MatchStatus::Approved);
    assert_eq!(
        h.http.last_request().unwrap().body.as_deref(),
        Some(r#"{"status":"APPROVED","notes":"Pode retirar amanhã"}"#)
    );
}

#[tokio::test]
async fn test_update_profile_replaces_session_identity() {
    let h = logged_in().await;
    h.http.mock_response(
        HttpMethod::Put,
        &url("/users/profile"),
        200,
        json!({ "id": 2, "name": "Maria Silva", "email": "maria@example.com", "city": "Recife" }),
    );

    let identity = h
        .api
        .update_profile(&UpdateProfileRequest {
            name: Some("Maria Silva".to_string()),
            city: Some("Recife".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(identity.city.as_deref(), Some("Recife"));
    assert_eq!(
        h.api.session().current_identity().map(|i| i.name),
        Some("Maria Silva".to_string())
    );
}

// =========================================================
// 面板
// =========================================================

#[tokio::test]
async fn test_dashboard_loads_all_parts() {
    let h = logged_in().await;
    h.http.mock_response(
        HttpMethod::Get,
        &url("/donations/my"),
        200,
        json!([
            { "id": 1, "title": "A", "status": "AVAILABLE" },
            { "id": 2, "title": "B", "status": "COMPLETED" },
            { "id": 3, "title": "C", "status": "PENDING" }
        ]),
    );
    h.http.mock_response(
        HttpMethod::Get,
        &url("/matches/received"),
        200,
        json!([{ "id": 10, "status": "PENDING" }, { "id": 11, "status": "APPROVED" }]),
    );
    h.http.mock_response(
        HttpMethod::Get,
        &url("/matches/my-requests"),
        200,
        json!([{ "id": 20, "status": "COMPLETED" }]),
    );

    let data = h.api.load_dashboard().await;

    assert_eq!(data.failure_count(), 0);
    assert_eq!(
        data.donation_stats(),
        DonationStats {
            total: 3,
            available: 1,
            completed: 1,
            pending: 1
        }
    );
    assert_eq!(
        data.request_stats(),
        RequestStats {
            total: 2,
            pending: 1,
            approved: 1
        }
    );
    assert_eq!(data.my_requests.len(), 1);
}

#[tokio::test]
async fn test_dashboard_failure_of_one_part_keeps_others() {
    let h = logged_in().await;
    h.http
        .mock_response(HttpMethod::Get, &url("/donations/my"), 200, json!([{ "id": 1, "title": "A" }]));
    h.http.mock_raw(HttpMethod::Get, &url("/matches/received"), 500, "");
    h.http
        .mock_response(HttpMethod::Get, &url("/matches/my-requests"), 200, json!([]));

    let data = h.api.load_dashboard().await;

    assert_eq!(data.failure_count(), 1);
    assert!(!data.session_expired());
    assert_eq!(data.my_donations.len(), 1);
    assert!(data.received_requests.is_empty());
}

#[tokio::test]
async fn test_dashboard_detects_expired_session() {
    let h = logged_in().await;
    for path in ["/donations/my", "/matches/received", "/matches/my-requests"] {
        h.http.mock_raw(HttpMethod::Get, &url(path), 401, "");
    }

    let data = h.api.load_dashboard().await;

    assert_eq!(data.failure_count(), 3);
    assert!(data.session_expired());
}

#[test]
fn test_dashboard_replaces_updated_match() {
    let mut data = DashboardData {
        received_requests: vec![sample_match(1, MatchStatus::Pending), sample_match(2, MatchStatus::Pending)],
        ..Default::default()
    };

    data.replace_match(&sample_match(2, MatchStatus::Approved));
    data.remove_donation(99);

    assert_eq!(data.received_requests[0].status, MatchStatus::Pending);
    assert_eq!(data.received_requests[1].status, MatchStatus::Approved);
}

#[test]
fn test_dashboard_replaces_edited_donation() {
    let mut data = DashboardData {
        my_donations: vec![
            Donation { id: 4, title: "Mesa".to_string(), ..Default::default() },
            Donation { id: 5, title: "Sofá".to_string(), ..Default::default() },
        ],
        ..Default::default()
    };

    data.replace_donation(&Donation { id: 5, title: "Sofá retrátil".to_string(), ..Default::default() });

    assert_eq!(data.my_donations[0].title, "Mesa");
    assert_eq!(data.my_donations[1].title, "Sofá retrátil");
}

#[tokio::test]
async fn test_activity_lists_my_requests_before_received() {
    let h = logged_in().await;
    h.http
        .mock_response(HttpMethod::Get, &url("/donations/my"), 200, json!([]));
    h.http.mock_response(
        HttpMethod::Get,
        &url("/matches/my-requests"),
        200,
        json!([{ "id": 1 }]),
    );
    h.http.mock_response(
        HttpMethod::Get,
        &url("/matches/received"),
        200,
        json!([{ "id": 2 }]),
    );

    let activity = h.api.load_activity().await;

    assert!(activity.my_donations.is_empty());
    assert!(activity.failures.is_empty());
    let ids: Vec<i64> = activity.matches.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_activity_keeps_my_requests_when_received_fails() {
    let h = logged_in().await;
    h.http.mock_response(
        HttpMethod::Get,
        &url("/donations/my"),
        200,
        json!([{ "id": 4, "title": "Cadeira" }]),
    );
    h.http.mock_response(
        HttpMethod::Get,
        &url("/matches/my-requests"),
        200,
        json!([{ "id": 1 }]),
    );
    h.http.mock_raw(HttpMethod::Get, &url("/matches/received"), 500, "");

    let activity = h.api.load_activity().await;

    assert_eq!(activity.my_donations.len(), 1);
    let ids: Vec<i64> = activity.matches.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(activity.failures.len(), 1);
    assert_eq!(activity.failures[0].status, ApiErrorStatus::Server);
    assert!(!activity.session_expired());
}

// =========================================================
// 端到端：未登录时请求捐赠
// =========================================================

#[tokio::test]
async fn test_request_while_logged_out_returns_to_donations_after_login() {
    let h = setup();

    // 浏览页发现未登录：记录当前页并跳转登录
    assert!(!h.api.session().is_logged_in());
    h.api.session().set_return_url(AppRoute::Donations.to_path());

    mock_login(&h, &token_expiring_at(NOW_SECS + 3600));
    let identity: Identity = h.api.login(&credentials()).await.unwrap();
    assert_eq!(identity.name, "Maria");

    let destination = h.api.session().take_return_url();
    assert_eq!(destination, "/donations");
    assert_eq!(
        resolve(&destination, h.api.session()),
        Navigation::Proceed(AppRoute::Donations)
    );
    // 一次性
    assert_eq!(h.api.session().take_return_url(), "/dashboard");
}

#[tokio::test]
async fn test_token_subject_is_readable_after_login() {
    let h = setup();
    mock_login(&h, &make_token(json!({ "sub": "maria@example.com", "exp": NOW_SECS + 60 })));
    h.api.login(&credentials()).await.unwrap();

    assert_eq!(
        h.api.session().token_subject().as_deref(),
        Some("maria@example.com")
    );
}
