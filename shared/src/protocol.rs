use crate::{
    Donation, DonationPatch, DonationRequest, DonationStatus, Identity, JwtResponse, LoginRequest,
    Match, MatchRequest, MatchStatus, PageResponse, RegisterRequest, TransitionError,
    UpdateMatchStatusRequest, UpdateProfileRequest,
};
use serde::{Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// The URL path, relative to the API base URL.
    fn path(&self) -> String;

    /// Query pairs appended to the URL.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// JSON body, if any.
    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        Ok(None)
    }

    /// Parse a successful response body.
    fn parse_response(body: &str) -> Result<Self::Response, serde_json::Error> {
        serde_json::from_str(body)
    }
}

fn json_body<T: Serialize>(value: &T) -> Result<Option<String>, serde_json::Error> {
    serde_json::to_string(value).map(Some)
}

// =========================================================
// Auth
// =========================================================

impl ApiRequest for LoginRequest {
    type Response = JwtResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        crate::AUTH_LOGIN_PATH.to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }
}

impl ApiRequest for RegisterRequest {
    type Response = Identity;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        crate::AUTH_REGISTER_PATH.to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }
}

// =========================================================
// Donations
// =========================================================

/// 捐赠列表过滤条件
///
/// 空字符串的过滤项不会出现在查询串中。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationFilters {
    pub category: String,
    pub city: String,
    pub state: String,
    pub status: Option<DonationStatus>,
    pub search: String,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: String,
    pub sort_dir: String,
}

impl DonationFilters {
    /// 浏览页面使用的过滤条件：只看可用的捐赠，按创建时间倒序
    pub fn browse(page: u32, size: u32) -> Self {
        Self {
            status: Some(DonationStatus::Available),
            page: Some(page),
            size: Some(size),
            sort_by: "createdAt".to_string(),
            sort_dir: "desc".to_string(),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        push_non_empty(&mut pairs, "category", &self.category);
        push_non_empty(&mut pairs, "city", &self.city);
        push_non_empty(&mut pairs, "state", &self.state);
        if let Some(status) = self.status {
            push_non_empty(&mut pairs, "status", status.as_str());
        }
        push_non_empty(&mut pairs, "search", &self.search);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        push_non_empty(&mut pairs, "sortBy", &self.sort_by);
        push_non_empty(&mut pairs, "sortDir", &self.sort_dir);
        pairs
    }
}

fn push_non_empty(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        pairs.push((key, value.to_string()));
    }
}

/// GET /donations
#[derive(Debug, Clone, Default)]
pub struct ListDonationsRequest {
    pub filters: DonationFilters,
}

impl ApiRequest for ListDonationsRequest {
    type Response = PageResponse<Donation>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/donations".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.filters.to_query()
    }
}

/// GET /donations/{id}
#[derive(Debug, Clone, Copy)]
pub struct GetDonationRequest {
    pub id: i64,
}

impl ApiRequest for GetDonationRequest {
    type Response = Donation;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/donations/{}", self.id)
    }
}

/// POST /donations
impl ApiRequest for DonationRequest {
    type Response = Donation;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/donations".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }
}

/// PUT /donations/{id}
#[derive(Debug, Clone)]
pub struct UpdateDonationRequest {
    pub id: i64,
    pub patch: DonationPatch,
}

impl ApiRequest for UpdateDonationRequest {
    type Response = Donation;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/donations/{}", self.id)
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(&self.patch)
    }
}

/// DELETE /donations/{id}
#[derive(Debug, Clone, Copy)]
pub struct DeleteDonationRequest {
    pub id: i64,
}

impl ApiRequest for DeleteDonationRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/donations/{}", self.id)
    }

    // 成功时响应体为空
    fn parse_response(_body: &str) -> Result<(), serde_json::Error> {
        Ok(())
    }
}

/// GET /donations/my
#[derive(Debug, Clone, Copy, Default)]
pub struct MyDonationsRequest;

impl ApiRequest for MyDonationsRequest {
    type Response = Vec<Donation>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/donations/my".to_string()
    }
}

// =========================================================
// Matches
// =========================================================

/// POST /matches?donationId={id}
#[derive(Debug, Clone)]
pub struct RequestDonationRequest {
    pub donation_id: i64,
    pub request: MatchRequest,
}

impl ApiRequest for RequestDonationRequest {
    type Response = Match;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/matches".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("donationId", self.donation_id.to_string())]
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(&self.request)
    }
}

/// GET /matches/my-requests
#[derive(Debug, Clone, Copy, Default)]
pub struct MyRequestsRequest;

impl ApiRequest for MyRequestsRequest {
    type Response = Vec<Match>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/matches/my-requests".to_string()
    }
}

/// GET /matches/received
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceivedRequestsRequest;

impl ApiRequest for ReceivedRequestsRequest {
    type Response = Vec<Match>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/matches/received".to_string()
    }
}

/// GET /matches/{id}
#[derive(Debug, Clone, Copy)]
pub struct GetMatchRequest {
    pub id: i64,
}

impl ApiRequest for GetMatchRequest {
    type Response = Match;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/matches/{}", self.id)
    }
}

/// PUT /matches/{id}/status
///
/// 只能通过 [`UpdateMatchStatus::transition`] 构造，非法迁移在发送前即被拒绝。
#[derive(Debug, Clone)]
pub struct UpdateMatchStatus {
    match_id: i64,
    request: UpdateMatchStatusRequest,
}

impl UpdateMatchStatus {
    pub fn transition(
        current: &Match,
        to: MatchStatus,
        notes: Option<String>,
    ) -> Result<Self, TransitionError> {
        current.status.validate_transition(to)?;
        Ok(Self {
            match_id: current.id,
            request: UpdateMatchStatusRequest::new(to, notes),
        })
    }

    pub fn match_id(&self) -> i64 {
        self.match_id
    }

    pub fn target(&self) -> MatchStatus {
        self.request.status
    }
}

impl ApiRequest for UpdateMatchStatus {
    type Response = Match;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/matches/{}/status", self.match_id)
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(&self.request)
    }
}

// =========================================================
// Users
// =========================================================

/// GET /users/profile
#[derive(Debug, Clone, Copy, Default)]
pub struct GetProfileRequest;

impl ApiRequest for GetProfileRequest {
    type Response = Identity;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/users/profile".to_string()
    }
}

/// PUT /users/profile
impl ApiRequest for UpdateProfileRequest {
    type Response = Identity;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        "/users/profile".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_are_omitted_from_query() {
        let filters = DonationFilters {
            category: "Livros".to_string(),
            page: Some(0),
            size: Some(10),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("category", "Livros".to_string()),
                ("page", "0".to_string()),
                ("size", "10".to_string()),
            ]
        );
    }

    #[test]
    fn browse_filters_force_available_and_sorting() {
        let mut filters = DonationFilters::browse(2, 10);
        filters.city = "  ".to_string();
        filters.search = "mesa".to_string();

        let query = filters.to_query();
        assert!(query.contains(&("status", "AVAILABLE".to_string())));
        assert!(query.contains(&("search", "mesa".to_string())));
        assert!(query.contains(&("sortBy", "createdAt".to_string())));
        assert!(query.contains(&("sortDir", "desc".to_string())));
        assert!(query.contains(&("page", "2".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "city"));
    }

    #[test]
    fn update_match_status_rejects_illegal_transitions() {
        let pending = Match {
            id: 4,
            status: MatchStatus::Pending,
            ..Default::default()
        };
        let req = UpdateMatchStatus::transition(&pending, MatchStatus::Approved, None).unwrap();
        assert_eq!(req.path(), "/matches/4/status");
        assert_eq!(req.body().unwrap().unwrap(), r#"{"status":"APPROVED"}"#);

        let err = UpdateMatchStatus::transition(&pending, MatchStatus::Completed, None).unwrap_err();
        assert_eq!(err.from, MatchStatus::Pending);
    }

    #[test]
    fn delete_accepts_empty_body() {
        assert!(DeleteDonationRequest::parse_response("").is_ok());
    }

    #[test]
    fn request_donation_targets_donation_query() {
        let req = RequestDonationRequest {
            donation_id: 12,
            request: MatchRequest {
                message: Some("Oi".into()),
            },
        };
        assert_eq!(req.path(), "/matches");
        assert_eq!(req.query(), vec![("donationId", "12".to_string())]);
        assert_eq!(req.body().unwrap().unwrap(), r#"{"message":"Oi"}"#);
    }
}
