//! 领域服务：每个后端端点一个方法

use donamatch_shared::protocol::{
    DeleteDonationRequest, DonationFilters, GetDonationRequest, GetMatchRequest, GetProfileRequest,
    ListDonationsRequest, MyDonationsRequest, MyRequestsRequest, ReceivedRequestsRequest,
    RequestDonationRequest, UpdateDonationRequest, UpdateMatchStatus,
};
use donamatch_shared::{
    Donation, DonationPatch, DonationRequest, Identity, LoginRequest, Match, MatchRequest,
    MatchStatus, PageResponse, RegisterRequest, UpdateProfileRequest,
};
use leptos::logging::log;

use super::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::web::clock::Clock;
use crate::web::http::HttpClient;
use crate::web::storage::KeyValueStore;

impl<H, S, C> ApiClient<H, S, C>
where
    H: HttpClient,
    S: KeyValueStore,
    C: Clock,
{
    // =========================================================
    // Auth
    // =========================================================

    /// 登录并建立会话
    ///
    /// 失败时会话保持不变。
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<Identity> {
        let response = self
            .send(credentials)
            .await
            .map_err(|e| e.in_op("auth.login"))?;
        self.session().establish(&response)
    }

    /// 注册新账号（不会自动登录）
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<Identity> {
        let identity = self
            .send(request)
            .await
            .map_err(|e| e.in_op("auth.register"))?;
        log!("[Api] Registered user {}", identity.id);
        Ok(identity)
    }

    // =========================================================
    // Donations
    // =========================================================

    pub async fn list_donations(&self, filters: DonationFilters) -> ApiResult<PageResponse<Donation>> {
        self.send(&ListDonationsRequest { filters }).await
    }

    pub async fn get_donation(&self, id: i64) -> ApiResult<Donation> {
        self.send(&GetDonationRequest { id }).await
    }

    pub async fn create_donation(&self, request: &DonationRequest) -> ApiResult<Donation> {
        self.send(request).await
    }

    pub async fn update_donation(&self, id: i64, patch: DonationPatch) -> ApiResult<Donation> {
        self.send(&UpdateDonationRequest { id, patch }).await
    }

    pub async fn delete_donation(&self, id: i64) -> ApiResult<()> {
        self.send(&DeleteDonationRequest { id }).await
    }

    pub async fn my_donations(&self) -> ApiResult<Vec<Donation>> {
        self.send(&MyDonationsRequest).await
    }

    // =========================================================
    // Matches
    // =========================================================

    /// 请求一项捐赠，留言为默认的感兴趣消息
    pub async fn request_donation(&self, donation: &Donation) -> ApiResult<Match> {
        self.send(&RequestDonationRequest {
            donation_id: donation.id,
            request: MatchRequest::interested_in(donation),
        })
        .await
    }

    pub async fn my_requests(&self) -> ApiResult<Vec<Match>> {
        self.send(&MyRequestsRequest).await
    }

    pub async fn received_requests(&self) -> ApiResult<Vec<Match>> {
        self.send(&ReceivedRequestsRequest).await
    }

    pub async fn get_match(&self, id: i64) -> ApiResult<Match> {
        self.send(&GetMatchRequest { id }).await
    }

    /// 推进匹配状态
    ///
    /// 非法迁移在本地被拒绝，不会发出请求。
    pub async fn update_match_status(
        &self,
        current: &Match,
        to: MatchStatus,
        notes: Option<String>,
    ) -> ApiResult<Match> {
        let request = UpdateMatchStatus::transition(current, to, notes)
            .map_err(|e| ApiError::from(e).in_op_with("matches.update_status", current.id.to_string()))?;
        self.send(&request).await
    }

    // =========================================================
    // Users
    // =========================================================

    pub async fn get_profile(&self) -> ApiResult<Identity> {
        self.send(&GetProfileRequest).await
    }

    /// 更新资料，成功后替换会话中的身份
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ApiResult<Identity> {
        let identity = self.send(request).await?;
        self.session()
            .replace_identity(identity.clone())
            .map_err(|e| e.in_op("users.update_profile"))?;
        Ok(identity)
    }
}
