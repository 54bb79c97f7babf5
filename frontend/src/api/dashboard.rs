//! 面板数据加载
//!
//! 三个列表并发请求，全部结束后一起返回；任一失败不影响其他部分。
//! 丢弃返回的 future 即取消全部三个请求。

use donamatch_shared::{Donation, DonationStatus, Match, MatchStatus};
use futures::future::join3;

use super::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::web::clock::Clock;
use crate::web::http::HttpClient;
use crate::web::storage::KeyValueStore;

/// 面板的三部分数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub my_donations: Vec<Donation>,
    pub received_requests: Vec<Match>,
    pub my_requests: Vec<Match>,
    /// 每个失败部分一条
    pub failures: Vec<ApiError>,
}

impl DashboardData {
    fn collect(
        my_donations: ApiResult<Vec<Donation>>,
        received_requests: ApiResult<Vec<Match>>,
        my_requests: ApiResult<Vec<Match>>,
    ) -> Self {
        let mut data = Self::default();
        match my_donations {
            Ok(v) => data.my_donations = v,
            Err(e) => data.failures.push(e.in_op("dashboard.my_donations")),
        }
        match received_requests {
            Ok(v) => data.received_requests = v,
            Err(e) => data.failures.push(e.in_op("dashboard.received_requests")),
        }
        match my_requests {
            Ok(v) => data.my_requests = v,
            Err(e) => data.failures.push(e.in_op("dashboard.my_requests")),
        }
        data
    }

    /// 是否有部分因会话失效而失败
    pub fn session_expired(&self) -> bool {
        self.failures.iter().any(ApiError::is_unauthorized)
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn donation_stats(&self) -> DonationStats {
        DonationStats::of(&self.my_donations)
    }

    pub fn request_stats(&self) -> RequestStats {
        RequestStats::of(&self.received_requests)
    }

    /// 用服务器返回的新版本替换本地的匹配记录
    pub fn replace_match(&mut self, updated: &Match) {
        for list in [&mut self.received_requests, &mut self.my_requests] {
            if let Some(slot) = list.iter_mut().find(|m| m.id == updated.id) {
                *slot = updated.clone();
            }
        }
    }

    pub fn replace_donation(&mut self, updated: &Donation) {
        for d in self.my_donations.iter_mut().filter(|d| d.id == updated.id) {
            *d = updated.clone();
        }
    }

    pub fn remove_donation(&mut self, id: i64) {
        self.my_donations.retain(|d| d.id != id);
    }
}

/// 个人资料页的活动记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileActivity {
    pub my_donations: Vec<Donation>,
    /// 我发出的请求在前，收到的请求在后
    pub matches: Vec<Match>,
    pub failures: Vec<ApiError>,
}

impl ProfileActivity {
    fn collect(
        my_donations: ApiResult<Vec<Donation>>,
        my_requests: ApiResult<Vec<Match>>,
        received_requests: ApiResult<Vec<Match>>,
    ) -> Self {
        let mut activity = Self::default();
        match my_donations {
            Ok(v) => activity.my_donations = v,
            Err(e) => activity.failures.push(e.in_op("profile.my_donations")),
        }
        for (part, result) in [
            ("profile.my_requests", my_requests),
            ("profile.received_requests", received_requests),
        ] {
            match result {
                Ok(v) => activity.matches.extend(v),
                Err(e) => activity.failures.push(e.in_op(part)),
            }
        }
        activity
    }

    pub fn session_expired(&self) -> bool {
        self.failures.iter().any(ApiError::is_unauthorized)
    }
}

/// "我的捐赠"统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DonationStats {
    pub total: usize,
    pub available: usize,
    pub completed: usize,
    pub pending: usize,
}

impl DonationStats {
    pub fn of(donations: &[Donation]) -> Self {
        Self {
            total: donations.len(),
            available: donations
                .iter()
                .filter(|d| d.status == DonationStatus::Available)
                .count(),
            completed: donations
                .iter()
                .filter(|d| d.status == DonationStatus::Completed)
                .count(),
            pending: donations
                .iter()
                .filter(|d| d.status == DonationStatus::Pending)
                .count(),
        }
    }
}

/// "收到的请求"统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
}

impl RequestStats {
    pub fn of(matches: &[Match]) -> Self {
        Self {
            total: matches.len(),
            pending: matches
                .iter()
                .filter(|m| m.status == MatchStatus::Pending)
                .count(),
            approved: matches
                .iter()
                .filter(|m| m.status == MatchStatus::Approved)
                .count(),
        }
    }
}

impl<H, S, C> ApiClient<H, S, C>
where
    H: HttpClient,
    S: KeyValueStore,
    C: Clock,
{
    /// 并发加载面板的三个列表
    pub async fn load_dashboard(&self) -> DashboardData {
        let (my_donations, received_requests, my_requests) = join3(
            self.my_donations(),
            self.received_requests(),
            self.my_requests(),
        )
        .await;
        DashboardData::collect(my_donations, received_requests, my_requests)
    }

    /// 个人资料页的活动记录：我的捐赠，以及我发出的请求在前、收到的请求在后的合并列表
    ///
    /// 与面板相同，某一部分失败时保留其余部分。
    pub async fn load_activity(&self) -> ProfileActivity {
        let (my_donations, my_requests, received_requests) = join3(
            self.my_donations(),
            self.my_requests(),
            self.received_requests(),
        )
        .await;
        ProfileActivity::collect(my_donations, my_requests, received_requests)
    }
}
