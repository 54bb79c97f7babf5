use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod date;
pub mod protocol;
pub mod status;

pub use status::{DonationStatus, MatchActor, MatchStatus, StatusDisplay, StatusTone, TransitionError};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// LocalStorage 中保存令牌的键
pub const STORAGE_TOKEN_KEY: &str = "token";
/// LocalStorage 中保存序列化身份的键
pub const STORAGE_USER_KEY: &str = "user";

pub const AUTH_LOGIN_PATH: &str = "/auth/login";
pub const AUTH_REGISTER_PATH: &str = "/auth/register";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer";

/// 登录后默认跳转的页面
pub const DEFAULT_RETURN_URL: &str = "/dashboard";

/// 捐赠列表默认分页大小
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 判断请求路径是否指向认证端点（登录/注册）
///
/// 认证端点永远不附加令牌。
pub fn is_auth_endpoint(path: &str) -> bool {
    path.contains(AUTH_LOGIN_PATH) || path.contains(AUTH_REGISTER_PATH)
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 用户身份
///
/// 由后端在注册时创建，客户端只读取并缓存。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Identity {
    /// 名字的首字母（导航栏头像使用）
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// 登录响应：令牌 + 身份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: String,
    pub user: Identity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// 捐赠物品
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub status: DonationStatus,
    #[serde(default)]
    pub image_urls: Option<String>,
    #[serde(default)]
    pub pickup_instructions: Option<String>,
    #[serde(default)]
    pub expires_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub donor: Option<Identity>,
}

fn default_quantity() -> u32 {
    1
}

impl Donation {
    /// "城市 - 州" 形式的位置描述，缺失部分被省略
    pub fn place(&self) -> Option<String> {
        match (self.city.as_deref(), self.state.as_deref()) {
            (Some(city), Some(state)) if !city.is_empty() && !state.is_empty() => {
                Some(format!("{} - {}", city, state))
            }
            (Some(city), _) if !city.is_empty() => Some(city.to_string()),
            (_, Some(state)) if !state.is_empty() => Some(state.to_string()),
            _ => self.location.clone().filter(|l| !l.is_empty()),
        }
    }

    /// 只有 AVAILABLE 状态的捐赠可被所有者编辑或删除
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }
}

/// 创建捐赠的请求体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDateTime>,
}

/// 部分更新捐赠（PUT /donations/{id}），未设置的字段不会被发送
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDateTime>,
}

/// 捐赠请求（匹配）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub donation: Option<Donation>,
    #[serde(default)]
    pub requester: Option<Identity>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub requested_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub responded_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub pickup_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub pickup_notes: Option<String>,
    #[serde(default)]
    pub donor_notes: Option<String>,
    #[serde(default)]
    pub requester_rating: Option<u8>,
    #[serde(default)]
    pub donor_rating: Option<u8>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Match {
    pub fn donation_title(&self) -> &str {
        self.donation
            .as_ref()
            .map(|d| d.title.as_str())
            .unwrap_or("Doação removida")
    }

    pub fn requester_name(&self) -> &str {
        self.requester
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or("Usuário desconhecido")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MatchRequest {
    /// 请求捐赠时的默认留言
    pub fn interested_in(donation: &Donation) -> Self {
        Self {
            message: Some(format!(
                "Olá! Tenho interesse em receber a doação: {}",
                donation.title
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchStatusRequest {
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl UpdateMatchStatusRequest {
    pub fn new(status: MatchStatus, notes: Option<String>) -> Self {
        Self {
            status,
            notes,
            pickup_date: None,
            pickup_notes: None,
            donor_notes: None,
            rating: None,
        }
    }
}

/// 分页响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
}

impl<T> Default for PageResponse<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            size: 0,
            number: 0,
            first: true,
            last: true,
        }
    }
}
