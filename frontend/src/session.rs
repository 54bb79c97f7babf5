//! 会话存储
//!
//! 唯一持有"当前是谁"这一状态的地方：
//! - 令牌与身份成对写入 LocalStorage（要么都写入，要么都不写）
//! - `is_logged_in` 解码令牌的 `exp`，过期或格式错误即隐式注销
//! - 身份变化时同步通知所有订阅者
//! - 一次性的登录后跳转地址

use std::cell::{Cell, RefCell};
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use donamatch_shared::date::Timestamp;
use donamatch_shared::{DEFAULT_RETURN_URL, Identity, JwtResponse, STORAGE_TOKEN_KEY, STORAGE_USER_KEY};
use leptos::logging::{log, warn};
use serde::Deserialize;

use crate::error::{ApiError, ApiErrorStatus, ApiResult};
use crate::web::clock::Clock;
use crate::web::route::RouteGuard;
use crate::web::storage::KeyValueStore;

#[cfg(test)]
pub(crate) mod tests;

// =========================================================
// 令牌解码
// =========================================================

/// 我们关心的 JWT 声明
#[derive(Debug, Default, Deserialize)]
struct TokenClaims {
    /// 过期时间（秒）
    #[serde(default)]
    exp: Option<f64>,
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default, rename = "userId")]
    user_id: Option<serde_json::Value>,
}

#[derive(Debug)]
enum TokenError {
    /// 不是 `header.payload.signature` 结构
    Shape,
    /// payload 不是合法的 base64url
    Encoding,
    /// payload 不是 JSON 对象
    Payload(serde_json::Error),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Shape => write!(f, "malformed token"),
            TokenError::Encoding => write!(f, "payload is not base64url"),
            TokenError::Payload(e) => write!(f, "payload is not a claims object: {}", e),
        }
    }
}

fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(header), Some(payload)) if !header.is_empty() && !payload.is_empty() => payload,
        _ => return Err(TokenError::Shape),
    };

    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|_| TokenError::Encoding)?;

    serde_json::from_slice(&bytes).map_err(TokenError::Payload)
}

fn claim_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 日志中只显示令牌尾部
fn redact(token: &str) -> String {
    let tail: String = token
        .chars()
        .rev()
        .take(6)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("…{}", tail)
}

// =========================================================
// 订阅
// =========================================================

/// 订阅句柄，用于取消订阅
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(Option<&Identity>)>;

// =========================================================
// SessionStore
// =========================================================

/// 会话存储
///
/// S: KeyValueStore
/// C: Clock
pub struct SessionStore<S, C> {
    storage: S,
    clock: C,
    identity: RefCell<Option<Identity>>,
    return_url: RefCell<Option<String>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
}

impl<S: KeyValueStore, C: Clock> SessionStore<S, C> {
    /// 从持久化存储恢复会话
    ///
    /// 只有令牌与身份都存在且身份能被解析时才恢复；半截状态会被清除。
    pub fn new(storage: S, clock: C) -> Self {
        let identity = match (
            storage.get(STORAGE_TOKEN_KEY),
            storage.get(STORAGE_USER_KEY),
        ) {
            (Some(_), Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    warn!("[Session] Discarding unreadable stored identity: {}", e);
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("[Session] Discarding partial stored session");
                None
            }
        };

        if identity.is_none() {
            storage.remove(STORAGE_TOKEN_KEY);
            storage.remove(STORAGE_USER_KEY);
        }

        Self {
            storage,
            clock,
            identity: RefCell::new(identity),
            return_url: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    /// 保存登录结果并发布新身份
    ///
    /// 写入是原子的：任一写入失败都会恢复之前的持久化状态并返回错误。
    pub fn establish(&self, response: &JwtResponse) -> ApiResult<Identity> {
        if response.token.trim().is_empty() {
            return Err(ApiError::serialization("empty token in login response")
                .in_op("session.establish"));
        }

        let user_json = serde_json::to_string(&response.user)
            .map_err(|e| ApiError::from(e).in_op("session.establish"))?;

        let previous_token = self.storage.get(STORAGE_TOKEN_KEY);
        let previous_user = self.storage.get(STORAGE_USER_KEY);

        let written = self.storage.set(STORAGE_TOKEN_KEY, &response.token)
            && self.storage.set(STORAGE_USER_KEY, &user_json);

        if !written {
            self.restore(STORAGE_TOKEN_KEY, previous_token.as_deref());
            self.restore(STORAGE_USER_KEY, previous_user.as_deref());
            warn!("[Session] Could not persist session, previous state kept");
            return Err(
                ApiError::new(ApiErrorStatus::Server, "storage unavailable")
                    .in_op("session.establish"),
            );
        }

        log!(
            "[Session] Logged in as user {} (token {})",
            response.user.id,
            redact(&response.token)
        );
        *self.identity.borrow_mut() = Some(response.user.clone());
        self.publish();
        Ok(response.user.clone())
    }

    fn restore(&self, key: &str, previous: Option<&str>) {
        match previous {
            Some(value) => self.storage.set(key, value),
            None => self.storage.remove(key),
        };
    }

    /// 注销：清除持久化的令牌与身份并发布 `None`
    ///
    /// 幂等；未登录时调用不会通知订阅者。
    pub fn logout(&self) {
        self.storage.remove(STORAGE_TOKEN_KEY);
        self.storage.remove(STORAGE_USER_KEY);

        let was_present = self.identity.borrow_mut().take().is_some();
        if was_present {
            log!("[Session] Logged out");
            self.publish();
        }
    }

    /// 是否持有未过期的令牌
    ///
    /// 令牌格式错误或已过期（`exp <= now`）时隐式注销并返回 `false`。
    /// 没有 `exp` 声明的令牌视为永不过期。
    pub fn is_logged_in(&self) -> bool {
        let Some(token) = self.storage.get(STORAGE_TOKEN_KEY) else {
            if self.identity.borrow().is_some() {
                // 存储在别处被清空
                self.logout();
            }
            return false;
        };

        match decode_claims(&token) {
            Ok(TokenClaims { exp: Some(exp), .. }) => {
                let expires_at = Timestamp::new((exp * 1000.0) as i64);
                if expires_at <= self.clock.now() {
                    log!("[Session] Token {} expired, logging out", redact(&token));
                    self.logout();
                    false
                } else {
                    true
                }
            }
            Ok(_) => true,
            Err(e) => {
                warn!("[Session] Token {} rejected: {}", redact(&token), e);
                self.logout();
                false
            }
        }
    }

    /// 当前持久化的令牌（若仍有效）
    pub fn token(&self) -> Option<String> {
        if self.is_logged_in() {
            self.storage.get(STORAGE_TOKEN_KEY)
        } else {
            None
        }
    }

    /// 最近一次发布的身份
    pub fn current_identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    /// 令牌中的用户标识（`sub`，其次 `userId`）
    pub fn token_subject(&self) -> Option<String> {
        let token = self.storage.get(STORAGE_TOKEN_KEY)?;
        let claims = decode_claims(&token).ok()?;
        claims
            .sub
            .as_ref()
            .and_then(claim_to_string)
            .or_else(|| claims.user_id.as_ref().and_then(claim_to_string))
    }

    /// 资料更新后替换身份（令牌不变）
    pub fn replace_identity(&self, identity: Identity) -> ApiResult<()> {
        if self.identity.borrow().is_none() {
            return Err(ApiError::new(
                ApiErrorStatus::Unauthorized,
                "no active session",
            )
            .in_op("session.replace_identity"));
        }

        let user_json = serde_json::to_string(&identity)
            .map_err(|e| ApiError::from(e).in_op("session.replace_identity"))?;
        if !self.storage.set(STORAGE_USER_KEY, &user_json) {
            warn!("[Session] Could not persist updated identity");
        }

        *self.identity.borrow_mut() = Some(identity);
        self.publish();
        Ok(())
    }

    // --- 登录后跳转地址 ---

    pub fn set_return_url(&self, url: &str) {
        *self.return_url.borrow_mut() = Some(url.to_string());
    }

    /// 取出并清空跳转地址，未设置时返回默认面板
    pub fn take_return_url(&self) -> String {
        self.return_url
            .borrow_mut()
            .take()
            .unwrap_or_else(|| DEFAULT_RETURN_URL.to_string())
    }

    // --- 订阅 ---

    /// 订阅身份变化
    ///
    /// 回调在发布时同步执行，回调内不得再订阅或取消订阅。
    pub fn subscribe(&self, listener: impl Fn(Option<&Identity>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    fn publish(&self) {
        let identity = self.identity.borrow().clone();
        for (_, listener) in self.listeners.borrow().iter() {
            listener(identity.as_ref());
        }
    }
}

impl<S: KeyValueStore, C: Clock> RouteGuard for SessionStore<S, C> {
    fn is_authenticated(&self) -> bool {
        self.is_logged_in()
    }

    fn remember_destination(&self, path: &str) {
        self.set_return_url(path);
    }

    fn take_return_url(&self) -> String {
        SessionStore::take_return_url(self)
    }
}
