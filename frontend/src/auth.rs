//! 认证模块
//!
//! 把会话存储包装为响应式上下文，与路由系统解耦。
//! 会话变化通过订阅同步到 `identity` 信号，路由服务与导航栏只读取信号。

use std::rc::Rc;

use donamatch_shared::Identity;
use leptos::logging::log;
use leptos::prelude::*;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::{ApiError, ErrorReaction};
use crate::session::SessionStore;
use crate::web::clock::BrowserClock;
use crate::web::http::FetchHttpClient;
use crate::web::route::RouteGuard;
use crate::web::storage::BrowserStorage;

/// 浏览器环境下的会话存储
pub type AppSession = SessionStore<BrowserStorage, BrowserClock>;
/// 浏览器环境下的 API 客户端
pub type AppApi = ApiClient<FetchHttpClient, BrowserStorage, BrowserClock>;

/// 认证上下文
///
/// 包含 API 客户端与身份信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// API 客户端（持有唯一的会话存储）
    api: StoredValue<AppApi, LocalStorage>,
    /// 当前身份（只读）
    identity: ReadSignal<Option<Identity>>,
    /// 一次性提示消息（例如注册成功后显示在登录页）
    flash: RwSignal<Option<String>>,
}

impl AuthContext {
    /// 创建新的认证上下文
    ///
    /// 从 LocalStorage 恢复上次的会话，并订阅之后的身份变化。
    pub fn new(config: &AppConfig) -> Self {
        let session = Rc::new(SessionStore::new(BrowserStorage, BrowserClock));
        let (identity, set_identity) = signal(session.current_identity());

        session.subscribe(move |identity| {
            set_identity.set(identity.cloned());
        });

        let api = ApiClient::new(config, Rc::new(FetchHttpClient), session);
        Self {
            api: StoredValue::new_local(api),
            identity,
            flash: RwSignal::new(None),
        }
    }

    /// 获取 API 客户端（克隆开销仅为几个 Rc）
    pub fn api(&self) -> AppApi {
        self.api.get_value()
    }

    /// 当前身份信号
    pub fn identity(&self) -> ReadSignal<Option<Identity>> {
        self.identity
    }

    /// 获取认证状态信号（用于路由服务与导航栏）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let identity = self.identity;
        Signal::derive(move || identity.with(Option::is_some))
    }

    /// 是否持有有效会话，过期会话会被清除
    pub fn is_logged_in(&self) -> bool {
        self.api.with_value(|api| api.session().is_logged_in())
    }

    /// 注销
    ///
    /// 受保护页面上的导航由路由服务的认证状态监听自动处理。
    pub fn logout(&self) {
        self.api.with_value(|api| api.session().logout());
    }

    pub fn set_return_url(&self, url: &str) {
        self.api.with_value(|api| api.session().set_return_url(url));
    }

    pub fn take_return_url(&self) -> String {
        self.api.with_value(|api| api.session().take_return_url())
    }

    pub fn set_flash(&self, message: impl Into<String>) {
        self.flash.set(Some(message.into()));
    }

    /// 取出一次性提示消息
    pub fn take_flash(&self) -> Option<String> {
        let mut message = None;
        self.flash.update(|flash| message = flash.take());
        message
    }

    /// 按错误分类做出反应
    ///
    /// 401 注销并返回 `None`（调用方负责跳转登录）；其他错误返回要内联显示的消息。
    pub fn react_to(&self, error: &ApiError, fallback: &str) -> Option<String> {
        match error.reaction(fallback) {
            ErrorReaction::LogoutAndRedirect => {
                log!("[Session] Server rejected the session, logging out");
                self.logout();
                None
            }
            ErrorReaction::Inline(message) => Some(message),
        }
    }
}

impl RouteGuard for AuthContext {
    fn is_authenticated(&self) -> bool {
        self.is_logged_in()
    }

    fn remember_destination(&self, path: &str) {
        self.set_return_url(path);
    }

    fn take_return_url(&self) -> String {
        AuthContext::take_return_url(self)
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// 启动时立即检查令牌是否过期，过期会话在首次渲染前被清除。
pub fn init_auth(ctx: &AuthContext) {
    if ctx.is_logged_in() {
        let name = ctx.identity.with_untracked(|i| i.as_ref().map(|i| i.name.clone()));
        log!("[Session] Restored session for {}", name.unwrap_or_default());
    }
}
