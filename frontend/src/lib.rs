//! DoaMatch 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `session`: 会话存储（令牌、身份、登录后跳转地址）
//! - `api`: 请求认证与领域服务
//! - `web::route`: 路由定义与守卫（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 会话的响应式包装
//! - `components`: UI 组件层

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod forms;
pub mod session;
mod components {
    pub mod common;
    pub mod create_donation;
    pub mod dashboard;
    pub mod donations;
    pub mod home;
    mod icons;
    pub mod login;
    pub mod navbar;
    pub mod profile;
    pub mod register;
}

use crate::auth::{AuthContext, init_auth};
use crate::components::create_donation::CreateDonationPage;
use crate::components::dashboard::DashboardPage;
use crate::components::donations::DonationsPage;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::navbar::Navbar;
use crate::components::profile::ProfilePage;
use crate::components::register::RegisterPage;
use crate::config::AppConfig;

use leptos::prelude::*;

// 浏览器 API 适配层
// 纯逻辑通过这里的 trait 访问存储、时钟与网络，便于在原生环境下测试。
pub mod web {
    pub mod clock;
    pub mod http;
    pub mod route;
    pub mod router;
    pub mod storage;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Donations => view! { <DonationsPage /> }.into_any(),
        AppRoute::CreateDonation => view! { <CreateDonationPage /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建认证上下文（恢复上次的会话）
    let auth_ctx = AuthContext::new(&AppConfig::from_env());
    provide_context(auth_ctx);

    // 2. 启动时清除过期会话
    init_auth(&auth_ctx);

    view! {
        // 3. 路由器组件：注入认证上下文实现守卫
        <Router auth=auth_ctx>
            <Navbar />
            <main>
                <RouterOutlet matcher=route_matcher />
            </main>
        </Router>
    }
}
