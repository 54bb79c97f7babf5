//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、路由守卫以及导航决策。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 首页 (默认路由)
    #[default]
    Home,
    Login,
    Register,
    /// 浏览可用捐赠（公开）
    Donations,
    /// 发布捐赠 (需要认证)
    CreateDonation,
    /// 个人资料 (需要认证)
    Profile,
    /// 控制面板 (需要认证)
    Dashboard,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举，未知路径返回 `None`
    pub fn from_path(path: &str) -> Option<Self> {
        // 忽略查询串与结尾的 `/`
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match path {
            "/" => Some(Self::Home),
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            "/donations" => Some(Self::Donations),
            "/create-donation" => Some(Self::CreateDonation),
            "/profile" => Some(Self::Profile),
            "/dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Donations => "/donations",
            Self::CreateDonation => "/create-donation",
            Self::Profile => "/profile",
            Self::Dashboard => "/dashboard",
        }
    }

    /// 页面标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "DoaMatch - Início",
            Self::Login => "DoaMatch - Entrar",
            Self::Register => "DoaMatch - Cadastro",
            Self::Donations => "DoaMatch - Doações",
            Self::CreateDonation => "DoaMatch - Nova doação",
            Self::Profile => "DoaMatch - Meu perfil",
            Self::Dashboard => "DoaMatch - Painel",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::CreateDonation | Self::Profile | Self::Dashboard)
    }

    /// 定义已认证用户是否应该离开此路由（登录/注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 路由守卫
// =========================================================

/// 路由守卫查询的会话能力
pub trait RouteGuard {
    /// 是否持有有效会话（过期会话在此被清除）
    fn is_authenticated(&self) -> bool;
    /// 记录被拦截的目标路径，登录后再跳转回去
    fn remember_destination(&self, path: &str);
    /// 取出登录后应跳转的路径（一次性）
    fn take_return_url(&self) -> String;
}

/// 导航决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// 放行，渲染目标路由
    Proceed(AppRoute),
    /// 重定向到另一路由
    Redirect(AppRoute),
}

impl Navigation {
    /// 最终要渲染的路由
    pub fn route(&self) -> AppRoute {
        match self {
            Navigation::Proceed(route) | Navigation::Redirect(route) => *route,
        }
    }
}

/// **导航守卫：** 请求 -> 验证 -> 决策
///
/// - 未知路径回到首页
/// - 受保护路由在未登录时记录目标并转到登录页
/// - 已登录用户访问登录页时转到记录的目标（默认面板）；访问注册页时转到面板
pub fn resolve<G: RouteGuard + ?Sized>(path: &str, guard: &G) -> Navigation {
    let Some(target) = AppRoute::from_path(path) else {
        return Navigation::Redirect(AppRoute::Home);
    };

    if target.requires_auth() {
        if guard.is_authenticated() {
            return Navigation::Proceed(target);
        }
        guard.remember_destination(target.to_path());
        return Navigation::Redirect(AppRoute::auth_failure_redirect());
    }

    if target.should_redirect_when_authenticated() && guard.is_authenticated() {
        let destination = match target {
            AppRoute::Login => AppRoute::from_path(&guard.take_return_url()),
            _ => None,
        };
        return Navigation::Redirect(destination.unwrap_or(AppRoute::Dashboard));
    }

    Navigation::Proceed(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct FakeGuard {
        authenticated: Cell<bool>,
        return_url: RefCell<Option<String>>,
    }

    impl RouteGuard for FakeGuard {
        fn is_authenticated(&self) -> bool {
            self.authenticated.get()
        }

        fn remember_destination(&self, path: &str) {
            *self.return_url.borrow_mut() = Some(path.to_string());
        }

        fn take_return_url(&self) -> String {
            self.return_url
                .borrow_mut()
                .take()
                .unwrap_or_else(|| "/dashboard".to_string())
        }
    }

    #[test]
    fn paths_map_to_routes() {
        assert_eq!(AppRoute::from_path("/"), Some(AppRoute::Home));
        assert_eq!(AppRoute::from_path(""), Some(AppRoute::Home));
        assert_eq!(AppRoute::from_path("/donations/"), Some(AppRoute::Donations));
        assert_eq!(AppRoute::from_path("/login?x=1"), Some(AppRoute::Login));
        assert_eq!(AppRoute::from_path("/nowhere"), None);

        for route in [
            AppRoute::Home,
            AppRoute::Login,
            AppRoute::Register,
            AppRoute::Donations,
            AppRoute::CreateDonation,
            AppRoute::Profile,
            AppRoute::Dashboard,
        ] {
            assert_eq!(AppRoute::from_path(route.to_path()), Some(route));
        }
    }

    #[test]
    fn protected_route_records_destination_when_logged_out() {
        let guard = FakeGuard::default();

        assert_eq!(
            resolve("/profile", &guard),
            Navigation::Redirect(AppRoute::Login)
        );
        assert_eq!(guard.return_url.borrow().as_deref(), Some("/profile"));
    }

    #[test]
    fn protected_route_proceeds_when_logged_in() {
        let guard = FakeGuard::default();
        guard.authenticated.set(true);

        assert_eq!(
            resolve("/create-donation", &guard),
            Navigation::Proceed(AppRoute::CreateDonation)
        );
        assert!(guard.return_url.borrow().is_none());
    }

    #[test]
    fn public_routes_never_consult_the_session() {
        let guard = FakeGuard::default();
        assert_eq!(resolve("/donations", &guard), Navigation::Proceed(AppRoute::Donations));
        assert_eq!(resolve("/login", &guard), Navigation::Proceed(AppRoute::Login));
        assert_eq!(resolve("/", &guard), Navigation::Proceed(AppRoute::Home));
    }

    #[test]
    fn unknown_paths_redirect_home() {
        let guard = FakeGuard::default();
        assert_eq!(resolve("/admin", &guard), Navigation::Redirect(AppRoute::Home));
    }

    #[test]
    fn logged_in_user_leaves_login_for_return_url() {
        let guard = FakeGuard::default();
        guard.authenticated.set(true);
        guard.remember_destination("/donations");

        assert_eq!(
            resolve("/login", &guard),
            Navigation::Redirect(AppRoute::Donations)
        );
        // 一次性：第二次回到默认面板
        assert_eq!(
            resolve("/login", &guard),
            Navigation::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            resolve("/register", &guard),
            Navigation::Redirect(AppRoute::Dashboard)
        );
    }
}
