//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程，验证由 [`resolve`] 完成。

use leptos::logging::log;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, Navigation, resolve};
use crate::auth::AuthContext;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 同步页面标题
fn set_document_title(route: AppRoute) {
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        document.set_title(route.title());
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入的认证上下文执行路由守卫。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 认证上下文（注入，实现解耦）
    auth: AuthContext,
}

impl RouterService {
    /// 创建新的路由服务
    ///
    /// 初始 URL 同样经过守卫：被拦截时以 replaceState 改写地址栏。
    fn new(auth: AuthContext) -> Self {
        let path = current_path();
        let decision = resolve(&path, &auth);
        let initial_route = decision.route();
        if let Navigation::Redirect(route) = decision {
            log!("[Router] Initial path {} redirected to {}", path, route);
            replace_history_state(route.to_path());
        }
        set_document_title(initial_route);
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            auth,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        self.apply(path, true);
    }

    /// 以 replaceState 导航（不产生新的历史记录）
    pub fn redirect(&self, path: &str) {
        self.apply(path, false);
    }

    /// 执行守卫决策并加载页面
    ///
    /// # Arguments
    /// * `path` - 目标路径
    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn apply(&self, path: &str, use_push: bool) {
        // --- Step 1: 验证目标路由 ---
        let decision = resolve(path, &self.auth);
        if let Navigation::Redirect(route) = decision {
            log!("[Router] {} redirected to {}", path, route);
        }

        // --- Step 2: 加载页面 (更新状态) ---
        let route = decision.route();
        if use_push {
            push_history_state(route.to_path());
        } else {
            replace_history_state(route.to_path());
        }
        set_document_title(route);
        self.set_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let auth = self.auth;

        let closure = Closure::<dyn Fn()>::new(move || {
            let path = current_path();

            // popstate 时也执行守卫逻辑，被拦截时改写当前历史记录
            let decision = resolve(&path, &auth);
            if let Navigation::Redirect(route) = decision {
                log!("[Router] History entry {} redirected to {}", path, route);
                replace_history_state(route.to_path());
            }
            let route = decision.route();
            set_document_title(route);
            set_route.set(route);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置登出时的自动重定向
    ///
    /// 登录后的跳转由登录页根据记录的目标完成，这里只处理登出。
    fn setup_auth_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let is_authenticated = self.auth.is_authenticated_signal();

        Effect::new(move |_| {
            let is_auth = is_authenticated.get();
            let route = current_route.get_untracked();

            if !is_auth && route.requires_auth() {
                let redirect = AppRoute::auth_failure_redirect();
                push_history_state(redirect.to_path());
                set_document_title(redirect);
                set_route.set(redirect);
                log!("[Router] Auth state changed: logged out, redirecting to login.");
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(auth: AuthContext) -> RouterService {
    let router = RouterService::new(auth);

    // 初始化监听器
    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证上下文
    auth: AuthContext,
    /// 子组件
    children: Children,
) -> impl IntoView {
    // 提供路由服务到 Context
    provide_router(auth);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接：拦截点击并交给路由服务
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    /// 额外样式
    #[prop(optional, into)]
    class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let to_clone = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&to_clone);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
