use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::icons::*;
use crate::web::router::{Link, use_router};

/// 顶部导航栏
///
/// 通过身份信号响应登录/登出，无需刷新页面。
#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let identity = auth.identity();

    let on_logout = move |_| {
        auth.logout();
        router.navigate("/");
    };

    view! {
        <div class="navbar bg-base-100 shadow-md px-4 md:px-8">
            <div class="flex-1 gap-2">
                <Gift attr:class="text-primary h-6 w-6" />
                <Link to="/" class="btn btn-ghost text-xl">"DoaMatch"</Link>
                <Link to="/donations" class="btn btn-ghost btn-sm hidden md:inline-flex">"Doações"</Link>
            </div>
            <div class="flex-none gap-2">
                <Show
                    when=move || identity.with(Option::is_some)
                    fallback=|| view! {
                        <Link to="/login" class="btn btn-ghost btn-sm">"Entrar"</Link>
                        <Link to="/register" class="btn btn-primary btn-sm">"Cadastrar"</Link>
                    }
                >
                    <Link to="/create-donation" class="btn btn-primary btn-sm gap-1">
                        <Plus attr:class="h-4 w-4" /> "Doar"
                    </Link>
                    <div class="dropdown dropdown-end">
                        <div tabindex="0" role="button" class="btn btn-ghost btn-circle avatar placeholder">
                            <div class="bg-neutral text-neutral-content rounded-full w-10">
                                <span>{move || identity.with(|i| i.as_ref().map(|i| i.initial()).unwrap_or_default())}</span>
                            </div>
                        </div>
                        <ul tabindex="0" class="dropdown-content z-[1] menu p-2 shadow bg-base-100 rounded-box w-52">
                            <li class="menu-title">
                                {move || identity.with(|i| i.as_ref().map(|i| i.name.clone()).unwrap_or_default())}
                            </li>
                            <li>
                                <Link to="/dashboard">
                                    <LayoutDashboard attr:class="h-4 w-4" /> "Painel"
                                </Link>
                            </li>
                            <li>
                                <Link to="/profile">
                                    <UserIcon attr:class="h-4 w-4" /> "Meu perfil"
                                </Link>
                            </li>
                            <li>
                                <a on:click=on_logout class="text-error">
                                    <LogOut attr:class="h-4 w-4" /> "Sair"
                                </a>
                            </li>
                        </ul>
                    </div>
                </Show>
            </div>
        </div>
    }
}
