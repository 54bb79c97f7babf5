use gloo_timers::callback::Timeout;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::icons::Plus;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

mod form_state;
mod item_info_form;
mod pickup_section;

use form_state::FormState;
use item_info_form::ItemInfoForm;
use pickup_section::PickupSection;

const CREATED_MESSAGE: &str = "Doação criada com sucesso!";
const CREATE_FAILED_MESSAGE: &str = "Erro ao criar doação. Tente novamente.";
/// 成功提示停留后再跳转到面板
const REDIRECT_DELAY_MILLIS: u32 = 1_500;

#[component]
pub fn CreateDonationPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let state = FormState::new();
    let (loading, set_loading) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (success, set_success) = signal(false);

    // 离开页面时取消尚未触发的跳转（Timeout 被 drop 即取消）
    let pending_redirect = StoredValue::new_local(Option::<Timeout>::None);
    on_cleanup(move || {
        pending_redirect.try_update_value(|t| drop(t.take()));
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_error_msg.set(None);

        // 校验失败时不发送请求
        let Some(request) = state.to_request() else {
            return;
        };

        set_loading.set(true);
        spawn_local(async move {
            match auth.api().create_donation(&request).await {
                Ok(donation) => {
                    log!("[Api] Donation {} created", donation.id);
                    set_success.set(true);
                    state.reset();
                    let timeout = Timeout::new(REDIRECT_DELAY_MILLIS, move || {
                        router.redirect(AppRoute::Dashboard.to_path());
                    });
                    pending_redirect.try_set_value(Some(timeout));
                }
                // 401 时会话被清除，路由服务会把受保护页面重定向到登录页
                Err(e) => set_error_msg.set(auth.react_to(&e, CREATE_FAILED_MESSAGE)),
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="card max-w-3xl mx-auto bg-base-100 shadow-xl">
                <form class="card-body space-y-2" on:submit=on_submit novalidate>
                    <h1 class="card-title text-2xl gap-2">
                        <Plus attr:class="h-6 w-6 text-primary" /> "Nova doação"
                    </h1>
                    <p class="text-base-content/70">"Conte o que você quer doar e como retirar"</p>

                    <Show when=move || success.get()>
                        <div role="alert" class="alert alert-success text-sm py-2">
                            <span>{CREATED_MESSAGE}</span>
                        </div>
                    </Show>
                    <Show when=move || error_msg.get().is_some()>
                        <div role="alert" class="alert alert-error text-sm py-2">
                            <span>{move || error_msg.get().unwrap_or_default()}</span>
                        </div>
                    </Show>

                    <ItemInfoForm state=state />
                    <PickupSection state=state />

                    <div class="card-actions justify-end mt-4">
                        <button type="button" class="btn btn-ghost"
                            on:click=move |_| router.navigate(AppRoute::Dashboard.to_path())>
                            "Cancelar"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=move || loading.get() || success.get()>
                            {move || if loading.get() {
                                view! { <span class="loading loading-spinner"></span> "Publicando..." }.into_any()
                            } else {
                                "Publicar doação".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}
