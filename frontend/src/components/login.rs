use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::common::FieldError;
use crate::components::icons::Gift;
use crate::forms::{FieldErrors, INVALID_CREDENTIALS_MESSAGE, validate_login};
use crate::web::router::{Link, use_router};

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let field_errors = RwSignal::new(FieldErrors::default());

    // 注册成功等一次性提示
    let flash = auth.take_flash();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_error_msg.set(None);

        let credentials = match validate_login(&email.get_untracked(), &password.get_untracked()) {
            Ok(credentials) => {
                field_errors.set(FieldErrors::default());
                credentials
            }
            Err(errors) => {
                field_errors.set(errors);
                return;
            }
        };

        set_is_submitting.set(true);
        spawn_local(async move {
            match auth.api().login(&credentials).await {
                Ok(_) => router.navigate(&auth.take_return_url()),
                Err(e) => {
                    warn!("[Session] Login failed: {}", e);
                    set_error_msg.set(Some(INVALID_CREDENTIALS_MESSAGE.to_string()));
                }
            }
            set_is_submitting.set(false);
        });
    };

    let field_error = move |field: &'static str| {
        Signal::derive(move || field_errors.with(|e| e.get(field).map(String::from)))
    };

    view! {
        <div class="hero min-h-[80vh] bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <Gift attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"Entrar"</h1>
                        <p class="text-base-content/70">"Acesse sua conta para doar e solicitar itens"</p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit novalidate>
                        {flash.map(|message| view! {
                            <div role="alert" class="alert alert-success text-sm py-2">
                                <span>{message}</span>
                            </div>
                        })}

                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <svg xmlns="http://www.w3.org/2000/svg" class="stroke-current shrink-0 h-6 w-6" fill="none" viewBox="0 0 24 24"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M10 14l2-2m0 0l2-2m-2 2l-2-2m2 2l2 2m7-2a9 9 0 11-18 0 9 9 0 0118 0z" /></svg>
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="voce@exemplo.com"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                            />
                            <FieldError message=field_error("email") />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Senha"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                            />
                            <FieldError message=field_error("password") />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Entrando..." }.into_any()
                                } else {
                                    "Entrar".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm mt-2">
                            "Ainda não tem conta? "
                            <Link to="/register" class="link link-primary">"Cadastre-se"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
