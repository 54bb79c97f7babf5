use donamatch_shared::catalog::STATES;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::common::FieldError;
use crate::forms::{FieldErrors, RegisterForm, format_phone};
use crate::web::router::{Link, use_router};

const REGISTERED_MESSAGE: &str = "Cadastro realizado com sucesso! Faça login para continuar.";
const REGISTER_FAILED_MESSAGE: &str = "Erro ao realizar cadastro. Tente novamente.";

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let form = RwSignal::new(RegisterForm::default());
    let field_errors = RwSignal::new(FieldErrors::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_error_msg.set(None);

        let request = match form.with_untracked(RegisterForm::to_request) {
            Ok(request) => {
                field_errors.set(FieldErrors::default());
                request
            }
            Err(errors) => {
                field_errors.set(errors);
                return;
            }
        };

        set_is_submitting.set(true);
        spawn_local(async move {
            match auth.api().register(&request).await {
                Ok(_) => {
                    auth.set_flash(REGISTERED_MESSAGE);
                    router.navigate("/login");
                }
                Err(e) => set_error_msg.set(auth.react_to(&e, REGISTER_FAILED_MESSAGE)),
            }
            set_is_submitting.set(false);
        });
    };

    let field_error = move |field: &'static str| {
        Signal::derive(move || field_errors.with(|e| e.get(field).map(String::from)))
    };

    view! {
        <div class="min-h-[80vh] bg-base-200 p-4 md:p-8">
            <div class="card max-w-2xl mx-auto shadow-2xl bg-base-100">
                <form class="card-body" on:submit=on_submit novalidate>
                    <h1 class="card-title text-3xl">"Criar conta"</h1>
                    <p class="text-base-content/70">"Cadastre-se para doar e solicitar itens"</p>

                    <Show when=move || error_msg.get().is_some()>
                        <div role="alert" class="alert alert-error text-sm py-2">
                            <span>{move || error_msg.get().unwrap_or_default()}</span>
                        </div>
                    </Show>

                    <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                        <div class="form-control md:col-span-2">
                            <label class="label" for="name"><span class="label-text">"Nome completo *"</span></label>
                            <input id="name" type="text" class="input input-bordered"
                                on:input=move |ev| form.update(|f| f.name = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.name.clone()) />
                            <FieldError message=field_error("name") />
                        </div>
                        <div class="form-control">
                            <label class="label" for="email"><span class="label-text">"Email *"</span></label>
                            <input id="email" type="email" class="input input-bordered"
                                on:input=move |ev| form.update(|f| f.email = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.email.clone()) />
                            <FieldError message=field_error("email") />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password"><span class="label-text">"Senha *"</span></label>
                            <input id="password" type="password" class="input input-bordered"
                                on:input=move |ev| form.update(|f| f.password = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.password.clone()) />
                            <FieldError message=field_error("password") />
                        </div>
                        <div class="form-control">
                            <label class="label" for="phone"><span class="label-text">"Telefone"</span></label>
                            <input id="phone" type="tel" placeholder="(11) 99999-9999" class="input input-bordered"
                                on:input=move |ev| form.update(|f| f.phone = format_phone(&event_target_value(&ev)))
                                prop:value=move || form.with(|f| f.phone.clone()) />
                        </div>
                        <div class="form-control">
                            <label class="label" for="zip"><span class="label-text">"CEP"</span></label>
                            <input id="zip" type="text" class="input input-bordered"
                                on:input=move |ev| form.update(|f| f.zip_code = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.zip_code.clone()) />
                        </div>
                        <div class="form-control md:col-span-2">
                            <label class="label" for="address"><span class="label-text">"Endereço"</span></label>
                            <input id="address" type="text" class="input input-bordered"
                                on:input=move |ev| form.update(|f| f.address = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.address.clone()) />
                        </div>
                        <div class="form-control">
                            <label class="label" for="city"><span class="label-text">"Cidade"</span></label>
                            <input id="city" type="text" class="input input-bordered"
                                on:input=move |ev| form.update(|f| f.city = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.city.clone()) />
                        </div>
                        <div class="form-control">
                            <label class="label" for="state"><span class="label-text">"Estado"</span></label>
                            <select id="state" class="select select-bordered"
                                on:change=move |ev| form.update(|f| f.state = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.state.clone())>
                                <option value="">"Selecione"</option>
                                {STATES.iter().map(|uf| view! { <option value=*uf>{*uf}</option> }).collect_view()}
                            </select>
                        </div>
                        <div class="form-control md:col-span-2">
                            <label class="label" for="bio"><span class="label-text">"Sobre você"</span></label>
                            <textarea id="bio" class="textarea textarea-bordered" rows="3"
                                on:input=move |ev| form.update(|f| f.bio = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.bio.clone())></textarea>
                        </div>
                    </div>

                    <div class="form-control mt-6">
                        <button class="btn btn-primary" disabled=move || is_submitting.get()>
                            {move || if is_submitting.get() {
                                view! { <span class="loading loading-spinner"></span> "Cadastrando..." }.into_any()
                            } else {
                                "Cadastrar".into_any()
                            }}
                        </button>
                    </div>
                    <p class="text-center text-sm mt-2">
                        "Já tem conta? "
                        <Link to="/login" class="link link-primary">"Entrar"</Link>
                    </p>
                </form>
            </div>
        </div>
    }
}
