use donamatch_shared::catalog::STATES;
use donamatch_shared::date::format_date;
use donamatch_shared::{Donation, Match};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::common::{FieldError, Loading, Notice, Notification, StatusBadge};
use crate::components::icons::*;
use crate::forms::{FieldErrors, PASSWORD_CHANGE_UNAVAILABLE, PasswordForm, ProfileForm, format_phone};

const UPDATED_MESSAGE: &str = "Perfil atualizado com sucesso!";
const UPDATE_FAILED_MESSAGE: &str = "Erro ao atualizar perfil.";
const ACTIVITY_FAILED_MESSAGE: &str = "Erro ao carregar atividades.";

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let identity = auth.identity();

    let form = RwSignal::new(
        identity.with_untracked(|i| i.as_ref().map(ProfileForm::from_identity).unwrap_or_default()),
    );
    let form_errors = RwSignal::new(FieldErrors::default());
    let password = RwSignal::new(PasswordForm::default());
    let password_errors = RwSignal::new(FieldErrors::default());
    let (editing, set_editing) = signal(false);
    let (saving, set_saving) = signal(false);
    let (notification, set_notification) = signal(Notice::None);

    let donations = RwSignal::new(Vec::<Donation>::new());
    let matches = RwSignal::new(Vec::<Match>::new());
    let (loading_activity, set_loading_activity) = signal(true);

    let notify_error = move |message: Option<String>| {
        if let Some(message) = message {
            set_notification.set(Some((message, true)));
        }
    };

    // 活动记录：我的捐赠与匹配
    spawn_local(async move {
        let activity = auth.api().load_activity().await;
        // 部分失败时仍展示已加载的列表
        if let Some(e) = activity
            .failures
            .iter()
            .find(|e| e.is_unauthorized())
            .or_else(|| activity.failures.first())
        {
            notify_error(auth.react_to(e, ACTIVITY_FAILED_MESSAGE));
        }
        donations.set(activity.my_donations);
        matches.set(activity.matches);
        set_loading_activity.set(false);
    });

    let on_cancel = move |_| {
        if let Some(current) = identity.get_untracked() {
            form.set(ProfileForm::from_identity(&current));
        }
        form_errors.set(FieldErrors::default());
        set_editing.set(false);
    };

    let on_save = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let request = match form.with_untracked(ProfileForm::to_request) {
            Ok(request) => {
                form_errors.set(FieldErrors::default());
                request
            }
            Err(errors) => {
                form_errors.set(errors);
                return;
            }
        };

        set_saving.set(true);
        spawn_local(async move {
            match auth.api().update_profile(&request).await {
                Ok(updated) => {
                    form.set(ProfileForm::from_identity(&updated));
                    set_editing.set(false);
                    set_notification.set(Some((UPDATED_MESSAGE.to_string(), false)));
                }
                Err(e) => notify_error(auth.react_to(&e, UPDATE_FAILED_MESSAGE)),
            }
            set_saving.set(false);
        });
    };

    // 后端没有修改密码的端点，只做本地校验
    let on_change_password = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        match password.with_untracked(PasswordForm::validate) {
            Ok(()) => {
                password_errors.set(FieldErrors::default());
                password.set(PasswordForm::default());
                set_notification.set(Some((PASSWORD_CHANGE_UNAVAILABLE.to_string(), true)));
            }
            Err(errors) => password_errors.set(errors),
        }
    };

    let form_error = move |field: &'static str| {
        Signal::derive(move || form_errors.with(|e| e.get(field).map(String::from)))
    };
    let password_error = move |field: &'static str| {
        Signal::derive(move || password_errors.with(|e| e.get(field).map(String::from)))
    };
    let readonly = move || !editing.get();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-5xl mx-auto space-y-6">
                <Notification notification=notification set_notification=set_notification />

                <div class="flex items-center gap-4">
                    <div class="avatar placeholder">
                        <div class="bg-primary text-primary-content rounded-full w-16">
                            <span class="text-2xl">{move || identity.with(|i| i.as_ref().map(|i| i.initial()).unwrap_or_default())}</span>
                        </div>
                    </div>
                    <div>
                        <h1 class="text-3xl font-bold">{move || identity.with(|i| i.as_ref().map(|i| i.name.clone()).unwrap_or_default())}</h1>
                        <p class="text-base-content/70">
                            {move || identity.with(|i| {
                                i.as_ref()
                                    .and_then(|i| i.created_at.as_ref())
                                    .map(|t| format!("Membro desde {}", format_date(t)))
                                    .unwrap_or_default()
                            })}
                        </p>
                    </div>
                </div>

                <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
                    // 个人资料
                    <form class="card bg-base-100 shadow-xl lg:col-span-2" on:submit=on_save novalidate>
                        <div class="card-body">
                            <div class="flex justify-between items-center">
                                <h3 class="card-title gap-2"><UserIcon attr:class="h-5 w-5" /> "Dados pessoais"</h3>
                                <Show when=readonly>
                                    <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| set_editing.set(true)>
                                        "Editar"
                                    </button>
                                </Show>
                            </div>

                            <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                                <div class="form-control">
                                    <label class="label" for="p_name"><span class="label-text">"Nome"</span></label>
                                    <input id="p_name" type="text" class="input input-bordered" prop:disabled=readonly
                                        on:input=move |ev| form.update(|f| f.name = event_target_value(&ev))
                                        prop:value=move || form.with(|f| f.name.clone()) />
                                    <FieldError message=form_error("name") />
                                </div>
                                <div class="form-control">
                                    <label class="label" for="p_email"><span class="label-text">"Email"</span></label>
                                    <input id="p_email" type="email" class="input input-bordered" prop:disabled=readonly
                                        on:input=move |ev| form.update(|f| f.email = event_target_value(&ev))
                                        prop:value=move || form.with(|f| f.email.clone()) />
                                    <FieldError message=form_error("email") />
                                </div>
                                <div class="form-control">
                                    <label class="label" for="p_phone"><span class="label-text">"Telefone"</span></label>
                                    <input id="p_phone" type="tel" placeholder="(11) 99999-9999" class="input input-bordered" prop:disabled=readonly
                                        on:input=move |ev| form.update(|f| f.phone = format_phone(&event_target_value(&ev)))
                                        prop:value=move || form.with(|f| f.phone.clone()) />
                                    <FieldError message=form_error("phone") />
                                </div>
                                <div class="form-control">
                                    <label class="label" for="p_address"><span class="label-text">"Endereço"</span></label>
                                    <input id="p_address" type="text" class="input input-bordered" prop:disabled=readonly
                                        on:input=move |ev| form.update(|f| f.address = event_target_value(&ev))
                                        prop:value=move || form.with(|f| f.address.clone()) />
                                    <FieldError message=form_error("address") />
                                </div>
                                <div class="form-control">
                                    <label class="label" for="p_city"><span class="label-text">"Cidade"</span></label>
                                    <input id="p_city" type="text" class="input input-bordered" prop:disabled=readonly
                                        on:input=move |ev| form.update(|f| f.city = event_target_value(&ev))
                                        prop:value=move || form.with(|f| f.city.clone()) />
                                    <FieldError message=form_error("city") />
                                </div>
                                <div class="form-control">
                                    <label class="label" for="p_state"><span class="label-text">"Estado"</span></label>
                                    <select id="p_state" class="select select-bordered" prop:disabled=readonly
                                        on:change=move |ev| form.update(|f| f.state = event_target_value(&ev))
                                        prop:value=move || form.with(|f| f.state.clone())>
                                        <option value="">"Selecione"</option>
                                        {STATES.iter().map(|uf| view! { <option value=*uf>{*uf}</option> }).collect_view()}
                                    </select>
                                    <FieldError message=form_error("state") />
                                </div>
                            </div>

                            <Show when=move || editing.get()>
                                <div class="card-actions justify-end mt-4">
                                    <button type="button" class="btn btn-ghost" on:click=on_cancel>"Cancelar"</button>
                                    <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                                        {move || if saving.get() {
                                            view! { <span class="loading loading-spinner"></span> "Salvando..." }.into_any()
                                        } else {
                                            "Salvar".into_any()
                                        }}
                                    </button>
                                </div>
                            </Show>
                        </div>
                    </form>

                    // 修改密码
                    <form class="card bg-base-100 shadow-xl" on:submit=on_change_password novalidate>
                        <div class="card-body">
                            <h3 class="card-title">"Alterar senha"</h3>
                            <div class="form-control">
                                <label class="label" for="pw_current"><span class="label-text">"Senha atual"</span></label>
                                <input id="pw_current" type="password" class="input input-bordered"
                                    on:input=move |ev| password.update(|p| p.current = event_target_value(&ev))
                                    prop:value=move || password.with(|p| p.current.clone()) />
                                <FieldError message=password_error("currentPassword") />
                            </div>
                            <div class="form-control">
                                <label class="label" for="pw_new"><span class="label-text">"Nova senha"</span></label>
                                <input id="pw_new" type="password" class="input input-bordered"
                                    on:input=move |ev| password.update(|p| p.new = event_target_value(&ev))
                                    prop:value=move || password.with(|p| p.new.clone()) />
                                <FieldError message=password_error("newPassword") />
                            </div>
                            <div class="form-control">
                                <label class="label" for="pw_confirm"><span class="label-text">"Confirmar nova senha"</span></label>
                                <input id="pw_confirm" type="password" class="input input-bordered"
                                    on:input=move |ev| password.update(|p| p.confirm = event_target_value(&ev))
                                    prop:value=move || password.with(|p| p.confirm.clone()) />
                                <FieldError message=password_error("confirmPassword") />
                            </div>
                            <div class="card-actions justify-end mt-4">
                                <button type="submit" class="btn btn-outline">"Alterar senha"</button>
                            </div>
                        </div>
                    </form>
                </div>

                // 活动记录
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Minhas atividades"</h3>
                        <Show when=move || !loading_activity.get() fallback=|| view! { <Loading /> }>
                            <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
                                <div>
                                    <h4 class="font-semibold mb-2 flex items-center gap-2">
                                        <Package attr:class="h-4 w-4" /> "Doações"
                                    </h4>
                                    <ul class="space-y-2">
                                        <For
                                            each=move || donations.get()
                                            key=|d| d.id
                                            children=|d| view! {
                                                <li class="flex justify-between items-center">
                                                    <span>{d.title.clone()}</span>
                                                    <StatusBadge display=d.status.display() />
                                                </li>
                                            }
                                        />
                                    </ul>
                                    <Show when=move || donations.with(Vec::is_empty)>
                                        <p class="text-sm text-base-content/50">"Nenhuma doação ainda."</p>
                                    </Show>
                                </div>
                                <div>
                                    <h4 class="font-semibold mb-2 flex items-center gap-2">
                                        <Send attr:class="h-4 w-4" /> "Solicitações"
                                    </h4>
                                    <ul class="space-y-2">
                                        <For
                                            each=move || matches.get()
                                            key=|m| m.id
                                            children=|m| view! {
                                                <li class="flex justify-between items-center">
                                                    <span>{m.donation_title().to_string()}</span>
                                                    <StatusBadge display=m.status.display() />
                                                </li>
                                            }
                                        />
                                    </ul>
                                    <Show when=move || matches.with(Vec::is_empty)>
                                        <p class="text-sm text-base-content/50">"Nenhuma solicitação ainda."</p>
                                    </Show>
                                </div>
                            </div>
                        </Show>
                    </div>
                </div>
            </div>
        </div>
    }
}
