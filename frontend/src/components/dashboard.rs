use donamatch_shared::date::{format_date, format_date_time};
use donamatch_shared::{Donation, DonationPatch, Match, MatchStatus};
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::dashboard::DashboardData;
use crate::auth::use_auth;
use crate::components::common::{FieldError, Loading, Notice, Notification, StatusBadge};
use crate::components::icons::*;
use crate::forms::{DonationEditForm, FieldErrors};
use crate::web::router::Link;

const DELETE_CONFIRM_MESSAGE: &str = "Tem certeza que deseja excluir esta doação?";
const DELETED_MESSAGE: &str = "Doação excluída com sucesso!";
const DELETE_FAILED_MESSAGE: &str = "Erro ao excluir doação.";
const UPDATE_FAILED_MESSAGE: &str = "Erro ao atualizar solicitação.";
const EDITED_MESSAGE: &str = "Doação atualizada com sucesso!";
const EDIT_FAILED_MESSAGE: &str = "Erro ao atualizar doação.";

/// 浏览器确认框
fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let identity = auth.identity();

    let data = RwSignal::new(DashboardData::default());
    let (loading, set_loading) = signal(true);
    let (notification, set_notification) = signal(Notice::None);

    let notify_error = move |message: Option<String>| {
        if let Some(message) = message {
            set_notification.set(Some((message, true)));
        }
    };

    let load_dashboard = move || {
        set_loading.set(true);
        spawn_local(async move {
            let loaded = auth.api().load_dashboard().await;
            if loaded.session_expired() {
                // 路由服务会把面板重定向到登录页
                auth.logout();
            } else if loaded.failure_count() > 0 {
                log!("[Api] Dashboard loaded with {} failed part(s)", loaded.failure_count());
                set_notification.set(Some((
                    format!(
                        "Não foi possível carregar {} de 3 seções do painel.",
                        loaded.failure_count()
                    ),
                    true,
                )));
            }
            data.set(loaded);
            set_loading.set(false);
        });
    };

    // 初始加载
    load_dashboard();

    let handle_transition = move |current: Match, to: MatchStatus| {
        spawn_local(async move {
            match auth.api().update_match_status(&current, to, None).await {
                Ok(updated) => {
                    data.update(|d| d.replace_match(&updated));
                    set_notification.set(Some((
                        format!("Solicitação {} com sucesso!", to.display().label.to_lowercase()),
                        false,
                    )));
                }
                Err(e) => notify_error(auth.react_to(&e, UPDATE_FAILED_MESSAGE)),
            }
        });
    };

    let handle_delete = move |donation: Donation| {
        // 只有可用状态的捐赠可以删除
        if !donation.is_editable() || !confirm(DELETE_CONFIRM_MESSAGE) {
            return;
        }
        spawn_local(async move {
            match auth.api().delete_donation(donation.id).await {
                Ok(()) => {
                    data.update(|d| d.remove_donation(donation.id));
                    set_notification.set(Some((DELETED_MESSAGE.to_string(), false)));
                }
                Err(e) => notify_error(auth.react_to(&e, DELETE_FAILED_MESSAGE)),
            }
        });
    };

    // 编辑中的捐赠 id
    let editing = RwSignal::new(Option::<i64>::None);
    let edit_form = RwSignal::new(DonationEditForm::default());
    let edit_errors = RwSignal::new(FieldErrors::default());
    let (saving, set_saving) = signal(false);

    let start_edit = move |donation: Donation| {
        if !donation.is_editable() {
            return;
        }
        edit_form.set(DonationEditForm::from_donation(&donation));
        edit_errors.set(FieldErrors::default());
        editing.set(Some(donation.id));
    };

    let handle_save = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(id) = editing.get_untracked() else {
            return;
        };
        let patch = match edit_form.with_untracked(DonationEditForm::to_patch) {
            Ok(patch) => patch,
            Err(errors) => {
                edit_errors.set(errors);
                return;
            }
        };
        if patch == DonationPatch::default() {
            // 没有改动，不发请求
            editing.set(None);
            return;
        }

        set_saving.set(true);
        spawn_local(async move {
            match auth.api().update_donation(id, patch).await {
                Ok(updated) => {
                    data.update(|d| d.replace_donation(&updated));
                    editing.set(None);
                    set_notification.set(Some((EDITED_MESSAGE.to_string(), false)));
                }
                Err(e) => notify_error(auth.react_to(&e, EDIT_FAILED_MESSAGE)),
            }
            set_saving.set(false);
        });
    };
    let edit_error = move |field: &'static str| {
        Signal::derive(move || edit_errors.with(|e| e.get(field).map(String::from)))
    };

    // 统计数据的派生值
    let donation_stats = move || data.with(DashboardData::donation_stats);
    let request_stats = move || data.with(DashboardData::request_stats);
    let first_name = move || {
        identity.with(|i| {
            i.as_ref()
                .and_then(|i| i.name.split_whitespace().next().map(String::from))
                .unwrap_or_default()
        })
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <Notification notification=notification set_notification=set_notification />

                <Show when=move || editing.get().is_some()>
                    <div class="modal modal-open">
                        <form class="modal-box space-y-2" on:submit=handle_save novalidate>
                            <h3 class="font-bold text-lg">"Editar doação"</h3>
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Título"</span></label>
                                <input type="text" class="input input-bordered"
                                    on:input=move |ev| edit_form.update(|f| f.title = event_target_value(&ev))
                                    prop:value=move || edit_form.with(|f| f.title.clone()) />
                                <FieldError message=edit_error("title") />
                            </div>
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Descrição"</span></label>
                                <textarea class="textarea textarea-bordered h-24"
                                    on:input=move |ev| edit_form.update(|f| f.description = event_target_value(&ev))
                                    prop:value=move || edit_form.with(|f| f.description.clone())></textarea>
                                <FieldError message=edit_error("description") />
                            </div>
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Quantidade"</span></label>
                                <input type="number" min="1" class="input input-bordered"
                                    on:input=move |ev| edit_form.update(|f| f.quantity = event_target_value(&ev))
                                    prop:value=move || edit_form.with(|f| f.quantity.clone()) />
                                <FieldError message=edit_error("quantity") />
                            </div>
                            <div class="modal-action">
                                <button type="button" class="btn btn-ghost" on:click=move |_| editing.set(None)>
                                    "Cancelar"
                                </button>
                                <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                                    "Salvar"
                                </button>
                            </div>
                        </form>
                    </div>
                </Show>

                <div class="flex items-center justify-between">
                    <div>
                        <h1 class="text-3xl font-bold">"Olá, " {first_name} "!"</h1>
                        <p class="text-base-content/70">"Acompanhe suas doações e solicitações"</p>
                    </div>
                    <div class="flex gap-2">
                        <button on:click=move |_| load_dashboard() disabled=move || loading.get() class="btn btn-ghost btn-circle">
                            <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                        </button>
                        <Link to="/create-donation" class="btn btn-primary gap-2">
                            <Plus attr:class="h-4 w-4" /> "Nova doação"
                        </Link>
                    </div>
                </div>

                <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                    <div class="stat">
                        <div class="stat-figure text-primary"><Package attr:class="inline-block w-8 h-8" /></div>
                        <div class="stat-title">"Minhas doações"</div>
                        <div class="stat-value text-primary">{move || donation_stats().total}</div>
                        <div class="stat-desc">
                            {move || {
                                let s = donation_stats();
                                format!("{} disponíveis · {} pendentes · {} concluídas", s.available, s.pending, s.completed)
                            }}
                        </div>
                    </div>
                    <div class="stat">
                        <div class="stat-figure text-secondary"><Inbox attr:class="inline-block w-8 h-8" /></div>
                        <div class="stat-title">"Solicitações recebidas"</div>
                        <div class="stat-value text-secondary">{move || request_stats().total}</div>
                        <div class="stat-desc">
                            {move || {
                                let s = request_stats();
                                format!("{} aguardando · {} aprovadas", s.pending, s.approved)
                            }}
                        </div>
                    </div>
                    <div class="stat">
                        <div class="stat-figure text-accent"><Send attr:class="inline-block w-8 h-8" /></div>
                        <div class="stat-title">"Minhas solicitações"</div>
                        <div class="stat-value text-accent">{move || data.with(|d| d.my_requests.len())}</div>
                    </div>
                </div>

                <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                    // 我的捐赠
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body p-0">
                            <div class="p-6 pb-2">
                                <h3 class="card-title">"Minhas doações"</h3>
                            </div>
                            <div class="overflow-x-auto w-full">
                                <table class="table table-zebra w-full">
                                    <thead>
                                        <tr>
                                            <th>"Título"</th>
                                            <th>"Status"</th>
                                            <th class="hidden md:table-cell">"Criada em"</th>
                                            <th></th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        <Show when=move || data.with(|d| d.my_donations.is_empty())>
                                            <tr>
                                                <td colspan="4" class="text-center py-8 text-base-content/50">
                                                    "Você ainda não publicou doações."
                                                </td>
                                            </tr>
                                        </Show>
                                        <For
                                            each=move || data.with(|d| d.my_donations.clone())
                                            key=|d| (d.id, d.status, d.title.clone())
                                            children=move |donation| {
                                                // 非可用状态的捐赠按钮置灰
                                                let editable = donation.is_editable();
                                                let to_edit = donation.clone();
                                                let to_delete = donation.clone();
                                                view! {
                                                    <tr>
                                                        <td class="font-bold">{donation.title.clone()}</td>
                                                        <td><StatusBadge display=donation.status.display() /></td>
                                                        <td class="hidden md:table-cell text-sm opacity-70">
                                                            {donation.created_at.as_ref().map(format_date)}
                                                        </td>
                                                        <td class="text-right whitespace-nowrap">
                                                            <button class="btn btn-ghost btn-sm" title="Editar"
                                                                disabled=move || !editable
                                                                on:click=move |_| start_edit(to_edit.clone())>
                                                                <Pencil attr:class="h-4 w-4" />
                                                            </button>
                                                            <button class="btn btn-ghost btn-sm text-error" title="Excluir"
                                                                disabled=move || !editable
                                                                on:click=move |_| handle_delete(to_delete.clone())>
                                                                <Trash2 attr:class="h-4 w-4" />
                                                            </button>
                                                        </td>
                                                    </tr>
                                                }
                                            }
                                        />
                                    </tbody>
                                </table>
                            </div>
                        </div>
                    </div>

                    // 收到的请求
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body p-0">
                            <div class="p-6 pb-2">
                                <h3 class="card-title">"Solicitações recebidas"</h3>
                            </div>
                            <div class="overflow-x-auto w-full">
                                <table class="table w-full">
                                    <thead>
                                        <tr>
                                            <th>"Doação"</th>
                                            <th>"Solicitante"</th>
                                            <th class="hidden md:table-cell">"Mensagem"</th>
                                            <th>"Status"</th>
                                            <th></th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        <Show when=move || data.with(|d| d.received_requests.is_empty())>
                                            <tr>
                                                <td colspan="5" class="text-center py-8 text-base-content/50">
                                                    "Nenhuma solicitação recebida."
                                                </td>
                                            </tr>
                                        </Show>
                                        <For
                                            each=move || data.with(|d| d.received_requests.clone())
                                            key=|m| (m.id, m.status)
                                            children=move |m| {
                                                // 按钮由状态机给出的合法迁移决定
                                                let actions = m
                                                    .status
                                                    .transitions()
                                                    .map(|t| {
                                                        let current = m.clone();
                                                        let to = t.to;
                                                        let class = if to == MatchStatus::Rejected {
                                                            "btn btn-outline btn-error btn-xs"
                                                        } else {
                                                            "btn btn-primary btn-xs"
                                                        };
                                                        view! {
                                                            <button class=class on:click=move |_| handle_transition(current.clone(), to)>
                                                                {t.action}
                                                            </button>
                                                        }
                                                    })
                                                    .collect_view();
                                                view! {
                                                    <tr>
                                                        <td class="font-bold">{m.donation_title().to_string()}</td>
                                                        <td>{m.requester_name().to_string()}</td>
                                                        <td class="hidden md:table-cell text-sm opacity-70 max-w-xs truncate">
                                                            {m.message.clone().unwrap_or_default()}
                                                        </td>
                                                        <td><StatusBadge display=m.status.display() /></td>
                                                        <td><div class="flex gap-1 justify-end">{actions}</div></td>
                                                    </tr>
                                                }
                                            }
                                        />
                                    </tbody>
                                </table>
                            </div>
                        </div>
                    </div>

                    // 我发出的请求
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body p-0">
                            <div class="p-6 pb-2">
                                <h3 class="card-title">"Minhas solicitações"</h3>
                            </div>
                            <div class="overflow-x-auto w-full">
                                <table class="table table-zebra w-full">
                                    <thead>
                                        <tr>
                                            <th>"Doação"</th>
                                            <th>"Status"</th>
                                            <th class="hidden md:table-cell">"Solicitada em"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        <Show when=move || data.with(|d| d.my_requests.is_empty())>
                                            <tr>
                                                <td colspan="3" class="text-center py-8 text-base-content/50">
                                                    "Você ainda não solicitou doações. "
                                                    <Link to="/donations" class="link link-primary">"Ver doações"</Link>
                                                </td>
                                            </tr>
                                        </Show>
                                        <For
                                            each=move || data.with(|d| d.my_requests.clone())
                                            key=|m| (m.id, m.status)
                                            children=move |m| view! {
                                                <tr>
                                                    <td class="font-bold">{m.donation_title().to_string()}</td>
                                                    <td><StatusBadge display=m.status.display() /></td>
                                                    <td class="hidden md:table-cell text-sm opacity-70">
                                                        {m.requested_at.as_ref().map(format_date_time)}
                                                    </td>
                                                </tr>
                                            }
                                        />
                                    </tbody>
                                </table>
                            </div>
                        </div>
                    </div>
                </Show>
            </div>
        </div>
    }
}
