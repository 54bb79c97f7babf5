use donamatch_shared::catalog::{CATEGORIES, STATES};
use donamatch_shared::date::format_date;
use donamatch_shared::protocol::DonationFilters;
use donamatch_shared::{DEFAULT_PAGE_SIZE, Donation, PageResponse};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::common::{Loading, Notice, Notification, StatusBadge};
use crate::components::icons::*;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

const LOAD_FAILED_MESSAGE: &str = "Erro ao carregar doações. Tente novamente.";
const REQUEST_FAILED_MESSAGE: &str = "Erro ao solicitar doação. Tente novamente.";
const REQUEST_SENT_MESSAGE: &str = "Solicitação enviada com sucesso!";

/// 用户在过滤表单中填写的部分
#[derive(Debug, Clone, Default, PartialEq)]
struct Criteria {
    search: String,
    category: String,
    city: String,
    state: String,
}

impl Criteria {
    /// 合并固定的浏览条件（仅可用、按创建时间倒序）
    fn to_filters(&self, page: u32) -> DonationFilters {
        DonationFilters {
            search: self.search.clone(),
            category: self.category.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            ..DonationFilters::browse(page, DEFAULT_PAGE_SIZE)
        }
    }
}

#[component]
pub fn DonationsPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let identity = auth.identity();

    let criteria = RwSignal::new(Criteria::default());
    let page = RwSignal::new(Option::<PageResponse<Donation>>::None);
    let (loading, set_loading) = signal(true);
    let (notification, set_notification) = signal(Notice::None);

    // 只采用最后一次查询的结果
    let latest_query = StoredValue::new(0u64);

    let load = move |number: u32| {
        let filters = criteria.with_untracked(|c| c.to_filters(number));
        latest_query.update_value(|n| *n += 1);
        let query = latest_query.get_value();
        set_loading.set(true);
        spawn_local(async move {
            let result = auth.api().list_donations(filters).await;
            if latest_query.try_get_value() != Some(query) {
                return;
            }
            match result {
                Ok(data) => page.set(Some(data)),
                Err(e) => {
                    if let Some(message) = auth.react_to(&e, LOAD_FAILED_MESSAGE) {
                        set_notification.set(Some((message, true)));
                    }
                }
            }
            set_loading.set(false);
        });
    };

    // 初始加载
    load(0);

    // 过滤条件每次变化都回到第一页
    let set_criteria = move |field: fn(&mut Criteria, String), value: String| {
        criteria.update(|c| field(c, value));
        load(0);
    };

    let on_search = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        load(0);
    };

    let on_clear = move |_| {
        criteria.set(Criteria::default());
        load(0);
    };

    let handle_request = move |donation: Donation| {
        if !auth.is_logged_in() {
            auth.set_return_url(AppRoute::Donations.to_path());
            router.navigate(AppRoute::Login.to_path());
            return;
        }
        spawn_local(async move {
            match auth.api().request_donation(&donation).await {
                Ok(_) => set_notification.set(Some((REQUEST_SENT_MESSAGE.to_string(), false))),
                Err(e) => match auth.react_to(&e, REQUEST_FAILED_MESSAGE) {
                    Some(message) => set_notification.set(Some((message, true))),
                    None => {
                        auth.set_return_url(AppRoute::Donations.to_path());
                        router.navigate(AppRoute::Login.to_path());
                    }
                },
            }
        });
    };

    // 分页信息的派生值
    let current_page = move || page.with(|p| p.as_ref().map(|p| p.number).unwrap_or_default());
    let total_pages = move || page.with(|p| p.as_ref().map(|p| p.total_pages).unwrap_or_default());
    let is_first = move || page.with(|p| p.as_ref().map(|p| p.first).unwrap_or(true));
    let is_last = move || page.with(|p| p.as_ref().map(|p| p.last).unwrap_or(true));
    let is_empty = move || page.with(|p| p.as_ref().is_none_or(|p| p.content.is_empty()));

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-7xl mx-auto space-y-6">
                <Notification notification=notification set_notification=set_notification />

                <div>
                    <h1 class="text-3xl font-bold">"Doações disponíveis"</h1>
                    <p class="text-base-content/70">"Encontre itens doados perto de você"</p>
                </div>

                <form class="card bg-base-100 shadow" on:submit=on_search>
                    <div class="card-body grid grid-cols-1 md:grid-cols-5 gap-3 items-end">
                        <div class="form-control md:col-span-2">
                            <label class="label"><span class="label-text">"Buscar"</span></label>
                            <input type="text" placeholder="O que você procura?" class="input input-bordered"
                                on:input=move |ev| set_criteria(|c, v| c.search = v, event_target_value(&ev))
                                prop:value=move || criteria.with(|c| c.search.clone()) />
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Categoria"</span></label>
                            <select class="select select-bordered"
                                on:change=move |ev| set_criteria(|c, v| c.category = v, event_target_value(&ev))
                                prop:value=move || criteria.with(|c| c.category.clone())>
                                <option value="">"Todas"</option>
                                {CATEGORIES.iter().map(|c| view! { <option value=*c>{*c}</option> }).collect_view()}
                            </select>
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Cidade"</span></label>
                            <input type="text" class="input input-bordered"
                                on:input=move |ev| set_criteria(|c, v| c.city = v, event_target_value(&ev))
                                prop:value=move || criteria.with(|c| c.city.clone()) />
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Estado"</span></label>
                            <select class="select select-bordered"
                                on:change=move |ev| set_criteria(|c, v| c.state = v, event_target_value(&ev))
                                prop:value=move || criteria.with(|c| c.state.clone())>
                                <option value="">"Todos"</option>
                                {STATES.iter().map(|uf| view! { <option value=*uf>{*uf}</option> }).collect_view()}
                            </select>
                        </div>
                        <div class="md:col-span-5 flex justify-end gap-2">
                            <button type="button" class="btn btn-ghost" on:click=on_clear>"Limpar"</button>
                            <button type="submit" class="btn btn-primary gap-2">
                                <Search attr:class="h-4 w-4" /> "Buscar"
                            </button>
                        </div>
                    </div>
                </form>

                <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                    <Show
                        when=move || !is_empty()
                        fallback=|| view! {
                            <div class="text-center py-12 text-base-content/50">
                                <Package attr:class="mx-auto h-12 w-12 mb-2" />
                                "Nenhuma doação encontrada."
                            </div>
                        }
                    >
                        <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-6">
                            <For
                                each=move || page.with(|p| p.as_ref().map(|p| p.content.clone()).unwrap_or_default())
                                key=|d| d.id
                                children=move |donation| {
                                    let own = identity.with_untracked(|i| {
                                        i.as_ref().zip(donation.donor.as_ref()).is_some_and(|(me, donor)| me.id == donor.id)
                                    });
                                    let to_request = donation.clone();
                                    view! {
                                        <div class="card bg-base-100 shadow-xl">
                                            <div class="card-body">
                                                <div class="flex justify-between items-start gap-2">
                                                    <h2 class="card-title">{donation.title.clone()}</h2>
                                                    <StatusBadge display=donation.status.display() />
                                                </div>
                                                <p class="text-sm text-base-content/70 line-clamp-3">{donation.description.clone()}</p>
                                                <div class="flex flex-wrap gap-2 text-xs">
                                                    <span class="badge badge-outline">{donation.category.clone()}</span>
                                                    {donation.condition.clone().map(|c| view! { <span class="badge badge-outline">{c}</span> })}
                                                    <span class="badge badge-outline">"Qtd: " {donation.quantity}</span>
                                                </div>
                                                {donation.place().map(|place| view! {
                                                    <div class="flex items-center gap-1 text-sm opacity-70">
                                                        <MapPin attr:class="h-4 w-4" /> {place}
                                                    </div>
                                                })}
                                                <div class="text-xs opacity-50">
                                                    {donation.donor.as_ref().map(|d| format!("Doado por {}", d.name))}
                                                    {donation.created_at.as_ref().map(|t| format!(" em {}", format_date(t)))}
                                                </div>
                                                <div class="card-actions justify-end">
                                                    <Show when=move || !own>
                                                        {
                                                            let to_request = to_request.clone();
                                                            view! {
                                                                <button class="btn btn-primary btn-sm gap-1"
                                                                    on:click=move |_| handle_request(to_request.clone())>
                                                                    <Send attr:class="h-4 w-4" /> "Solicitar"
                                                                </button>
                                                            }
                                                        }
                                                    </Show>
                                                </div>
                                            </div>
                                        </div>
                                    }
                                }
                            />
                        </div>

                        <div class="flex justify-center items-center gap-4">
                            <button class="btn btn-sm" disabled=is_first on:click=move |_| load(current_page().saturating_sub(1))>
                                "Anterior"
                            </button>
                            <span class="text-sm">
                                "Página " {move || current_page() + 1} " de " {move || total_pages().max(1)}
                            </span>
                            <button class="btn btn-sm" disabled=is_last on:click=move |_| load(current_page() + 1)>
                                "Próxima"
                            </button>
                        </div>
                    </Show>
                </Show>
            </div>
        </div>
    }
}
