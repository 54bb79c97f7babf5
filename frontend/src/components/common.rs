//! 页面间共用的小组件

use donamatch_shared::StatusDisplay;
use gloo_timers::callback::Timeout;
use leptos::prelude::*;

/// 通知停留时间
const NOTIFICATION_MILLIS: u32 = 3_000;

/// 通知：消息内容, 是否出错
pub type Notice = Option<(String, bool)>;

/// 右上角通知提示框，3 秒后自动清除
#[component]
pub fn Notification(
    notification: ReadSignal<Notice>,
    set_notification: WriteSignal<Notice>,
) -> impl IntoView {
    Effect::new(move |_| {
        if notification.get().is_some() {
            Timeout::new(NOTIFICATION_MILLIS, move || set_notification.set(None)).forget();
        }
    });

    view! {
        <Show when=move || notification.get().is_some()>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    let is_err = notification.get().map(|(_, e)| e).unwrap_or_default();
                    if is_err { "alert alert-error shadow-lg" } else { "alert alert-success shadow-lg" }
                }>
                    <span>{move || notification.get().map(|(m, _)| m).unwrap_or_default()}</span>
                </div>
            </div>
        </Show>
    }
}

/// 状态徽章
#[component]
pub fn StatusBadge(display: StatusDisplay) -> impl IntoView {
    view! { <span class=display.tone.badge_class()>{display.label}</span> }
}

/// 字段下方的错误提示
#[component]
pub fn FieldError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <label class="label">
                <span class="label-text-alt text-error">{move || message.get().unwrap_or_default()}</span>
            </label>
        </Show>
    }
}

/// 加载中占位
#[component]
pub fn Loading(#[prop(optional)] label: Option<&'static str>) -> impl IntoView {
    view! {
        <div class="flex justify-center items-center py-8 text-base-content/50 gap-2">
            <span class="loading loading-spinner loading-md"></span>
            {label.unwrap_or("Carregando...")}
        </div>
    }
}
