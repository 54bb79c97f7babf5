//! 物品信息表单组件
//!
//! 负责标题、描述、分类、成色和数量的 UI 渲染。

use donamatch_shared::catalog::{CATEGORIES, CONDITIONS};
use leptos::prelude::*;

use super::form_state::FormState;
use crate::components::common::FieldError;

#[component]
pub fn ItemInfoForm(state: FormState) -> impl IntoView {
    view! {
        <div class="form-control">
            <label for="title" class="label">
                <span class="label-text">"Título *"</span>
            </label>
            <input id="title"
                type="text"
                placeholder="Ex.: Mesa de estudos em madeira"
                on:input=move |ev| state.title.set(event_target_value(&ev))
                prop:value=move || state.title.get()
                class="input input-bordered w-full"
            />
            <FieldError message=state.error("title") />
        </div>

        <div class="form-control">
            <label for="description" class="label">
                <span class="label-text">"Descrição *"</span>
            </label>
            <textarea id="description"
                rows="4"
                placeholder="Descreva o item, tamanho, marca, detalhes de uso..."
                on:input=move |ev| state.description.set(event_target_value(&ev))
                prop:value=move || state.description.get()
                class="textarea textarea-bordered w-full"
            ></textarea>
            <FieldError message=state.error("description") />
        </div>

        <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
            <div class="form-control">
                <label for="category" class="label">
                    <span class="label-text">"Categoria *"</span>
                </label>
                <select id="category"
                    on:change=move |ev| state.category.set(event_target_value(&ev))
                    prop:value=move || state.category.get()
                    class="select select-bordered w-full"
                >
                    <option value="">"Selecione"</option>
                    {CATEGORIES.iter().map(|c| view! { <option value=*c>{*c}</option> }).collect_view()}
                </select>
                <FieldError message=state.error("category") />
            </div>
            <div class="form-control">
                <label for="condition" class="label">
                    <span class="label-text">"Estado de conservação"</span>
                </label>
                <select id="condition"
                    on:change=move |ev| state.condition.set(event_target_value(&ev))
                    prop:value=move || state.condition.get()
                    class="select select-bordered w-full"
                >
                    <option value="">"Não informado"</option>
                    {CONDITIONS.iter().map(|c| view! { <option value=*c>{*c}</option> }).collect_view()}
                </select>
            </div>
            <div class="form-control">
                <label for="quantity" class="label">
                    <span class="label-text">"Quantidade *"</span>
                </label>
                <input id="quantity"
                    type="number"
                    min="1"
                    on:input=move |ev| state.quantity.set(event_target_value(&ev))
                    prop:value=move || state.quantity.get()
                    class="input input-bordered w-full"
                />
                <FieldError message=state.error("quantity") />
            </div>
        </div>
    }
}
