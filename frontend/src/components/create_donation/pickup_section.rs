//! 取货信息配置组件
//!
//! 负责地址、取货说明和过期日期的 UI 渲染，全部为可选项。

use donamatch_shared::catalog::STATES;
use leptos::prelude::*;

use super::form_state::FormState;
use crate::components::common::FieldError;

#[component]
pub fn PickupSection(state: FormState) -> impl IntoView {
    view! {
        <div class="divider text-sm opacity-70">"Retirada"</div>

        <div class="form-control">
            <label for="location" class="label">
                <span class="label-text">"Endereço / ponto de referência"</span>
            </label>
            <input id="location"
                type="text"
                on:input=move |ev| state.location.set(event_target_value(&ev))
                prop:value=move || state.location.get()
                class="input input-bordered w-full"
            />
        </div>

        <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
            <div class="form-control">
                <label for="city" class="label">
                    <span class="label-text">"Cidade"</span>
                </label>
                <input id="city"
                    type="text"
                    on:input=move |ev| state.city.set(event_target_value(&ev))
                    prop:value=move || state.city.get()
                    class="input input-bordered w-full"
                />
            </div>
            <div class="form-control">
                <label for="state" class="label">
                    <span class="label-text">"Estado"</span>
                </label>
                <select id="state"
                    on:change=move |ev| state.state.set(event_target_value(&ev))
                    prop:value=move || state.state.get()
                    class="select select-bordered w-full"
                >
                    <option value="">"Selecione"</option>
                    {STATES.iter().map(|uf| view! { <option value=*uf>{*uf}</option> }).collect_view()}
                </select>
            </div>
            <div class="form-control">
                <label for="zip" class="label">
                    <span class="label-text">"CEP"</span>
                </label>
                <input id="zip"
                    type="text"
                    on:input=move |ev| state.zip_code.set(event_target_value(&ev))
                    prop:value=move || state.zip_code.get()
                    class="input input-bordered w-full"
                />
            </div>
        </div>

        <div class="form-control">
            <label for="pickup" class="label">
                <span class="label-text">"Instruções de retirada"</span>
            </label>
            <textarea id="pickup"
                rows="2"
                placeholder="Horários, contato, como encontrar..."
                on:input=move |ev| state.pickup_instructions.set(event_target_value(&ev))
                prop:value=move || state.pickup_instructions.get()
                class="textarea textarea-bordered w-full"
            ></textarea>
        </div>

        <div class="form-control">
            <label for="expires" class="label">
                <span class="label-text">"Disponível até"</span>
            </label>
            <input id="expires"
                type="date"
                on:input=move |ev| state.expires_at.set(event_target_value(&ev))
                prop:value=move || state.expires_at.get()
                class="input input-bordered w-full md:w-1/3"
            />
            <FieldError message=state.error("expiresAt") />
        </div>
    }
}
