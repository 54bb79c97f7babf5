use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::icons::*;
use crate::web::router::Link;

#[component]
pub fn HomePage() -> impl IntoView {
    let is_authenticated = use_auth().is_authenticated_signal();

    view! {
        <div class="hero min-h-[70vh] bg-base-200">
            <div class="hero-content text-center">
                <div class="max-w-2xl space-y-6">
                    <Gift attr:class="mx-auto h-16 w-16 text-primary" />
                    <h1 class="text-5xl font-bold">"Doe o que não usa, ajude quem precisa"</h1>
                    <p class="text-lg text-base-content/70">
                        "O DoaMatch conecta doadores a pessoas e instituições que precisam. "
                        "Publique um item, encontre doações perto de você e acompanhe cada entrega."
                    </p>
                    <div class="flex justify-center gap-4">
                        <Link to="/donations" class="btn btn-primary gap-2">
                            <Search attr:class="h-4 w-4" /> "Ver doações"
                        </Link>
                        <Show
                            when=move || is_authenticated.get()
                            fallback=|| view! {
                                <Link to="/register" class="btn btn-outline">"Criar conta"</Link>
                            }
                        >
                            <Link to="/create-donation" class="btn btn-outline gap-2">
                                <Plus attr:class="h-4 w-4" /> "Fazer uma doação"
                            </Link>
                        </Show>
                    </div>
                </div>
            </div>
        </div>
    }
}
