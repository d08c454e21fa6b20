use super::super::{ Model, Msg };
use yew::prelude::*;

/// Renders the page header with the way back home
pub fn render_header(ctx: &Context<Model>) -> Html {
    html! {
        <header class="app-header">
            <button
                id="home-btn"
                class="home-btn"
                title="Kembali ke beranda"
                onclick={ctx.link().callback(|_| Msg::GoHome)}
            >
                <i class="fa-solid fa-arrow-left"></i>
            </button>
            <h1><i class="fa-solid fa-seedling"></i> {" Deteksi Penyakit Daun Padi"}</h1>
            <p class="subtitle">{"Unggah atau ambil foto daun padi untuk dideteksi"}</p>
        </header>
    }
}
