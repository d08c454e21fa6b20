use super::super::{ Model, Msg };
use yew::prelude::*;

/// Modal asking whether the photo comes from the camera or from a file.
pub fn render_source_chooser(model: &Model, ctx: &Context<Model>) -> Html {
    if !model.chooser_open {
        return html! {};
    }

    let link = ctx.link();

    html! {
        <div class="modal-backdrop" onclick={link.callback(|_| Msg::CloseSourceChooser)}>
            <div class="modal" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
                <button
                    class="modal-close"
                    title="Tutup"
                    onclick={link.callback(|_| Msg::CloseSourceChooser)}
                >
                    <i class="fa-solid fa-times"></i>
                </button>
                <h2>{"Pilih Metode Unggah"}</h2>
                <div class="option-grid">
                    <div id="opt-camera" class="option-item" onclick={link.callback(|_| Msg::ChooseCamera)}>
                        <i class="fas fa-camera"></i>
                        <b>{"Kamera"}</b>
                    </div>
                    <div id="opt-file" class="option-item" onclick={link.callback(|_| Msg::ChooseGallery)}>
                        <i class="fas fa-file-image"></i>
                        <b>{"Galeri / File"}</b>
                    </div>
                </div>
            </div>
        </div>
    }
}
