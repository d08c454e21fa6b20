use super::super::{ Model, Msg };
use super::utils::{ debounce, display };
use shared::{ ImageSource, Visibility, ALLOWED_TYPES };
use web_sys::{ DragEvent, HtmlInputElement };
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    let view = model.workflow.view();

    html! {
        <div class="upload-section">
            { render_file_input(model, ctx) }
            { render_upload_box(model, ctx, &view) }
            { render_detect_controls(ctx, &view) }
        </div>
    }
}

fn render_file_input(model: &Model, ctx: &Context<Model>) -> Html {
    let handle_change = ctx.link().batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().and_then(|files| files.item(0));
        input.set_value("");
        file.map(|file| Msg::CandidatePicked(file, ImageSource::File))
    });

    html! {
        <input
            ref={model.file_input.clone()}
            type="file"
            id="imageInput"
            accept={ALLOWED_TYPES.join(",")}
            style="display: none;"
            onchange={handle_change}
        />
    }
}

fn render_upload_box(model: &Model, ctx: &Context<Model>, view: &Visibility) -> Html {
    let link = ctx.link();

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);

    let preview_src = model.workflow
        .pending()
        .map(|image| image.preview_data_uri.clone())
        .unwrap_or_default();

    html! {
        <div
            id="uploadBox"
            class={classes!(
                "upload-area",
                model.is_dragging.then_some("drag-over"),
                (!view.source_chooser_enabled).then_some("locked")
            )}
            ondragover={handle_drag_over}
            ondragleave={handle_drag_leave}
            ondrop={handle_drop}
            onclick={debounce(300, {
                let link = link.clone();
                move || link.send_message(Msg::OpenSourceChooser)
            })}
        >
            <div id="upload-placeholder" class="upload-placeholder" style={display(view.placeholder, "flex")}>
                <i class="fa-solid fa-cloud-arrow-up"></i>
                <p>{"Klik atau seret foto daun padi ke sini"}</p>
                <p class="file-types">{"Format yang didukung: JPG, JPEG, PNG"}</p>
            </div>

            <img
                id="preview"
                class="fade-in"
                src={preview_src}
                alt="Pratinjau gambar"
                style={display(view.preview, "block")}
            />

            { render_camera(model, ctx, view) }
        </div>
    }
}

fn render_camera(model: &Model, ctx: &Context<Model>, view: &Visibility) -> Html {
    let link = ctx.link();

    let handle_capture = link.callback(|e: MouseEvent| {
        e.stop_propagation();
        Msg::Capture
    });

    let handle_cancel = link.callback(|e: MouseEvent| {
        e.stop_propagation();
        Msg::CancelCamera
    });

    html! {
        <>
            <div id="camera-container" class="camera-container" style={display(view.camera, "flex")}>
                <video
                    ref={model.video.clone()}
                    id="video"
                    autoplay=true
                />
                <div class="camera-actions">
                    <button id="captureButton" class="analyze-btn" onclick={handle_capture}>
                        <i class="fa-solid fa-camera"></i>{" Ambil Foto"}
                    </button>
                    <button
                        id="cancelCameraButton"
                        class="analyze-btn"
                        style="background-color: var(--danger-color);"
                        onclick={handle_cancel}
                    >
                        <i class="fa-solid fa-times"></i>{" Batal"}
                    </button>
                </div>
            </div>
            <canvas ref={model.canvas.clone()} id="hiddenCanvas" style="display: none;" />
        </>
    }
}

fn render_detect_controls(ctx: &Context<Model>, view: &Visibility) -> Html {
    html! {
        <div class="button-container">
            <button
                id="detectButton"
                class="analyze-btn"
                disabled={!view.submit_enabled}
                onclick={ctx.link().callback(|_| Msg::Detect)}
            >
                <i class="fa-solid fa-magnifying-glass"></i>{" Deteksi"}
            </button>
            <div id="loadingDiv" class="loading" style={display(view.loading, "flex")}>
                <i class="fa-solid fa-spinner fa-spin"></i>
                <p>{"Sedang mendeteksi..."}</p>
            </div>
        </div>
    }
}
