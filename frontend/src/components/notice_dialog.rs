use super::super::{ Model, Msg };
use shared::NoticeKind;
use yew::prelude::*;

pub fn render_notice(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(notice) = &model.notice else {
        return html! {};
    };

    let icon = match notice.kind {
        NoticeKind::Success => "fa-solid fa-circle-check",
        NoticeKind::Error => "fa-solid fa-circle-exclamation",
    };

    html! {
        <div class="modal-backdrop">
            <div class={classes!("modal", "notice", notice.kind.to_string())} role="alertdialog">
                <i class={classes!(icon, "notice-icon")}></i>
                <h2 class="notice-title">{ &notice.title }</h2>
                <p class="notice-text">{ &notice.text }</p>
                <button class="analyze-btn" onclick={ctx.link().callback(|_| Msg::DismissNotice)}>
                    {"OK"}
                </button>
            </div>
        </div>
    }
}
