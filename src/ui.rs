use crate::views::ChatView;
use dioxus::prelude::*;

const CHAT_CSS: Asset = asset!("/assets/chat.css");

#[component]
pub fn App() -> Element {
    rsx! {
        document::Title { "MAX Mini-App Chat" }
        document::Link { rel: "stylesheet", href: CHAT_CSS }
        ChatView {}
    }
}
