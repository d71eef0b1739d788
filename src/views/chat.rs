use crate::client::RelayClient;
use crate::config::ClientConfig;
use crate::conversation::Conversation;
use crate::types::Role;
use dioxus::events::Key;
use dioxus::prelude::*;

const EMPTY_HINT: &str = "Напиши сообщение — я отправлю его на бэкенд и покажу ответ.";
const PENDING_LABEL: &str = "Отправляю…";
const INPUT_PLACEHOLDER: &str = "Сообщение…";
const SEND_LABEL: &str = "Отправить";

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Bot => "bot",
    }
}

#[component]
pub fn ChatView() -> Element {
    let conversation = use_signal(Conversation::new);
    let mut draft = use_signal(String::new);
    let client = use_signal(|| RelayClient::from_config(&ClientConfig::load()));

    let mut send_message = {
        let mut conversation = conversation;
        let mut draft_signal = draft;
        move |text: String| {
            let Some(request) = conversation.with_mut(|c| c.submit(&text)) else {
                return;
            };
            draft_signal.set(String::new());

            let client = client.peek().clone();
            spawn(async move {
                let outcome = client.send(&request).await;
                conversation.with_mut(|c| c.settle(outcome));
            });
        }
    };

    let snapshot = conversation();
    let busy = snapshot.is_busy();
    let can_send = snapshot.can_submit(&draft());

    rsx! {
        div { class: "main-container",
            h1 { class: "page-title", "MAX Mini-App Chat" }
            div { id: "chat-list", class: "chat-list",
                if snapshot.messages().is_empty() {
                    p { class: "chat-hint", "{EMPTY_HINT}" }
                }
                for msg in snapshot.messages().iter() {
                    div { class: format_args!("message-row {}", role_class(msg.role)),
                        span { class: format_args!("bubble {}", role_class(msg.role)), "{msg.text}" }
                    }
                }
                if busy {
                    div { class: "pending", "{PENDING_LABEL}" }
                }
            }

            div { class: "composer",
                input {
                    class: "composer-input",
                    r#type: "text",
                    placeholder: INPUT_PLACEHOLDER,
                    value: "{draft}",
                    disabled: busy,
                    autofocus: true,
                    oninput: move |ev| draft.set(ev.value()),
                    onkeydown: move |ev| {
                        if ev.key() == Key::Enter && !ev.modifiers().shift() {
                            ev.prevent_default();
                            send_message(draft());
                        }
                    },
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: !can_send,
                    onclick: move |_| send_message(draft()),
                    "{SEND_LABEL}"
                }
            }
        }
    }
}
