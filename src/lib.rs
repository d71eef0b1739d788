pub mod client;
pub mod config;
pub mod conversation;
#[cfg(not(target_arch = "wasm32"))]
pub mod relay;
pub mod types;
#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;
