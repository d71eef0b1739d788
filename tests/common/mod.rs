//! Mock backend and server helpers shared by the integration tests.
#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderMap;
use maxchat::config::RelayConfig;
use maxchat::relay::{self, RelayState};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// A request as the mock backend received it.
#[derive(Clone, Debug)]
pub struct Received {
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub type Inbox = Arc<Mutex<Vec<Received>>>;

pub async fn spawn_app(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub async fn spawn_relay(config: RelayConfig) -> SocketAddr {
    spawn_app(relay::router(RelayState::new(config))).await
}

/// Backend whose `/chat` records each request into the returned inbox and
/// answers with `respond()`.
pub async fn spawn_backend<F>(respond: F) -> (SocketAddr, Inbox)
where
    F: Fn() -> axum::response::Response + Clone + Send + Sync + 'static,
{
    let inbox: Inbox = Arc::default();
    let router = Router::new()
        .route(
            "/chat",
            axum::routing::post(
                move |State(inbox): State<Inbox>, headers: HeaderMap, body: Bytes| {
                    let respond = respond.clone();
                    async move {
                        inbox.lock().unwrap().push(Received { headers, body });
                        respond()
                    }
                },
            ),
        )
        .layer(DefaultBodyLimit::disable())
        .with_state(inbox.clone());
    (spawn_app(router).await, inbox)
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
