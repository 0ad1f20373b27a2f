pub mod draft;
pub mod error;
pub mod items;
pub mod lobby;
pub mod messages;
mod routes;
pub mod scheduler;
pub mod service;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};
use draft::{ItemChooser, Scheduler};
use service::DraftService;
use std::sync::Arc;
use store::LobbyStore;
use tower_http::cors::{Any, CorsLayer};

async fn health() -> &'static str {
    "ok"
}

pub struct AppState<S, K, C> {
    pub service: Arc<DraftService<S, K, C>>,
}

// S, K and C need not be Clone
impl<S, K, C> Clone for AppState<S, K, C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

pub fn app<S, K, C>(service: Arc<DraftService<S, K, C>>) -> Router
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let state = AppState { service };
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/lobbies", post(routes::create_lobby::<S, K, C>))
        .route(
            "/lobbies/:code",
            get(routes::get_lobby::<S, K, C>).delete(routes::delete_lobby::<S, K, C>),
        )
        .route("/lobbies/:code/join", post(routes::join_lobby::<S, K, C>))
        .route(
            "/lobbies/:code/organizer-join",
            post(routes::organizer_join::<S, K, C>),
        )
        .route("/lobbies/:code/ready", post(routes::set_ready::<S, K, C>))
        .route("/lobbies/:code/pick", post(routes::submit_pick::<S, K, C>))
        .route("/lobbies/:code/leave", post(routes::leave_lobby::<S, K, C>))
        .route("/lobbies/:code/reset", post(routes::reset_lobby::<S, K, C>))
        .layer(cors)
        .with_state(state)
}
