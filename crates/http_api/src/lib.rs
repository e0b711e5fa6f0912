mod errors;
mod handlers;
mod state;

use axum::{Router, routing::get};

pub use errors::HttpError;
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/uptime", get(handlers::uptime))
        .route("/sources", get(handlers::sources));

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
}
