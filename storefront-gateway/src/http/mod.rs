//! HTTP layer: Axum router, admin access gate, backend proxy handlers and
//! page serving.

mod error;
mod gate;
mod handlers;
mod requests;
mod responses;
mod rewrite;
mod state;


pub use handlers::router;
pub use state::AppState;
