use axum::Router;

pub mod suppliers;
pub mod system;

pub fn router() -> Router {
    Router::new().nest("/suppliers", suppliers::router())
}
