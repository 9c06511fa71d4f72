//! Admin endpoint.
//!
//! Served on its own listener, every route behind bearer-token auth.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::get_status;
use crate::engine::Engine;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub engine: Arc<Engine>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(engine: Arc<Engine>, api_key: &str) -> Router {
    let state = AdminState {
        engine,
        api_key: Arc::from(api_key),
    };

    Router::new()
        .route("/admin/status", get(get_status))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
