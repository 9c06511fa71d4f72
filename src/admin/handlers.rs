use axum::{extract::State, Json};
use serde::Serialize;

use super::AdminState;

#[derive(Debug, Serialize)]
pub struct EngineStatus {
    pub id: String,
    pub version: &'static str,
    pub urim_template: String,
    pub replay_origin: String,
    pub banner: bool,
    /// Registered exclusions in evaluation order.
    pub exclusions: Vec<String>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<EngineStatus> {
    let settings = state.engine.settings();
    Json(EngineStatus {
        id: settings.id().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        urim_template: settings.pattern().template().to_string(),
        replay_origin: settings.replay_origin().ascii_serialization(),
        banner: settings.banner().enabled,
        exclusions: state.engine.exclusions().names().map(str::to_string).collect(),
    })
}
