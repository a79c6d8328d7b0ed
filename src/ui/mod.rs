//! Web UI handlers - server-rendered demo of the toggle.
//!
//! - components/ - Layout and the pre-paint theme script
//! - pages/ - Page components

pub mod components;
pub mod pages;

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use dioxus::prelude::*;
use serde::Serialize;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::config::ToggleConfig;
use pages::DemoPage;

/// Shared state for UI handlers
pub struct UiState {
    /// Toggle configuration rendered on the demo page
    pub toggle: ToggleConfig,
}

pub type SharedUiState = Arc<UiState>;

/// Build the router with all UI routes and middleware
pub fn router(state: SharedUiState) -> Router {
    Router::new()
        .route("/", get(demo_page))
        .route("/healthz", get(healthz))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Render the full demo document
pub fn render_demo_page(config: &ToggleConfig) -> String {
    let config = config.clone();
    let html = dioxus::ssr::render_element(rsx! { DemoPage { config: config } });
    format!("<!DOCTYPE html>\n<html lang=\"en\">\n{}</html>", html)
}

/// GET / - Demo page
pub async fn demo_page(State(state): State<SharedUiState>) -> impl IntoResponse {
    Html(render_demo_page(&state.toggle))
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// GET /healthz
async fn healthz() -> impl IntoResponse {
    Json(Health {
        status: "ok",
        version: env!("DMT_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_page_renders_toggle_and_script() {
        let html = render_demo_page(&ToggleConfig::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"role="switch""#));
        assert!(html.contains("dm:theme"));
        assert!(html.contains("No change yet"));
    }

    #[test]
    fn test_demo_page_reflects_config() {
        let config = ToggleConfig::from_attributes([("theme", "dark"), ("label", "Lights out")]);
        let html = render_demo_page(&config);
        assert!(html.contains(r#"aria-label="Lights out""#));
        assert!(html.contains(r#"data-state="dark""#));
    }
}
