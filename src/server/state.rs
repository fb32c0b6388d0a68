//! Shared application state.

use crate::config::AppConfig;
use crate::error::Result;
use crate::logo::LogoLookup;
use crate::render::DocumentRenderer;
use crate::ExecCtx;
use std::sync::Arc;

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Execution context every analysis runs with.
    pub ctx: ExecCtx,
    /// Logo resolver for the competitor directory.
    pub logos: Arc<dyn LogoLookup>,
    /// HTML to PDF converter for report downloads.
    pub renderer: Arc<dyn DocumentRenderer>,
}

impl AppState {
    pub fn new(ctx: ExecCtx, logos: Arc<dyn LogoLookup>, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self { ctx, logos, renderer }
    }
}

/// Build the state from the resolved configuration.
pub fn build_app_state(config: &AppConfig) -> Result<AppState> {
    Ok(AppState {
        ctx: config.exec_ctx()?,
        logos: config.logo_lookup()?,
        renderer: Arc::new(config.renderer()),
    })
}
