//! The front end's entry page
//!
//! `index.html` in the public directory is a Tera template; the settings the
//! browser script needs are rendered into it.

use super::AppState;
use crate::config::ServerConfig;
use crate::controllers::DEFAULT_LIMIT;
use crate::{Error, Result};
use axum::extract::State;
use axum::response::Html;
use serde::Serialize;
use std::path::Path;
use tera::{Context, Tera};

const INDEX: &str = "index.html";

/// Knobs handed to the browser script
#[derive(Debug, Clone, Serialize)]
pub struct FrontendSettings {
    pub api_base: String,
    pub cache_ttl_ms: u64,
    pub search_debounce_ms: u64,
    pub page_size: usize,
}

impl From<&ServerConfig> for FrontendSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            api_base: "/api".into(),
            cache_ttl_ms: config.cache_ttl_secs.saturating_mul(1000),
            search_debounce_ms: config.search_debounce_ms,
            page_size: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug)]
pub struct Pages {
    tera: Tera,
    context: Context,
}

impl Pages {
    pub fn load(public_dir: &Path, settings: &FrontendSettings) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_template_file(public_dir.join(INDEX), Some(INDEX))
            .map_err(template_error)?;

        let mut context = Context::new();
        context.insert("settings", settings);
        // Checked once here so a broken template fails at startup
        tera.render(INDEX, &context).map_err(template_error)?;

        Ok(Self { tera, context })
    }

    pub fn render_index(&self) -> Result<String> {
        self.tera.render(INDEX, &self.context).map_err(template_error)
    }
}

fn template_error(err: tera::Error) -> Error {
    Error::Other(format!("template error: {err}"))
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    state.pages.render_index().map(Html)
}
