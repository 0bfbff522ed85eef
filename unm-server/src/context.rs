//! Request-level context overrides

use serde::Deserialize;
use std::collections::HashMap;
use unm_common::{Context, EngineSettings, SearchMode};

/// The `context` object of a request.
///
/// Every field is optional; unset fields keep the server's default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiContext {
    pub proxy_uri: Option<String>,
    pub enable_flac: Option<bool>,
    pub search_mode: Option<SearchMode>,
    /// Merged into the default engine settings key by key
    pub config: HashMap<String, EngineSettings>,
}

impl ApiContext {
    /// Apply these overrides to a copy of `base`
    pub fn layer_over(self, base: &Context) -> Context {
        let mut context = base.clone();

        if let Some(proxy_uri) = self.proxy_uri {
            context.proxy_uri = Some(proxy_uri);
        }
        if let Some(enable_flac) = self.enable_flac {
            context.enable_flac = enable_flac;
        }
        if let Some(search_mode) = self.search_mode {
            context.search_mode = search_mode;
        }
        context.merge_engine_config(self.config);

        context
    }
}
