// hub/src/api/state.rs
//
// Shared service state: one Pipeline instance (owning the graph and the
// advisory store) plus the configured API key, cloned cheaply via Arc
// into every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let api_key: Arc<str> = Arc::from(config.api_key.as_str());
        Self { pipeline: Arc::new(Pipeline::new(config)), api_key }
    }
}
