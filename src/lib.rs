// Library exports for the binary and integration tests
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use tokio::sync::watch;

use config::Config;
use services::{api::ApiClient, board::BoardSnapshot};

/// State shared across board handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub board: watch::Receiver<Arc<BoardSnapshot>>,
    pub config: Arc<Config>,
}
