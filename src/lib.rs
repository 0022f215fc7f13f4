pub mod config;
pub mod content;
pub mod dto;
pub mod editor;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::error::Result;
use crate::services::category_service::CategoryService;
use crate::services::test_service::TestService;
use reqwest::Client;

/// The backend collaborators the dashboard talks to, built once from config
/// and shared by every editor session.
#[derive(Clone)]
pub struct AppState {
    pub test_service: TestService,
    pub category_service: CategoryService,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            test_service: TestService::new(http_client.clone(), config),
            category_service: CategoryService::new(http_client, config),
        })
    }
}
