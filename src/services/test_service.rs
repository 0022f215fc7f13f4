use reqwest::{Client, RequestBuilder};
use uuid::Uuid;

use crate::config::Config;
use crate::dto::test_dto::{SaveTestPayload, TestResponse};
use crate::error::Result;
use crate::services::parse_response;

/// Persistence seam for test authoring sessions. `TestService` is the real
/// backend client; tests substitute a mock or an in-memory store.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait TestStore {
    async fn get_test(&self, id: Uuid) -> Result<TestResponse>;
    async fn create_test(&self, payload: SaveTestPayload) -> Result<TestResponse>;
    async fn update_test(&self, id: Uuid, payload: SaveTestPayload) -> Result<TestResponse>;
}

#[derive(Clone)]
pub struct TestService {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl TestService {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get_test(&self, id: Uuid) -> Result<TestResponse> {
        let url = format!("{}/api/tests/{}", self.base_url, id);
        let response = self.authorized(self.client.get(&url)).send().await?;
        parse_response(response).await
    }

    pub async fn create_test(&self, payload: &SaveTestPayload) -> Result<TestResponse> {
        let url = format!("{}/api/tests", self.base_url);
        tracing::debug!("Creating test '{}' at {}", payload.name, url);
        let response = self
            .authorized(self.client.post(&url))
            .json(payload)
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn update_test(&self, id: Uuid, payload: &SaveTestPayload) -> Result<TestResponse> {
        let url = format!("{}/api/tests/{}", self.base_url, id);
        let response = self
            .authorized(self.client.put(&url))
            .json(payload)
            .send()
            .await?;
        parse_response(response).await
    }
}

impl TestStore for TestService {
    async fn get_test(&self, id: Uuid) -> Result<TestResponse> {
        TestService::get_test(self, id).await
    }

    async fn create_test(&self, payload: SaveTestPayload) -> Result<TestResponse> {
        TestService::create_test(self, &payload).await
    }

    async fn update_test(&self, id: Uuid, payload: SaveTestPayload) -> Result<TestResponse> {
        TestService::update_test(self, id, &payload).await
    }
}
