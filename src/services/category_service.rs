use reqwest::{Client, RequestBuilder};

use crate::config::Config;
use crate::dto::category_dto::CreateCategoriesPayload;
use crate::error::Result;
use crate::models::category::Category;
use crate::services::parse_response;

#[derive(Clone)]
pub struct CategoryService {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl CategoryService {
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

    /// The tenant's full category list, for the assignment picker.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let url = format!("{}/api/categories", self.base_url);
        let response = self.authorized(self.client.get(&url)).send().await?;
        parse_response(response).await
    }

    /// Creates categories in bulk and returns them with their assigned ids,
    /// in the order the names were given.
    pub async fn create_categories(&self, names: Vec<String>) -> Result<Vec<Category>> {
        let url = format!("{}/api/categories", self.base_url);
        let payload = CreateCategoriesPayload { names };
        let response = self
            .authorized(self.client.post(&url))
            .json(&payload)
            .send()
            .await?;
        parse_response(response).await
    }
}
