use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub mod category_service;
pub mod test_service;

/// Maps a backend reply onto `Result`: 2xx bodies deserialize, anything else
/// becomes `Error::Api` carrying the backend's `{"error": ...}` message when
/// one is present.
pub(crate) async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("error")
                .and_then(|value| value.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
