pub mod factory;
pub mod traits;
pub mod types;

pub mod finnhub;
pub mod yahoo;

#[cfg(test)]
mod types_tests;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;

/// GET a JSON document, mapping non-2xx responses to `ProviderError::Http`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, ProviderError> {
    let resp = client.get(url).query(query).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Http {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
