//! Live Stripe REST client.
//!
//! Writes are form-encoded per the Stripe API convention; reads decode the
//! standard list envelope. `list_all_products` walks cursor pagination until
//! `has_more` is false.

use async_trait::async_trait;
use std::time::Duration;

use crate::client::{CreatePriceRequest, CreateProductRequest, ProviderClient};
use crate::error::ProviderError;
use crate::types::{StripeList, StripePrice, StripeProduct};

const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";
const PAGE_SIZE: usize = 100;

/// REST client for the Stripe catalog API.
pub struct StripeHttpClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeHttpClient {
    /// Create a client against the public Stripe API.
    #[must_use]
    pub fn new(secret_key: &str) -> Self {
        Self::with_base_url(secret_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (stripe-mock in tests).
    #[must_use]
    pub fn with_base_url(secret_key: &str, base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client construction cannot fail with static config");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Self::decode_response(response).await
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Self::decode_response(response).await
    }

    async fn decode_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(extract_error_message(&body)));
        }
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// Pull `error.message` out of a Stripe error body, falling back to the body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Escape a value for embedding in a Stripe search query string.
fn escape_search_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl ProviderClient for StripeHttpClient {
    async fn get_product(&self, provider_id: &str) -> Result<StripeProduct, ProviderError> {
        self.get_json(&format!("/products/{provider_id}"), &[]).await
    }

    async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<StripeProduct, ProviderError> {
        let mut form: Vec<(String, String)> = vec![
            ("name".to_string(), request.name.clone()),
            ("description".to_string(), request.description.clone()),
        ];
        for (i, image) in request.images.iter().enumerate() {
            form.push((format!("images[{i}]"), image.clone()));
        }
        for (key, value) in &request.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        let product: StripeProduct = self.post_form("/products", &form).await?;
        tracing::info!(stripe_id = %product.id, name = %product.name, "Created Stripe product");
        Ok(product)
    }

    async fn create_price(
        &self,
        request: &CreatePriceRequest,
    ) -> Result<StripePrice, ProviderError> {
        let mut form: Vec<(String, String)> = vec![
            ("product".to_string(), request.product.clone()),
            ("unit_amount".to_string(), request.unit_amount.to_string()),
            ("currency".to_string(), request.currency.to_lowercase()),
        ];
        if let Some((interval, count)) = &request.recurring {
            form.push(("recurring[interval]".to_string(), interval.clone()));
            form.push((
                "recurring[interval_count]".to_string(),
                count.to_string(),
            ));
        }

        let price: StripePrice = self.post_form("/prices", &form).await?;
        tracing::info!(stripe_id = %price.id, product = %price.product, "Created Stripe price");
        Ok(price)
    }

    async fn list_all_products(&self) -> Result<Vec<StripeProduct>, ProviderError> {
        let mut products = Vec::new();
        let mut starting_after: Option<String> = None;

        loop {
            let mut query = vec![("limit".to_string(), PAGE_SIZE.to_string())];
            if let Some(cursor) = &starting_after {
                query.push(("starting_after".to_string(), cursor.clone()));
            }

            let page: StripeList<StripeProduct> =
                self.get_json("/products", &query).await?;

            let has_more = page.has_more;
            starting_after = page.data.last().map(|p| p.id.clone());
            products.extend(page.data);

            if !has_more || starting_after.is_none() {
                break;
            }
        }

        tracing::debug!(count = products.len(), "Listed Stripe products");
        Ok(products)
    }

    async fn find_product_by_name(
        &self,
        name: &str,
    ) -> Result<Option<StripeProduct>, ProviderError> {
        let query = format!("name:'{}'", escape_search_value(name));
        let page: StripeList<StripeProduct> = self
            .get_json(
                "/products/search",
                &[
                    ("query".to_string(), query),
                    ("limit".to_string(), "10".to_string()),
                ],
            )
            .await?;

        // search is analyzed; keep only the exact match
        Ok(page.data.into_iter().find(|p| p.name == name))
    }

    async fn find_product_by_metadata(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Option<StripeProduct>, ProviderError> {
        let query = format!(
            "metadata['{}']:'{}'",
            escape_search_value(key),
            escape_search_value(value)
        );
        let page: StripeList<StripeProduct> = self
            .get_json(
                "/products/search",
                &[
                    ("query".to_string(), query),
                    ("limit".to_string(), "1".to_string()),
                ],
            )
            .await?;

        Ok(page.data.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_value_escaping() {
        assert_eq!(escape_search_value("plain"), "plain");
        assert_eq!(escape_search_value("it's"), "it\\'s");
        assert_eq!(escape_search_value("a\\b"), "a\\\\b");
    }

    #[test]
    fn error_message_extraction() {
        let body = r#"{"error": {"message": "No such product: 'prod_X'"}}"#;
        assert_eq!(extract_error_message(body), "No such product: 'prod_X'");

        assert_eq!(extract_error_message("plain text"), "plain text");
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = StripeHttpClient::with_base_url("sk_test", "http://localhost:12111/");
        assert_eq!(client.base_url, "http://localhost:12111");
    }
}
