use std::time::Duration;

use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// PostgREST client for the clinic store. One instance is built at startup and
/// shared by every request; the underlying connection pool is safe for
/// concurrent use.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.store_timeout_secs))
            .default_headers(Self::default_headers(&config.supabase_service_key)?)
            .build()?;

        Ok(Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
        })
    }

    fn default_headers(service_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", service_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                error!("Store request to {} timed out", url);
                anyhow!("Store request timed out: {}", e)
            } else {
                error!("Store request to {} failed: {}", url, e);
                anyhow!("Store connection error: {}", e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Invokes a stored procedure through `/rest/v1/rpc/{function}`.
    pub async fn rpc<T>(&self, function: &str, args: Value) -> Result<T>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, Some(args)).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(url: &str) -> AppConfig {
        AppConfig {
            supabase_url: url.to_string(),
            supabase_service_key: "service-key".to_string(),
            store_timeout_secs: 1,
            mail_api_url: String::new(),
            mail_api_key: String::new(),
            mail_from: "noreply@clinic.local".to_string(),
            mail_timeout_secs: 1,
            emergency_keywords: vec!["emergency".to_string()],
            visit_cost_estimate: 150.0,
            insured_copay: 25.0,
            port: 3000,
        }
    }

    #[tokio::test]
    async fn test_request_sends_service_key_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/doctors"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri())).unwrap();
        let rows: Vec<Value> = client.request(Method::GET, "/rest/v1/doctors", None).await.unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri())).unwrap();
        let result: Result<Vec<Value>> = client.request(Method::GET, "/rest/v1/slots", None).await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("500"));
    }

    #[tokio::test]
    async fn test_rpc_posts_arguments_with_service_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/book_slot"))
            .and(header("apikey", "service-key"))
            .and(body_json(json!({"p_slot_id": "abc"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"outcome": "booked"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri())).unwrap();
        let outcome: Value = client.rpc("book_slot", json!({"p_slot_id": "abc"})).await.unwrap();

        assert_eq!(outcome["outcome"], "booked");
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/book_slot"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"outcome": "booked"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri())).unwrap();
        let result: Result<Value> = client.rpc("book_slot", json!({})).await;

        assert!(result.unwrap_err().to_string().contains("timed out"));
    }
}
