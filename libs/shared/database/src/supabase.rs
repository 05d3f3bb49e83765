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

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

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

    /// Reads rows from a PostgREST table. `query` is the raw query string
    /// without the leading `?`.
    pub async fn select<T>(&self, table: &str, query: &str, auth_token: &str) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = if query.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, query)
        };

        self.request(Method::GET, &path, Some(auth_token), None).await
    }

    /// Reads every row matching `query`, `page_size` rows per request.
    /// PostgREST truncates a response at its `max-rows` limit without
    /// reporting it, so a single `select` can silently miss rows. Stops at
    /// the first short page. `query` must carry a total `order`.
    pub async fn select_all<T>(&self, table: &str, query: &str, auth_token: &str,
                               page_size: usize) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let page_size = page_size.max(1);
        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            let paged_query = if query.is_empty() {
                format!("limit={}&offset={}", page_size, offset)
            } else {
                format!("{}&limit={}&offset={}", query, page_size, offset)
            };

            let batch: Vec<T> = self.select(table, &paged_query, auth_token).await?;
            let fetched = batch.len();
            rows.extend(batch);

            if fetched < page_size {
                break;
            }
            offset += page_size;
            debug!("Fetched {} rows from {}, continuing at offset {}", rows.len(), table, offset);
        }

        Ok(rows)
    }
}
