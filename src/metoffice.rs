use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::domain::{Region, ValueType};
use crate::error::MetError;

pub const DEFAULT_BASE_URL: &str = "https://www.metoffice.gov.uk/pub/data/weather/uk/climate/datasets";

pub trait ReportClient: Send + Sync {
    fn fetch_report(&self, region: Region, value_type: ValueType) -> Result<String, MetError>;
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub retries: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retries: 0,
        }
    }
}

#[derive(Clone)]
pub struct MetOfficeHttpClient {
    client: Client,
    base_url: String,
    retries: usize,
}

impl MetOfficeHttpClient {
    pub fn new(options: ClientOptions) -> Result<Self, MetError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("met-history/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MetError::FetchHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|err| MetError::FetchHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            retries: options.retries,
        })
    }

    pub fn report_url(&self, region: Region, value_type: ValueType) -> String {
        report_url(&self.base_url, region, value_type)
    }

    fn send_with_retries(&self, url: &str) -> Result<reqwest::blocking::Response, MetError> {
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < self.retries && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < self.retries && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(MetError::FetchHttp(err.to_string()));
                }
            }
        }
    }
}

impl ReportClient for MetOfficeHttpClient {
    fn fetch_report(&self, region: Region, value_type: ValueType) -> Result<String, MetError> {
        let url = self.report_url(region, value_type);
        debug!(%url, "fetching report");
        let response = self.send_with_retries(&url)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Met Office request failed".to_string());
            return Err(MetError::FetchStatus { status, message });
        }
        response
            .text()
            .map_err(|err| MetError::FetchHttp(err.to_string()))
    }
}

pub fn report_url(base_url: &str, region: Region, value_type: ValueType) -> String {
    format!(
        "{}/{}/date/{}.txt",
        base_url.trim_end_matches('/'),
        value_type.dataset_code(),
        region.display_name()
    )
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_urls() {
        assert_eq!(
            report_url(DEFAULT_BASE_URL, Region::Uk, ValueType::MaxTemp),
            "https://www.metoffice.gov.uk/pub/data/weather/uk/climate/datasets/Tmax/date/UK.txt"
        );
        assert_eq!(
            report_url("http://localhost:8080/", Region::Scotland, ValueType::Sunshine),
            "http://localhost:8080/Sunshine/date/Scotland.txt"
        );
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(404));
    }
}
