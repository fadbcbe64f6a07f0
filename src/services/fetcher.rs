//! Listing page retrieval.
//!
//! Fetches the raw page bytes and decodes them with the configured legacy
//! encoding before anything touches the markup.

use async_trait::async_trait;
use encoding_rs::Encoding;
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::WatcherConfig;
use crate::utils::http::create_async_client;

/// Source of the decoded listing page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page and return it as text.
    async fn fetch_page(&self) -> Result<String>;
}

/// Fetches one fixed URL over HTTP.
pub struct HttpFetcher {
    client: Client,
    url: String,
    encoding: &'static Encoding,
    strict: bool,
}

impl HttpFetcher {
    pub fn new(client: Client, config: &WatcherConfig) -> Result<Self> {
        Ok(Self {
            client,
            url: config.url.clone(),
            encoding: config.encoding()?,
            strict: config.strict_decoding,
        })
    }

    /// Build the fetcher together with its own client.
    pub fn from_config(config: &WatcherConfig) -> Result<Self> {
        Self::new(create_async_client(config)?, config)
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self) -> Result<String> {
        let bytes = self.fetch_bytes().await?;
        log::debug!("Fetched {} bytes from {}", bytes.len(), self.url);
        decode_page(&bytes, self.encoding, self.strict)
    }
}

/// Decode page bytes. In strict mode malformed sequences are an error;
/// otherwise they become U+FFFD.
pub fn decode_page(bytes: &[u8], encoding: &'static Encoding, strict: bool) -> Result<String> {
    if strict {
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| AppError::Decode {
                encoding: encoding.name().to_string(),
            })
    } else {
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            log::debug!("Replaced malformed {} sequences", encoding.name());
        }
        Ok(text.into_owned())
    }
}
