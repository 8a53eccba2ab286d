use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use refdoc_core::{FetchSettings, HarvestConfig};
use reqwest::header::CONTENT_TYPE;

use crate::decode::decode_page;
use crate::{DocumentSource, Page, SourceError, SourceFactory};

/// Document Source that serves pages as delivered over HTTP. Content that
/// only appears after client-side scripting is not rendered.
#[derive(Debug, Clone)]
pub struct HttpDocumentSource {
    settings: FetchSettings,
    poll_interval: Duration,
    client: reqwest::Client,
}

impl HttpDocumentSource {
    pub fn new(settings: FetchSettings, poll_interval: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;
        Ok(Self {
            settings,
            poll_interval,
            client,
        })
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    fn too_large(&self, actual: u64) -> SourceError {
        SourceError::TooLarge {
            max_bytes: self.settings.max_bytes,
            actual: Some(actual),
        }
    }
}

#[async_trait::async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn load(&self, url: &str) -> Result<Page, SourceError> {
        let mut request_url =
            reqwest::Url::parse(url).map_err(|err| SourceError::InvalidUrl(err.to_string()))?;
        request_url.set_fragment(None);

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status.as_u16()));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(SourceError::UnsupportedContentType(ct.to_string()));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        let decoded = decode_page(&bytes, content_type.as_deref());
        if decoded.had_errors {
            engine_warn!("Malformed {} bytes replaced in {}", decoded.encoding, url);
        }
        engine_debug!("Loaded {} ({} bytes, {})", url, bytes.len(), decoded.encoding);

        Ok(Page::new(url, decoded.text))
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        return SourceError::RequestTimeout(err.to_string());
    }
    if err.is_redirect() {
        return SourceError::RedirectLimitExceeded;
    }
    SourceError::Network(err.to_string())
}

/// Builds one [`HttpDocumentSource`] with its own connection pool per worker.
#[derive(Debug, Clone)]
pub struct HttpSourceFactory {
    settings: FetchSettings,
    poll_interval: Duration,
}

impl HttpSourceFactory {
    pub fn new(settings: FetchSettings, poll_interval: Duration) -> Self {
        Self {
            settings,
            poll_interval,
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(config.fetch.clone(), config.poll_interval)
    }
}

impl SourceFactory for HttpSourceFactory {
    fn create(&self) -> Result<Box<dyn DocumentSource>, SourceError> {
        let source = HttpDocumentSource::new(self.settings.clone(), self.poll_interval)?;
        Ok(Box::new(source))
    }
}
