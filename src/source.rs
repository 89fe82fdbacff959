// Booking source: where the shared booking offers come from.
// The listing only ever reads the whole collection; filtering happens client-side.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::config::{ConfigError, SourceConfig};
use crate::offer::BookingOffer;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    Status { status_code: u16, message: String },

    #[error("Malformed booking data: {0}")]
    Decode(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[async_trait]
pub trait BookingSource: Send + Sync {
    // Fetch the full collection; no parameters, no paging
    async fn fetch_offers(&self) -> Result<Vec<BookingOffer>, SourceError>;
}

/// Reads the offer collection over HTTP. One GET per call, no retries.
pub struct HttpBookingSource {
    http: reqwest::Client,
    config: SourceConfig,
}

impl HttpBookingSource {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let config = config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let http = builder
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, SourceError> {
        Self::new(SourceConfig::from_env()?)
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn map_transport_error(&self, error: reqwest::Error) -> SourceError {
        match self.config.timeout_ms {
            Some(timeout_ms) if error.is_timeout() => SourceError::Timeout(timeout_ms),
            _ => SourceError::Network(error.to_string()),
        }
    }
}

#[async_trait]
impl BookingSource for HttpBookingSource {
    async fn fetch_offers(&self) -> Result<Vec<BookingOffer>, SourceError> {
        let url = self.config.offers_url();
        tracing::debug!(%url, "fetching shared booking offers");

        let mut request = self.http.get(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status_code: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let offers: Vec<BookingOffer> =
            serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))?;

        for offer in offers.iter().filter(|o| !o.has_consistent_capacity()) {
            tracing::warn!(
                offer_id = %offer.id,
                free_capacity = offer.free_capacity,
                capacity = offer.vehicle.capacity,
                "offer reports more free capacity than the vehicle holds"
            );
        }

        Ok(offers)
    }
}

/// Serves a fixed result from memory, optionally after a delay.
pub struct StaticBookingSource {
    result: Result<Vec<BookingOffer>, SourceError>,
    delay: Option<Duration>,
    request_count: AtomicUsize,
}

impl StaticBookingSource {
    pub fn new(offers: Vec<BookingOffer>) -> Self {
        Self {
            result: Ok(offers),
            delay: None,
            request_count: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            request_count: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookingSource for StaticBookingSource {
    async fn fetch_offers(&self) -> Result<Vec<BookingOffer>, SourceError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.result.clone()
    }
}
