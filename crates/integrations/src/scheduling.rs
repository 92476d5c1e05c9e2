//! External scheduling page (Calendly).
//!
//! Bookings are made on the provider's page. The site only builds a
//! prefilled link to it.

use serde::Deserialize;
use site_core::{BookingRequest, Error, Result};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SchedulingConfig;

/// Where the scheduling page URL came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingSource {
    /// Configured URL, no provider lookup attempted.
    Configured,
    /// Looked up from the provider account.
    Provider,
    /// Lookup failed; the configured URL is used.
    Fallback { reason: String },
}

/// Builds booking links to the scheduling page.
#[derive(Debug, Clone)]
pub struct SchedulingClient {
    scheduling_url: Url,
    source: SchedulingSource,
}

#[derive(Deserialize)]
struct CurrentUserResponse {
    resource: CurrentUser,
}

#[derive(Deserialize)]
struct CurrentUser {
    scheduling_url: String,
}

impl SchedulingClient {
    /// Creates a client for a fixed scheduling page.
    pub fn new(scheduling_url: &str) -> Result<Self> {
        let scheduling_url = Url::parse(scheduling_url)
            .map_err(|e| Error::config(format!("Invalid scheduling URL: {}", e)))?;
        Ok(Self {
            scheduling_url,
            source: SchedulingSource::Configured,
        })
    }

    fn with_source(mut self, source: SchedulingSource) -> Self {
        self.source = source;
        self
    }

    /// Creates a client, asking the provider for the account's page when a
    /// token is configured. Falls back to the configured URL on any failure,
    /// recorded in [`Self::source`].
    pub async fn resolve(config: &SchedulingConfig) -> Result<Self> {
        let fallback = Self::new(&config.scheduling_url)?;

        let Some(api_key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            debug!("No scheduling API key, using configured scheduling URL");
            return Ok(fallback);
        };

        match fetch_scheduling_url(config, api_key).await {
            Ok(url) => match Self::new(&url) {
                Ok(client) => {
                    info!(url = %url, "Resolved scheduling URL from provider");
                    Ok(client.with_source(SchedulingSource::Provider))
                }
                Err(e) => {
                    warn!(error = %e, "Provider returned unusable scheduling URL");
                    Ok(fallback.with_source(SchedulingSource::Fallback {
                        reason: e.to_string(),
                    }))
                }
            },
            Err(e) => {
                warn!(error = %e, "Scheduling URL lookup failed, using configured URL");
                Ok(fallback.with_source(SchedulingSource::Fallback {
                    reason: e.to_string(),
                }))
            }
        }
    }

    pub fn scheduling_url(&self) -> &Url {
        &self.scheduling_url
    }

    pub fn source(&self) -> &SchedulingSource {
        &self.source
    }

    /// Builds the prefilled booking link for a checked request.
    pub fn booking_url(&self, request: &BookingRequest) -> Result<Url> {
        let date = request.parsed_date()?;
        let mut url = self.scheduling_url.clone();

        {
            let mut query = url.query_pairs_mut();
            if let Some(name) = request.name.as_deref() {
                query.append_pair("name", name.trim());
            }
            if let Some(email) = request.email.as_deref() {
                query.append_pair("email", email.trim());
            }
            query.append_pair("month", &date.format("%Y-%m").to_string());
            query.append_pair("date", &date.format("%Y-%m-%d").to_string());
            if let Some(time) = request.time.as_deref() {
                query.append_pair("a1", &format!("Preferred time: {}", time.trim()));
            }
        }

        Ok(url)
    }
}

async fn fetch_scheduling_url(config: &SchedulingConfig, api_key: &str) -> Result<String> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()
        .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

    let url = format!("{}/users/me", config.api_url.trim_end_matches('/'));

    let response = http_client
        .get(&url)
        .bearer_auth(api_key)
        .send()
        .await
        .map_err(|e| Error::downstream("calendly", format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(Error::downstream(
            "calendly",
            format!("returned {}", response.status()),
        ));
    }

    let user: CurrentUserResponse = response
        .json()
        .await
        .map_err(|e| Error::downstream("calendly", format!("invalid response: {}", e)))?;

    Ok(user.resource.scheduling_url)
}
