//! HTTP client for the devices REST API.
//!
//! Wraps `reqwest` with device-specific error handling and typed
//! (de)serialization through [`invdb_core::WireDevice`]. Non-2xx responses
//! surface the server's JSON `message`/`error` field as [`ClientError::Api`].

use std::time::Duration;

use chrono::Utc;
use invdb_core::{AppConfig, Device, WireDevice};
use reqwest::{Client, Response, Url};

use crate::error::ClientError;
use crate::retry::RetryPolicy;

/// Client for the devices REST API.
///
/// Use [`DevicesClient::new`] with the loaded [`AppConfig`], or
/// [`DevicesClient::with_base_url`] to point at a mock server in tests.
pub struct DevicesClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl DevicesClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `api_endpoint` is not a URL.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(
            &config.api_endpoint,
            config.request_timeout_secs,
            &config.user_agent,
            config.write_max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Creates a client with an explicit base URL and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` is not a URL that can
    /// carry path segments.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let parsed = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            ClientError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            }
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot carry a path".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            retry: RetryPolicy {
                max_retries,
                backoff_base_ms,
            },
        })
    }

    /// Creates or replaces a device, keyed by its `PK`/`SK` pair.
    ///
    /// Any 2xx status means the write was accepted. The returned record is the
    /// one the server echoed back when the body decodes as a device, otherwise
    /// the submitted one.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx status.
    /// - [`ClientError::Http`] on network failure after all retries.
    pub async fn upsert_device(&self, device: &Device) -> Result<Device, ClientError> {
        let url = self.endpoint(&["devices"]);
        let payload = device.to_wire();
        let request = format!("POST /devices ({})", device.keys);

        let body = self.retry.run(&request, || {
            let url = url.clone();
            let payload = &payload;
            async move {
                let response = self.client.post(url).json(payload).send().await?;
                let response = check_status(response).await?;
                Ok(response.text().await?)
            }
        })
        .await?;

        Ok(confirmed_device(&body, device, &request))
    }

    /// Fetches every stored device.
    ///
    /// Records that parse as JSON but fail device validation are logged and
    /// skipped rather than failing the whole listing.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx status.
    /// - [`ClientError::Http`] on network failure after all retries.
    /// - [`ClientError::Deserialize`] if the body is not an array of devices.
    pub async fn list_devices(&self) -> Result<Vec<Device>, ClientError> {
        let url = self.endpoint(&["devices"]);

        let body = self.retry.run("GET /devices", || {
            let url = url.clone();
            async move {
                let response = self.client.get(url).send().await?;
                let response = check_status(response).await?;
                Ok(response.text().await?)
            }
        })
        .await?;

        let records: Vec<WireDevice> =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: "GET /devices".to_owned(),
                source: e,
            })?;

        let now = Utc::now();
        let devices = records
            .into_iter()
            .filter_map(|wire| {
                let keys = format!("{}/{}", wire.primary_key, wire.secondary_key);
                match Device::from_wire(wire, now) {
                    Ok(device) => Some(device),
                    Err(e) => {
                        tracing::warn!(keys = %keys, error = %e, "skipping invalid device record");
                        None
                    }
                }
            })
            .collect();

        Ok(devices)
    }

    /// Deletes the device stored under `primary_key`/`secondary_key`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx status.
    /// - [`ClientError::Http`] on network failure after all retries.
    pub async fn delete_device(
        &self,
        primary_key: &str,
        secondary_key: &str,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["devices", primary_key, secondary_key]);
        let request = format!("DELETE /devices/{primary_key}/{secondary_key}");

        self.retry.run(&request, || {
            let url = url.clone();
            async move {
                let response = self.client.delete(url).send().await?;
                check_status(response).await?;
                Ok(())
            }
        })
        .await
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// The device an accepted upsert confirmed.
///
/// Some deployments answer with an acknowledgement or an array instead of the
/// stored record. The write still happened, so those bodies fall back to the
/// submitted device.
fn confirmed_device(body: &str, submitted: &Device, request: &str) -> Device {
    let echoed = serde_json::from_str::<WireDevice>(body)
        .map_err(|e| e.to_string())
        .and_then(|wire| Device::from_wire(wire, submitted.last_used).map_err(|e| e.to_string()));

    match echoed {
        Ok(device) => device,
        Err(reason) => {
            tracing::warn!(
                request,
                reason = %reason,
                "accepted upsert returned no usable device, keeping submitted record"
            );
            submitted.clone()
        }
    }
}

/// Passes 2xx responses through and converts everything else into
/// [`ClientError::Api`], preferring the server's own error message.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(status = status.as_u16(), body = %body, "devices API request failed");

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|field| v.get(field).and_then(serde_json::Value::as_str))
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
