use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::error::PollError;

pub const STATUS_PATH: &str = "/api/status";

/// One decoded `/api/status` payload. Nothing is kept between polls.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StatusSnapshot {
    pub time_str: String,
    pub uptime: String,
    pub oled_connected: bool,
    pub cpu_usage: f64,
    pub cpu_freq: f64,
    pub cpu_temp: String,
    pub mem_usage: f64,
    pub mem_used: f64,
    pub mem_total: f64,
    pub ip: String,
    pub network_name: String,
    pub net_speed: String,
}

impl StatusSnapshot {
    pub fn from_json(body: &[u8]) -> Result<Self, PollError> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Anything that can produce a fresh snapshot.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<StatusSnapshot, PollError>> + Send;
}

pub struct HttpStatusSource {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusSource {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: status_url(base_url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StatusSource for HttpStatusSource {
    async fn fetch(&self) -> Result<StatusSnapshot, PollError> {
        let network = |source| PollError::Network {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().await.map_err(network)?;
        if !response.status().is_success() {
            return Err(PollError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(network)?;
        StatusSnapshot::from_json(&body)
    }
}

/// `http://host:8080/` → `http://host:8080/api/status`
pub fn status_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), STATUS_PATH)
}

#[cfg(test)]
pub(crate) fn sample_snapshot() -> StatusSnapshot {
    StatusSnapshot {
        time_str: "14:03:27".to_string(),
        uptime: "01:12:09".to_string(),
        oled_connected: true,
        cpu_usage: 42.36,
        cpu_freq: 1499.6,
        cpu_temp: "48.3°C".to_string(),
        mem_usage: 37.81,
        mem_used: 1.46,
        mem_total: 3.84,
        ip: "192.168.1.23".to_string(),
        network_name: "home-wifi".to_string(),
        net_speed: "1.2kbps 3.4kbps".to_string(),
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_JSON: &str = r#"{
    "time_str": "14:03:27",
    "uptime": "01:12:09",
    "oled_connected": true,
    "cpu_usage": 42.36,
    "cpu_freq": 1499.6,
    "cpu_temp": "48.3°C",
    "mem_usage": 37.81,
    "mem_used": 1.46,
    "mem_total": 3.84,
    "ip": "192.168.1.23",
    "network_name": "home-wifi",
    "net_speed": "1.2kbps 3.4kbps"
}"#;
