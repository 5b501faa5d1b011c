//! InfluxDB 1.x HTTP sink
//!
//! Points are posted to `/write?db=<database>&precision=s` as Line Protocol.
//! Authentication uses HTTP basic auth when a user is configured.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info};

use super::line_protocol::encode_points;
use super::writer::{PointSink, SinkError, SinkResult};
use crate::config::InfluxConfig;
use crate::logging::Timer;
use crate::models::DataPoint;

/// Write precision requested from the server, matches the point resolution
const WRITE_PRECISION: &str = "s";

/// Sink writing points to an InfluxDB database over HTTP
#[derive(Debug, Clone)]
pub struct InfluxSink {
    client: Client,
    write_url: String,
    database: String,
    user: Option<String>,
    password: Option<String>,
}

impl InfluxSink {
    /// Build the HTTP client from configuration
    ///
    /// No request is sent; an unreachable server only shows up on the first
    /// write.
    pub fn new(config: &InfluxConfig) -> SinkResult<Self> {
        info!(
            url = %config.base_url(),
            database = %config.database,
            "Creating InfluxDB client"
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs())
            .build()
            .map_err(|e| SinkError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            write_url: format!("{}/write", config.base_url()),
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    /// URL points are posted to
    pub fn write_url(&self) -> &str {
        &self.write_url
    }
}

#[async_trait]
impl PointSink for InfluxSink {
    async fn write(&self, points: &[DataPoint]) -> SinkResult<()> {
        if points.is_empty() {
            return Ok(());
        }

        let body = encode_points(points);
        debug!(lines = points.len(), body = %body, "Writing to InfluxDB");

        let mut request = self
            .client
            .post(&self.write_url)
            .query(&[("db", self.database.as_str()), ("precision", WRITE_PRECISION)])
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body);

        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.password.as_ref());
        }

        let timer = Timer::start("influx_write");
        let response = request
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        timer.stop();

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Rejected {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}
