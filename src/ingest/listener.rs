//! The ingestion loop
//!
//! Datagrams are handled strictly one at a time, in the order the socket
//! delivers them. The next receive only starts once the sink write for the
//! current datagram has returned.

use chrono::{Local, TimeZone};
use tracing::{debug, error, warn, Instrument};

use super::{DatagramSource, IngestError, MessageProcessor};
use crate::models::DataPoint;

/// Receive, parse and store datagrams until the process stops
pub struct IngestionLoop<S, Tz = Local> {
    /// Where datagrams come from
    source: S,

    /// Per-datagram pipeline
    processor: MessageProcessor<Tz>,
}

impl<S, Tz> IngestionLoop<S, Tz>
where
    S: DatagramSource,
    Tz: TimeZone + Send + Sync,
{
    /// Create a new ingestion loop
    pub fn new(source: S, processor: MessageProcessor<Tz>) -> Self {
        Self { source, processor }
    }

    /// Run forever; no datagram ends the loop
    ///
    /// Stopping is external: drop the future (e.g. from `tokio::select!`).
    pub async fn run(&self) {
        debug!("Ingestion loop started");
        loop {
            self.step().await;
        }
    }

    /// Handle exactly one datagram
    ///
    /// Returns the stored point, or `None` when the datagram was dropped.
    /// Every failure is logged here.
    pub async fn step(&self) -> Option<DataPoint> {
        let (payload, peer) = match self.source.receive().await {
            Ok(datagram) => datagram,
            Err(e) => {
                error!(error = %e, "Failed to receive datagram");
                return None;
            },
        };

        let span = crate::datagram_span!(peer, payload.len());
        let result = self
            .processor
            .process_datagram(&payload, peer)
            .instrument(span.clone())
            .await;

        let _entered = span.enter();
        match result {
            Ok(point) => {
                span.record("measurement", point.measurement.as_str());
                debug!(time = %point.time, value = point.value, "Point stored");
                Some(point)
            },
            Err(err) => {
                report(&err);
                None
            },
        }
    }
}

/// Log a dropped datagram at a level matching its cause
fn report(err: &IngestError) {
    match err {
        IngestError::Decode { .. } => {
            warn!(kind = err.kind(), error = %err, "Dropping undecodable datagram");
        },
        IngestError::Parse(parse) => {
            warn!(
                kind = err.kind(),
                reason = parse.kind(),
                raw = %parse.raw(),
                error = %err,
                "Dropping unparseable datagram"
            );
        },
        IngestError::Write {
            measurement,
            source,
        } => {
            crate::log_error!(
                err,
                "Dropping point after failed write",
                measurement = measurement,
                retryable = source.is_retryable(),
            );
        },
    }
}
