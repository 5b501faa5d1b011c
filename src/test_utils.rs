//! Test utilities for loxflux
//!
//! This module provides in-memory doubles for the sink and the datagram
//! source, plus small fixtures.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use crate::ingest::DatagramSource;
use crate::models::{DataPoint, Tags, SOURCE_TAG_KEY, SOURCE_TAG_VALUE};
use crate::sink::{PointSink, SinkError, SinkResult};

/// In-memory sink recording every written point
#[derive(Debug, Clone)]
pub struct MockPointSink {
    points: Arc<Mutex<Vec<DataPoint>>>,
    write_calls: Arc<Mutex<usize>>,
    fail_next: Arc<Mutex<bool>>,
    error_message: Arc<Mutex<Option<String>>>,
}

impl Default for MockPointSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPointSink {
    /// Create a new mock sink
    pub fn new() -> Self {
        Self {
            points: Arc::new(Mutex::new(Vec::new())),
            write_calls: Arc::new(Mutex::new(0)),
            fail_next: Arc::new(Mutex::new(false)),
            error_message: Arc::new(Mutex::new(None)),
        }
    }

    /// Configure the mock to reject the next write with status 500
    pub fn fail_next_operation(&self, error_message: &str) {
        *self.fail_next.lock().unwrap() = true;
        *self.error_message.lock().unwrap() = Some(error_message.to_string());
    }

    /// Get all stored points
    pub fn get_all_points(&self) -> Vec<DataPoint> {
        self.points.lock().unwrap().clone()
    }

    /// Number of write calls, failed ones included
    pub fn write_calls(&self) -> usize {
        *self.write_calls.lock().unwrap()
    }

    /// Clear all points
    pub fn clear(&self) {
        self.points.lock().unwrap().clear();
    }

    fn check_failure(&self) -> SinkResult<()> {
        let mut fail = self.fail_next.lock().unwrap();
        if *fail {
            *fail = false;
            let msg = self
                .error_message
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| "Mock failure".to_string());
            return Err(SinkError::Rejected {
                status: 500,
                body: msg,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PointSink for MockPointSink {
    async fn write(&self, points: &[DataPoint]) -> SinkResult<()> {
        *self.write_calls.lock().unwrap() += 1;
        self.check_failure()?;
        self.points.lock().unwrap().extend_from_slice(points);
        Ok(())
    }
}

/// Queue-backed datagram source
///
/// Yields queued datagrams (or errors) in order, then never resolves, like a
/// quiet socket.
#[derive(Debug, Clone, Default)]
pub struct MockDatagramSource {
    queue: Arc<Mutex<VecDeque<io::Result<(Vec<u8>, SocketAddr)>>>>,
}

impl MockDatagramSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a datagram
    pub fn push(&self, payload: &[u8], peer: SocketAddr) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Ok((payload.to_vec(), peer)));
    }

    /// Queue a receive error
    pub fn push_error(&self, kind: io::ErrorKind) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Err(io::Error::new(kind, "mock receive failure")));
    }

    /// Number of datagrams not yet received
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

#[async_trait]
impl DatagramSource for MockDatagramSource {
    async fn receive(&self) -> io::Result<(Vec<u8>, SocketAddr)> {
        let next = self.queue.lock().unwrap().pop_front();
        match next {
            Some(datagram) => datagram,
            None => std::future::pending().await,
        }
    }
}

/// Peer address used for fabricated datagrams
pub fn test_peer() -> SocketAddr {
    SocketAddr::from(([192, 168, 1, 77], 50000))
}

/// Create a test DataPoint with default values
pub fn create_test_point() -> DataPoint {
    let mut tags = Tags::new();
    tags.insert(SOURCE_TAG_KEY.to_string(), SOURCE_TAG_VALUE.to_string());

    DataPoint::new(
        "Bedroom temperature",
        Utc.with_ymd_and_hms(2020, 9, 10, 19, 46, 20).unwrap(),
        23.0,
        tags,
    )
}
