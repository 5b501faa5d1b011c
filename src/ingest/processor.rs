//! Datagram processing: decode, parse, write

use chrono::{Local, TimeZone, Utc};
use std::net::SocketAddr;
use std::sync::Arc;

use super::IngestError;
use crate::models::{parse_line, DataPoint};
use crate::sink::PointSink;

/// Turns one datagram into a stored point
///
/// `Tz` is the zone the controller's timestamps are written in; the system
/// timezone unless configured otherwise. Points are always rendered in UTC.
pub struct MessageProcessor<Tz = Local> {
    /// Destination for parsed points
    sink: Arc<dyn PointSink>,

    /// Zone of the controller's wall clock
    source_zone: Tz,
}

impl MessageProcessor<Local> {
    /// Create a processor reading timestamps in the system timezone
    pub fn new(sink: Arc<dyn PointSink>) -> Self {
        Self::with_source_zone(sink, Local)
    }
}

impl<Tz> MessageProcessor<Tz>
where
    Tz: TimeZone + Send + Sync,
{
    /// Create a processor reading timestamps in `source_zone`
    pub fn with_source_zone(sink: Arc<dyn PointSink>, source_zone: Tz) -> Self {
        Self { sink, source_zone }
    }

    /// Decode, parse and write one datagram
    ///
    /// The sink is called once, with a single point, and awaited before
    /// returning. Nothing is retried.
    pub async fn process_datagram(
        &self,
        payload: &[u8],
        peer: SocketAddr,
    ) -> Result<DataPoint, IngestError> {
        let point = self.parse_datagram(payload, peer)?;

        match self.sink.write(std::slice::from_ref(&point)).await {
            Ok(()) => Ok(point),
            Err(source) => Err(IngestError::Write {
                measurement: point.measurement,
                source,
            }),
        }
    }

    /// Decode and parse without writing
    pub fn parse_datagram(&self, payload: &[u8], peer: SocketAddr) -> Result<DataPoint, IngestError> {
        let line = std::str::from_utf8(payload)
            .map_err(|source| IngestError::Decode { peer, source })?;

        Ok(parse_line(line, &self.source_zone, &Utc)?)
    }
}

impl<Tz: Clone> Clone for MessageProcessor<Tz> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            source_zone: self.source_zone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParseError;
    use crate::sink::SinkError;
    use crate::test_utils::{test_peer, MockPointSink};

    fn processor(sink: Arc<MockPointSink>) -> MessageProcessor<Utc> {
        MessageProcessor::with_source_zone(sink, Utc)
    }

    #[tokio::test]
    async fn test_process_datagram_writes_one_point() {
        let sink = Arc::new(MockPointSink::new());
        let processor = processor(sink.clone());

        let point = processor
            .process_datagram(b"2020-09-10 19:46:20;Bedroom temperature;23.0", test_peer())
            .await
            .unwrap();

        assert_eq!(point.measurement, "Bedroom temperature");
        assert_eq!(sink.write_calls(), 1);
        assert_eq!(sink.get_all_points(), vec![point]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decode_error() {
        let sink = Arc::new(MockPointSink::new());
        let processor = processor(sink.clone());

        let err = processor
            .process_datagram(&[0x32, 0x30, 0xff, 0xfe], test_peer())
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Decode { .. }));
        assert_eq!(err.kind(), "decode");
        assert_eq!(sink.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_skips_sink() {
        let sink = Arc::new(MockPointSink::new());
        let processor = processor(sink.clone());

        let err = processor
            .process_datagram(b"2020-09-10 19:46:20;Temp;warm", test_peer())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Parse(ParseError::NonNumericValue { .. })
        ));
        assert_eq!(sink.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let sink = Arc::new(MockPointSink::new());
        sink.fail_next_operation("database not found");
        let processor = processor(sink.clone());

        let err = processor
            .process_datagram(b"2020-09-10 19:46:20;Temp;21.5", test_peer())
            .await
            .unwrap_err();

        match err {
            IngestError::Write {
                measurement,
                source: SinkError::Rejected { status, .. },
            } => {
                assert_eq!(measurement, "Temp");
                assert_eq!(status, 500);
            },
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(sink.get_all_points().is_empty());
    }
}
