use tracing::{debug, warn};

use crate::core::NavigationRecord;
use crate::input::RecordSource;
use crate::playback::{CursorState, DEFAULT_STRIDE};

/// Playback position over a record stream
///
/// The index only moves forward, by `stride` after each record handed out.
#[derive(Debug, Clone)]
pub struct PlaybackCursor {
    index: u64,
    stride: u64,
    state: CursorState,
}

impl Default for PlaybackCursor {
    fn default() -> Self {
        Self::new(DEFAULT_STRIDE)
    }
}

impl PlaybackCursor {
    /// Create a cursor at the start of stream; a zero stride is bumped to 1
    pub fn new(stride: u64) -> Self {
        Self {
            index: 0,
            stride: stride.max(1),
            state: CursorState::Active,
        }
    }

    /// Set the starting index, or the start of stream when `None`
    ///
    /// Not checked against the stream length: an index past the end shows
    /// up as exhaustion on the first fetch.
    pub fn seed(&mut self, start_index: Option<u64>) {
        self.index = start_index.unwrap_or(0);
        self.state = CursorState::Active;
    }

    /// Index of the next record to fetch
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// Fetch the record at the current index and step past it
    ///
    /// End of stream and read failures both leave the cursor `Exhausted`.
    pub fn fetch_and_advance(&mut self, source: &mut dyn RecordSource) -> Option<NavigationRecord> {
        if self.is_exhausted() {
            return None;
        }

        match source.read_at(self.index) {
            Ok(Some(record)) => {
                self.index = self.index.saturating_add(self.stride);
                Some(record)
            }
            Ok(None) => {
                debug!("End of {} at record {}", source.name(), self.index);
                self.state = CursorState::Exhausted;
                None
            }
            Err(e) => {
                warn!("Stopping playback of {}: {}", source.name(), e);
                self.state = CursorState::Exhausted;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{RecordBuffer, SourceError, SourceResult};

    fn buffer(n: u64) -> RecordBuffer {
        let records = (0..n)
            .map(|i| NavigationRecord {
                altitude: i as f64,
                ..Default::default()
            })
            .collect();
        RecordBuffer::new("test", records)
    }

    /// Source whose reads fail from a given index on
    struct FailingSource {
        inner: RecordBuffer,
        fail_from: u64,
    }

    impl RecordSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn len(&self) -> u64 {
            self.inner.len()
        }

        fn start_timestamp(&self) -> f64 {
            0.0
        }

        fn end_timestamp(&self) -> f64 {
            0.0
        }

        fn read_next(&mut self) -> SourceResult<Option<NavigationRecord>> {
            self.inner.read_next()
        }

        fn read_at(&mut self, index: u64) -> SourceResult<Option<NavigationRecord>> {
            if index >= self.fail_from {
                return Err(SourceError::Read {
                    index,
                    source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read"),
                });
            }
            self.inner.read_at(index)
        }
    }

    #[test]
    fn test_stride_invariant() {
        let mut source = buffer(1000);
        let mut cursor = PlaybackCursor::default();
        cursor.seed(Some(37));

        let mut fetched = Vec::new();
        while let Some(rec) = cursor.fetch_and_advance(&mut source) {
            fetched.push(rec.altitude as u64);
        }

        let expected: Vec<u64> = (0..).map(|n| 37 + n * 200).take_while(|&i| i < 1000).collect();
        assert_eq!(fetched, expected);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_default_seed_is_stream_start() {
        let mut source = buffer(10);
        let mut cursor = PlaybackCursor::new(3);
        cursor.seed(None);

        assert_eq!(cursor.fetch_and_advance(&mut source).unwrap().altitude, 0.0);
        assert_eq!(cursor.index(), 3);
    }

    #[test]
    fn test_start_past_end_exhausts_immediately() {
        let mut source = buffer(10);
        let mut cursor = PlaybackCursor::default();
        cursor.seed(Some(10));

        assert!(cursor.fetch_and_advance(&mut source).is_none());
        assert_eq!(cursor.state(), CursorState::Exhausted);
        assert_eq!(cursor.index(), 10);
    }

    #[test]
    fn test_exhausted_is_terminal() {
        let mut source = buffer(1);
        let mut cursor = PlaybackCursor::new(1);
        cursor.seed(None);

        assert!(cursor.fetch_and_advance(&mut source).is_some());
        assert!(cursor.fetch_and_advance(&mut source).is_none());
        assert!(cursor.fetch_and_advance(&mut source).is_none());
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_read_error_treated_as_end() {
        let mut source = FailingSource {
            inner: buffer(100),
            fail_from: 20,
        };
        let mut cursor = PlaybackCursor::new(10);
        cursor.seed(None);

        let mut ticks = 0;
        while cursor.fetch_and_advance(&mut source).is_some() {
            ticks += 1;
        }
        assert_eq!(ticks, 2);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_zero_stride_bumped() {
        assert_eq!(PlaybackCursor::new(0).stride(), 1);
    }
}
