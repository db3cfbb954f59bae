use std::time::Duration;
use tracing::{debug, info};

use crate::core::ViewState;
use crate::input::RecordSource;
use crate::output::{SinkResult, ViewStateSink};
use crate::playback::{CancelToken, PlaybackConfig, PlaybackCursor};

/// Outcome of a playback run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackSummary {
    /// View-states emitted
    pub ticks: u64,
    /// Index of the last record emitted
    pub last_index: Option<u64>,
    /// Stopped by the cancel token rather than end of stream
    pub cancelled: bool,
}

/// Wall-clock paced playback of a record stream into a view-state sink
///
/// Each tick fetches one record, derives its view-state, replaces the sink's
/// documents and waits one interval. The wait is not tied to record time.
pub struct PlaybackEngine<'a> {
    source: &'a mut dyn RecordSource,
    sink: &'a mut dyn ViewStateSink,
    cursor: PlaybackCursor,
    interval: Duration,
    cancel: CancelToken,
}

impl<'a> PlaybackEngine<'a> {
    pub fn new(
        source: &'a mut dyn RecordSource,
        sink: &'a mut dyn ViewStateSink,
        config: &PlaybackConfig,
        cancel: CancelToken,
    ) -> Self {
        let mut cursor = PlaybackCursor::new(config.stride);
        cursor.seed(config.start_index);

        Self {
            source,
            sink,
            cursor,
            interval: config.interval,
            cancel,
        }
    }

    /// Run until the stream is exhausted or the token is cancelled
    ///
    /// Read failures end playback quietly; a failed write is returned.
    pub async fn run(&mut self) -> SinkResult<PlaybackSummary> {
        let mut summary = PlaybackSummary::default();

        info!(
            "Playing {} from record {} every {} records ({:?} per tick) into {}",
            self.source.name(),
            self.cursor.index(),
            self.cursor.stride(),
            self.interval,
            self.sink.name()
        );

        loop {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let index = self.cursor.index();
            let record = match self.cursor.fetch_and_advance(&mut *self.source) {
                Some(record) => record,
                None => break,
            };
            info!("Record {}: {}", index, record.summary());

            let view = ViewState::from_record(&record);
            self.sink.emit(&view).await?;

            summary.ticks += 1;
            summary.last_index = Some(index);
            debug!(
                "Tick {}: lat {:.9} lon {:.9} alt {:.3} hdg {:.3} roll {:.3} tilt {:.3}",
                summary.ticks,
                view.latitude_deg,
                view.longitude_deg,
                view.altitude_m,
                view.heading_deg,
                view.roll_deg,
                view.tilt_deg
            );

            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
            }
        }

        info!(
            "Playback {} after {} ticks (last record {:?}, cursor {:?} at {})",
            if summary.cancelled { "cancelled" } else { "finished" },
            summary.ticks,
            summary.last_index,
            self.cursor.state(),
            self.cursor.index()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NavigationRecord;
    use crate::input::RecordBuffer;
    use crate::output::{kml, MemorySink, SinkError};
    use async_trait::async_trait;

    fn buffer(n: u64) -> RecordBuffer {
        let records = (0..n)
            .map(|i| NavigationRecord {
                timestamp: i as f64 * 0.005,
                latitude: 0.6 + i as f64 * 1e-7,
                longitude: -1.3,
                altitude: i as f64,
                roll: 0.02,
                pitch: -0.01,
                platform_heading: 0.4,
                wander_angle: 0.1,
                ..Default::default()
            })
            .collect();
        RecordBuffer::new("test", records)
    }

    fn config(start: Option<u64>, interval: Duration) -> PlaybackConfig {
        PlaybackConfig {
            start_index: start,
            interval,
            ..Default::default()
        }
    }

    /// Keeps every emitted view-state
    #[derive(Default)]
    struct Recorder {
        views: Vec<ViewState>,
    }

    #[async_trait]
    impl ViewStateSink for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn prepare(&mut self) -> SinkResult<()> {
            Ok(())
        }

        async fn emit(&mut self, view: &ViewState) -> SinkResult<()> {
            self.views.push(*view);
            Ok(())
        }
    }

    /// Accepts `limit` view-states, then fails every write
    struct FailingSink {
        limit: usize,
        emits: usize,
    }

    #[async_trait]
    impl ViewStateSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn prepare(&mut self) -> SinkResult<()> {
            Ok(())
        }

        async fn emit(&mut self, _view: &ViewState) -> SinkResult<()> {
            if self.emits == self.limit {
                return Err(SinkError::Write {
                    kind: "overview",
                    path: "overview.kml".into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.emits += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_each_tick_renders_strided_record() {
        let mut source = buffer(1000);
        let mut sink = Recorder::default();

        let summary = PlaybackEngine::new(&mut source, &mut sink, &config(Some(50), Duration::ZERO), CancelToken::new())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.last_index, Some(850));
        assert!(!summary.cancelled);

        for (k, view) in sink.views.iter().enumerate() {
            let record = source.records()[50 + k * 200];
            assert_eq!(*view, ViewState::from_record(&record));
        }
    }

    #[tokio::test]
    async fn test_latest_state_only() {
        let mut source = buffer(450);
        let mut sink = MemorySink::new("test");
        sink.prepare().await.unwrap();

        let summary = PlaybackEngine::new(&mut source, &mut sink, &config(None, Duration::ZERO), CancelToken::new())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.ticks, 3);
        assert_eq!(sink.emits(), 3);

        let expected = ViewState::from_record(&source.records()[400]);
        assert_eq!(sink.last_view(), Some(&expected));
        assert_eq!(sink.perspective(), Some(kml::render_perspective(&expected).as_str()));
        assert_eq!(sink.overview().map(|d| d.matches("<Camera>").count()), Some(1));
    }

    #[tokio::test]
    async fn test_start_past_end_emits_nothing() {
        let mut source = buffer(100);
        let mut sink = MemorySink::new("test");

        let summary = PlaybackEngine::new(&mut source, &mut sink, &config(Some(100), Duration::from_secs(1)), CancelToken::new())
            .run()
            .await
            .unwrap();

        assert_eq!(summary, PlaybackSummary::default());
        assert_eq!(sink.emits(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_clock_cadence() {
        let mut source = buffer(600);
        let mut sink = Recorder::default();
        let started = tokio::time::Instant::now();

        let summary = PlaybackEngine::new(&mut source, &mut sink, &config(None, Duration::from_secs(1)), CancelToken::new())
            .run()
            .await
            .unwrap();

        // One interval after each of the 3 ticks, regardless of record time
        assert_eq!(summary.ticks, 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_sleep() {
        let mut source = buffer(100_000);
        let mut sink = Recorder::default();
        let token = CancelToken::new();

        let stopper = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            stopper.cancel();
        });

        let started = tokio::time::Instant::now();
        let summary = PlaybackEngine::new(&mut source, &mut sink, &config(None, Duration::from_secs(1)), token)
            .run()
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.last_index, Some(200));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_stops_playback() {
        let mut source = buffer(1000);
        let mut sink = FailingSink { limit: 2, emits: 0 };

        let err = PlaybackEngine::new(&mut source, &mut sink, &config(None, Duration::from_secs(1)), CancelToken::new())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, SinkError::Write { kind: "overview", .. }));
        assert_eq!(sink.emits, 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mut source = buffer(10);
        let mut sink = Recorder::default();
        let token = CancelToken::new();
        token.cancel();

        let summary = PlaybackEngine::new(&mut source, &mut sink, &config(None, Duration::ZERO), token)
            .run()
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.ticks, 0);
        assert!(sink.views.is_empty());
    }
}
