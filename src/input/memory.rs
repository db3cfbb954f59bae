use crate::core::NavigationRecord;
use crate::input::{RecordSource, SourceResult};

/// Record source backed by records held in memory
///
/// Used for text exports that are loaded whole, and for playback tests.
#[derive(Debug)]
pub struct RecordBuffer {
    name: String,
    records: Vec<NavigationRecord>,
    next: u64,
}

impl RecordBuffer {
    pub fn new(name: &str, records: Vec<NavigationRecord>) -> Self {
        Self {
            name: name.to_string(),
            records,
            next: 0,
        }
    }

    /// All buffered records
    #[cfg(test)]
    pub fn records(&self) -> &[NavigationRecord] {
        &self.records
    }
}

impl RecordSource for RecordBuffer {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> u64 {
        self.records.len() as u64
    }

    fn start_timestamp(&self) -> f64 {
        self.records.first().map(|r| r.timestamp).unwrap_or_default()
    }

    fn end_timestamp(&self) -> f64 {
        self.records.last().map(|r| r.timestamp).unwrap_or_default()
    }

    fn read_next(&mut self) -> SourceResult<Option<NavigationRecord>> {
        self.read_at(self.next)
    }

    fn read_at(&mut self, index: u64) -> SourceResult<Option<NavigationRecord>> {
        let record = usize::try_from(index)
            .ok()
            .and_then(|i| self.records.get(i))
            .copied();

        if record.is_some() {
            self.next = index + 1;
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(n: usize) -> RecordBuffer {
        let records = (0..n)
            .map(|i| NavigationRecord {
                timestamp: 100.0 + i as f64 * 0.005,
                ..Default::default()
            })
            .collect();
        RecordBuffer::new("test", records)
    }

    #[test]
    fn test_sequential_reads() {
        let mut buf = buffer(3);
        assert_eq!(buf.read_next().unwrap().unwrap().timestamp, 100.0);
        assert!(buf.read_next().unwrap().is_some());
        assert!(buf.read_next().unwrap().is_some());
        assert!(buf.read_next().unwrap().is_none());
    }

    #[test]
    fn test_read_at_moves_sequential_position() {
        let mut buf = buffer(10);
        let rec = buf.read_at(7).unwrap().unwrap();
        assert_eq!(rec.timestamp, 100.0 + 7.0 * 0.005);

        let next = buf.read_next().unwrap().unwrap();
        assert_eq!(next.timestamp, 100.0 + 8.0 * 0.005);

        assert!(buf.read_at(10).unwrap().is_none());
        assert!(buf.read_at(u64::MAX).unwrap().is_none());
    }

    #[test]
    fn test_span() {
        let buf = buffer(201);
        let span = buf.time_span();
        assert_eq!(span.start, 100.0);
        assert!((span.end - 101.0).abs() < 1e-9);

        let empty = RecordBuffer::new("empty", Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.start_timestamp(), 0.0);
    }
}
