use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::core::time::week_seconds_to_gps;
use crate::core::NavigationRecord;
use crate::input::{RecordSource, SourceError, SourceResult};

/// Number of doubles in one record
pub const FIELDS_PER_RECORD: usize = 17;

/// Size of one record on disk (bytes)
pub const RECORD_SIZE: u64 = (FIELDS_PER_RECORD * 8) as u64;

/// Smoothed Best Estimate of Trajectory file
///
/// Layout: fixed 136-byte records of 17 little-endian doubles
/// - time (GPS seconds of week)
/// - latitude, longitude (rad), altitude (m)
/// - x, y, z velocity (m/s)
/// - roll, pitch, platform heading, wander angle (rad)
/// - x, y, z acceleration (m/s²)
/// - x, y, z angular rate (rad/s)
///
/// POS exports written in the same layout are read the same way.
pub struct SbetFile {
    name: String,
    file: File,
    records: u64,
    next: u64,
    gps_week: u32,
    start_timestamp: f64,
    end_timestamp: f64,
}

impl SbetFile {
    /// Open a file and read its first and last records for the time span
    pub fn open(path: &Path, gps_week: u32) -> SourceResult<Self> {
        let open_err = |source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_err)?;
        let len = file.metadata().map_err(open_err)?.len();

        let records = len / RECORD_SIZE;
        if records == 0 {
            return Err(SourceError::Empty {
                path: path.to_path_buf(),
                len,
            });
        }
        if len % RECORD_SIZE != 0 {
            warn!(
                "{}: ignoring {} trailing bytes after record {}",
                path.display(),
                len % RECORD_SIZE,
                records - 1
            );
        }

        let mut sbet = Self {
            name: path.display().to_string(),
            file,
            records,
            next: 0,
            gps_week,
            start_timestamp: 0.0,
            end_timestamp: 0.0,
        };

        // Both bounds exist since records > 0
        let first = sbet.read_next()?.unwrap_or_default();
        let last = sbet.read_at(records - 1)?.unwrap_or_default();
        sbet.start_timestamp = first.timestamp;
        sbet.end_timestamp = last.timestamp;
        sbet.next = 0;

        info!("Opened {} ({} records, GPS week {})", sbet.name, records, gps_week);
        Ok(sbet)
    }

    /// Decode one on-disk record
    fn decode(&self, buf: &[u8; RECORD_SIZE as usize]) -> NavigationRecord {
        let mut v = [0f64; FIELDS_PER_RECORD];
        for (value, chunk) in v.iter_mut().zip(buf.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *value = f64::from_le_bytes(bytes);
        }

        NavigationRecord {
            timestamp: week_seconds_to_gps(self.gps_week, v[0]),
            latitude: v[1],
            longitude: v[2],
            altitude: v[3],
            x_velocity: v[4],
            y_velocity: v[5],
            z_velocity: v[6],
            roll: v[7],
            pitch: v[8],
            platform_heading: v[9],
            wander_angle: v[10],
            x_acceleration: v[11],
            y_acceleration: v[12],
            z_acceleration: v[13],
            x_angular_rate: v[14],
            y_angular_rate: v[15],
            z_angular_rate: v[16],
        }
    }
}

impl RecordSource for SbetFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> u64 {
        self.records
    }

    fn start_timestamp(&self) -> f64 {
        self.start_timestamp
    }

    fn end_timestamp(&self) -> f64 {
        self.end_timestamp
    }

    fn read_next(&mut self) -> SourceResult<Option<NavigationRecord>> {
        self.read_at(self.next)
    }

    fn read_at(&mut self, index: u64) -> SourceResult<Option<NavigationRecord>> {
        if index >= self.records {
            debug!("Record {} is past the end of {} ({} records)", index, self.name, self.records);
            return Ok(None);
        }

        let read_err = |source| SourceError::Read { index, source };

        let mut buf = [0u8; RECORD_SIZE as usize];
        self.file
            .seek(SeekFrom::Start(index * RECORD_SIZE))
            .map_err(read_err)?;
        self.file.read_exact(&mut buf).map_err(read_err)?;

        self.next = index + 1;
        Ok(Some(self.decode(&buf)))
    }
}

/// Encode a record in the on-disk layout, with `seconds_of_week` as its time
#[cfg(test)]
pub(crate) fn encode_record(record: &NavigationRecord, seconds_of_week: f64) -> Vec<u8> {
    [
        seconds_of_week,
        record.latitude,
        record.longitude,
        record.altitude,
        record.x_velocity,
        record.y_velocity,
        record.z_velocity,
        record.roll,
        record.pitch,
        record.platform_heading,
        record.wander_angle,
        record.x_acceleration,
        record.y_acceleration,
        record.z_acceleration,
        record.x_angular_rate,
        record.y_angular_rate,
        record.z_angular_rate,
    ]
    .iter()
    .flat_map(|v| v.to_le_bytes())
    .collect()
}

/// Write `count` records 5 ms apart, with latitude encoding the record index
#[cfg(test)]
pub(crate) fn write_test_file(path: &Path, count: u64) {
    let mut data = Vec::new();
    for i in 0..count {
        let rec = NavigationRecord {
            latitude: i as f64 * 1e-6,
            longitude: -1.3,
            altitude: 100.0 + i as f64,
            roll: 0.01,
            pitch: -0.02,
            platform_heading: 0.5,
            wander_angle: 0.1,
            ..Default::default()
        };
        data.extend(encode_record(&rec, 345_600.0 + i as f64 * 0.005));
    }
    std::fs::write(path, data).unwrap();
}
