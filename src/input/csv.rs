use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::core::NavigationRecord;
use crate::input::RecordBuffer;

/// Column positions of a trajectory export
struct Columns {
    time: usize,
    lat: usize,
    lon: usize,
    alt: usize,
    roll: usize,
    pitch: usize,
    heading: usize,
    wander: Option<usize>,
}

/// Load a trajectory exported as text with a header row
///
/// Supports flexible column names, e.g.:
/// - time,lat,lon,alt,roll,pitch,heading
/// - gps_time,latitude,longitude,height,roll,pitch,platform_heading,wander_angle
///
/// Angles are in radians and times in GPS-epoch seconds. A missing wander
/// column means heading is already true heading.
pub fn load_csv(path: &Path) -> Result<RecordBuffer> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = rdr.headers()?;
    let cols = detect_columns(headers)?;

    let mut records = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        // Header is line 1
        let line = row + 2;
        let record = result.with_context(|| format!("Failed to read row at line {}", line))?;

        let field = |idx: usize, what: &str| -> Result<f64> {
            let text = record
                .get(idx)
                .with_context(|| format!("Missing {} at line {}", what, line))?;
            text.parse::<f64>()
                .with_context(|| format!("Bad {} {:?} at line {}", what, text, line))
        };

        records.push(NavigationRecord {
            timestamp: field(cols.time, "time")?,
            latitude: field(cols.lat, "latitude")?,
            longitude: field(cols.lon, "longitude")?,
            altitude: field(cols.alt, "altitude")?,
            roll: field(cols.roll, "roll")?,
            pitch: field(cols.pitch, "pitch")?,
            platform_heading: field(cols.heading, "heading")?,
            wander_angle: match cols.wander {
                Some(idx) => field(idx, "wander angle")?,
                None => 0.0,
            },
            ..Default::default()
        });
    }

    info!("Loaded {} records from {}", records.len(), path.display());

    Ok(RecordBuffer::new(&path.display().to_string(), records))
}

/// Detect column indices from CSV headers
fn detect_columns(headers: &csv::StringRecord) -> Result<Columns> {
    Ok(Columns {
        time: find_column(headers, &["time", "timestamp", "gps_time", "t"])?,
        lat: find_column(headers, &["lat", "latitude"])?,
        lon: find_column(headers, &["lon", "long", "longitude"])?,
        alt: find_column(headers, &["alt", "altitude", "height"])?,
        roll: find_column(headers, &["roll"])?,
        pitch: find_column(headers, &["pitch"])?,
        heading: find_column(headers, &["heading", "platform_heading", "yaw"])?,
        wander: find_column(headers, &["wander", "wander_angle"]).ok(),
    })
}

/// Find a column by checking possible names
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Result<usize> {
    for (idx, header) in headers.iter().enumerate() {
        let header_lower = header.to_lowercase();
        if names.iter().any(|&name| header_lower == name) {
            return Ok(idx);
        }
    }

    anyhow::bail!("Could not find column with names: {:?}", names)
}
