use crate::error::{DashboardError, Result};
use crate::types::Venue;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Column order of the headerless source file.
const ID: usize = 0;
const NAME: usize = 1;
const ADDRESS: usize = 2;
const POSTAL_CODE: usize = 3;
const EASTING: usize = 4;
const NORTHING: usize = 5;
const LATITUDE: usize = 6;
const LONGITUDE: usize = 7;
const AREA: usize = 8;
pub const FIELD_COUNT: usize = 9;

/// The cleaned, read-only venue table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    venues: Vec<Venue>,
    rows_read: usize,
}

impl Dataset {
    pub fn from_venues(venues: Vec<Venue>) -> Self {
        let rows_read = venues.len();
        Dataset { venues, rows_read }
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Rows discarded for missing or unparseable coordinates.
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.venues.len()
    }
}

pub fn load_dataset(path: &Path, null_marker: &str) -> Result<Dataset> {
    info!("Loading venues from {:?}...", path);
    let file = File::open(path).map_err(|source| DashboardError::DataSourceOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_dataset(file, null_marker)?;
    info!(
        "Loaded {} venues ({} of {} rows dropped for missing coordinates)",
        dataset.len(),
        dataset.rows_dropped(),
        dataset.rows_read()
    );
    Ok(dataset)
}

pub fn read_dataset<R: Read>(reader: R, null_marker: &str) -> Result<Dataset> {
    // Non-flexible: a row with the wrong field count is a csv::Error.
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(reader);

    let mut venues = Vec::new();
    let mut rows_read = 0;

    for result in rdr.records() {
        let record = result?;
        rows_read += 1;
        if record.len() != FIELD_COUNT {
            return Err(DashboardError::DataSource(csv::Error::from(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("expected {} fields, found {}", FIELD_COUNT, record.len()),
            ))));
        }
        match clean_record(&record, null_marker) {
            Some(venue) => venues.push(venue),
            None => debug!("Dropping row {}: no usable coordinates", rows_read),
        }
    }

    Ok(Dataset { venues, rows_read })
}

/// Sentinel substitution then numeric coercion. Either stage leaving
/// latitude or longitude null drops the row. Text columns are kept verbatim;
/// only numeric columns are trimmed before parsing.
fn clean_record(record: &StringRecord, null_marker: &str) -> Option<Venue> {
    let field = |idx: usize| record.get(idx).filter(|v| *v != null_marker);
    let text = |idx: usize| field(idx).unwrap_or("").to_string();
    let number = |idx: usize| field(idx).and_then(|v| v.trim().parse::<f64>().ok()).filter(|v| v.is_finite());

    let latitude = number(LATITUDE)?;
    let longitude = number(LONGITUDE)?;

    Some(Venue {
        id: text(ID),
        name: text(NAME),
        address: text(ADDRESS),
        postal_code: field(POSTAL_CODE).filter(|v| !v.is_empty()).map(str::to_string),
        easting: number(EASTING),
        northing: number(NORTHING),
        latitude,
        longitude,
        area: text(AREA),
    })
}
