//! CSV persistence for organization datasets.
//!
//! The raw dataset needs `name` and `address` columns. The augmented
//! dataset adds `latitude` and `longitude`, empty when unresolved. Columns
//! are located by header name, any other columns are carried along.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Writer};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::OrganizationRecord;

const NAME: &str = "name";
const ADDRESS: &str = "address";
const LATITUDE: &str = "latitude";
const LONGITUDE: &str = "longitude";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("column '{0}' not found")]
    MissingColumn(&'static str),

    #[error("line {line}: invalid {column} '{value}'")]
    InvalidCoordinate {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Column positions resolved from the header row
struct Columns {
    name: usize,
    address: usize,
    coordinates: Option<(usize, usize)>,
    extra: Vec<(usize, String)>,
}

impl Columns {
    fn locate(headers: &StringRecord, require_coordinates: bool) -> Result<Self, DatasetError> {
        let find = |column: &'static str| headers.iter().position(|h| h.trim() == column);

        let name = find(NAME).ok_or(DatasetError::MissingColumn(NAME))?;
        let address = find(ADDRESS).ok_or(DatasetError::MissingColumn(ADDRESS))?;

        let coordinates = if require_coordinates {
            let lat = find(LATITUDE).ok_or(DatasetError::MissingColumn(LATITUDE))?;
            let lon = find(LONGITUDE).ok_or(DatasetError::MissingColumn(LONGITUDE))?;
            Some((lat, lon))
        } else {
            None
        };

        let known = [NAME, ADDRESS, LATITUDE, LONGITUDE];
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !known.contains(&h.trim()))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        Ok(Self {
            name,
            address,
            coordinates,
            extra,
        })
    }
}

/// Read the raw dataset (no coordinates expected)
pub fn read_raw<P: AsRef<Path>>(path: P) -> Result<Vec<OrganizationRecord>, DatasetError> {
    let path = path.as_ref();
    info!("Loading raw dataset from {}", path.display());
    read_raw_from(File::open(path)?)
}

pub fn read_raw_from<R: Read>(reader: R) -> Result<Vec<OrganizationRecord>, DatasetError> {
    read_records(reader, false)
}

/// Read the augmented dataset produced by the geocoding pipeline
pub fn read_augmented<P: AsRef<Path>>(path: P) -> Result<Vec<OrganizationRecord>, DatasetError> {
    let path = path.as_ref();
    info!("Loading augmented dataset from {}", path.display());
    let records = read_augmented_from(File::open(path)?)?;
    info!("Loaded {} records", records.len());
    Ok(records)
}

pub fn read_augmented_from<R: Read>(reader: R) -> Result<Vec<OrganizationRecord>, DatasetError> {
    read_records(reader, true)
}

fn read_records<R: Read>(
    reader: R,
    require_coordinates: bool,
) -> Result<Vec<OrganizationRecord>, DatasetError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = Columns::locate(&headers, require_coordinates)?;

    let mut records = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let row = result?;
        // Header is line 1
        let line = index + 2;
        let field = |i: usize| row.get(i).unwrap_or("").trim();

        let mut record = OrganizationRecord::new(field(columns.name), field(columns.address));
        record.extra = columns
            .extra
            .iter()
            .map(|(i, header)| (header.clone(), row.get(*i).unwrap_or("").to_string()))
            .collect();

        if let Some((lat_idx, lon_idx)) = columns.coordinates {
            let lat = parse_coordinate(field(lat_idx), line, LATITUDE)?;
            let lon = parse_coordinate(field(lon_idx), line, LONGITUDE)?;
            if lat.is_some() != lon.is_some() {
                warn!(
                    "Line {}: '{}' has only one coordinate, treating as unresolved",
                    line, record.name
                );
            } else {
                record.latitude = lat;
                record.longitude = lon;
            }
        }

        records.push(record);
    }

    Ok(records)
}

fn parse_coordinate(
    value: &str,
    line: usize,
    column: &'static str,
) -> Result<Option<f64>, DatasetError> {
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(DatasetError::InvalidCoordinate {
            line,
            column,
            value: value.to_string(),
        }),
    }
}

/// Write the augmented dataset
pub fn write_augmented<P: AsRef<Path>>(
    path: P,
    records: &[OrganizationRecord],
) -> Result<(), DatasetError> {
    let path = path.as_ref();
    write_augmented_to(File::create(path)?, records)?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn write_augmented_to<W: Write>(
    writer: W,
    records: &[OrganizationRecord],
) -> Result<(), DatasetError> {
    let mut csv_writer = Writer::from_writer(writer);

    let extra_headers: Vec<&str> = records
        .first()
        .map(|r| r.extra.iter().map(|(h, _)| h.as_str()).collect())
        .unwrap_or_default();

    let mut header = vec![NAME, ADDRESS];
    header.extend(extra_headers.iter().copied());
    header.extend([LATITUDE, LONGITUDE]);
    csv_writer.write_record(&header)?;

    for record in records {
        let mut row = vec![record.name.clone(), record.address.clone()];
        // Extras are stored in header order
        row.extend(
            record
                .extra
                .iter()
                .map(|(_, v)| v.clone())
                .chain(std::iter::repeat(String::new()))
                .take(extra_headers.len()),
        );
        row.push(record.latitude.map(|v| v.to_string()).unwrap_or_default());
        row.push(record.longitude.map(|v| v.to_string()).unwrap_or_default());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}
