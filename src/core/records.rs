//! Decoding of raw alert and shelter records.
//!
//! Sources hand over JSON objects. Each one is decoded on its own; a record
//! with a missing or bad field is skipped and counted, and the rest of the
//! batch is still used.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::alerts::model::{AlertRecord, Severity};
use super::geo::Coordinate;
use super::shelters::model::ShelterRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed {kind} record at index {index}: {reason}")]
pub struct MalformedRecord {
    pub kind: &'static str,
    pub index: usize,
    pub reason: String,
}

/// Records decoded from one source query, plus how many were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

impl<T> Batch<T> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// `[lat, lon]` or `{"latitude": .., "longitude": ..}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLocation {
    Pair(f64, f64),
    Named {
        #[serde(alias = "lat")]
        latitude: f64,
        #[serde(alias = "lon", alias = "lng")]
        longitude: f64,
    },
}

impl RawLocation {
    fn into_coordinate(self) -> Result<Coordinate, String> {
        let (latitude, longitude) = match self {
            Self::Pair(lat, lon) => (lat, lon),
            Self::Named {
                latitude,
                longitude,
            } => (latitude, longitude),
        };
        Coordinate::checked(latitude, longitude).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct RawAlert {
    #[serde(alias = "type")]
    kind: Option<String>,
    severity: Option<String>,
    location: Option<RawLocation>,
    #[serde(alias = "affected_radius_km")]
    radius_km: Option<f64>,
}

impl TryFrom<RawAlert> for AlertRecord {
    type Error = String;

    fn try_from(raw: RawAlert) -> Result<Self, Self::Error> {
        let kind = raw.kind.ok_or("missing kind")?;
        let severity: Severity = raw.severity.ok_or("missing severity")?.parse()?;
        let location = raw.location.ok_or("missing location")?.into_coordinate()?;
        let radius_km = raw.radius_km.ok_or("missing radius_km")?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(format!("radius_km must be positive, got {radius_km}"));
        }

        Ok(Self {
            kind,
            severity,
            location,
            radius_km,
        })
    }
}

/// Shelters come either with a nested `location` or flat `latitude`/`longitude`.
#[derive(Debug, Deserialize)]
struct RawShelter {
    name: Option<String>,
    capacity: Option<u32>,
    location: Option<RawLocation>,
    #[serde(alias = "lat")]
    latitude: Option<f64>,
    #[serde(alias = "lon", alias = "lng")]
    longitude: Option<f64>,
}

impl TryFrom<RawShelter> for ShelterRecord {
    type Error = String;

    fn try_from(raw: RawShelter) -> Result<Self, Self::Error> {
        let name = raw.name.ok_or("missing name")?;
        let capacity = raw.capacity.ok_or("missing capacity")?;
        let location = match (raw.location, raw.latitude, raw.longitude) {
            (Some(location), _, _) => location.into_coordinate()?,
            (None, Some(lat), Some(lon)) => RawLocation::Pair(lat, lon).into_coordinate()?,
            _ => return Err("missing location".to_string()),
        };

        Ok(Self {
            name,
            capacity,
            location,
        })
    }
}

fn decode_one<R, T>(kind: &'static str, index: usize, value: &Value) -> Result<T, MalformedRecord>
where
    R: for<'de> Deserialize<'de>,
    T: TryFrom<R, Error = String>,
{
    let malformed = |reason: String| MalformedRecord {
        kind,
        index,
        reason,
    };
    let raw = R::deserialize(value).map_err(|e| malformed(e.to_string()))?;
    T::try_from(raw).map_err(malformed)
}

fn decode_batch<R, T>(kind: &'static str, values: &[Value]) -> Batch<T>
where
    R: for<'de> Deserialize<'de>,
    T: TryFrom<R, Error = String>,
{
    let mut batch = Batch::empty();
    for (index, value) in values.iter().enumerate() {
        match decode_one::<R, T>(kind, index, value) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                log::warn!("Skipping record: {}", e);
                batch.skipped += 1;
            }
        }
    }
    if batch.skipped > 0 {
        log::info!(
            "Decoded {} {} records, skipped {}",
            batch.records.len(),
            kind,
            batch.skipped
        );
    }
    batch
}

pub fn decode_alert(index: usize, value: &Value) -> Result<AlertRecord, MalformedRecord> {
    decode_one::<RawAlert, AlertRecord>("alert", index, value)
}

pub fn decode_shelter(index: usize, value: &Value) -> Result<ShelterRecord, MalformedRecord> {
    decode_one::<RawShelter, ShelterRecord>("shelter", index, value)
}

pub fn decode_alerts(values: &[Value]) -> Batch<AlertRecord> {
    decode_batch::<RawAlert, AlertRecord>("alert", values)
}

pub fn decode_shelters(values: &[Value]) -> Batch<ShelterRecord> {
    decode_batch::<RawShelter, ShelterRecord>("shelter", values)
}
