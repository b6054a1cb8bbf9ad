use serde::{Deserialize, Serialize};

use crate::core::geo::Coordinate;

/// A shelter as returned by the shelter store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterRecord {
    pub name: String,
    pub capacity: u32,
    pub location: Coordinate,
}

impl ShelterRecord {
    pub fn new(name: impl Into<String>, capacity: u32, location: impl Into<Coordinate>) -> Self {
        Self {
            name: name.into(),
            capacity,
            location: location.into(),
        }
    }
}
