//! Distance ranking and text rendering of shelters.

use thiserror::Error;

use super::model::ShelterRecord;
use crate::core::geo::{self, Coordinate, GeoError};

pub const NO_SHELTERS_MESSAGE: &str = "No shelters available.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    /// Shelters are never ranked without knowing where the user is
    #[error("User location is required to rank shelters")]
    LocationRequired,
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),
}

/// Sort shelters nearest first.
///
/// The sort is stable: shelters at the same distance keep their input order.
/// The input slice is left untouched.
pub fn rank(
    shelters: &[ShelterRecord],
    user: Option<Coordinate>,
) -> Result<Vec<ShelterRecord>, RankError> {
    let user = user.ok_or(RankError::LocationRequired)?;

    let mut keyed = shelters
        .iter()
        .map(|shelter| Ok((geo::distance(user, shelter.location)?, shelter)))
        .collect::<Result<Vec<_>, GeoError>>()?;

    keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    Ok(keyed.into_iter().map(|(_, shelter)| shelter.clone()).collect())
}

/// One `"<name> - <capacity> beds available"` line per shelter, in the order given.
pub fn format(shelters: &[ShelterRecord]) -> String {
    if shelters.is_empty() {
        return NO_SHELTERS_MESSAGE.to_string();
    }

    shelters
        .iter()
        .map(|s| format!("{} - {} beds available", s.name, s.capacity))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NYC: Coordinate = Coordinate::new(40.7128, -74.0060);

    fn names(shelters: &[ShelterRecord]) -> Vec<&str> {
        shelters.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_rank_and_format() {
        let shelters = vec![
            ShelterRecord::new("A", 10, (40.71, -74.00)),
            ShelterRecord::new("B", 5, (40.80, -74.10)),
        ];

        let ranked = rank(&shelters, Some(NYC)).unwrap();
        assert_eq!(names(&ranked), vec!["A", "B"]);
        assert_eq!(format(&ranked), "A - 10 beds available\nB - 5 beds available");
    }

    #[test]
    fn test_rank_reorders_by_distance() {
        let shelters = vec![
            ShelterRecord::new("Far", 50, (42.0, -75.0)),
            ShelterRecord::new("Near", 20, (40.72, -74.01)),
            ShelterRecord::new("Middle", 30, (41.0, -74.0)),
        ];

        let ranked = rank(&shelters, Some(NYC)).unwrap();
        assert_eq!(names(&ranked), vec!["Near", "Middle", "Far"]);
        // Input untouched
        assert_eq!(names(&shelters), vec!["Far", "Near", "Middle"]);
    }

    #[test]
    fn test_rank_is_stable_for_equal_distances() {
        let shelters = vec![
            ShelterRecord::new("Gym", 100, (40.75, -74.0)),
            ShelterRecord::new("Church", 40, (40.75, -74.0)),
            ShelterRecord::new("Library", 60, (40.75, -74.0)),
            ShelterRecord::new("School", 80, (40.72, -74.0)),
        ];

        let ranked = rank(&shelters, Some(NYC)).unwrap();
        assert_eq!(names(&ranked), vec!["School", "Gym", "Church", "Library"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let shelters = vec![
            ShelterRecord::new("B", 5, (40.80, -74.10)),
            ShelterRecord::new("A", 10, (40.71, -74.00)),
            ShelterRecord::new("C", 7, (40.71, -74.00)),
        ];

        let first = rank(&shelters, Some(NYC)).unwrap();
        let second = rank(&shelters, Some(NYC)).unwrap();
        assert_eq!(first, second);
        assert_eq!(rank(&first, Some(NYC)).unwrap(), first);
    }

    #[test]
    fn test_rank_requires_location() {
        let shelters = vec![ShelterRecord::new("A", 10, (40.71, -74.00))];
        assert_eq!(rank(&shelters, None), Err(RankError::LocationRequired));
        // Even an empty batch needs a location
        assert_eq!(rank(&[], None), Err(RankError::LocationRequired));
    }

    #[test]
    fn test_rank_invalid_shelter_location() {
        let shelters = vec![ShelterRecord::new("Nowhere", 10, (123.0, 0.0))];
        assert!(matches!(
            rank(&shelters, Some(NYC)),
            Err(RankError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format(&[]), "No shelters available.");
    }

    #[test]
    fn test_format_keeps_given_order() {
        let shelters = vec![
            ShelterRecord::new("Z", 0, (0.0, 0.0)),
            ShelterRecord::new("Y", 3, (10.0, 10.0)),
        ];
        assert_eq!(format(&shelters), "Z - 0 beds available\nY - 3 beds available");
    }

    fn shelter_batch() -> impl Strategy<Value = Vec<ShelterRecord>> {
        // A small pool of sites so that equal distances show up often
        let site = prop_oneof![
            Just((40.71, -74.00)),
            Just((40.80, -74.10)),
            Just((41.0, -73.5)),
            (-90.0f64..=90.0, -180.0f64..=180.0),
        ];
        prop::collection::vec((0u32..500, site), 0..20).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (capacity, site))| ShelterRecord::new(format!("S{i}"), capacity, site))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_rank_is_idempotent(shelters in shelter_batch()) {
            let first = rank(&shelters, Some(NYC)).unwrap();
            let second = rank(&shelters, Some(NYC)).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(rank(&first, Some(NYC)).unwrap(), first);
        }

        #[test]
        fn prop_rank_orders_by_distance_and_keeps_ties(shelters in shelter_batch()) {
            let ranked = rank(&shelters, Some(NYC)).unwrap();
            prop_assert_eq!(ranked.len(), shelters.len());

            let position = |name: &str| shelters.iter().position(|s| s.name == name).unwrap();
            for pair in ranked.windows(2) {
                let a = geo::distance(NYC, pair[0].location).unwrap();
                let b = geo::distance(NYC, pair[1].location).unwrap();
                prop_assert!(a <= b);
                if a == b {
                    prop_assert!(position(&pair[0].name) < position(&pair[1].name));
                }
            }
        }
    }
}
