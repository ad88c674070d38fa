//! Feature catalog and filtering
//!
//! Pull-based: the session asks for a fresh feature list whenever the
//! position or the filter bounds change. The catalog source annotates each
//! summit with bearing, distance, and visual elevation relative to the
//! observer and returns them nearest-first, which is the relevance order
//! the layout engine stacks by.

use heapless::String as HString;
use log::debug;
use peaksight_core::geo::{calculate_bearing, calculate_distance, visual_elevation, GeoPosition};
use peaksight_core::layout::{Feature, MAX_NAME_LEN};

use crate::error::SessionError;
use crate::settings::Settings;

/// One summit in the static catalog. Altitude of `position` is the summit
/// height above sea level.
#[derive(Debug, Clone)]
pub struct SummitRecord {
    pub id: u32,
    pub name: String,
    pub position: GeoPosition,
}

impl SummitRecord {
    pub fn new(id: u32, name: &str, lat_deg: f64, lon_deg: f64, height_m: f32) -> Self {
        Self {
            id,
            name: name.to_string(),
            position: GeoPosition::with_altitude(lat_deg, lon_deg, height_m),
        }
    }
}

/// Height and distance bounds for the feature filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureFilter {
    pub min_height_m: f32,
    pub max_height_m: f32,
    pub min_distance_km: f32,
    pub max_distance_km: f32,
}

impl FeatureFilter {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_height_m: settings.min_height_m,
            max_height_m: settings.max_height_m,
            min_distance_km: settings.min_distance_km,
            max_distance_km: settings.max_distance_km,
        }
    }
}

/// Supplies the current feature list for an observer.
pub trait FeatureSource: Send {
    fn features(
        &self,
        observer: &GeoPosition,
        filter: &FeatureFilter,
    ) -> Result<Vec<Feature>, SessionError>;
}

/// Static in-memory catalog.
pub struct CatalogFeatureSource {
    records: Vec<SummitRecord>,
}

impl CatalogFeatureSource {
    pub fn new(records: Vec<SummitRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FeatureSource for CatalogFeatureSource {
    fn features(
        &self,
        observer: &GeoPosition,
        filter: &FeatureFilter,
    ) -> Result<Vec<Feature>, SessionError> {
        let mut out: Vec<Feature> = Vec::new();
        for record in &self.records {
            let height_m = record.position.alt_m;
            if height_m < filter.min_height_m || height_m > filter.max_height_m {
                continue;
            }
            let distance_km = calculate_distance(observer, &record.position);
            if distance_km < filter.min_distance_km || distance_km > filter.max_distance_km {
                continue;
            }
            let mut name: HString<MAX_NAME_LEN> = HString::new();
            for ch in record.name.chars().take(MAX_NAME_LEN) {
                if name.push(ch).is_err() {
                    break;
                }
            }
            out.push(Feature {
                id: record.id,
                name,
                bearing_deg: calculate_bearing(observer, &record.position),
                elevation_rad: visual_elevation(observer.alt_m, height_m, distance_km),
                distance_km,
                height_m,
            });
        }
        out.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        debug!(
            "feature filter matched {} of {} catalog records",
            out.len(),
            self.records.len()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lake_district() -> CatalogFeatureSource {
        CatalogFeatureSource::new(vec![
            SummitRecord::new(1, "Scafell Pike", 54.4542, -3.2116, 978.0),
            SummitRecord::new(2, "Helvellyn", 54.5270, -3.0163, 950.0),
            SummitRecord::new(3, "Skiddaw", 54.6516, -3.1464, 931.0),
            SummitRecord::new(4, "Catbells", 54.5686, -3.1708, 451.0),
        ])
    }

    fn keswick() -> GeoPosition {
        GeoPosition::with_altitude(54.6013, -3.1347, 80.0)
    }

    fn wide_filter() -> FeatureFilter {
        FeatureFilter {
            min_height_m: 0.0,
            max_height_m: 9000.0,
            min_distance_km: 0.0,
            max_distance_km: 30.0,
        }
    }

    #[test]
    fn test_features_sorted_nearest_first() {
        let source = lake_district();
        let features = source.features(&keswick(), &wide_filter()).unwrap();
        assert_eq!(features.len(), 4);
        for pair in features.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
        // Skiddaw is the closest of the four to Keswick
        assert_eq!(features[0].id, 3);
    }

    #[test]
    fn test_height_bound_excludes_low_summits() {
        let source = lake_district();
        let mut filter = wide_filter();
        filter.min_height_m = 900.0;
        let features = source.features(&keswick(), &filter).unwrap();
        assert_eq!(features.len(), 3);
        assert!(features.iter().all(|f| f.height_m >= 900.0));
    }

    #[test]
    fn test_distance_bound_excludes_far_summits() {
        let source = lake_district();
        let mut filter = wide_filter();
        filter.max_distance_km = 8.0;
        let features = source.features(&keswick(), &filter).unwrap();
        assert!(!features.is_empty());
        assert!(features.iter().all(|f| f.distance_km <= 8.0));
        assert!(features.len() < 4);
    }

    #[test]
    fn test_annotation_fields_are_populated() {
        let source = lake_district();
        let features = source.features(&keswick(), &wide_filter()).unwrap();
        let skiddaw = features.iter().find(|f| f.id == 3).unwrap();
        assert_eq!(skiddaw.name.as_str(), "Skiddaw");
        // Skiddaw lies roughly north of Keswick
        assert!(
            skiddaw.bearing_deg < 40.0 || skiddaw.bearing_deg > 320.0,
            "Expected northerly bearing, got {}",
            skiddaw.bearing_deg
        );
        // 850 m rise over ~6 km: clearly above the horizontal
        assert!(skiddaw.elevation_rad > 0.05);
    }
}
