//! Point index for radius and bounding-box containment.
//!
//! Points live in an R-tree keyed by `[lon, lat]`. A radius query first asks
//! the tree for the rectangle that encloses the search circle, then keeps only
//! the points whose great-circle distance is within the radius.

use std::f64::consts::FRAC_PI_2;

use geo::{Distance, Haversine, Point};
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};

use crate::error::{EngineError, EngineResult};
use crate::query::BoundingBox;
use crate::store::DocumentStore;
use crate::{DocId, GeoPoint};

/// Mean earth radius, matching the haversine measure used for distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

// Envelopes are built slightly wider than the circle so rounding never drops a
// border point; the exact distance check runs afterwards.
const ENVELOPE_SLACK_DEG: f64 = 1e-6;
const ENVELOPE_SLACK_RATIO: f64 = 1e-3;

type GeoEntry = GeomWithData<[f64; 2], DocId>;

/// Great-circle distance in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(Point::new(a.lon, a.lat), Point::new(b.lon, b.lat)) / 1000.0
}

pub struct GeoIndex {
    tree: RTree<GeoEntry>,
    points: Vec<GeoPoint>,
}

impl GeoIndex {
    pub fn build(store: &DocumentStore) -> Self {
        let points: Vec<GeoPoint> = store.iter().map(|(_, ev)| ev.location).collect();
        let entries = points
            .iter()
            .enumerate()
            .map(|(doc, p)| GeomWithData::new([p.lon, p.lat], doc as DocId))
            .collect();
        Self { tree: RTree::bulk_load(entries), points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Documents at most `radius_km` from `origin`, sorted by doc id.
    pub fn within_radius(&self, origin: GeoPoint, radius_km: f64) -> Vec<DocId> {
        let mut out: Vec<DocId> = Vec::new();
        for env in radius_envelopes(origin, radius_km) {
            for entry in self.tree.locate_in_envelope_intersecting(&env) {
                let doc = entry.data;
                if distance_km(origin, self.points[doc as usize]) <= radius_km {
                    out.push(doc);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Inclusive rectangle test on latitude and longitude independently.
    ///
    /// A box whose left edge lies east of its right edge would cross the
    /// antimeridian; that case is not supported and matches nothing.
    pub fn within_box(&self, bbox: &BoundingBox) -> Vec<DocId> {
        if bbox.left_lon > bbox.right_lon {
            return Vec::new();
        }
        let env = AABB::from_corners([bbox.left_lon, bbox.bottom_lat], [bbox.right_lon, bbox.top_lat]);
        let mut out: Vec<DocId> = self
            .tree
            .locate_in_envelope_intersecting(&env)
            .map(|entry| entry.data)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn distance_km(&self, origin: GeoPoint, doc_id: DocId) -> EngineResult<f64> {
        self.points
            .get(doc_id as usize)
            .map(|p| distance_km(origin, *p))
            .ok_or_else(|| EngineError::corrupted(format!("doc id {doc_id} missing from geo index")))
    }
}

/// Rectangles (in `[lon, lat]` degrees) that together cover every point within
/// `radius_km` of `origin`. Two rectangles when the circle crosses the
/// antimeridian, a full longitude band when it contains a pole.
fn radius_envelopes(origin: GeoPoint, radius_km: f64) -> Vec<AABB<[f64; 2]>> {
    let angular = radius_km.max(0.0) * (1.0 + ENVELOPE_SLACK_RATIO) / EARTH_RADIUS_KM;
    let lat = origin.lat.to_radians();
    let min_lat = (lat - angular).to_degrees() - ENVELOPE_SLACK_DEG;
    let max_lat = (lat + angular).to_degrees() + ENVELOPE_SLACK_DEG;

    if lat - angular <= -FRAC_PI_2 || lat + angular >= FRAC_PI_2 {
        return vec![AABB::from_corners([-180.0, min_lat.max(-90.0)], [180.0, max_lat.min(90.0)])];
    }

    let dlon = (angular.sin() / lat.cos()).min(1.0).asin().to_degrees() + ENVELOPE_SLACK_DEG;
    let min_lon = origin.lon - dlon;
    let max_lon = origin.lon + dlon;

    if min_lon < -180.0 {
        vec![
            AABB::from_corners([min_lon + 360.0, min_lat], [180.0, max_lat]),
            AABB::from_corners([-180.0, min_lat], [max_lon, max_lat]),
        ]
    } else if max_lon > 180.0 {
        vec![
            AABB::from_corners([min_lon, min_lat], [180.0, max_lat]),
            AABB::from_corners([-180.0, min_lat], [max_lon - 360.0, max_lat]),
        ]
    } else {
        vec![AABB::from_corners([min_lon, min_lat], [max_lon, max_lat])]
    }
}
