//! Bounding-box index over a layer's polygon records.

use geo::BoundingRect;
use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};
use tracing::debug;

use crate::models::{GeoPoint, PolygonRecord};

/// R-tree entry: a record's position in its layer plus its envelope.
#[derive(Debug, Clone)]
pub struct IndexedRecord {
    pub index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRecord {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for IndexedRecord {
    /// Planar squared distance (degrees²) from the point to the envelope.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope.distance_2(point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.envelope.contains_point(point)
    }
}

impl IndexedRecord {
    pub fn new(index: usize, record: &PolygonRecord) -> Option<Self> {
        let rect = record.geometry.bounding_rect()?;
        Some(Self {
            index,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        })
    }
}

/// Planar bounding-box index for one layer.
///
/// Answers are approximate: containment candidates may include bbox-only hits
/// and nearest candidates are ordered by planar degrees, not kilometres.
pub struct LayerIndex {
    tree: RTree<IndexedRecord>,
    /// Envelopes by record index
    envelopes: Vec<AABB<[f64; 2]>>,
}

impl LayerIndex {
    /// Build the index. Returns `None` when there is nothing to index.
    pub fn build(records: &[PolygonRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let indexed: Vec<IndexedRecord> = records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| IndexedRecord::new(i, r))
            .collect();

        if indexed.len() != records.len() {
            // Records are validated before indexing, so every one has a bbox
            panic!(
                "layer index: {} of {} records have no bounding box",
                records.len() - indexed.len(),
                records.len()
            );
        }

        let envelopes = indexed.iter().map(|ib| ib.envelope).collect();
        let tree = RTree::bulk_load(indexed);
        debug!("Layer index built with {} entries", tree.size());

        Some(Self { tree, envelopes })
    }

    /// Record indices whose bbox contains the point (boundary inclusive), ascending.
    pub fn containment_candidates(&self, point: GeoPoint) -> Vec<usize> {
        let query_envelope = AABB::from_point(point.to_xy());

        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .map(|ib| ib.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Lazily yields `(record index, planar bbox distance in degrees)`, nearest first.
    pub fn nearest_iter(&self, point: GeoPoint) -> impl Iterator<Item = (usize, f64)> + '_ {
        let xy = point.to_xy();
        self.tree
            .nearest_neighbor_iter(&xy)
            .map(move |ib| (ib.index, ib.envelope.distance_2(&xy).sqrt()))
    }

    /// Up to `k` nearest records by planar bbox distance, ascending.
    pub fn nearest_candidates(&self, point: GeoPoint, k: usize) -> Vec<(usize, f64)> {
        self.nearest_iter(point).take(k).collect()
    }

    pub fn envelope(&self, index: usize) -> &AABB<[f64; 2]> {
        &self.envelopes[index]
    }

    /// Get total number of indexed records
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
