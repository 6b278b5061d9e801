//! Layer store: immutable polygon layers built once at startup.

use hashbrown::HashMap;
use tracing::{info, warn};

use super::index::LayerIndex;
use crate::error::ClassifyError;
use crate::models::PolygonRecord;

/// Supplies the records for one layer.
///
/// Implemented by whatever reads boundary files; the core only needs the
/// field name and the records.
pub trait LayerSource {
    /// Semantic field this source feeds (e.g. `"pga"`)
    fn field(&self) -> &str;

    /// Produce the records. An error skips this source, not the whole load.
    fn load(&self) -> anyhow::Result<Vec<PolygonRecord>>;
}

impl<T: LayerSource + ?Sized> LayerSource for Box<T> {
    fn field(&self) -> &str {
        (**self).field()
    }

    fn load(&self) -> anyhow::Result<Vec<PolygonRecord>> {
        (**self).load()
    }
}

/// In-memory source, for records produced elsewhere.
#[derive(Debug, Clone)]
pub struct StaticLayer {
    pub field: String,
    pub records: Vec<PolygonRecord>,
}

impl StaticLayer {
    pub fn new(field: impl Into<String>, records: Vec<PolygonRecord>) -> Self {
        Self {
            field: field.into(),
            records,
        }
    }
}

impl LayerSource for StaticLayer {
    fn field(&self) -> &str {
        &self.field
    }

    fn load(&self) -> anyhow::Result<Vec<PolygonRecord>> {
        Ok(self.records.clone())
    }
}

/// One semantic field's polygons plus the index over them.
pub struct Layer {
    pub field: String,
    records: Vec<PolygonRecord>,
    index: Option<LayerIndex>,
}

impl Layer {
    /// Build a layer, dropping records that cannot be classified against.
    pub fn build(field: impl Into<String>, records: Vec<PolygonRecord>) -> Self {
        let field = field.into();
        let total = records.len();

        let records: Vec<PolygonRecord> = records
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| match record.validate() {
                Ok(()) => Some(record),
                Err(defect) => {
                    warn!(
                        "Layer '{}': skipping record {} from {}: {}",
                        field, i, record.source, defect
                    );
                    None
                }
            })
            .collect();

        let index = LayerIndex::build(&records);
        if index.is_none() {
            warn!("Layer '{}' has no usable polygons; it will never match", field);
        }

        info!(
            "Field '{}' -> {} polygons loaded ({} skipped)",
            field,
            records.len(),
            total - records.len()
        );

        Self {
            field,
            records,
            index,
        }
    }

    pub fn records(&self) -> &[PolygonRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> &PolygonRecord {
        &self.records[index]
    }

    /// `None` for a layer without usable polygons
    pub fn index(&self) -> Option<&LayerIndex> {
        self.index.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// All layers, in configuration order. Read-only after construction.
pub struct LayerStore {
    layers: Vec<Layer>,
    by_field: HashMap<String, usize>,
}

impl LayerStore {
    /// Load every source. Sources naming the same field are merged into one
    /// layer in source order; a failing source is logged and skipped.
    pub fn load<S: LayerSource>(sources: &[S]) -> Result<Self, ClassifyError> {
        let mut grouped: Vec<(String, Vec<PolygonRecord>)> = Vec::new();

        for source in sources {
            let field = source.field();
            match source.load() {
                Ok(records) => match grouped.iter_mut().find(|(f, _)| f.as_str() == field) {
                    Some((_, existing)) => existing.extend(records),
                    None => grouped.push((field.to_string(), records)),
                },
                Err(e) => warn!("Layer source for '{}' failed, skipping: {:#}", field, e),
            }
        }

        Self::from_layers(grouped)
    }

    /// Build from record sets already grouped by field.
    pub fn from_layers<I>(layers: I) -> Result<Self, ClassifyError>
    where
        I: IntoIterator<Item = (String, Vec<PolygonRecord>)>,
    {
        let layers: Vec<Layer> = layers
            .into_iter()
            .map(|(field, records)| Layer::build(field, records))
            .collect();

        if layers.is_empty() {
            return Err(ClassifyError::EmptyLayerSet);
        }

        let by_field = layers
            .iter()
            .enumerate()
            .map(|(i, l)| (l.field.clone(), i))
            .collect();

        info!("Layer store ready with {} layers", layers.len());

        Ok(Self { layers, by_field })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, field: &str) -> Option<&Layer> {
        self.by_field.get(field).map(|&i| &self.layers[i])
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
