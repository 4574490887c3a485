//! Graph -> shapefile pair
//!
//! Produces a point layer (one feature per node) and a line-string layer
//! (one feature per edge). Geometry comes from the element's stored `Wkb` or
//! `Wkt` attribute when present, else it is synthesized from the key.

use std::collections::BTreeMap;
use std::path::Path;

use geo_types::Geometry;
use tracing::{debug, info, warn};

use crate::config::ShpConfig;
use crate::domain::encoding::stored_geometry;
use crate::domain::{
    geometry_name, AttrValue, Attributes, Feature, Field, FieldType, GeoDriver, GeometryKind,
    GraphKey, Layer, ShpGraph, RESERVED_KEYS,
};
use crate::{Result, ShpError};

/// DBF fields hold at most 254 bytes
pub const MAX_TEXT_WIDTH: usize = 254;

/// Write `graph` to a new data source at `outdir` through `driver`
pub fn write_graph(
    driver: &dyn GeoDriver,
    graph: &ShpGraph,
    outdir: &Path,
    config: &ShpConfig,
) -> Result<()> {
    driver.probe()?;
    config.validate()?;

    let nodes = build_layer(
        &config.node_layer,
        GeometryKind::Point,
        graph.nodes().map(|(coord, attrs)| (GraphKey::Node(coord), attrs)),
        config,
    )?;
    let edges = build_layer(
        &config.edge_layer,
        GeometryKind::LineString,
        graph
            .edges()
            .map(|(source, target, attrs)| (GraphKey::Edge(source, target), attrs)),
        config,
    )?;

    driver.create_dataset(outdir, &[nodes, edges])?;

    info!(
        "Wrote {} nodes and {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        outdir.display()
    );
    Ok(())
}

/// Build one output layer from graph elements
pub fn build_layer<'a>(
    name: &str,
    kind: GeometryKind,
    elements: impl Iterator<Item = (GraphKey, &'a Attributes)>,
    config: &ShpConfig,
) -> Result<Layer> {
    let elements: Vec<_> = elements.collect();
    let mut layer = Layer::new(name, Some(kind));

    if config.write_attributes {
        layer.fields = infer_fields(elements.iter().map(|(_, attrs)| *attrs), config)?;
    }

    for (key, attrs) in elements {
        let geometry = match stored_geometry(attrs)? {
            Some(geometry) => geometry,
            None => key.fallback_geometry(),
        };
        check_kind(name, kind, &geometry)?;

        let mut attributes = Attributes::new();
        for field in &layer.fields {
            if let (Some(value), Some(ty)) = (attrs.get(&field.name), field.ty) {
                attributes.insert(field.name.clone(), cell(name, &field.name, value, ty));
            }
        }
        layer.features.push(Feature::new(Some(geometry), attributes));
    }

    debug!(
        "Layer '{}': {} features, {} fields",
        name,
        layer.features.len(),
        layer.fields.len()
    );
    Ok(layer)
}

fn check_kind(layer: &str, kind: GeometryKind, geometry: &Geometry<f64>) -> Result<()> {
    match (kind, geometry) {
        (GeometryKind::Point, Geometry::Point(_)) => Ok(()),
        (GeometryKind::LineString, Geometry::LineString(line)) if line.0.len() < 2 => {
            Err(ShpError::short_line(layer, line.0.len()))
        }
        (GeometryKind::LineString, Geometry::LineString(_)) => Ok(()),
        _ => Err(ShpError::geometry_mismatch(
            layer,
            kind.as_str(),
            geometry_name(geometry),
        )),
    }
}

/// Value as stored in a column of type `ty`
fn cell(layer: &str, field: &str, value: &AttrValue, ty: FieldType) -> AttrValue {
    match ty {
        FieldType::Text { width } => match value.render() {
            Some(text) => AttrValue::Text(truncate(text, width as usize)),
            None => {
                if let AttrValue::Binary(_) = value {
                    warn!("Layer '{}': dropping binary value of field '{}'", layer, field);
                }
                AttrValue::Null
            }
        },
        _ => value.clone(),
    }
}

fn truncate(mut text: String, width: usize) -> String {
    if text.len() > width {
        let mut end = width;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

#[derive(Default)]
struct ColumnStats {
    numbers: Vec<f64>,
    bools: usize,
    dates: usize,
    texts: usize,
    width: usize,
}

impl ColumnStats {
    fn observe(&mut self, value: &AttrValue) {
        match value {
            AttrValue::Null => return,
            AttrValue::Binary(_) => {}
            AttrValue::Number(n) => self.numbers.push(*n),
            AttrValue::Bool(_) => self.bools += 1,
            AttrValue::Date(_) => self.dates += 1,
            AttrValue::Text(_) => self.texts += 1,
        }
        if let Some(text) = value.render() {
            self.width = self.width.max(text.len());
        }
    }

    fn field_type(&self, name: &str, config: &ShpConfig) -> Result<Option<FieldType>> {
        let total = self.numbers.len() + self.bools + self.dates + self.texts;
        let ty = if total == 0 {
            None
        } else if self.numbers.len() == total {
            Some(self.numeric_type(name, config)?)
        } else if self.bools == total {
            Some(FieldType::Bool)
        } else if self.dates == total {
            Some(FieldType::Date)
        } else {
            Some(self.text_type())
        };
        Ok(ty)
    }

    fn text_type(&self) -> FieldType {
        FieldType::Text {
            width: self.width.clamp(1, MAX_TEXT_WIDTH) as u8,
        }
    }

    /// Configured numeric shape, widened until every value reads back
    /// unchanged; text when no numeric column can hold them.
    fn numeric_type(&self, name: &str, config: &ShpConfig) -> Result<FieldType> {
        let (width, decimals) = (config.numeric_width, config.numeric_decimals);
        if numbers_fit(&self.numbers, width as usize, decimals as usize) {
            return Ok(FieldType::Number { width, decimals });
        }

        if let Some((width, decimals)) = widened_shape(&self.numbers) {
            if numbers_fit(&self.numbers, width, decimals) {
                debug!(
                    "Field '{}': widened numeric column to N({}, {})",
                    name, width, decimals
                );
                return Ok(FieldType::Number {
                    width: width as u8,
                    decimals: decimals as u8,
                });
            }
        }

        if self.width > MAX_TEXT_WIDTH {
            return Err(ShpError::encoding(format!(
                "Field '{}': a number needs {} characters, more than a DBF field holds",
                name, self.width
            )));
        }
        warn!(
            "Field '{}': numbers do not fit a numeric column, writing as text",
            name
        );
        Ok(self.text_type())
    }
}

/// Every value, formatted with `decimals` places, fits `width` and parses
/// back to itself
fn numbers_fit(numbers: &[f64], width: usize, decimals: usize) -> bool {
    numbers.iter().all(|n| {
        let text = format!("{:.*}", decimals, n);
        text.len() <= width && text.parse::<f64>().ok() == Some(*n)
    })
}

/// Smallest `(width, decimals)` holding the shortest exact rendering of
/// every value
fn widened_shape(numbers: &[f64]) -> Option<(usize, usize)> {
    let mut integral = 0;
    let mut decimals = 0;
    for n in numbers.iter().filter(|n| n.is_finite()) {
        let text = n.to_string();
        match text.split_once('.') {
            Some((int, frac)) => {
                integral = integral.max(int.len());
                decimals = decimals.max(frac.len());
            }
            None => integral = integral.max(text.len()),
        }
    }
    let width = integral + if decimals > 0 { decimals + 1 } else { 0 };
    (width <= MAX_TEXT_WIDTH).then_some((width, decimals))
}

/// One field per attribute key, sorted by name
///
/// Derived keys (`ShpName`, `Wkb`, `Wkt`, `Json`) and columns holding only
/// null or binary values are left out.
pub fn infer_fields<'a>(
    elements: impl Iterator<Item = &'a Attributes>,
    config: &ShpConfig,
) -> Result<Vec<Field>> {
    let mut columns: BTreeMap<&str, ColumnStats> = BTreeMap::new();
    for attrs in elements {
        for (key, value) in attrs {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            columns.entry(key.as_str()).or_default().observe(value);
        }
    }

    let mut fields = Vec::new();
    for (name, stats) in columns {
        if let Some(ty) = stats.field_type(name, config)? {
            fields.push(Field::typed(name, ty));
        }
    }
    Ok(fields)
}
