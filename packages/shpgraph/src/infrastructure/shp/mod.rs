//! ESRI Shapefile driver (`shapefile` + `dbase` crates)
//!
//! Reading accepts a `.shp` path or a directory; a directory yields one layer
//! per `.shp` directly inside it, in file-name order. Writing creates the
//! output directory and one `<layer>.shp/.shx/.dbf` triple per layer.
//!
//! Shapes are converted through `geo-types`: `Point`/`PointM`/`PointZ` become
//! 2D points, single-part polylines become line strings, multi-part polylines
//! stay multi-line strings. Polygons and multipoints come through as their
//! geo-types equivalents; null shapes carry no geometry.

pub mod values;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use geo_types::Geometry;
use shapefile::dbase::{self, FieldName, Record, TableWriterBuilder};
use shapefile::{Point, Polyline, Shape, ShapeReader};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::SHAPEFILE_DRIVER;
use crate::domain::{
    geometry_name, Feature, Field, FieldType, GeoDriver, GeometryKind, Layer,
};
use crate::writer::MAX_TEXT_WIDTH;
use crate::{Result, ShpError};

#[derive(Debug, Clone, Copy, Default)]
pub struct ShapefileDriver;

impl ShapefileDriver {
    pub fn new() -> Self {
        Self
    }
}

impl GeoDriver for ShapefileDriver {
    fn name(&self) -> &str {
        SHAPEFILE_DRIVER
    }

    fn read_layers(&self, path: &Path) -> Result<Vec<Layer>> {
        dataset_paths(path)?
            .iter()
            .map(|shp| read_layer(shp))
            .collect()
    }

    fn create_dataset(&self, outdir: &Path, layers: &[Layer]) -> Result<()> {
        if outdir.exists() {
            return Err(ShpError::output_exists(outdir));
        }
        // every schema and shape is checked before the directory exists
        let tables = layers
            .iter()
            .map(|layer| check_layer(layer).map(|kind| (layer, kind)))
            .collect::<Result<Vec<_>>>()?;

        fs::create_dir_all(outdir)?;
        let written = tables.into_iter().try_for_each(|(layer, kind)| {
            write_layer(&outdir.join(format!("{}.shp", layer.name)), layer, kind)
        });

        if written.is_err() {
            if let Err(e) = fs::remove_dir_all(outdir) {
                warn!("Cannot remove partial output {}: {}", outdir.display(), e);
            }
        }
        written
    }
}

fn is_shp(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"))
}

fn dataset_paths(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            ShpError::library(format!("Cannot list {}: {}", path.display(), e)).with_source(e)
        })?;
        if entry.file_type().is_file() && is_shp(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    debug!("{}: {} shapefile(s)", path.display(), paths.len());
    Ok(paths)
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `path` with extension `ext`, upper-cased when the `.shp` extension is
fn sibling(path: &Path, ext: &str) -> PathBuf {
    let upper = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.chars().all(|c| c.is_ascii_uppercase()));
    if upper {
        path.with_extension(ext.to_ascii_uppercase())
    } else {
        path.with_extension(ext)
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(shapefile::Error::from)?;
    Ok(BufReader::new(file))
}

fn read_layer(path: &Path) -> Result<Layer> {
    let table = dbase::Reader::new(open(&sibling(path, "dbf"))?)?;
    let fields: Vec<Field> = table
        .fields()
        .iter()
        .map(|info| Field::named(info.name()))
        .collect();

    let shx = sibling(path, "shx");
    let shapes = if shx.exists() {
        ShapeReader::with_shx(open(path)?, open(&shx)?)?
    } else {
        ShapeReader::new(open(path)?)?
    };

    let mut layer = Layer::new(layer_name(path), None);
    let mut reader = shapefile::Reader::new(shapes, table);
    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item?;
        let attributes = fields
            .iter()
            .filter_map(|field| {
                record
                    .get(&field.name)
                    .map(|value| (field.name.clone(), values::to_attr(value)))
            })
            .collect();
        layer.features.push(Feature::new(to_geometry(shape), attributes));
    }
    layer.fields = fields;

    debug!(
        "Read layer '{}' ({} features) from {}",
        layer.name,
        layer.features.len(),
        path.display()
    );
    Ok(layer)
}

fn to_geometry(shape: Shape) -> Option<Geometry<f64>> {
    match Geometry::<f64>::try_from(shape) {
        Ok(Geometry::MultiLineString(mut lines)) if lines.0.len() == 1 => {
            lines.0.pop().map(Geometry::LineString)
        }
        Ok(geometry) => Some(geometry),
        Err(_) => None,
    }
}

fn table_builder(layer: &Layer) -> Result<TableWriterBuilder> {
    let mut builder = TableWriterBuilder::new();
    for field in &layer.fields {
        let name = FieldName::try_from(field.name.as_str()).map_err(|_| {
            ShpError::library(format!(
                "Invalid DBF field name '{}' in layer '{}' (at most 10 bytes)",
                field.name, layer.name
            ))
        })?;
        let ty = field.ty.unwrap_or(FieldType::Text {
            width: MAX_TEXT_WIDTH as u8,
        });
        builder = match ty {
            FieldType::Text { width } => builder.add_character_field(name, width),
            FieldType::Number { width, decimals } => {
                builder.add_numeric_field(name, width, decimals)
            }
            FieldType::Bool => builder.add_logical_field(name),
            FieldType::Date => builder.add_date_field(name),
        };
    }
    Ok(builder)
}

fn to_record(layer: &Layer, feature: &Feature) -> Record {
    let mut record = Record::default();
    for field in &layer.fields {
        record.insert(
            field.name.clone(),
            values::to_field_value(&feature.field(&field.name), field.ty),
        );
    }
    record
}

/// Geometry kind of `layer` once its fields and every feature fit it
fn check_layer(layer: &Layer) -> Result<GeometryKind> {
    let kind = layer.kind.ok_or_else(|| {
        ShpError::library(format!("Layer '{}' has no geometry kind", layer.name))
    })?;
    table_builder(layer)?;

    for feature in &layer.features {
        match (kind, feature.geometry.as_ref()) {
            (GeometryKind::Point, Some(Geometry::Point(_))) => {}
            (GeometryKind::LineString, Some(Geometry::LineString(line))) => {
                if line.0.len() < 2 {
                    return Err(ShpError::short_line(&layer.name, line.0.len()));
                }
            }
            (_, other) => {
                return Err(ShpError::geometry_mismatch(
                    &layer.name,
                    kind.as_str(),
                    other.map(geometry_name).unwrap_or("null"),
                ));
            }
        }
    }
    Ok(kind)
}

/// Write one checked layer; the writer is dropped (and its headers
/// finalized) before this returns, on success and on error.
fn write_layer(path: &Path, layer: &Layer, kind: GeometryKind) -> Result<()> {
    let mut writer = shapefile::Writer::from_path(path, table_builder(layer)?)?;
    for feature in &layer.features {
        let record = to_record(layer, feature);
        match (kind, feature.geometry.as_ref()) {
            (GeometryKind::Point, Some(Geometry::Point(p))) => {
                writer.write_shape_and_record(&Point::new(p.x(), p.y()), &record)?;
            }
            (GeometryKind::LineString, Some(Geometry::LineString(line))) => {
                let points = line.coords().map(|c| Point::new(c.x, c.y)).collect();
                writer.write_shape_and_record(&Polyline::new(points), &record)?;
            }
            (_, other) => {
                return Err(ShpError::geometry_mismatch(
                    &layer.name,
                    kind.as_str(),
                    other.map(geometry_name).unwrap_or("null"),
                ));
            }
        }
    }

    debug!(
        "Wrote layer '{}' ({} features) to {}",
        layer.name,
        layer.features.len(),
        path.display()
    );
    Ok(())
}
