//! Domain layer for shapefile <-> graph translation
//!
//! # Domain Models
//!
//! - `Coord`: hashable 2D coordinate, the node identity
//! - `AttrValue` / `Attributes`: tagged attribute values on nodes and edges
//! - `Layer`, `Feature`, `Field`: what a driver reads and writes
//! - `ShpGraph`: the directed graph (see [`graph`])
//!
//! # Port Trait
//!
//! - `GeoDriver`: access to the geospatial backend
//!
//! # Examples
//!
//! ```rust
//! use shpgraph::domain::{AttrValue, Attributes, Coord};
//!
//! let mut attrs = Attributes::new();
//! attrs.insert("name".to_string(), AttrValue::from("depot"));
//! assert_eq!(Coord::new(1.0, 2.0), Coord::from((1.0, 2.0)));
//! ```

pub mod encoding;
pub mod graph;

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use chrono::NaiveDate;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use graph::{GraphKey, ShpGraph};

/// Synthetic attribute naming the layer a feature was read from
pub const SHP_NAME: &str = "ShpName";
/// Well-known binary encoding of an edge's line geometry
pub const WKB: &str = "Wkb";
/// Well-known text encoding of an edge's line geometry
pub const WKT: &str = "Wkt";
/// GeoJSON encoding of an edge's line geometry
pub const JSON: &str = "Json";

/// Keys derived on read; never written back as DBF fields.
pub const RESERVED_KEYS: [&str; 4] = [SHP_NAME, WKB, WKT, JSON];

// ═══════════════════════════════════════════════════════════════════════════
// Domain Models
// ═══════════════════════════════════════════════════════════════════════════

/// 2D coordinate used as node identity
///
/// Equality and hashing compare bit patterns, with `-0.0` folded into `0.0`.
/// Two coordinates are the same node only if they are bit-identical after
/// that normalization, so values read back from a file match the values
/// written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn key_bits(&self) -> (u64, u64) {
        fn bits(v: f64) -> u64 {
            if v == 0.0 {
                0.0f64.to_bits()
            } else {
                v.to_bits()
            }
        }
        (bits(self.x), bits(self.y))
    }
}

impl PartialEq for Coord {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for Coord {}

impl Hash for Coord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<geo_types::Coord<f64>> for Coord {
    fn from(c: geo_types::Coord<f64>) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<geo_types::Point<f64>> for Coord {
    fn from(p: geo_types::Point<f64>) -> Self {
        Self::new(p.x(), p.y())
    }
}

impl From<Coord> for geo_types::Coord<f64> {
    fn from(c: Coord) -> Self {
        geo_types::Coord { x: c.x, y: c.y }
    }
}

/// Attribute value carried by nodes, edges and features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// Field declared in the schema but empty on this feature
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Binary(Vec<u8>),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            AttrValue::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Text rendering for character columns. `None` for null and binary.
    pub fn render(&self) -> Option<String> {
        match self {
            AttrValue::Null | AttrValue::Binary(_) => None,
            AttrValue::Text(s) => Some(s.clone()),
            AttrValue::Number(n) => Some(n.to_string()),
            AttrValue::Bool(b) => Some(b.to_string()),
            AttrValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<NaiveDate> for AttrValue {
    fn from(d: NaiveDate) -> Self {
        AttrValue::Date(d)
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(b: Vec<u8>) -> Self {
        AttrValue::Binary(b)
    }
}

/// Attribute mapping of a node, edge or feature
pub type Attributes = HashMap<String, AttrValue>;

/// Geometry kind a layer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
        }
    }
}

/// Name of a geometry's variant, for errors and logs
pub fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// DBF column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text { width: u8 },
    Number { width: u8, decimals: u8 },
    Bool,
    Date,
}

/// Layer field declaration
///
/// `ty` is required when writing; readers may leave it unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: Option<FieldType>,
}

impl Field {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
        }
    }

    pub fn typed(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
        }
    }
}

/// One geometry plus its attribute values
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub attributes: Attributes,
    /// `None` for null shapes
    pub geometry: Option<Geometry<f64>>,
}

impl Feature {
    pub fn new(geometry: Option<Geometry<f64>>, attributes: Attributes) -> Self {
        Self {
            attributes,
            geometry,
        }
    }

    /// Value of a schema field; absent fields read as `Null`
    pub fn field(&self, name: &str) -> AttrValue {
        self.attributes.get(name).cloned().unwrap_or(AttrValue::Null)
    }
}

/// Named collection of features sharing one field schema
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    /// Declared geometry kind; `None` when the source does not say
    pub kind: Option<GeometryKind>,
    pub fields: Vec<Field>,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: Option<GeometryKind>) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: Vec::new(),
            features: Vec::new(),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Port Trait: GeoDriver
// ═══════════════════════════════════════════════════════════════════════════

/// Geospatial backend abstraction
///
/// Reader and writer never touch the filesystem themselves; every byte goes
/// through a driver. `probe` runs before any other call so a missing backend
/// is reported before the filesystem is accessed.
///
/// # Implementations
///
/// - `ShapefileDriver` (feature `shapefile`): ESRI Shapefile via the `shapefile` crate
/// - `MemoryDriver`: datasets kept in memory, keyed by path
pub trait GeoDriver: Send + Sync {
    /// Driver name, e.g. "ESRI Shapefile"
    fn name(&self) -> &str;

    /// Capability check
    ///
    /// # Errors
    ///
    /// `ErrorKind::UnavailableDependency` if the backend cannot be used
    fn probe(&self) -> Result<()> {
        Ok(())
    }

    /// Open `path` and return all its layers
    ///
    /// A single dataset yields one layer; a directory yields one layer per
    /// dataset it contains.
    fn read_layers(&self, path: &Path) -> Result<Vec<Layer>>;

    /// Create a new data source at `outdir` holding `layers`
    ///
    /// # Errors
    ///
    /// `ErrorKind::OutputExists` if `outdir` already exists. Nothing is
    /// written in that case.
    fn create_dataset(&self, outdir: &Path, layers: &[Layer]) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
