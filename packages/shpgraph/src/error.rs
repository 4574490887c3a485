//! Error types for shpgraph

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Translation error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Geospatial backend not compiled in / not usable
    UnavailableDependency,
    /// Pass-through from the shapefile/dbase crates
    Library,
    /// Writer target directory already exists
    OutputExists,
    /// Geometry does not fit the destination layer
    GeometryMismatch,
    /// WKB/WKT/GeoJSON encode or decode failure
    Encoding,
    /// Configuration errors
    Config,
    /// I/O errors
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnavailableDependency => "unavailable_dependency",
            ErrorKind::Library => "library",
            ErrorKind::OutputExists => "output_exists",
            ErrorKind::GeometryMismatch => "geometry_mismatch",
            ErrorKind::Encoding => "encoding",
            ErrorKind::Config => "config",
            ErrorKind::IO => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Translation error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct ShpError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl ShpError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn unavailable_dependency(driver: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::UnavailableDependency,
            format!(
                "{} driver is not available (build with the `shapefile` feature)",
                driver.into()
            ),
        )
    }

    pub fn library(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Library, message)
    }

    pub fn output_exists(path: &Path) -> Self {
        Self::new(
            ErrorKind::OutputExists,
            format!("Output directory already exists: {}", path.display()),
        )
    }

    pub fn geometry_mismatch(layer: &str, expected: &str, found: &str) -> Self {
        Self::new(
            ErrorKind::GeometryMismatch,
            format!("Layer '{}' expects {} geometry, got {}", layer, expected, found),
        )
    }

    pub fn short_line(layer: &str, vertices: usize) -> Self {
        Self::new(
            ErrorKind::GeometryMismatch,
            format!(
                "Layer '{}' needs at least 2 vertices per LineString, got {}",
                layer, vertices
            ),
        )
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Encoding, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }
}

impl From<std::io::Error> for ShpError {
    fn from(err: std::io::Error) -> Self {
        ShpError::new(ErrorKind::IO, format!("I/O error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for ShpError {
    fn from(err: serde_json::Error) -> Self {
        ShpError::encoding(format!("GeoJSON error: {}", err)).with_source(err)
    }
}

impl From<serde_yaml::Error> for ShpError {
    fn from(err: serde_yaml::Error) -> Self {
        ShpError::config(format!("YAML parsing error: {}", err)).with_source(err)
    }
}

#[cfg(feature = "shapefile")]
impl From<shapefile::Error> for ShpError {
    fn from(err: shapefile::Error) -> Self {
        ShpError::library(format!("Shapefile error: {}", err)).with_source(err)
    }
}

#[cfg(feature = "shapefile")]
impl From<shapefile::dbase::Error> for ShpError {
    fn from(err: shapefile::dbase::Error) -> Self {
        ShpError::library(format!("DBF error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ShpError>;
