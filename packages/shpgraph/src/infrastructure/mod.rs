//! Infrastructure layer - geospatial drivers
//!
//! - `ShapefileDriver` (feature `shapefile`): ESRI Shapefile on disk
//! - `MemoryDriver`: in-memory datasets

pub mod memory;

#[cfg(feature = "shapefile")]
pub mod shp;

pub use memory::MemoryDriver;

#[cfg(feature = "shapefile")]
pub use shp::ShapefileDriver;

use crate::domain::GeoDriver;
use crate::Result;

/// Name reported by the shapefile driver
pub const SHAPEFILE_DRIVER: &str = "ESRI Shapefile";

/// Capability probe for the shapefile backend
///
/// # Errors
///
/// `ErrorKind::UnavailableDependency` when built without the `shapefile`
/// feature.
#[cfg(feature = "shapefile")]
pub fn default_driver() -> Result<Box<dyn GeoDriver>> {
    Ok(Box::new(ShapefileDriver::new()))
}

#[cfg(not(feature = "shapefile"))]
pub fn default_driver() -> Result<Box<dyn GeoDriver>> {
    Err(crate::ShpError::unavailable_dependency(SHAPEFILE_DRIVER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "shapefile")]
    #[test]
    fn test_default_driver_is_shapefile() {
        let driver = default_driver().unwrap();
        assert_eq!(driver.name(), SHAPEFILE_DRIVER);
        assert!(driver.probe().is_ok());
    }

    #[cfg(not(feature = "shapefile"))]
    #[test]
    fn test_default_driver_unavailable() {
        let err = default_driver().err().unwrap();
        assert_eq!(err.kind, crate::error::ErrorKind::UnavailableDependency);
    }
}
