//! Well-known geometry encodings (WKB, WKT, GeoJSON)
//!
//! Edges keep their full line geometry in three redundant attributes so that
//! vertices between the endpoints survive a read/write round trip.

use geo_types::Geometry;
use wkt::{ToWkt, TryFromWkt};

use super::{AttrValue, Attributes, JSON, WKB, WKT};
use crate::{Result, ShpError};

pub fn to_wkb(geometry: &Geometry<f64>) -> Result<Vec<u8>> {
    wkb::geom_to_wkb(geometry)
        .map_err(|e| ShpError::encoding(format!("WKB encode failed: {:?}", e)))
}

pub fn from_wkb(bytes: &[u8]) -> Result<Geometry<f64>> {
    let mut cursor = bytes;
    wkb::wkb_to_geom(&mut cursor)
        .map_err(|e| ShpError::encoding(format!("WKB decode failed: {:?}", e)))
}

pub fn to_wkt(geometry: &Geometry<f64>) -> String {
    geometry.wkt_string()
}

pub fn from_wkt(text: &str) -> Result<Geometry<f64>> {
    Geometry::<f64>::try_from_wkt_str(text)
        .map_err(|e| ShpError::encoding(format!("WKT decode failed: {}", e)))
}

/// GeoJSON geometry object (not a Feature)
pub fn to_geojson(geometry: &Geometry<f64>) -> Result<String> {
    let geojson = geojson::Geometry::new(geojson::Value::from(geometry));
    Ok(serde_json::to_string(&geojson)?)
}

/// Add `Wkb`, `Wkt` and `Json` encodings of `geometry` to `attributes`
pub fn attach_encodings(attributes: &mut Attributes, geometry: &Geometry<f64>) -> Result<()> {
    attributes.insert(WKB.to_string(), AttrValue::Binary(to_wkb(geometry)?));
    attributes.insert(WKT.to_string(), AttrValue::Text(to_wkt(geometry)));
    attributes.insert(JSON.to_string(), AttrValue::Text(to_geojson(geometry)?));
    Ok(())
}

/// Geometry stored in `attributes`, if any
///
/// `Wkb` (binary) wins over `Wkt` (text). `Json` is informational only.
pub fn stored_geometry(attributes: &Attributes) -> Result<Option<Geometry<f64>>> {
    if let Some(bytes) = attributes.get(WKB).and_then(AttrValue::as_binary) {
        return from_wkb(bytes).map(Some);
    }
    if let Some(text) = attributes.get(WKT).and_then(AttrValue::as_text) {
        return from_wkt(text).map(Some);
    }
    Ok(None)
}
