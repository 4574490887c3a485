//! shpgraph - directed graphs from/to ESRI Shapefiles
//!
//! Point features become nodes keyed by their `(x, y)` coordinate, line
//! features become a single directed edge from the first vertex to the last.
//! The full line geometry is kept on the edge as `Wkb`, `Wkt` and `Json`
//! attributes, so intermediate vertices survive a read/write round trip.
//! Every feature also gets a `ShpName` attribute naming its source layer.
//!
//! ## Core Rules
//!
//! 1. **Points -> nodes**: duplicate coordinates, last write wins
//! 2. **Lines -> edges**: one edge per line, first vertex -> last vertex
//! 3. **Everything else is skipped**: polygons, multi-part lines, null shapes
//! 4. **Stored geometry wins on write**: `Wkb`, then `Wkt`, then the key itself
//!
//! ## Usage
//!
//! ```rust,no_run
//! use shpgraph::{read_shp, write_shp};
//!
//! # fn main() -> shpgraph::Result<()> {
//! // A single file or a directory of shapefiles
//! let graph = read_shp("data/roads.shp")?;
//! println!("{} nodes, {} edges", graph.node_count(), graph.edge_count());
//!
//! // Writes out/nodes.shp and out/edges.shp; `out` must not exist yet
//! write_shp(&graph, "out")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Drivers
//!
//! The `_with` variants take any [`GeoDriver`], e.g. the in-memory
//! [`MemoryDriver`]. Without the `shapefile` feature, [`read_shp`] and
//! [`write_shp`] fail with `ErrorKind::UnavailableDependency` before touching
//! the filesystem.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod reader;
pub mod writer;

use std::path::Path;

pub use config::ShpConfig;
pub use error::{ErrorKind, Result, ShpError};
pub use infrastructure::{default_driver, MemoryDriver};

#[cfg(feature = "shapefile")]
pub use infrastructure::ShapefileDriver;

// Domain re-exports
pub use domain::{AttrValue, Attributes, Coord, GeoDriver, GraphKey, ShpGraph};

/// Build a directed graph from a shapefile or a directory of shapefiles
pub fn read_shp(path: impl AsRef<Path>) -> Result<ShpGraph> {
    let driver = default_driver()?;
    read_shp_with(driver.as_ref(), path)
}

/// Write `graph` as `nodes` and `edges` shapefiles into the new directory `outdir`
pub fn write_shp(graph: &ShpGraph, outdir: impl AsRef<Path>) -> Result<()> {
    let driver = default_driver()?;
    write_shp_with(driver.as_ref(), graph, outdir, &ShpConfig::default())
}

/// [`read_shp`] through an explicit driver
pub fn read_shp_with(driver: &dyn GeoDriver, path: impl AsRef<Path>) -> Result<ShpGraph> {
    reader::read_graph(driver, path.as_ref())
}

/// [`write_shp`] through an explicit driver and config
pub fn write_shp_with(
    driver: &dyn GeoDriver,
    graph: &ShpGraph,
    outdir: impl AsRef<Path>,
    config: &ShpConfig,
) -> Result<()> {
    writer::write_graph(driver, graph, outdir.as_ref(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SHP_NAME, WKB};
    use pretty_assertions::assert_eq;

    fn sample_graph() -> ShpGraph {
        let mut graph = ShpGraph::new();
        let mut depot = Attributes::new();
        depot.insert("name".to_string(), AttrValue::from("depot"));
        depot.insert("cap".to_string(), AttrValue::Number(12.0));
        graph.add_node(Coord::new(0.0, 0.0), depot);

        let mut road = Attributes::new();
        road.insert("lanes".to_string(), AttrValue::Number(2.0));
        graph.add_edge(Coord::new(0.0, 0.0), Coord::new(5.0, 5.0), road);
        graph
    }

    #[test]
    fn test_memory_round_trip() {
        let driver = MemoryDriver::new();
        let graph = sample_graph();

        write_shp_with(&driver, &graph, "/net", &ShpConfig::default()).unwrap();

        // each layer is re-read as its own data source
        let layers = driver.dataset(Path::new("/net")).unwrap();
        let mut back = ShpGraph::new();
        for layer in &layers {
            reader::add_layer(&mut back, layer).unwrap();
        }

        assert_eq!(back.node_count(), graph.node_count());
        assert_eq!(back.edge_count(), graph.edge_count());

        let depot = back.node_attributes(Coord::new(0.0, 0.0)).unwrap();
        assert_eq!(depot.get("name"), Some(&AttrValue::from("depot")));
        assert_eq!(depot.get("cap"), Some(&AttrValue::Number(12.0)));
        assert_eq!(depot.get(SHP_NAME), Some(&AttrValue::from("nodes")));

        let road = back
            .edge_attributes(Coord::new(0.0, 0.0), Coord::new(5.0, 5.0))
            .unwrap();
        assert_eq!(road.get("lanes"), Some(&AttrValue::Number(2.0)));
        assert!(road.contains_key(WKB));
    }

    #[test]
    fn test_invalid_config_rejected_before_driver() {
        let driver = MemoryDriver::new();
        let config = ShpConfig::default().edge_layer("nodes");

        let err = write_shp_with(&driver, &sample_graph(), "/net", &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
        assert!(driver.is_empty());
    }

    #[test]
    fn test_read_through_memory_driver() {
        let driver = MemoryDriver::new();
        write_shp_with(&driver, &sample_graph(), "/net", &ShpConfig::default()).unwrap();
        let layers = driver.dataset(Path::new("/net")).unwrap();
        driver.insert("/edges", layers.into_iter().filter(|l| l.name == "edges").collect());

        let graph = read_shp_with(&driver, "/edges").unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_edge(Coord::new(0.0, 0.0), Coord::new(5.0, 5.0)));
    }

    #[cfg(not(feature = "shapefile"))]
    #[test]
    fn test_unavailable_without_backend() {
        let dir = std::env::temp_dir().join("shpgraph-never-created");

        let err = write_shp(&ShpGraph::new(), &dir).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnavailableDependency);
        assert!(!dir.exists());

        let err = read_shp(&dir).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnavailableDependency);
    }
}
