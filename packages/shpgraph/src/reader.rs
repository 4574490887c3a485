//! Shapefile -> graph
//!
//! Point features become nodes keyed by their (x, y); single-part line
//! features become one edge from the first to the last vertex, carrying the
//! full line as `Wkb`/`Wkt`/`Json`. Every other geometry is skipped.

use std::path::Path;

use geo_types::Geometry;
use tracing::{debug, info};

use crate::domain::encoding::attach_encodings;
use crate::domain::{geometry_name, AttrValue, Attributes, Coord, GeoDriver, Layer, ShpGraph, SHP_NAME};
use crate::Result;

/// Read every layer at `path` through `driver` into a new graph
pub fn read_graph(driver: &dyn GeoDriver, path: &Path) -> Result<ShpGraph> {
    driver.probe()?;

    let layers = driver.read_layers(path)?;
    let mut graph = ShpGraph::new();
    for layer in &layers {
        add_layer(&mut graph, layer)?;
    }

    info!(
        "Read {} layer(s) from {}: {} nodes, {} edges",
        layers.len(),
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Add one layer's features to `graph`
pub fn add_layer(graph: &mut ShpGraph, layer: &Layer) -> Result<()> {
    let mut skipped = 0usize;

    for feature in &layer.features {
        let mut attributes: Attributes = layer
            .field_names()
            .map(|name| (name.to_string(), feature.field(name)))
            .collect();
        attributes.insert(SHP_NAME.to_string(), AttrValue::Text(layer.name.clone()));

        match &feature.geometry {
            Some(Geometry::Point(point)) => {
                graph.add_node(Coord::from(*point), attributes);
            }
            Some(geometry @ Geometry::LineString(line)) if line.0.len() >= 2 => {
                let first = Coord::from(line.0[0]);
                let last = Coord::from(line.0[line.0.len() - 1]);
                attach_encodings(&mut attributes, geometry)?;
                graph.add_edge(first, last, attributes);
            }
            Some(other) => {
                debug!("Layer '{}': skipping {} feature", layer.name, geometry_name(other));
                skipped += 1;
            }
            None => {
                debug!("Layer '{}': skipping null geometry", layer.name);
                skipped += 1;
            }
        }
    }

    debug!(
        "Layer '{}': {} features, {} skipped",
        layer.name,
        layer.features.len(),
        skipped
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Feature, Field, GeometryKind, JSON, WKB, WKT};
    use crate::error::ErrorKind;
    use crate::infrastructure::MemoryDriver;
    use crate::ShpError;
    use geo_types::{line_string, point, polygon};
    use pretty_assertions::assert_eq;

    fn feature(geometry: Geometry<f64>, pairs: &[(&str, AttrValue)]) -> Feature {
        Feature::new(
            Some(geometry),
            pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        )
    }

    fn layer(name: &str, fields: &[&str], features: Vec<Feature>) -> Layer {
        let mut layer = Layer::new(name, None);
        layer.fields = fields.iter().map(|f| Field::named(*f)).collect();
        layer.features = features;
        layer
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Point Features
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_point_becomes_node_with_layer_name() {
        let mut graph = ShpGraph::new();
        let cities = layer(
            "cities",
            &["name"],
            vec![feature(Geometry::Point(point!(x: 1.0, y: 2.0)), &[("name", "a".into())])],
        );

        add_layer(&mut graph, &cities).unwrap();

        let attrs = graph.node_attributes(Coord::new(1.0, 2.0)).unwrap();
        assert_eq!(attrs.get("name"), Some(&AttrValue::from("a")));
        assert_eq!(attrs.get(SHP_NAME), Some(&AttrValue::from("cities")));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_duplicate_point_last_write_wins() {
        let mut graph = ShpGraph::new();
        let p = Geometry::Point(point!(x: 5.0, y: 5.0));
        let cities = layer(
            "cities",
            &["name"],
            vec![
                feature(p.clone(), &[("name", "first".into())]),
                feature(p, &[("name", "last".into())]),
            ],
        );

        add_layer(&mut graph, &cities).unwrap();

        assert_eq!(graph.node_count(), 1);
        let attrs = graph.node_attributes(Coord::new(5.0, 5.0)).unwrap();
        assert_eq!(attrs.get("name"), Some(&AttrValue::from("last")));
    }

    #[test]
    fn test_missing_field_reads_as_null() {
        let mut graph = ShpGraph::new();
        let cities = layer(
            "cities",
            &["name", "pop"],
            vec![feature(Geometry::Point(point!(x: 0.0, y: 0.0)), &[("name", "a".into())])],
        );

        add_layer(&mut graph, &cities).unwrap();

        let attrs = graph.node_attributes(Coord::new(0.0, 0.0)).unwrap();
        assert_eq!(attrs.get("pop"), Some(&AttrValue::Null));
    }

    #[test]
    fn test_attributes_outside_schema_ignored() {
        let mut graph = ShpGraph::new();
        let cities = layer(
            "cities",
            &["name"],
            vec![feature(
                Geometry::Point(point!(x: 0.0, y: 0.0)),
                &[("name", "a".into()), ("stray", 1.0.into())],
            )],
        );

        add_layer(&mut graph, &cities).unwrap();

        let attrs = graph.node_attributes(Coord::new(0.0, 0.0)).unwrap();
        assert!(!attrs.contains_key("stray"));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Line Features
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_line_becomes_single_edge_first_to_last() {
        let mut graph = ShpGraph::new();
        let roads = layer(
            "roads",
            &[],
            vec![feature(
                Geometry::LineString(line_string![
                    (x: 0.0, y: 0.0),
                    (x: 1.0, y: 1.0),
                    (x: 2.0, y: 2.0),
                ]),
                &[],
            )],
        );

        add_layer(&mut graph, &roads).unwrap();

        let (a, mid, c) = (Coord::new(0.0, 0.0), Coord::new(1.0, 1.0), Coord::new(2.0, 2.0));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_edge(a, c));
        assert!(!graph.contains_edge(a, mid));
        assert!(!graph.contains_node(mid));
    }

    #[test]
    fn test_line_edge_carries_encodings() {
        let mut graph = ShpGraph::new();
        let roads = layer(
            "roads",
            &["speed"],
            vec![feature(
                Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 0.0)]),
                &[("speed", 50.0.into())],
            )],
        );

        add_layer(&mut graph, &roads).unwrap();

        let attrs = graph
            .edge_attributes(Coord::new(0.0, 0.0), Coord::new(3.0, 0.0))
            .unwrap();
        assert_eq!(attrs.get("speed"), Some(&AttrValue::Number(50.0)));
        assert_eq!(attrs.get(SHP_NAME), Some(&AttrValue::from("roads")));
        assert!(matches!(attrs.get(WKB), Some(AttrValue::Binary(_))));
        assert!(attrs
            .get(WKT)
            .and_then(AttrValue::as_text)
            .is_some_and(|wkt| wkt.starts_with("LINESTRING")));
        assert!(attrs.get(JSON).and_then(AttrValue::as_text).is_some());
    }

    #[test]
    fn test_duplicate_line_last_write_wins() {
        let mut graph = ShpGraph::new();
        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
        let roads = layer(
            "roads",
            &["name"],
            vec![
                feature(line.clone(), &[("name", "old".into())]),
                feature(line, &[("name", "new".into())]),
            ],
        );

        add_layer(&mut graph, &roads).unwrap();

        let attrs = graph
            .edge_attributes(Coord::new(0.0, 0.0), Coord::new(1.0, 0.0))
            .unwrap();
        assert_eq!(attrs.get("name"), Some(&AttrValue::from("new")));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Skipped Geometry
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_polygon_and_null_are_skipped() {
        let mut graph = ShpGraph::new();
        let parcels = layer(
            "parcels",
            &[],
            vec![
                feature(
                    Geometry::Polygon(polygon![
                        (x: 0.0, y: 0.0),
                        (x: 1.0, y: 0.0),
                        (x: 1.0, y: 1.0),
                    ]),
                    &[],
                ),
                Feature::new(None, Attributes::new()),
                feature(Geometry::LineString(line_string![(x: 0.0, y: 0.0)]), &[]),
            ],
        );

        add_layer(&mut graph, &parcels).unwrap();

        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Driver Interaction
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_read_graph_merges_layers() {
        let driver = MemoryDriver::new();
        let mut cities = layer(
            "cities",
            &[],
            vec![feature(Geometry::Point(point!(x: 0.0, y: 0.0)), &[])],
        );
        cities.kind = Some(GeometryKind::Point);
        let roads = layer(
            "roads",
            &[],
            vec![feature(
                Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]),
                &[],
            )],
        );
        driver.insert("/data/net", vec![cities, roads]);

        let graph = read_graph(&driver, Path::new("/data/net")).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let origin = graph.node_attributes(Coord::new(0.0, 0.0)).unwrap();
        assert_eq!(origin.get(SHP_NAME), Some(&AttrValue::from("cities")));
    }

    struct Unavailable;

    impl GeoDriver for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn probe(&self) -> Result<()> {
            Err(ShpError::unavailable_dependency(self.name()))
        }

        fn read_layers(&self, _path: &Path) -> Result<Vec<Layer>> {
            panic!("read_layers called after failed probe");
        }

        fn create_dataset(&self, _outdir: &Path, _layers: &[Layer]) -> Result<()> {
            panic!("create_dataset called after failed probe");
        }
    }

    #[test]
    fn test_unavailable_driver_fails_before_reading() {
        let err = read_graph(&Unavailable, Path::new("/does/not/matter")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnavailableDependency);
    }

    #[test]
    fn test_missing_path_surfaces_driver_error() {
        let driver = MemoryDriver::new();
        let err = read_graph(&driver, Path::new("/nowhere")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IO);
    }
}
