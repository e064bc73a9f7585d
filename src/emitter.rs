use geo::LineString;
use geojson::{Feature, FeatureCollection, Geometry as GeoJsonGeometry, JsonObject, Value as GeoJsonValue};
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::geometry::{GeoPoint, GeoRecord, Shape};
use crate::media::MediaType;

/// Wraps one matched record into a collection holding exactly that feature,
/// tagged with the media file it was matched to.
pub fn single_feature(record: &GeoRecord, filename: &str, filetype: &str) -> FeatureCollection {
    let (geometry, mut properties) = match record {
        GeoRecord::Point(point) => (point_geometry(point), JsonObject::new()),
        GeoRecord::Feature(feature) => (shape_geometry(&feature.shape), name_properties(&feature.name)),
    };
    properties.insert("filename".to_string(), JsonValue::from(filename));
    properties.insert("filetype".to_string(), JsonValue::from(filetype));

    collection(vec![feature(geometry, properties)])
}

/// Same as [`single_feature`], with the MIME type taken from the media type.
pub fn media_feature(record: &GeoRecord, filename: &str, media_type: MediaType) -> FeatureCollection {
    single_feature(record, filename, media_type.mime_type())
}

/// Wraps every extracted record, in extraction order.
pub fn bulk(records: &[GeoRecord]) -> FeatureCollection {
    let features = records
        .iter()
        .map(|record| match record {
            GeoRecord::Point(point) => feature(point_geometry(point), name_properties(&point.name)),
            GeoRecord::Feature(f) => feature(shape_geometry(&f.shape), name_properties(&f.name)),
        })
        .collect();
    collection(features)
}

/// Serializes with two-space indentation.
pub fn to_pretty_json(collection: &FeatureCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(collection)?)
}

fn point_geometry(point: &GeoPoint) -> GeoJsonGeometry {
    GeoJsonGeometry::new(GeoJsonValue::Point(vec![point.lon, point.lat]))
}

fn shape_geometry(shape: &Shape) -> GeoJsonGeometry {
    let value = match shape {
        Shape::Point(point) => GeoJsonValue::Point(vec![point.x(), point.y()]),
        Shape::LineString(line) => GeoJsonValue::LineString(positions(line)),
        // Holes are never populated
        Shape::Polygon { exterior } => GeoJsonValue::Polygon(vec![positions(exterior)]),
    };
    GeoJsonGeometry::new(value)
}

fn positions(line: &LineString<f64>) -> Vec<Vec<f64>> {
    line.coords().map(|c| vec![c.x, c.y]).collect()
}

fn name_properties(name: &str) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(name));
    properties
}

fn feature(geometry: GeoJsonGeometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
