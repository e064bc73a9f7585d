use geo::{Coord, LineString, Point};

/// A located point read from a GPX track or waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        GeoPoint { name: name.into(), lat, lon }
    }
}

/// Geometry extracted from a KML placemark. Coordinates hold `x = lon, y = lat`.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Point<f64>),
    LineString(LineString<f64>),
    /// Outer boundary only, stored exactly as parsed (no ring closing).
    Polygon { exterior: LineString<f64> },
}

impl Shape {
    /// First coordinate of the geometry, if any.
    pub fn first_coord(&self) -> Option<Coord<f64>> {
        match self {
            Shape::Point(point) => Some(point.0),
            Shape::LineString(line) => line.0.first().copied(),
            Shape::Polygon { exterior } => exterior.0.first().copied(),
        }
    }
}

/// A named geometry; several may share the name of one placemark.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub name: String,
    pub shape: Shape,
}

/// Anything a geo file parser can yield.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoRecord {
    Point(GeoPoint),
    Feature(GeoFeature),
}

impl GeoRecord {
    pub fn name(&self) -> &str {
        match self {
            GeoRecord::Point(point) => &point.name,
            GeoRecord::Feature(feature) => &feature.name,
        }
    }

    /// Location as `(lat, lon)`, taken from the first coordinate.
    pub fn location(&self) -> Option<(f64, f64)> {
        match self {
            GeoRecord::Point(point) => Some((point.lat, point.lon)),
            GeoRecord::Feature(feature) => feature.shape.first_coord().map(|c| (c.y, c.x)),
        }
    }
}

impl From<GeoPoint> for GeoRecord {
    fn from(point: GeoPoint) -> Self {
        GeoRecord::Point(point)
    }
}

impl From<GeoFeature> for GeoRecord {
    fn from(feature: GeoFeature) -> Self {
        GeoRecord::Feature(feature)
    }
}
