use geo::{Coord, LineString, Point};
use log::debug;
use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{GeoMediaError, Result};
use crate::geometry::{GeoFeature, Shape};

pub const KML_NS: &str = "http://www.opengis.net/kml/2.2";

const POINT_PATH: &[&str] = &["Point"];
const LINE_STRING_PATH: &[&str] = &["LineString"];
const OUTER_RING_PATH: &[&str] = &["Polygon", "outerBoundaryIs", "LinearRing"];

/// Function to extract every placemark geometry from a KML document.
///
/// Placemarks are found at any depth. Each one yields its point first, then
/// its line strings, then its polygon outer rings, all sharing the
/// placemark's name.
pub fn extract_features(bytes: &[u8]) -> Result<Vec<GeoFeature>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| GeoMediaError::KmlParse(format!("invalid UTF-8: {}", e)))?;
    let document = Document::parse_with_options(strip_xml_declaration(text), xml_options())
        .map_err(|e| GeoMediaError::KmlParse(e.to_string()))?;

    let mut features = Vec::new();
    for placemark in document
        .descendants()
        .filter(|node| node.has_tag_name((KML_NS, "Placemark")))
    {
        let before = features.len();
        extract_placemark(placemark, &mut features)?;
        debug!(
            "Placemark {:?} yielded {} geometries",
            placemark_name(placemark),
            features.len() - before
        );
    }

    Ok(features)
}

/// Parser settings shared by the GPX and KML readers. DOCTYPE blocks are
/// accepted.
pub(crate) fn xml_options() -> ParsingOptions {
    ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    }
}

fn extract_placemark(placemark: Node, features: &mut Vec<GeoFeature>) -> Result<()> {
    let name = placemark_name(placemark);

    // Only the first point counts, altitude is dropped
    if let Some(text) = coordinate_texts(placemark, POINT_PATH).first() {
        let coord = parse_pair(text.trim())?;
        features.push(GeoFeature {
            name: name.to_string(),
            shape: Shape::Point(Point(coord)),
        });
    }

    // Every line string, skipping empty ones
    for text in coordinate_texts(placemark, LINE_STRING_PATH) {
        let coords = parse_tuples(text)?;
        if !coords.is_empty() {
            features.push(GeoFeature {
                name: name.to_string(),
                shape: Shape::LineString(LineString::new(coords)),
            });
        }
    }

    // Polygons contribute their outer ring only
    for text in coordinate_texts(placemark, OUTER_RING_PATH) {
        let coords = parse_tuples(text)?;
        if !coords.is_empty() {
            features.push(GeoFeature {
                name: name.to_string(),
                shape: Shape::Polygon { exterior: LineString::new(coords) },
            });
        }
    }

    Ok(())
}

fn placemark_name<'a>(placemark: Node<'a, '_>) -> &'a str {
    placemark
        .children()
        .find(|child| child.has_tag_name((KML_NS, "name")))
        .and_then(|child| child.text())
        .unwrap_or("")
}

/// Text of every `coordinates` element below `placemark` whose direct
/// ancestors match `parents` (outermost first).
fn coordinate_texts<'a>(placemark: Node<'a, '_>, parents: &[&str]) -> Vec<&'a str> {
    placemark
        .descendants()
        .filter(|node| node.has_tag_name((KML_NS, "coordinates")) && has_parents(*node, parents))
        .filter_map(|node| node.text())
        .collect()
}

fn has_parents(node: Node, parents: &[&str]) -> bool {
    let mut current = node;
    for name in parents.iter().rev() {
        match current.parent_element() {
            Some(parent) if parent.has_tag_name((KML_NS, *name)) => current = parent,
            _ => return false,
        }
    }
    true
}

/// Drops a leading `<?xml ... ?>` declaration, along with any byte order
/// mark or whitespace in front of it.
pub fn strip_xml_declaration(text: &str) -> &str {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    text
}

/// Parses whitespace separated `lon,lat[,alt]` tuples.
fn parse_tuples(text: &str) -> Result<Vec<Coord<f64>>> {
    text.split_whitespace().map(parse_pair).collect()
}

/// Parses the first two comma separated numbers as `lon,lat`; any altitude is ignored.
fn parse_pair(tuple: &str) -> Result<Coord<f64>> {
    let mut tokens = tuple.split(',');
    let x = parse_number(tokens.next(), tuple)?;
    let y = parse_number(tokens.next(), tuple)?;
    Ok(Coord { x, y })
}

fn parse_number(token: Option<&str>, tuple: &str) -> Result<f64> {
    token
        .and_then(|t| t.trim().parse::<f64>().ok())
        .ok_or_else(|| GeoMediaError::CoordinateFormat { text: tuple.to_string() })
}
