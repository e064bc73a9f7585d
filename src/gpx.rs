use log::debug;
use roxmltree::{Document, Node};

use crate::error::{GeoMediaError, Result};
use crate::geometry::GeoPoint;
use crate::kml::{strip_xml_declaration, xml_options};

/// Function to flatten a GPX document into located points.
///
/// Track points come first, in track -> segment -> point order, followed by
/// the standalone waypoints in document order. Missing names become `""`.
/// Elements are matched by local name whatever the GPX namespace, and
/// coordinates are taken as written, without range checks.
pub fn extract_points(bytes: &[u8]) -> Result<Vec<GeoPoint>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| GeoMediaError::GpxParse(format!("invalid UTF-8: {}", e)))?;
    let document = Document::parse_with_options(strip_xml_declaration(text), xml_options())
        .map_err(|e| GeoMediaError::GpxParse(e.to_string()))?;

    let root = document.root_element();
    if root.tag_name().name() != "gpx" {
        return Err(GeoMediaError::GpxParse(format!(
            "root element is `{}`, expected `gpx`",
            root.tag_name().name()
        )));
    }

    let mut points = Vec::new();

    // Tracks -> segments -> points
    for track in children(root, "trk") {
        for segment in children(track, "trkseg") {
            for point in children(segment, "trkpt") {
                points.push(to_geo_point(point)?);
            }
        }
    }
    let track_points = points.len();

    // Then the standalone waypoints
    for waypoint in children(root, "wpt") {
        points.push(to_geo_point(waypoint)?);
    }

    debug!(
        "Extracted {} track points and {} waypoints",
        track_points,
        points.len() - track_points
    );
    Ok(points)
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

fn to_geo_point(node: Node) -> Result<GeoPoint> {
    let name = node
        .children()
        .find(|child| child.is_element() && child.tag_name().name() == "name")
        .and_then(|child| child.text())
        .unwrap_or("");

    Ok(GeoPoint {
        name: name.to_string(),
        lat: coordinate(node, "lat")?,
        lon: coordinate(node, "lon")?,
    })
}

fn coordinate(node: Node, attribute: &str) -> Result<f64> {
    let value = node.attribute(attribute).ok_or_else(|| {
        GeoMediaError::GpxParse(format!("`{}` lacks a `{}` attribute", node.tag_name().name(), attribute))
    })?;
    value.trim().parse::<f64>().map_err(|_| {
        GeoMediaError::GpxParse(format!("invalid `{}` value {:?}", attribute, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TRACK_AND_WAYPOINTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="TestApp">
  <wpt lat="10.0" lon="20.0">
    <name>first_wpt.jpg</name>
  </wpt>
  <trk>
    <name>Morning Walk</name>
    <trkseg>
      <trkpt lat="1.0" lon="2.0"><name>a.jpg</name></trkpt>
      <trkpt lat="1.5" lon="2.5"></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="3.0" lon="4.0"><name>photos/b.jpg</name></trkpt>
    </trkseg>
  </trk>
  <wpt lat="11.0" lon="21.0">
    <name>second_wpt.mp4</name>
  </wpt>
</gpx>"#;

    #[test]
    fn track_points_precede_waypoints() {
        let points = extract_points(TRACK_AND_WAYPOINTS.as_bytes()).unwrap();

        let names: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["a.jpg", "", "photos/b.jpg", "first_wpt.jpg", "second_wpt.mp4"]
        );
    }

    #[test]
    fn coordinates_pass_through_unchanged() {
        let points = extract_points(TRACK_AND_WAYPOINTS.as_bytes()).unwrap();

        assert_eq!(points[0], GeoPoint::new("a.jpg", 1.0, 2.0));
        assert_eq!(points[1], GeoPoint::new("", 1.5, 2.5));
        assert_eq!(points[4], GeoPoint::new("second_wpt.mp4", 11.0, 21.0));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(3, 0)]
    #[case(0, 2)]
    #[case(4, 3)]
    fn returns_every_track_point_and_waypoint(#[case] track_points: usize, #[case] waypoints: usize) {
        let mut body = String::from("<trk><trkseg>");
        for i in 0..track_points {
            body.push_str(&format!(r#"<trkpt lat="{}.0" lon="0.0"></trkpt>"#, i));
        }
        body.push_str("</trkseg></trk>");
        for i in 0..waypoints {
            body.push_str(&format!(r#"<wpt lat="0.0" lon="{}.0"></wpt>"#, i));
        }
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><gpx version="1.1" creator="TestApp">{}</gpx>"#,
            body
        );

        let points = extract_points(document.as_bytes()).unwrap();

        assert_eq!(points.len(), track_points + waypoints);
        for (i, point) in points.iter().take(track_points).enumerate() {
            assert_eq!(point.lat, i as f64);
        }
        for (i, point) in points.iter().skip(track_points).enumerate() {
            assert_eq!(point.lon, i as f64);
        }
    }

    #[rstest]
    #[case(r#"<wpt lat="95.0" lon="200.0"></wpt>"#, 95.0, 200.0)]
    #[case(r#"<wpt lat="-91.5" lon="-180.5"></wpt>"#, -91.5, -180.5)]
    #[case(r#"<wpt lat="0.0" lon="180.0"></wpt>"#, 0.0, 180.0)]
    #[case(r#"<wpt lat="1.0" lon="2.0"><foo>bar</foo><name>x.jpg</name></wpt>"#, 1.0, 2.0)]
    #[case(r#"<trk><extensions/><trkseg><trkpt lat="1.0" lon="2.0"><speed>3</speed></trkpt></trkseg></trk>"#, 1.0, 2.0)]
    fn unusual_points_pass_through(#[case] body: &str, #[case] lat: f64, #[case] lon: f64) {
        let document = format!(r#"<gpx version="1.1" creator="TestApp">{}</gpx>"#, body);

        let points = extract_points(document.as_bytes()).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!((points[0].lat, points[0].lon), (lat, lon));
    }

    #[test]
    fn missing_version_attribute_is_accepted() {
        let document = r#"<gpx creator="x"><wpt lat="1.0" lon="2.0"><name>a.jpg</name></wpt></gpx>"#;

        let points = extract_points(document.as_bytes()).unwrap();

        assert_eq!(points, vec![GeoPoint::new("a.jpg", 1.0, 2.0)]);
    }

    #[test]
    fn namespaced_documents_are_read() {
        let document = r#"<?xml version="1.0"?>
<!DOCTYPE gpx>
<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1" creator="TestApp">
  <wpt lat="1.0" lon="2.0"><name>a.jpg</name></wpt>
</gpx>"#;

        let points = extract_points(document.as_bytes()).unwrap();

        assert_eq!(points, vec![GeoPoint::new("a.jpg", 1.0, 2.0)]);
    }

    #[rstest]
    #[case("")]
    #[case(r#"<gpx version="1.1" creator="TestApp"><trk><trkseg>"#)]
    #[case(r#"<kml><wpt lat="1.0" lon="2.0"/></kml>"#)]
    #[case(r#"<gpx><wpt lat="north" lon="2.0"/></gpx>"#)]
    #[case(r#"<gpx><wpt lon="2.0"/></gpx>"#)]
    #[case(r#"<gpx><trk><trkseg><trkpt lat="1.0"/></trkseg></trk></gpx>"#)]
    fn malformed_documents_fail(#[case] document: &str) {
        let result = extract_points(document.as_bytes());
        assert!(matches!(result, Err(GeoMediaError::GpxParse(_))));
    }
}
