use crate::netex::objects::{Coordinate, JourneyPattern, LineString};
use crate::netex::NetexDatasetIndex;
use crate::objects::ShapePoint;
use log::warn;

/// Equatorial radius in meters
pub const EARTH_RADIUS: f64 = 6_378_137.;
pub const DEFAULT_SRID: u32 = 4326;

const DEFAULT_REFERENCE_SYSTEMS: &[&str] = &["WGS84", "EPSG:4326", "urn:ogc:def:crs:EPSG::4326"];

/// Polyline of a journey pattern
#[derive(Debug, Clone, PartialEq)]
pub struct GtfsShape {
    pub id: String,
    pub points: Vec<ShapePoint>,
    /// Distance traveled at each stop point of the journey pattern, in meters
    pub stop_distances: Vec<u32>,
    /// Reference system of the source geometry
    ///
    /// Coordinates are never reprojected, a shape with another srid than [DEFAULT_SRID] is
    /// written as is and reported by the converter.
    pub srid: u32,
}

/// Equirectangular approximation of the distance between two coordinates, in meters
///
/// Good enough for the short segments of a service link.
pub fn planar_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let mean_lat = ((from.latitude + to.latitude) / 2.).to_radians();
    let x = d_lon * mean_lat.cos();
    EARTH_RADIUS * (d_lat * d_lat + x * x).sqrt()
}

fn srid(srs_name: Option<&str>) -> u32 {
    match srs_name {
        None => DEFAULT_SRID,
        Some(name) if DEFAULT_REFERENCE_SYSTEMS.contains(&name) => DEFAULT_SRID,
        Some(name) => {
            warn!("geometry in the reference system {} is written as is", name);
            let digits: String = name
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit())
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            digits.parse().unwrap_or(DEFAULT_SRID)
        }
    }
}

/// Builds shapes from the service links of the journey patterns
pub struct ShapeBuilder<'a> {
    index: &'a NetexDatasetIndex<'a>,
}

impl<'a> ShapeBuilder<'a> {
    pub fn new(index: &'a NetexDatasetIndex<'a>) -> Self {
        ShapeBuilder { index }
    }

    /// Shape of a journey pattern, `None` if its links do not describe the whole pattern
    pub fn build(&self, journey_pattern: &JourneyPattern) -> Option<GtfsShape> {
        let links = &journey_pattern.links_in_sequence;
        if links.is_empty() {
            return None;
        }
        if links.len() + 1 != journey_pattern.points_in_sequence.len() {
            warn!(
                "journey pattern {}: {} service links for {} stop points, no shape",
                journey_pattern.id,
                links.len(),
                journey_pattern.points_in_sequence.len()
            );
            return None;
        }
        let mut line_strings = Vec::with_capacity(links.len());
        for link_id in links {
            match self
                .index
                .service_link(link_id)
                .and_then(|l| l.line_string.as_ref())
            {
                Some(line_string) if !line_string.coordinates.is_empty() => {
                    line_strings.push(line_string)
                }
                _ => {
                    warn!(
                        "journey pattern {}: service link {} has no geometry, no shape",
                        journey_pattern.id, link_id
                    );
                    return None;
                }
            }
        }
        Some(build_shape(&journey_pattern.id, &line_strings))
    }
}

/// First non default reference system of the curves, every one of them being checked
fn shape_srid(line_strings: &[&LineString]) -> u32 {
    line_strings
        .iter()
        .map(|l| srid(l.srs_name.as_deref()))
        .fold(DEFAULT_SRID, |found, srid| {
            if found == DEFAULT_SRID {
                srid
            } else {
                found
            }
        })
}

fn build_shape(id: &str, line_strings: &[&LineString]) -> GtfsShape {
    let mut points: Vec<ShapePoint> = Vec::new();
    let mut stop_distances = vec![0];
    let mut previous: Option<Coordinate> = None;
    let mut total: f64 = 0.;

    for line_string in line_strings {
        for coordinate in &line_string.coordinates {
            if let Some(previous) = previous {
                if previous == *coordinate {
                    continue;
                }
                total += planar_distance(&previous, coordinate);
            }
            points.push(ShapePoint {
                id: id.to_owned(),
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
                sequence: points.len(),
                dist_traveled: total.round() as u32,
            });
            previous = Some(*coordinate);
        }
        stop_distances.push(total.round() as u32);
    }

    GtfsShape {
        id: id.to_owned(),
        points,
        stop_distances,
        srid: shape_srid(line_strings),
    }
}
