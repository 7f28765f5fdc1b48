use super::trip::destination_display_text;
use crate::netex::objects::{StopPointInJourneyPattern, TimetabledPassingTime};
use crate::netex::NetexDatasetIndex;
use crate::objects::{PickupDropOffType, StopTime};
use crate::shape::GtfsShape;
use crate::{Error, Result};
use log::{debug, warn};

const SECONDS_PER_DAY: u32 = 86_400;

fn with_offset(time: Option<u32>, day_offset: u32) -> Option<u32> {
    time.map(|t| t + day_offset * SECONDS_PER_DAY)
}

fn pickup_drop_off(stop_point: &StopPointInJourneyPattern) -> (PickupDropOffType, PickupDropOffType) {
    let default = if stop_point.request_stop {
        PickupDropOffType::CoordinateWithDriver
    } else {
        PickupDropOffType::Regular
    };
    let pickup = if stop_point.for_boarding {
        default
    } else {
        PickupDropOffType::NotAvailable
    };
    let drop_off = if stop_point.for_alighting {
        default
    } else {
        PickupDropOffType::NotAvailable
    };
    (pickup, drop_off)
}

/// Produces the stop times of one trip
///
/// The stop head sign is carried from stop to stop: a stop point with a destination display
/// changes it, the following stops keep it. A new producer is needed for each trip.
pub struct StopTimeProducer<'a> {
    index: &'a NetexDatasetIndex<'a>,
    trip_id: &'a str,
    shape: Option<&'a GtfsShape>,
    current_head_sign: Option<String>,
}

impl<'a> StopTimeProducer<'a> {
    pub fn new(
        index: &'a NetexDatasetIndex<'a>,
        trip_id: &'a str,
        shape: Option<&'a GtfsShape>,
    ) -> Self {
        StopTimeProducer {
            index,
            trip_id,
            shape,
            current_head_sign: None,
        }
    }

    /// Stop time of a passing time, `None` at flexible stops
    ///
    /// Fails when the stop point or the quay it is assigned to cannot be found.
    pub fn produce(&mut self, passing_time: &TimetabledPassingTime) -> Result<Option<StopTime>> {
        let (journey_pattern, stop_point) = self
            .index
            .stop_point_in_journey_pattern(&passing_time.stop_point_in_journey_pattern_ref)
            .ok_or_else(|| {
                Error::ReferenceError(passing_time.stop_point_in_journey_pattern_ref.clone())
            })?;
        let scheduled_stop_point = stop_point.scheduled_stop_point_ref.as_str();
        if self.index.is_flexible_stop_point(scheduled_stop_point) {
            debug!(
                "trip {}: flexible stop point {} skipped",
                self.trip_id, scheduled_stop_point
            );
            return Ok(None);
        }
        let quay_id = self
            .index
            .quay_id_for_scheduled_stop_point(scheduled_stop_point)
            .ok_or_else(|| Error::ReferenceError(scheduled_stop_point.to_owned()))?;

        // a display without front text keeps the current sign
        if let Some(text) = stop_point
            .destination_display_ref
            .as_deref()
            .and_then(|display| destination_display_text(self.index, display))
        {
            self.current_head_sign = Some(text);
        }

        let arrival = with_offset(passing_time.arrival_time, passing_time.arrival_day_offset);
        let departure = with_offset(passing_time.departure_time, passing_time.departure_day_offset);
        let (arrival_time, departure_time) = match (arrival, departure) {
            (Some(a), Some(d)) => (a, d),
            (Some(a), None) => (a, a),
            (None, Some(d)) => (d, d),
            (None, None) => {
                warn!(
                    "trip {}: no time at stop point {}, skipped",
                    self.trip_id, stop_point.id
                );
                return Ok(None);
            }
        };

        let shape_dist_traveled = self.shape.and_then(|shape| {
            journey_pattern
                .points_in_sequence
                .iter()
                .position(|p| p.id == stop_point.id)
                .and_then(|position| shape.stop_distances.get(position))
                .copied()
        });
        let (pickup_type, drop_off_type) = pickup_drop_off(stop_point);

        Ok(Some(StopTime {
            trip_id: self.trip_id.to_owned(),
            arrival_time,
            departure_time,
            stop_id: quay_id.to_owned(),
            stop_sequence: stop_point.order,
            stop_headsign: self.current_head_sign.clone(),
            pickup_type,
            drop_off_type,
            shape_dist_traveled,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netex::objects::*;
    use crate::netex::NetexData;

    fn data() -> NetexData {
        let mut data = NetexData::default();
        for (id, text) in &[("DD:A", "A"), ("DD:B", "B")] {
            data.destination_displays
                .insert(DestinationDisplay {
                    id: id.to_string(),
                    front_text: Some(text.to_string()),
                    via_refs: vec![],
                })
                .unwrap();
        }
        let displays = [Some("DD:A"), None, None, Some("DD:B"), None];
        let points = (1..=5)
            .map(|i| StopPointInJourneyPattern {
                id: format!("JP:1:{}", i),
                order: i,
                scheduled_stop_point_ref: format!("SSP:{}", i),
                destination_display_ref: displays[i as usize - 1].map(|d| d.to_owned()),
                for_boarding: i != 4,
                for_alighting: i != 1,
                request_stop: i == 2,
            })
            .collect();
        data.journey_patterns
            .insert(JourneyPattern {
                id: "JP:1".to_owned(),
                route_ref: "R:1".to_owned(),
                points_in_sequence: points,
                ..Default::default()
            })
            .unwrap();
        for i in 1..=4 {
            data.passenger_stop_assignments
                .insert(PassengerStopAssignment {
                    id: format!("PSA:{}", i),
                    scheduled_stop_point_ref: format!("SSP:{}", i),
                    quay_ref: format!("Q:{}", i),
                })
                .unwrap();
        }
        data.flexible_stop_assignments
            .insert(FlexibleStopAssignment {
                id: "FSA:5".to_owned(),
                scheduled_stop_point_ref: "SSP:5".to_owned(),
                flexible_stop_place_ref: "FSP:1".to_owned(),
            })
            .unwrap();
        data
    }

    fn passing_time(i: u32, departure: Option<u32>) -> TimetabledPassingTime {
        TimetabledPassingTime {
            stop_point_in_journey_pattern_ref: format!("JP:1:{}", i),
            arrival_time: None,
            arrival_day_offset: 0,
            departure_time: departure,
            departure_day_offset: 0,
        }
    }

    #[test]
    fn head_signs_are_carried_forward() {
        let data = data();
        let index = NetexDatasetIndex::new(&data);
        let mut producer = StopTimeProducer::new(&index, "SJ:1", None);
        let head_signs: Vec<Option<String>> = (1..=4)
            .map(|i| {
                producer
                    .produce(&passing_time(i, Some(3600 * i)))
                    .unwrap()
                    .unwrap()
                    .stop_headsign
            })
            .collect();
        let expected: Vec<Option<String>> = ["A", "A", "A", "B"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(expected, head_signs);
    }

    #[test]
    fn head_sign_kept_without_front_text() {
        let mut data = data();
        data.destination_displays
            .insert(DestinationDisplay {
                id: "DD:X".to_owned(),
                front_text: None,
                via_refs: vec![],
            })
            .unwrap();
        let displays = [Some("DD:A"), None, Some("DD:X"), Some("DD:unknown")];
        let points = (1..=4)
            .map(|i| StopPointInJourneyPattern {
                id: format!("JP:2:{}", i),
                order: i,
                scheduled_stop_point_ref: format!("SSP:{}", i),
                destination_display_ref: displays[i as usize - 1].map(|d| d.to_owned()),
                for_boarding: true,
                for_alighting: true,
                request_stop: false,
            })
            .collect();
        data.journey_patterns
            .insert(JourneyPattern {
                id: "JP:2".to_owned(),
                route_ref: "R:1".to_owned(),
                points_in_sequence: points,
                ..Default::default()
            })
            .unwrap();
        let index = NetexDatasetIndex::new(&data);
        let mut producer = StopTimeProducer::new(&index, "SJ:2", None);
        let head_signs: Vec<Option<String>> = (1..=4)
            .map(|i| {
                producer
                    .produce(&TimetabledPassingTime {
                        stop_point_in_journey_pattern_ref: format!("JP:2:{}", i),
                        ..passing_time(i, Some(3600 * i))
                    })
                    .unwrap()
                    .unwrap()
                    .stop_headsign
            })
            .collect();
        assert_eq!(vec![Some("A".to_owned()); 4], head_signs);
    }

    #[test]
    fn stop_time_fields() {
        let data = data();
        let index = NetexDatasetIndex::new(&data);
        let shape = GtfsShape {
            id: "JP:1".to_owned(),
            points: vec![],
            stop_distances: vec![0, 120, 250, 400, 500],
            srid: 4326,
        };
        let mut producer = StopTimeProducer::new(&index, "SJ:1", Some(&shape));

        let first = producer.produce(&passing_time(1, Some(3600))).unwrap().unwrap();
        assert_eq!("Q:1", first.stop_id);
        assert_eq!(3600, first.arrival_time);
        assert_eq!(PickupDropOffType::Regular, first.pickup_type);
        assert_eq!(PickupDropOffType::NotAvailable, first.drop_off_type);
        assert_eq!(Some(0), first.shape_dist_traveled);

        let second = producer
            .produce(&TimetabledPassingTime {
                arrival_time: Some(23 * 3600 + 59 * 60),
                departure_time: Some(60),
                departure_day_offset: 1,
                ..passing_time(2, None)
            })
            .unwrap()
            .unwrap();
        assert_eq!(2, second.stop_sequence);
        assert_eq!(23 * 3600 + 59 * 60, second.arrival_time);
        assert_eq!(86_400 + 60, second.departure_time);
        assert_eq!(PickupDropOffType::CoordinateWithDriver, second.pickup_type);
        assert_eq!(Some(120), second.shape_dist_traveled);

        let fourth = producer.produce(&passing_time(4, Some(7200))).unwrap().unwrap();
        assert_eq!(PickupDropOffType::NotAvailable, fourth.pickup_type);
        assert_eq!(PickupDropOffType::Regular, fourth.drop_off_type);
    }

    #[test]
    fn flexible_and_unknown_stop_points() {
        let data = data();
        let index = NetexDatasetIndex::new(&data);
        let mut producer = StopTimeProducer::new(&index, "SJ:1", None);
        assert!(producer
            .produce(&passing_time(5, Some(3600)))
            .unwrap()
            .is_none());
        assert!(matches!(
            producer.produce(&passing_time(6, Some(3600))),
            Err(Error::ReferenceError(_))
        ));
    }
}
