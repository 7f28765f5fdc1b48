use crate::gtfs::GtfsOutput;
use crate::netex::objects::ServiceJourneyInterchange;
use crate::netex::NetexDatasetIndex;
use crate::objects::{Transfer, TransferType};
use log::debug;

pub struct TransferProducer<'a> {
    index: &'a NetexDatasetIndex<'a>,
}

impl<'a> TransferProducer<'a> {
    pub fn new(index: &'a NetexDatasetIndex<'a>) -> Self {
        TransferProducer { index }
    }

    fn transfer_type(interchange: &ServiceJourneyInterchange) -> (TransferType, Option<u32>) {
        if interchange.stay_seated {
            (TransferType::InSeat, None)
        } else if interchange.guaranteed {
            (TransferType::Timed, None)
        } else if let Some(time) = interchange.minimum_transfer_time {
            (TransferType::MinTime, Some(time))
        } else {
            (TransferType::Recommended, None)
        }
    }

    fn stop_id(&self, output: &GtfsOutput, scheduled_stop_point: &str) -> Option<String> {
        self.index
            .quay_id_for_scheduled_stop_point(scheduled_stop_point)
            .filter(|quay| output.stops().contains_id(quay))
            .map(|quay| quay.to_owned())
    }

    /// Transfer of an interchange between two produced trips at two produced stops
    pub fn produce(
        &self,
        interchange: &ServiceJourneyInterchange,
        output: &GtfsOutput,
    ) -> Option<Transfer> {
        let trips = output.trips();
        if !trips.contains_id(&interchange.from_journey_ref)
            || !trips.contains_id(&interchange.to_journey_ref)
        {
            debug!("interchange {}: trip not produced, skipped", interchange.id);
            return None;
        }
        let from_stop_id = self.stop_id(output, &interchange.from_point_ref);
        let to_stop_id = self.stop_id(output, &interchange.to_point_ref);
        let (from_stop_id, to_stop_id) = match (from_stop_id, to_stop_id) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                debug!("interchange {}: stop not produced, skipped", interchange.id);
                return None;
            }
        };
        let (transfer_type, min_transfer_time) = Self::transfer_type(interchange);
        Some(Transfer {
            from_stop_id,
            to_stop_id,
            from_trip_id: interchange.from_journey_ref.clone(),
            to_trip_id: interchange.to_journey_ref.clone(),
            transfer_type,
            min_transfer_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netex::objects::PassengerStopAssignment;
    use crate::netex::NetexData;
    use crate::objects::{Stop, Trip};

    fn interchange() -> ServiceJourneyInterchange {
        ServiceJourneyInterchange {
            id: "SJI:1".to_owned(),
            from_point_ref: "SSP:1".to_owned(),
            to_point_ref: "SSP:2".to_owned(),
            from_journey_ref: "SJ:1".to_owned(),
            to_journey_ref: "SJ:2".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn transfer_types() {
        let mut i = interchange();
        assert_eq!(
            (TransferType::Recommended, None),
            TransferProducer::transfer_type(&i)
        );
        i.minimum_transfer_time = Some(120);
        assert_eq!(
            (TransferType::MinTime, Some(120)),
            TransferProducer::transfer_type(&i)
        );
        i.guaranteed = true;
        assert_eq!((TransferType::Timed, None), TransferProducer::transfer_type(&i));
        i.stay_seated = true;
        assert_eq!((TransferType::InSeat, None), TransferProducer::transfer_type(&i));
    }

    #[test]
    fn transfer_between_produced_trips() {
        let mut data = NetexData::default();
        for i in 1..=2 {
            data.passenger_stop_assignments
                .insert(PassengerStopAssignment {
                    id: format!("PSA:{}", i),
                    scheduled_stop_point_ref: format!("SSP:{}", i),
                    quay_ref: format!("Q:{}", i),
                })
                .unwrap();
        }
        let index = NetexDatasetIndex::new(&data);
        let producer = TransferProducer::new(&index);
        let mut output = GtfsOutput::default();
        for id in &["Q:1", "Q:2"] {
            output
                .add_stop(Stop {
                    id: id.to_string(),
                    ..Default::default()
                })
                .unwrap();
        }
        output
            .add_trip(Trip {
                id: "SJ:1".to_owned(),
                ..Default::default()
            })
            .unwrap();
        assert!(producer.produce(&interchange(), &output).is_none());

        output
            .add_trip(Trip {
                id: "SJ:2".to_owned(),
                ..Default::default()
            })
            .unwrap();
        let transfer = producer.produce(&interchange(), &output).unwrap();
        assert_eq!("Q:1", transfer.from_stop_id);
        assert_eq!("Q:2", transfer.to_stop_id);
        assert_eq!("SJ:2", transfer.to_trip_id);
    }
}
