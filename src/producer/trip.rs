use crate::netex::objects::{DirectionType as NetexDirection, JourneyPattern, Route, ServiceJourney};
use crate::netex::NetexDatasetIndex;
use crate::objects::{DirectionType, Trip};
use crate::service_calendar::{GtfsService, GtfsServiceRepository};
use crate::shape::GtfsShape;
use itertools::Itertools;
use log::{debug, warn};
use std::sync::Arc;

/// Text of a destination display, followed by its vias: `Airport via Central/Stadium`
pub fn destination_display_text(index: &NetexDatasetIndex, id: &str) -> Option<String> {
    let display = match index.destination_display(id) {
        Some(d) => d,
        None => {
            warn!("unknown destination display {}", id);
            return None;
        }
    };
    let front_text = display.front_text.as_ref()?;
    let vias = display
        .via_refs
        .iter()
        .filter_map(|via| index.destination_display(via))
        .filter_map(|via| via.front_text.as_deref())
        .join("/");
    if vias.is_empty() {
        Some(front_text.clone())
    } else {
        Some(format!("{} via {}", front_text, vias))
    }
}

pub struct TripProducer<'a> {
    index: &'a NetexDatasetIndex<'a>,
    services: &'a GtfsServiceRepository,
}

impl<'a> TripProducer<'a> {
    pub fn new(index: &'a NetexDatasetIndex<'a>, services: &'a GtfsServiceRepository) -> Self {
        TripProducer { index, services }
    }

    fn service(&self, service_journey: &ServiceJourney) -> Option<Arc<GtfsService>> {
        if !service_journey.day_type_refs.is_empty() {
            let day_types: Vec<&str> = service_journey
                .day_type_refs
                .iter()
                .map(|d| d.as_str())
                .collect();
            return Some(self.services.service_for_day_types(self.index, &day_types));
        }
        let operating_days: Vec<&str> = self
            .index
            .dated_service_journeys(&service_journey.id)
            .iter()
            .filter(|d| !d.alteration.is_cancelled_or_replaced())
            .map(|d| d.operating_day_ref.as_str())
            .collect();
        if operating_days.is_empty() {
            return None;
        }
        Some(
            self.services
                .service_for_operating_days(self.index, &operating_days),
        )
    }

    fn head_sign(
        &self,
        service_journey: &ServiceJourney,
        journey_pattern: &JourneyPattern,
    ) -> Option<String> {
        journey_pattern
            .points_in_sequence
            .first()
            .and_then(|p| p.destination_display_ref.as_deref())
            .and_then(|d| destination_display_text(self.index, d))
            .or_else(|| service_journey.name.clone())
            .or_else(|| journey_pattern.name.clone())
            .or_else(|| {
                warn!("no head sign for service journey {}", service_journey.id);
                None
            })
    }

    /// Trip of a service journey, `None` for cancelled journeys and journeys without any day
    /// of service
    pub fn produce(
        &self,
        service_journey: &ServiceJourney,
        journey_pattern: &JourneyPattern,
        route: &Route,
        shape: Option<&GtfsShape>,
    ) -> Option<Trip> {
        if service_journey.alteration.is_cancelled_or_replaced() {
            debug!("service journey {} is {:?}", service_journey.id, service_journey.alteration);
            return None;
        }
        let service = match self.service(service_journey) {
            Some(s) => s,
            None => {
                warn!(
                    "service journey {} has neither day types nor dated journeys, skipped",
                    service_journey.id
                );
                return None;
            }
        };
        let direction = match route.direction_type {
            Some(NetexDirection::Inbound) => DirectionType::Inbound,
            _ => DirectionType::Outbound,
        };
        Some(Trip {
            route_id: route.line_ref.clone(),
            service_id: service.id.clone(),
            id: service_journey.id.clone(),
            headsign: self.head_sign(service_journey, journey_pattern),
            short_name: service_journey.public_code.clone(),
            direction,
            shape_id: shape.map(|s| s.id.clone()),
            wheelchair_accessible: None,
        })
    }
}
