use crate::netex::objects::{Quay, StopPlace};
use crate::objects::{LocationType, Stop};
use crate::route_type::classify_netex;

/// Stop of a quay, child of its stop place
pub fn produce_quay_stop(quay: &Quay, stop_place: &StopPlace) -> Stop {
    Stop {
        id: quay.id.clone(),
        name: quay.name.clone().unwrap_or_else(|| stop_place.name.clone()),
        description: quay.description.clone(),
        latitude: quay.centroid.map(|c| c.latitude),
        longitude: quay.centroid.map(|c| c.longitude),
        location_type: LocationType::StopPoint,
        parent_station: Some(stop_place.id.clone()),
        platform_code: quay.public_code.clone(),
        vehicle_type: None,
    }
}

/// Station of a stop place
pub fn produce_stop_place_stop(stop_place: &StopPlace) -> Stop {
    Stop {
        id: stop_place.id.clone(),
        name: stop_place.name.clone(),
        description: None,
        latitude: stop_place.centroid.map(|c| c.latitude),
        longitude: stop_place.centroid.map(|c| c.longitude),
        location_type: LocationType::StopArea,
        parent_station: None,
        platform_code: None,
        vehicle_type: stop_place.transport_mode.as_deref().map(|mode| {
            classify_netex(Some(mode), stop_place.transport_submode.as_deref())
        }),
    }
}
