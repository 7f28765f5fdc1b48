use super::objects::*;
use super::reader::NetexData;
use crate::{Error, Result};
use itertools::Itertools;
use std::collections::HashMap;

/// Read only indexed view over a [NetexData]
///
/// Besides the lookups by id offered by the collections, the index holds the derived maps needed
/// to follow the references of the NeTEx model in both directions. All the lists keep the
/// document order.
pub struct NetexDatasetIndex<'a> {
    pub data: &'a NetexData,
    routes_by_line: HashMap<&'a str, Vec<&'a Route>>,
    journey_patterns_by_route: HashMap<&'a str, Vec<&'a JourneyPattern>>,
    service_journeys_by_journey_pattern: HashMap<&'a str, Vec<&'a ServiceJourney>>,
    quay_by_scheduled_stop_point: HashMap<&'a str, &'a str>,
    flexible_stop_place_by_scheduled_stop_point: HashMap<&'a str, &'a str>,
    assignments_by_day_type: HashMap<&'a str, Vec<&'a DayTypeAssignment>>,
    dated_service_journeys_by_service_journey: HashMap<&'a str, Vec<&'a DatedServiceJourney>>,
    stop_points_in_journey_pattern:
        HashMap<&'a str, (&'a JourneyPattern, &'a StopPointInJourneyPattern)>,
}

impl<'a> NetexDatasetIndex<'a> {
    pub fn new(data: &'a NetexData) -> Self {
        let mut routes_by_line: HashMap<&str, Vec<&Route>> = HashMap::new();
        for route in &data.routes {
            routes_by_line
                .entry(route.line_ref.as_str())
                .or_default()
                .push(route);
        }

        let mut journey_patterns_by_route: HashMap<&str, Vec<&JourneyPattern>> = HashMap::new();
        let mut stop_points_in_journey_pattern = HashMap::new();
        for journey_pattern in &data.journey_patterns {
            journey_patterns_by_route
                .entry(journey_pattern.route_ref.as_str())
                .or_default()
                .push(journey_pattern);
            for stop_point in &journey_pattern.points_in_sequence {
                stop_points_in_journey_pattern
                    .insert(stop_point.id.as_str(), (journey_pattern, stop_point));
            }
        }

        let mut service_journeys_by_journey_pattern: HashMap<&str, Vec<&ServiceJourney>> =
            HashMap::new();
        for service_journey in &data.service_journeys {
            service_journeys_by_journey_pattern
                .entry(service_journey.journey_pattern_ref.as_str())
                .or_default()
                .push(service_journey);
        }

        let quay_by_scheduled_stop_point = data
            .passenger_stop_assignments
            .iter()
            .map(|a| (a.scheduled_stop_point_ref.as_str(), a.quay_ref.as_str()))
            .collect();
        let flexible_stop_place_by_scheduled_stop_point = data
            .flexible_stop_assignments
            .iter()
            .map(|a| {
                (
                    a.scheduled_stop_point_ref.as_str(),
                    a.flexible_stop_place_ref.as_str(),
                )
            })
            .collect();

        let mut assignments_by_day_type: HashMap<&str, Vec<&DayTypeAssignment>> = HashMap::new();
        for assignment in &data.day_type_assignments {
            assignments_by_day_type
                .entry(assignment.day_type_ref.as_str())
                .or_default()
                .push(assignment);
        }
        for assignments in assignments_by_day_type.values_mut() {
            // stable sort, the document order is kept for equal orders
            assignments.sort_by_key(|a| a.order);
        }

        let mut dated_service_journeys_by_service_journey: HashMap<
            &str,
            Vec<&DatedServiceJourney>,
        > = HashMap::new();
        for dated_service_journey in &data.dated_service_journeys {
            dated_service_journeys_by_service_journey
                .entry(dated_service_journey.service_journey_ref.as_str())
                .or_default()
                .push(dated_service_journey);
        }

        NetexDatasetIndex {
            data,
            routes_by_line,
            journey_patterns_by_route,
            service_journeys_by_journey_pattern,
            quay_by_scheduled_stop_point,
            flexible_stop_place_by_scheduled_stop_point,
            assignments_by_day_type,
            dated_service_journeys_by_service_journey,
            stop_points_in_journey_pattern,
        }
    }

    pub fn authority(&self, id: &str) -> Option<&'a Authority> {
        self.data.authorities.get(id)
    }

    pub fn network(&self, id: &str) -> Option<&'a Network> {
        self.data.networks.get(id)
    }

    pub fn line(&self, id: &str) -> Option<&'a Line> {
        self.data.lines.get(id)
    }

    pub fn route(&self, id: &str) -> Option<&'a Route> {
        self.data.routes.get(id)
    }

    pub fn journey_pattern(&self, id: &str) -> Option<&'a JourneyPattern> {
        self.data.journey_patterns.get(id)
    }

    pub fn service_link(&self, id: &str) -> Option<&'a ServiceLink> {
        self.data.service_links.get(id)
    }

    pub fn service_journey(&self, id: &str) -> Option<&'a ServiceJourney> {
        self.data.service_journeys.get(id)
    }

    pub fn day_type(&self, id: &str) -> Option<&'a DayType> {
        self.data.day_types.get(id)
    }

    pub fn operating_day(&self, id: &str) -> Option<&'a OperatingDay> {
        self.data.operating_days.get(id)
    }

    pub fn operating_period(&self, id: &str) -> Option<&'a OperatingPeriod> {
        self.data.operating_periods.get(id)
    }

    pub fn destination_display(&self, id: &str) -> Option<&'a DestinationDisplay> {
        self.data.destination_displays.get(id)
    }

    pub fn flexible_stop_place(&self, id: &str) -> Option<&'a FlexibleStopPlace> {
        self.data.flexible_stop_places.get(id)
    }

    pub fn routes_for_line(&self, line_id: &str) -> &[&'a Route] {
        self.routes_by_line
            .get(line_id)
            .map(|r| r.as_slice())
            .unwrap_or_default()
    }

    pub fn journey_patterns_for_route(&self, route_id: &str) -> &[&'a JourneyPattern] {
        self.journey_patterns_by_route
            .get(route_id)
            .map(|j| j.as_slice())
            .unwrap_or_default()
    }

    pub fn service_journeys_for_journey_pattern(
        &self,
        journey_pattern_id: &str,
    ) -> &[&'a ServiceJourney] {
        self.service_journeys_by_journey_pattern
            .get(journey_pattern_id)
            .map(|s| s.as_slice())
            .unwrap_or_default()
    }

    /// Assignments of a day type, sorted by their `order`
    pub fn assignments_for_day_type(&self, day_type_id: &str) -> &[&'a DayTypeAssignment] {
        self.assignments_by_day_type
            .get(day_type_id)
            .map(|a| a.as_slice())
            .unwrap_or_default()
    }

    pub fn dated_service_journeys(&self, service_journey_id: &str) -> &[&'a DatedServiceJourney] {
        self.dated_service_journeys_by_service_journey
            .get(service_journey_id)
            .map(|d| d.as_slice())
            .unwrap_or_default()
    }

    pub fn quay_id_for_scheduled_stop_point(&self, scheduled_stop_point_id: &str) -> Option<&'a str> {
        self.quay_by_scheduled_stop_point
            .get(scheduled_stop_point_id)
            .copied()
    }

    pub fn flexible_stop_place_id_for_scheduled_stop_point(
        &self,
        scheduled_stop_point_id: &str,
    ) -> Option<&'a str> {
        self.flexible_stop_place_by_scheduled_stop_point
            .get(scheduled_stop_point_id)
            .copied()
    }

    pub fn is_flexible_stop_point(&self, scheduled_stop_point_id: &str) -> bool {
        self.flexible_stop_place_by_scheduled_stop_point
            .contains_key(scheduled_stop_point_id)
    }

    /// Journey pattern and stop point of a `StopPointInJourneyPattern` id
    pub fn stop_point_in_journey_pattern(
        &self,
        id: &str,
    ) -> Option<(&'a JourneyPattern, &'a StopPointInJourneyPattern)> {
        self.stop_points_in_journey_pattern.get(id).copied()
    }

    /// Id of the authority operating a line
    ///
    /// The `RepresentedByGroupRef` of a line is either a network or a group of lines nested in a
    /// network. In the latter case the first network, in document order, declaring the group is
    /// used.
    pub fn authority_id_for_line(&self, line: &Line) -> Result<&'a str> {
        let group_ref = line
            .represented_by_group_ref
            .as_deref()
            .ok_or_else(|| Error::AuthorityNotFound {
                line_id: line.id.clone(),
                group_ref: String::new(),
            })?;
        let network = self.network(group_ref).or_else(|| {
            self.data
                .networks
                .iter()
                .find(|n| n.groups_of_lines.iter().any(|g| g == group_ref))
        });
        network
            .and_then(|n| n.authority_ref.as_deref())
            .ok_or_else(|| Error::AuthorityNotFound {
                line_id: line.id.clone(),
                group_ref: group_ref.to_owned(),
            })
    }

    /// The unique time zone of the dataset
    pub fn time_zone(&self) -> Result<&'a str> {
        let time_zones: Vec<&str> = self
            .data
            .frame_defaults
            .iter()
            .filter_map(|d| d.time_zone.as_deref())
            .unique()
            .collect();
        match time_zones.as_slice() {
            [] => Err(Error::MissingTimeZone),
            [time_zone] => Ok(*time_zone),
            _ => Err(Error::AmbiguousTimeZone(
                time_zones.iter().map(|t| t.to_string()).collect(),
            )),
        }
    }

    pub fn default_language(&self) -> Option<&'a str> {
        self.data
            .frame_defaults
            .iter()
            .find_map(|d| d.language.as_deref())
    }
}
