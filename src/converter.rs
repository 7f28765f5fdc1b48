use crate::config::ConverterConfig;
use crate::gtfs::GtfsOutput;
use crate::netex::objects::{Line, Quay, ServiceJourney};
use crate::netex::{NetexData, NetexDatasetIndex};
use crate::producer::*;
use crate::service_calendar::GtfsServiceRepository;
use crate::shape::{ShapeBuilder, DEFAULT_SRID};
use crate::stop_area::StopAreaIndex;
use crate::{Error, Result};
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Converts a NeTEx timetable dataset into a GTFS feed
///
/// The stages always run in the same order and only append to the output, so that the same input
/// always gives the same feed.
pub struct GtfsConverter {
    config: ConverterConfig,
    stop_areas: Arc<StopAreaIndex>,
}

/// Everything shared by the stages of one conversion
struct Conversion<'a> {
    config: &'a ConverterConfig,
    stop_areas: &'a StopAreaIndex,
    index: &'a NetexDatasetIndex<'a>,
    services: GtfsServiceRepository,
    output: GtfsOutput,
}

impl GtfsConverter {
    pub fn new(config: ConverterConfig, stop_areas: Arc<StopAreaIndex>) -> Self {
        GtfsConverter { config, stop_areas }
    }

    pub fn convert(&self, data: &NetexData) -> Result<GtfsOutput> {
        let now = Utc::now();
        let index = NetexDatasetIndex::new(data);
        let mut conversion = Conversion {
            config: &self.config,
            stop_areas: &self.stop_areas,
            index: &index,
            services: GtfsServiceRepository::new(&self.config.codespace),
            output: GtfsOutput::default(),
        };
        conversion.convert_agencies()?;
        conversion.convert_stops()?;
        conversion.convert_routes()?;
        conversion.convert_services()?;
        conversion.convert_transfers()?;
        conversion.convert_feed_info()?;
        info!(
            "converted to GTFS in {} ms",
            Utc::now().signed_duration_since(now).num_milliseconds()
        );
        conversion.output.print_stats();
        Ok(conversion.output)
    }
}

fn is_active(service_journey: &ServiceJourney) -> bool {
    !service_journey.alteration.is_cancelled_or_replaced()
}

impl<'a> Conversion<'a> {
    fn authority_id(&self, line: &Line) -> Result<&'a str> {
        let authority_id = self.index.authority_id_for_line(line)?;
        if self.index.authority(authority_id).is_none() {
            return Err(Error::ReferenceError(authority_id.to_owned()));
        }
        Ok(authority_id)
    }

    fn convert_agencies(&mut self) -> Result<()> {
        let time_zone = self.index.time_zone()?;
        let producer = AgencyProducer::new(self.config, time_zone, self.index.default_language());
        let mut seen = HashSet::new();
        for line in &self.index.data.lines {
            let authority_id = self.authority_id(line)?;
            if !seen.insert(authority_id) {
                continue;
            }
            if let Some(authority) = self.index.authority(authority_id) {
                self.output.add_agency(producer.produce(authority))?;
            }
        }
        info!("{} agencies", self.output.agencies().len());
        Ok(())
    }

    /// Quays reached by the active journeys, in the order they are first reached
    fn reachable_quays(&self) -> Result<Vec<&'a Quay>> {
        let mut seen = HashSet::new();
        let mut quays = Vec::new();
        for service_journey in self.index.data.service_journeys.iter().filter(|s| is_active(s)) {
            let journey_pattern = self
                .index
                .journey_pattern(&service_journey.journey_pattern_ref)
                .ok_or_else(|| Error::ReferenceError(service_journey.journey_pattern_ref.clone()))?;
            for stop_point in &journey_pattern.points_in_sequence {
                let scheduled_stop_point = stop_point.scheduled_stop_point_ref.as_str();
                if self.index.is_flexible_stop_point(scheduled_stop_point) {
                    continue;
                }
                let quay_id = self
                    .index
                    .quay_id_for_scheduled_stop_point(scheduled_stop_point)
                    .ok_or_else(|| Error::ReferenceError(scheduled_stop_point.to_owned()))?;
                if seen.insert(quay_id) {
                    quays.push(self.stop_areas.try_quay(quay_id)?);
                }
            }
        }
        Ok(quays)
    }

    fn convert_stops(&mut self) -> Result<()> {
        let quays = self.reachable_quays()?;
        let mut stop_places = Vec::new();
        let mut seen = HashSet::new();
        for quay in quays {
            let stop_place = self.stop_areas.stop_place_for_quay(quay)?;
            self.output.add_stop(produce_quay_stop(quay, stop_place))?;
            if seen.insert(stop_place.id.as_str()) {
                stop_places.push(stop_place);
            }
        }
        for stop_place in stop_places {
            self.output.add_stop(produce_stop_place_stop(stop_place))?;
        }
        info!("{} stops", self.output.stops().len());
        Ok(())
    }

    fn convert_routes(&mut self) -> Result<()> {
        let index = self.index;
        let shape_builder = ShapeBuilder::new(index);
        let trip_producer = TripProducer::new(index, &self.services);
        for line in &index.data.lines {
            let authority_id = self.authority_id(line)?;
            self.output.add_route(produce_route(line, authority_id))?;

            for route in index.routes_for_line(&line.id) {
                for journey_pattern in index.journey_patterns_for_route(&route.id) {
                    let shape = if self.config.include_shapes {
                        shape_builder.build(journey_pattern)
                    } else {
                        None
                    };
                    let mut shape_added = false;
                    for service_journey in
                        index.service_journeys_for_journey_pattern(&journey_pattern.id)
                    {
                        let trip = match trip_producer.produce(
                            service_journey,
                            journey_pattern,
                            route,
                            shape.as_ref(),
                        ) {
                            Some(trip) => trip,
                            None => continue,
                        };
                        if let Some(shape) = &shape {
                            if !shape_added {
                                if shape.srid != DEFAULT_SRID {
                                    warn!(
                                        "shape {} written with the coordinates of srid {}",
                                        shape.id, shape.srid
                                    );
                                }
                                self.output.add_shape(&shape.id, shape.points.clone())?;
                                shape_added = true;
                            }
                        }
                        let mut stop_time_producer =
                            StopTimeProducer::new(index, &service_journey.id, shape.as_ref());
                        let mut stop_times = Vec::new();
                        for passing_time in &service_journey.passing_times {
                            if let Some(stop_time) = stop_time_producer.produce(passing_time)? {
                                stop_times.push(stop_time);
                            }
                        }
                        self.output.add_trip(trip)?;
                        for stop_time in stop_times {
                            self.output.add_stop_time(stop_time)?;
                        }
                    }
                }
            }
        }
        info!(
            "{} routes, {} trips, {} stop times",
            self.output.routes().len(),
            self.output.trips().len(),
            self.output.stop_times().len()
        );
        Ok(())
    }

    fn convert_services(&mut self) -> Result<()> {
        let services = self.services.services();
        for service in &services {
            let (calendar, calendar_dates) = produce_calendar(service);
            if let Some(calendar) = calendar {
                self.output.add_calendar(calendar)?;
            }
            for calendar_date in calendar_dates {
                self.output.add_calendar_date(calendar_date)?;
            }
        }
        info!(
            "{} services, {} calendars, {} calendar dates",
            services.len(),
            self.output.calendars().len(),
            self.output.calendar_dates().len()
        );
        Ok(())
    }

    fn convert_transfers(&mut self) -> Result<()> {
        let producer = TransferProducer::new(self.index);
        for interchange in &self.index.data.interchanges {
            if let Some(transfer) = producer.produce(interchange, &self.output) {
                self.output.add_transfer(transfer)?;
            }
        }
        info!("{} transfers", self.output.transfers().len());
        Ok(())
    }

    fn convert_feed_info(&mut self) -> Result<()> {
        match &self.config.feed_info {
            Some(feed_info) => {
                let feed_info = produce_feed_info(feed_info, self.output.validity_period());
                self.output.set_feed_info(feed_info)
            }
            None => {
                debug!("no feed info configured");
                Ok(())
            }
        }
    }
}
