use crate::collection::Collection;
use crate::objects::*;
use crate::{Error, Result};
use chrono::NaiveDate;
use log::info;
use std::collections::HashSet;

/// Data structure with all the produced GTFS records
///
/// Records are appended in the order they are produced and never modified afterwards, this
/// order is the order of the written files. Every kind of record has a unique key, inserting a
/// record twice is an error.
#[derive(Debug, Default)]
pub struct GtfsOutput {
    agencies: Collection<Agency>,
    stops: Collection<Stop>,
    routes: Collection<Route>,
    trips: Collection<Trip>,
    stop_times: Vec<StopTime>,
    stop_time_keys: HashSet<(String, u32)>,
    shapes: Vec<ShapePoint>,
    shape_ids: HashSet<String>,
    calendars: Collection<Calendar>,
    calendar_dates: Vec<CalendarDate>,
    calendar_date_keys: HashSet<(String, NaiveDate)>,
    transfers: Vec<Transfer>,
    transfer_keys: HashSet<(String, String, String, String)>,
    feed_info: Option<FeedInfo>,
}

fn duplicate(kind: &'static str, id: String) -> Error {
    Error::DuplicateEntity { kind, id }
}

impl GtfsOutput {
    pub fn add_agency(&mut self, agency: Agency) -> Result<()> {
        self.agencies.insert(agency).map(|_| ())
    }

    pub fn add_stop(&mut self, stop: Stop) -> Result<()> {
        self.stops.insert(stop).map(|_| ())
    }

    pub fn add_route(&mut self, route: Route) -> Result<()> {
        self.routes.insert(route).map(|_| ())
    }

    pub fn add_trip(&mut self, trip: Trip) -> Result<()> {
        self.trips.insert(trip).map(|_| ())
    }

    pub fn add_stop_time(&mut self, stop_time: StopTime) -> Result<()> {
        let key = (stop_time.trip_id.clone(), stop_time.stop_sequence);
        if !self.stop_time_keys.insert(key) {
            return Err(duplicate(
                "stop time",
                format!("{}/{}", stop_time.trip_id, stop_time.stop_sequence),
            ));
        }
        self.stop_times.push(stop_time);
        Ok(())
    }

    /// Adds all the points of a shape
    pub fn add_shape(&mut self, shape_id: &str, points: Vec<ShapePoint>) -> Result<()> {
        if !self.shape_ids.insert(shape_id.to_owned()) {
            return Err(duplicate("shape", shape_id.to_owned()));
        }
        self.shapes.extend(points);
        Ok(())
    }

    pub fn add_calendar(&mut self, calendar: Calendar) -> Result<()> {
        self.calendars.insert(calendar).map(|_| ())
    }

    pub fn add_calendar_date(&mut self, calendar_date: CalendarDate) -> Result<()> {
        let key = (calendar_date.service_id.clone(), calendar_date.date);
        if !self.calendar_date_keys.insert(key) {
            return Err(duplicate(
                "calendar date",
                format!("{}/{}", calendar_date.service_id, calendar_date.date),
            ));
        }
        self.calendar_dates.push(calendar_date);
        Ok(())
    }

    pub fn add_transfer(&mut self, transfer: Transfer) -> Result<()> {
        let key = (
            transfer.from_trip_id.clone(),
            transfer.to_trip_id.clone(),
            transfer.from_stop_id.clone(),
            transfer.to_stop_id.clone(),
        );
        if !self.transfer_keys.insert(key) {
            return Err(duplicate(
                "transfer",
                format!("{}/{}", transfer.from_trip_id, transfer.to_trip_id),
            ));
        }
        self.transfers.push(transfer);
        Ok(())
    }

    pub fn set_feed_info(&mut self, feed_info: FeedInfo) -> Result<()> {
        if self.feed_info.is_some() {
            return Err(duplicate("feed info", feed_info.name));
        }
        self.feed_info = Some(feed_info);
        Ok(())
    }

    pub fn agencies(&self) -> &Collection<Agency> {
        &self.agencies
    }

    pub fn stops(&self) -> &Collection<Stop> {
        &self.stops
    }

    pub fn routes(&self) -> &Collection<Route> {
        &self.routes
    }

    pub fn trips(&self) -> &Collection<Trip> {
        &self.trips
    }

    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times
    }

    pub fn shapes(&self) -> &[ShapePoint] {
        &self.shapes
    }

    pub fn has_shape(&self, shape_id: &str) -> bool {
        self.shape_ids.contains(shape_id)
    }

    pub fn calendars(&self) -> &Collection<Calendar> {
        &self.calendars
    }

    pub fn calendar_dates(&self) -> &[CalendarDate] {
        &self.calendar_dates
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn feed_info(&self) -> Option<&FeedInfo> {
        self.feed_info.as_ref()
    }

    /// First and last day of service of the feed
    pub fn validity_period(&self) -> Option<(NaiveDate, NaiveDate)> {
        let calendar_bounds = self
            .calendars
            .iter()
            .flat_map(|c| vec![c.start_date, c.end_date]);
        let dates = self
            .calendar_dates
            .iter()
            .filter(|d| d.exception_type == Exception::Added)
            .map(|d| d.date);
        let mut all = calendar_bounds.chain(dates);
        let first = all.next()?;
        Some(all.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
    }

    pub fn print_stats(&self) {
        info!("GTFS data:");
        info!("  Agencies: {}", self.agencies.len());
        info!("  Stops: {}", self.stops.len());
        info!("  Routes: {}", self.routes.len());
        info!("  Trips: {}", self.trips.len());
        info!("  Stop times: {}", self.stop_times.len());
        info!("  Shapes: {}", self.shape_ids.len());
        info!("  Calendars: {}", self.calendars.len());
        info!("  Calendar dates: {}", self.calendar_dates.len());
        info!("  Transfers: {}", self.transfers.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut output = GtfsOutput::default();
        let stop_time = StopTime {
            trip_id: "T1".to_owned(),
            stop_sequence: 1,
            ..Default::default()
        };
        output.add_stop_time(stop_time.clone()).unwrap();
        assert!(matches!(
            output.add_stop_time(stop_time),
            Err(Error::DuplicateEntity { kind: "stop time", .. })
        ));

        output
            .add_trip(Trip {
                id: "T1".to_owned(),
                ..Default::default()
            })
            .unwrap();
        assert!(output
            .add_trip(Trip {
                id: "T1".to_owned(),
                ..Default::default()
            })
            .is_err());
        assert_eq!(1, output.trips().len());
    }

    #[test]
    fn validity_period_covers_calendars_and_added_dates() {
        let mut output = GtfsOutput::default();
        assert_eq!(None, output.validity_period());
        output
            .add_calendar(Calendar::new(
                "S1".to_owned(),
                Default::default(),
                date(10),
                date(20),
            ))
            .unwrap();
        for (d, exception_type) in &[(3, Exception::Added), (25, Exception::Deleted)] {
            output
                .add_calendar_date(CalendarDate {
                    service_id: "S1".to_owned(),
                    date: date(*d),
                    exception_type: *exception_type,
                })
                .unwrap();
        }
        assert_eq!(Some((date(3), date(20))), output.validity_period());
    }
}
