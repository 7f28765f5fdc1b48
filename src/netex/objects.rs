//! NeTEx entities, as read from the XML documents
//!
//! Only the attributes needed to build a GTFS feed are kept. References to other entities are
//! kept as plain ids and resolved through [super::NetexDatasetIndex].

use crate::collection::WithId;
use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;

macro_rules! with_id {
    ($ty:ty, $kind:expr) => {
        impl WithId for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

/// State of a journey compared to the planned offer
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Derivative)]
#[derivative(Default)]
pub enum ServiceAlteration {
    #[derivative(Default)]
    Planned,
    Cancellation,
    Replaced,
    ExtraJourney,
}

impl ServiceAlteration {
    pub fn parse(s: &str) -> ServiceAlteration {
        match s.trim() {
            "cancellation" => ServiceAlteration::Cancellation,
            "replaced" => ServiceAlteration::Replaced,
            "extraJourney" => ServiceAlteration::ExtraJourney,
            _ => ServiceAlteration::Planned,
        }
    }

    /// Cancelled and replaced journeys must never reach the feed
    pub fn is_cancelled_or_replaced(self) -> bool {
        matches!(
            self,
            ServiceAlteration::Cancellation | ServiceAlteration::Replaced
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DirectionType {
    Outbound,
    Inbound,
    Clockwise,
    Anticlockwise,
}

impl DirectionType {
    pub fn parse(s: &str) -> Option<DirectionType> {
        match s.trim() {
            "outbound" => Some(DirectionType::Outbound),
            "inbound" => Some(DirectionType::Inbound),
            "clockwise" => Some(DirectionType::Clockwise),
            "anticlockwise" => Some(DirectionType::Anticlockwise),
            _ => None,
        }
    }
}

/// Values of the `DaysOfWeek` list of a `PropertyOfDay`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    Weekdays,
    Weekend,
    Everyday,
    None,
}

impl DayOfWeek {
    pub fn parse(s: &str) -> Option<DayOfWeek> {
        Some(match s {
            "Monday" => DayOfWeek::Monday,
            "Tuesday" => DayOfWeek::Tuesday,
            "Wednesday" => DayOfWeek::Wednesday,
            "Thursday" => DayOfWeek::Thursday,
            "Friday" => DayOfWeek::Friday,
            "Saturday" => DayOfWeek::Saturday,
            "Sunday" => DayOfWeek::Sunday,
            "Weekdays" => DayOfWeek::Weekdays,
            "Weekend" => DayOfWeek::Weekend,
            "Everyday" => DayOfWeek::Everyday,
            "none" | "None" => DayOfWeek::None,
            _ => return None,
        })
    }
}

/// A point in WGS84 (or in the reference system of the enclosing geometry)
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

/// A `gml:LineString`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    pub srs_name: Option<String>,
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Clone, Default)]
pub struct Authority {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
}
with_id!(Authority, "Authority");

#[derive(Debug, Clone, Default)]
pub struct Network {
    pub id: String,
    pub name: Option<String>,
    pub authority_ref: Option<String>,
    /// Ids of the groups of lines declared inside the network
    pub groups_of_lines: Vec<String>,
}
with_id!(Network, "Network");

#[derive(Debug, Clone, Default)]
pub struct GroupOfLines {
    pub id: String,
    pub name: Option<String>,
}
with_id!(GroupOfLines, "GroupOfLines");

#[derive(Debug, Clone, Default)]
pub struct Line {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub public_code: Option<String>,
    pub description: Option<String>,
    pub transport_mode: Option<String>,
    pub transport_submode: Option<String>,
    /// Reference to a Network or to a GroupOfLines
    pub represented_by_group_ref: Option<String>,
    pub colour: Option<String>,
    pub text_colour: Option<String>,
}
with_id!(Line, "Line");

#[derive(Debug, Clone, Default)]
pub struct Route {
    pub id: String,
    pub name: Option<String>,
    pub line_ref: String,
    pub direction_type: Option<DirectionType>,
}
with_id!(Route, "Route");

#[derive(Debug, Clone, Default)]
pub struct StopPointInJourneyPattern {
    pub id: String,
    pub order: u32,
    pub scheduled_stop_point_ref: String,
    pub destination_display_ref: Option<String>,
    pub for_boarding: bool,
    pub for_alighting: bool,
    pub request_stop: bool,
}

#[derive(Debug, Clone, Default)]
pub struct JourneyPattern {
    pub id: String,
    pub name: Option<String>,
    pub route_ref: String,
    /// Sorted by `order`
    pub points_in_sequence: Vec<StopPointInJourneyPattern>,
    /// Service link ids, sorted by `order`
    pub links_in_sequence: Vec<String>,
}
with_id!(JourneyPattern, "JourneyPattern");

#[derive(Debug, Clone, Default)]
pub struct ServiceLink {
    pub id: String,
    pub from_point_ref: Option<String>,
    pub to_point_ref: Option<String>,
    pub line_string: Option<LineString>,
}
with_id!(ServiceLink, "ServiceLink");

#[derive(Debug, Clone, Default)]
pub struct TimetabledPassingTime {
    pub stop_point_in_journey_pattern_ref: String,
    pub arrival_time: Option<u32>,
    pub arrival_day_offset: u32,
    pub departure_time: Option<u32>,
    pub departure_day_offset: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceJourney {
    pub id: String,
    pub name: Option<String>,
    pub public_code: Option<String>,
    pub private_code: Option<String>,
    pub journey_pattern_ref: String,
    pub line_ref: Option<String>,
    pub day_type_refs: Vec<String>,
    pub passing_times: Vec<TimetabledPassingTime>,
    pub alteration: ServiceAlteration,
}
with_id!(ServiceJourney, "ServiceJourney");

#[derive(Debug, Clone, Default)]
pub struct DatedServiceJourney {
    pub id: String,
    pub service_journey_ref: String,
    pub operating_day_ref: String,
    pub alteration: ServiceAlteration,
}
with_id!(DatedServiceJourney, "DatedServiceJourney");

#[derive(Debug, Clone, Default)]
pub struct DayType {
    pub id: String,
    pub days_of_week: Vec<DayOfWeek>,
}
with_id!(DayType, "DayType");

/// What a day type assignment applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentTarget {
    Date(NaiveDate),
    OperatingDay(String),
    OperatingPeriod(String),
}

#[derive(Debug, Clone)]
pub struct DayTypeAssignment {
    pub id: String,
    pub order: u32,
    pub day_type_ref: String,
    pub target: AssignmentTarget,
    pub is_available: bool,
}
with_id!(DayTypeAssignment, "DayTypeAssignment");

#[derive(Debug, Clone)]
pub struct OperatingDay {
    pub id: String,
    pub calendar_date: NaiveDate,
}
with_id!(OperatingDay, "OperatingDay");

/// Bound of an operating period, either an explicit date or an operating day
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodBound {
    Date(NaiveDate),
    OperatingDay(String),
}

#[derive(Debug, Clone)]
pub struct OperatingPeriod {
    pub id: String,
    pub from: PeriodBound,
    pub to: PeriodBound,
}
with_id!(OperatingPeriod, "OperatingPeriod");

#[derive(Debug, Clone, Default)]
pub struct ServiceJourneyInterchange {
    pub id: String,
    pub from_point_ref: String,
    pub to_point_ref: String,
    pub from_journey_ref: String,
    pub to_journey_ref: String,
    pub stay_seated: bool,
    pub guaranteed: bool,
    /// In seconds
    pub minimum_transfer_time: Option<u32>,
}
with_id!(ServiceJourneyInterchange, "ServiceJourneyInterchange");

#[derive(Debug, Clone, Default)]
pub struct DestinationDisplay {
    pub id: String,
    pub front_text: Option<String>,
    /// Destination displays of the vias, in their declared order
    pub via_refs: Vec<String>,
}
with_id!(DestinationDisplay, "DestinationDisplay");

#[derive(Debug, Clone, Default)]
pub struct PassengerStopAssignment {
    pub id: String,
    pub scheduled_stop_point_ref: String,
    pub quay_ref: String,
}
with_id!(PassengerStopAssignment, "PassengerStopAssignment");

#[derive(Debug, Clone, Default)]
pub struct FlexibleStopAssignment {
    pub id: String,
    pub scheduled_stop_point_ref: String,
    pub flexible_stop_place_ref: String,
}
with_id!(FlexibleStopAssignment, "FlexibleStopAssignment");

#[derive(Debug, Clone, Default)]
pub struct FlexibleStopPlace {
    pub id: String,
    pub name: Option<String>,
}
with_id!(FlexibleStopPlace, "FlexibleStopPlace");

#[derive(Debug, Clone, Default)]
pub struct StopPlace {
    pub id: String,
    pub name: String,
    pub centroid: Option<Coordinate>,
    pub transport_mode: Option<String>,
    pub transport_submode: Option<String>,
    pub quay_refs: Vec<String>,
}
with_id!(StopPlace, "StopPlace");

#[derive(Debug, Clone, Default)]
pub struct Quay {
    pub id: String,
    pub name: Option<String>,
    pub public_code: Option<String>,
    pub description: Option<String>,
    pub centroid: Option<Coordinate>,
    pub stop_place_ref: String,
}
with_id!(Quay, "Quay");

/// `FrameDefaults` of a top level frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameDefaults {
    pub time_zone: Option<String>,
    pub language: Option<String>,
}

/// Days of the week a service runs on
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct WeekdayFlags {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl WeekdayFlags {
    pub fn everyday() -> Self {
        WeekdayFlags {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: true,
            sunday: true,
        }
    }

    /// No day of week information at all means everyday
    pub fn from_days_of_week(days: &[DayOfWeek]) -> Self {
        if days.is_empty() {
            return Self::everyday();
        }
        let mut flags = WeekdayFlags::default();
        for day in days {
            match day {
                DayOfWeek::Everyday => flags = Self::everyday(),
                DayOfWeek::Monday => flags.monday = true,
                DayOfWeek::Tuesday => flags.tuesday = true,
                DayOfWeek::Wednesday => flags.wednesday = true,
                DayOfWeek::Thursday => flags.thursday = true,
                DayOfWeek::Friday => flags.friday = true,
                DayOfWeek::Saturday => flags.saturday = true,
                DayOfWeek::Sunday => flags.sunday = true,
                DayOfWeek::Weekdays => {
                    flags.monday = true;
                    flags.tuesday = true;
                    flags.wednesday = true;
                    flags.thursday = true;
                    flags.friday = true;
                }
                DayOfWeek::Weekend => {
                    flags.saturday = true;
                    flags.sunday = true;
                }
                DayOfWeek::None => {}
            }
        }
        flags
    }

    pub fn union(self, other: WeekdayFlags) -> WeekdayFlags {
        WeekdayFlags {
            monday: self.monday || other.monday,
            tuesday: self.tuesday || other.tuesday,
            wednesday: self.wednesday || other.wednesday,
            thursday: self.thursday || other.thursday,
            friday: self.friday || other.friday,
            saturday: self.saturday || other.saturday,
            sunday: self.sunday || other.sunday,
        }
    }

    pub fn valid_weekday(&self, date: NaiveDate) -> bool {
        match date.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}
