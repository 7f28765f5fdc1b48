//! GTFS records produced by the conversion

use crate::collection::WithId;
use crate::netex::objects::WeekdayFlags;
use crate::serde_helpers::*;
use chrono::NaiveDate;
use rgb::RGB8;
use std::fmt;

#[derive(Debug, Serialize, Copy, Clone, PartialEq, Eq, Hash, Derivative)]
#[derivative(Default)]
pub enum LocationType {
    #[derivative(Default)]
    #[serde(rename = "0")]
    StopPoint,
    #[serde(rename = "1")]
    StopArea,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Derivative)]
#[derivative(Default)]
pub enum RouteType {
    Tramway,
    Subway,
    Rail,
    #[derivative(Default)]
    Bus,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
    // Extended route types (100 rail, 700 bus...) used by most NeTEx producers
    Other(u16),
}

impl RouteType {
    pub fn code(self) -> u16 {
        match self {
            RouteType::Tramway => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableCar => 5,
            RouteType::Gondola => 6,
            RouteType::Funicular => 7,
            RouteType::Other(i) => i,
        }
    }
}

impl From<u16> for RouteType {
    fn from(i: u16) -> RouteType {
        match i {
            0 => RouteType::Tramway,
            1 => RouteType::Subway,
            2 => RouteType::Rail,
            3 => RouteType::Bus,
            4 => RouteType::Ferry,
            5 => RouteType::CableCar,
            6 => RouteType::Gondola,
            7 => RouteType::Funicular,
            _ => RouteType::Other(i),
        }
    }
}

impl serde::Serialize for RouteType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.code())
    }
}

#[derive(Derivative)]
#[derivative(Default(bound = ""))]
#[derive(Debug, Serialize, Copy, Clone, PartialEq, Eq)]
pub enum PickupDropOffType {
    #[derivative(Default)]
    #[serde(rename = "0")]
    Regular,
    #[serde(rename = "1")]
    NotAvailable,
    #[serde(rename = "2")]
    ArrangeByPhone,
    #[serde(rename = "3")]
    CoordinateWithDriver,
}

#[derive(Debug, Serialize, Copy, Clone, PartialEq, Eq, Derivative)]
#[derivative(Default)]
pub enum DirectionType {
    #[derivative(Default)]
    #[serde(rename = "0")]
    Outbound,
    #[serde(rename = "1")]
    Inbound,
}

#[derive(Serialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Exception {
    #[serde(rename = "1")]
    Added,
    #[serde(rename = "2")]
    Deleted,
}

#[derive(Serialize, Debug, PartialEq, Eq, Hash, Clone, Copy, Derivative)]
#[derivative(Default)]
pub enum TransferType {
    #[derivative(Default)]
    #[serde(rename = "0")]
    Recommended,
    #[serde(rename = "1")]
    Timed,
    #[serde(rename = "2")]
    MinTime,
    #[serde(rename = "3")]
    NotPossible,
    #[serde(rename = "4")]
    InSeat,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct Agency {
    #[serde(rename = "agency_id")]
    pub id: String,
    #[serde(rename = "agency_name")]
    pub name: String,
    #[serde(rename = "agency_url")]
    pub url: String,
    #[serde(rename = "agency_timezone")]
    pub timezone: String,
    #[serde(rename = "agency_lang")]
    pub lang: Option<String>,
    #[serde(rename = "agency_phone")]
    pub phone: Option<String>,
}

impl WithId for Agency {
    const KIND: &'static str = "agency";

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct Stop {
    #[serde(rename = "stop_id")]
    pub id: String,
    #[serde(rename = "stop_name")]
    pub name: String,
    #[serde(rename = "stop_desc")]
    pub description: Option<String>,
    #[serde(rename = "stop_lat")]
    pub latitude: Option<f64>,
    #[serde(rename = "stop_lon")]
    pub longitude: Option<f64>,
    pub location_type: LocationType,
    pub parent_station: Option<String>,
    pub platform_code: Option<String>,
    /// Extended route type of the vehicles serving a stop area
    pub vehicle_type: Option<RouteType>,
}

impl WithId for Stop {
    const KIND: &'static str = "stop";

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct Route {
    #[serde(rename = "route_id")]
    pub id: String,
    pub agency_id: String,
    #[serde(rename = "route_short_name")]
    pub short_name: Option<String>,
    #[serde(rename = "route_long_name")]
    pub long_name: Option<String>,
    #[serde(rename = "route_desc")]
    pub desc: Option<String>,
    pub route_type: RouteType,
    #[serde(serialize_with = "serialize_color")]
    pub route_color: Option<RGB8>,
    #[serde(serialize_with = "serialize_color")]
    pub route_text_color: Option<RGB8>,
}

impl WithId for Route {
    const KIND: &'static str = "route";

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.long_name, &self.short_name) {
            (Some(long_name), _) => write!(f, "{}", long_name),
            (None, Some(short_name)) => write!(f, "{}", short_name),
            (None, None) => write!(f, "{}", self.id),
        }
    }
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct Trip {
    pub route_id: String,
    pub service_id: String,
    #[serde(rename = "trip_id")]
    pub id: String,
    #[serde(rename = "trip_headsign")]
    pub headsign: Option<String>,
    #[serde(rename = "trip_short_name")]
    pub short_name: Option<String>,
    #[serde(rename = "direction_id")]
    pub direction: DirectionType,
    pub shape_id: Option<String>,
    pub wheelchair_accessible: Option<u8>,
}

impl WithId for Trip {
    const KIND: &'static str = "trip";

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "route id: {}, service id: {}",
            self.route_id, self.service_id
        )
    }
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct StopTime {
    pub trip_id: String,
    #[serde(serialize_with = "serialize_time")]
    pub arrival_time: u32,
    #[serde(serialize_with = "serialize_time")]
    pub departure_time: u32,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub stop_headsign: Option<String>,
    pub pickup_type: PickupDropOffType,
    pub drop_off_type: PickupDropOffType,
    /// In meters from the start of the shape
    pub shape_dist_traveled: Option<u32>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ShapePoint {
    #[serde(rename = "shape_id")]
    pub id: String,
    #[serde(rename = "shape_pt_lat")]
    pub latitude: f64,
    #[serde(rename = "shape_pt_lon")]
    pub longitude: f64,
    #[serde(rename = "shape_pt_sequence")]
    pub sequence: usize,
    /// In meters from the first point
    #[serde(rename = "shape_dist_traveled")]
    pub dist_traveled: u32,
}

#[derive(Debug, Serialize, Clone)]
pub struct Calendar {
    #[serde(rename = "service_id")]
    pub id: String,
    #[serde(serialize_with = "serialize_bool")]
    pub monday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub tuesday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub wednesday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub thursday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub friday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub saturday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub sunday: bool,
    #[serde(serialize_with = "serialize_date")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "serialize_date")]
    pub end_date: NaiveDate,
}

impl Calendar {
    pub fn new(id: String, weekdays: WeekdayFlags, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Calendar {
            id,
            monday: weekdays.monday,
            tuesday: weekdays.tuesday,
            wednesday: weekdays.wednesday,
            thursday: weekdays.thursday,
            friday: weekdays.friday,
            saturday: weekdays.saturday,
            sunday: weekdays.sunday,
            start_date,
            end_date,
        }
    }
}

impl WithId for Calendar {
    const KIND: &'static str = "calendar";

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} to {}", self.start_date, self.end_date)
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CalendarDate {
    pub service_id: String,
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub exception_type: Exception,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct Transfer {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub from_trip_id: String,
    pub to_trip_id: String,
    pub transfer_type: TransferType,
    /// In seconds
    pub min_transfer_time: Option<u32>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct FeedInfo {
    #[serde(rename = "feed_publisher_name")]
    pub name: String,
    #[serde(rename = "feed_publisher_url")]
    pub url: String,
    #[serde(rename = "feed_lang")]
    pub lang: String,
    #[serde(serialize_with = "serialize_option_date", rename = "feed_start_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_option_date", rename = "feed_end_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "feed_version")]
    pub version: Option<String>,
}

impl fmt::Display for FeedInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_csv<T: serde::Serialize>(records: &[T]) -> String {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for r in records {
            wtr.serialize(r).unwrap();
        }
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn serialize_route() {
        let route = Route {
            id: "RUT:Line:1".to_owned(),
            agency_id: "RUT:Authority:RUT".to_owned(),
            short_name: Some("1".to_owned()),
            long_name: Some("Central - Airport".to_owned()),
            route_type: RouteType::Other(704),
            route_color: Some(RGB8::new(255, 0, 16)),
            ..Default::default()
        };
        assert_eq!(
            "route_id,agency_id,route_short_name,route_long_name,route_desc,route_type,route_color,route_text_color\n\
             RUT:Line:1,RUT:Authority:RUT,1,Central - Airport,,704,FF0010,\n",
            to_csv(&[route])
        );
    }

    #[test]
    fn serialize_calendar() {
        let calendar = Calendar::new(
            "RUT:DT-Weekdays".to_owned(),
            WeekdayFlags {
                monday: true,
                friday: true,
                ..Default::default()
            },
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        );
        assert_eq!("2024-01-01 to 2024-06-30", calendar.to_string());
        assert_eq!(
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             RUT:DT-Weekdays,1,0,0,0,1,0,0,20240101,20240630\n",
            to_csv(&[calendar])
        );
    }

    #[test]
    fn serialize_stop_time_over_midnight() {
        let stop_time = StopTime {
            trip_id: "T1".to_owned(),
            arrival_time: 86_400 + 600,
            departure_time: 86_400 + 660,
            stop_id: "Q1".to_owned(),
            stop_sequence: 3,
            drop_off_type: PickupDropOffType::CoordinateWithDriver,
            shape_dist_traveled: Some(1250),
            ..Default::default()
        };
        assert_eq!(
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence,stop_headsign,pickup_type,drop_off_type,shape_dist_traveled\n\
             T1,24:10:00,24:11:00,Q1,3,,0,3,1250\n",
            to_csv(&[stop_time])
        );
    }

    #[test]
    fn route_type_codes() {
        assert_eq!(RouteType::Bus, RouteType::from(3));
        assert_eq!(RouteType::Other(1700), RouteType::from(1700));
        assert_eq!(715, RouteType::Other(715).code());
    }
}
