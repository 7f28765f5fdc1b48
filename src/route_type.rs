//! Mapping of the NeTEx transport modes to the GTFS extended route types

use crate::objects::RouteType;
use log::debug;

/// Values of the NeTEx `AllVehicleModesOfTransportEnumeration`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Air,
    Bus,
    Cableway,
    Coach,
    Ferry,
    Funicular,
    Lift,
    Metro,
    Rail,
    SnowAndIce,
    Taxi,
    Tram,
    TrolleyBus,
    Water,
    Other,
    Unknown,
}

impl TransportMode {
    pub fn parse(s: &str) -> TransportMode {
        match s.trim() {
            "air" => TransportMode::Air,
            "bus" => TransportMode::Bus,
            "cableway" | "telecabin" => TransportMode::Cableway,
            "coach" => TransportMode::Coach,
            "ferry" => TransportMode::Ferry,
            "funicular" => TransportMode::Funicular,
            "lift" => TransportMode::Lift,
            "metro" => TransportMode::Metro,
            "rail" => TransportMode::Rail,
            "snowAndIce" => TransportMode::SnowAndIce,
            "taxi" => TransportMode::Taxi,
            "tram" => TransportMode::Tram,
            "trolleyBus" => TransportMode::TrolleyBus,
            "water" => TransportMode::Water,
            "other" | "selfDrive" | "all" | "anyMode" => TransportMode::Other,
            _ => TransportMode::Unknown,
        }
    }
}

/// Generic route type used when nothing matches
pub const MISCELLANEOUS: u16 = 1700;

use TransportMode::*;

// (mode, submode, route type), every mode has a `None` entry used as fallback
static ROUTE_TYPES: &[(TransportMode, Option<&str>, u16)] = &[
    (Air, None, 1100),
    (Air, Some("internationalFlight"), 1101),
    (Air, Some("domesticFlight"), 1102),
    (Air, Some("intercontinentalFlight"), 1103),
    (Air, Some("domesticScheduledFlight"), 1104),
    (Air, Some("shuttleFlight"), 1105),
    (Air, Some("intercontinentalCharterFlight"), 1106),
    (Air, Some("internationalCharterFlight"), 1107),
    (Air, Some("roundTripCharterFlight"), 1108),
    (Air, Some("sightseeingFlight"), 1109),
    (Air, Some("helicopterService"), 1110),
    (Air, Some("domesticCharterFlight"), 1111),
    (Air, Some("SchengenAreaFlight"), 1112),
    (Air, Some("airshipService"), 1113),
    (Bus, None, 700),
    (Bus, Some("regionalBus"), 701),
    (Bus, Some("expressBus"), 702),
    (Bus, Some("localBus"), 704),
    (Bus, Some("nightBus"), 705),
    (Bus, Some("postBus"), 706),
    (Bus, Some("specialNeedsBus"), 707),
    (Bus, Some("mobilityBus"), 708),
    (Bus, Some("mobilityBusForRegisteredDisabled"), 709),
    (Bus, Some("sightseeingBus"), 710),
    (Bus, Some("shuttleBus"), 711),
    (Bus, Some("schoolBus"), 712),
    (Bus, Some("schoolAndPublicServiceBus"), 713),
    (Bus, Some("railReplacementBus"), 714),
    (Bus, Some("demandAndResponseBus"), 715),
    (Bus, Some("airportLinkBus"), 700),
    (Cableway, None, 1300),
    (Cableway, Some("telecabin"), 1301),
    (Cableway, Some("cableCar"), 1302),
    (Cableway, Some("lift"), 1303),
    (Cableway, Some("chairLift"), 1304),
    (Cableway, Some("dragLift"), 1305),
    (Cableway, Some("telecabinLink"), 1306),
    (Coach, None, 200),
    (Coach, Some("internationalCoach"), 201),
    (Coach, Some("nationalCoach"), 202),
    (Coach, Some("shuttleCoach"), 203),
    (Coach, Some("regionalCoach"), 204),
    (Coach, Some("specialCoach"), 205),
    (Coach, Some("sightseeingCoach"), 206),
    (Coach, Some("touristCoach"), 207),
    (Coach, Some("commuterCoach"), 208),
    (Ferry, None, 1000),
    (Funicular, None, 1400),
    (Funicular, Some("funicular"), 1401),
    (Funicular, Some("allFunicularServices"), 1402),
    (Lift, None, 1300),
    (Metro, None, 401),
    (Metro, Some("metro"), 401),
    (Metro, Some("tube"), 402),
    (Metro, Some("urbanRailway"), 403),
    (Rail, None, 100),
    (Rail, Some("highSpeedRail"), 101),
    (Rail, Some("longDistance"), 102),
    (Rail, Some("international"), 102),
    (Rail, Some("interregionalRail"), 103),
    (Rail, Some("carTransportRailService"), 104),
    (Rail, Some("sleeperRailService"), 105),
    (Rail, Some("regionalRail"), 106),
    (Rail, Some("touristRailway"), 107),
    (Rail, Some("railShuttle"), 108),
    (Rail, Some("suburbanRailway"), 109),
    (Rail, Some("replacementRailService"), 110),
    (Rail, Some("specialTrain"), 111),
    (Rail, Some("crossCountryRail"), 114),
    (Rail, Some("rackAndPinionRailway"), 116),
    (Rail, Some("airportLinkRail"), 100),
    (Rail, Some("local"), 100),
    (SnowAndIce, None, MISCELLANEOUS),
    (Taxi, None, 1500),
    (Taxi, Some("communalTaxi"), 1501),
    (Taxi, Some("waterTaxi"), 1502),
    (Taxi, Some("railTaxi"), 1503),
    (Taxi, Some("bikeTaxi"), 1504),
    (Taxi, Some("blackCab"), 1505),
    (Taxi, Some("miniCab"), 1506),
    (Taxi, Some("allTaxiServices"), 1507),
    (Tram, None, 900),
    (Tram, Some("cityTram"), 901),
    (Tram, Some("localTram"), 902),
    (Tram, Some("regionalTram"), 903),
    (Tram, Some("sightseeingTram"), 904),
    (Tram, Some("shuttleTram"), 905),
    (TrolleyBus, None, 800),
    (Water, None, 1000),
    (Water, Some("internationalCarFerry"), 1001),
    (Water, Some("nationalCarFerry"), 1002),
    (Water, Some("regionalCarFerry"), 1003),
    (Water, Some("localCarFerry"), 1004),
    (Water, Some("internationalPassengerFerry"), 1005),
    (Water, Some("nationalPassengerFerry"), 1006),
    (Water, Some("regionalPassengerFerry"), 1007),
    (Water, Some("localPassengerFerry"), 1008),
    (Water, Some("postBoat"), 1009),
    (Water, Some("trainFerry"), 1010),
    (Water, Some("roadFerryLink"), 1011),
    (Water, Some("airportBoatLink"), 1012),
    (Water, Some("highSpeedVehicleService"), 1013),
    (Water, Some("highSpeedPassengerService"), 1014),
    (Water, Some("sightseeingService"), 1015),
    (Water, Some("schoolBoat"), 1016),
    (Water, Some("cableFerry"), 1017),
    (Water, Some("riverBus"), 1018),
    (Water, Some("scheduledFerry"), 1019),
    (Water, Some("shuttleFerryService"), 1020),
    (Other, None, MISCELLANEOUS),
];

fn lookup(mode: TransportMode, submode: Option<&str>) -> Option<u16> {
    ROUTE_TYPES
        .iter()
        .find(|(m, s, _)| *m == mode && *s == submode)
        .map(|(_, _, code)| *code)
}

/// Route type of a mode and submode
///
/// The exact (mode, submode) pair is looked up first, then the mode alone. Unknown modes are
/// classified as miscellaneous.
pub fn classify(mode: TransportMode, submode: Option<&str>) -> RouteType {
    let code = submode
        .and_then(|s| lookup(mode, Some(s)))
        .or_else(|| {
            if let Some(s) = submode {
                debug!("no route type for submode {} of {:?}", s, mode);
            }
            lookup(mode, None)
        })
        .unwrap_or(MISCELLANEOUS);
    RouteType::from(code)
}

/// Same as [classify] for the raw NeTEx values, a missing mode being unknown
pub fn classify_netex(mode: Option<&str>, submode: Option<&str>) -> RouteType {
    let mode = mode.map(TransportMode::parse).unwrap_or(Unknown);
    classify(mode, submode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        assert_eq!(RouteType::Other(704), classify(Bus, Some("localBus")));
        assert_eq!(RouteType::Other(1301), classify(Cableway, Some("telecabin")));
        assert_eq!(RouteType::Other(402), classify(Metro, Some("tube")));
    }

    #[test]
    fn mode_fallback() {
        assert_eq!(RouteType::Other(700), classify(Bus, Some("hoverBus")));
        assert_eq!(RouteType::Other(700), classify(Bus, None));
        assert_eq!(RouteType::Other(1000), classify(Ferry, Some("localCarFerry")));
        assert_eq!(RouteType::Other(800), classify_netex(Some("trolleyBus"), None));
    }

    #[test]
    fn generic_fallback() {
        assert_eq!(RouteType::Other(MISCELLANEOUS), classify(Unknown, None));
        assert_eq!(
            RouteType::Other(MISCELLANEOUS),
            classify_netex(Some("hovercraft"), Some("localBus"))
        );
        assert_eq!(RouteType::Other(MISCELLANEOUS), classify_netex(None, None));
    }

    #[test]
    fn every_table_entry_is_classified() {
        for (mode, submode, code) in ROUTE_TYPES {
            assert_eq!(
                RouteType::from(*code),
                classify(*mode, *submode),
                "{:?} {:?}",
                mode,
                submode
            );
        }
    }

    #[test]
    fn every_mode_has_a_fallback() {
        for mode in &[
            Air, Bus, Cableway, Coach, Ferry, Funicular, Lift, Metro, Rail, SnowAndIce, Taxi,
            Tram, TrolleyBus, Water, Other,
        ] {
            assert!(lookup(*mode, None).is_some(), "{:?}", mode);
        }
    }
}
