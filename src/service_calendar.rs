//! Services synthesized from the NeTEx calendars
//!
//! A GTFS trip runs on a service. In NeTEx a journey runs either on a set of day types, each
//! assigned to operating periods, operating days or dates, or on a set of operating days through
//! its dated service journeys. Every distinct set gives exactly one service.

use crate::netex::objects::{AssignmentTarget, PeriodBound, WeekdayFlags};
use crate::netex::NetexDatasetIndex;
use chrono::{Duration, NaiveDate};
use itertools::Itertools;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

/// Longest service key kept as is
pub const MAX_KEY_LENGTH: usize = 256;
const KEPT_PREFIX_LENGTH: usize = 245;
const HASH_LENGTH: usize = 10;

const DAY_TYPES_TAG: &str = "DT";
const OPERATING_DAYS_TAG: &str = "OD";

/// A synthesized service, with everything needed to write its calendar and calendar dates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GtfsService {
    pub id: String,
    pub weekdays: WeekdayFlags,
    /// Hull of the operating periods, `None` when the service has no periods
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub added: BTreeSet<NaiveDate>,
    pub removed: BTreeSet<NaiveDate>,
}

/// Canonical key of a set of calendar entities
///
/// The short ids (after the last `:`) are sorted and joined. Overlong keys are truncated and
/// completed with a hash of the truncated part. Two sets sharing the same truncated prefix and
/// tail hash would get the same key.
pub fn service_key(tag: &str, ids: &[&str]) -> String {
    let short_ids = ids
        .iter()
        .map(|id| id.rsplit(':').next().unwrap_or(*id))
        .sorted()
        .dedup()
        .join("-");
    let key = format!("{}-{}", tag, short_ids);
    if key.chars().count() <= MAX_KEY_LENGTH {
        return key;
    }
    let prefix: String = key.chars().take(KEPT_PREFIX_LENGTH).collect();
    let tail: String = key.chars().skip(KEPT_PREFIX_LENGTH).collect();
    let hash = format!("{:x}", Sha256::digest(tail.as_bytes()));
    format!("{}-{}", prefix, &hash[..HASH_LENGTH])
}

struct ServicePeriod {
    weekdays: WeekdayFlags,
    from: NaiveDate,
    to: NaiveDate,
}

impl ServicePeriod {
    fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to && self.weekdays.valid_weekday(date)
    }
}

fn days(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let total_days = to.signed_duration_since(from).num_days();
    (0..=total_days).map(move |offset| from + Duration::days(offset))
}

fn bound_date(index: &NetexDatasetIndex, bound: &PeriodBound) -> Option<NaiveDate> {
    match bound {
        PeriodBound::Date(date) => Some(*date),
        PeriodBound::OperatingDay(id) => index.operating_day(id).map(|d| d.calendar_date),
    }
}

fn build_day_type_service(
    index: &NetexDatasetIndex,
    id: String,
    day_type_ids: &[&str],
) -> GtfsService {
    let mut weekdays = WeekdayFlags::default();
    let mut periods = Vec::new();
    let mut included = BTreeSet::new();
    let mut excluded = BTreeSet::new();

    for day_type_id in day_type_ids.iter().sorted().dedup() {
        let day_type = match index.day_type(day_type_id) {
            Some(d) => d,
            None => {
                warn!("service {}: unknown day type {}", id, day_type_id);
                continue;
            }
        };
        let day_type_weekdays = WeekdayFlags::from_days_of_week(&day_type.days_of_week);
        weekdays = weekdays.union(day_type_weekdays);

        for assignment in index.assignments_for_day_type(day_type_id) {
            let date = match &assignment.target {
                AssignmentTarget::Date(date) => Some(*date),
                AssignmentTarget::OperatingDay(operating_day_id) => {
                    let date = index
                        .operating_day(operating_day_id)
                        .map(|d| d.calendar_date);
                    if date.is_none() {
                        warn!(
                            "day type assignment {}: unknown operating day {}",
                            assignment.id, operating_day_id
                        );
                    }
                    date
                }
                AssignmentTarget::OperatingPeriod(period_id) => {
                    let bounds = index.operating_period(period_id).and_then(|p| {
                        Some((bound_date(index, &p.from)?, bound_date(index, &p.to)?))
                    });
                    match bounds {
                        Some((from, to)) if from <= to => {
                            let period = ServicePeriod {
                                weekdays: day_type_weekdays,
                                from,
                                to,
                            };
                            if assignment.is_available {
                                periods.push(period);
                            } else {
                                excluded.extend(days(from, to).filter(|d| period.contains(*d)));
                            }
                        }
                        Some(_) => warn!("operating period {} ends before it starts", period_id),
                        None => warn!(
                            "day type assignment {}: operating period {} cannot be resolved",
                            assignment.id, period_id
                        ),
                    }
                    None
                }
            };
            match date {
                Some(date) if assignment.is_available => {
                    included.insert(date);
                }
                Some(date) => {
                    excluded.insert(date);
                }
                None => {}
            }
        }
    }

    let period = periods
        .iter()
        .map(|p| (p.from, p.to))
        .reduce(|(from, to), (f, t)| (from.min(f), to.max(t)));

    let added: BTreeSet<NaiveDate> = included.difference(&excluded).copied().collect();
    let mut removed = excluded;
    if let Some((from, to)) = period {
        // dates matching the weekdays of the service but none of its periods
        let gaps = days(from, to).filter(|d| {
            weekdays.valid_weekday(*d)
                && !periods.iter().any(|p| p.contains(*d))
                && !added.contains(d)
        });
        removed.extend(gaps);
    }

    GtfsService {
        id,
        weekdays,
        period,
        added,
        removed,
    }
}

fn build_operating_day_service(
    index: &NetexDatasetIndex,
    id: String,
    operating_day_ids: &[&str],
) -> GtfsService {
    let mut added = BTreeSet::new();
    for operating_day_id in operating_day_ids {
        match index.operating_day(operating_day_id) {
            Some(operating_day) => {
                added.insert(operating_day.calendar_date);
            }
            None => warn!("service {}: unknown operating day {}", id, operating_day_id),
        }
    }
    GtfsService {
        id,
        weekdays: WeekdayFlags::default(),
        period: None,
        added,
        removed: BTreeSet::new(),
    }
}

#[derive(Default)]
struct ServiceCache {
    by_key: HashMap<String, Arc<GtfsService>>,
    services: Vec<Arc<GtfsService>>,
}

/// Creates the services and remembers them for the whole conversion
pub struct GtfsServiceRepository {
    codespace: String,
    cache: Mutex<ServiceCache>,
}

impl GtfsServiceRepository {
    pub fn new(codespace: &str) -> Self {
        GtfsServiceRepository {
            codespace: codespace.to_owned(),
            cache: Mutex::new(ServiceCache::default()),
        }
    }

    fn lookup_or_create<F>(&self, key: String, build: F) -> Arc<GtfsService>
    where
        F: FnOnce(String) -> GtfsService,
    {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(service) = cache.by_key.get(&key) {
            return Arc::clone(service);
        }
        let id = format!("{}:{}", self.codespace, key);
        debug!("creating service {}", id);
        let service = Arc::new(build(id));
        cache.services.push(Arc::clone(&service));
        cache.by_key.insert(key, Arc::clone(&service));
        service
    }

    /// Service running on the given day types, in any order
    pub fn service_for_day_types(
        &self,
        index: &NetexDatasetIndex,
        day_type_ids: &[&str],
    ) -> Arc<GtfsService> {
        let key = service_key(DAY_TYPES_TAG, day_type_ids);
        self.lookup_or_create(key, |id| build_day_type_service(index, id, day_type_ids))
    }

    /// Service running on the given operating days, in any order
    pub fn service_for_operating_days(
        &self,
        index: &NetexDatasetIndex,
        operating_day_ids: &[&str],
    ) -> Arc<GtfsService> {
        let key = service_key(OPERATING_DAYS_TAG, operating_day_ids);
        self.lookup_or_create(key, |id| {
            build_operating_day_service(index, id, operating_day_ids)
        })
    }

    /// All the services, in creation order
    pub fn services(&self) -> Vec<Arc<GtfsService>> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .services
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netex::objects::*;
    use crate::netex::NetexData;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn add_day_type(data: &mut NetexData, id: &str, days: Vec<DayOfWeek>) {
        data.day_types
            .insert(DayType {
                id: id.to_owned(),
                days_of_week: days,
            })
            .unwrap();
    }

    fn assign(data: &mut NetexData, day_type: &str, target: AssignmentTarget, is_available: bool) {
        let order = data.day_type_assignments.len() as u32;
        data.day_type_assignments
            .insert(DayTypeAssignment {
                id: format!("DTA{}", order),
                order,
                day_type_ref: day_type.to_owned(),
                target,
                is_available,
            })
            .unwrap();
    }

    fn add_period(data: &mut NetexData, id: &str, from: NaiveDate, to: NaiveDate) {
        data.operating_periods
            .insert(OperatingPeriod {
                id: id.to_owned(),
                from: PeriodBound::Date(from),
                to: PeriodBound::Date(to),
            })
            .unwrap();
    }

    #[test]
    fn keys_are_sorted_short_ids() {
        assert_eq!(
            "DT-Saturday-Weekdays",
            service_key("DT", &["RUT:DayType:Weekdays", "RUT:DayType:Saturday"])
        );
        assert_eq!(
            service_key("DT", &["A:B:1", "A:B:2"]),
            service_key("DT", &["A:B:2", "A:B:1"])
        );
        assert_eq!("OD-2024-05-17", service_key("OD", &["2024-05-17"]));
    }

    #[test]
    fn long_keys_are_hashed() {
        let ids: Vec<String> = (0..100).map(|i| format!("RUT:DayType:{:05}", i)).collect();
        let refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
        let key = service_key("DT", &refs);
        assert_eq!(KEPT_PREFIX_LENGTH + 1 + HASH_LENGTH, key.len());
        assert!(key.starts_with("DT-00000-00001"));
        assert_eq!(key, service_key("DT", &refs));

        let mut other = refs.clone();
        other.pop();
        assert_ne!(key, service_key("DT", &other));
    }

    #[test]
    fn same_day_types_give_the_same_service() {
        let mut data = NetexData::default();
        add_day_type(&mut data, "RUT:DayType:1", vec![DayOfWeek::Monday]);
        add_day_type(&mut data, "RUT:DayType:2", vec![DayOfWeek::Tuesday]);
        let index = NetexDatasetIndex::new(&data);
        let repository = GtfsServiceRepository::new("RUT");

        let s1 = repository.service_for_day_types(&index, &["RUT:DayType:1", "RUT:DayType:2"]);
        let s2 = repository.service_for_day_types(&index, &["RUT:DayType:2", "RUT:DayType:1"]);
        let s3 = repository.service_for_day_types(&index, &["RUT:DayType:1"]);
        assert!(Arc::ptr_eq(&s1, &s2));
        assert_eq!("RUT:DT-1-2", s1.id);
        assert_ne!(s1.id, s3.id);
        let ids: Vec<String> = repository.services().iter().map(|s| s.id.clone()).collect();
        assert_eq!(vec!["RUT:DT-1-2", "RUT:DT-1"], ids);
    }

    #[test]
    fn day_types_with_periods_and_exceptions() {
        let mut data = NetexData::default();
        add_day_type(&mut data, "DT:Weekdays", vec![DayOfWeek::Weekdays]);
        add_day_type(&mut data, "DT:Saturday", vec![DayOfWeek::Saturday]);
        add_period(&mut data, "OP:1", date(1, 1), date(1, 14));
        add_period(&mut data, "OP:2", date(1, 1), date(1, 31));
        assign(&mut data, "DT:Weekdays", AssignmentTarget::OperatingPeriod("OP:1".into()), true);
        assign(&mut data, "DT:Saturday", AssignmentTarget::OperatingPeriod("OP:2".into()), true);
        // holiday on Monday the 8th, extra Sunday the 21st, excluded and included the 9th
        assign(&mut data, "DT:Weekdays", AssignmentTarget::Date(date(1, 8)), false);
        assign(&mut data, "DT:Saturday", AssignmentTarget::Date(date(1, 21)), true);
        assign(&mut data, "DT:Weekdays", AssignmentTarget::Date(date(1, 9)), true);
        assign(&mut data, "DT:Weekdays", AssignmentTarget::Date(date(1, 9)), false);

        let index = NetexDatasetIndex::new(&data);
        let repository = GtfsServiceRepository::new("RUT");
        let service = repository.service_for_day_types(&index, &["DT:Weekdays", "DT:Saturday"]);

        assert_eq!(Some((date(1, 1), date(1, 31))), service.period);
        assert!(service.weekdays.monday && service.weekdays.saturday);
        assert!(!service.weekdays.sunday);
        assert_eq!(vec![date(1, 21)], service.added.iter().copied().collect::<Vec<_>>());
        assert!(service.removed.contains(&date(1, 8)));
        assert!(service.removed.contains(&date(1, 9)));
        // weekdays after the 14th are outside the weekday period
        assert!(service.removed.contains(&date(1, 15)));
        assert!(service.removed.contains(&date(1, 31)));
        // saturdays are all covered
        assert!(!service.removed.contains(&date(1, 20)));
        assert!(!service.removed.contains(&date(1, 10)));
    }

    #[test]
    fn day_types_without_days_of_week_run_everyday() {
        let mut data = NetexData::default();
        add_day_type(&mut data, "DT:1", vec![]);
        data.operating_days
            .insert(OperatingDay {
                id: "OD:1".to_owned(),
                calendar_date: date(3, 1),
            })
            .unwrap();
        data.operating_days
            .insert(OperatingDay {
                id: "OD:2".to_owned(),
                calendar_date: date(3, 31),
            })
            .unwrap();
        data.operating_periods
            .insert(OperatingPeriod {
                id: "OP:1".to_owned(),
                from: PeriodBound::OperatingDay("OD:1".to_owned()),
                to: PeriodBound::OperatingDay("OD:2".to_owned()),
            })
            .unwrap();
        assign(&mut data, "DT:1", AssignmentTarget::OperatingPeriod("OP:1".into()), true);

        let index = NetexDatasetIndex::new(&data);
        let service = GtfsServiceRepository::new("RUT").service_for_day_types(&index, &["DT:1"]);
        assert_eq!(WeekdayFlags::everyday(), service.weekdays);
        assert_eq!(Some((date(3, 1), date(3, 31))), service.period);
        assert!(service.removed.is_empty());
        assert!(service.added.is_empty());
    }

    #[test]
    fn operating_days_only_add_dates() {
        let mut data = NetexData::default();
        for (id, d) in &[("OD:1", 17), ("OD:2", 18)] {
            data.operating_days
                .insert(OperatingDay {
                    id: id.to_string(),
                    calendar_date: date(5, *d),
                })
                .unwrap();
        }
        let index = NetexDatasetIndex::new(&data);
        let repository = GtfsServiceRepository::new("RUT");
        let service = repository.service_for_operating_days(&index, &["OD:2", "OD:1", "OD:3"]);
        assert_eq!("RUT:OD-1-2-3", service.id);
        assert_eq!(None, service.period);
        assert_eq!(2, service.added.len());
        assert!(service.removed.is_empty());
    }
}
