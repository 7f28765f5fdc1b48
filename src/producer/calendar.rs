use crate::objects::{Calendar, CalendarDate, Exception};
use crate::service_calendar::GtfsService;

/// Calendar and calendar dates of a service
///
/// Only services built on operating periods have a calendar, the others are defined by their
/// added dates.
pub fn produce_calendar(service: &GtfsService) -> (Option<Calendar>, Vec<CalendarDate>) {
    let calendar = service
        .period
        .map(|(start, end)| Calendar::new(service.id.clone(), service.weekdays, start, end));
    let added = service.added.iter().map(|date| CalendarDate {
        service_id: service.id.clone(),
        date: *date,
        exception_type: Exception::Added,
    });
    let removed = service.removed.iter().map(|date| CalendarDate {
        service_id: service.id.clone(),
        date: *date,
        exception_type: Exception::Deleted,
    });
    // chronological order, a date cannot be both added and removed
    let mut dates: Vec<CalendarDate> = added.chain(removed).collect();
    dates.sort_by_key(|d| d.date);
    (calendar, dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netex::objects::WeekdayFlags;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn calendar_and_dates() {
        let service = GtfsService {
            id: "RUT:DT-1".to_owned(),
            weekdays: WeekdayFlags::everyday(),
            period: Some((date(1), date(31))),
            added: vec![date(20)].into_iter().collect(),
            removed: vec![date(17), date(25)].into_iter().collect(),
        };
        let (calendar, dates) = produce_calendar(&service);
        let calendar = calendar.unwrap();
        assert_eq!(date(1), calendar.start_date);
        assert!(calendar.sunday);
        let dates: Vec<(NaiveDate, Exception)> =
            dates.iter().map(|d| (d.date, d.exception_type)).collect();
        assert_eq!(
            vec![
                (date(17), Exception::Deleted),
                (date(20), Exception::Added),
                (date(25), Exception::Deleted)
            ],
            dates
        );
    }

    #[test]
    fn no_calendar_without_period() {
        let service = GtfsService {
            id: "RUT:OD-1".to_owned(),
            weekdays: WeekdayFlags::default(),
            period: None,
            added: vec![date(20)].into_iter().collect(),
            removed: Default::default(),
        };
        let (calendar, dates) = produce_calendar(&service);
        assert!(calendar.is_none());
        assert_eq!(1, dates.len());
    }
}
