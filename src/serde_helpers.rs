use chrono::NaiveDate;
use rgb::RGB8;
use serde::ser::Serializer;

pub fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format("%Y%m%d").to_string())
}

pub fn serialize_option_date<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        None => serializer.serialize_none(),
        Some(d) => serialize_date(d, serializer),
    }
}

pub fn parse_time_impl(h: &str, m: &str, s: &str) -> Result<u32, std::num::ParseIntError> {
    let hours: u32 = h.parse()?;
    let minutes: u32 = m.parse()?;
    let seconds: u32 = s.parse()?;
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Parses a `HH:MM:SS` xsd:time into seconds since midnight
///
/// Fractional seconds and time zone designators are ignored.
pub fn parse_time(s: &str) -> Result<u32, crate::Error> {
    let mk_err = || crate::Error::InvalidTime(s.to_owned());

    let s = s.trim();
    let s = s
        .split(|c: char| c == '.' || c == 'Z' || c == '+')
        .next()
        .unwrap_or_default();
    if s.len() < 7 {
        Err(mk_err())
    } else {
        let mut parts = s.split(':');

        let hour = parts.next().ok_or_else(mk_err)?;
        let min = parts.next().ok_or_else(mk_err)?;
        let sec = parts.next().ok_or_else(mk_err)?;
        if parts.next().is_some() {
            return Err(mk_err());
        }

        if min.len() != 2 || sec.len() != 2 {
            return Err(mk_err());
        }

        parse_time_impl(hour, min, sec).map_err(|_| mk_err())
    }
}

/// Parses a xsd:date or the date part of a xsd:dateTime
pub fn parse_date(s: &str) -> Result<NaiveDate, crate::Error> {
    let s = s.trim();
    let date_part = s.get(0..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| crate::Error::InvalidDate(s.to_owned()))
}

/// Parses the time part of a xsd:duration (`PT1H30M`, `PT90S`...) into seconds
pub fn parse_duration(s: &str) -> Result<u32, crate::Error> {
    let mk_err = || crate::Error::InvalidDuration(s.to_owned());
    let rest = s.trim().strip_prefix('P').ok_or_else(mk_err)?;
    let (days, time) = match rest.split_once('T') {
        Some((days, time)) => (days, time),
        None => (rest, ""),
    };
    let mut total = 0u32;
    if !days.is_empty() {
        let d: u32 = days
            .strip_suffix('D')
            .and_then(|d| d.parse().ok())
            .ok_or_else(mk_err)?;
        total += d * 86_400;
    }
    let mut number = String::new();
    for c in time.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' | 'M' | 'S' => {
                let value: f64 = number.parse().map_err(|_| mk_err())?;
                let factor = match c {
                    'H' => 3600.,
                    'M' => 60.,
                    _ => 1.,
                };
                total += (value * factor).round() as u32;
                number.clear();
            }
            _ => return Err(mk_err()),
        }
    }
    if !number.is_empty() {
        return Err(mk_err());
    }
    Ok(total)
}

pub fn serialize_time<S>(time: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(
        format!(
            "{:02}:{:02}:{:02}",
            time / 3600,
            time % 3600 / 60,
            time % 60
        )
        .as_str(),
    )
}

pub fn parse_color(s: &str) -> Result<RGB8, crate::Error> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        return Err(crate::Error::InvalidColor(s.to_owned()));
    }
    let r =
        u8::from_str_radix(&s[0..2], 16).map_err(|_| crate::Error::InvalidColor(s.to_owned()))?;
    let g =
        u8::from_str_radix(&s[2..4], 16).map_err(|_| crate::Error::InvalidColor(s.to_owned()))?;
    let b =
        u8::from_str_radix(&s[4..6], 16).map_err(|_| crate::Error::InvalidColor(s.to_owned()))?;
    Ok(RGB8::new(r, g, b))
}

pub fn serialize_color<S>(color: &Option<RGB8>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match color {
        None => serializer.serialize_none(),
        Some(color) => serializer
            .serialize_str(format!("{:02X}{:02X}{:02X}", color.r, color.g, color.b).as_str()),
    }
}

pub fn serialize_bool<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

#[test]
fn test_serialize_time() {
    #[derive(Serialize)]
    struct Test {
        #[serde(serialize_with = "serialize_time")]
        time: u32,
    }
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.serialize(Test {
        time: parse_time("01:01:01").unwrap(),
    })
    .unwrap();
    wtr.serialize(Test {
        time: parse_time("23:35:42").unwrap() + 86400,
    })
    .unwrap();
    let data_out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!("time\n01:01:01\n47:35:42\n", data_out);
}

#[test]
fn test_parse_time() {
    assert_eq!(Ok(3600 + 60 + 1), parse_time("01:01:01").map_err(|_| ()));
    assert_eq!(Ok(8 * 3600), parse_time("08:00:00.000").map_err(|_| ()));
    assert!(parse_time("8:0:0").is_err());
    assert!(parse_time("tomorrow").is_err());
}

#[test]
fn test_parse_date() {
    assert_eq!(
        NaiveDate::from_ymd_opt(2024, 3, 1),
        parse_date("2024-03-01").ok()
    );
    assert_eq!(
        NaiveDate::from_ymd_opt(2024, 3, 1),
        parse_date("2024-03-01T00:00:00").ok()
    );
    assert!(parse_date("01/03/2024").is_err());
}

#[test]
fn test_parse_duration() {
    assert_eq!(120, parse_duration("PT2M").unwrap());
    assert_eq!(5400, parse_duration("PT1H30M").unwrap());
    assert_eq!(45, parse_duration("PT45S").unwrap());
    assert_eq!(86_400 + 60, parse_duration("P1DT1M").unwrap());
    assert!(parse_duration("2 minutes").is_err());
    assert!(parse_duration("PT2").is_err());
}

#[test]
fn test_parse_color() {
    assert_eq!(RGB8::new(255, 0, 16), parse_color("FF0010").unwrap());
    assert_eq!(RGB8::new(0, 0, 0), parse_color("#000000").unwrap());
    assert!(parse_color("red").is_err());
}
