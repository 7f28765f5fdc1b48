use super::objects::*;
use super::xml::ElementExt;
use crate::collection::{Collection, WithId};
use crate::serde_helpers::{parse_date, parse_duration, parse_time};
use crate::{Error, Result};
use chrono::Utc;
use log::{debug, info, warn};
use minidom::Element;
use sha2::digest::Digest;
use sha2::Sha256;
use std::convert::TryFrom;
use std::fs::File;
use std::io::Read;
use std::num::ParseFloatError;
use std::path::Path;

/// All the NeTEx entities read from one or several XML documents
///
/// The same structure holds the timetable dataset and the stop area dataset, only the relevant
/// collections are filled in each case.
#[derive(Debug, Default)]
pub struct NetexData {
    /// Time needed to read and parse the documents in milliseconds
    pub read_duration: i64,
    pub authorities: Collection<Authority>,
    pub networks: Collection<Network>,
    pub groups_of_lines: Collection<GroupOfLines>,
    pub lines: Collection<Line>,
    pub routes: Collection<Route>,
    pub journey_patterns: Collection<JourneyPattern>,
    pub service_links: Collection<ServiceLink>,
    pub service_journeys: Collection<ServiceJourney>,
    pub dated_service_journeys: Collection<DatedServiceJourney>,
    pub day_types: Collection<DayType>,
    pub day_type_assignments: Collection<DayTypeAssignment>,
    pub operating_days: Collection<OperatingDay>,
    pub operating_periods: Collection<OperatingPeriod>,
    pub interchanges: Collection<ServiceJourneyInterchange>,
    pub destination_displays: Collection<DestinationDisplay>,
    pub passenger_stop_assignments: Collection<PassengerStopAssignment>,
    pub flexible_stop_assignments: Collection<FlexibleStopAssignment>,
    pub flexible_stop_places: Collection<FlexibleStopPlace>,
    pub stop_places: Collection<StopPlace>,
    pub quays: Collection<Quay>,
    /// Defaults of every top level frame, in reading order
    pub frame_defaults: Vec<FrameDefaults>,
    /// All files that were read
    pub files: Vec<String>,
    /// sha256 sum of the archive, when read from an archive
    pub sha256: Option<String>,
}

/// Keeps the first definition of an entity
///
/// Shared data is commonly repeated in every line file of a dataset.
fn insert_first<T: WithId>(collection: &mut Collection<T>, o: T) {
    if let Err(e) = collection.insert(o) {
        debug!("{}, keeping the first definition", e);
    }
}

fn read_content<T: Read>(mut reader: T, file_name: &str) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::NamedFileIO {
            file_name: file_name.to_owned(),
            source: Box::new(e),
        })?;
    // Some producers add a BOM we do not want in the xml prolog
    let bytes = bytes
        .strip_prefix(&[0xefu8, 0xbbu8, 0xbfu8])
        .unwrap_or(&bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::NamedFileIO {
        file_name: file_name.to_owned(),
        source: Box::new(e),
    })
}

/// Reading order of the documents: shared data files (prefixed with `_`) first, then by name
fn reading_order(name: &str) -> (bool, String) {
    let file_name = Path::new(name)
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    (!file_name.starts_with('_'), name.to_owned())
}

fn is_xml_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xml"))
        .unwrap_or(false)
}

impl NetexData {
    /// Logs some basic statistics about the dataset. Mostly to be sure that everything was read
    pub fn print_stats(&self) {
        info!("NeTEx data read in {} ms", self.read_duration);
        info!("  Files: {}", self.files.len());
        info!("  Authorities: {}", self.authorities.len());
        info!("  Networks: {}", self.networks.len());
        info!("  Lines: {}", self.lines.len());
        info!("  Routes: {}", self.routes.len());
        info!("  Journey patterns: {}", self.journey_patterns.len());
        info!("  Service journeys: {}", self.service_journeys.len());
        info!(
            "  Dated service journeys: {}",
            self.dated_service_journeys.len()
        );
        info!("  Day types: {}", self.day_types.len());
        info!("  Interchanges: {}", self.interchanges.len());
        info!("  Stop places: {}", self.stop_places.len());
        info!("  Quays: {}", self.quays.len());
    }

    /// Reads from an url (if starts with http), or a local path (either a directory, a zip archive or a xml file)
    ///
    /// To read from an url, build with read-url feature
    #[cfg(feature = "read-url")]
    pub fn new(netex: &str) -> Result<Self> {
        if netex.starts_with("http") {
            Self::from_url(netex)
        } else {
            Self::from_path(netex)
        }
    }

    #[cfg(not(feature = "read-url"))]
    pub fn new(netex: &str) -> Result<Self> {
        Self::from_path(netex)
    }

    /// Reads a local zip archive, a local directory of xml files, or a single xml file
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let p = path.as_ref();
        if p.is_file() {
            if is_xml_file(&p.to_string_lossy()) {
                let now = Utc::now();
                let mut data = Self::default();
                let file_name = p.to_string_lossy().to_string();
                let content = read_content(File::open(p)?, &file_name)?;
                data.read_document(&content, &file_name)?;
                data.read_duration = Utc::now().signed_duration_since(now).num_milliseconds();
                Ok(data)
            } else {
                Self::from_reader(File::open(p)?)
            }
        } else if p.is_dir() {
            Self::from_directory(p)
        } else {
            Err(Error::NotFileNorDirectory(format!("{}", p.display())))
        }
    }

    fn from_directory(p: &Path) -> Result<Self> {
        let now = Utc::now();
        let mut paths: Vec<_> = std::fs::read_dir(p)?
            .filter_map(|d| d.ok().map(|d| d.path()))
            .filter(|p| p.is_file() && is_xml_file(&p.to_string_lossy()))
            .collect();
        paths.sort_by_cached_key(|p| reading_order(&p.to_string_lossy()));

        let mut data = Self::default();
        for path in paths {
            let file_name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("invalid_file_name")
                .to_string();
            let file = File::open(&path).map_err(|e| Error::NamedFileIO {
                file_name: file_name.clone(),
                source: Box::new(e),
            })?;
            let content = read_content(file, &file_name)?;
            data.read_document(&content, &file_name)?;
        }
        data.read_duration = Utc::now().signed_duration_since(now).num_milliseconds();
        Ok(data)
    }

    /// Reads the NeTEx from a remote url
    ///
    /// The library must be built with the read-url feature
    #[cfg(feature = "read-url")]
    pub fn from_url<U: reqwest::IntoUrl>(url: U) -> Result<Self> {
        let mut res = reqwest::blocking::get(url)?;
        let mut body = Vec::new();
        res.read_to_end(&mut body)?;
        let cursor = std::io::Cursor::new(body);
        Self::from_reader(cursor)
    }

    /// Non-blocking read of the NeTEx from a remote url
    ///
    /// The library must be built with the read-url feature
    #[cfg(feature = "read-url")]
    pub async fn from_url_async<U: reqwest::IntoUrl>(url: U) -> Result<Self> {
        let res: bytes::Bytes = reqwest::get(url).await?.bytes().await?;

        let reader = std::io::Cursor::new(res);
        Self::from_reader(reader)
    }

    /// Reads a zip archive of xml documents
    ///
    /// Entries are read in a fixed order so that the result does not depend on how the archive was
    /// built
    pub fn from_reader<T: std::io::Read + std::io::Seek>(reader: T) -> Result<Self> {
        let now = Utc::now();
        let mut hasher = Sha256::new();
        let mut buf_reader = std::io::BufReader::new(reader);
        let _n = std::io::copy(&mut buf_reader, &mut hasher)?;
        let hash = hasher.finalize();
        let mut archive = zip::ZipArchive::new(buf_reader)?;

        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let archive_file = archive.by_index(i)?;
            if archive_file.is_file() && is_xml_file(archive_file.name()) {
                entries.push((archive_file.name().to_owned(), i));
            }
        }
        entries.sort_by_cached_key(|(name, _)| reading_order(name));

        let mut data = Self::default();
        for (file_name, i) in entries {
            let archive_file = archive.by_index(i).map_err(|e| Error::NamedFileIO {
                file_name: file_name.clone(),
                source: Box::new(e),
            })?;
            let content = read_content(archive_file, &file_name)?;
            data.read_document(&content, &file_name)?;
        }
        data.read_duration = Utc::now().signed_duration_since(now).num_milliseconds();
        data.sha256 = Some(format!("{:x}", hash));
        Ok(data)
    }

    /// Parses one `PublicationDelivery` document and adds its entities
    pub fn read_document(&mut self, content: &str, file_name: &str) -> Result<()> {
        let root: Element = content.parse().map_err(|e| Error::Xml {
            file_name: file_name.to_owned(),
            source: e,
        })?;
        debug!("Reading {}", file_name);
        self.files.push(file_name.to_owned());
        match root.only_child("dataObjects") {
            Some(data_objects) => {
                for frame in data_objects.children() {
                    self.read_frame_defaults(frame);
                }
                self.read_element(data_objects)
            }
            None => {
                warn!("{} has no dataObjects", file_name);
                Ok(())
            }
        }
    }

    fn read_frame_defaults(&mut self, frame: &Element) {
        if let Some(locale) = frame.path(&["FrameDefaults", "DefaultLocale"]) {
            self.frame_defaults.push(FrameDefaults {
                time_zone: locale.child_text("TimeZone"),
                language: locale.child_text("DefaultLanguage"),
            });
        }
    }

    fn read_element(&mut self, element: &Element) -> Result<()> {
        for child in element.children() {
            match child.name() {
                "Authority" => insert_first(&mut self.authorities, Authority::try_from(child)?),
                "Network" => {
                    let network = Network::try_from(child)?;
                    for group in network_groups(child)? {
                        insert_first(&mut self.groups_of_lines, group);
                    }
                    insert_first(&mut self.networks, network);
                }
                "GroupOfLines" => {
                    insert_first(&mut self.groups_of_lines, GroupOfLines::try_from(child)?)
                }
                "Line" | "FlexibleLine" => insert_first(&mut self.lines, Line::try_from(child)?),
                "Route" => insert_first(&mut self.routes, Route::try_from(child)?),
                "JourneyPattern" | "ServiceJourneyPattern" => {
                    insert_first(&mut self.journey_patterns, JourneyPattern::try_from(child)?)
                }
                "ServiceLink" => {
                    insert_first(&mut self.service_links, ServiceLink::try_from(child)?)
                }
                "ServiceJourney" => {
                    insert_first(&mut self.service_journeys, ServiceJourney::try_from(child)?)
                }
                "DatedServiceJourney" => insert_first(
                    &mut self.dated_service_journeys,
                    DatedServiceJourney::try_from(child)?,
                ),
                "DayType" => insert_first(&mut self.day_types, DayType::try_from(child)?),
                "DayTypeAssignment" => insert_first(
                    &mut self.day_type_assignments,
                    DayTypeAssignment::try_from(child)?,
                ),
                "OperatingDay" => {
                    insert_first(&mut self.operating_days, OperatingDay::try_from(child)?)
                }
                "OperatingPeriod" | "UicOperatingPeriod" => {
                    insert_first(&mut self.operating_periods, OperatingPeriod::try_from(child)?)
                }
                "ServiceJourneyInterchange" => insert_first(
                    &mut self.interchanges,
                    ServiceJourneyInterchange::try_from(child)?,
                ),
                "DestinationDisplay" => insert_first(
                    &mut self.destination_displays,
                    DestinationDisplay::try_from(child)?,
                ),
                "PassengerStopAssignment" => insert_first(
                    &mut self.passenger_stop_assignments,
                    PassengerStopAssignment::try_from(child)?,
                ),
                "FlexibleStopAssignment" => insert_first(
                    &mut self.flexible_stop_assignments,
                    FlexibleStopAssignment::try_from(child)?,
                ),
                "FlexibleStopPlace" => insert_first(
                    &mut self.flexible_stop_places,
                    FlexibleStopPlace::try_from(child)?,
                ),
                "StopPlace" => {
                    let (stop_place, quays) = read_stop_place(child)?;
                    for quay in quays {
                        insert_first(&mut self.quays, quay);
                    }
                    insert_first(&mut self.stop_places, stop_place);
                }
                _ => self.read_element(child)?,
            }
        }
        Ok(())
    }
}

fn coordinate(element: &Element) -> Option<Coordinate> {
    let location = element.path(&["Centroid", "Location"])?;
    let longitude = location.child_text("Longitude")?.parse().ok()?;
    let latitude = location.child_text("Latitude")?.parse().ok()?;
    Some(Coordinate {
        longitude,
        latitude,
    })
}

/// `TransportSubmode` wraps the actual value in a mode specific element, like `<BusSubmode>`
fn transport_submode(element: &Element) -> Option<String> {
    let submode = match element.only_child("TransportSubmode") {
        Some(wrapper) => wrapper.children().next()?,
        None => element
            .children()
            .find(|c| c.name().ends_with("Submode") && c.name() != "TransportSubmode")?,
    };
    Some(submode.text().trim().to_owned()).filter(|s| !s.is_empty())
}

fn order(element: &Element) -> Result<u32> {
    element
        .attr("order")
        .map(|o| {
            o.trim().parse().map_err(|_| Error::InvalidXml {
                element: element.name().to_owned(),
                reason: format!("invalid order '{}'", o),
            })
        })
        .unwrap_or(Ok(0))
}

fn day_offset(element: &Element, name: &str) -> Result<u32> {
    element
        .child_text(name)
        .map(|o| {
            o.parse().map_err(|_| Error::InvalidXml {
                element: element.name().to_owned(),
                reason: format!("invalid {} '{}'", name, o),
            })
        })
        .unwrap_or(Ok(0))
}

fn optional_time(element: &Element, name: &str) -> Result<Option<u32>> {
    element
        .child_text(name)
        .map(|t| parse_time(&t))
        .transpose()
}

fn alteration(element: &Element) -> ServiceAlteration {
    element
        .child_text("ServiceAlteration")
        .map(|a| ServiceAlteration::parse(&a))
        .unwrap_or_default()
}

fn network_groups(network: &Element) -> Result<Vec<GroupOfLines>> {
    match network.only_child("groupsOfLines") {
        Some(groups) => groups
            .children_named("GroupOfLines")
            .map(GroupOfLines::try_from)
            .collect(),
        None => Ok(Vec::new()),
    }
}

fn read_stop_place(element: &Element) -> Result<(StopPlace, Vec<Quay>)> {
    let id = element.try_attribute("id")?;
    let centroid = coordinate(element);
    let mut quays = Vec::new();
    if let Some(quay_elements) = element.only_child("quays") {
        for quay_element in quay_elements.children_named("Quay") {
            quays.push(Quay {
                id: quay_element.try_attribute("id")?,
                name: quay_element.child_text("Name"),
                public_code: quay_element.child_text("PublicCode"),
                description: quay_element.child_text("Description"),
                centroid: coordinate(quay_element).or(centroid),
                stop_place_ref: id.clone(),
            });
        }
    }
    let stop_place = StopPlace {
        name: element.child_text("Name").unwrap_or_default(),
        centroid,
        transport_mode: element.child_text("TransportMode"),
        transport_submode: transport_submode(element),
        quay_refs: quays.iter().map(|q| q.id.clone()).collect(),
        id,
    };
    Ok((stop_place, quays))
}

impl TryFrom<&Element> for Authority {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        let contact = element.only_child("ContactDetails");
        Ok(Authority {
            id: element.try_attribute("id")?,
            name: element.child_text("Name").unwrap_or_default(),
            short_name: element.child_text("ShortName"),
            url: contact.and_then(|c| c.child_text("Url")),
            phone: contact.and_then(|c| c.child_text("Phone")),
        })
    }
}

impl TryFrom<&Element> for Network {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(Network {
            id: element.try_attribute("id")?,
            name: element.child_text("Name"),
            authority_ref: element.child_ref("AuthorityRef"),
            groups_of_lines: network_groups(element)?
                .into_iter()
                .map(|g| g.id)
                .collect(),
        })
    }
}

impl TryFrom<&Element> for GroupOfLines {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(GroupOfLines {
            id: element.try_attribute("id")?,
            name: element.child_text("Name"),
        })
    }
}

impl TryFrom<&Element> for Line {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        let presentation = element.only_child("Presentation");
        Ok(Line {
            id: element.try_attribute("id")?,
            name: element.child_text("Name").unwrap_or_default(),
            short_name: element.child_text("ShortName"),
            public_code: element.child_text("PublicCode"),
            description: element.child_text("Description"),
            transport_mode: element.child_text("TransportMode"),
            transport_submode: transport_submode(element),
            represented_by_group_ref: element.child_ref("RepresentedByGroupRef"),
            colour: presentation.and_then(|p| p.child_text("Colour")),
            text_colour: presentation.and_then(|p| p.child_text("TextColour")),
        })
    }
}

impl TryFrom<&Element> for Route {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(Route {
            id: element.try_attribute("id")?,
            name: element.child_text("Name"),
            line_ref: element
                .child_ref("LineRef")
                .or_else(|| element.child_ref("FlexibleLineRef"))
                .ok_or_else(|| Error::InvalidXml {
                    element: format!("Route {}", element.attr("id").unwrap_or_default()),
                    reason: "missing reference 'LineRef'".to_owned(),
                })?,
            direction_type: element
                .child_text("DirectionType")
                .and_then(|d| DirectionType::parse(&d)),
        })
    }
}

impl TryFrom<&Element> for StopPointInJourneyPattern {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(StopPointInJourneyPattern {
            id: element.try_attribute("id")?,
            order: order(element)?,
            scheduled_stop_point_ref: element.try_child_ref("ScheduledStopPointRef")?,
            destination_display_ref: element.child_ref("DestinationDisplayRef"),
            for_boarding: element.child_bool("ForBoarding").unwrap_or(true),
            for_alighting: element.child_bool("ForAlighting").unwrap_or(true),
            request_stop: element.child_bool("RequestStop").unwrap_or(false),
        })
    }
}

impl TryFrom<&Element> for JourneyPattern {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        let mut points_in_sequence = match element.only_child("pointsInSequence") {
            Some(points) => points
                .children_named("StopPointInJourneyPattern")
                .map(StopPointInJourneyPattern::try_from)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        points_in_sequence.sort_by_key(|p| p.order);

        let mut links = Vec::new();
        if let Some(links_element) = element.only_child("linksInSequence") {
            for link in links_element.children_named("ServiceLinkInJourneyPattern") {
                links.push((order(link)?, link.try_child_ref("ServiceLinkRef")?));
            }
        }
        links.sort_by_key(|(order, _)| *order);

        Ok(JourneyPattern {
            id: element.try_attribute("id")?,
            name: element.child_text("Name"),
            route_ref: element.try_child_ref("RouteRef")?,
            points_in_sequence,
            links_in_sequence: links.into_iter().map(|(_, link)| link).collect(),
        })
    }
}

fn line_string(element: &Element) -> Result<Option<LineString>> {
    let line_string = match element.descendant("LineString") {
        Some(l) => l,
        None => return Ok(None),
    };
    let values: std::result::Result<Vec<f64>, ParseFloatError> =
        match line_string.only_child("posList") {
            Some(pos_list) => pos_list
                .text()
                .split_whitespace()
                .map(|v| v.parse::<f64>())
                .collect(),
            None => line_string
                .children_named("pos")
                .flat_map(|pos| {
                    pos.text()
                        .split_whitespace()
                        .map(|v| v.parse::<f64>())
                        .collect::<Vec<_>>()
                })
                .collect(),
        };
    let values = values.map_err(|e| Error::InvalidXml {
        element: format!("ServiceLink {}", element.attr("id").unwrap_or_default()),
        reason: format!("invalid coordinate: {}", e),
    })?;
    if values.len() % 2 != 0 {
        return Err(Error::InvalidXml {
            element: format!("ServiceLink {}", element.attr("id").unwrap_or_default()),
            reason: "odd number of coordinates".to_owned(),
        });
    }
    // GML positions in EPSG:4326 are latitude first
    let coordinates = values
        .chunks(2)
        .map(|c| Coordinate {
            latitude: c[0],
            longitude: c[1],
        })
        .collect();
    Ok(Some(LineString {
        srs_name: line_string.attr("srsName").map(|s| s.to_owned()),
        coordinates,
    }))
}

impl TryFrom<&Element> for ServiceLink {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(ServiceLink {
            id: element.try_attribute("id")?,
            from_point_ref: element.child_ref("FromPointRef"),
            to_point_ref: element.child_ref("ToPointRef"),
            line_string: line_string(element)?,
        })
    }
}

impl TryFrom<&Element> for TimetabledPassingTime {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(TimetabledPassingTime {
            stop_point_in_journey_pattern_ref: element
                .try_child_ref("StopPointInJourneyPatternRef")?,
            arrival_time: optional_time(element, "ArrivalTime")?,
            arrival_day_offset: day_offset(element, "ArrivalDayOffset")?,
            departure_time: optional_time(element, "DepartureTime")?,
            departure_day_offset: day_offset(element, "DepartureDayOffset")?,
        })
    }
}

impl TryFrom<&Element> for ServiceJourney {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        let id = element.try_attribute("id")?;
        let journey_pattern_ref = element
            .child_ref("JourneyPatternRef")
            .or_else(|| element.child_ref("ServiceJourneyPatternRef"))
            .ok_or_else(|| Error::InvalidXml {
                element: format!("ServiceJourney {}", id),
                reason: "missing reference 'JourneyPatternRef'".to_owned(),
            })?;
        let day_type_refs = match element.only_child("dayTypes") {
            Some(day_types) => day_types
                .children_named("DayTypeRef")
                .filter_map(|d| d.attr("ref"))
                .map(|d| d.to_owned())
                .collect(),
            None => Vec::new(),
        };
        let passing_times = match element.only_child("passingTimes") {
            Some(passing_times) => passing_times
                .children_named("TimetabledPassingTime")
                .map(TimetabledPassingTime::try_from)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        Ok(ServiceJourney {
            name: element.child_text("Name"),
            public_code: element.child_text("PublicCode"),
            private_code: element.child_text("PrivateCode"),
            journey_pattern_ref,
            line_ref: element.child_ref("LineRef"),
            day_type_refs,
            passing_times,
            alteration: alteration(element),
            id,
        })
    }
}

impl TryFrom<&Element> for DatedServiceJourney {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        let id = element.try_attribute("id")?;
        // Either directly or wrapped in a JourneyRef
        let service_journey_ref = element
            .descendant("ServiceJourneyRef")
            .and_then(|r| r.attr("ref"))
            .map(|r| r.to_owned())
            .ok_or_else(|| Error::InvalidXml {
                element: format!("DatedServiceJourney {}", id),
                reason: "missing reference 'ServiceJourneyRef'".to_owned(),
            })?;
        Ok(DatedServiceJourney {
            service_journey_ref,
            operating_day_ref: element.try_child_ref("OperatingDayRef")?,
            alteration: alteration(element),
            id,
        })
    }
}

impl TryFrom<&Element> for DayType {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        let mut days_of_week = Vec::new();
        if let Some(properties) = element.only_child("properties") {
            for property in properties.children_named("PropertyOfDay") {
                if let Some(days) = property.child_text("DaysOfWeek") {
                    for day in days.split_whitespace() {
                        match DayOfWeek::parse(day) {
                            Some(d) => days_of_week.push(d),
                            None => warn!("unknown day of week '{}' ignored", day),
                        }
                    }
                }
            }
        }
        Ok(DayType {
            id: element.try_attribute("id")?,
            days_of_week,
        })
    }
}

impl TryFrom<&Element> for DayTypeAssignment {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        let id = element.try_attribute("id")?;
        let target = if let Some(period) = element
            .child_ref("OperatingPeriodRef")
            .or_else(|| element.child_ref("UicOperatingPeriodRef"))
        {
            AssignmentTarget::OperatingPeriod(period)
        } else if let Some(day) = element.child_ref("OperatingDayRef") {
            AssignmentTarget::OperatingDay(day)
        } else if let Some(date) = element.child_text("Date") {
            AssignmentTarget::Date(parse_date(&date)?)
        } else {
            return Err(Error::InvalidXml {
                element: format!("DayTypeAssignment {}", id),
                reason: "no operating period, operating day nor date".to_owned(),
            });
        };
        Ok(DayTypeAssignment {
            order: order(element)?,
            day_type_ref: element.try_child_ref("DayTypeRef")?,
            target,
            is_available: element.child_bool("isAvailable").unwrap_or(true),
            id,
        })
    }
}

impl TryFrom<&Element> for OperatingDay {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        let id = element.try_attribute("id")?;
        let date = element.child_text("CalendarDate").ok_or_else(|| Error::InvalidXml {
            element: format!("OperatingDay {}", id),
            reason: "missing CalendarDate".to_owned(),
        })?;
        Ok(OperatingDay {
            calendar_date: parse_date(&date)?,
            id,
        })
    }
}

fn period_bound(element: &Element, date_name: &str, day_name: &str) -> Result<PeriodBound> {
    if let Some(date) = element.child_text(date_name) {
        Ok(PeriodBound::Date(parse_date(&date)?))
    } else if let Some(day) = element.child_ref(day_name) {
        Ok(PeriodBound::OperatingDay(day))
    } else {
        Err(Error::InvalidXml {
            element: format!(
                "OperatingPeriod {}",
                element.attr("id").unwrap_or_default()
            ),
            reason: format!("missing {} or {}", date_name, day_name),
        })
    }
}

impl TryFrom<&Element> for OperatingPeriod {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(OperatingPeriod {
            id: element.try_attribute("id")?,
            from: period_bound(element, "FromDate", "FromOperatingDayRef")?,
            to: period_bound(element, "ToDate", "ToOperatingDayRef")?,
        })
    }
}

impl TryFrom<&Element> for ServiceJourneyInterchange {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(ServiceJourneyInterchange {
            id: element.try_attribute("id")?,
            from_point_ref: element.try_child_ref("FromPointRef")?,
            to_point_ref: element.try_child_ref("ToPointRef")?,
            from_journey_ref: element.try_child_ref("FromJourneyRef")?,
            to_journey_ref: element.try_child_ref("ToJourneyRef")?,
            stay_seated: element.child_bool("StaySeated").unwrap_or(false),
            guaranteed: element.child_bool("Guaranteed").unwrap_or(false),
            minimum_transfer_time: element
                .child_text("MinimumTransferTime")
                .map(|d| parse_duration(&d))
                .transpose()?,
        })
    }
}

impl TryFrom<&Element> for DestinationDisplay {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        let via_refs = match element.only_child("vias") {
            Some(vias) => vias
                .children_named("Via")
                .filter_map(|via| via.child_ref("DestinationDisplayRef"))
                .collect(),
            None => Vec::new(),
        };
        Ok(DestinationDisplay {
            id: element.try_attribute("id")?,
            front_text: element.child_text("FrontText"),
            via_refs,
        })
    }
}

impl TryFrom<&Element> for PassengerStopAssignment {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(PassengerStopAssignment {
            id: element.try_attribute("id")?,
            scheduled_stop_point_ref: element.try_child_ref("ScheduledStopPointRef")?,
            quay_ref: element.try_child_ref("QuayRef")?,
        })
    }
}

impl TryFrom<&Element> for FlexibleStopAssignment {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(FlexibleStopAssignment {
            id: element.try_attribute("id")?,
            scheduled_stop_point_ref: element.try_child_ref("ScheduledStopPointRef")?,
            flexible_stop_place_ref: element.try_child_ref("FlexibleStopPlaceRef")?,
        })
    }
}

impl TryFrom<&Element> for FlexibleStopPlace {
    type Error = Error;
    fn try_from(element: &Element) -> Result<Self> {
        Ok(FlexibleStopPlace {
            id: element.try_attribute("id")?,
            name: element.child_text("Name"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn read(data_objects: &str) -> NetexData {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <PublicationDelivery xmlns="http://www.netex.org.uk/netex" xmlns:gml="http://www.opengis.net/gml/3.2" version="1.0">
                <dataObjects>{}</dataObjects>
            </PublicationDelivery>"#,
            data_objects
        );
        let mut data = NetexData::default();
        data.read_document(&xml, "test.xml").unwrap();
        data
    }

    #[test]
    fn read_service_link_geometry() {
        let data = read(
            r#"<ServiceFrame id="SF"><serviceLinks>
                <ServiceLink id="SL1">
                    <FromPointRef ref="SSP1"/><ToPointRef ref="SSP2"/>
                    <projections><LinkSequenceProjection id="P1">
                        <gml:LineString gml:id="LS1" srsName="EPSG:25833">
                            <gml:posList>59.9 10.7 59.91 10.71</gml:posList>
                        </gml:LineString>
                    </LinkSequenceProjection></projections>
                </ServiceLink>
            </serviceLinks></ServiceFrame>"#,
        );
        let link = data.service_links.get("SL1").unwrap();
        let geometry = link.line_string.as_ref().unwrap();
        assert_eq!(Some("EPSG:25833".to_owned()), geometry.srs_name);
        assert_eq!(2, geometry.coordinates.len());
        assert_eq!(10.7, geometry.coordinates[0].longitude);
        assert_eq!(59.9, geometry.coordinates[0].latitude);
    }

    #[test]
    fn read_journey_pattern_sorted_by_order() {
        let data = read(
            r#"<ServiceFrame id="SF"><journeyPatterns>
                <JourneyPattern id="JP1">
                    <RouteRef ref="R1"/>
                    <pointsInSequence>
                        <StopPointInJourneyPattern id="JP1-2" order="2">
                            <ScheduledStopPointRef ref="SSP2"/>
                            <ForBoarding>false</ForBoarding>
                        </StopPointInJourneyPattern>
                        <StopPointInJourneyPattern id="JP1-1" order="1">
                            <ScheduledStopPointRef ref="SSP1"/>
                            <DestinationDisplayRef ref="DD1"/>
                        </StopPointInJourneyPattern>
                    </pointsInSequence>
                    <linksInSequence>
                        <ServiceLinkInJourneyPattern id="L1" order="1"><ServiceLinkRef ref="SL1"/></ServiceLinkInJourneyPattern>
                    </linksInSequence>
                </JourneyPattern>
            </journeyPatterns></ServiceFrame>"#,
        );
        let pattern = data.journey_patterns.get("JP1").unwrap();
        let ids: Vec<&str> = pattern
            .points_in_sequence
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(vec!["JP1-1", "JP1-2"], ids);
        assert_eq!(
            Some("DD1".to_owned()),
            pattern.points_in_sequence[0].destination_display_ref
        );
        assert!(!pattern.points_in_sequence[1].for_boarding);
        assert!(pattern.points_in_sequence[1].for_alighting);
        assert_eq!(vec!["SL1".to_owned()], pattern.links_in_sequence);
    }

    #[test]
    fn read_calendar_entities() {
        let data = read(
            r#"<ServiceCalendarFrame id="SCF">
                <dayTypes>
                    <DayType id="DT1"><properties><PropertyOfDay>
                        <DaysOfWeek>Monday Tuesday</DaysOfWeek>
                    </PropertyOfDay></properties></DayType>
                </dayTypes>
                <operatingDays>
                    <OperatingDay id="OD1"><CalendarDate>2024-05-17</CalendarDate></OperatingDay>
                </operatingDays>
                <operatingPeriods>
                    <OperatingPeriod id="OP1"><FromDate>2024-01-01T00:00:00</FromDate><ToDate>2024-06-30T00:00:00</ToDate></OperatingPeriod>
                </operatingPeriods>
                <dayTypeAssignments>
                    <DayTypeAssignment id="DTA1" order="1"><OperatingPeriodRef ref="OP1"/><DayTypeRef ref="DT1"/></DayTypeAssignment>
                    <DayTypeAssignment id="DTA2" order="2"><Date>2024-05-01</Date><DayTypeRef ref="DT1"/><isAvailable>false</isAvailable></DayTypeAssignment>
                </dayTypeAssignments>
            </ServiceCalendarFrame>"#,
        );
        assert_eq!(
            vec![DayOfWeek::Monday, DayOfWeek::Tuesday],
            data.day_types.get("DT1").unwrap().days_of_week
        );
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            data.operating_days.get("OD1").unwrap().calendar_date
        );
        let period = data.operating_periods.get("OP1").unwrap();
        assert_eq!(
            PeriodBound::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            period.from
        );
        let excluded = data.day_type_assignments.get("DTA2").unwrap();
        assert!(!excluded.is_available);
        assert_eq!(
            AssignmentTarget::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            excluded.target
        );
    }

    #[test]
    fn read_stop_place_with_quays() {
        let data = read(
            r#"<SiteFrame id="SiF"><stopPlaces>
                <StopPlace id="NSR:StopPlace:1">
                    <Name>Central</Name>
                    <Centroid><Location><Longitude>10.75</Longitude><Latitude>59.91</Latitude></Location></Centroid>
                    <TransportMode>bus</TransportMode>
                    <BusSubmode>localBus</BusSubmode>
                    <quays>
                        <Quay id="NSR:Quay:1"><PublicCode>A</PublicCode>
                            <Centroid><Location><Longitude>10.751</Longitude><Latitude>59.911</Latitude></Location></Centroid>
                        </Quay>
                        <Quay id="NSR:Quay:2"/>
                    </quays>
                </StopPlace>
            </stopPlaces></SiteFrame>"#,
        );
        let stop_place = data.stop_places.get("NSR:StopPlace:1").unwrap();
        assert_eq!("Central", stop_place.name);
        assert_eq!(Some("localBus".to_owned()), stop_place.transport_submode);
        assert_eq!(2, stop_place.quay_refs.len());
        let quay = data.quays.get("NSR:Quay:1").unwrap();
        assert_eq!("NSR:StopPlace:1", quay.stop_place_ref);
        assert_eq!(Some("A".to_owned()), quay.public_code);
        // A quay without location falls back to its stop place centroid
        assert_eq!(
            stop_place.centroid,
            data.quays.get("NSR:Quay:2").unwrap().centroid
        );
    }

    #[test]
    fn duplicated_entities_keep_the_first_definition() {
        let data = read(
            r#"<ResourceFrame id="RF"><organisations>
                <Authority id="A1"><Name>First</Name></Authority>
                <Authority id="A1"><Name>Second</Name></Authority>
            </organisations></ResourceFrame>"#,
        );
        assert_eq!(1, data.authorities.len());
        assert_eq!("First", data.authorities.get("A1").unwrap().name);
    }

    #[test]
    fn invalid_xml_is_an_error() {
        let mut data = NetexData::default();
        let err = data.read_document("<PublicationDelivery", "broken.xml");
        assert!(matches!(err, Err(Error::Xml { .. })));
    }
}
