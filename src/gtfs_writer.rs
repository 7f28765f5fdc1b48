use crate::gtfs::GtfsOutput;
use crate::{Error, Result};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

fn named_io_error<E>(file_name: &str, e: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::NamedFileIO {
        file_name: file_name.to_owned(),
        source: Box::new(e),
    }
}

fn to_csv<'a, T, I>(file_name: &str, records: I) -> Result<Vec<u8>>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record).map_err(|e| Error::CSVError {
            file_name: file_name.to_owned(),
            source: e,
        })?;
    }
    wtr.into_inner().map_err(|e| named_io_error(file_name, e))
}

/// Rewrites a csv content without some of its columns
fn remove_columns(file_name: &str, content: &[u8], excluded: &[String]) -> Result<Vec<u8>> {
    let csv_error = |e: csv::Error| Error::CSVError {
        file_name: file_name.to_owned(),
        source: e,
    };
    let mut rdr = csv::Reader::from_reader(content);
    let headers = rdr.headers().map_err(csv_error)?.clone();
    let kept: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !excluded.iter().any(|e| e.as_str() == *h))
        .map(|(i, _)| i)
        .collect();

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(kept.iter().map(|i| &headers[*i]))
        .map_err(csv_error)?;
    for record in rdr.records() {
        let record = record.map_err(csv_error)?;
        wtr.write_record(kept.iter().map(|i| record.get(*i).unwrap_or_default()))
            .map_err(csv_error)?;
    }
    wtr.into_inner().map_err(|e| named_io_error(file_name, e))
}

/// Serializes a [GtfsOutput] into the GTFS files
///
/// Files are always written in the same order and with the same columns, empty files are not
/// written.
pub struct GtfsWriter<'a> {
    output: &'a GtfsOutput,
    excluded_columns: &'a HashMap<String, Vec<String>>,
}

impl<'a> GtfsWriter<'a> {
    pub fn new(output: &'a GtfsOutput, excluded_columns: &'a HashMap<String, Vec<String>>) -> Self {
        GtfsWriter {
            output,
            excluded_columns,
        }
    }

    fn file<T: Serialize>(
        &self,
        files: &mut Vec<(&'static str, Vec<u8>)>,
        file_name: &'static str,
        records: Vec<&T>,
    ) -> Result<()> {
        if records.is_empty() {
            debug!("{} is empty, not written", file_name);
            return Ok(());
        }
        let content = to_csv(file_name, records)?;
        let content = match self.excluded_columns.get(file_name) {
            Some(excluded) if !excluded.is_empty() => remove_columns(file_name, &content, excluded)?,
            _ => content,
        };
        files.push((file_name, content));
        Ok(())
    }

    /// Content of every non empty file, in writing order
    pub fn files(&self) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let o = self.output;
        let mut files = Vec::new();
        self.file(&mut files, "agency.txt", o.agencies().iter().collect::<Vec<_>>())?;
        self.file(&mut files, "stops.txt", o.stops().iter().collect::<Vec<_>>())?;
        self.file(&mut files, "routes.txt", o.routes().iter().collect::<Vec<_>>())?;
        self.file(&mut files, "trips.txt", o.trips().iter().collect::<Vec<_>>())?;
        self.file(&mut files, "stop_times.txt", o.stop_times().iter().collect::<Vec<_>>())?;
        self.file(&mut files, "calendar.txt", o.calendars().iter().collect::<Vec<_>>())?;
        self.file(
            &mut files,
            "calendar_dates.txt",
            o.calendar_dates().iter().collect::<Vec<_>>(),
        )?;
        self.file(&mut files, "shapes.txt", o.shapes().iter().collect::<Vec<_>>())?;
        self.file(&mut files, "transfers.txt", o.transfers().iter().collect::<Vec<_>>())?;
        self.file(&mut files, "feed_info.txt", o.feed_info().into_iter().collect::<Vec<_>>())?;
        Ok(files)
    }

    /// Writes the files in a directory, created if needed
    pub fn write_to_directory<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        std::fs::create_dir_all(p)?;
        for (file_name, content) in self.files()? {
            let mut file =
                File::create(p.join(file_name)).map_err(|e| named_io_error(file_name, e))?;
            file.write_all(&content)
                .map_err(|e| named_io_error(file_name, e))?;
        }
        info!("GTFS written in {}", p.display());
        Ok(())
    }

    /// Writes a zip archive
    ///
    /// Every entry has the same modification time, two archives of the same feed are identical.
    pub fn write_to_zip<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644);
        for (file_name, content) in self.files()? {
            zip.start_file(file_name, options)?;
            zip.write_all(&content)
                .map_err(|e| named_io_error(file_name, e))?;
        }
        Ok(zip.finish()?)
    }

    pub fn write_to_zip_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        let file = File::create(p).map_err(|e| named_io_error(&p.display().to_string(), e))?;
        self.write_to_zip(file)?;
        info!("GTFS written in {}", p.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Agency, Stop};

    fn output() -> GtfsOutput {
        let mut output = GtfsOutput::default();
        output
            .add_agency(Agency {
                id: "A1".to_owned(),
                name: "Agency".to_owned(),
                url: "https://example.com".to_owned(),
                timezone: "Europe/Oslo".to_owned(),
                ..Default::default()
            })
            .unwrap();
        output
            .add_stop(Stop {
                id: "Q1".to_owned(),
                name: "Quay".to_owned(),
                latitude: Some(59.9),
                longitude: Some(10.7),
                ..Default::default()
            })
            .unwrap();
        output
    }

    #[test]
    fn empty_files_are_not_written() {
        let output = output();
        let excluded = HashMap::new();
        let names: Vec<&str> = GtfsWriter::new(&output, &excluded)
            .files()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(vec!["agency.txt", "stops.txt"], names);
    }

    #[test]
    fn excluded_columns() {
        let output = output();
        let mut excluded = HashMap::new();
        excluded.insert(
            "stops.txt".to_owned(),
            vec!["vehicle_type".to_owned(), "stop_desc".to_owned()],
        );
        let files = GtfsWriter::new(&output, &excluded).files().unwrap();
        let stops = String::from_utf8(files[1].1.clone()).unwrap();
        assert_eq!(
            "stop_id,stop_name,stop_lat,stop_lon,location_type,parent_station,platform_code\n\
             Q1,Quay,59.9,10.7,0,,\n",
            stops
        );
    }

    #[test]
    fn write_directory_and_zip() {
        let output = output();
        let excluded = HashMap::new();
        let writer = GtfsWriter::new(&output, &excluded);
        let dir = tempfile::tempdir().unwrap();
        writer.write_to_directory(dir.path()).unwrap();
        let agency = std::fs::read_to_string(dir.path().join("agency.txt")).unwrap();
        assert!(agency.starts_with("agency_id,agency_name,agency_url,agency_timezone"));

        let first = writer.write_to_zip(std::io::Cursor::new(vec![])).unwrap();
        let second = writer.write_to_zip(std::io::Cursor::new(vec![])).unwrap();
        assert_eq!(first.into_inner(), second.into_inner());
    }
}
