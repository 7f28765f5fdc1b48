use crate::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Publisher of the feed, written in `feed_info.txt`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FeedInfoConfig {
    pub publisher_name: String,
    pub publisher_url: String,
    pub lang: String,
    pub version: Option<String>,
}

/// Parameters of a conversion
///
/// Every field has a default, so a configuration file only needs the fields it changes:
/// ```json
/// {
///   "codespace": "RUT",
///   "agency_url_fallbacks": {"RUT": "https://ruter.no"},
///   "excluded_columns": {"stops.txt": ["vehicle_type"]}
/// }
/// ```
#[derive(Derivative, Deserialize, Debug, Clone)]
#[derivative(Default)]
#[serde(default)]
pub struct ConverterConfig {
    /// Namespace of the synthesized ids
    pub codespace: String,
    /// Agency url to use, by codespace, when an authority has none
    pub agency_url_fallbacks: HashMap<String, String>,
    #[derivative(Default(value = "true"))]
    pub include_shapes: bool,
    pub feed_info: Option<FeedInfoConfig>,
    /// Columns not to write, by file name
    pub excluded_columns: HashMap<String, Vec<String>>,
}

impl ConverterConfig {
    pub fn new(codespace: &str) -> Self {
        ConverterConfig {
            codespace: codespace.to_owned(),
            ..Default::default()
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let file = File::open(p).map_err(|e| Error::NamedFileIO {
            file_name: p.display().to_string(),
            source: Box::new(e),
        })?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn with_agency_url_fallback(mut self, codespace: &str, url: &str) -> Self {
        self.agency_url_fallbacks
            .insert(codespace.to_owned(), url.to_owned());
        self
    }

    pub fn with_shapes(mut self, include_shapes: bool) -> Self {
        self.include_shapes = include_shapes;
        self
    }

    pub fn with_feed_info(mut self, feed_info: FeedInfoConfig) -> Self {
        self.feed_info = Some(feed_info);
        self
    }

    pub fn with_excluded_columns(mut self, file_name: &str, columns: &[&str]) -> Self {
        self.excluded_columns.insert(
            file_name.to_owned(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn agency_url_fallback(&self, codespace: &str) -> Option<&str> {
        self.agency_url_fallbacks.get(codespace).map(|u| u.as_str())
    }
}
