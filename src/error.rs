use thiserror::Error;

/// An error that can occur when converting a NeTEx dataset.
///
/// Dataset and reference errors abort the whole conversion, no partial feed is produced.
/// Data quality issues are never reported here, they are logged and worked around.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not find file {0}")]
    MissingFile(String),
    #[error("The id {0} is not known")]
    ReferenceError(String),
    #[error("Duplicate {kind} with id {id}")]
    DuplicateEntity { kind: &'static str, id: String },
    #[error("No default time zone is defined in the dataset")]
    MissingTimeZone,
    #[error("Several default time zones are defined in the dataset: {}", .0.join(", "))]
    AmbiguousTimeZone(Vec<String>),
    #[error("No authority found for line {line_id} (group of lines {group_ref})")]
    AuthorityNotFound { line_id: String, group_ref: String },
    #[error("Could not read NeTEx: {0} is neither a file nor a directory")]
    NotFileNorDirectory(String),
    #[error("'{0}' is not a valid time")]
    InvalidTime(String),
    #[error("'{0}' is not a valid date")]
    InvalidDate(String),
    #[error("'{0}' is not a valid duration")]
    InvalidDuration(String),
    #[error("'{0}' is not a valid color")]
    InvalidColor(String),
    #[error("invalid {element}: {reason}")]
    InvalidXml { element: String, reason: String },
    #[error("impossible to parse xml file '{file_name}'")]
    Xml {
        file_name: String,
        #[source]
        source: minidom::Error,
    },
    #[error("impossible to read file")]
    IO(#[from] std::io::Error),
    #[error("impossible to read '{file_name}'")]
    NamedFileIO {
        file_name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[cfg(feature = "read-url")]
    #[error("impossible to remotely access file")]
    Fetch(#[from] reqwest::Error),
    #[error("impossible to write csv file '{file_name}'")]
    CSVError {
        file_name: String,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error("invalid configuration")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
