/*! The [NeTEx](https://netex-cen.eu/) format is the European standard to exchange public transport
networks and timetables, as hierarchical XML documents.
The [General Transit Feed Specification](https://gtfs.org/) (GTFS) is the flat, csv based
format consumed by most trip planners.

This crate reads a NeTEx timetable dataset together with a separately published stop place
dataset and converts them into a GTFS feed:

```no_run
use netex_gtfs::{ConverterConfig, GtfsConverter, GtfsWriter, NetexData, StopAreaIndex};
use std::sync::Arc;

let timetable = NetexData::new("fixtures/netex/basic").expect("impossible to read NeTEx");
let stop_areas = StopAreaIndex::from_source("fixtures/netex/stops.xml").expect("no stop areas");
let config = ConverterConfig::new("RUT");
let output = GtfsConverter::new(config.clone(), Arc::new(stop_areas))
    .convert(&timetable)
    .expect("conversion failed");
GtfsWriter::new(&output, &config.excluded_columns)
    .write_to_zip_file("gtfs.zip")
    .expect("impossible to write the GTFS");
```

The conversion only appends records to a [GtfsOutput], in a fixed order. The same input always
gives byte identical files.

The `read-url` feature (enabled by default) allows to read a remote NeTEx archive.
*/
#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

mod collection;
pub mod config;
mod converter;
mod error;
pub mod gtfs;
mod gtfs_writer;
pub mod netex;
pub mod objects;
pub mod producer;
pub mod route_type;
mod serde_helpers;
pub mod service_calendar;
pub mod shape;
pub mod stop_area;


pub use collection::{Collection, Idx, WithId};
pub use config::{ConverterConfig, FeedInfoConfig};
pub use converter::GtfsConverter;
pub use error::{Error, Result};
pub use gtfs::GtfsOutput;
pub use gtfs_writer::GtfsWriter;
pub use netex::{NetexData, NetexDatasetIndex};
pub use objects::*;
pub use stop_area::{StopAreaIndex, StopAreaRepository};
