//! Producers of the GTFS records
//!
//! Each producer turns one NeTEx entity, with its already resolved references, into a GTFS
//! record. `None` means the entity does not give any record.

mod agency;
mod calendar;
mod feed_info;
mod route;
mod stop;
mod stop_time;
mod transfer;
mod trip;

pub use agency::AgencyProducer;
pub use calendar::produce_calendar;
pub use feed_info::produce_feed_info;
pub use route::produce_route;
pub use stop::{produce_quay_stop, produce_stop_place_stop};
pub use stop_time::StopTimeProducer;
pub use transfer::TransferProducer;
pub use trip::{destination_display_text, TripProducer};
