//! Reading and indexing of NeTEx datasets

pub mod index;
pub mod objects;
pub mod reader;
mod xml;

pub use index::NetexDatasetIndex;
pub use reader::NetexData;
