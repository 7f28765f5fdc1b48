use crate::collection::Collection;
use crate::netex::objects::{Quay, StopPlace};
use crate::netex::NetexData;
use crate::{Error, Result};
use log::info;
use std::sync::{Arc, PoisonError, RwLock};

/// Quays and stop places of a stop area dataset
///
/// The stop areas are published separately from the timetables and are shared by all the
/// conversions.
#[derive(Debug, Default)]
pub struct StopAreaIndex {
    quays: Collection<Quay>,
    stop_places: Collection<StopPlace>,
}

impl StopAreaIndex {
    pub fn new(quays: Collection<Quay>, stop_places: Collection<StopPlace>) -> Self {
        StopAreaIndex { quays, stop_places }
    }

    pub fn from_netex(data: NetexData) -> Self {
        Self::new(data.quays, data.stop_places)
    }

    /// Reads the stop areas from the same sources as [NetexData::new]
    pub fn from_source(source: &str) -> Result<Self> {
        let data = NetexData::new(source)?;
        info!(
            "stop areas read in {} ms: {} stop places, {} quays",
            data.read_duration,
            data.stop_places.len(),
            data.quays.len()
        );
        Ok(Self::from_netex(data))
    }

    pub fn quay(&self, id: &str) -> Option<&Quay> {
        self.quays.get(id)
    }

    pub fn stop_place(&self, id: &str) -> Option<&StopPlace> {
        self.stop_places.get(id)
    }

    pub fn try_quay(&self, id: &str) -> Result<&Quay> {
        self.quay(id)
            .ok_or_else(|| Error::ReferenceError(id.to_owned()))
    }

    pub fn try_stop_place(&self, id: &str) -> Result<&StopPlace> {
        self.stop_place(id)
            .ok_or_else(|| Error::ReferenceError(id.to_owned()))
    }

    /// Stop place a quay belongs to
    pub fn stop_place_for_quay(&self, quay: &Quay) -> Result<&StopPlace> {
        self.try_stop_place(&quay.stop_place_ref)
    }

    pub fn quay_count(&self) -> usize {
        self.quays.len()
    }

    pub fn stop_place_count(&self) -> usize {
        self.stop_places.len()
    }
}

/// Shared access to the current [StopAreaIndex]
///
/// A conversion works on a snapshot, a refresh only affects the conversions started afterwards.
#[derive(Debug, Default)]
pub struct StopAreaRepository {
    current: RwLock<Arc<StopAreaIndex>>,
}

impl StopAreaRepository {
    pub fn new(index: StopAreaIndex) -> Self {
        StopAreaRepository {
            current: RwLock::new(Arc::new(index)),
        }
    }

    pub fn snapshot(&self) -> Arc<StopAreaIndex> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn refresh(&self, index: StopAreaIndex) {
        info!(
            "refreshing stop areas: {} stop places, {} quays",
            index.stop_place_count(),
            index.quay_count()
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(quay_ids: &[&str]) -> StopAreaIndex {
        let quays = quay_ids
            .iter()
            .map(|id| Quay {
                id: id.to_string(),
                stop_place_ref: "SP1".to_owned(),
                ..Default::default()
            })
            .collect();
        let stop_places = vec![StopPlace {
            id: "SP1".to_owned(),
            name: "Stop place".to_owned(),
            ..Default::default()
        }]
        .into_iter()
        .collect();
        StopAreaIndex::new(quays, stop_places)
    }

    #[test]
    fn missing_quay_is_a_reference_error() {
        let index = index(&["Q1"]);
        let quay = index.try_quay("Q1").unwrap();
        assert_eq!("SP1", index.stop_place_for_quay(quay).unwrap().id);
        assert!(matches!(index.try_quay("Q2"), Err(Error::ReferenceError(id)) if id == "Q2"));
    }

    #[test]
    fn refresh_keeps_previous_snapshots() {
        let repository = StopAreaRepository::new(index(&["Q1"]));
        let before = repository.snapshot();
        repository.refresh(index(&["Q1", "Q2"]));
        assert!(before.quay("Q2").is_none());
        assert!(repository.snapshot().quay("Q2").is_some());
    }
}
