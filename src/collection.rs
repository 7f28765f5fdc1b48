use crate::{Error, Result};
use core::marker::PhantomData;
use std::{collections::hash_map::Entry, collections::HashMap, iter::FromIterator};

/// Objects that can be stored in a [Collection]
pub trait WithId {
    /// Kind of object, used in error messages
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Typed index over a [Collection]
#[derive(Derivative)]
#[derivative(
    Debug(bound = ""),
    Clone(bound = ""),
    Copy(bound = ""),
    PartialEq(bound = ""),
    Eq(bound = ""),
    Hash(bound = "")
)]
pub struct Idx<T> {
    idx: usize,
    #[derivative(Debug = "ignore")]
    _phantom: PhantomData<T>,
}

impl<T> Idx<T> {
    fn new(idx: usize) -> Self {
        Idx {
            idx,
            _phantom: PhantomData,
        }
    }
}

/// Arena of objects identified by a string id
///
/// Iteration follows the insertion order, so that everything built on top of it is deterministic.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    objects: Vec<T>,
    ids: HashMap<String, Idx<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection {
            objects: Vec::new(),
            ids: HashMap::default(),
        }
    }
}

impl<T: WithId> Collection<T> {
    /// Appends the object, fails if an object with the same id is already there
    pub fn insert(&mut self, o: T) -> Result<Idx<T>> {
        match self.ids.entry(o.id().to_owned()) {
            Entry::Occupied(_) => Err(Error::DuplicateEntity {
                kind: T::KIND,
                id: o.id().to_owned(),
            }),
            Entry::Vacant(e) => {
                let idx = Idx::new(self.objects.len());
                e.insert(idx);
                self.objects.push(o);
                Ok(idx)
            }
        }
    }
}

impl<T> Collection<T> {
    pub fn get(&self, id: &str) -> Option<&T> {
        self.ids.get(id).map(|idx| &self.objects[idx.idx])
    }

    pub fn get_idx(&self, id: &str) -> Option<Idx<T>> {
        self.ids.get(id).copied()
    }

    pub fn index(&self, idx: Idx<T>) -> &T {
        &self.objects[idx.idx]
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.objects.iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: WithId> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut c = Self::default();

        for i in iter {
            // Note FromIterator does not handle the insertion error
            let _ = c
                .insert(i)
                .map_err(|e| log::warn!("impossible to insert elt: {}", e));
        }

        c
    }
}
