//! Ordered feature collections.
//!
//! Feature vectors are never copied into the collection. Ad-hoc vectors
//! (scalar properties, random draws, user properties) live in a
//! [`FeatureStore`] arena owned by the pipeline; the density vector lives in
//! the pipeline's density field. A [`FeatureCollection`] only records
//! [`FeatureRef`] handles into those two owners, in the order the inputs were
//! processed.

use thiserror::Error;

/// Handle to a feature vector owned by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureRef {
    /// The (transformed) density grid.
    Density,
    /// An entry of the [`FeatureStore`].
    Stored(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("feature collection is locked")]
pub struct LockedError;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFeature {
    pub name: String,
    pub values: Vec<f64>,
}

/// Arena of named feature vectors.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    entries: Vec<StoredFeature>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> FeatureRef {
        self.entries.push(StoredFeature {
            name: name.into(),
            values,
        });
        FeatureRef::Stored(self.entries.len() - 1)
    }

    pub fn get(&self, idx: usize) -> Option<&StoredFeature> {
        self.entries.get(idx)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered, append-then-lock sequence of feature handles plus the target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    order: Vec<FeatureRef>,
    locked: bool,
    target: Option<f64>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a feature; fails once the collection is locked.
    pub fn push(&mut self, feature: FeatureRef) -> Result<(), LockedError> {
        if self.locked {
            return Err(LockedError);
        }
        self.order.push(feature);
        Ok(())
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Sets the training target. Allowed regardless of the lock.
    pub fn set_target(&mut self, target: f64) {
        self.target = Some(target);
    }

    #[inline]
    pub fn target(&self) -> Option<f64> {
        self.target
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FeatureRef> + '_ {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_hands_out_sequential_refs() {
        let mut store = FeatureStore::new();
        assert_eq!(store.insert("energy", vec![1.0]), FeatureRef::Stored(0));
        assert_eq!(store.insert("random", vec![0.5]), FeatureRef::Stored(1));
        assert_eq!(store.get(1).unwrap().name, "random");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn push_preserves_order() {
        let mut features = FeatureCollection::new();
        features.push(FeatureRef::Stored(1)).unwrap();
        features.push(FeatureRef::Density).unwrap();
        let order: Vec<_> = features.iter().collect();
        assert_eq!(order, vec![FeatureRef::Stored(1), FeatureRef::Density]);
    }

    #[test]
    fn locked_collection_rejects_appends() {
        let mut features = FeatureCollection::new();
        features.push(FeatureRef::Density).unwrap();
        features.lock();
        assert!(features.is_locked());
        assert_eq!(features.push(FeatureRef::Stored(0)), Err(LockedError));
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn target_is_independent_of_lock() {
        let mut features = FeatureCollection::new();
        features.lock();
        features.set_target(-3.25);
        assert_eq!(features.target(), Some(-3.25));
    }
}
