// Tue Jan 13 2026 - Alex

use crate::hprof::{RootCategory, RootRecord};
use crate::model::{ModelError, ObjectIndex, ObjectStore};
use ahash::AHashMap;
use indexmap::IndexMap;

#[derive(Debug, Default, Clone)]
pub struct GcRootRegistry {
    records: Vec<(ObjectIndex, RootRecord)>,
    categories: AHashMap<ObjectIndex, Vec<RootCategory>>,
    unresolved: usize,
}

impl GcRootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[RootRecord], objects: &ObjectStore) -> (Self, Vec<ModelError>) {
        let mut registry = Self::new();
        let mut errors = Vec::new();
        for record in records {
            match objects.resolve(record.object_id) {
                Some(index) => registry.register(index, record.clone()),
                None => {
                    registry.unresolved += 1;
                    errors.push(ModelError::UnresolvedReference {
                        source_id: 0,
                        target_id: record.object_id,
                    });
                }
            }
        }
        if registry.unresolved > 0 {
            log::warn!("{} root records name objects missing from the dump", registry.unresolved);
        }
        log::debug!(
            "roots: {} bindings over {} objects",
            registry.records.len(),
            registry.categories.len()
        );
        (registry, errors)
    }

    pub fn register(&mut self, index: ObjectIndex, record: RootRecord) {
        let categories = self.categories.entry(index).or_default();
        if let Err(pos) = categories.binary_search(&record.category) {
            categories.insert(pos, record.category);
        }
        self.records.push((index, record));
    }

    pub fn is_root(&self, index: ObjectIndex) -> bool {
        self.categories.contains_key(&index)
    }

    pub fn is_anchor(&self, index: ObjectIndex, anchor_unreachable: bool) -> bool {
        match self.categories.get(&index) {
            Some(categories) => {
                anchor_unreachable || categories.iter().any(|c| *c != RootCategory::Unreachable)
            }
            None => false,
        }
    }

    pub fn anchors(&self, anchor_unreachable: bool) -> Vec<ObjectIndex> {
        let mut anchors: Vec<ObjectIndex> = self
            .categories
            .keys()
            .copied()
            .filter(|index| self.is_anchor(*index, anchor_unreachable))
            .collect();
        anchors.sort_unstable();
        anchors
    }

    pub fn categories(&self, index: ObjectIndex) -> &[RootCategory] {
        self.categories.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn primary_category(&self, index: ObjectIndex, anchor_unreachable: bool) -> Option<RootCategory> {
        self.categories(index)
            .iter()
            .copied()
            .find(|c| anchor_unreachable || *c != RootCategory::Unreachable)
    }

    pub fn records(&self) -> impl Iterator<Item = (ObjectIndex, &RootRecord)> {
        self.records.iter().map(|(index, record)| (*index, record))
    }

    pub fn records_for(&self, index: ObjectIndex) -> impl Iterator<Item = &RootRecord> {
        self.records
            .iter()
            .filter(move |(i, _)| *i == index)
            .map(|(_, record)| record)
    }

    pub fn category_counts(&self) -> IndexMap<RootCategory, usize> {
        let mut counts: IndexMap<RootCategory, usize> = IndexMap::new();
        for (_, record) in &self.records {
            *counts.entry(record.category).or_insert(0) += 1;
        }
        counts.sort_keys();
        counts
    }

    pub fn binding_count(&self) -> usize {
        self.records.len()
    }

    pub fn object_count(&self) -> usize {
        self.categories.len()
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeapObject;

    fn store_with(ids: &[u64]) -> ObjectStore {
        let mut store = ObjectStore::new(8);
        for &id in ids {
            store
                .insert(id, 0, HeapObject::Instance { class_id: 1, data: bytes::Bytes::new() })
                .unwrap();
        }
        store
    }

    #[test]
    fn test_multi_category_binding() {
        let store = store_with(&[0x10, 0x20]);
        let records = vec![
            RootRecord::new(RootCategory::ThreadObject, 0x10),
            RootRecord::new(RootCategory::JniGlobal, 0x10),
            RootRecord::new(RootCategory::StickyClass, 0x20),
        ];
        let (registry, errors) = GcRootRegistry::from_records(&records, &store);
        assert!(errors.is_empty());
        let a = store.resolve(0x10).unwrap();
        assert_eq!(registry.categories(a), &[RootCategory::JniGlobal, RootCategory::ThreadObject]);
        assert_eq!(registry.primary_category(a, false), Some(RootCategory::JniGlobal));
        assert_eq!(registry.binding_count(), 3);
        assert_eq!(registry.object_count(), 2);
        assert_eq!(registry.anchors(false).len(), 2);
    }

    #[test]
    fn test_unresolved_roots_are_reported() {
        let store = store_with(&[0x10]);
        let records = vec![RootRecord::new(RootCategory::JniLocal, 0x99)];
        let (registry, errors) = GcRootRegistry::from_records(&records, &store);
        assert_eq!(errors.len(), 1);
        assert_eq!(registry.unresolved_count(), 1);
        assert!(registry.anchors(false).is_empty());
    }

    #[test]
    fn test_unreachable_roots_do_not_anchor_by_default() {
        let store = store_with(&[0x10]);
        let records = vec![RootRecord::new(RootCategory::Unreachable, 0x10)];
        let (registry, _) = GcRootRegistry::from_records(&records, &store);
        let index = store.resolve(0x10).unwrap();
        assert!(registry.is_root(index));
        assert!(!registry.is_anchor(index, false));
        assert!(registry.is_anchor(index, true));
        assert_eq!(registry.primary_category(index, false), None);
    }
}
