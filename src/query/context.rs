// Tue Jan 13 2026 - Alex

use crate::dominator::{DominatorTree, LiveSet, RetainedSizes};
use crate::graph::{GcRootRegistry, ReferenceGraph};
use crate::hprof::Id;
use crate::model::{FieldDecoder, HeapModel, HeapObject, ObjectIndex};
use ahash::AHashSet;
use rayon::prelude::*;

#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub model: &'a HeapModel,
    pub graph: &'a ReferenceGraph,
    pub roots: &'a GcRootRegistry,
    pub live: &'a LiveSet,
    pub dominators: Option<&'a DominatorTree>,
    pub retained: Option<&'a RetainedSizes>,
    pub anchor_unreachable: bool,
}

impl<'a> AnalysisContext<'a> {
    pub fn decoder(&self) -> FieldDecoder<'a> {
        self.model.decoder()
    }

    pub fn object_id(&self, index: ObjectIndex) -> Id {
        self.model.objects.id_of(index)
    }

    pub fn class_name(&self, index: ObjectIndex) -> String {
        self.model.class_name(index)
    }

    pub fn shallow(&self, index: ObjectIndex) -> u64 {
        match self.retained {
            Some(retained) => retained.shallow(index),
            None => self.model.shallow_size(index),
        }
    }

    pub fn retained(&self, index: ObjectIndex) -> Option<u64> {
        self.retained?.retained(index)
    }

    pub fn is_live(&self, index: ObjectIndex) -> bool {
        self.live.is_live(index)
    }

    pub fn live_indices(&self) -> Vec<ObjectIndex> {
        self.live.iter_live().collect()
    }

    pub fn classes_where<F>(&self, matches: F) -> AHashSet<Id>
    where
        F: Fn(&str) -> bool,
    {
        self.model
            .classes
            .iter()
            .filter(|record| {
                self.model
                    .classes
                    .lineage(record.class_id)
                    .iter()
                    .any(|ancestor| matches(&ancestor.name))
            })
            .map(|record| record.class_id)
            .collect()
    }

    pub fn live_instances_of(&self, class_ids: &AHashSet<Id>) -> Vec<ObjectIndex> {
        if class_ids.is_empty() {
            return Vec::new();
        }
        let objects = &self.model.objects;
        self.live_indices()
            .into_par_iter()
            .filter(|&index| match &objects.get(index).object {
                HeapObject::Instance { class_id, .. } => class_ids.contains(class_id),
                _ => false,
            })
            .collect()
    }
}
