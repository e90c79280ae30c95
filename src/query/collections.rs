// Tue Jan 13 2026 - Alex

use crate::config::{CapacitySource, CollectionConfig, CollectionSpec};
use crate::hprof::Id;
use crate::model::{HeapObject, ObjectIndex};
use crate::query::AnalysisContext;
use ahash::AHashMap;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CollectionIssue {
    LowUtilization,
    EmptyRetained,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInstance {
    pub object_id: Id,
    pub class_name: String,
    pub count: u64,
    pub capacity: u64,
    pub utilization: f64,
    pub retained_size: Option<u64>,
    pub issue: Option<CollectionIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionClassStats {
    pub class_name: String,
    pub instances: usize,
    pub total_count: u64,
    pub total_capacity: u64,
    pub average_utilization: f64,
    pub low_utilization: usize,
    pub empty_retained: usize,
    pub retained_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionReport {
    pub classes: Vec<CollectionClassStats>,
    /// Flagged instances, largest retained first.
    pub flagged: Vec<CollectionInstance>,
}

/// Collection entry for each class: its own, or that of the closest listed ancestor.
fn specs_by_class<'c>(ctx: &AnalysisContext<'_>, specs: &'c [CollectionSpec]) -> AHashMap<Id, &'c CollectionSpec> {
    let classes = &ctx.model.classes;
    classes
        .iter()
        .filter_map(|record| {
            classes
                .lineage(record.class_id)
                .iter()
                .find_map(|ancestor| specs.iter().find(|s| s.class_name == ancestor.name))
                .map(|spec| (record.class_id, spec))
        })
        .collect()
}

fn measure(ctx: &AnalysisContext<'_>, index: ObjectIndex, spec: &CollectionSpec) -> Option<(u64, u64)> {
    let decoder = ctx.decoder();
    let count = decoder.read_int(index, &spec.count_field)?.max(0) as u64;
    let capacity = match &spec.capacity {
        CapacitySource::IntField(field) => decoder.read_int(index, field)?.max(0) as u64,
        CapacitySource::ArrayLength(field) => {
            // A lazily allocated backing array is a capacity of zero.
            decoder.read_field(index, field)?;
            decoder
                .read_reference(index, field)
                .and_then(|array| ctx.model.objects.get(array).object.array_length())
                .unwrap_or(0) as u64
        }
    };
    Some((count, capacity))
}

pub fn collection_stats(ctx: &AnalysisContext<'_>, config: &CollectionConfig) -> CollectionReport {
    let specs = specs_by_class(ctx, &config.specs);
    if specs.is_empty() {
        return CollectionReport::default();
    }
    let objects = &ctx.model.objects;

    let instances: Vec<CollectionInstance> = ctx
        .live_indices()
        .into_par_iter()
        .filter_map(|index| {
            let spec = match &objects.get(index).object {
                HeapObject::Instance { class_id, .. } => specs.get(class_id)?,
                _ => return None,
            };
            let (count, capacity) = measure(ctx, index, spec)?;
            let utilization = crate::utils::ratio(count, capacity);
            let retained_size = ctx.retained(index);
            let issue = if count == 0 && retained_size.unwrap_or(0) >= config.empty_retained_floor {
                Some(CollectionIssue::EmptyRetained)
            } else if capacity >= config.min_capacity && utilization < config.low_utilization {
                Some(CollectionIssue::LowUtilization)
            } else {
                None
            };
            Some(CollectionInstance {
                object_id: ctx.object_id(index),
                class_name: ctx.class_name(index),
                count,
                capacity,
                utilization,
                retained_size,
                issue,
            })
        })
        .collect();

    let mut by_class: IndexMap<&str, CollectionClassStats> = IndexMap::new();
    for instance in &instances {
        let stats = by_class
            .entry(instance.class_name.as_str())
            .or_insert_with(|| CollectionClassStats {
                class_name: instance.class_name.clone(),
                instances: 0,
                total_count: 0,
                total_capacity: 0,
                average_utilization: 0.0,
                low_utilization: 0,
                empty_retained: 0,
                retained_bytes: 0,
            });
        stats.instances += 1;
        stats.total_count += instance.count;
        stats.total_capacity += instance.capacity;
        stats.average_utilization += instance.utilization;
        stats.retained_bytes += instance.retained_size.unwrap_or(0);
        match instance.issue {
            Some(CollectionIssue::LowUtilization) => stats.low_utilization += 1,
            Some(CollectionIssue::EmptyRetained) => stats.empty_retained += 1,
            None => {}
        }
    }
    let mut classes: Vec<CollectionClassStats> = by_class
        .into_values()
        .map(|mut stats| {
            stats.average_utilization /= stats.instances as f64;
            stats
        })
        .collect();
    classes.sort_by(|a, b| b.retained_bytes.cmp(&a.retained_bytes).then(a.class_name.cmp(&b.class_name)));

    let mut flagged: Vec<CollectionInstance> = instances.into_iter().filter(|i| i.issue.is_some()).collect();
    flagged.sort_by(|a, b| b.retained_size.cmp(&a.retained_size).then(a.object_id.cmp(&b.object_id)));
    log::debug!("collections: {} classes, {} flagged", classes.len(), flagged.len());

    CollectionReport { classes, flagged }
}
