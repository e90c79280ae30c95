// Tue Jan 13 2026 - Alex

use crate::config::AnalysisConfig;
use crate::dominator::{Dominator, DominatorTree, LiveSet, RetainedSizes};
use crate::engine::{AnalysisWarning, StageTiming, WarningSummary};
use crate::graph::{GcRootRegistry, GraphStats, ReferenceGraph, StrengthFilter};
use crate::hprof::{HprofHeader, Id, RootCategory};
use crate::model::{HeapModel, ObjectIndex};
use crate::query::{
    self, AnalysisContext, BitmapReport, ClassHistogramEntry, CollectionReport, DuplicateInstanceGroup,
    DuplicateInstanceRule, HeapTotals, HistogramFilter, LargeArray, LeakDetector, LeakSuspect,
    PackageHistogramEntry, PathResult, PrimitiveArrayEntry, RetainedEntry, StringDuplicateReport, StringStats,
};
use indexmap::IndexMap;
use rayon::ThreadPool;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub header: HprofHeader,
    pub object_count: usize,
    pub live_objects: usize,
    pub garbage_objects: usize,
    pub total_retained_size: u64,
    pub dominators_computed: bool,
    pub partial: bool,
    pub roots: IndexMap<RootCategory, usize>,
    pub graph: GraphStats,
    pub warnings: WarningSummary,
    pub timings: Vec<StageTiming>,
}

pub struct HeapAnalysis {
    config: AnalysisConfig,
    model: HeapModel,
    graph: ReferenceGraph,
    roots: GcRootRegistry,
    live: LiveSet,
    dominators: Option<DominatorTree>,
    retained: Option<RetainedSizes>,
    warnings: Vec<AnalysisWarning>,
    partial: bool,
    timings: Vec<StageTiming>,
    pool: ThreadPool,
    leak_detector: LeakDetector,
}

impl HeapAnalysis {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: AnalysisConfig,
        model: HeapModel,
        graph: ReferenceGraph,
        roots: GcRootRegistry,
        live: LiveSet,
        dominators: Option<DominatorTree>,
        retained: Option<RetainedSizes>,
        warnings: Vec<AnalysisWarning>,
        partial: bool,
        timings: Vec<StageTiming>,
        pool: ThreadPool,
        leak_detector: LeakDetector,
    ) -> Self {
        Self {
            config,
            model,
            graph,
            roots,
            live,
            dominators,
            retained,
            warnings,
            partial,
            timings,
            pool,
            leak_detector,
        }
    }

    pub fn context(&self) -> AnalysisContext<'_> {
        AnalysisContext {
            model: &self.model,
            graph: &self.graph,
            roots: &self.roots,
            live: &self.live,
            dominators: self.dominators.as_ref(),
            retained: self.retained.as_ref(),
            anchor_unreachable: self.config.reachability.anchor_unreachable_roots,
        }
    }

    fn index_of(&self, object_id: Id) -> Option<ObjectIndex> {
        self.model.objects.resolve(object_id)
    }

    pub fn live_object_count(&self) -> usize {
        self.live.live_count()
    }

    pub fn garbage_object_count(&self) -> usize {
        self.live.garbage_count()
    }

    pub fn total_retained_size(&self) -> u64 {
        match &self.retained {
            Some(retained) => retained.root_retained(),
            None => self.live.iter_live().map(|i| self.model.shallow_size(i)).sum(),
        }
    }

    pub fn top_retained(&self, n: usize) -> Vec<RetainedEntry> {
        let ctx = self.context();
        self.pool.install(|| query::top_retained(&ctx, n))
    }

    pub fn dominated_by(&self, object_id: Option<Id>) -> Vec<RetainedEntry> {
        let dominator = match object_id {
            None => Dominator::SuperRoot,
            Some(id) => match self.index_of(id) {
                Some(index) => Dominator::Object(index),
                None => return Vec::new(),
            },
        };
        query::dominated_children(&self.context(), dominator)
    }

    pub fn path_to_root(&self, object_id: Id, exclude: StrengthFilter) -> PathResult {
        match self.index_of(object_id) {
            Some(index) => query::path_to_root(&self.context(), index, exclude),
            None => PathResult::Unreachable,
        }
    }

    pub fn leak_suspects(&self) -> Vec<LeakSuspect> {
        let ctx = self.context();
        self.pool.install(|| self.leak_detector.detect(&ctx))
    }

    pub fn duplicate_instances(&self) -> Vec<DuplicateInstanceGroup> {
        let patterns = match self.config.lifecycle_regexes() {
            Ok(patterns) => patterns,
            Err(e) => {
                log::error!("{}", e);
                return Vec::new();
            }
        };
        let rule = DuplicateInstanceRule::new(patterns, self.config.leaks.duplicate_threshold);
        let ctx = self.context();
        self.pool.install(|| rule.groups(&ctx))
    }

    pub fn duplicate_strings(&self) -> StringDuplicateReport {
        let ctx = self.context();
        self.pool.install(|| query::duplicate_strings(&ctx, &self.config.strings))
    }

    pub fn oversized_bitmaps(&self) -> BitmapReport {
        let ctx = self.context();
        self.pool.install(|| query::analyze_bitmaps(&ctx, &self.config.bitmaps))
    }

    pub fn collection_stats(&self) -> CollectionReport {
        let ctx = self.context();
        self.pool.install(|| query::collection_stats(&ctx, &self.config.collections))
    }

    pub fn heap_totals(&self, filter: &HistogramFilter) -> HeapTotals {
        query::heap_totals(&self.context(), filter)
    }

    pub fn class_histogram(&self, filter: &HistogramFilter) -> Vec<ClassHistogramEntry> {
        let ctx = self.context();
        self.pool.install(|| query::class_histogram(&ctx, filter))
    }

    pub fn package_histogram(&self, filter: &HistogramFilter) -> Vec<PackageHistogramEntry> {
        let ctx = self.context();
        self.pool.install(|| query::package_histogram(&ctx, filter))
    }

    pub fn primitive_array_histogram(&self, filter: &HistogramFilter) -> Vec<PrimitiveArrayEntry> {
        query::primitive_array_histogram(&self.context(), filter)
    }

    pub fn large_primitive_arrays(&self, filter: &HistogramFilter, min_bytes: u64) -> Vec<LargeArray> {
        query::large_primitive_arrays(&self.context(), filter, min_bytes)
    }

    pub fn string_stats(&self, filter: &HistogramFilter) -> StringStats {
        let strings = &self.config.strings;
        query::string_stats(&self.context(), filter, &strings.string_class, &strings.value_field)
    }

    pub fn shallow_size(&self, object_id: Id) -> Option<u64> {
        self.index_of(object_id).map(|i| self.model.shallow_size(i))
    }

    pub fn retained_size(&self, object_id: Id) -> Option<u64> {
        self.retained.as_ref()?.retained(self.index_of(object_id)?)
    }

    /// `Some(None)` means the object is dominated only by the synthetic root.
    pub fn immediate_dominator(&self, object_id: Id) -> Option<Option<Id>> {
        let index = self.index_of(object_id)?;
        match self.dominators.as_ref()?.immediate_dominator(index)? {
            Dominator::SuperRoot => Some(None),
            Dominator::Object(parent) => Some(Some(self.model.objects.id_of(parent))),
        }
    }

    pub fn is_live(&self, object_id: Id) -> bool {
        self.index_of(object_id).map(|i| self.live.is_live(i)).unwrap_or(false)
    }

    pub fn root_categories(&self, object_id: Id) -> &[RootCategory] {
        match self.index_of(object_id) {
            Some(index) => self.roots.categories(index),
            None => &[],
        }
    }

    pub fn reachable_with(&self, filter: StrengthFilter) -> LiveSet {
        let anchors = self.roots.anchors(self.config.reachability.anchor_unreachable_roots);
        LiveSet::compute(&self.graph, &anchors, filter)
    }

    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }

    pub fn warning_summary(&self) -> WarningSummary {
        WarningSummary::from_warnings(&self.warnings)
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn dominators_computed(&self) -> bool {
        self.dominators.is_some()
    }

    pub fn header(&self) -> &HprofHeader {
        &self.model.header
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn model(&self) -> &HeapModel {
        &self.model
    }

    pub fn graph(&self) -> &ReferenceGraph {
        &self.graph
    }

    pub fn roots(&self) -> &GcRootRegistry {
        &self.roots
    }

    pub fn graph_stats(&self) -> GraphStats {
        self.graph.stats()
    }

    pub fn timings(&self) -> &[StageTiming] {
        &self.timings
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            header: self.model.header.clone(),
            object_count: self.model.objects.len(),
            live_objects: self.live_object_count(),
            garbage_objects: self.garbage_object_count(),
            total_retained_size: self.total_retained_size(),
            dominators_computed: self.dominators_computed(),
            partial: self.partial,
            roots: self.roots.category_counts(),
            graph: self.graph_stats(),
            warnings: self.warning_summary(),
            timings: self.timings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Strength;
    use crate::hprof::{FieldType, FieldValue, SubRecordTag};
    use crate::query::RuleTag;
    use crate::utils::testing::{self, HprofWriter};

    const NODE: Id = 0x10;
    const WEAK_REF: Id = 0x11;
    const REFERENCE: Id = 0x12;
    const STRING: Id = 0x13;
    const ACTIVITY: Id = 0x14;
    const MAIN_ACTIVITY: Id = 0x15;
    const OBJECT_ARRAY: Id = 0x16;

    fn analyze(data: Vec<u8>) -> HeapAnalysis {
        testing::analyze(data).unwrap()
    }

    fn analyze_with(data: Vec<u8>, config: AnalysisConfig) -> HeapAnalysis {
        testing::analyze_with(data, config).unwrap()
    }

    fn node_writer() -> HprofWriter {
        let mut w = HprofWriter::new(4);
        w.define_class(NODE, "com.example.Node", 0, &[("next", FieldType::Object), ("payload", FieldType::Int)]);
        w
    }

    fn node(w: &mut HprofWriter, id: Id, next: Id) {
        w.instance_with(id, NODE, &[FieldValue::Object(next), FieldValue::Int(0)]);
    }

    #[test]
    fn test_strong_chain() {
        let mut w = node_writer();
        w.root_jni_global(0xa);
        node(&mut w, 0xa, 0xb);
        node(&mut w, 0xb, 0xc);
        node(&mut w, 0xc, 0);
        let analysis = analyze(w.finish());

        assert!(analysis.is_live(0xa) && analysis.is_live(0xb) && analysis.is_live(0xc));
        assert_eq!(analysis.live_object_count(), 3);
        assert_eq!(analysis.retained_size(0xa), Some(24));
        assert_eq!(analysis.retained_size(0xb), Some(16));
        assert_eq!(analysis.retained_size(0xc), Some(8));
        assert_eq!(analysis.immediate_dominator(0xa), Some(None));
        assert_eq!(analysis.immediate_dominator(0xc), Some(Some(0xb)));
        assert_eq!(analysis.total_retained_size(), 24);

        match analysis.path_to_root(0xc, StrengthFilter::empty()) {
            PathResult::Found { root_category, steps } => {
                assert_eq!(root_category, RootCategory::JniGlobal);
                let ids: Vec<Id> = steps.iter().map(|s| s.object_id).collect();
                assert_eq!(ids, vec![0xa, 0xb, 0xc]);
                assert_eq!(steps[0].via, None);
                assert_eq!(steps[2].via.as_deref(), Some(".next"));
            }
            PathResult::Unreachable => panic!("expected a path"),
        }

        let top = analysis.top_retained(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].object_id, 0xa);
        assert_eq!(top[0].retained_size, 24);
        assert_eq!(top[0].shallow_size, 8);
        assert_eq!(top[0].class_name, "com.example.Node");
    }

    #[test]
    fn test_cycle_under_root() {
        let mut w = node_writer();
        w.root_jni_global(0x1);
        node(&mut w, 0x1, 0x2);
        node(&mut w, 0x2, 0x3);
        node(&mut w, 0x3, 0x2);
        let analysis = analyze(w.finish());

        assert_eq!(analysis.immediate_dominator(0x2), Some(Some(0x1)));
        assert_eq!(analysis.immediate_dominator(0x3), Some(Some(0x2)));
        assert_eq!(analysis.retained_size(0x3), Some(8));
        assert_eq!(analysis.retained_size(0x2), Some(16));
        assert_eq!(analysis.retained_size(0x1), Some(24));
    }

    #[test]
    fn test_unreferenced_object_is_garbage() {
        let mut w = node_writer();
        w.root_jni_global(0x1);
        node(&mut w, 0x1, 0);
        node(&mut w, 0x9, 0x1);
        let analysis = analyze(w.finish());

        assert!(!analysis.is_live(0x9));
        assert_eq!(analysis.retained_size(0x9), None);
        assert_eq!(analysis.immediate_dominator(0x9), None);
        assert!(analysis.path_to_root(0x9, StrengthFilter::empty()).is_unreachable());
        assert!(analysis.path_to_root(0xdead, StrengthFilter::empty()).is_unreachable());
        assert!(analysis.garbage_object_count() >= 1);
    }

    fn weak_reference_dump() -> Vec<u8> {
        let mut w = HprofWriter::new(4);
        w.define_class(REFERENCE, "java.lang.ref.Reference", 0, &[("referent", FieldType::Object)]);
        w.define_class(WEAK_REF, "java.lang.ref.WeakReference", REFERENCE, &[]);
        w.define_class(NODE, "com.example.Node", 0, &[("next", FieldType::Object), ("payload", FieldType::Int)]);
        w.root_jni_global(0x1);
        w.instance_with(0x1, WEAK_REF, &[FieldValue::Object(0x2)]);
        w.instance_with(0x2, NODE, &[FieldValue::Object(0), FieldValue::Int(7)]);
        w.finish()
    }

    #[test]
    fn test_weak_referent_liveness_depends_on_filter() {
        let analysis = analyze(weak_reference_dump());
        assert!(analysis.is_live(0x1));
        assert!(!analysis.is_live(0x2));
        assert!(analysis.path_to_root(0x2, StrengthFilter::empty()).is_unreachable());

        let with_weak = StrengthFilter::from_strengths(&[Strength::Strong, Strength::Weak]);
        let live = analysis.reachable_with(with_weak);
        let target = analysis.model().objects.resolve(0x2).unwrap();
        assert!(live.is_live(target));

        let config = AnalysisConfig::default()
            .with_threads(1)
            .with_strengths(&[Strength::Strong, Strength::Weak]);
        let analysis = analyze_with(weak_reference_dump(), config);
        assert!(analysis.is_live(0x2));
        assert_eq!(analysis.retained_size(0x1), Some(4 + 8));
        assert!(!analysis.path_to_root(0x2, StrengthFilter::empty()).is_unreachable());
        let excluded = StrengthFilter::from_strengths(&[Strength::Weak]);
        assert!(analysis.path_to_root(0x2, excluded).is_unreachable());
    }

    #[test]
    fn test_duplicate_string_contents() {
        let mut w = HprofWriter::new(4);
        w.define_class(STRING, "java.lang.String", 0, &[("value", FieldType::Object), ("hash", FieldType::Int)]);
        w.define_class(OBJECT_ARRAY, "java.lang.Object[]", 0, &[]);
        let count = 10_000u64;
        let strings: Vec<Id> = (0..count).map(|i| 0x10_0000 + i).collect();
        w.root_jni_global(0x1);
        w.object_array(0x1, OBJECT_ARRAY, &strings);
        for (i, &id) in strings.iter().enumerate() {
            let array = 0x20_0000 + i as u64;
            w.instance_with(id, STRING, &[FieldValue::Object(array), FieldValue::Int(0)]);
            w.char_array(array, "hello");
        }
        w.instance_with(0x2, STRING, &[FieldValue::Object(0x3), FieldValue::Int(0)]);
        w.char_array(0x3, "unique");
        w.root_jni_global(0x2);
        let analysis = analyze(w.finish());

        let report = analysis.duplicate_strings();
        assert_eq!(report.total_strings, 10_001);
        assert_eq!(report.distinct_contents, 2);
        assert_eq!(report.groups.len(), 1);
        let group = &report.groups[0];
        assert_eq!(group.count, 10_000);
        assert_eq!(group.per_instance_overhead, 8 + 10);
        assert_eq!(group.wasted_bytes, 9_999 * 18);
        assert_eq!(group.preview, "hello");
        assert_eq!(group.sample_ids.len(), 10);
        assert_eq!(report.total_wasted, group.wasted_bytes);
    }

    fn activity_dump(live: u64, garbage: u64) -> Vec<u8> {
        let mut w = HprofWriter::new(4);
        w.define_class(ACTIVITY, "android.app.Activity", 0, &[("mFinished", FieldType::Boolean)]);
        w.define_class(MAIN_ACTIVITY, "com.example.MainActivity", ACTIVITY, &[]);
        for i in 0..live {
            w.root_jni_global(0x100 + i);
            w.instance_with(0x100 + i, MAIN_ACTIVITY, &[FieldValue::Boolean(true)]);
        }
        for i in 0..garbage {
            w.instance_with(0x200 + i, MAIN_ACTIVITY, &[FieldValue::Boolean(true)]);
        }
        w.finish()
    }

    #[test]
    fn test_duplicate_lifecycle_instances() {
        let analysis = analyze(activity_dump(5, 3));
        let groups = analysis.duplicate_instances();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].class_name, "com.example.MainActivity");
        assert_eq!(groups[0].count, 5);

        let suspects = analysis.leak_suspects();
        let flagged: Vec<&LeakSuspect> = suspects
            .iter()
            .filter(|s| s.rule == RuleTag::DuplicateInstance)
            .collect();
        assert_eq!(flagged.len(), 5);
        assert!(flagged.iter().all(|s| s.class_name == "com.example.MainActivity"));
        assert!(flagged.iter().all(|s| !s.path.is_unreachable()));
    }

    #[test]
    fn test_single_lifecycle_instance_not_flagged() {
        let analysis = analyze(activity_dump(1, 4));
        assert!(analysis.duplicate_instances().is_empty());
    }

    #[test]
    fn test_retained_invariants() {
        let mut w = node_writer();
        w.root_jni_global(0x1);
        w.root(SubRecordTag::RootStickyClass, 0x4);
        node(&mut w, 0x1, 0x2);
        node(&mut w, 0x2, 0x3);
        node(&mut w, 0x3, 0x1);
        node(&mut w, 0x4, 0x3);
        node(&mut w, 0x5, 0x4);
        let analysis = analyze(w.finish());
        let ctx = analysis.context();

        for index in ctx.live_indices() {
            let retained = ctx.retained(index).unwrap();
            assert!(retained >= ctx.shallow(index));
        }
        let live_total: u64 = ctx.live_indices().iter().map(|&i| ctx.shallow(i)).sum();
        assert_eq!(analysis.total_retained_size(), live_total);
        assert_eq!(analysis.immediate_dominator(0x3), Some(None));
        assert!(!analysis.is_live(0x5));

        let again = analysis.reachable_with(StrengthFilter::strong_only());
        assert_eq!(&again, ctx.live);
    }

    #[test]
    fn test_truncated_dump_keeps_partial_result() {
        let mut w = node_writer();
        w.root_jni_global(0x1);
        node(&mut w, 0x1, 0);
        let mut data = w.finish();
        data.extend_from_slice(&[0x01, 0, 0, 0, 0, 0, 0, 0, 0x10]);
        let analysis = analyze(data);

        assert!(analysis.is_partial());
        assert!(analysis.is_live(0x1));
        assert_eq!(analysis.warning_summary().count("truncated"), 1);
        assert!(analysis.summary().partial);
    }

    #[test]
    fn test_dangling_reference_counted() {
        let mut w = node_writer();
        w.root_jni_global(0x1);
        node(&mut w, 0x1, 0xbad);
        let analysis = analyze(w.finish());

        assert_eq!(analysis.graph().dangling().len(), 1);
        assert_eq!(analysis.warning_summary().count("unresolved-reference"), 1);
        assert_eq!(analysis.live_object_count(), 1);
    }

    #[test]
    fn test_summary_serializes() {
        let mut w = node_writer();
        w.root_jni_global(0x1);
        node(&mut w, 0x1, 0);
        let analysis = analyze(w.finish());
        let summary = analysis.summary();
        assert_eq!(summary.live_objects, 1);
        assert!(summary.dominators_computed);
        assert_eq!(summary.roots.get(&RootCategory::JniGlobal), Some(&1));
        assert_eq!(summary.timings.len(), 7);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"live_objects\":1"));
        assert_eq!(analysis.root_categories(0x1), &[RootCategory::JniGlobal]);
    }
}
