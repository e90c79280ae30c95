// Tue Jan 13 2026 - Alex

pub mod bitmaps;
pub mod collections;
pub mod context;
pub mod histogram;
pub mod leaks;
pub mod path;
pub mod strings;
pub mod top;

pub use bitmaps::{analyze_bitmaps, pixel_format, BitmapInfo, BitmapReport};
pub use collections::{collection_stats, CollectionClassStats, CollectionInstance, CollectionIssue, CollectionReport};
pub use context::AnalysisContext;
pub use histogram::{
    class_histogram, heap_totals, large_primitive_arrays, package_histogram, primitive_array_histogram, string_stats,
    ClassHistogramEntry, HeapTotals, HistogramFilter, LargeArray, PackageHistogramEntry, PrimitiveArrayEntry,
    StringStats,
};
pub use leaks::{
    AccumulationPointRule, DuplicateInstanceGroup, DuplicateInstanceRule, Finding, LeakDetector, LeakRule,
    LeakSuspect, RuleTag,
};
pub use path::{path_to_root, PathResult, PathStep};
pub use strings::{duplicate_strings, read_string, DuplicateStringGroup, StringDuplicateReport};
pub use top::{dominated_children, top_retained, RetainedEntry};
