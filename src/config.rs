// Tue Jan 13 2026 - Alex

use crate::graph::{Strength, StrengthFilter};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub parse: ParseConfig,
    pub reachability: ReachabilityConfig,
    pub leaks: LeakConfig,
    pub strings: StringConfig,
    pub bitmaps: BitmapConfig,
    pub collections: CollectionConfig,
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    pub strict_version: bool,
    pub max_objects: Option<usize>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachabilityConfig {
    pub strengths: Vec<Strength>,
    pub anchor_unreachable_roots: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakConfig {
    pub lifecycle_patterns: Vec<String>,
    pub duplicate_threshold: usize,
    pub accumulation_ratio: f64,
    pub accumulation_min_retained: u64,
    pub max_suspects: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StringConfig {
    pub string_class: String,
    pub value_field: String,
    pub min_group_size: usize,
    pub preview_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BitmapConfig {
    pub class_name: String,
    pub width_field: String,
    pub height_field: String,
    pub format_field: String,
    pub size_threshold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacitySource {
    ArrayLength(String),
    IntField(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub class_name: String,
    pub count_field: String,
    pub capacity: CapacitySource,
}

impl CollectionSpec {
    pub fn new(class_name: &str, count_field: &str, capacity: CapacitySource) -> Self {
        Self {
            class_name: class_name.to_string(),
            count_field: count_field.to_string(),
            capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub specs: Vec<CollectionSpec>,
    pub low_utilization: f64,
    pub min_capacity: u64,
    pub empty_retained_floor: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parse: ParseConfig::default(),
            reachability: ReachabilityConfig::default(),
            leaks: LeakConfig::default(),
            strings: StringConfig::default(),
            bitmaps: BitmapConfig::default(),
            collections: CollectionConfig::default(),
            threads: num_cpus::get(),
        }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            strict_version: true,
            max_objects: None,
            timeout_seconds: None,
        }
    }
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            strengths: vec![Strength::Strong],
            anchor_unreachable_roots: false,
        }
    }
}

impl Default for LeakConfig {
    fn default() -> Self {
        Self {
            lifecycle_patterns: vec![
                r"^android\.app\.Activity$".to_string(),
                r"^android\.app\.Fragment$".to_string(),
                r"^androidx\.fragment\.app\.Fragment$".to_string(),
                r"^android\.app\.Service$".to_string(),
            ],
            duplicate_threshold: 1,
            accumulation_ratio: 50.0,
            accumulation_min_retained: 1024 * 1024,
            max_suspects: 100,
        }
    }
}

impl Default for StringConfig {
    fn default() -> Self {
        Self {
            string_class: "java.lang.String".to_string(),
            value_field: "value".to_string(),
            min_group_size: 2,
            preview_chars: 64,
        }
    }
}

impl Default for BitmapConfig {
    fn default() -> Self {
        Self {
            class_name: "android.graphics.Bitmap".to_string(),
            width_field: "mWidth".to_string(),
            height_field: "mHeight".to_string(),
            format_field: "mConfig".to_string(),
            size_threshold: 4 * 1024 * 1024,
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        use CapacitySource::{ArrayLength, IntField};
        Self {
            specs: vec![
                CollectionSpec::new("java.util.HashMap", "size", ArrayLength("table".to_string())),
                CollectionSpec::new("java.util.ArrayList", "size", ArrayLength("elementData".to_string())),
                CollectionSpec::new("android.util.ArrayMap", "mSize", ArrayLength("mHashes".to_string())),
                CollectionSpec::new("android.util.SparseArray", "mSize", ArrayLength("mKeys".to_string())),
                CollectionSpec::new("java.util.Vector", "elementCount", ArrayLength("elementData".to_string())),
                CollectionSpec::new("android.util.LruCache", "size", IntField("maxSize".to_string())),
            ],
            low_utilization: 0.25,
            min_capacity: 16,
            empty_retained_floor: 64 * 1024,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn with_strengths(mut self, strengths: &[Strength]) -> Self {
        self.reachability.strengths = strengths.to_vec();
        self
    }

    pub fn with_lifecycle_patterns(mut self, patterns: &[&str]) -> Self {
        self.leaks.lifecycle_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_duplicate_threshold(mut self, threshold: usize) -> Self {
        self.leaks.duplicate_threshold = threshold;
        self
    }

    pub fn with_accumulation(mut self, ratio: f64, min_retained: u64) -> Self {
        self.leaks.accumulation_ratio = ratio;
        self.leaks.accumulation_min_retained = min_retained;
        self
    }

    pub fn with_max_suspects(mut self, max_suspects: usize) -> Self {
        self.leaks.max_suspects = max_suspects;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.parse.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.parse.max_objects = Some(max_objects);
        self
    }

    pub fn with_strict_version(mut self, strict: bool) -> Self {
        self.parse.strict_version = strict;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_bitmap_threshold(mut self, bytes: u64) -> Self {
        self.bitmaps.size_threshold = bytes;
        self
    }

    pub fn strength_filter(&self) -> StrengthFilter {
        StrengthFilter::from_strengths(&self.reachability.strengths)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.parse.timeout_seconds.map(Duration::from_secs)
    }

    pub fn lifecycle_regexes(&self) -> Result<Vec<Regex>, String> {
        self.leaks
            .lifecycle_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| format!("lifecycle pattern {:?}: {}", p, e)))
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.threads == 0 {
            return Err("threads must be greater than 0".to_string());
        }
        if self.reachability.strengths.is_empty() {
            return Err("at least one reference strength must be traversed".to_string());
        }
        if self.leaks.accumulation_ratio <= 1.0 {
            return Err("accumulation_ratio must be greater than 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.collections.low_utilization) {
            return Err("low_utilization must be between 0.0 and 1.0".to_string());
        }
        if self.strings.min_group_size < 2 {
            return Err("min_group_size must be at least 2".to_string());
        }
        if self.parse.max_objects == Some(0) {
            return Err("max_objects must be greater than 0".to_string());
        }
        self.lifecycle_regexes()?;
        Ok(())
    }
}
