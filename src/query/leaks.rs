// Tue Jan 13 2026 - Alex

use crate::config::LeakConfig;
use crate::hprof::Id;
use crate::model::{HeapObject, ObjectIndex};
use crate::query::{path_to_root, AnalysisContext, PathResult};
use indexmap::IndexMap;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RuleTag {
    DuplicateInstance,
    AccumulationPoint,
}

impl RuleTag {
    pub fn name(&self) -> &'static str {
        match self {
            RuleTag::DuplicateInstance => "duplicate-instance",
            RuleTag::AccumulationPoint => "accumulation-point",
        }
    }
}

impl fmt::Display for RuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub index: ObjectIndex,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeakSuspect {
    pub object_id: Id,
    pub class_name: String,
    pub rule: RuleTag,
    pub explanation: String,
    pub shallow_size: u64,
    pub retained_size: Option<u64>,
    pub path: PathResult,
}

pub trait LeakRule: Send + Sync {
    fn tag(&self) -> RuleTag;
    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding>;

    fn description(&self) -> &str {
        ""
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateInstanceGroup {
    pub class_name: String,
    pub pattern: String,
    pub count: usize,
    pub object_ids: Vec<Id>,
}

/// Classes bound to a lifecycle scope are expected to have at most
/// `threshold` live instances. Patterns match the class name or any
/// superclass name; counting is per concrete class.
pub struct DuplicateInstanceRule {
    patterns: Vec<Regex>,
    threshold: usize,
}

impl DuplicateInstanceRule {
    pub fn new(patterns: Vec<Regex>, threshold: usize) -> Self {
        Self { patterns, threshold }
    }

    pub fn groups(&self, ctx: &AnalysisContext<'_>) -> Vec<DuplicateInstanceGroup> {
        let classes = &ctx.model.classes;
        let matched: IndexMap<Id, &Regex> = classes
            .iter()
            .filter_map(|record| {
                let lineage = classes.lineage(record.class_id);
                self.patterns
                    .iter()
                    .find(|p| lineage.iter().any(|ancestor| p.is_match(&ancestor.name)))
                    .map(|p| (record.class_id, p))
            })
            .collect();
        if matched.is_empty() {
            return Vec::new();
        }

        let mut by_class: IndexMap<Id, Vec<ObjectIndex>> = IndexMap::new();
        for index in ctx.live.iter_live() {
            if let HeapObject::Instance { class_id, .. } = &ctx.model.objects.get(index).object {
                if matched.contains_key(class_id) {
                    by_class.entry(*class_id).or_default().push(index);
                }
            }
        }

        let mut groups: Vec<DuplicateInstanceGroup> = by_class
            .into_iter()
            .filter(|(_, instances)| instances.len() > self.threshold)
            .map(|(class_id, instances)| DuplicateInstanceGroup {
                class_name: classes.name_of(class_id).unwrap_or("<unknown>").to_string(),
                pattern: matched.get(&class_id).map(|p| p.as_str().to_string()).unwrap_or_default(),
                count: instances.len(),
                object_ids: instances.iter().map(|&i| ctx.object_id(i)).collect(),
            })
            .collect();
        groups.sort_by(|a, b| b.count.cmp(&a.count).then(a.class_name.cmp(&b.class_name)));
        groups
    }
}

impl LeakRule for DuplicateInstanceRule {
    fn tag(&self) -> RuleTag {
        RuleTag::DuplicateInstance
    }

    fn description(&self) -> &str {
        "more live instances of a lifecycle-bound class than expected"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for group in self.groups(ctx) {
            for &object_id in &group.object_ids {
                if let Some(index) = ctx.model.objects.resolve(object_id) {
                    findings.push(Finding {
                        index,
                        explanation: format!(
                            "{} live instances of {} (matches {}, expected at most {})",
                            group.count, group.class_name, group.pattern, self.threshold
                        ),
                    });
                }
            }
        }
        findings
    }
}

pub struct AccumulationPointRule {
    ratio: f64,
    min_retained: u64,
}

impl AccumulationPointRule {
    pub fn new(ratio: f64, min_retained: u64) -> Self {
        Self { ratio, min_retained }
    }
}

impl LeakRule for AccumulationPointRule {
    fn tag(&self) -> RuleTag {
        RuleTag::AccumulationPoint
    }

    fn description(&self) -> &str {
        "retained size is a large multiple of shallow size"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        let retained = match ctx.retained {
            Some(retained) => retained,
            None => return Vec::new(),
        };
        ctx.live_indices()
            .into_par_iter()
            .filter_map(|index| {
                let size = retained.retained(index)?;
                let shallow = retained.shallow(index).max(1);
                let ratio = size as f64 / shallow as f64;
                (size > self.min_retained && ratio > self.ratio).then(|| Finding {
                    index,
                    explanation: format!(
                        "retains {} ({:.1}x its shallow size)",
                        crate::utils::format_bytes(size),
                        ratio
                    ),
                })
            })
            .collect()
    }
}

pub struct LeakDetector {
    rules: Vec<Box<dyn LeakRule>>,
    max_suspects: usize,
}

impl LeakDetector {
    pub fn new(max_suspects: usize) -> Self {
        Self {
            rules: Vec::new(),
            max_suspects,
        }
    }

    pub fn from_config(config: &LeakConfig) -> Result<Self, String> {
        let patterns = config
            .lifecycle_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| format!("lifecycle pattern {:?}: {}", p, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let mut detector = Self::new(config.max_suspects);
        detector.add_rule(Box::new(DuplicateInstanceRule::new(patterns, config.duplicate_threshold)));
        detector.add_rule(Box::new(AccumulationPointRule::new(
            config.accumulation_ratio,
            config.accumulation_min_retained,
        )));
        Ok(detector)
    }

    pub fn add_rule(&mut self, rule: Box<dyn LeakRule>) {
        self.rules.push(rule);
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Runs every rule and attaches a path over the edges the live set was
    /// computed with. The cap is shared round-robin between rules.
    pub fn detect(&self, ctx: &AnalysisContext<'_>) -> Vec<LeakSuspect> {
        let per_rule: Vec<(RuleTag, Vec<Finding>)> = self
            .rules
            .iter()
            .map(|rule| {
                let mut findings = rule.evaluate(ctx);
                log::debug!("rule {}: {} findings", rule.tag(), findings.len());
                findings.sort_by(|a, b| {
                    ctx.retained(b.index)
                        .cmp(&ctx.retained(a.index))
                        .then(ctx.object_id(a.index).cmp(&ctx.object_id(b.index)))
                });
                (rule.tag(), findings)
            })
            .collect();

        let counts: Vec<usize> = per_rule.iter().map(|(_, findings)| findings.len()).collect();
        let quotas = share_cap(&counts, self.max_suspects);
        let total: usize = counts.iter().sum();
        if total > self.max_suspects {
            log::info!("{} leak suspects, keeping {}", total, self.max_suspects);
        }

        let exclude = ctx.live.filter().complement();
        let mut suspects: Vec<LeakSuspect> = Vec::new();
        for ((tag, mut findings), quota) in per_rule.into_iter().zip(quotas) {
            findings.truncate(quota);
            let flagged: Vec<LeakSuspect> = findings
                .into_par_iter()
                .map(|finding| LeakSuspect {
                    object_id: ctx.object_id(finding.index),
                    class_name: ctx.class_name(finding.index),
                    rule: tag,
                    explanation: finding.explanation,
                    shallow_size: ctx.shallow(finding.index),
                    retained_size: ctx.retained(finding.index),
                    path: path_to_root(ctx, finding.index, exclude),
                })
                .collect();
            suspects.extend(flagged);
        }
        suspects
    }
}

/// Hands out `cap` slots one per rule per round until every rule is
/// exhausted or the cap is spent.
fn share_cap(available: &[usize], cap: usize) -> Vec<usize> {
    let mut quotas = vec![0; available.len()];
    let mut remaining = cap;
    while remaining > 0 {
        let mut progressed = false;
        for (quota, &count) in quotas.iter_mut().zip(available) {
            if remaining == 0 {
                break;
            }
            if *quota < count {
                *quota += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    quotas
}
