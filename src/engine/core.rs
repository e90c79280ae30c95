// Tue Jan 13 2026 - Alex

use crate::config::AnalysisConfig;
use crate::dominator::{DominatorTree, LiveSet, RetainedSizes};
use crate::engine::{AnalysisWarning, EngineError, HeapAnalysis, Stage, StageState, StageTiming, WarningSummary};
use crate::graph::{GcRootRegistry, GraphBuilder};
use crate::hprof::{HprofParser, HprofSource};
use crate::model::{HeapModelBuilder, ObjectIndex};
use crate::query::LeakDetector;
use crate::utils::{percentage, Budget, ProgressLogger, ScopedTimer};
use bytes::Bytes;
use std::path::Path;
use std::time::Instant;

const PARSE_CHECK_INTERVAL: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Parsing,
    BuildingGraph,
    Analyzing,
    Completed,
    Failed,
}

pub struct Engine {
    config: AnalysisConfig,
    state: EngineState,
}

impl Engine {
    pub fn new(config: AnalysisConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(Self {
            config,
            state: EngineState::Idle,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze_file<P: AsRef<Path>>(&mut self, path: P) -> Result<HeapAnalysis, EngineError> {
        let source = HprofSource::open(path)?;
        self.analyze_source(&source)
    }

    pub fn analyze_source(&mut self, source: &HprofSource) -> Result<HeapAnalysis, EngineError> {
        self.analyze_bytes(source.bytes())
    }

    pub fn analyze_bytes(&mut self, data: impl Into<Bytes>) -> Result<HeapAnalysis, EngineError> {
        let result = self.run(data.into());
        self.state = if result.is_ok() {
            EngineState::Completed
        } else {
            EngineState::Failed
        };
        result
    }

    fn run(&mut self, data: Bytes) -> Result<HeapAnalysis, EngineError> {
        let config = self.config.clone();
        let budget = Budget::new(config.timeout(), config.parse.max_objects);
        let leak_detector = LeakDetector::from_config(&config.leaks).map_err(EngineError::InvalidConfig)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

        let mut warnings: Vec<AnalysisWarning> = Vec::new();
        let mut timings: Vec<StageTiming> = Vec::new();

        self.state = EngineState::Parsing;
        let started = Instant::now();
        let (builder, partial) = Self::parse(data, &config, &budget, &mut warnings)?;
        let parse_state = if partial { StageState::Cancelled } else { StageState::Completed };
        timings.push(StageTiming::new(Stage::Parse, parse_state, started.elapsed()));

        let started = Instant::now();
        let (model, model_errors) = {
            let _timer = ScopedTimer::new("model");
            builder.finish()
        };
        warnings.extend(model_errors.into_iter().map(AnalysisWarning::from));
        timings.push(StageTiming::new(Stage::Model, StageState::Completed, started.elapsed()));

        self.state = EngineState::BuildingGraph;
        let started = Instant::now();
        let (graph, graph_errors) = {
            let _timer = ScopedTimer::new("graph");
            GraphBuilder::new(&model).build()
        };
        warnings.extend(graph_errors.into_iter().map(AnalysisWarning::from));
        timings.push(StageTiming::new(Stage::Graph, StageState::Completed, started.elapsed()));

        let started = Instant::now();
        let (roots, root_errors) = GcRootRegistry::from_records(&model.roots, &model.objects);
        warnings.extend(root_errors.into_iter().map(AnalysisWarning::from));
        timings.push(StageTiming::new(Stage::Roots, StageState::Completed, started.elapsed()));

        self.state = EngineState::Analyzing;
        let anchor_unreachable = config.reachability.anchor_unreachable_roots;
        let anchors = roots.anchors(anchor_unreachable);
        let filter = config.strength_filter();

        let started = Instant::now();
        let live = {
            let _timer = ScopedTimer::new("reachability");
            LiveSet::compute(&graph, &anchors, filter)
        };
        timings.push(StageTiming::new(Stage::Reachability, StageState::Completed, started.elapsed()));

        let started = Instant::now();
        let dominators = {
            let _timer = ScopedTimer::new("dominators");
            match budget
                .check_deadline()
                .and_then(|_| DominatorTree::compute(&graph, &anchors, filter, &budget))
            {
                Ok(tree) => Some(tree),
                Err(e) => {
                    log::warn!("dominator computation abandoned: {}", e);
                    warnings.push(AnalysisWarning::Cancelled(Stage::Dominators, e));
                    None
                }
            }
        };
        let dominator_state = if dominators.is_some() { StageState::Completed } else { StageState::Cancelled };
        timings.push(StageTiming::new(Stage::Dominators, dominator_state, started.elapsed()));

        let started = Instant::now();
        let retained = dominators.as_ref().map(|tree| {
            let _timer = ScopedTimer::new("retained sizes");
            let shallow = (0..model.objects.len())
                .map(|i| model.shallow_size(ObjectIndex(i as u32)))
                .collect();
            let sizes = RetainedSizes::compute(tree, shallow);
            if !sizes.is_consistent() {
                log::error!(
                    "retained size of the super-root ({}) differs from the live heap ({})",
                    sizes.root_retained(),
                    sizes.live_shallow_total()
                );
            }
            sizes
        });
        let retained_state = if retained.is_some() { StageState::Completed } else { StageState::Skipped };
        timings.push(StageTiming::new(Stage::RetainedSizes, retained_state, started.elapsed()));

        let summary = WarningSummary::from_warnings(&warnings);
        for (kind, count) in &summary.by_kind {
            log::warn!("{} {} warnings", count, kind);
        }
        log::info!(
            "analysis complete: {} live, {} garbage ({:.1}%), {} warnings{}",
            live.live_count(),
            live.garbage_count(),
            percentage(live.garbage_count() as u64, live.node_count() as u64),
            summary.total,
            if partial { " (partial dump)" } else { "" }
        );

        Ok(HeapAnalysis::new(
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
        ))
    }

    fn parse(
        data: Bytes,
        config: &AnalysisConfig,
        budget: &Budget,
        warnings: &mut Vec<AnalysisWarning>,
    ) -> Result<(HeapModelBuilder, bool), EngineError> {
        let _timer = ScopedTimer::new("parse");
        let mut parser = HprofParser::new(data, config.parse.strict_version)?;
        log::info!("parsing {}", parser.header());
        let mut builder = HeapModelBuilder::new(parser.header().clone());
        let mut progress = ProgressLogger::new("parse", parser.total_len() as u64);
        let mut partial = false;
        let mut count = 0usize;

        while let Some(item) = parser.next() {
            match item {
                Ok(record) => builder.accept(record),
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    log::warn!("{}; keeping {} records decoded so far", e, count);
                    warnings.push(AnalysisWarning::Parse(e));
                    partial = true;
                    break;
                }
            }
            count += 1;
            let over_budget = budget.check_objects(builder.object_count()).and_then(|_| {
                if count % PARSE_CHECK_INTERVAL == 0 {
                    progress.update(parser.position());
                    budget.check_deadline()
                } else {
                    Ok(())
                }
            });
            if let Err(e) = over_budget {
                log::warn!("parse abandoned after {} records: {}", count, e);
                warnings.push(AnalysisWarning::Cancelled(Stage::Parse, e));
                partial = true;
                break;
            }
        }
        progress.update(parser.position());
        log::debug!("parser: {:?}", parser.stats());
        Ok((builder, partial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hprof::{FieldType, HprofError};
    use crate::utils::testing::HprofWriter;

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig::default().with_threads(0);
        assert!(matches!(Engine::new(config), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_identifier_width_is_fatal() {
        let mut data = b"JAVA PROFILE 1.0.2\0".to_vec();
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&0u64.to_be_bytes());
        let mut engine = Engine::new(AnalysisConfig::default()).unwrap();
        let result = engine.analyze_bytes(data);
        assert!(matches!(
            result,
            Err(EngineError::Hprof(HprofError::UnsupportedIdentifierWidth(2)))
        ));
        assert_eq!(engine.state(), EngineState::Failed);
    }

    #[test]
    fn test_unknown_version_rejected_when_strict() {
        let w = HprofWriter::with_version("JAVA PROFILE 9.9", 4);
        let mut engine = Engine::new(AnalysisConfig::default()).unwrap();
        assert!(matches!(
            engine.analyze_bytes(w.finish()),
            Err(EngineError::Hprof(HprofError::UnsupportedVersion(_)))
        ));

        let w = HprofWriter::with_version("JAVA PROFILE 9.9", 4);
        let mut lenient = Engine::new(AnalysisConfig::default().with_strict_version(false)).unwrap();
        assert!(lenient.analyze_bytes(w.finish()).is_ok());
    }

    #[test]
    fn test_object_budget_gives_partial_result() {
        let mut w = HprofWriter::new(4);
        for i in 0..10u64 {
            w.primitive_array(0x100 + i, FieldType::Byte, &[0; 4]);
        }
        let config = AnalysisConfig::default().with_max_objects(3);
        let mut engine = Engine::new(config).unwrap();
        let analysis = engine.analyze_bytes(w.finish()).unwrap();
        assert!(analysis.is_partial());
        assert_eq!(analysis.model().objects.len(), 4);
        assert_eq!(analysis.warning_summary().count("cancelled"), 1);
    }

    #[test]
    fn test_empty_dump() {
        let w = HprofWriter::new(8);
        let mut engine = Engine::new(AnalysisConfig::default()).unwrap();
        let analysis = engine.analyze_bytes(w.finish()).unwrap();
        assert_eq!(analysis.live_object_count(), 0);
        assert_eq!(analysis.total_retained_size(), 0);
        assert!(analysis.top_retained(10).is_empty());
        assert!(!analysis.is_partial());
        assert_eq!(engine.state(), EngineState::Completed);
    }
}
