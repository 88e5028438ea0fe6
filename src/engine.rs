//! Analysis engine facade
//!
//! The one entry point external callers use. A run strings the pipeline
//! together in a fixed order: scope filtering, type graph construction,
//! domain classification, port classification. Anomaly detection happens
//! inside the domain pass.

use std::collections::BTreeMap;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::composition::CompositionStats;
use crate::config::AnalysisConfig;
use crate::core::{ClassificationResult, Error, Result};
use crate::domain;
use crate::graph::{SemanticModel, TypeGraph, TypeNode};
use crate::port::{PortClassification, PortClassifier};

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub result: ClassificationResult,
    pub ports: BTreeMap<String, PortClassification>,
    pub composition: CompositionStats,
}

/// Reusable pipeline over one validated configuration.
pub struct AnalysisEngine {
    config: AnalysisConfig,
    excludes: Vec<Pattern>,
}

impl AnalysisEngine {
    /// Validates the configuration once; bad exclude patterns fail here, not
    /// mid-run.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let excludes = config.compiled_excludes()?;
        Ok(Self { config, excludes })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs the full pipeline over a model.
    ///
    /// An empty input model is a contract violation. A model whose types are
    /// all excluded by scope patterns is not; it produces an empty report.
    pub fn analyze(&self, model: &SemanticModel) -> Result<AnalysisReport> {
        if model.is_empty() {
            return Err(Error::Validation(
                "semantic model contains no types".to_string(),
            ));
        }

        let scoped = self.scope(model)?;
        log::debug!(
            "analysis scope: {} of {} types after exclusions",
            scoped.len(),
            model.len()
        );

        let graph = TypeGraph::build(&scoped)?;
        let analysis = domain::classify(&scoped, &graph, &self.config);
        let ports = PortClassifier::new().classify_all(
            &scoped,
            &graph,
            &analysis.result,
            self.config.parallel,
        );

        Ok(AnalysisReport {
            result: analysis.result,
            ports,
            composition: analysis.composition.stats(),
        })
    }

    /// Drops excluded types before any phase sees them.
    fn scope(&self, model: &SemanticModel) -> Result<SemanticModel> {
        if self.excludes.is_empty() {
            return Ok(model.clone());
        }
        let kept: Vec<TypeNode> = model
            .types()
            .filter(|t| !self.excludes.iter().any(|p| p.matches(&t.qualified_name)))
            .cloned()
            .collect();
        SemanticModel::new(kept)
    }
}

/// One-shot run with a throwaway engine.
pub fn analyze(model: &SemanticModel, config: &AnalysisConfig) -> Result<AnalysisReport> {
    AnalysisEngine::new(config.clone())?.analyze(model)
}
