//! Pipeline configuration from YAML

use crate::core::step::{Step, StepKind};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Initial text fed to the first step
    #[serde(default)]
    pub input: Option<String>,

    /// Pipeline steps, in execution order
    pub steps: Vec<StepConfig>,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Step identifier; defaults to `step-<n>` (1-based)
    #[serde(default)]
    pub id: Option<String>,

    /// Transformation to apply
    pub kind: StepKind,

    /// Kind-specific settings
    #[serde(default)]
    pub config: HashMap<String, String>,
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            anyhow::bail!("Pipeline '{}' has no steps", self.name);
        }

        let mut seen_ids = HashSet::new();
        for step in self.to_steps() {
            if !seen_ids.insert(step.id.clone()) {
                anyhow::bail!("Duplicate step ID: {}", step.id);
            }
        }

        Ok(())
    }

    /// Build the ordered step list
    pub fn to_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let id = step
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("step-{}", i + 1));
                Step::new(id, step.kind, step.config.clone())
            })
            .collect()
    }
}
