//! Evaluator pipeline configuration.
//!
//! ```yaml
//! stages: [where, search, order, pagination]
//! in_memory_stages: [where, order, pagination]
//! max_take: 500
//! ```
//!
//! Missing keys fall back to the defaults of [`EvaluatorConfig::default`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecificationError};
use crate::evaluators::Stage;

/// Stage lists and limits for the two orchestrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Queryable pipeline, in application order.
    pub stages: Vec<Stage>,
    /// In-memory pipeline, in application order.
    pub in_memory_stages: Vec<Stage>,
    /// Upper bound for `take`. Unbounded when absent.
    pub max_take: Option<usize>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            stages: Stage::DEFAULT.to_vec(),
            in_memory_stages: Stage::IN_MEMORY.to_vec(),
            max_take: None,
        }
    }
}

impl EvaluatorConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: EvaluatorConfig =
            serde_yaml::from_str(yaml).map_err(|e| SpecificationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EvaluatorConfig =
            serde_json::from_str(json).map_err(|e| SpecificationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_stages("stages", &self.stages)?;
        validate_stages("in_memory_stages", &self.in_memory_stages)?;
        if let Some(stage) = self
            .in_memory_stages
            .iter()
            .find(|s| !s.supports_in_memory())
        {
            return Err(SpecificationError::NotSupported {
                feature: stage.name(),
            });
        }
        if self.max_take == Some(0) {
            return Err(SpecificationError::invalid_argument(
                "max_take",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn validate_stages(argument: &'static str, stages: &[Stage]) -> Result<()> {
    if stages.is_empty() {
        return Err(SpecificationError::invalid_argument(
            argument,
            "at least one stage is required",
        ));
    }
    let mut seen = HashSet::new();
    for stage in stages {
        if !seen.insert(stage) {
            return Err(SpecificationError::invalid_argument(
                argument,
                format!("stage '{}' is listed twice", stage),
            ));
        }
    }
    Ok(())
}

/// Rejects a `take` above the configured maximum.
pub(crate) fn check_take(take: Option<usize>, max_take: Option<usize>) -> Result<()> {
    match (take, max_take) {
        (Some(take), Some(max)) if take > max => Err(SpecificationError::invalid_argument(
            "take",
            format!("{} exceeds the configured maximum of {}", take, max),
        )),
        _ => Ok(()),
    }
}
