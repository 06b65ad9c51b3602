//! The in-memory orchestrator.

use tracing::debug;

use crate::config::{check_take, EvaluatorConfig};
use crate::error::{Result, SpecificationError};
use crate::evaluators::Stage;
use crate::specification::{SelectSpecification, Specification};

/// Evaluates specifications directly against a `Vec<T>`.
///
/// Only where, order and pagination have in-memory meaning. Specifications
/// carrying search criteria are rejected before anything runs; includes and
/// tracking flags are ignored. Post-processing runs last, on the final
/// result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemorySpecificationEvaluator {
    stages: Vec<Stage>,
    max_take: Option<usize>,
}

impl Default for InMemorySpecificationEvaluator {
    fn default() -> Self {
        InMemorySpecificationEvaluator {
            stages: Stage::IN_MEMORY.to_vec(),
            max_take: None,
        }
    }
}

impl InMemorySpecificationEvaluator {
    /// Creates an evaluator from a validated configuration.
    ///
    /// Queryable-only stages in `in_memory_stages` fail with `NotSupported`.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(InMemorySpecificationEvaluator {
            stages: config.in_memory_stages.clone(),
            max_take: config.max_take,
        })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Runs the pipeline, then post-processing.
    pub fn evaluate<T>(&self, items: Vec<T>, specification: &Specification<T>) -> Result<Vec<T>> {
        let items = self.run(items, specification, false)?;
        Ok(match specification.post_processing_action() {
            Some(action) => action(items),
            None => items,
        })
    }

    /// Runs the pipeline and projects each remaining item.
    ///
    /// Post-processing of the criteria runs before the projection;
    /// post-processing of the projection runs after it.
    pub fn evaluate_projected<T, R>(
        &self,
        items: Vec<T>,
        specification: &SelectSpecification<T, R>,
    ) -> Result<Vec<R>> {
        let selector = specification.require_selector()?;
        let items = self.evaluate(items, specification.criteria())?;
        let projected: Vec<R> = items.iter().map(|item| selector(item)).collect();
        Ok(match specification.post_processing_action() {
            Some(action) => action(projected),
            None => projected,
        })
    }

    /// Counts matching items, ignoring ordering and paging.
    pub fn count<T>(&self, items: Vec<T>, specification: &Specification<T>) -> Result<usize> {
        self.run(items, specification, true).map(|items| items.len())
    }

    fn run<T>(
        &self,
        items: Vec<T>,
        specification: &Specification<T>,
        criteria_only: bool,
    ) -> Result<Vec<T>> {
        if !specification.search_criteria().is_empty() {
            return Err(SpecificationError::NotSupported { feature: "search" });
        }
        if !criteria_only {
            check_take(specification.take(), self.max_take)?;
        }
        self.stages
            .iter()
            .filter(|stage| !criteria_only || stage.is_criteria())
            .try_fold(items, |items, stage| {
                debug!(
                    stage = %stage,
                    criteria_only,
                    rows = items.len(),
                    "applying in-memory evaluator"
                );
                stage.evaluate(items, specification)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: String,
    }

    fn person(name: &str) -> Person {
        Person {
            name: name.to_string(),
        }
    }

    #[test]
    fn search_is_rejected_not_dropped() {
        let spec = Specification::<Person>::builder()
            .search(|p| Some(p.name.as_str()), "A%")
            .build()
            .unwrap();
        let evaluator = InMemorySpecificationEvaluator::default();
        assert!(matches!(
            evaluator.evaluate(vec![person("Ann")], &spec),
            Err(SpecificationError::NotSupported { feature: "search" })
        ));
        assert!(matches!(
            evaluator.count(vec![person("Ann")], &spec),
            Err(SpecificationError::NotSupported { feature: "search" })
        ));
    }

    #[test]
    fn projection_selects_names() {
        let spec = Specification::<Person>::builder()
            .select(|p: &Person| p.name.clone())
            .build()
            .unwrap();
        let names = InMemorySpecificationEvaluator::default()
            .evaluate_projected(vec![person("A"), person("B")], &spec)
            .unwrap();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn projection_without_selector() {
        let spec: SelectSpecification<Person, String> =
            SelectSpecification::new(Specification::new());
        let evaluator = InMemorySpecificationEvaluator::default();
        assert!(matches!(
            evaluator.evaluate_projected(vec![person("A")], &spec),
            Err(SpecificationError::SelectorNotFound)
        ));
    }

    #[test]
    fn post_processing_runs_on_final_result() {
        let spec = Specification::<i32>::builder()
            .order_by(|n| Value::from(*n))
            .and()
            .take(3)
            .post_processing(|mut items| {
                items.reverse();
                items
            })
            .build()
            .unwrap();
        let result = InMemorySpecificationEvaluator::default()
            .evaluate(vec![5, 1, 4, 2, 3], &spec)
            .unwrap();
        assert_eq!(result, vec![3, 2, 1]);
    }

    #[test]
    fn count_ignores_paging() {
        let spec = Specification::<i32>::builder()
            .filter(|n| *n > 1)
            .paginate(1, 1)
            .build()
            .unwrap();
        let evaluator = InMemorySpecificationEvaluator::default();
        assert_eq!(evaluator.count(vec![1, 2, 3, 4], &spec).unwrap(), 3);
        assert_eq!(evaluator.evaluate(vec![1, 2, 3, 4], &spec).unwrap(), vec![3]);
    }

    #[test]
    fn max_take_limits_lists_but_not_counts() {
        let config = EvaluatorConfig {
            max_take: Some(2),
            ..EvaluatorConfig::default()
        };
        let evaluator = InMemorySpecificationEvaluator::from_config(&config).unwrap();
        let spec = Specification::<i32>::builder()
            .filter(|n| *n > 1)
            .take(10)
            .build()
            .unwrap();
        assert_eq!(evaluator.count(vec![1, 2, 3, 4], &spec).unwrap(), 3);
        assert!(matches!(
            evaluator.evaluate(vec![1, 2, 3, 4], &spec),
            Err(SpecificationError::InvalidArgument { argument: "take", .. })
        ));
    }

    #[test]
    fn queryable_only_stage_in_config() {
        let config = EvaluatorConfig {
            in_memory_stages: vec![Stage::Where, Stage::Include],
            ..EvaluatorConfig::default()
        };
        assert!(matches!(
            InMemorySpecificationEvaluator::from_config(&config),
            Err(SpecificationError::NotSupported { feature: "include" })
        ));
    }
}
