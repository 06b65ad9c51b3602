//! The queryable orchestrator.

use tracing::debug;

use crate::config::{check_take, EvaluatorConfig};
use crate::error::Result;
use crate::evaluators::Stage;
use crate::queryable::Queryable;
use crate::specification::{SelectSpecification, Specification};

/// Folds a specification into a [`Queryable`], one stage at a time.
///
/// The stage list is fixed at construction. Evaluating only borrows the
/// specification, so one evaluator can be shared freely across threads.
///
/// ```
/// use criteria::{MemoryQueryable, Specification, SpecificationEvaluator, Value};
///
/// let spec = Specification::<u32>::builder()
///     .filter(|n| n % 3 == 0)
///     .order_by_descending(|n| Value::from(*n))
///     .and()
///     .take(2)
///     .build()
///     .unwrap();
///
/// let evaluator = SpecificationEvaluator::default();
/// let query = evaluator
///     .get_query(MemoryQueryable::new((1..=10).collect::<Vec<u32>>()), &spec, false)
///     .unwrap();
/// assert_eq!(query.to_list(), vec![9, 6]);
///
/// let count = evaluator
///     .get_query(MemoryQueryable::new((1..=10).collect::<Vec<u32>>()), &spec, true)
///     .unwrap()
///     .count();
/// assert_eq!(count, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecificationEvaluator {
    stages: Vec<Stage>,
    max_take: Option<usize>,
}

impl Default for SpecificationEvaluator {
    fn default() -> Self {
        SpecificationEvaluator {
            stages: Stage::DEFAULT.to_vec(),
            max_take: None,
        }
    }
}

impl SpecificationEvaluator {
    /// Creates an evaluator from a validated configuration.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(SpecificationEvaluator {
            stages: config.stages.clone(),
            max_take: config.max_take,
        })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn max_take(&self) -> Option<usize> {
        self.max_take
    }

    /// Applies the pipeline to `query`.
    ///
    /// With `criteria_only`, only stages that do not affect the shape of the
    /// result run (no ordering, paging or includes), which is what a count
    /// needs. The `max_take` limit only applies when paging runs.
    pub fn get_query<T, Q: Queryable<T>>(
        &self,
        query: Q,
        specification: &Specification<T>,
        criteria_only: bool,
    ) -> Result<Q> {
        if !criteria_only {
            check_take(specification.take(), self.max_take)?;
        }
        self.stages
            .iter()
            .filter(|stage| !criteria_only || stage.is_criteria())
            .try_fold(query, |query, stage| {
                debug!(stage = %stage, criteria_only, "applying evaluator");
                stage.get_query(query, specification)
            })
    }

    /// Applies the full pipeline, then projects with the selector.
    pub fn get_projected_query<T, R, Q: Queryable<T>>(
        &self,
        query: Q,
        specification: &SelectSpecification<T, R>,
    ) -> Result<Q::Projected<R>> {
        let selector = specification.require_selector()?;
        let query = self.get_query(query, specification.criteria(), false)?;
        debug!("applying selector");
        Ok(query.select(selector))
    }
}
