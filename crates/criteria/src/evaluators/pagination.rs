use crate::error::Result;
use crate::queryable::Queryable;
use crate::specification::Specification;

use super::{Evaluator, InMemoryEvaluator};

/// Applies skip, then take. A skip of 0 is not emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationEvaluator;

impl Evaluator for PaginationEvaluator {
    fn name(&self) -> &'static str {
        "pagination"
    }

    fn is_criteria_evaluator(&self) -> bool {
        false
    }

    fn get_query<T, Q: Queryable<T>>(
        &self,
        mut query: Q,
        specification: &Specification<T>,
    ) -> Result<Q> {
        if let Some(skip) = specification.skip().filter(|s| *s > 0) {
            query = query.skip(skip);
        }
        if let Some(take) = specification.take() {
            query = query.take(take);
        }
        Ok(query)
    }
}

impl InMemoryEvaluator for PaginationEvaluator {
    fn evaluate<T>(&self, items: Vec<T>, specification: &Specification<T>) -> Result<Vec<T>> {
        let skip = specification.skip().unwrap_or(0);
        if skip == 0 && specification.take().is_none() {
            return Ok(items);
        }
        let take = specification.take().unwrap_or(usize::MAX);
        Ok(items.into_iter().skip(skip).take(take).collect())
    }
}
