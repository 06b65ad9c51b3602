use crate::error::Result;
use crate::queryable::Queryable;
use crate::specification::Specification;

use super::Evaluator;

/// Forwards structured includes, then include strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeEvaluator;

impl Evaluator for IncludeEvaluator {
    fn name(&self) -> &'static str {
        "include"
    }

    fn is_criteria_evaluator(&self) -> bool {
        false
    }

    fn get_query<T, Q: Queryable<T>>(
        &self,
        query: Q,
        specification: &Specification<T>,
    ) -> Result<Q> {
        let query = specification
            .include_expressions()
            .iter()
            .fold(query, |query, include| query.include(include));
        Ok(specification
            .include_strings()
            .iter()
            .fold(query, |query, path| query.include_path(path)))
    }
}
