use crate::error::Result;
use crate::queryable::Queryable;
use crate::specification::Specification;

use super::{Evaluator, InMemoryEvaluator};

/// Applies every where-predicate in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhereEvaluator;

impl Evaluator for WhereEvaluator {
    fn name(&self) -> &'static str {
        "where"
    }

    fn is_criteria_evaluator(&self) -> bool {
        true
    }

    fn get_query<T, Q: Queryable<T>>(
        &self,
        query: Q,
        specification: &Specification<T>,
    ) -> Result<Q> {
        Ok(specification
            .where_expressions()
            .iter()
            .fold(query, |query, expression| query.filter(expression)))
    }
}

impl InMemoryEvaluator for WhereEvaluator {
    fn evaluate<T>(&self, mut items: Vec<T>, specification: &Specification<T>) -> Result<Vec<T>> {
        for expression in specification.where_expressions() {
            items.retain(|item| expression.matches(item));
        }
        Ok(items)
    }
}
