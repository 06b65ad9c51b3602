use std::collections::BTreeMap;

use crate::error::Result;
use crate::expression::SearchCriteria;
use crate::queryable::Queryable;
use crate::specification::Specification;

use super::Evaluator;

/// Applies search criteria, one `search` call per search group.
///
/// Groups are applied in ascending group number. There is no in-memory
/// counterpart.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEvaluator;

impl Evaluator for SearchEvaluator {
    fn name(&self) -> &'static str {
        "search"
    }

    fn is_criteria_evaluator(&self) -> bool {
        true
    }

    fn get_query<T, Q: Queryable<T>>(
        &self,
        query: Q,
        specification: &Specification<T>,
    ) -> Result<Q> {
        let mut groups: BTreeMap<i32, Vec<&SearchCriteria<T>>> = BTreeMap::new();
        for criteria in specification.search_criteria() {
            groups
                .entry(criteria.search_group())
                .or_default()
                .push(criteria);
        }
        Ok(groups
            .values()
            .fold(query, |query, group| query.search(group)))
    }
}
