use tracing::debug;

use crate::error::{Result, SpecificationError};
use crate::expression::OrderExpression;
use crate::ordering::compare_by_chain;
use crate::queryable::Queryable;
use crate::specification::Specification;

use super::{Evaluator, InMemoryEvaluator};

/// Applies the ordering chain.
///
/// At most one primary entry (`order_by` / `order_by_descending`) is
/// allowed, and it must come first. Then-by entries with no primary are
/// promoted: the first acts as the primary key. A primary declared after a
/// then-by would be a second primary and fails with `DuplicateOrderChain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderEvaluator;

/// Resolves declared order entries into the effective chain.
///
/// The first element of the returned chain is the primary key.
pub(crate) fn resolve_chain<T>(
    expressions: &[OrderExpression<T>],
) -> Result<Vec<&OrderExpression<T>>> {
    let primaries = expressions.iter().filter(|o| o.kind().is_primary()).count();
    let Some(head) = expressions.first() else {
        return Ok(Vec::new());
    };
    if primaries > 1 || (primaries == 1 && !head.kind().is_primary()) {
        return Err(SpecificationError::DuplicateOrderChain);
    }
    if primaries == 0 {
        debug!(key = head.description(), "promoted leading then_by to primary ordering");
    }
    Ok(expressions.iter().collect())
}

impl Evaluator for OrderEvaluator {
    fn name(&self) -> &'static str {
        "order"
    }

    fn is_criteria_evaluator(&self) -> bool {
        false
    }

    fn get_query<T, Q: Queryable<T>>(
        &self,
        query: Q,
        specification: &Specification<T>,
    ) -> Result<Q> {
        let chain = resolve_chain(specification.order_expressions())?;
        let Some((primary, rest)) = chain.split_first() else {
            return Ok(query);
        };
        Ok(rest
            .iter()
            .fold(query.order_by(primary), |query, expression| {
                query.then_by(expression)
            }))
    }
}

impl InMemoryEvaluator for OrderEvaluator {
    fn evaluate<T>(&self, mut items: Vec<T>, specification: &Specification<T>) -> Result<Vec<T>> {
        let chain = resolve_chain(specification.order_expressions())?;
        if !chain.is_empty() {
            items.sort_by(|a, b| compare_by_chain(a, b, &chain));
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryQueryable;
    use crate::ordering::OrderKind;
    use crate::value::Value;

    fn len_key(kind: OrderKind) -> OrderExpression<&'static str> {
        OrderExpression::described(kind, "len", |s: &&'static str| Value::from(s.len()))
    }

    fn alpha_key(kind: OrderKind) -> OrderExpression<&'static str> {
        OrderExpression::described(kind, "alpha", |s: &&'static str| Value::from(*s))
    }

    fn words() -> Vec<&'static str> {
        vec!["pear", "fig", "apple", "kiwi", "date"]
    }

    fn spec(entries: Vec<OrderExpression<&'static str>>) -> Specification<&'static str> {
        entries
            .into_iter()
            .fold(Specification::builder(), |b, e| b.order(e))
            .build()
            .unwrap()
    }

    #[test]
    fn primary_then_secondary() {
        let spec = spec(vec![
            len_key(OrderKind::OrderByDescending),
            alpha_key(OrderKind::ThenBy),
        ]);
        assert_eq!(
            OrderEvaluator.evaluate(words(), &spec).unwrap(),
            vec!["apple", "date", "kiwi", "pear", "fig"]
        );
    }

    #[test]
    fn two_primaries_fail() {
        let spec = spec(vec![
            len_key(OrderKind::OrderBy),
            alpha_key(OrderKind::OrderByDescending),
        ]);
        assert!(matches!(
            OrderEvaluator.evaluate(words(), &spec),
            Err(SpecificationError::DuplicateOrderChain)
        ));
        assert!(matches!(
            OrderEvaluator.get_query(MemoryQueryable::new(words()), &spec),
            Err(SpecificationError::DuplicateOrderChain)
        ));
    }

    #[test]
    fn leading_then_by_is_promoted() {
        let spec = spec(vec![
            len_key(OrderKind::ThenBy),
            alpha_key(OrderKind::ThenByDescending),
        ]);
        assert_eq!(
            OrderEvaluator.evaluate(words(), &spec).unwrap(),
            vec!["fig", "pear", "kiwi", "date", "apple"]
        );
    }

    #[test]
    fn primary_after_then_by_fails() {
        let spec = spec(vec![
            len_key(OrderKind::ThenByDescending),
            alpha_key(OrderKind::OrderBy),
        ]);
        assert!(matches!(
            resolve_chain(spec.order_expressions()),
            Err(SpecificationError::DuplicateOrderChain)
        ));
        assert!(matches!(
            OrderEvaluator.evaluate(words(), &spec),
            Err(SpecificationError::DuplicateOrderChain)
        ));
        assert!(matches!(
            OrderEvaluator.get_query(MemoryQueryable::new(words()), &spec),
            Err(SpecificationError::DuplicateOrderChain)
        ));
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let spec = spec(vec![len_key(OrderKind::OrderBy)]);
        assert_eq!(
            OrderEvaluator.evaluate(words(), &spec).unwrap(),
            vec!["fig", "pear", "kiwi", "date", "apple"]
        );
    }

    #[test]
    fn queryable_receives_one_ordering() {
        let spec = spec(vec![
            len_key(OrderKind::OrderBy),
            alpha_key(OrderKind::ThenByDescending),
        ]);
        let query = OrderEvaluator
            .get_query(MemoryQueryable::new(words()), &spec)
            .unwrap();
        assert_eq!(query.explain(), "order_by(len asc, alpha desc)");
    }

    #[test]
    fn no_entries_is_identity() {
        let spec = Specification::new();
        assert_eq!(OrderEvaluator.evaluate(words(), &spec).unwrap(), words());
    }
}
