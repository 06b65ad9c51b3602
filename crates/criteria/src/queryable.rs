//! The contract a query-translating backend implements.

use crate::expression::{
    IncludeExpression, OrderExpression, SearchCriteria, Selector, WhereExpression,
};

/// A composable, deferred query over items of type `T`.
///
/// Evaluators fold a specification into a queryable one concern at a time.
/// Every method consumes the queryable and returns the extended one;
/// nothing is executed until the backend materializes the query.
///
/// Implementations decide how to honor hints (`include`, the tracking
/// flags, `as_split_query`); backends without such notions record or ignore
/// them.
pub trait Queryable<T>: Sized {
    /// The queryable produced by [`select`](Queryable::select).
    type Projected<R>: Queryable<R>;

    fn filter(self, expression: &WhereExpression<T>) -> Self;

    /// Keeps items matching at least one of the criteria in `group`.
    fn search(self, group: &[&SearchCriteria<T>]) -> Self;

    fn include(self, expression: &IncludeExpression) -> Self;

    fn include_path(self, path: &str) -> Self;

    /// Starts a new ordering with `expression` as its primary key.
    fn order_by(self, expression: &OrderExpression<T>) -> Self;

    /// Refines the current ordering with a further key.
    fn then_by(self, expression: &OrderExpression<T>) -> Self;

    fn skip(self, count: usize) -> Self;

    fn take(self, count: usize) -> Self;

    fn as_no_tracking(self) -> Self;

    fn as_no_tracking_with_identity_resolution(self) -> Self;

    fn as_split_query(self) -> Self;

    /// Maps each item with `selector`. Deferred like every other step.
    fn select<R>(self, selector: &Selector<T, R>) -> Self::Projected<R>;
}
