//! Specifications: immutable, reusable descriptions of a query.

use std::fmt;

use crate::builder::SpecificationBuilder;
use crate::error::{Result, SpecificationError};
use crate::expression::{
    IncludeExpression, OrderExpression, PostProcessingAction, SearchCriteria, Selector,
    WhereExpression,
};
use crate::in_memory::InMemorySpecificationEvaluator;

/// A declarative query against items of type `T`.
///
/// Specifications are assembled once through [`Specification::builder`] and
/// are read-only afterwards; evaluators only ever borrow them. An empty
/// specification (the [`Default`]) matches every item in input order.
///
/// ```
/// use criteria::{Specification, Value};
///
/// let spec = Specification::<i32>::builder()
///     .filter(|n| n % 2 == 0)
///     .order_by_descending(|n| Value::from(*n))
///     .and()
///     .skip(2)
///     .take(3)
///     .build()
///     .unwrap();
///
/// let items: Vec<i32> = (0..100).collect();
/// assert_eq!(spec.evaluate(items).unwrap(), vec![94, 92, 90]);
/// ```
pub struct Specification<T> {
    pub(crate) where_expressions: Vec<WhereExpression<T>>,
    pub(crate) order_expressions: Vec<OrderExpression<T>>,
    pub(crate) search_criteria: Vec<SearchCriteria<T>>,
    pub(crate) include_expressions: Vec<IncludeExpression>,
    pub(crate) include_strings: Vec<String>,
    pub(crate) skip: Option<usize>,
    pub(crate) take: Option<usize>,
    pub(crate) post_processing_action: Option<PostProcessingAction<T>>,
    pub(crate) cache_key: Option<String>,
    pub(crate) cache_enabled: bool,
    pub(crate) as_no_tracking: bool,
    pub(crate) as_no_tracking_with_identity_resolution: bool,
    pub(crate) as_split_query: bool,
}

impl<T> Specification<T> {
    /// Creates an empty specification.
    pub fn new() -> Self {
        Specification {
            where_expressions: Vec::new(),
            order_expressions: Vec::new(),
            search_criteria: Vec::new(),
            include_expressions: Vec::new(),
            include_strings: Vec::new(),
            skip: None,
            take: None,
            post_processing_action: None,
            cache_key: None,
            cache_enabled: false,
            as_no_tracking: false,
            as_no_tracking_with_identity_resolution: false,
            as_split_query: false,
        }
    }

    /// Starts building a specification.
    pub fn builder() -> SpecificationBuilder<T> {
        SpecificationBuilder::new()
    }

    pub fn where_expressions(&self) -> &[WhereExpression<T>] {
        &self.where_expressions
    }

    pub fn order_expressions(&self) -> &[OrderExpression<T>] {
        &self.order_expressions
    }

    pub fn search_criteria(&self) -> &[SearchCriteria<T>] {
        &self.search_criteria
    }

    pub fn include_expressions(&self) -> &[IncludeExpression] {
        &self.include_expressions
    }

    pub fn include_strings(&self) -> &[String] {
        &self.include_strings
    }

    pub fn skip(&self) -> Option<usize> {
        self.skip
    }

    pub fn take(&self) -> Option<usize> {
        self.take
    }

    pub fn post_processing_action(&self) -> Option<&PostProcessingAction<T>> {
        self.post_processing_action.as_ref()
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn cache_key(&self) -> Option<&str> {
        self.cache_key.as_deref()
    }

    pub fn as_no_tracking(&self) -> bool {
        self.as_no_tracking
    }

    pub fn as_no_tracking_with_identity_resolution(&self) -> bool {
        self.as_no_tracking_with_identity_resolution
    }

    pub fn as_split_query(&self) -> bool {
        self.as_split_query
    }

    /// Returns `true` if the specification neither filters, orders, pages
    /// nor searches.
    pub fn is_empty(&self) -> bool {
        self.where_expressions.is_empty()
            && self.order_expressions.is_empty()
            && self.search_criteria.is_empty()
            && self.skip.is_none()
            && self.take.is_none()
    }

    /// Evaluates against an in-memory collection with the default evaluator.
    pub fn evaluate(&self, items: Vec<T>) -> Result<Vec<T>> {
        InMemorySpecificationEvaluator::default().evaluate(items, self)
    }

    /// Tests a single item against the where-predicates.
    ///
    /// Ordering and paging do not apply to a single item. Search criteria
    /// have no in-memory meaning and are rejected.
    pub fn is_satisfied_by(&self, item: &T) -> Result<bool> {
        if !self.search_criteria.is_empty() {
            return Err(SpecificationError::NotSupported { feature: "search" });
        }
        Ok(self.where_expressions.iter().all(|w| w.matches(item)))
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Specification {
            where_expressions: self.where_expressions.clone(),
            order_expressions: self.order_expressions.clone(),
            search_criteria: self.search_criteria.clone(),
            include_expressions: self.include_expressions.clone(),
            include_strings: self.include_strings.clone(),
            skip: self.skip,
            take: self.take,
            post_processing_action: self.post_processing_action.clone(),
            cache_key: self.cache_key.clone(),
            cache_enabled: self.cache_enabled,
            as_no_tracking: self.as_no_tracking,
            as_no_tracking_with_identity_resolution: self.as_no_tracking_with_identity_resolution,
            as_split_query: self.as_split_query,
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("where_expressions", &self.where_expressions)
            .field("order_expressions", &self.order_expressions)
            .field("search_criteria", &self.search_criteria)
            .field("include_expressions", &self.include_expressions)
            .field("include_strings", &self.include_strings)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("post_processing", &self.post_processing_action.is_some())
            .field("cache_key", &self.cache_key)
            .field("as_no_tracking", &self.as_no_tracking)
            .field(
                "as_no_tracking_with_identity_resolution",
                &self.as_no_tracking_with_identity_resolution,
            )
            .field("as_split_query", &self.as_split_query)
            .finish()
    }
}

/// A specification that projects each `T` into an `R`.
///
/// The selector is optional at construction so a partially built
/// specification can still be inspected; evaluating a projection without
/// one fails with [`SpecificationError::SelectorNotFound`].
pub struct SelectSpecification<T, R> {
    pub(crate) criteria: Specification<T>,
    pub(crate) selector: Option<Selector<T, R>>,
    pub(crate) post_processing_action: Option<PostProcessingAction<R>>,
}

impl<T, R> SelectSpecification<T, R> {
    /// Wraps criteria without a selector.
    pub fn new(criteria: Specification<T>) -> Self {
        SelectSpecification {
            criteria,
            selector: None,
            post_processing_action: None,
        }
    }

    /// The filtering, ordering and paging part of the specification.
    pub fn criteria(&self) -> &Specification<T> {
        &self.criteria
    }

    pub fn selector(&self) -> Option<&Selector<T, R>> {
        self.selector.as_ref()
    }

    /// The selector, or `SelectorNotFound`.
    pub fn require_selector(&self) -> Result<&Selector<T, R>> {
        self.selector
            .as_ref()
            .ok_or(SpecificationError::SelectorNotFound)
    }

    pub fn post_processing_action(&self) -> Option<&PostProcessingAction<R>> {
        self.post_processing_action.as_ref()
    }

    /// Evaluates against an in-memory collection with the default evaluator.
    pub fn evaluate(&self, items: Vec<T>) -> Result<Vec<R>> {
        InMemorySpecificationEvaluator::default().evaluate_projected(items, self)
    }
}

impl<T, R> Clone for SelectSpecification<T, R> {
    fn clone(&self) -> Self {
        SelectSpecification {
            criteria: self.criteria.clone(),
            selector: self.selector.clone(),
            post_processing_action: self.post_processing_action.clone(),
        }
    }
}

impl<T, R> fmt::Debug for SelectSpecification<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectSpecification")
            .field("criteria", &self.criteria)
            .field("selector", &self.selector.is_some())
            .field("post_processing", &self.post_processing_action.is_some())
            .finish()
    }
}

/// A specification meant to identify at most one item.
///
/// Only a tag: repositories accept it for single-result lookups and report
/// more than one match as an error.
pub struct SingleResultSpecification<T>(pub(crate) Specification<T>);

impl<T> SingleResultSpecification<T> {
    pub fn new(criteria: Specification<T>) -> Self {
        SingleResultSpecification(criteria)
    }

    pub fn criteria(&self) -> &Specification<T> {
        &self.0
    }

    pub fn into_inner(self) -> Specification<T> {
        self.0
    }
}

impl<T> Clone for SingleResultSpecification<T> {
    fn clone(&self) -> Self {
        SingleResultSpecification(self.0.clone())
    }
}

impl<T> fmt::Debug for SingleResultSpecification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SingleResultSpecification")
            .field(&self.0)
            .finish()
    }
}
