//! Fluent builders producing immutable specifications.
//!
//! Builders never panic and never fail midway through a chain. The first
//! violation is recorded and returned by `build()`, so a chain reads top to
//! bottom without `?` after every call.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::clause::{Clause, ClauseValue};
use crate::error::{Result, SpecificationError};
use crate::expression::{
    IncludeExpression, OrderExpression, PostProcessingAction, SearchCriteria, Selector,
    WhereExpression, DEFAULT_SEARCH_GROUP,
};
use crate::op::Op;
use crate::ordering::OrderKind;
use crate::specification::{SelectSpecification, SingleResultSpecification, Specification};
use crate::traits::{check_field, FieldAccess};
use crate::value::Value;

/// Builder for [`Specification`].
///
/// # Example
///
/// ```
/// use criteria::{Specification, Value};
///
/// struct Customer {
///     name: String,
///     age: u32,
/// }
///
/// let spec = Specification::<Customer>::builder()
///     .filter(|c| c.age >= 18)
///     .search(|c| Some(c.name.as_str()), "a%")
///     .order_by(|c| Value::from(c.name.as_str()))
///     .then_by_descending(|c| Value::from(c.age))
///     .and()
///     .page(2, 10)
///     .enable_cache("adults", ["a%"])
///     .build()
///     .unwrap();
///
/// assert_eq!(spec.skip(), Some(10));
/// assert_eq!(spec.take(), Some(10));
/// assert_eq!(spec.cache_key(), Some("adults-a%"));
/// ```
pub struct SpecificationBuilder<T> {
    draft: Specification<T>,
    error: Option<SpecificationError>,
}

impl<T> SpecificationBuilder<T> {
    pub fn new() -> Self {
        SpecificationBuilder {
            draft: Specification::new(),
            error: None,
        }
    }

    fn fail(mut self, error: SpecificationError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    fn record(self, entry: Result<impl FnOnce(&mut Specification<T>)>) -> Self {
        match entry {
            Ok(apply) => {
                let mut this = self;
                apply(&mut this.draft);
                this
            }
            Err(e) => self.fail(e),
        }
    }

    // ========================================================================
    // Where
    // ========================================================================

    /// Adds a predicate. Every predicate must hold for an item to match.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.draft
            .where_expressions
            .push(WhereExpression::new(predicate));
        self
    }

    /// Adds a predicate only when `condition` holds.
    pub fn filter_if<F>(self, condition: bool, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        if condition {
            self.filter(predicate)
        } else {
            self
        }
    }

    /// Adds a prebuilt where expression.
    pub fn where_expression(mut self, expression: WhereExpression<T>) -> Self {
        self.draft.where_expressions.push(expression);
        self
    }

    /// Adds a predicate against a named field.
    ///
    /// ```
    /// use criteria::{FieldAccess, Number, Op, Specification, Value};
    ///
    /// struct Task {
    ///     priority: u8,
    /// }
    ///
    /// impl FieldAccess for Task {
    ///     fn field_value(&self, field: &str) -> Value<'_> {
    ///         match field {
    ///             "priority" => Value::Number(Number::from(self.priority)),
    ///             _ => Value::None,
    ///         }
    ///     }
    /// }
    ///
    /// let spec = Specification::<Task>::builder()
    ///     .filter_clause("priority", Op::Gte, 3u8)
    ///     .build()
    ///     .unwrap();
    /// assert!(spec.is_satisfied_by(&Task { priority: 4 }).unwrap());
    /// assert_eq!(spec.where_expressions()[0].description(), "priority gte 3");
    /// ```
    pub fn filter_clause(self, field: &str, op: Op, value: impl Into<ClauseValue>) -> Self
    where
        T: FieldAccess + 'static,
    {
        let entry = check_field::<T>(field)
            .and_then(|_| Clause::new(field, op, value))
            .map(|clause| {
                move |draft: &mut Specification<T>| {
                    draft
                        .where_expressions
                        .push(WhereExpression::from_clause(clause))
                }
            });
        self.record(entry)
    }

    // ========================================================================
    // Order
    // ========================================================================

    /// Starts the ordering chain with an ascending key.
    pub fn order_by<F>(self, key: F) -> OrderedSpecificationBuilder<T>
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        OrderedSpecificationBuilder(self.order(OrderExpression::order_by(key)))
    }

    /// Starts the ordering chain with a descending key.
    pub fn order_by_descending<F>(self, key: F) -> OrderedSpecificationBuilder<T>
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        OrderedSpecificationBuilder(self.order(OrderExpression::order_by_descending(key)))
    }

    pub fn order_by_field(self, field: &str) -> OrderedSpecificationBuilder<T>
    where
        T: FieldAccess + 'static,
    {
        OrderedSpecificationBuilder(self.order_field(OrderKind::OrderBy, field))
    }

    pub fn order_by_field_descending(self, field: &str) -> OrderedSpecificationBuilder<T>
    where
        T: FieldAccess + 'static,
    {
        OrderedSpecificationBuilder(self.order_field(OrderKind::OrderByDescending, field))
    }

    /// Appends a raw ordering entry of any kind.
    ///
    /// Chains are checked at evaluation time, not here: a second primary
    /// entry surfaces as [`SpecificationError::DuplicateOrderChain`] when the
    /// specification is evaluated.
    pub fn order(mut self, expression: OrderExpression<T>) -> Self {
        self.draft.order_expressions.push(expression);
        self
    }

    fn order_field(self, kind: OrderKind, field: &str) -> Self
    where
        T: FieldAccess + 'static,
    {
        let entry = check_field::<T>(field).map(|_| {
            let expression = OrderExpression::field(kind, field);
            move |draft: &mut Specification<T>| draft.order_expressions.push(expression)
        });
        self.record(entry)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Adds a LIKE search in the default group.
    pub fn search<F>(self, selector: F, search_term: &str) -> Self
    where
        F: for<'a> Fn(&'a T) -> Option<&'a str> + Send + Sync + 'static,
    {
        self.search_in_group(selector, search_term, DEFAULT_SEARCH_GROUP)
    }

    /// Adds a LIKE search. Criteria in the same group are alternatives.
    pub fn search_in_group<F>(self, selector: F, search_term: &str, group: i32) -> Self
    where
        F: for<'a> Fn(&'a T) -> Option<&'a str> + Send + Sync + 'static,
    {
        let entry = SearchCriteria::new(selector, search_term, group).map(|criteria| {
            move |draft: &mut Specification<T>| draft.search_criteria.push(criteria)
        });
        self.record(entry)
    }

    pub fn search_if<F>(self, condition: bool, selector: F, search_term: &str) -> Self
    where
        F: for<'a> Fn(&'a T) -> Option<&'a str> + Send + Sync + 'static,
    {
        if condition {
            self.search(selector, search_term)
        } else {
            self
        }
    }

    /// Adds a LIKE search over a named string field.
    pub fn search_field(self, field: &str, search_term: &str, group: i32) -> Self
    where
        T: FieldAccess + 'static,
    {
        let entry = check_field::<T>(field)
            .and_then(|_| SearchCriteria::field(field, search_term, group))
            .map(|criteria| {
                move |draft: &mut Specification<T>| draft.search_criteria.push(criteria)
            });
        self.record(entry)
    }

    pub fn search_criteria(mut self, criteria: SearchCriteria<T>) -> Self {
        self.draft.search_criteria.push(criteria);
        self
    }

    // ========================================================================
    // Include
    // ========================================================================

    /// Requests expansion of a navigation property of type `P`.
    pub fn include<P: ?Sized>(self, path: &str) -> IncludableSpecificationBuilder<T, P> {
        let entry = non_empty("path", path).map(|_| {
            let expression = IncludeExpression::include::<T, P>(path);
            move |draft: &mut Specification<T>| draft.include_expressions.push(expression)
        });
        IncludableSpecificationBuilder {
            inner: self.record(entry),
            _previous: PhantomData,
        }
    }

    /// Requests expansion of a navigation path given as a dotted string.
    pub fn include_string(self, path: &str) -> Self {
        let entry = non_empty("include", path).map(|_| {
            let path = path.to_string();
            move |draft: &mut Specification<T>| draft.include_strings.push(path)
        });
        self.record(entry)
    }

    // ========================================================================
    // Paging
    // ========================================================================

    pub fn skip(mut self, skip: usize) -> Self {
        if self.draft.skip.is_some() {
            return self.fail(SpecificationError::DuplicateSkip);
        }
        self.draft.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        if self.draft.take.is_some() {
            return self.fail(SpecificationError::DuplicateTake);
        }
        self.draft.take = Some(take);
        self
    }

    /// Sets skip and take together.
    pub fn paginate(self, skip: usize, take: usize) -> Self {
        self.skip(skip).take(take)
    }

    /// Sets skip and take from a 1-based page number and a page size.
    pub fn page(self, page_number: usize, page_size: usize) -> Self {
        if page_number == 0 {
            return self.fail(SpecificationError::invalid_argument(
                "page_number",
                "pages are numbered from 1",
            ));
        }
        if page_size == 0 {
            return self.fail(SpecificationError::invalid_argument(
                "page_size",
                "page size must be at least 1",
            ));
        }
        match (page_number - 1).checked_mul(page_size) {
            Some(skip) => self.paginate(skip, page_size),
            None => self.fail(SpecificationError::invalid_argument(
                "page_number",
                format!("page {} of size {} is out of range", page_number, page_size),
            )),
        }
    }

    // ========================================================================
    // Misc
    // ========================================================================

    /// Transforms the materialized result. Replaces any earlier action.
    pub fn post_processing<F>(mut self, action: F) -> Self
    where
        F: Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static,
    {
        self.draft.post_processing_action = Some(Arc::new(action));
        self
    }

    /// Enables caching under the key `"{name}-{arg1}-{arg2}..."`.
    pub fn enable_cache<I>(mut self, name: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        if name.is_empty() {
            return self.fail(SpecificationError::ArgumentNull("cache name"));
        }
        let mut key = name.to_string();
        for arg in args {
            key.push('-');
            key.push_str(&arg.to_string());
        }
        self.draft.cache_key = Some(key);
        self.draft.cache_enabled = true;
        self
    }

    pub fn as_no_tracking(mut self) -> Self {
        self.draft.as_no_tracking = true;
        self
    }

    pub fn as_no_tracking_with_identity_resolution(mut self) -> Self {
        self.draft.as_no_tracking_with_identity_resolution = true;
        self
    }

    pub fn as_split_query(mut self) -> Self {
        self.draft.as_split_query = true;
        self
    }

    /// Continues as a projecting specification.
    pub fn select<R, F>(self, selector: F) -> SelectSpecificationBuilder<T, R>
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        SelectSpecificationBuilder {
            inner: self,
            selector: Arc::new(selector),
            post_processing_action: None,
        }
    }

    pub fn build(self) -> Result<Specification<T>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.draft),
        }
    }

    pub fn build_single(self) -> Result<SingleResultSpecification<T>> {
        self.build().map(SingleResultSpecification::new)
    }
}

impl<T> Default for SpecificationBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(argument: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(SpecificationError::ArgumentNull(argument))
    } else {
        Ok(())
    }
}

/// Builder state right after a primary ordering key.
pub struct OrderedSpecificationBuilder<T>(SpecificationBuilder<T>);

impl<T> OrderedSpecificationBuilder<T> {
    pub fn then_by<F>(self, key: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        OrderedSpecificationBuilder(self.0.order(OrderExpression::then_by(key)))
    }

    pub fn then_by_descending<F>(self, key: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        OrderedSpecificationBuilder(self.0.order(OrderExpression::then_by_descending(key)))
    }

    pub fn then_by_field(self, field: &str) -> Self
    where
        T: FieldAccess + 'static,
    {
        OrderedSpecificationBuilder(self.0.order_field(OrderKind::ThenBy, field))
    }

    pub fn then_by_field_descending(self, field: &str) -> Self
    where
        T: FieldAccess + 'static,
    {
        OrderedSpecificationBuilder(self.0.order_field(OrderKind::ThenByDescending, field))
    }

    /// Returns to the general builder.
    pub fn and(self) -> SpecificationBuilder<T> {
        self.0
    }

    pub fn build(self) -> Result<Specification<T>> {
        self.0.build()
    }
}

/// Builder state right after an include of a `P`-typed navigation.
pub struct IncludableSpecificationBuilder<T, P: ?Sized> {
    inner: SpecificationBuilder<T>,
    _previous: PhantomData<fn(&P)>,
}

impl<T, P: ?Sized> IncludableSpecificationBuilder<T, P> {
    /// Continues the include chain from `P` to a `Q`-typed navigation.
    pub fn then_include<Q: ?Sized>(self, path: &str) -> IncludableSpecificationBuilder<T, Q> {
        let entry = non_empty("path", path).map(|_| {
            let expression = IncludeExpression::then_include::<T, P, Q>(path);
            move |draft: &mut Specification<T>| draft.include_expressions.push(expression)
        });
        IncludableSpecificationBuilder {
            inner: self.inner.record(entry),
            _previous: PhantomData,
        }
    }

    pub fn and(self) -> SpecificationBuilder<T> {
        self.inner
    }

    pub fn build(self) -> Result<Specification<T>> {
        self.inner.build()
    }
}

/// Builder for [`SelectSpecification`].
pub struct SelectSpecificationBuilder<T, R> {
    inner: SpecificationBuilder<T>,
    selector: Selector<T, R>,
    post_processing_action: Option<PostProcessingAction<R>>,
}

impl<T, R> SelectSpecificationBuilder<T, R> {
    /// Transforms the projected result.
    pub fn post_processing<F>(mut self, action: F) -> Self
    where
        F: Fn(Vec<R>) -> Vec<R> + Send + Sync + 'static,
    {
        self.post_processing_action = Some(Arc::new(action));
        self
    }

    pub fn build(self) -> Result<SelectSpecification<T, R>> {
        let criteria = self.inner.build()?;
        Ok(SelectSpecification {
            criteria,
            selector: Some(self.selector),
            post_processing_action: self.post_processing_action,
        })
    }
}
