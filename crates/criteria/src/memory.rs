//! An in-process [`Queryable`] over an owned collection.
//!
//! Composition only records steps; the plan runs when the query is
//! materialized with [`to_list`](MemoryQueryable::to_list),
//! [`count`](MemoryQueryable::count), [`first`](MemoryQueryable::first) or
//! [`any`](MemoryQueryable::any).

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::expression::{
    IncludeExpression, OrderExpression, SearchCriteria, Selector, WhereExpression,
};
use crate::ordering::compare_by_chain;
use crate::queryable::Queryable;

/// Directives that shape how a real data store would load rows.
///
/// In memory they have no effect on results; they are kept so callers and
/// tests can see what a specification asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryHints {
    pub includes: Vec<IncludeExpression>,
    pub include_paths: Vec<String>,
    pub as_no_tracking: bool,
    pub as_no_tracking_with_identity_resolution: bool,
    pub as_split_query: bool,
}

enum Step<T> {
    Filter(WhereExpression<T>),
    Search(Vec<SearchCriteria<T>>),
    Order(Vec<OrderExpression<T>>),
    Skip(usize),
    Take(usize),
}

impl<T> Step<T> {
    fn apply(&self, items: &mut Vec<T>) {
        match self {
            Step::Filter(expression) => items.retain(|item| expression.matches(item)),
            Step::Search(group) => items.retain(|item| group.iter().any(|c| c.is_match(item))),
            Step::Order(chain) => {
                let chain: Vec<&OrderExpression<T>> = chain.iter().collect();
                items.sort_by(|a, b| compare_by_chain(a, b, &chain));
            }
            Step::Skip(count) => {
                let count = (*count).min(items.len());
                items.drain(..count);
            }
            Step::Take(count) => items.truncate(*count),
        }
    }
}

impl<T> fmt::Display for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Filter(expression) => write!(f, "filter({})", expression.description()),
            Step::Search(group) => {
                let terms: Vec<String> = group
                    .iter()
                    .map(|c| format!("{} like {}", c.description(), c.search_term()))
                    .collect();
                write!(f, "search({})", terms.join(" or "))
            }
            Step::Order(chain) => {
                let keys: Vec<String> = chain
                    .iter()
                    .map(|o| format!("{} {}", o.description(), o.dir()))
                    .collect();
                write!(f, "order_by({})", keys.join(", "))
            }
            Step::Skip(count) => write!(f, "skip({})", count),
            Step::Take(count) => write!(f, "take({})", count),
        }
    }
}

/// Where a [`MemoryQueryable`] gets its rows from.
pub trait RowSource<T> {
    /// Produces the rows, running any upstream plan.
    fn rows(self) -> Vec<T>;

    /// Upstream steps, rendered for [`MemoryQueryable::explain`].
    fn steps(&self) -> Vec<String>;
}

impl<T> RowSource<T> for Vec<T> {
    fn rows(self) -> Vec<T> {
        self
    }

    fn steps(&self) -> Vec<String> {
        Vec::new()
    }
}

/// The rows of a parent query, projected when materialized.
///
/// Produced by [`Queryable::select`] on a [`MemoryQueryable`]; the parent plan
/// does not run until the projected query does.
pub struct Projection<T, S, R> {
    parent: MemoryQueryable<T, S>,
    selector: Selector<T, R>,
}

impl<T, S: RowSource<T>, R> RowSource<R> for Projection<T, S, R> {
    fn rows(self) -> Vec<R> {
        let selector = self.selector;
        self.parent
            .to_list()
            .iter()
            .map(|item| selector(item))
            .collect()
    }

    fn steps(&self) -> Vec<String> {
        let mut steps = self.parent.steps();
        steps.push("select".to_string());
        steps
    }
}

/// A deferred query over a `Vec<T>`.
///
/// ```
/// use criteria::{MemoryQueryable, OrderExpression, Queryable, Value, WhereExpression};
///
/// let odd = WhereExpression::described("odd", |n: &i32| n % 2 == 1);
/// let by_value = OrderExpression::order_by_descending(|n: &i32| Value::from(*n));
///
/// let query = MemoryQueryable::new(vec![1, 2, 3, 4, 5])
///     .filter(&odd)
///     .order_by(&by_value)
///     .take(2);
///
/// assert_eq!(query.explain(), "filter(odd) -> order_by(<closure> desc) -> take(2)");
/// assert_eq!(query.to_list(), vec![5, 3]);
/// ```
pub struct MemoryQueryable<T, S = Vec<T>> {
    source: S,
    plan: Vec<Step<T>>,
    hints: QueryHints,
}

impl<T> MemoryQueryable<T> {
    pub fn new(source: Vec<T>) -> Self {
        MemoryQueryable {
            source,
            plan: Vec::new(),
            hints: QueryHints::default(),
        }
    }
}

impl<T, S: RowSource<T>> MemoryQueryable<T, S> {
    pub fn hints(&self) -> &QueryHints {
        &self.hints
    }

    /// Renders the recorded plan, e.g. `filter(<closure>) -> take(3)`.
    ///
    /// An empty plan renders as `scan`. A projection shows up as `select`.
    pub fn explain(&self) -> String {
        let steps = self.steps();
        if steps.is_empty() {
            return "scan".to_string();
        }
        steps.join(" -> ")
    }

    fn steps(&self) -> Vec<String> {
        let mut steps = self.source.steps();
        steps.extend(self.plan.iter().map(|step| step.to_string()));
        steps
    }

    /// Runs the plan and returns the resulting rows.
    pub fn to_list(self) -> Vec<T> {
        let mut items = self.source.rows();
        trace!(rows = items.len(), steps = self.plan.len(), "executing query plan");
        for step in &self.plan {
            step.apply(&mut items);
            trace!(step = %step, rows = items.len(), "applied query step");
        }
        items
    }

    pub fn count(self) -> usize {
        self.to_list().len()
    }

    pub fn first(self) -> Option<T> {
        self.to_list().into_iter().next()
    }

    pub fn any(self) -> bool {
        self.count() > 0
    }

    fn push(mut self, step: Step<T>) -> Self {
        self.plan.push(step);
        self
    }
}

impl<T> From<Vec<T>> for MemoryQueryable<T> {
    fn from(source: Vec<T>) -> Self {
        MemoryQueryable::new(source)
    }
}

impl<T> FromIterator<T> for MemoryQueryable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        MemoryQueryable::new(iter.into_iter().collect())
    }
}

impl<T, S: RowSource<T>> fmt::Debug for MemoryQueryable<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryQueryable")
            .field("plan", &self.explain())
            .field("hints", &self.hints)
            .finish()
    }
}

impl<T, S: RowSource<T>> Queryable<T> for MemoryQueryable<T, S> {
    type Projected<R> = MemoryQueryable<R, Projection<T, S, R>>;

    fn filter(self, expression: &WhereExpression<T>) -> Self {
        self.push(Step::Filter(expression.clone()))
    }

    fn search(self, group: &[&SearchCriteria<T>]) -> Self {
        if group.is_empty() {
            return self;
        }
        self.push(Step::Search(group.iter().map(|c| (*c).clone()).collect()))
    }

    fn include(mut self, expression: &IncludeExpression) -> Self {
        self.hints.includes.push(expression.clone());
        self
    }

    fn include_path(mut self, path: &str) -> Self {
        self.hints.include_paths.push(path.to_string());
        self
    }

    fn order_by(self, expression: &OrderExpression<T>) -> Self {
        self.push(Step::Order(vec![expression.clone()]))
    }

    /// Extends the most recent ordering.
    ///
    /// Filters and searches recorded since keep that ordering intact, so they
    /// are looked past. A skip or take in between, or no ordering at all,
    /// starts a new ordering instead.
    fn then_by(mut self, expression: &OrderExpression<T>) -> Self {
        let mut target = None;
        for (index, step) in self.plan.iter().enumerate().rev() {
            match step {
                Step::Order(_) => {
                    target = Some(index);
                    break;
                }
                Step::Skip(_) | Step::Take(_) => break,
                Step::Filter(_) | Step::Search(_) => {}
            }
        }
        if let Some(Step::Order(chain)) = target.and_then(|index| self.plan.get_mut(index)) {
            chain.push(expression.clone());
            return self;
        }
        self.order_by(expression)
    }

    fn skip(self, count: usize) -> Self {
        self.push(Step::Skip(count))
    }

    fn take(self, count: usize) -> Self {
        self.push(Step::Take(count))
    }

    fn as_no_tracking(mut self) -> Self {
        self.hints.as_no_tracking = true;
        self
    }

    fn as_no_tracking_with_identity_resolution(mut self) -> Self {
        self.hints.as_no_tracking_with_identity_resolution = true;
        self
    }

    fn as_split_query(mut self) -> Self {
        self.hints.as_split_query = true;
        self
    }

    /// Projects the rows once the returned query is materialized.
    fn select<R>(self, selector: &Selector<T, R>) -> Self::Projected<R> {
        let hints = self.hints.clone();
        MemoryQueryable {
            source: Projection {
                parent: self,
                selector: Arc::clone(selector),
            },
            plan: Vec::new(),
            hints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: &'static str,
        age: u32,
    }

    fn people() -> Vec<Person> {
        vec![
            Person { name: "Cleo", age: 31 },
            Person { name: "abe", age: 42 },
            Person { name: "Bea", age: 31 },
            Person { name: "Dan", age: 19 },
        ]
    }

    fn by_age() -> OrderExpression<Person> {
        OrderExpression::described(crate::OrderKind::OrderBy, "age", |p: &Person| {
            Value::from(p.age)
        })
    }

    fn by_name() -> OrderExpression<Person> {
        OrderExpression::described(crate::OrderKind::ThenBy, "name", |p: &Person| {
            Value::from(p.name)
        })
    }

    #[test]
    fn composition_is_deferred_until_materialized() {
        let query = MemoryQueryable::new(people()).take(1);
        assert_eq!(query.explain(), "take(1)");
        assert_eq!(query.count(), 1);
    }

    #[test]
    fn then_by_extends_the_last_ordering() {
        let query = MemoryQueryable::new(people())
            .order_by(&by_age())
            .then_by(&by_name());
        assert_eq!(query.explain(), "order_by(age asc, name asc)");

        let names: Vec<_> = query.to_list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Dan", "Bea", "Cleo", "abe"]);
    }

    #[test]
    fn then_by_looks_past_filters() {
        let adults = WhereExpression::described("adult", |p: &Person| p.age >= 21);
        let query = MemoryQueryable::new(people())
            .order_by(&by_age())
            .filter(&adults)
            .then_by(&by_name());
        assert_eq!(query.explain(), "order_by(age asc, name asc) -> filter(adult)");

        let names: Vec<_> = query.to_list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Bea", "Cleo", "abe"]);
    }

    #[test]
    fn then_by_after_take_starts_a_new_ordering() {
        let query = MemoryQueryable::new(people())
            .order_by(&by_age())
            .take(2)
            .then_by(&by_name());
        assert_eq!(query.explain(), "order_by(age asc) -> take(2) -> order_by(name asc)");

        let names: Vec<_> = query.to_list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Cleo", "Dan"]);
    }

    #[test]
    fn then_by_without_ordering_starts_one() {
        let query = MemoryQueryable::new(people()).then_by(&by_name());
        let names: Vec<_> = query.to_list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Bea", "Cleo", "Dan", "abe"]);
    }

    #[test]
    fn search_group_is_a_disjunction() {
        let starts_with_b = SearchCriteria::described("name", |p: &Person| Some(p.name), "b%", 1)
            .unwrap();
        let ends_with_n = SearchCriteria::described("name", |p: &Person| Some(p.name), "%n", 1)
            .unwrap();

        let query = MemoryQueryable::new(people()).search(&[&starts_with_b, &ends_with_n]);
        assert_eq!(query.explain(), "search(name like b% or name like %n)");
        let names: Vec<_> = query.to_list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Bea", "Dan"]);
    }

    #[test]
    fn skip_past_the_end_is_empty() {
        let query = MemoryQueryable::new(people()).skip(10);
        assert!(!query.any());
    }

    #[test]
    fn hints_do_not_change_rows() {
        let include = IncludeExpression::include::<Person, str>("name");
        let query = MemoryQueryable::new(people())
            .include(&include)
            .include_path("friends.address")
            .as_no_tracking()
            .as_split_query();

        assert_eq!(query.hints().includes, vec![include]);
        assert_eq!(query.hints().include_paths, vec!["friends.address".to_string()]);
        assert!(query.hints().as_no_tracking);
        assert!(query.hints().as_split_query);
        assert!(!query.hints().as_no_tracking_with_identity_resolution);
        assert_eq!(query.explain(), "scan");
        assert_eq!(query.count(), 4);
    }

    #[test]
    fn select_projects_and_keeps_hints() {
        let selector: Selector<Person, u32> = Arc::new(|p: &Person| p.age);
        let adults = WhereExpression::new(|p: &Person| p.age >= 21);
        let projected = MemoryQueryable::new(people())
            .as_no_tracking()
            .filter(&adults)
            .select(&selector);

        assert!(projected.hints().as_no_tracking);
        assert_eq!(projected.to_list(), vec![31, 42, 31]);
    }

    #[test]
    fn select_runs_nothing_until_materialized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let adults = WhereExpression::new(move |p: &Person| {
            seen.fetch_add(1, Ordering::SeqCst);
            p.age >= 21
        });
        let selector: Selector<Person, &'static str> = Arc::new(|p: &Person| p.name);

        let projected = MemoryQueryable::new(people())
            .filter(&adults)
            .select(&selector)
            .take(2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(projected.explain(), "filter(<closure>) -> select -> take(2)");

        assert_eq!(projected.to_list(), vec!["Cleo", "abe"]);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn projection_of_a_projection() {
        let age: Selector<Person, u32> = Arc::new(|p: &Person| p.age);
        let doubled: Selector<u32, u32> = Arc::new(|n: &u32| n * 2);
        let query = MemoryQueryable::new(people())
            .order_by(&by_age())
            .select(&age)
            .select(&doubled);
        assert_eq!(query.explain(), "order_by(age asc) -> select -> select");
        assert_eq!(query.count(), 4);
    }

    #[test]
    fn first_returns_head_of_result() {
        let query = MemoryQueryable::from(people()).order_by(&by_age());
        assert_eq!(query.first().map(|p| p.name), Some("Dan"));
    }
}
