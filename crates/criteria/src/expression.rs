//! The criteria model: plain data describing what a specification asks for.
//!
//! Closures stand in for expression trees. Each entry also carries a
//! description, which is what query plans and logs show.

use std::fmt;
use std::sync::Arc;

use crate::clause::Clause;
use crate::error::Result;
use crate::like::LikePattern;
use crate::ordering::{Dir, OrderKind};
use crate::traits::FieldAccess;
use crate::value::Value;

/// Boolean predicate over an item.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Ordering key extractor.
pub type KeySelector<T> = Arc<dyn for<'a> Fn(&'a T) -> Value<'a> + Send + Sync>;

/// Text extractor used by search criteria. `None` never matches.
pub type TextSelector<T> = Arc<dyn for<'a> Fn(&'a T) -> Option<&'a str> + Send + Sync>;

/// Projection from an item to a result.
pub type Selector<T, R> = Arc<dyn Fn(&T) -> R + Send + Sync>;

/// Transform applied to the fully materialized result.
pub type PostProcessingAction<T> = Arc<dyn Fn(Vec<T>) -> Vec<T> + Send + Sync>;

/// Search group used when none is given.
pub const DEFAULT_SEARCH_GROUP: i32 = 1;

const CLOSURE: &str = "<closure>";

/// A single where-predicate. All predicates of a specification must hold.
pub struct WhereExpression<T> {
    predicate: Predicate<T>,
    description: String,
}

impl<T> WhereExpression<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::described(CLOSURE, predicate)
    }

    /// Creates a predicate with a human-readable description.
    pub fn described<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        WhereExpression {
            predicate: Arc::new(predicate),
            description: description.into(),
        }
    }

    /// Turns a field clause into a predicate, described by the clause text.
    pub fn from_clause(clause: Clause) -> Self
    where
        T: FieldAccess + 'static,
    {
        let description = clause.to_string();
        Self::described(description, move |item: &T| {
            clause.matches(&item.field_value(&clause.field))
        })
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.predicate)(item)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<T> Clone for WhereExpression<T> {
    fn clone(&self) -> Self {
        WhereExpression {
            predicate: Arc::clone(&self.predicate),
            description: self.description.clone(),
        }
    }
}

impl<T> fmt::Debug for WhereExpression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WhereExpression")
            .field(&self.description)
            .finish()
    }
}

/// One step of an ordering chain: a key selector and its [`OrderKind`].
pub struct OrderExpression<T> {
    key: KeySelector<T>,
    kind: OrderKind,
    description: String,
}

impl<T> OrderExpression<T> {
    pub fn new<F>(kind: OrderKind, key: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self::described(kind, CLOSURE, key)
    }

    pub fn described<F>(kind: OrderKind, description: impl Into<String>, key: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        OrderExpression {
            key: Arc::new(key),
            kind,
            description: description.into(),
        }
    }

    /// Orders by a named field.
    pub fn field(kind: OrderKind, field: impl Into<String>) -> Self
    where
        T: FieldAccess + 'static,
    {
        let field = field.into();
        let description = field.clone();
        Self::described(kind, description, move |item: &T| item.field_value(&field))
    }

    pub fn order_by<F>(key: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self::new(OrderKind::OrderBy, key)
    }

    pub fn order_by_descending<F>(key: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self::new(OrderKind::OrderByDescending, key)
    }

    pub fn then_by<F>(key: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self::new(OrderKind::ThenBy, key)
    }

    pub fn then_by_descending<F>(key: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self::new(OrderKind::ThenByDescending, key)
    }

    /// Extracts the ordering key of an item.
    pub fn key<'a>(&self, item: &'a T) -> Value<'a> {
        (self.key)(item)
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn dir(&self) -> Dir {
        self.kind.dir()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<T> Clone for OrderExpression<T> {
    fn clone(&self) -> Self {
        OrderExpression {
            key: Arc::clone(&self.key),
            kind: self.kind,
            description: self.description.clone(),
        }
    }
}

impl<T> fmt::Debug for OrderExpression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderExpression")
            .field("kind", &self.kind)
            .field("key", &self.description)
            .finish()
    }
}

/// A LIKE-style search over one text selector.
///
/// Criteria sharing a search group are OR-ed together; groups are AND-ed.
pub struct SearchCriteria<T> {
    selector: TextSelector<T>,
    pattern: LikePattern,
    group: i32,
    description: String,
}

impl<T> SearchCriteria<T> {
    /// Creates a criterion, compiling `search_term` as a LIKE pattern.
    pub fn new<F>(selector: F, search_term: &str, group: i32) -> Result<Self>
    where
        F: for<'a> Fn(&'a T) -> Option<&'a str> + Send + Sync + 'static,
    {
        Self::described(CLOSURE, selector, search_term, group)
    }

    pub fn described<F>(
        description: impl Into<String>,
        selector: F,
        search_term: &str,
        group: i32,
    ) -> Result<Self>
    where
        F: for<'a> Fn(&'a T) -> Option<&'a str> + Send + Sync + 'static,
    {
        Ok(SearchCriteria {
            selector: Arc::new(selector),
            pattern: LikePattern::new(search_term)?,
            group,
            description: description.into(),
        })
    }

    /// Searches a named string field.
    pub fn field(field: impl Into<String>, search_term: &str, group: i32) -> Result<Self>
    where
        T: FieldAccess + 'static,
    {
        let field = field.into();
        let description = field.clone();
        Self::described(
            description,
            move |item: &T| item.field_value(&field).as_str(),
            search_term,
            group,
        )
    }

    pub fn is_match(&self, item: &T) -> bool {
        (self.selector)(item).is_some_and(|text| self.pattern.is_match(text))
    }

    pub fn search_term(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn search_group(&self) -> i32 {
        self.group
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<T> Clone for SearchCriteria<T> {
    fn clone(&self) -> Self {
        SearchCriteria {
            selector: Arc::clone(&self.selector),
            pattern: self.pattern.clone(),
            group: self.group,
            description: self.description.clone(),
        }
    }
}

impl<T> fmt::Debug for SearchCriteria<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCriteria")
            .field("selector", &self.description)
            .field("term", &self.pattern.as_str())
            .field("group", &self.group)
            .finish()
    }
}

/// Whether an include starts a navigation chain or extends the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    Include,
    ThenInclude,
}

/// A structured navigation-expansion hint for queryable backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeExpression {
    pub entity_type: &'static str,
    pub property_type: &'static str,
    /// Set for chained includes: the type the chain continues from.
    pub previous_property_type: Option<&'static str>,
    pub path: String,
    pub kind: IncludeKind,
}

impl IncludeExpression {
    /// Expands navigation `path` of entity `E`, yielding `P`.
    pub fn include<E: ?Sized, P: ?Sized>(path: impl Into<String>) -> Self {
        IncludeExpression {
            entity_type: std::any::type_name::<E>(),
            property_type: std::any::type_name::<P>(),
            previous_property_type: None,
            path: path.into(),
            kind: IncludeKind::Include,
        }
    }

    /// Continues a chain from `Prev` through navigation `path`, yielding `P`.
    pub fn then_include<E: ?Sized, Prev: ?Sized, P: ?Sized>(path: impl Into<String>) -> Self {
        IncludeExpression {
            entity_type: std::any::type_name::<E>(),
            property_type: std::any::type_name::<P>(),
            previous_property_type: Some(std::any::type_name::<Prev>()),
            path: path.into(),
            kind: IncludeKind::ThenInclude,
        }
    }
}

impl fmt::Display for IncludeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IncludeKind::Include => write!(f, "include({})", self.path),
            IncludeKind::ThenInclude => write!(f, "then_include({})", self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Op;
    use crate::value::Number;

    struct Book {
        title: String,
        pages: u32,
    }

    impl FieldAccess for Book {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "title" => Value::String(&self.title),
                "pages" => Value::Number(Number::from(self.pages)),
                _ => Value::None,
            }
        }
    }

    fn book(title: &str, pages: u32) -> Book {
        Book {
            title: title.to_string(),
            pages,
        }
    }

    #[test]
    fn where_from_clause() {
        let expr =
            WhereExpression::<Book>::from_clause(Clause::new("pages", Op::Gt, 300u32).unwrap());
        assert_eq!(expr.description(), "pages gt 300");
        assert!(expr.matches(&book("Dune", 412)));
        assert!(!expr.matches(&book("Siddhartha", 152)));
    }

    #[test]
    fn closure_predicates_are_described_generically() {
        let expr = WhereExpression::new(|b: &Book| b.title.starts_with('D'));
        assert_eq!(expr.description(), "<closure>");
        assert!(expr.matches(&book("Dune", 1)));
        assert_eq!(format!("{:?}", expr), "WhereExpression(\"<closure>\")");
    }

    #[test]
    fn order_by_field() {
        let expr = OrderExpression::<Book>::field(OrderKind::ThenByDescending, "pages");
        assert_eq!(expr.description(), "pages");
        assert_eq!(expr.dir(), Dir::Desc);
        assert_eq!(expr.key(&book("x", 7)), Value::Number(Number::U64(7)));
    }

    #[test]
    fn search_matches_selected_text() {
        let criteria = SearchCriteria::new(|b: &Book| Some(b.title.as_str()), "%une", 1).unwrap();
        assert!(criteria.is_match(&book("Dune", 1)));
        assert!(!criteria.is_match(&book("Emma", 1)));
        assert_eq!(criteria.search_term(), "%une");
        assert_eq!(criteria.search_group(), 1);
    }

    #[test]
    fn search_on_non_text_field_never_matches() {
        let criteria = SearchCriteria::<Book>::field("pages", "%", 2).unwrap();
        assert!(!criteria.is_match(&book("Dune", 1)));
    }

    #[test]
    fn include_records_type_names() {
        let first = IncludeExpression::include::<Book, Vec<String>>("reviews");
        assert_eq!(first.kind, IncludeKind::Include);
        assert!(first.entity_type.ends_with("Book"));
        assert_eq!(first.previous_property_type, None);

        let next = IncludeExpression::then_include::<Book, Vec<String>, str>("author");
        assert_eq!(next.kind, IncludeKind::ThenInclude);
        assert_eq!(next.property_type, "str");
        assert_eq!(next.to_string(), "then_include(author)");
    }
}
