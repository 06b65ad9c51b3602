//! Criteria - Declarative query specifications for Rust collections and data stores.
//!
//! A [`Specification`] describes a query once: what to filter, how to
//! order, which window to return, what to search for, which navigations to
//! expand and how to project. Evaluators turn it into results:
//!
//! - [`InMemorySpecificationEvaluator`] runs it directly over a `Vec<T>`
//! - [`SpecificationEvaluator`] folds it into any [`Queryable`] backend,
//!   such as the bundled [`MemoryQueryable`]
//! - [`InMemoryRepository`] routes repository reads through the latter
//!
//! # Quick Start
//!
//! ```rust
//! use criteria::{Specification, Value};
//!
//! struct Task {
//!     name: String,
//!     priority: i32,
//!     archived: bool,
//! }
//!
//! let tasks = vec![
//!     Task { name: "Write docs".into(), priority: 3, archived: false },
//!     Task { name: "Fix bug".into(), priority: 5, archived: false },
//!     Task { name: "Old task".into(), priority: 1, archived: true },
//! ];
//!
//! let open_by_priority = Specification::<Task>::builder()
//!     .filter(|t| !t.archived)
//!     .order_by_descending(|t| Value::from(t.priority))
//!     .then_by(|t| Value::from(t.name.as_str()))
//!     .and()
//!     .take(10)
//!     .build()
//!     .unwrap();
//!
//! let results = open_by_priority.evaluate(tasks).unwrap();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].name, "Fix bug");
//! ```
//!
//! # Pipelines
//!
//! The queryable pipeline applies, in order: where, search, include, order,
//! pagination, and the three tracking directives. The in-memory pipeline
//! applies where, order and pagination; a specification with search
//! criteria fails there with [`SpecificationError::NotSupported`].
//! Post-processing always runs last, on materialized results. Both lists
//! can be changed through [`EvaluatorConfig`].
//!
//! # Field Types and Operators
//!
//! Types implementing [`FieldAccess`] can also be queried by field name
//! (`filter_clause`, `order_by_field`, `search_field`):
//!
//! | Type | Operators |
//! |------|-----------|
//! | String | `Eq`, `Ne`, `StartsWith`, `EndsWith`, `Contains`, `Like`, `Regex` |
//! | Number | `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte` |
//! | Timestamp | `Eq`, `Ne`, `Before`, `After`, `Gt`, `Gte`, `Lt`, `Lte` |
//! | Enum | `Eq`, `Ne`, `In` |
//! | Bool | `Eq`, `Ne`, `Is` |

mod builder;
mod clause;
mod config;
mod error;
mod evaluator;
mod evaluators;
mod expression;
mod in_memory;
mod like;
mod memory;
mod op;
mod ordering;
mod queryable;
mod repository;
mod specification;
mod traits;
mod value;

// Re-export public API
pub use builder::{
    IncludableSpecificationBuilder, OrderedSpecificationBuilder, SelectSpecificationBuilder,
    SpecificationBuilder,
};
pub use clause::{Clause, ClauseValue};
pub use config::EvaluatorConfig;
pub use error::{Result, SpecificationError};
pub use evaluator::SpecificationEvaluator;
pub use evaluators::{
    AsNoTrackingEvaluator, AsNoTrackingWithIdentityResolutionEvaluator, AsSplitQueryEvaluator,
    Evaluator, InMemoryEvaluator, IncludeEvaluator, OrderEvaluator, PaginationEvaluator,
    SearchEvaluator, Stage, WhereEvaluator,
};
pub use expression::{
    IncludeExpression, IncludeKind, KeySelector, OrderExpression, PostProcessingAction, Predicate,
    SearchCriteria, Selector, TextSelector, WhereExpression, DEFAULT_SEARCH_GROUP,
};
pub use in_memory::InMemorySpecificationEvaluator;
pub use like::LikePattern;
pub use memory::{MemoryQueryable, Projection, QueryHints, RowSource};
pub use op::Op;
pub use ordering::{compare_values, Dir, OrderKind};
pub use queryable::Queryable;
pub use repository::{
    AggregateRoot, Entity, InMemoryRepository, ReadRepository, Repository, RepositoryError,
    RepositoryResult,
};
pub use specification::{SelectSpecification, SingleResultSpecification, Specification};
pub use traits::{FieldAccess, FieldEnum, FieldTimestamp};
pub use value::{Number, Timestamp, Value};

#[cfg(feature = "derive")]
pub use criteria_macros::FieldAccess;
