//! Evaluators: stateless strategies that each apply one query concern.
//!
//! Every evaluator is a unit struct. The orchestrators hold a list of
//! [`Stage`]s, which name the evaluators and dispatch to them; stage lists
//! can therefore be configured (see [`EvaluatorConfig`](crate::EvaluatorConfig)).

mod filter;
mod include;
mod order;
mod pagination;
mod search;
mod tracking;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecificationError};
use crate::queryable::Queryable;
use crate::specification::Specification;

pub use filter::WhereEvaluator;
pub use include::IncludeEvaluator;
pub use order::OrderEvaluator;
pub use pagination::PaginationEvaluator;
pub use search::SearchEvaluator;
pub use tracking::{
    AsNoTrackingEvaluator, AsNoTrackingWithIdentityResolutionEvaluator, AsSplitQueryEvaluator,
};

/// Applies one concern of a specification to a [`Queryable`].
pub trait Evaluator {
    /// Stable name used in logs and configuration.
    fn name(&self) -> &'static str;

    /// `true` if the evaluator never changes which rows exist, only which
    /// rows match, and is therefore safe in count-only pipelines.
    fn is_criteria_evaluator(&self) -> bool;

    fn get_query<T, Q: Queryable<T>>(&self, query: Q, specification: &Specification<T>)
        -> Result<Q>;
}

/// Applies one concern of a specification to a materialized collection.
pub trait InMemoryEvaluator {
    fn evaluate<T>(&self, items: Vec<T>, specification: &Specification<T>) -> Result<Vec<T>>;
}

/// A named pipeline stage.
///
/// ```
/// use criteria::Stage;
///
/// let stage: Stage = serde_json::from_str("\"as_split_query\"").unwrap();
/// assert_eq!(stage, Stage::AsSplitQuery);
/// assert!(stage.is_criteria());
/// assert!(!Stage::Pagination.is_criteria());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Where,
    Search,
    Include,
    Order,
    Pagination,
    AsNoTracking,
    AsSplitQuery,
    AsNoTrackingWithIdentityResolution,
}

impl Stage {
    /// Default queryable pipeline, in application order.
    pub const DEFAULT: [Stage; 8] = [
        Stage::Where,
        Stage::Search,
        Stage::Include,
        Stage::Order,
        Stage::Pagination,
        Stage::AsNoTracking,
        Stage::AsSplitQuery,
        Stage::AsNoTrackingWithIdentityResolution,
    ];

    /// Default in-memory pipeline.
    pub const IN_MEMORY: [Stage; 3] = [Stage::Where, Stage::Order, Stage::Pagination];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Where => WhereEvaluator.name(),
            Stage::Search => SearchEvaluator.name(),
            Stage::Include => IncludeEvaluator.name(),
            Stage::Order => OrderEvaluator.name(),
            Stage::Pagination => PaginationEvaluator.name(),
            Stage::AsNoTracking => AsNoTrackingEvaluator.name(),
            Stage::AsSplitQuery => AsSplitQueryEvaluator.name(),
            Stage::AsNoTrackingWithIdentityResolution => {
                AsNoTrackingWithIdentityResolutionEvaluator.name()
            }
        }
    }

    pub fn is_criteria(self) -> bool {
        match self {
            Stage::Where => WhereEvaluator.is_criteria_evaluator(),
            Stage::Search => SearchEvaluator.is_criteria_evaluator(),
            Stage::Include => IncludeEvaluator.is_criteria_evaluator(),
            Stage::Order => OrderEvaluator.is_criteria_evaluator(),
            Stage::Pagination => PaginationEvaluator.is_criteria_evaluator(),
            Stage::AsNoTracking => AsNoTrackingEvaluator.is_criteria_evaluator(),
            Stage::AsSplitQuery => AsSplitQueryEvaluator.is_criteria_evaluator(),
            Stage::AsNoTrackingWithIdentityResolution => {
                AsNoTrackingWithIdentityResolutionEvaluator.is_criteria_evaluator()
            }
        }
    }

    /// `true` for stages with an in-memory implementation.
    pub fn supports_in_memory(self) -> bool {
        matches!(self, Stage::Where | Stage::Order | Stage::Pagination)
    }

    pub fn get_query<T, Q: Queryable<T>>(
        self,
        query: Q,
        specification: &Specification<T>,
    ) -> Result<Q> {
        match self {
            Stage::Where => WhereEvaluator.get_query(query, specification),
            Stage::Search => SearchEvaluator.get_query(query, specification),
            Stage::Include => IncludeEvaluator.get_query(query, specification),
            Stage::Order => OrderEvaluator.get_query(query, specification),
            Stage::Pagination => PaginationEvaluator.get_query(query, specification),
            Stage::AsNoTracking => AsNoTrackingEvaluator.get_query(query, specification),
            Stage::AsSplitQuery => AsSplitQueryEvaluator.get_query(query, specification),
            Stage::AsNoTrackingWithIdentityResolution => {
                AsNoTrackingWithIdentityResolutionEvaluator.get_query(query, specification)
            }
        }
    }

    /// Applies the stage to a materialized collection.
    ///
    /// Stages without in-memory meaning fail with `NotSupported`.
    pub fn evaluate<T>(self, items: Vec<T>, specification: &Specification<T>) -> Result<Vec<T>> {
        match self {
            Stage::Where => WhereEvaluator.evaluate(items, specification),
            Stage::Order => OrderEvaluator.evaluate(items, specification),
            Stage::Pagination => PaginationEvaluator.evaluate(items, specification),
            other => Err(SpecificationError::NotSupported {
                feature: other.name(),
            }),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
