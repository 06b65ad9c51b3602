use crate::error::Result;
use crate::queryable::Queryable;
use crate::specification::Specification;

use super::Evaluator;

macro_rules! flag_evaluator {
    ($(#[$doc:meta])* $name:ident, $label:literal, $flag:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Evaluator for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn is_criteria_evaluator(&self) -> bool {
                true
            }

            fn get_query<T, Q: Queryable<T>>(
                &self,
                query: Q,
                specification: &Specification<T>,
            ) -> Result<Q> {
                if specification.$flag() {
                    Ok(query.$flag())
                } else {
                    Ok(query)
                }
            }
        }
    };
}

flag_evaluator!(
    /// Forwards the no-tracking directive.
    AsNoTrackingEvaluator,
    "as_no_tracking",
    as_no_tracking
);

flag_evaluator!(
    /// Forwards the no-tracking-with-identity-resolution directive.
    AsNoTrackingWithIdentityResolutionEvaluator,
    "as_no_tracking_with_identity_resolution",
    as_no_tracking_with_identity_resolution
);

flag_evaluator!(
    /// Forwards the split-query directive.
    AsSplitQueryEvaluator,
    "as_split_query",
    as_split_query
);
