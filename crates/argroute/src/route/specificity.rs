//! Route specificity scoring
//!
//! The score is an integer, but it compares like a lexicographic key. Each
//! segment kind counts toward one tier, and every tier outweighs any number
//! of segments in the tiers below it. From most to least significant:
//!
//! 1. literal segments
//! 2. typed parameters
//! 3. required parameters
//! 4. parameters of any kind (catch-alls excluded)
//! 5. declared options
//! 6. a catch-all, which subtracts one
//!
//! So `git {*args}` outranks `{a:int} {b:int} ... {i:int}` however many
//! typed parameters the second route has, and `deploy {env} --force`
//! outranks `deploy {env}`.
//!
//! Per-tier counts saturate at [`TIER_CAPACITY`] - 1, far beyond any
//! realistic pattern.
//!
//! # Examples
//!
//! ```
//! use argroute::route::calculate_specificity;
//! use argroute::pattern::parse_pattern;
//!
//! let literal = calculate_specificity(&parse_pattern("status").unwrap());
//! let param = calculate_specificity(&parse_pattern("{name}").unwrap());
//! assert!(literal > param);
//! ```

use crate::pattern::{SegmentSyntax, Syntax};

/// Distinct counts a tier can hold before it would spill into the next one
pub const TIER_CAPACITY: i64 = 1000;

pub const OPTION_WEIGHT: i64 = TIER_CAPACITY;
pub const PARAMETER_WEIGHT: i64 = OPTION_WEIGHT * TIER_CAPACITY;
/// Added on top of [`PARAMETER_WEIGHT`] when the parameter is required
pub const REQUIRED_WEIGHT: i64 = PARAMETER_WEIGHT * TIER_CAPACITY;
/// Added on top of [`PARAMETER_WEIGHT`] when the parameter has a type
pub const TYPED_WEIGHT: i64 = REQUIRED_WEIGHT * TIER_CAPACITY;
pub const LITERAL_WEIGHT: i64 = TYPED_WEIGHT * TIER_CAPACITY;
pub const CATCH_ALL_WEIGHT: i64 = -1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct TierCounts {
    literals: i64,
    typed: i64,
    required: i64,
    parameters: i64,
    options: i64,
    catch_alls: i64,
}

impl TierCounts {
    fn add(&mut self, segment: &SegmentSyntax) {
        match segment {
            SegmentSyntax::Literal { .. } => self.literals += 1,
            SegmentSyntax::Parameter {
                type_constraint,
                is_optional,
                ..
            } => {
                self.parameters += 1;
                if type_constraint.is_some() {
                    self.typed += 1;
                }
                if !*is_optional {
                    self.required += 1;
                }
            }
            SegmentSyntax::Option(_) => self.options += 1,
            SegmentSyntax::CatchAll { .. } => self.catch_alls += 1,
        }
    }

    fn score(&self) -> i64 {
        let tier = |count: i64, weight: i64| count.min(TIER_CAPACITY - 1) * weight;
        tier(self.literals, LITERAL_WEIGHT)
            + tier(self.typed, TYPED_WEIGHT)
            + tier(self.required, REQUIRED_WEIGHT)
            + tier(self.parameters, PARAMETER_WEIGHT)
            + tier(self.options, OPTION_WEIGHT)
            + self.catch_alls.min(1) * CATCH_ALL_WEIGHT
    }
}

/// Weight a single segment contributes on its own
pub fn segment_weight(segment: &SegmentSyntax) -> i64 {
    let mut counts = TierCounts::default();
    counts.add(segment);
    counts.score()
}

/// Ranking score of a whole pattern; higher is more specific
pub fn calculate_specificity(syntax: &Syntax) -> i64 {
    let mut counts = TierCounts::default();
    for segment in &syntax.segments {
        counts.add(segment);
    }
    counts.score()
}
