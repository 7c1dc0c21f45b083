use thiserror::Error;

/// Errors returned by session operations. A rejected operation never modifies the session.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("alternative {alternative:?} has {found} values, expected one per criterion ({expected})")]
    DimensionMismatch {
        alternative: String,
        expected: usize,
        found: usize,
    },

    #[error("criterion {criterion:?} (index {index}) cannot be normalized: {reason}")]
    DegenerateRange {
        criterion: String,
        index: usize,
        reason: &'static str,
    },

    #[error("nothing to score: {criteria} criteria, {alternatives} alternatives")]
    EmptyInput { criteria: usize, alternatives: usize },
}

/// A batch stopped at `position`. Under `BatchMode::BestEffort` the first `applied` items are
/// kept, under `BatchMode::Atomic` nothing is.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("batch item {position} rejected: {error}")]
pub struct BatchError {
    pub position: usize,
    pub applied: usize,
    #[source]
    pub error: Error,
}

/// Malformed criterion or alternative fields.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("criterion {name:?} has weight {weight}, weights must be finite and greater than 0")]
    InvalidWeight { name: String, weight: f64 },

    #[error("weight {0:?} is not a number")]
    NonNumericWeight(String),

    #[error("alternative {alternative:?} has value {field:?} which is not a number")]
    NonNumericValue { alternative: String, field: String },

    #[error("unknown criterion kind {0:?}, expected \"cost\" or \"benefit\"")]
    UnknownKind(String),

    #[error("alternative {alternative:?} has a non-finite value at index {index}")]
    NonFiniteValue { alternative: String, index: usize },

    #[error("alternative {alternative:?} has a negative value at index {index}")]
    NegativeValue { alternative: String, index: usize },

    #[error("alternative {0:?} rejected, no criteria are registered")]
    NoCriteria(String),

    #[error("name {0:?} contains a line break")]
    LineBreakInName(String),

    #[error("name {0:?} is already registered")]
    DuplicateName(String),

    #[error("criterion {0:?} rejected, alternatives have already been added")]
    CriteriaFrozen(String),
}
