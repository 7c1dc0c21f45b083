use serde::Deserialize;

/// Per-session rules for the cases where a decision matrix can be built up in more than one
/// reasonable way.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionPolicy {
    pub duplicate_names: DuplicateNames,
    pub late_criteria: LateCriteria,
    pub batch_mode: BatchMode,
}

/// Whether two criteria (or two alternatives) may share a name.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateNames {
    #[default]
    Allow,
    Reject,
}

/// What happens to `add_criterion` once alternatives exist.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LateCriteria {
    /// The criterion is refused and the matrix stays scorable.
    #[default]
    Reject,
    /// The criterion is accepted. Existing alternatives become stale and scoring fails until they
    /// are dropped with `Session::drop_stale_alternatives` and re-entered.
    Invalidate,
}

/// How a batch of records is applied.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Rows are applied one at a time. A failing row aborts the batch, rows before it are kept.
    #[default]
    BestEffort,
    /// Either every row of the batch is applied or none is.
    Atomic,
}
