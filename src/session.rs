use parking_lot::RwLock;

use crate::{
    alternatives::{Alternative, AlternativeStore, NewAlternative},
    criteria::{Criterion, CriterionKind, CriterionRegistry, NewCriterion},
    error::{BatchError, Error, ValidationError},
    policy::{BatchMode, LateCriteria, SessionPolicy},
    score::{self, Best, Scoreboard},
};

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Empty,
    CriteriaLoaded,
    AlternativesLoaded,
    /// Criteria were added after alternatives under `LateCriteria::Invalidate`. Scoring fails
    /// until the stale alternatives are dropped.
    Stale,
}

#[derive(Clone, Debug, Default)]
struct Matrix {
    criteria: CriterionRegistry,
    alternatives: AlternativeStore,
}

impl Matrix {
    fn add_criterion(
        &mut self,
        criterion: NewCriterion,
        policy: &SessionPolicy,
    ) -> Result<usize, Error> {
        if !self.alternatives.is_empty() && policy.late_criteria == LateCriteria::Reject {
            return Err(ValidationError::CriteriaFrozen(criterion.name).into());
        }
        let index = self.criteria.add(criterion, policy.duplicate_names)?;
        if !self.alternatives.is_empty() {
            tracing::warn!(
                alternatives = self.alternatives.len(),
                "criterion added after alternatives, existing alternatives are stale"
            );
        }
        Ok(index)
    }

    fn add_alternative(
        &mut self,
        alternative: NewAlternative,
        policy: &SessionPolicy,
    ) -> Result<usize, Error> {
        self.alternatives
            .add(alternative, self.criteria.len(), policy.duplicate_names)
    }

    fn stage(&self) -> Stage {
        if self.alternatives.first_stale(self.criteria.len()).is_some() {
            Stage::Stale
        } else if !self.alternatives.is_empty() {
            Stage::AlternativesLoaded
        } else if !self.criteria.is_empty() {
            Stage::CriteriaLoaded
        } else {
            Stage::Empty
        }
    }

    fn scoreboard(&self) -> Result<Scoreboard, Error> {
        let dimensions = self.criteria.len();
        if dimensions > 0 {
            if let Some(stale) = self.alternatives.first_stale(dimensions) {
                return Err(Error::DimensionMismatch {
                    alternative: stale.name.clone(),
                    expected: dimensions,
                    found: stale.values.len(),
                });
            }
        }
        score::scoreboard(self.criteria.criteria(), self.alternatives.alternatives())
    }
}

/// One decision matrix: its criteria, its alternatives and the policy they were entered under.
///
/// A session is safe to share between threads. Every mutation takes the write lock, so scoring
/// never observes a partially applied change.
#[derive(Debug, Default)]
pub struct Session {
    policy: SessionPolicy,
    matrix: RwLock<Matrix>,
}

impl Session {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            policy,
            matrix: Default::default(),
        }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Register a criterion and return its index.
    pub fn add_criterion(
        &self,
        name: impl Into<String>,
        weight: f64,
        kind: CriterionKind,
    ) -> Result<usize, Error> {
        let criterion = NewCriterion::new(name, weight, kind);
        let name = criterion.name.clone();
        let result = self.matrix.write().add_criterion(criterion, &self.policy);
        match &result {
            Ok(index) => tracing::debug!(index, %name, %kind, weight, "criterion added"),
            Err(error) => tracing::warn!(%name, %error, "criterion rejected"),
        }
        result
    }

    /// Register an alternative with one value per criterion and return its index.
    pub fn add_alternative(
        &self,
        name: impl Into<String>,
        values: impl Into<Vec<f64>>,
    ) -> Result<usize, Error> {
        let alternative = NewAlternative::new(name, values);
        let name = alternative.name.clone();
        let result = self.matrix.write().add_alternative(alternative, &self.policy);
        match &result {
            Ok(index) => tracing::debug!(index, %name, "alternative added"),
            Err(error) => tracing::warn!(%name, %error, "alternative rejected"),
        }
        result
    }

    /// Register several criteria under a single write lock, following the session's batch mode.
    pub fn add_criteria<I>(&self, batch: I) -> Result<Vec<Criterion>, BatchError>
    where
        I: IntoIterator<Item = NewCriterion>,
    {
        let policy = self.policy;
        self.apply_batch(batch, |matrix, criterion| {
            let index = matrix.add_criterion(criterion, &policy)?;
            Ok(matrix.criteria.criteria()[index].clone())
        })
    }

    /// Register several alternatives under a single write lock, following the session's batch
    /// mode.
    pub fn add_alternatives<I>(&self, batch: I) -> Result<Vec<Alternative>, BatchError>
    where
        I: IntoIterator<Item = NewAlternative>,
    {
        let policy = self.policy;
        self.apply_batch(batch, |matrix, alternative| {
            let index = matrix.add_alternative(alternative, &policy)?;
            Ok(matrix.alternatives.alternatives()[index].clone())
        })
    }

    fn apply_batch<I, T, R, F>(&self, batch: I, mut apply: F) -> Result<Vec<R>, BatchError>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Matrix, T) -> Result<R, Error>,
    {
        let mut guard = self.matrix.write();
        // Atomic batches work on a copy that only replaces the matrix once every item is in.
        let mut staged = match self.policy.batch_mode {
            BatchMode::Atomic => Some(guard.clone()),
            BatchMode::BestEffort => None,
        };
        let matrix = staged.as_mut().unwrap_or(&mut *guard);
        let mut applied = Vec::new();
        for (position, item) in batch.into_iter().enumerate() {
            match apply(&mut *matrix, item) {
                Ok(item) => applied.push(item),
                Err(error) => {
                    let kept = match self.policy.batch_mode {
                        BatchMode::Atomic => 0,
                        BatchMode::BestEffort => applied.len(),
                    };
                    tracing::warn!(position, kept, %error, "batch rejected");
                    return Err(BatchError {
                        position,
                        applied: kept,
                        error,
                    });
                }
            }
        }
        if let Some(staged) = staged {
            *guard = staged;
        }
        tracing::debug!(items = applied.len(), "batch applied");
        Ok(applied)
    }

    pub fn criteria(&self) -> Vec<Criterion> {
        self.matrix.read().criteria.criteria().to_vec()
    }

    pub fn alternatives(&self) -> Vec<Alternative> {
        self.matrix.read().alternatives.alternatives().to_vec()
    }

    pub fn stage(&self) -> Stage {
        self.matrix.read().stage()
    }

    /// Remove the alternatives made stale by a late criterion, returning them in insertion order
    /// so they can be re-entered with a value for every criterion.
    pub fn drop_stale_alternatives(&self) -> Vec<Alternative> {
        let mut matrix = self.matrix.write();
        let dimensions = matrix.criteria.len();
        let stale = matrix.alternatives.drain_stale(dimensions);
        if !stale.is_empty() {
            tracing::debug!(dropped = stale.len(), "stale alternatives dropped");
        }
        stale
    }

    /// Score every alternative against the current matrix.
    pub fn scoreboard(&self) -> Result<Scoreboard, Error> {
        let result = self.matrix.read().scoreboard();
        match &result {
            Ok(board) => tracing::debug!(
                best = board.best_index(),
                alternatives = board.entries().len(),
                "scored"
            ),
            Err(error) => tracing::warn!(%error, "scoring failed"),
        }
        result
    }

    /// Index (in insertion order) of the highest scoring alternative, along with every score.
    pub fn compute_best(&self) -> Result<Best, Error> {
        self.scoreboard().map(Scoreboard::into_best)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{policy::DuplicateNames, test::assert_within};

    fn example() -> Session {
        let session = Session::default();
        session.add_criterion("Cost", 5.0, CriterionKind::Cost).unwrap();
        session.add_criterion("Env", 4.0, CriterionKind::Benefit).unwrap();
        session.add_alternative("A", [4.0, 2.0]).unwrap();
        session.add_alternative("B", [2.0, 3.0]).unwrap();
        session
    }

    #[test]
    fn lifecycle() {
        let session = Session::default();
        assert_eq!(session.stage(), Stage::Empty);
        session.add_criterion("Cost", 5.0, CriterionKind::Cost).unwrap();
        assert_eq!(session.stage(), Stage::CriteriaLoaded);
        session.add_alternative("A", [1.0]).unwrap();
        assert_eq!(session.stage(), Stage::AlternativesLoaded);
        session.compute_best().unwrap();
        assert_eq!(session.stage(), Stage::AlternativesLoaded);
    }

    #[test]
    fn compute_best_is_idempotent() {
        let session = example();
        let first = session.compute_best().unwrap();
        let second = session.compute_best().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.index, 1);
        assert_within(first.scores[0].as_f64(), 5.0 * 0.5 + 4.0 * (2.0 / 3.0), 1e-9);
        assert_within(first.scores[1].as_f64(), 9.0, 1e-9);
        assert_eq!(session.alternatives().len(), 2);
    }

    #[test]
    fn empty_input() {
        let session = Session::default();
        assert!(matches!(session.compute_best(), Err(Error::EmptyInput { .. })));
        session.add_criterion("Cost", 5.0, CriterionKind::Cost).unwrap();
        assert_eq!(
            session.compute_best(),
            Err(Error::EmptyInput {
                criteria: 1,
                alternatives: 0
            })
        );
    }

    #[test]
    fn rejected_alternative_is_a_no_op() {
        let session = example();
        let before = session.compute_best().unwrap();
        assert!(matches!(
            session.add_alternative("C", [1.0, 2.0, 3.0]),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 3,
                ..
            })
        ));
        assert_eq!(session.alternatives().len(), 2);
        assert_eq!(session.compute_best().unwrap(), before);
    }

    #[test]
    fn negative_values_rejected() {
        let session = Session::default();
        session.add_criterion("Env", 1.0, CriterionKind::Benefit).unwrap();
        session.add_alternative("B", [1.0]).unwrap();
        assert_eq!(
            session.add_alternative("A", [-4.0]),
            Err(ValidationError::NegativeValue {
                alternative: "A".to_string(),
                index: 0
            }
            .into())
        );
        assert!(session
            .add_alternatives([NewAlternative::new("C", [-1.0])])
            .is_err());
        assert_eq!(session.alternatives().len(), 1);
        assert_eq!(session.compute_best().unwrap().index, 0);
    }

    #[test]
    fn alternatives_need_criteria() {
        let session = Session::default();
        assert_eq!(
            session.add_alternative("X", Vec::<f64>::new()),
            Err(ValidationError::NoCriteria("X".to_string()).into())
        );
        assert_eq!(session.stage(), Stage::Empty);
        assert_eq!(session.add_criterion("Cost", 5.0, CriterionKind::Cost), Ok(0));
        session.add_alternative("X", [1.0]).unwrap();
        assert_eq!(session.compute_best().unwrap().index, 0);
    }

    #[test]
    fn criteria_and_alternatives_serialize() {
        let session = example();
        let criteria = serde_json::to_value(session.criteria()).unwrap();
        assert_eq!(
            criteria,
            serde_json::json!([
                {"name": "Cost", "weight": 5.0, "kind": "cost"},
                {"name": "Env", "weight": 4.0, "kind": "benefit"},
            ])
        );
        let alternatives = serde_json::to_value(session.alternatives()).unwrap();
        assert_eq!(
            alternatives[1],
            serde_json::json!({"name": "B", "values": [2.0, 3.0]})
        );
    }

    #[test]
    fn late_criteria_rejected_by_default() {
        let session = example();
        assert_eq!(
            session.add_criterion("Late", 1.0, CriterionKind::Benefit),
            Err(ValidationError::CriteriaFrozen("Late".to_string()).into())
        );
        assert_eq!(session.criteria().len(), 2);
        assert_eq!(session.compute_best().unwrap().index, 1);
    }

    #[test]
    fn late_criteria_invalidate_alternatives() {
        let session = Session::new(SessionPolicy {
            late_criteria: LateCriteria::Invalidate,
            ..Default::default()
        });
        session.add_criterion("Cost", 5.0, CriterionKind::Cost).unwrap();
        session.add_alternative("A", [4.0]).unwrap();
        session.add_alternative("B", [2.0]).unwrap();
        assert_eq!(
            session.add_criterion("Env", 4.0, CriterionKind::Benefit),
            Ok(1)
        );
        assert_eq!(session.stage(), Stage::Stale);
        assert_eq!(
            session.compute_best(),
            Err(Error::DimensionMismatch {
                alternative: "A".to_string(),
                expected: 2,
                found: 1,
            })
        );

        let stale = session.drop_stale_alternatives();
        let names: Vec<&str> = stale.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(session.stage(), Stage::CriteriaLoaded);

        session.add_alternative("A", [4.0, 2.0]).unwrap();
        session.add_alternative("B", [2.0, 3.0]).unwrap();
        assert_eq!(session.compute_best().unwrap().index, 1);
    }

    #[test]
    fn duplicate_names_policy() {
        let session = Session::new(SessionPolicy {
            duplicate_names: DuplicateNames::Reject,
            ..Default::default()
        });
        session.add_criterion("Cost", 5.0, CriterionKind::Cost).unwrap();
        assert_eq!(
            session.add_criterion("Cost", 1.0, CriterionKind::Benefit),
            Err(ValidationError::DuplicateName("Cost".to_string()).into())
        );
        session.add_alternative("A", [1.0]).unwrap();
        assert!(session.add_alternative("A", [2.0]).is_err());

        let session = Session::default();
        session.add_criterion("Cost", 5.0, CriterionKind::Cost).unwrap();
        assert_eq!(session.add_criterion("Cost", 1.0, CriterionKind::Benefit), Ok(1));
    }

    #[test]
    fn best_effort_batch_keeps_prefix() {
        let session = Session::default();
        let result = session.add_criteria([
            NewCriterion::new("Cost", 5.0, CriterionKind::Cost),
            NewCriterion::new("Env", 0.0, CriterionKind::Benefit),
            NewCriterion::new("Other", 1.0, CriterionKind::Benefit),
        ]);
        let error = result.unwrap_err();
        assert_eq!(error.position, 1);
        assert_eq!(error.applied, 1);
        assert!(matches!(
            error.error,
            Error::Validation(ValidationError::InvalidWeight { .. })
        ));
        assert_eq!(session.criteria().len(), 1);
    }

    #[test]
    fn atomic_batch_is_all_or_nothing() {
        let session = Session::new(SessionPolicy {
            batch_mode: BatchMode::Atomic,
            ..Default::default()
        });
        session.add_criterion("Cost", 5.0, CriterionKind::Cost).unwrap();
        let error = session
            .add_alternatives([
                NewAlternative::new("A", [4.0]),
                NewAlternative::new("B", [2.0, 3.0]),
            ])
            .unwrap_err();
        assert_eq!(error.position, 1);
        assert_eq!(error.applied, 0);
        assert!(session.alternatives().is_empty());

        let applied = session
            .add_alternatives([
                NewAlternative::new("A", [4.0]),
                NewAlternative::new("B", [2.0]),
            ])
            .unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(session.compute_best().unwrap().index, 1);
    }

    #[test]
    fn sessions_are_independent() {
        let a = example();
        let b = Session::default();
        b.add_criterion("Only", 1.0, CriterionKind::Benefit).unwrap();
        assert_eq!(a.criteria().len(), 2);
        assert_eq!(b.criteria().len(), 1);
    }

    #[test]
    fn concurrent_writers_and_readers() {
        let session = Session::default();
        session.add_criterion("Cost", 5.0, CriterionKind::Cost).unwrap();
        session.add_criterion("Env", 4.0, CriterionKind::Benefit).unwrap();
        std::thread::scope(|scope| {
            for t in 0..4 {
                let session = &session;
                scope.spawn(move || {
                    for i in 0..25 {
                        let value = (t * 25 + i + 1) as f64;
                        session
                            .add_alternative(format!("{t}-{i}"), [value, value])
                            .unwrap();
                        let best = session.compute_best().unwrap();
                        assert!(best.index < best.scores.len());
                    }
                });
            }
        });
        let best = session.compute_best().unwrap();
        assert_eq!(best.scores.len(), 100);
    }
}
