use arrayvec::ArrayVec;
use ordered_float::NotNan;
use serde::Serialize;

use crate::{
    alternatives::Alternative, criteria::Criterion, error::Error, normalize::normalize, Score,
};

/// One alternative's outcome.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredAlternative {
    /// Position in insertion order.
    pub index: usize,
    pub name: String,
    pub score: Score,
    pub normalized: Vec<NotNan<f64>>,
}

/// Result of `compute_best`: the winning position and the score of every alternative, both in
/// insertion order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Best {
    pub index: usize,
    pub scores: Vec<Score>,
}

/// Scores for every stored alternative, computed from a single snapshot of the matrix.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scoreboard {
    entries: Vec<ScoredAlternative>,
    best: usize,
}

impl Scoreboard {
    pub fn entries(&self) -> &[ScoredAlternative] {
        &self.entries
    }

    pub fn best(&self) -> &ScoredAlternative {
        &self.entries[self.best]
    }

    pub fn best_index(&self) -> usize {
        self.best
    }

    pub fn scores(&self) -> Vec<Score> {
        self.entries.iter().map(|e| e.score).collect()
    }

    /// All alternatives from highest to lowest score. Equal scores keep insertion order.
    pub fn ranking(&self) -> Vec<&ScoredAlternative> {
        let scores = self.scores();
        let order = permutation::sort_by(&scores, |a: &Score, b: &Score| b.cmp(a));
        order.apply_slice(self.entries.iter().collect::<Vec<_>>())
    }

    /// The `LIMIT` best alternatives, following `ranking`.
    pub fn top<const LIMIT: usize>(&self) -> ArrayVec<&ScoredAlternative, LIMIT> {
        self.ranking().into_iter().take(LIMIT).collect()
    }

    pub fn into_best(self) -> Best {
        Best {
            index: self.best,
            scores: self.scores(),
        }
    }
}

/// Weighted sum of one alternative's normalized values.
pub fn weighted_sum(criteria: &[Criterion], normalized: &[NotNan<f64>]) -> Result<Score, Error> {
    let mut total = Score::ZERO;
    for (index, (criterion, value)) in criteria.iter().zip(normalized).enumerate() {
        let term = criterion.weight.as_f64() * value.into_inner();
        total = Score::new(total.as_f64() + term).ok_or_else(|| Error::DegenerateRange {
            criterion: criterion.name.clone(),
            index,
            reason: "weighted score overflows",
        })?;
    }
    Ok(total)
}

/// Score every alternative against the full set. The best alternative is the first one, in
/// insertion order, with the highest score.
pub fn scoreboard(
    criteria: &[Criterion],
    alternatives: &[Alternative],
) -> Result<Scoreboard, Error> {
    if criteria.is_empty() || alternatives.is_empty() {
        return Err(Error::EmptyInput {
            criteria: criteria.len(),
            alternatives: alternatives.len(),
        });
    }
    let normalized = normalize(criteria, alternatives)?;
    let entries = alternatives
        .iter()
        .zip(normalized)
        .enumerate()
        .map(|(index, (alternative, normalized))| {
            Ok(ScoredAlternative {
                index,
                name: alternative.name.clone(),
                score: weighted_sum(criteria, &normalized)?,
                normalized,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    let best = entries.iter().fold(0, |best, entry| {
        if entry.score > entries[best].score {
            entry.index
        } else {
            best
        }
    });
    Ok(Scoreboard { entries, best })
}
