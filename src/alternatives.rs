use ordered_float::NotNan;
use serde::Serialize;

use crate::{
    criteria::check_name,
    error::{Error, ValidationError},
    num::finite,
    policy::DuplicateNames,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alternative {
    pub name: String,
    /// Raw values, one per criterion in registry order.
    pub values: Vec<NotNan<f64>>,
}

impl Alternative {
    pub fn raw_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().map(|v| v.into_inner())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAlternative {
    pub name: String,
    pub values: Vec<f64>,
}

impl NewAlternative {
    pub fn new(name: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
        }
    }
}

/// Append-only, ordered set of alternatives. Insertion order is the tie-break order.
#[derive(Clone, Debug, Default)]
pub struct AlternativeStore {
    alternatives: Vec<Alternative>,
}

impl AlternativeStore {
    /// Validate `alternative` against the current criterion count without storing it. Values must
    /// be finite and non-negative.
    pub fn check(
        &self,
        alternative: &NewAlternative,
        dimensions: usize,
        duplicates: DuplicateNames,
    ) -> Result<Alternative, Error> {
        check_name(&alternative.name)?;
        if dimensions == 0 {
            return Err(ValidationError::NoCriteria(alternative.name.clone()).into());
        }
        if alternative.values.len() != dimensions {
            return Err(Error::DimensionMismatch {
                alternative: alternative.name.clone(),
                expected: dimensions,
                found: alternative.values.len(),
            });
        }
        let values = alternative
            .values
            .iter()
            .enumerate()
            .map(|(index, value)| -> Result<NotNan<f64>, ValidationError> {
                let value = finite(*value).ok_or_else(|| ValidationError::NonFiniteValue {
                    alternative: alternative.name.clone(),
                    index,
                })?;
                if value.into_inner() < 0.0 {
                    return Err(ValidationError::NegativeValue {
                        alternative: alternative.name.clone(),
                        index,
                    });
                }
                Ok(value)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if duplicates == DuplicateNames::Reject && self.position(&alternative.name).is_some() {
            return Err(ValidationError::DuplicateName(alternative.name.clone()).into());
        }
        Ok(Alternative {
            name: alternative.name.clone(),
            values,
        })
    }

    pub fn add(
        &mut self,
        alternative: NewAlternative,
        dimensions: usize,
        duplicates: DuplicateNames,
    ) -> Result<usize, Error> {
        let alternative = self.check(&alternative, dimensions, duplicates)?;
        self.alternatives.push(alternative);
        Ok(self.alternatives.len() - 1)
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.alternatives.iter().position(|a| a.name == name)
    }

    /// The first alternative whose length disagrees with `dimensions`.
    pub fn first_stale(&self, dimensions: usize) -> Option<&Alternative> {
        self.alternatives
            .iter()
            .find(|a| a.values.len() != dimensions)
    }

    /// Remove every alternative whose length disagrees with `dimensions`, preserving the order of
    /// the rest.
    pub fn drain_stale(&mut self, dimensions: usize) -> Vec<Alternative> {
        let (fresh, stale): (Vec<_>, Vec<_>) = std::mem::take(&mut self.alternatives)
            .into_iter()
            .partition(|a| a.values.len() == dimensions);
        self.alternatives = fresh;
        stale
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}
