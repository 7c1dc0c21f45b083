use serde::Serialize;

use crate::{error::ValidationError, policy::DuplicateNames, Weight};

/// Direction of a criterion: for `Cost` lower raw values are better, for `Benefit` higher ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionKind {
    Cost,
    Benefit,
}

impl CriterionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Benefit => "benefit",
        }
    }
}

impl std::str::FromStr for CriterionKind {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cost" => Ok(Self::Cost),
            "benefit" => Ok(Self::Benefit),
            _ => Err(ValidationError::UnknownKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for CriterionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered criterion. Its position in the registry is the position of its value in every
/// alternative.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Criterion {
    pub name: String,
    pub weight: Weight,
    pub kind: CriterionKind,
}

/// Unvalidated criterion fields, as they arrive from a caller or a record.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCriterion {
    pub name: String,
    pub weight: f64,
    pub kind: CriterionKind,
}

impl NewCriterion {
    pub fn new(name: impl Into<String>, weight: f64, kind: CriterionKind) -> Self {
        Self {
            name: name.into(),
            weight,
            kind,
        }
    }
}

/// Names end up in line-oriented records, so they cannot contain line breaks.
pub(crate) fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.contains(['\n', '\r']) {
        return Err(ValidationError::LineBreakInName(name.to_string()));
    }
    Ok(())
}

/// Append-only, ordered set of criteria.
#[derive(Clone, Debug, Default)]
pub struct CriterionRegistry {
    criteria: Vec<Criterion>,
}

impl CriterionRegistry {
    /// Validate `criterion` without registering it.
    pub fn check(
        &self,
        criterion: &NewCriterion,
        duplicates: DuplicateNames,
    ) -> Result<Criterion, ValidationError> {
        check_name(&criterion.name)?;
        let weight =
            Weight::new(criterion.weight).ok_or_else(|| ValidationError::InvalidWeight {
                name: criterion.name.clone(),
                weight: criterion.weight,
            })?;
        if duplicates == DuplicateNames::Reject && self.position(&criterion.name).is_some() {
            return Err(ValidationError::DuplicateName(criterion.name.clone()));
        }
        Ok(Criterion {
            name: criterion.name.clone(),
            weight,
            kind: criterion.kind,
        })
    }

    /// Register a criterion, returning its index.
    pub fn add(
        &mut self,
        criterion: NewCriterion,
        duplicates: DuplicateNames,
    ) -> Result<usize, ValidationError> {
        let criterion = self.check(&criterion, duplicates)?;
        self.criteria.push(criterion);
        Ok(self.criteria.len() - 1)
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.criteria.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}
