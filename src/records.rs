//! Line-oriented, comma separated records for criteria and alternatives.
//!
//! ```text
//! Cost,5,cost
//! Env,4,benefit
//! ```
//!
//! ```text
//! A,4,2
//! B,2,3
//! ```
//!
//! Fields are trimmed. A field may be wrapped in double quotes (with `""` for a literal quote) to
//! keep commas or surrounding whitespace. Records never span lines, which is why names with line
//! breaks are rejected before they reach a session.

use std::borrow::Cow;

use thiserror::Error;

use crate::{
    alternatives::{Alternative, NewAlternative},
    criteria::{Criterion, CriterionKind, NewCriterion},
    error::{BatchError, Error, ValidationError},
    policy::BatchMode,
    session::Session,
};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("line {line}: expected {expected} fields, found {found}")]
    Arity {
        line: usize,
        expected: &'static str,
        found: usize,
    },

    #[error("line {line}: {error}")]
    Rejected {
        line: usize,
        #[source]
        error: Error,
    },
}

impl RecordError {
    pub fn line(&self) -> usize {
        match self {
            Self::Arity { line, .. } | Self::Rejected { line, .. } => *line,
        }
    }
}

/// Parse a `name,weight,kind` record. Blank records yield `None`.
pub fn parse_criterion_record(
    line: usize,
    record: &str,
) -> Result<Option<NewCriterion>, RecordError> {
    if record.trim().is_empty() {
        return Ok(None);
    }
    let fields = split_fields(record);
    let [name, weight, kind] = <[String; 3]>::try_from(fields).map_err(|fields| {
        RecordError::Arity {
            line,
            expected: "exactly 3",
            found: fields.len(),
        }
    })?;
    let rejected = |error: ValidationError| RecordError::Rejected {
        line,
        error: error.into(),
    };
    let weight = weight
        .parse::<f64>()
        .map_err(|_| rejected(ValidationError::NonNumericWeight(weight.clone())))?;
    let kind = kind.parse::<CriterionKind>().map_err(rejected)?;
    Ok(Some(NewCriterion::new(name, weight, kind)))
}

/// Parse a `name,value,value,...` record. Blank records yield `None`.
pub fn parse_alternative_record(
    line: usize,
    record: &str,
) -> Result<Option<NewAlternative>, RecordError> {
    if record.trim().is_empty() {
        return Ok(None);
    }
    let mut fields = split_fields(record).into_iter();
    let found = fields.len();
    let (Some(name), true) = (fields.next(), found >= 2) else {
        return Err(RecordError::Arity {
            line,
            expected: "at least 2",
            found,
        });
    };
    let values = fields
        .map(|field| {
            field.parse::<f64>().map_err(|_| RecordError::Rejected {
                line,
                error: ValidationError::NonNumericValue {
                    alternative: name.clone(),
                    field,
                }
                .into(),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(Some(NewAlternative::new(name, values)))
}

/// Add every criterion record in `text` to `session`, returning the criteria added.
///
/// The batch stops at the first malformed or rejected record. What happens to the records before
/// it follows the session's `BatchMode`.
pub fn ingest_criteria(session: &Session, text: &str) -> Result<Vec<Criterion>, RecordError> {
    ingest(
        text,
        session.policy().batch_mode,
        parse_criterion_record,
        |rows| session.add_criteria(rows),
    )
}

/// Add every alternative record in `text` to `session`, returning the alternatives added.
pub fn ingest_alternatives(
    session: &Session,
    text: &str,
) -> Result<Vec<Alternative>, RecordError> {
    ingest(
        text,
        session.policy().batch_mode,
        parse_alternative_record,
        |rows| session.add_alternatives(rows),
    )
}

fn ingest<T, R>(
    text: &str,
    batch_mode: BatchMode,
    parse: impl Fn(usize, &str) -> Result<Option<T>, RecordError>,
    apply: impl FnOnce(Vec<T>) -> Result<Vec<R>, BatchError>,
) -> Result<Vec<R>, RecordError> {
    let mut rows = Vec::new();
    let mut lines = Vec::new();
    let mut malformed = None;
    for (index, record) in text.lines().enumerate() {
        match parse(index + 1, record) {
            Ok(Some(row)) => {
                rows.push(row);
                lines.push(index + 1);
            }
            Ok(None) => (),
            Err(error) => {
                malformed = Some(error);
                break;
            }
        }
    }
    if let (Some(error), BatchMode::Atomic) = (&malformed, batch_mode) {
        tracing::warn!(%error, "malformed record, batch discarded");
        return Err(error.clone());
    }
    let applied = apply(rows).map_err(|rejected| RecordError::Rejected {
        line: lines[rejected.position],
        error: rejected.error,
    })?;
    tracing::debug!(records = applied.len(), "records ingested");
    match malformed {
        Some(error) => {
            tracing::warn!(%error, kept = applied.len(), "malformed record, batch stopped");
            Err(error)
        }
        None => Ok(applied),
    }
}

/// Write criteria as records that `ingest_criteria` reads back unchanged.
pub fn export_criteria(criteria: &[Criterion]) -> String {
    criteria
        .iter()
        .map(|c| format!("{},{},{}\n", quote(&c.name), c.weight.as_f64(), c.kind))
        .collect()
}

/// Write alternatives as records that `ingest_alternatives` reads back unchanged.
pub fn export_alternatives(alternatives: &[Alternative]) -> String {
    alternatives
        .iter()
        .map(|a| {
            let mut record = quote(&a.name).into_owned();
            for value in a.raw_values() {
                record.push(',');
                record.push_str(&value.to_string());
            }
            record.push('\n');
            record
        })
        .collect()
}

fn split_fields(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = record.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if !quoted && field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
                quoted = true;
            }
            ',' if !in_quotes => {
                fields.push(finish_field(std::mem::take(&mut field), quoted));
                quoted = false;
            }
            c => field.push(c),
        }
    }
    fields.push(finish_field(field, quoted));
    fields
}

fn finish_field(field: String, quoted: bool) -> String {
    if quoted {
        return field;
    }
    field.trim().to_string()
}

fn quote(field: &str) -> Cow<'_, str> {
    let needs_quotes = field.contains([',', '"'])
        || field.trim() != field
        || field.is_empty();
    if !needs_quotes {
        return Cow::Borrowed(field);
    }
    Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
}
