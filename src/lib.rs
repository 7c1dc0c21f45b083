//! Simple Additive Weighting (SAW) over a decision matrix.
//!
//! Criteria are registered first, each with a positive weight and a direction (cost or benefit).
//! Alternatives carry one raw value per criterion. Scoring normalizes every column against the
//! values observed across all stored alternatives and sums the weighted results:
//! - benefit columns: `value / max`
//! - cost columns: `min / value`
//!
//! The alternative with the highest score wins. Ties go to the alternative inserted first.
//!
//! ```
//! use saw_selection::{CriterionKind, Session};
//!
//! let session = Session::default();
//! session.add_criterion("Cost", 5.0, CriterionKind::Cost).unwrap();
//! session.add_criterion("Env", 4.0, CriterionKind::Benefit).unwrap();
//! session.add_alternative("A", [4.0, 2.0]).unwrap();
//! session.add_alternative("B", [2.0, 3.0]).unwrap();
//! assert_eq!(session.compute_best().unwrap().index, 1);
//! ```

pub mod alternatives;
pub mod criteria;
pub mod error;
pub mod normalize;
pub mod num;
pub mod policy;
pub mod records;
pub mod score;
pub mod session;

pub use crate::alternatives::{Alternative, AlternativeStore, NewAlternative};
pub use crate::criteria::{Criterion, CriterionKind, CriterionRegistry, NewCriterion};
pub use crate::error::{BatchError, Error, ValidationError};
pub use crate::num::{Score, Weight};
pub use crate::policy::{BatchMode, DuplicateNames, LateCriteria, SessionPolicy};
pub use crate::records::RecordError;
pub use crate::score::{Best, ScoredAlternative, Scoreboard};
pub use crate::session::{Session, Stage};
pub use arrayvec::ArrayVec;
