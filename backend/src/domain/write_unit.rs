//! Explicit multi-record write units.
//!
//! Engagement operations must touch a post record and a user record as one
//! logical unit, but the stores offer no cross-record transaction. A
//! [`WriteUnit`] names the operation and records each store write as it
//! lands; when a later write fails after an earlier one committed, it emits a
//! structured warning identifying exactly which halves of the unit are on
//! disk. There is no rollback: the aggregates stay transiently inconsistent
//! until the next full write (the accepted recovery model).

use tracing::warn;

use super::error::Error;
use super::ports::StoreError;

/// Tracks the progress of one logical unit of store writes.
///
/// # Examples
/// ```
/// use backend::domain::WriteUnit;
/// use backend::domain::ports::StoreError;
///
/// let mut unit = WriteUnit::new("add_reaction");
/// let step: Result<(), StoreError> = Ok(());
/// unit.apply("post.reactions", step).expect("first write lands");
/// assert_eq!(unit.committed(), &["post.reactions"]);
/// ```
#[derive(Debug)]
pub struct WriteUnit {
    operation: &'static str,
    committed: Vec<&'static str>,
}

impl WriteUnit {
    /// Start a named unit.
    pub const fn new(operation: &'static str) -> Self {
        Self {
            operation,
            committed: Vec::new(),
        }
    }

    /// Record the outcome of one store write within the unit.
    ///
    /// On failure after at least one committed step, logs a warning carrying
    /// the operation name, the committed steps, and the failed step, then
    /// maps the store error into a domain [`Error`] for the caller to
    /// propagate.
    pub fn apply<T>(
        &mut self,
        step: &'static str,
        result: Result<T, StoreError>,
    ) -> Result<T, Error> {
        match result {
            Ok(value) => {
                self.committed.push(step);
                Ok(value)
            }
            Err(err) => {
                if !self.committed.is_empty() {
                    warn!(
                        operation = self.operation,
                        committed = ?self.committed,
                        failed = step,
                        error = %err,
                        "write unit aborted after partial commit; paired aggregates disagree until repaired by a later write",
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Steps that have landed so far, in order.
    pub fn committed(&self) -> &[&'static str] {
        self.committed.as_slice()
    }
}
