use std::fmt;
use std::path::PathBuf;

use crate::core::{Result, TempError};
use crate::temp::ElementId;

/// A resource that could not be removed during a disposal pass.
#[derive(Debug)]
pub struct CleanupFailure {
    pub id: ElementId,
    pub path: PathBuf,
    pub error: TempError,
}

/// Outcome of `Registry::dispose()`: every attempted removal, successful or not.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub destroyed: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// Returns true if every resource was removed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// `Ok(())` for a clean report, otherwise `TempError::Cleanup` carrying the report.
    pub fn into_result(self) -> Result<()> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(TempError::Cleanup(self))
        }
    }
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.destroyed.len() + self.failures.len();
        if self.is_clean() {
            return write!(f, "cleaned up {} resources", total);
        }
        write!(
            f,
            "failed to clean up {} of {} resources",
            self.failures.len(),
            total
        )?;
        for failure in &self.failures {
            write!(f, "; {} {}", failure.id, failure.error)?;
        }
        Ok(())
    }
}
