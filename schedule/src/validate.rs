use thiserror::Error;

use crate::{Lock, Millis};

/// Structurally invalid schedule data. Not expected in normal operation:
/// the fetch layer hands over locks derived from contract state, so a
/// failure here means corrupt chain data and should be surfaced loudly
/// rather than silently producing wrong numbers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("lock: cliff duration {cliff}ms exceeds lock duration {lock}ms")]
    CliffExceedsDuration { cliff: Millis, lock: Millis },
}

impl Lock {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.cliff_duration > self.lock_duration {
            return Err(ScheduleError::CliffExceedsDuration {
                cliff: self.cliff_duration,
                lock: self.lock_duration,
            });
        }
        Ok(())
    }
}
