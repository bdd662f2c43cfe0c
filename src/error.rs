//! # Errors
//!
//! The scheduler's failure modes are few and none of them are fatal. They are
//! reported as values so the caller decides what to do (try another group,
//! drop the task, log it).

use thiserror::Error;

/// Errors returned by the fallible group operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Every slot in the group is occupied. Groups never grow.
    #[error("task group is full ({capacity} slots)")]
    GroupFull {
        /// Fixed slot count of the group that refused the task.
        capacity: usize,
    },

    /// A group was asked to hold itself, which would recurse forever on the
    /// first run pass. Longer cycles are not detected.
    #[error("a task group cannot be a member of itself")]
    SelfReference,
}
