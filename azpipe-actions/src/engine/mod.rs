//! Run-and-poll engine
//!
//! Submits a pipeline run and follows it until Azure DevOps reports a
//! terminal status, the deadline passes, or the caller cancels.

pub mod outcome;
pub mod poller;

pub use outcome::{RunOutcome, RunReport};
pub use poller::{PollSettings, RunPoller};
