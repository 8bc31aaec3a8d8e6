//! Test-case orchestration.
//!
//! Sequences the repository host and the AI gateway for each stage of the
//! wizard: summaries, test code (single and batch) and the pull request.
//! Stateless between calls; every input arrives with the request.

mod error;
mod orchestrator;

pub use error::OrchestrationError;
pub use orchestrator::{
    MultipleTests, PrText, SummaryBatch, TestCaseService, TestPullRequestOutcome,
};
