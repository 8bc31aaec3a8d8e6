pub mod client;
pub mod wizard;

pub use client::{ApiClient, ClientError};
pub use testgen_api;
pub use wizard::{RepoSelection, Step, Wizard, WizardError};
