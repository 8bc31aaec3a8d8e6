//! Client-side state of the five-step generation wizard.
//!
//! The wizard is a plain value: front ends own one, feed it API results
//! through the transition methods, and persist it with [`Wizard::to_json`].
//! Transitions check the current step and the selection limits, so a
//! restored or replayed state can never skip a step.

use std::fmt;

use serde::{Deserialize, Serialize};

use testgen_api::service::{MAX_BATCH_SUMMARIES, MAX_SUMMARY_FILES};
use testgen_api::{
    GeneratedTestCode, RepositorySummary, SessionUser, TestFileInput, TestGenerationFailure,
    TestPullRequest, TestSummary,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    SignIn,
    SelectFiles,
    ReviewSummaries,
    ReviewCode,
    Submitted,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign in",
            Self::SelectFiles => "select files",
            Self::ReviewSummaries => "review summaries",
            Self::ReviewCode => "review code",
            Self::Submitted => "submitted",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("cannot {action} during step '{step}'")]
    WrongStep { action: &'static str, step: Step },
    #[error("No repository selected")]
    NoRepository,
    #[error("Select at least one file")]
    NoFilesSelected,
    #[error("Maximum {} files can be selected", MAX_SUMMARY_FILES)]
    TooManyFiles,
    #[error("Select at least one test case")]
    NoSummariesSelected,
    #[error("Maximum {} test cases can be selected", MAX_BATCH_SUMMARIES)]
    TooManySummaries,
    #[error("Unknown test case: {0}")]
    UnknownSummary(String),
    #[error("No test files were generated")]
    NothingGenerated,
    #[error("cannot go back from step '{0}'")]
    CannotGoBack(Step),
    #[error("saved wizard state is invalid: {0}")]
    InvalidState(String),
}

/// The repository the user is working in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSelection {
    pub owner: String,
    pub name: String,
    pub default_branch: String,
}

impl From<&RepositorySummary> for RepoSelection {
    fn from(r: &RepositorySummary) -> Self {
        Self {
            owner: r.owner.login.clone(),
            name: r.name.clone(),
            default_branch: r.default_branch.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wizard {
    step: Step,
    user: Option<SessionUser>,
    repository: Option<RepoSelection>,
    selected_files: Vec<String>,
    summaries: Vec<TestSummary>,
    selected_summaries: Vec<String>,
    generated: Vec<GeneratedTestCode>,
    failures: Vec<TestGenerationFailure>,
    pull_request: Option<TestPullRequest>,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn repository(&self) -> Option<&RepoSelection> {
        self.repository.as_ref()
    }

    pub fn selected_files(&self) -> &[String] {
        &self.selected_files
    }

    pub fn summaries(&self) -> &[TestSummary] {
        &self.summaries
    }

    /// Selected summaries, in selection order.
    pub fn selected_summaries(&self) -> Vec<&TestSummary> {
        self.selected_summaries
            .iter()
            .filter_map(|id| self.summaries.iter().find(|s| &s.id == id))
            .collect()
    }

    pub fn generated(&self) -> &[GeneratedTestCode] {
        &self.generated
    }

    pub fn failures(&self) -> &[TestGenerationFailure] {
        &self.failures
    }

    pub fn pull_request(&self) -> Option<&TestPullRequest> {
        self.pull_request.as_ref()
    }

    fn require_step(&self, step: Step, action: &'static str) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: self.step,
            })
        }
    }

    // ── Sign in ───────────────────────────────────────────────────────────

    pub fn sign_in(&mut self, user: SessionUser) -> Result<(), WizardError> {
        self.require_step(Step::SignIn, "sign in")?;
        self.user = Some(user);
        self.step = Step::SelectFiles;
        Ok(())
    }

    /// Forget everything, including who is signed in.
    pub fn sign_out(&mut self) {
        *self = Self::default();
    }

    // ── Select files ──────────────────────────────────────────────────────

    /// Switching repositories drops every file selection.
    pub fn select_repository(&mut self, repo: RepoSelection) -> Result<(), WizardError> {
        self.require_step(Step::SelectFiles, "select a repository")?;
        if self.repository.as_ref() != Some(&repo) {
            self.selected_files.clear();
        }
        self.repository = Some(repo);
        Ok(())
    }

    /// Adding an already-selected path is a no-op.
    pub fn add_file(&mut self, path: &str) -> Result<(), WizardError> {
        self.require_step(Step::SelectFiles, "select files")?;
        if self.repository.is_none() {
            return Err(WizardError::NoRepository);
        }
        if self.selected_files.iter().any(|p| p == path) {
            return Ok(());
        }
        if self.selected_files.len() >= MAX_SUMMARY_FILES {
            return Err(WizardError::TooManyFiles);
        }
        self.selected_files.push(path.to_string());
        Ok(())
    }

    pub fn remove_file(&mut self, path: &str) -> Result<(), WizardError> {
        self.require_step(Step::SelectFiles, "deselect files")?;
        self.selected_files.retain(|p| p != path);
        Ok(())
    }

    /// What to send to `generate-summaries`.
    pub fn summary_request(&self) -> Result<(&RepoSelection, &[String]), WizardError> {
        self.require_step(Step::SelectFiles, "request summaries")?;
        let repo = self.repository.as_ref().ok_or(WizardError::NoRepository)?;
        if self.selected_files.is_empty() {
            return Err(WizardError::NoFilesSelected);
        }
        Ok((repo, &self.selected_files))
    }

    pub fn summaries_generated(&mut self, summaries: Vec<TestSummary>) -> Result<(), WizardError> {
        self.summary_request()?;
        self.summaries = summaries;
        self.selected_summaries.clear();
        self.step = Step::ReviewSummaries;
        Ok(())
    }

    // ── Review summaries ──────────────────────────────────────────────────

    pub fn select_summary(&mut self, id: &str) -> Result<(), WizardError> {
        self.require_step(Step::ReviewSummaries, "select test cases")?;
        if !self.summaries.iter().any(|s| s.id == id) {
            return Err(WizardError::UnknownSummary(id.to_string()));
        }
        if self.selected_summaries.iter().any(|s| s == id) {
            return Ok(());
        }
        if self.selected_summaries.len() >= MAX_BATCH_SUMMARIES {
            return Err(WizardError::TooManySummaries);
        }
        self.selected_summaries.push(id.to_string());
        Ok(())
    }

    pub fn deselect_summary(&mut self, id: &str) -> Result<(), WizardError> {
        self.require_step(Step::ReviewSummaries, "deselect test cases")?;
        self.selected_summaries.retain(|s| s != id);
        Ok(())
    }

    /// What to send to `generate-multiple`.
    pub fn code_request(&self) -> Result<(&RepoSelection, Vec<TestSummary>), WizardError> {
        self.require_step(Step::ReviewSummaries, "request test code")?;
        let repo = self.repository.as_ref().ok_or(WizardError::NoRepository)?;
        let selected: Vec<TestSummary> = self.selected_summaries().into_iter().cloned().collect();
        if selected.is_empty() {
            return Err(WizardError::NoSummariesSelected);
        }
        Ok((repo, selected))
    }

    /// Record a batch result. Failures are kept for display; at least one
    /// test must have been generated to move on.
    pub fn code_generated(
        &mut self,
        generated: Vec<GeneratedTestCode>,
        failures: Vec<TestGenerationFailure>,
    ) -> Result<(), WizardError> {
        self.code_request()?;
        if generated.is_empty() {
            self.failures = failures;
            return Err(WizardError::NothingGenerated);
        }
        self.generated = generated;
        self.failures = failures;
        self.step = Step::ReviewCode;
        Ok(())
    }

    // ── Review code ───────────────────────────────────────────────────────

    /// Drop a generated file the user does not want in the pull request.
    pub fn discard_test(&mut self, file_name: &str) -> Result<(), WizardError> {
        self.require_step(Step::ReviewCode, "discard tests")?;
        self.generated.retain(|t| t.file_name != file_name);
        Ok(())
    }

    /// What to send to `create-pull-request`.
    pub fn pull_request_files(&self) -> Result<(&RepoSelection, Vec<TestFileInput>), WizardError> {
        self.require_step(Step::ReviewCode, "open a pull request")?;
        let repo = self.repository.as_ref().ok_or(WizardError::NoRepository)?;
        if self.generated.is_empty() {
            return Err(WizardError::NothingGenerated);
        }
        let files = self
            .generated
            .iter()
            .map(|t| TestFileInput {
                file_name: t.file_name.clone(),
                content: t.content.clone(),
            })
            .collect();
        Ok((repo, files))
    }

    pub fn submitted(&mut self, pull_request: TestPullRequest) -> Result<(), WizardError> {
        self.pull_request_files()?;
        self.pull_request = Some(pull_request);
        self.step = Step::Submitted;
        Ok(())
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// Return to the previous step, discarding what the current step
    /// produced. Returns the new step.
    pub fn back(&mut self) -> Result<Step, WizardError> {
        match self.step {
            Step::ReviewSummaries => {
                self.summaries.clear();
                self.selected_summaries.clear();
                self.step = Step::SelectFiles;
            }
            Step::ReviewCode => {
                self.generated.clear();
                self.failures.clear();
                self.step = Step::ReviewSummaries;
            }
            step @ (Step::SignIn | Step::SelectFiles | Step::Submitted) => {
                return Err(WizardError::CannotGoBack(step));
            }
        }
        Ok(self.step)
    }

    /// Start a new run. The signed-in user is kept.
    pub fn reset(&mut self) {
        let user = self.user.take();
        *self = Self {
            step: if user.is_some() {
                Step::SelectFiles
            } else {
                Step::SignIn
            },
            user,
            ..Self::default()
        };
    }

    // ── Persistence ───────────────────────────────────────────────────────

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Restore a saved wizard, rejecting states no sequence of transitions
    /// could have produced.
    pub fn from_json(json: &str) -> Result<Self, WizardError> {
        let wizard: Self =
            serde_json::from_str(json).map_err(|e| WizardError::InvalidState(e.to_string()))?;
        wizard.check()?;
        Ok(wizard)
    }

    fn check(&self) -> Result<(), WizardError> {
        let invalid = |msg: &str| Err(WizardError::InvalidState(msg.to_string()));
        if self.step != Step::SignIn && self.user.is_none() {
            return invalid("signed-in step without a user");
        }
        if self.selected_files.len() > MAX_SUMMARY_FILES {
            return Err(WizardError::TooManyFiles);
        }
        if self.selected_summaries.len() > MAX_BATCH_SUMMARIES {
            return Err(WizardError::TooManySummaries);
        }
        if let Some(id) = self
            .selected_summaries
            .iter()
            .find(|id| !self.summaries.iter().any(|s| &s.id == *id))
        {
            return Err(WizardError::UnknownSummary(id.clone()));
        }
        let past_files = matches!(
            self.step,
            Step::ReviewSummaries | Step::ReviewCode | Step::Submitted
        );
        if past_files && (self.repository.is_none() || self.selected_files.is_empty()) {
            return invalid("summaries without selected files");
        }
        let past_summaries = matches!(self.step, Step::ReviewCode | Step::Submitted);
        if past_summaries && self.selected_summaries.is_empty() {
            return invalid("generated code without selected summaries");
        }
        if self.step == Step::Submitted && self.pull_request.is_none() {
            return invalid("submitted without a pull request");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testgen_api::{Complexity, Priority, RawSummary, TestType};

    fn user() -> SessionUser {
        SessionUser {
            id: 1,
            username: "octocat".into(),
            email: None,
            avatar: None,
        }
    }

    fn repo(name: &str) -> RepoSelection {
        RepoSelection {
            owner: "octo".into(),
            name: name.into(),
            default_branch: "main".into(),
        }
    }

    fn summary(id: &str) -> TestSummary {
        TestSummary {
            id: id.into(),
            title: format!("test {id}"),
            description: "d".into(),
            test_type: TestType::Unit,
            file: "src/a.js".into(),
            priority: Priority::High,
            complexity: Complexity::Simple,
            framework: None,
            created_at: None,
        }
    }

    fn code(s: &TestSummary) -> GeneratedTestCode {
        GeneratedTestCode {
            file_name: format!("{}.test.js", s.id),
            content: "test()".into(),
            framework: "jest".into(),
            source_file: s.file.clone(),
            test_summary: s.clone(),
            generated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    fn pr() -> TestPullRequest {
        TestPullRequest {
            id: 1,
            number: 7,
            title: "Add tests".into(),
            html_url: "https://github.com/octo/demo/pull/7".into(),
            branch: "test-cases-1".into(),
        }
    }

    /// A wizard in ReviewSummaries with summaries s1..s3 available.
    fn at_review() -> Wizard {
        let mut w = Wizard::new();
        w.sign_in(user()).unwrap();
        w.select_repository(repo("demo")).unwrap();
        w.add_file("src/a.js").unwrap();
        w.summaries_generated(vec![summary("s1"), summary("s2"), summary("s3")])
            .unwrap();
        w
    }

    #[test]
    fn happy_path_reaches_submitted() {
        let mut w = at_review();
        w.select_summary("s2").unwrap();
        w.select_summary("s1").unwrap();

        let (r, selected) = w.code_request().unwrap();
        assert_eq!(r.name, "demo");
        let ids: Vec<_> = selected.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s2", "s1"]);

        let generated = selected.iter().map(code).collect();
        w.code_generated(generated, vec![]).unwrap();
        assert_eq!(w.step(), Step::ReviewCode);

        let (_, files) = w.pull_request_files().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name, "s2.test.js");

        w.submitted(pr()).unwrap();
        assert_eq!(w.step(), Step::Submitted);
        assert_eq!(w.pull_request().unwrap().number, 7);
    }

    #[test]
    fn steps_cannot_be_skipped() {
        let mut w = Wizard::new();
        assert_eq!(
            w.add_file("a.js"),
            Err(WizardError::WrongStep {
                action: "select files",
                step: Step::SignIn
            })
        );
        w.sign_in(user()).unwrap();
        assert!(matches!(
            w.submitted(pr()),
            Err(WizardError::WrongStep { step: Step::SelectFiles, .. })
        ));
        assert!(w.sign_in(user()).is_err());
    }

    #[test]
    fn file_selection_is_bounded_and_deduplicated() {
        let mut w = Wizard::new();
        w.sign_in(user()).unwrap();
        assert_eq!(w.add_file("a.js"), Err(WizardError::NoRepository));
        w.select_repository(repo("demo")).unwrap();
        assert_eq!(w.summary_request().unwrap_err(), WizardError::NoFilesSelected);

        for i in 0..5 {
            w.add_file(&format!("f{i}.js")).unwrap();
        }
        w.add_file("f0.js").unwrap();
        assert_eq!(w.selected_files().len(), 5);
        assert_eq!(w.add_file("f5.js"), Err(WizardError::TooManyFiles));

        w.remove_file("f0.js").unwrap();
        w.add_file("f5.js").unwrap();
        assert_eq!(w.selected_files().len(), 5);
    }

    #[test]
    fn switching_repository_clears_files() {
        let mut w = Wizard::new();
        w.sign_in(user()).unwrap();
        w.select_repository(repo("demo")).unwrap();
        w.add_file("a.js").unwrap();

        w.select_repository(repo("demo")).unwrap();
        assert_eq!(w.selected_files(), ["a.js"]);

        w.select_repository(repo("other")).unwrap();
        assert!(w.selected_files().is_empty());
    }

    #[test]
    fn summary_selection_is_bounded_and_checked() {
        let mut w = Wizard::new();
        w.sign_in(user()).unwrap();
        w.select_repository(repo("demo")).unwrap();
        w.add_file("a.js").unwrap();
        w.summaries_generated((0..12).map(|i| summary(&format!("s{i}"))).collect())
            .unwrap();

        assert_eq!(w.code_request().unwrap_err(), WizardError::NoSummariesSelected);
        assert_eq!(
            w.select_summary("nope"),
            Err(WizardError::UnknownSummary("nope".into()))
        );
        for i in 0..10 {
            w.select_summary(&format!("s{i}")).unwrap();
        }
        assert_eq!(w.select_summary("s10"), Err(WizardError::TooManySummaries));
        w.deselect_summary("s0").unwrap();
        w.select_summary("s10").unwrap();
        assert_eq!(w.selected_summaries().len(), 10);
    }

    #[test]
    fn all_failed_batch_stays_on_review() {
        let mut w = at_review();
        w.select_summary("s1").unwrap();
        let failure = TestGenerationFailure {
            summary: RawSummary::from(summary("s1")),
            error: "primary API request failed with status 500".into(),
            success: false,
        };
        assert_eq!(
            w.code_generated(vec![], vec![failure]),
            Err(WizardError::NothingGenerated)
        );
        assert_eq!(w.step(), Step::ReviewSummaries);
        assert_eq!(w.failures().len(), 1);
    }

    #[test]
    fn discarding_every_test_blocks_submission() {
        let mut w = at_review();
        w.select_summary("s1").unwrap();
        w.code_generated(vec![code(&summary("s1"))], vec![]).unwrap();
        w.discard_test("s1.test.js").unwrap();
        assert_eq!(w.submitted(pr()), Err(WizardError::NothingGenerated));
    }

    #[test]
    fn back_discards_the_current_step() {
        let mut w = at_review();
        w.select_summary("s1").unwrap();
        w.code_generated(vec![code(&summary("s1"))], vec![]).unwrap();

        assert_eq!(w.back(), Ok(Step::ReviewSummaries));
        assert!(w.generated().is_empty());
        assert_eq!(w.selected_summaries().len(), 1);

        assert_eq!(w.back(), Ok(Step::SelectFiles));
        assert!(w.summaries().is_empty());
        assert_eq!(w.selected_files(), ["src/a.js"]);

        assert_eq!(w.back(), Err(WizardError::CannotGoBack(Step::SelectFiles)));
    }

    #[test]
    fn reset_keeps_the_user() {
        let mut w = at_review();
        w.reset();
        assert_eq!(w.step(), Step::SelectFiles);
        assert_eq!(w.user().unwrap().username, "octocat");
        assert!(w.repository().is_none());
        assert!(w.summaries().is_empty());

        w.sign_out();
        assert_eq!(w, Wizard::new());
        w.reset();
        assert_eq!(w.step(), Step::SignIn);
    }

    #[test]
    fn persisted_state_restores() {
        let mut w = at_review();
        w.select_summary("s3").unwrap();
        let json = w.to_json();
        assert!(json.contains("\"step\":\"review_summaries\""));

        let restored = Wizard::from_json(&json).unwrap();
        assert_eq!(restored, w);
        assert_eq!(restored.selected_summaries()[0].id, "s3");
    }

    #[test]
    fn impossible_saved_states_are_rejected() {
        assert!(matches!(
            Wizard::from_json(r#"{"step":"review_code"}"#),
            Err(WizardError::InvalidState(_))
        ));
        assert!(matches!(
            Wizard::from_json("not json"),
            Err(WizardError::InvalidState(_))
        ));

        let mut w = at_review();
        w.select_summary("s1").unwrap();
        let tampered = w
            .to_json()
            .replace(r#""selectedSummaries":["s1"]"#, r#""selectedSummaries":["zz"]"#);
        assert_eq!(
            Wizard::from_json(&tampered),
            Err(WizardError::UnknownSummary("zz".into()))
        );

        assert_eq!(Wizard::from_json("{}").unwrap(), Wizard::new());
    }
}
