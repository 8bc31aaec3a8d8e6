use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, warn};

use testgen_ai::AiGateway;
use testgen_api::service::{MAX_BATCH_SUMMARIES, MAX_SUMMARY_FILES, present};
use testgen_api::{
    FileFetchError, GeneratedTestCode, SummaryMetadata, TestFileInput, TestGenerationFailure,
    TestGenerationSuccess, TestPrCounts, TestPrFiles, TestPullRequest,
};
use testgen_core::framework::detect_framework;
use testgen_core::naming::{TEST_BRANCH_PREFIX, generate_branch_name, sanitize_filename};
use testgen_core::pr::{
    CreatedFile, DEFAULT_PR_DESCRIPTION, DEFAULT_PR_TITLE, FileWriteError, build_pr_body,
    commit_message, test_file_path,
};
use testgen_core::{RawSummary, SummaryCheck, TestSummary, validate_summary};
use testgen_github::{FileWrite, NewPullRequest, RepoHost, RepoRef};

use crate::error::OrchestrationError;

/// Summaries for a set of files plus what happened to each input.
#[derive(Debug, Clone)]
pub struct SummaryBatch {
    pub summaries: Vec<TestSummary>,
    pub metadata: SummaryMetadata,
}

/// Per-summary outcomes of a batch code generation.
#[derive(Debug, Clone, Default)]
pub struct MultipleTests {
    pub results: Vec<TestGenerationSuccess>,
    pub errors: Vec<TestGenerationFailure>,
}

/// A pull request carrying generated test files.
#[derive(Debug, Clone)]
pub struct TestPullRequestOutcome {
    pub pull_request: TestPullRequest,
    pub files: TestPrFiles,
    pub summary: TestPrCounts,
}

/// Pull-request metadata supplied by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrText<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
}

/// Drives one user request across the repository host and the AI gateway.
///
/// Holds no per-request state; everything flows in through arguments.
#[derive(Clone)]
pub struct TestCaseService<H: RepoHost> {
    host: H,
    ai: AiGateway,
}

impl<H: RepoHost> TestCaseService<H> {
    pub fn new(host: H, ai: AiGateway) -> Self {
        Self { host, ai }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn ai(&self) -> &AiGateway {
        &self.ai
    }

    fn require_ai(&self) -> Result<(), OrchestrationError> {
        if self.ai.is_configured() {
            Ok(())
        } else {
            Err(testgen_ai::AiError::NoProviderConfigured.into())
        }
    }

    /// Fetch `paths` and ask the AI for test-case summaries.
    ///
    /// Files that fail to fetch are reported in the metadata; the request
    /// fails only when none could be fetched. Invalid AI candidates, and
    /// candidates naming a file that was not fetched, are dropped.
    pub async fn generate_summaries(
        &self,
        token: &str,
        repo: &RepoRef,
        paths: &[String],
    ) -> Result<SummaryBatch, OrchestrationError> {
        if paths.is_empty() {
            return Err(OrchestrationError::Invalid(
                "Files array is required and cannot be empty".into(),
            ));
        }
        if paths.len() > MAX_SUMMARY_FILES {
            return Err(OrchestrationError::Invalid(format!(
                "Maximum {MAX_SUMMARY_FILES} files can be processed at once"
            )));
        }
        self.require_ai()?;

        let mut files = Vec::with_capacity(paths.len());
        let mut errors = Vec::new();
        for fetch in self.host.get_files(token, repo, paths).await {
            match fetch.result {
                Ok(file) => files.push(file),
                Err(e) => errors.push(FileFetchError {
                    path: fetch.path,
                    error: e.to_string(),
                }),
            }
        }
        if files.is_empty() {
            return Err(OrchestrationError::NoFilesFetched { errors });
        }

        let fetched: HashSet<&str> = files.iter().map(|f| f.path.as_str()).collect();
        let created_at = Utc::now().to_rfc3339();
        let mut summaries = Vec::new();
        for check in self.ai.summarize(&files).await? {
            match check {
                SummaryCheck::Valid(summary)
                    if !fetched.contains(summary.file.trim_start_matches('/')) =>
                {
                    warn!(
                        id = %summary.id,
                        file = %summary.file,
                        "dropping AI summary for a file that was not fetched"
                    );
                }
                SummaryCheck::Valid(mut summary) => {
                    if summary.framework.is_none() {
                        summary.framework = Some(detect_framework(&summary.file).to_string());
                    }
                    summary.created_at = Some(created_at.clone());
                    summaries.push(summary);
                }
                SummaryCheck::Invalid { candidate, reason } => {
                    warn!(id = ?candidate.id, %reason, "dropping invalid AI summary");
                }
            }
        }
        info!(
            %repo,
            files = files.len(),
            failed = errors.len(),
            summaries = summaries.len(),
            "generated test summaries"
        );

        Ok(SummaryBatch {
            metadata: SummaryMetadata {
                total_files: paths.len(),
                processed_files: files.len(),
                failed_files: errors.len(),
                generated_summaries: summaries.len(),
                errors,
            },
            summaries,
        })
    }

    /// Generate a test file for one client-supplied summary.
    ///
    /// The source file is re-fetched so the code targets its current
    /// content. `framework` overrides the summary's own or the detected one.
    pub async fn generate_test_code(
        &self,
        token: &str,
        repo: &RepoRef,
        raw: &RawSummary,
        framework: Option<&str>,
    ) -> Result<GeneratedTestCode, OrchestrationError> {
        let summary =
            validate_summary(raw).map_err(|e| OrchestrationError::Invalid(e.to_string()))?;
        self.require_ai()?;

        let source = self.host.get_file(token, repo, &summary.file).await?;
        let framework = framework
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .or_else(|| summary.framework.clone())
            .unwrap_or_else(|| detect_framework(&summary.file).to_string());

        let code = self
            .ai
            .generate_code(&summary, &source.content, &framework)
            .await?;
        Ok(GeneratedTestCode {
            file_name: code.file_name,
            content: code.content,
            framework: code.framework,
            source_file: summary.file.clone(),
            test_summary: summary,
            generated_at: Utc::now().to_rfc3339(),
        })
    }

    /// Generate code for each summary in turn. One failure never aborts the
    /// batch; it is recorded next to its summary.
    pub async fn generate_multiple_tests(
        &self,
        token: &str,
        repo: &RepoRef,
        summaries: &[RawSummary],
        framework: Option<&str>,
    ) -> Result<MultipleTests, OrchestrationError> {
        if summaries.is_empty() {
            return Err(OrchestrationError::Invalid(
                "Test summaries array is required and cannot be empty".into(),
            ));
        }
        if summaries.len() > MAX_BATCH_SUMMARIES {
            return Err(OrchestrationError::Invalid(format!(
                "Maximum {MAX_BATCH_SUMMARIES} test cases can be generated at once"
            )));
        }
        self.require_ai()?;

        let mut out = MultipleTests::default();
        for raw in summaries {
            match self.generate_test_code(token, repo, raw, framework).await {
                Ok(test_code) => out.results.push(TestGenerationSuccess {
                    summary: test_code.test_summary.clone(),
                    test_code,
                    success: true,
                }),
                Err(e) => {
                    warn!(id = ?raw.id, error = %e, "test generation failed");
                    out.errors.push(TestGenerationFailure {
                        summary: raw.clone(),
                        error: e.to_string(),
                        success: false,
                    });
                }
            }
        }
        Ok(out)
    }

    /// Commit `files` under `tests/` on a fresh branch and open a pull
    /// request for it.
    ///
    /// Individual write failures are listed in the PR body. If no file was
    /// written, no pull request is opened.
    pub async fn create_test_pull_request(
        &self,
        token: &str,
        repo: &RepoRef,
        files: &[TestFileInput],
        text: PrText<'_>,
    ) -> Result<TestPullRequestOutcome, OrchestrationError> {
        if files.is_empty() {
            return Err(OrchestrationError::Invalid(
                "Test files array is required and cannot be empty".into(),
            ));
        }

        let branch = generate_branch_name(TEST_BRANCH_PREFIX, Utc::now());
        self.host.create_branch(token, repo, &branch, None).await?;

        let mut created = Vec::new();
        let mut errors = Vec::new();
        for file in files {
            let name = sanitize_filename(&file.file_name);
            let path = test_file_path(&name);
            let message = commit_message(&name);
            let write = FileWrite {
                path: &path,
                content: &file.content,
                message: &message,
                branch: &branch,
            };
            match self.host.create_file(token, repo, write).await {
                Ok(commit) => created.push(CreatedFile {
                    file_name: name,
                    path,
                    sha: commit.file.sha,
                    html_url: commit.file.html_url,
                }),
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "could not write test file");
                    errors.push(FileWriteError {
                        file_name: file.file_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        if created.is_empty() {
            return Err(OrchestrationError::NoFilesCreated { errors });
        }

        let title = present(text.title).unwrap_or(DEFAULT_PR_TITLE);
        let description = present(text.description).unwrap_or(DEFAULT_PR_DESCRIPTION);
        let body = build_pr_body(description, files.len(), &created, &errors);
        let pr = self
            .host
            .create_pull_request(
                token,
                repo,
                NewPullRequest {
                    title,
                    body: &body,
                    head: &branch,
                    base: None,
                },
            )
            .await?;
        info!(%repo, number = pr.number, %branch, created = created.len(), "opened test pull request");

        Ok(TestPullRequestOutcome {
            pull_request: TestPullRequest {
                id: pr.id,
                number: pr.number,
                title: pr.title,
                html_url: pr.html_url,
                branch,
            },
            summary: TestPrCounts {
                total_files: files.len(),
                created_files: created.len(),
                failed_files: errors.len(),
            },
            files: TestPrFiles { created, errors },
        })
    }
}
