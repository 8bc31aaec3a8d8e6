use axum::{Json, extract::State};

use testgen_api::service::{
    require_access_token, require_repo, validate_batch_size, validate_summary_files,
    validate_test_files,
};
use testgen_api::{
    BatchCounts, CreateTestPrRequest, CreateTestPrResponse, FrameworksResponse,
    GenerateCodeRequest, GenerateCodeResponse, GenerateMultipleRequest, GenerateMultipleResponse,
    GenerateSummariesRequest, GenerateSummariesResponse,
};
use testgen_github::{GitHubClient, RepoRef};
use testgen_service::{PrText, TestCaseService};

use crate::auth::AuthUser;
use crate::error::{ApiErr, ApiJson};

type Service = TestCaseService<GitHubClient>;

/// POST /api/test-cases/generate-summaries
pub async fn generate_summaries(
    _user: AuthUser,
    State(service): State<Service>,
    ApiJson(req): ApiJson<GenerateSummariesRequest>,
) -> Result<Json<GenerateSummariesResponse>, ApiErr> {
    let token = require_access_token(req.access_token.as_deref())?;
    let (owner, repo) = require_repo(req.owner.as_deref(), req.repo.as_deref())?;
    let paths = validate_summary_files(req.files.as_deref())?;

    let batch = service
        .generate_summaries(token, &RepoRef::new(owner, repo), &paths)
        .await?;
    Ok(Json(GenerateSummariesResponse {
        success: true,
        message: "Test case summaries generated successfully".into(),
        summaries: batch.summaries,
        metadata: batch.metadata,
    }))
}

/// POST /api/test-cases/generate-code
pub async fn generate_code(
    _user: AuthUser,
    State(service): State<Service>,
    ApiJson(req): ApiJson<GenerateCodeRequest>,
) -> Result<Json<GenerateCodeResponse>, ApiErr> {
    let token = require_access_token(req.access_token.as_deref())?;
    let (owner, repo) = require_repo(req.owner.as_deref(), req.repo.as_deref())?;
    let summary = req
        .test_summary
        .as_ref()
        .ok_or_else(|| ApiErr::bad_request("Test summary is required"))?;

    let test_code = service
        .generate_test_code(
            token,
            &RepoRef::new(owner, repo),
            summary,
            req.framework.as_deref(),
        )
        .await?;
    Ok(Json(GenerateCodeResponse {
        success: true,
        message: "Test code generated successfully".into(),
        test_code,
    }))
}

/// POST /api/test-cases/generate-multiple
pub async fn generate_multiple(
    _user: AuthUser,
    State(service): State<Service>,
    ApiJson(req): ApiJson<GenerateMultipleRequest>,
) -> Result<Json<GenerateMultipleResponse>, ApiErr> {
    let token = require_access_token(req.access_token.as_deref())?;
    let (owner, repo) = require_repo(req.owner.as_deref(), req.repo.as_deref())?;
    let summaries = req.test_summaries.as_deref().unwrap_or_default();
    validate_batch_size(summaries.len())?;

    let out = service
        .generate_multiple_tests(
            token,
            &RepoRef::new(owner, repo),
            summaries,
            req.framework.as_deref(),
        )
        .await?;
    let summary = BatchCounts {
        total: summaries.len(),
        successful: out.results.len(),
        failed: out.errors.len(),
    };
    Ok(Json(GenerateMultipleResponse {
        success: true,
        message: format!(
            "Generated {} of {} test files",
            summary.successful, summary.total
        ),
        results: out.results,
        errors: out.errors,
        summary,
    }))
}

/// POST /api/test-cases/create-pull-request
pub async fn create_pull_request(
    _user: AuthUser,
    State(service): State<Service>,
    ApiJson(req): ApiJson<CreateTestPrRequest>,
) -> Result<Json<CreateTestPrResponse>, ApiErr> {
    let token = require_access_token(req.access_token.as_deref())?;
    let (owner, repo) = require_repo(req.owner.as_deref(), req.repo.as_deref())?;
    let files = validate_test_files(req.test_files.as_deref())?;

    let outcome = service
        .create_test_pull_request(
            token,
            &RepoRef::new(owner, repo),
            files,
            PrText {
                title: req.title.as_deref(),
                description: req.description.as_deref(),
            },
        )
        .await?;
    Ok(Json(CreateTestPrResponse {
        success: true,
        message: "Pull request created successfully with test files".into(),
        pull_request: outcome.pull_request,
        files: outcome.files,
        summary: outcome.summary,
    }))
}

/// GET /api/test-cases/supported-frameworks
pub async fn supported_frameworks(_user: AuthUser) -> Json<FrameworksResponse> {
    Json(FrameworksResponse::from_tables())
}
