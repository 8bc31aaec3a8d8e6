//! Request validation shared by route handlers. Pure functions, no I/O.
//!
//! Route handlers call these before touching GitHub or an AI provider, so
//! every rejected request fails without any outbound traffic.

use crate::{Pagination, RepoListQuery, ServiceError, SummaryFileRef, TestFileInput};

// ─── Limits ─────────────────────────────────────────────────────────────────

/// Files accepted by one summary-generation request.
pub const MAX_SUMMARY_FILES: usize = 5;
/// Summaries accepted by one batch code-generation request.
pub const MAX_BATCH_SUMMARIES: usize = 10;
/// Paths accepted by one multi-file fetch.
pub const MAX_FETCH_FILES: usize = 10;

pub const DEFAULT_PER_PAGE: u32 = 30;
pub const MAX_PER_PAGE: u32 = 100;

// ─── Field presence ─────────────────────────────────────────────────────────

/// A trimmed value, or `None` when absent or blank.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// The GitHub access token a request carries.
pub fn require_access_token(token: Option<&str>) -> Result<&str, ServiceError> {
    present(token).ok_or_else(|| ServiceError::BadRequest("GitHub access token is required".into()))
}

/// Repository coordinates from a request body.
pub fn require_repo<'a>(
    owner: Option<&'a str>,
    repo: Option<&'a str>,
) -> Result<(&'a str, &'a str), ServiceError> {
    match (present(owner), present(repo)) {
        (Some(o), Some(r)) => Ok((o, r)),
        _ => Err(ServiceError::BadRequest(
            "Repository owner and name are required".into(),
        )),
    }
}

// ─── Collections ────────────────────────────────────────────────────────────

pub fn validate_summary_files(
    files: Option<&[SummaryFileRef]>,
) -> Result<Vec<String>, ServiceError> {
    let files = files.filter(|f| !f.is_empty()).ok_or_else(|| {
        ServiceError::BadRequest("Files array is required and cannot be empty".into())
    })?;
    if files.len() > MAX_SUMMARY_FILES {
        return Err(ServiceError::BadRequest(format!(
            "Maximum {MAX_SUMMARY_FILES} files can be processed at once"
        )));
    }
    Ok(files.iter().map(|f| f.path.clone()).collect())
}

pub fn validate_batch_size(len: usize) -> Result<(), ServiceError> {
    if len == 0 {
        return Err(ServiceError::BadRequest(
            "Test summaries array is required and cannot be empty".into(),
        ));
    }
    if len > MAX_BATCH_SUMMARIES {
        return Err(ServiceError::BadRequest(format!(
            "Maximum {MAX_BATCH_SUMMARIES} test cases can be generated at once"
        )));
    }
    Ok(())
}

pub fn validate_fetch_paths(paths: Option<&[String]>) -> Result<&[String], ServiceError> {
    let paths = paths
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ServiceError::BadRequest("File paths array is required".into()))?;
    if paths.len() > MAX_FETCH_FILES {
        return Err(ServiceError::BadRequest(format!(
            "Maximum {MAX_FETCH_FILES} files can be fetched at once"
        )));
    }
    Ok(paths)
}

pub fn validate_test_files(files: Option<&[TestFileInput]>) -> Result<&[TestFileInput], ServiceError> {
    files.filter(|f| !f.is_empty()).ok_or_else(|| {
        ServiceError::BadRequest("Test files array is required and cannot be empty".into())
    })
}

pub fn validate_branch_name(name: Option<&str>) -> Result<&str, ServiceError> {
    let name =
        present(name).ok_or_else(|| ServiceError::BadRequest("Branch name is required".into()))?;
    if !testgen_core::naming::is_valid_branch_name(name) {
        return Err(ServiceError::BadRequest("Invalid branch name format".into()));
    }
    Ok(name)
}

// ─── Pagination ─────────────────────────────────────────────────────────────

/// Normalized repository-listing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoListParams {
    pub page: u32,
    pub per_page: u32,
    pub exclude_forks: bool,
}

impl RepoListParams {
    /// Unparseable or zero values fall back to defaults; `per_page` is
    /// clamped to GitHub's maximum.
    pub fn from_query(q: &RepoListQuery) -> Self {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<u32>().ok());
        Self {
            page: parse(&q.page).filter(|p| *p > 0).unwrap_or(1),
            per_page: parse(&q.per_page)
                .filter(|p| *p > 0)
                .unwrap_or(DEFAULT_PER_PAGE)
                .min(MAX_PER_PAGE),
            exclude_forks: q.exclude_forks.as_deref() == Some("true"),
        }
    }

    /// Pagination block for a page of `returned` items. A full page implies
    /// there may be more.
    pub fn pagination(&self, returned: usize, total_header: Option<u64>) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
            total: total_header.unwrap_or(returned as u64),
            has_next_page: returned == self.per_page as usize,
        }
    }
}
