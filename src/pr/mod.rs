pub mod types;

pub use types::{FileChange, FileStatus, PrId, PrUrl, PullRequestPayload};

use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read payload file: {0}")]
    PayloadRead(#[from] std::io::Error),

    #[error("Failed to parse payload: {0}")]
    PayloadParse(#[from] serde_json::Error),

    #[error("GitHub token not found in environment")]
    MissingToken,
}

/// Parse a GitHub PR URL into its component parts.
/// Expected format: https://github.com/{owner}/{repo}/pull/{number}
pub fn parse_pr_url(url: &str) -> Result<PrUrl, PrError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| PrError::InvalidUrl(url.to_string()))?;

    if parsed.host_str() != Some("github.com") {
        return Err(PrError::InvalidUrl(url.to_string()));
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(|| PrError::InvalidUrl(url.to_string()))?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() != 4 || segments[2] != "pull" {
        return Err(PrError::InvalidUrl(url.to_string()));
    }

    let pr_number = segments[3]
        .parse::<u64>()
        .map_err(|_| PrError::InvalidUrl(url.to_string()))?;

    Ok(PrUrl {
        owner: segments[0].to_string(),
        repo: segments[1].to_string(),
        pr_number,
    })
}

/// Parse a `PullRequestPayload` from its JSON form.
pub fn parse_payload(json: &str) -> Result<PullRequestPayload, PrError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a `PullRequestPayload` from a JSON file on disk.
pub fn load_payload(path: &Path) -> Result<PullRequestPayload, PrError> {
    let contents = std::fs::read_to_string(path)?;
    parse_payload(&contents)
}

/// Pass the payload's changed files through to the analyzers.
pub fn extract_code(payload: &PullRequestPayload) -> &[FileChange] {
    tracing::info!(pr = %payload.id, files = payload.changes.len(), "extracting code from PR");
    &payload.changes
}

#[derive(serde::Deserialize)]
struct User {
    login: String,
}

#[derive(serde::Deserialize)]
struct GitRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(serde::Deserialize)]
struct PullResponse {
    number: u64,
    title: String,
    body: Option<String>,
    user: User,
    head: GitRef,
    base: GitRef,
}

#[derive(serde::Deserialize)]
struct PullFile {
    filename: String,
    status: String,
    patch: Option<String>,
    contents_url: String,
}

/// Page size requested from the GitHub `files` endpoint (its maximum).
const FILES_PER_PAGE: usize = 100;
/// GitHub stops listing a pull request's files after 3000 entries.
const MAX_FILE_PAGES: usize = 30;

/// A short page is the last one.
fn is_last_page(page_len: usize) -> bool {
    page_len < FILES_PER_PAGE
}

fn into_file_change(file: PullFile, content: String) -> FileChange {
    FileChange {
        status: FileStatus::from_github(&file.status),
        filename: file.filename,
        content: Some(content),
        patch: file.patch,
    }
}

fn into_payload(metadata: PullResponse, pr_url: &PrUrl, changes: Vec<FileChange>) -> PullRequestPayload {
    PullRequestPayload {
        id: PrId::Number(metadata.number),
        title: metadata.title,
        description: metadata.body,
        branch: metadata.head.name,
        base: metadata.base.name,
        repository: format!("{}/{}", pr_url.owner, pr_url.repo),
        author: metadata.user.login,
        changes,
    }
}

/// Fetch a complete PullRequestPayload (metadata, changed files and their
/// head-ref contents) from the GitHub API.
///
/// A file whose contents cannot be fetched is analyzed as empty.
#[instrument(skip(config), fields(owner = %pr_url.owner, repo = %pr_url.repo, pr = pr_url.pr_number))]
pub async fn fetch_pull_request(
    pr_url: &PrUrl,
    config: &crate::config::Config,
) -> Result<PullRequestPayload, PrError> {
    let token = config.github_token().ok_or(PrError::MissingToken)?;
    let client = reqwest::Client::new();
    let base_url = format!(
        "https://api.github.com/repos/{}/{}/pulls/{}",
        pr_url.owner, pr_url.repo, pr_url.pr_number
    );

    debug!("fetching PR metadata from GitHub API");
    let metadata = client
        .get(&base_url)
        .header("User-Agent", "pr-review")
        .bearer_auth(&token)
        .send()
        .await?
        .error_for_status()?
        .json::<PullResponse>()
        .await?;
    debug!(title = %metadata.title, "received PR metadata");

    let files = fetch_file_list(&client, &base_url, &token).await?;

    let mut changes = Vec::with_capacity(files.len());
    for file in files {
        let content = if FileStatus::from_github(&file.status) == FileStatus::Removed {
            String::new()
        } else {
            match fetch_file_content(&client, &file.contents_url, &token).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %file.filename, error = %e, "could not fetch file content, analyzing as empty");
                    String::new()
                }
            }
        };
        changes.push(into_file_change(file, content));
    }

    Ok(into_payload(metadata, pr_url, changes))
}

/// Every changed file, following `page=1,2,...` until a short page.
async fn fetch_file_list(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> Result<Vec<PullFile>, PrError> {
    let per_page = FILES_PER_PAGE.to_string();
    let mut files = Vec::new();
    for page in 1..=MAX_FILE_PAGES {
        debug!(page, "fetching PR file list page from GitHub API");
        let page_param = page.to_string();
        let batch = client
            .get(format!("{}/files", base_url))
            .query(&[("per_page", per_page.as_str()), ("page", page_param.as_str())])
            .header("User-Agent", "pr-review")
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<PullFile>>()
            .await?;
        let last = is_last_page(batch.len());
        files.extend(batch);
        if last {
            debug!(files = files.len(), "received PR file list");
            return Ok(files);
        }
    }
    warn!(
        files = files.len(),
        "GitHub file listing limit reached, remaining files are not analyzed"
    );
    Ok(files)
}

async fn fetch_file_content(
    client: &reqwest::Client,
    contents_url: &str,
    token: &str,
) -> Result<String, PrError> {
    debug!(url = %contents_url, "fetching file content");
    let text = client
        .get(contents_url)
        .header("User-Agent", "pr-review")
        .header("Accept", "application/vnd.github.raw")
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}
