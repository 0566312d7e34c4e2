//! Baseline lookup: match service names against a repository directory.

use tracing::{error, info, warn};

use crate::clients::RepositoryContents;
use crate::clients::repo_client::blob_url;
use crate::core::config::{BaselineMode, RepoLocation};
use crate::core::models::{BaselineOutcome, BaselineResult, RepoEntry};
use crate::errors::PipelineError;
use crate::utils::matching::{find_matching_file, normalize_candidate, parse_service_list};

/// Resolves one candidate. `Ok(None)` means nothing matched.
///
/// # Errors
///
/// Returns the repository error of the listing or content fetch.
pub async fn lookup_baseline<C>(
    repo: &C,
    location: &RepoLocation,
    mode: BaselineMode,
    service: &str,
) -> Result<Option<BaselineOutcome>, PipelineError>
where
    C: RepositoryContents + ?Sized,
{
    let normalized = normalize_candidate(service);
    let entries = repo.list_directory(location).await?;
    let files: Vec<&RepoEntry> = entries.iter().filter(|e| e.is_file()).collect();

    let names = files.iter().copied().map(|e| e.name.as_str());
    let Some(name) = find_matching_file(&normalized, names) else {
        return Ok(None);
    };
    // Names are unique within one listing
    let Some(entry) = files.into_iter().find(|e| e.name == name) else {
        return Ok(None);
    };

    let body = match mode {
        BaselineMode::Link => blob_url(location, &entry.path),
        BaselineMode::Content => repo.get_raw_content(location, &entry.path).await?,
    };

    Ok(Some(BaselineOutcome::Found {
        file_name: entry.name.clone(),
        body,
    }))
}

/// Looks up every name in order. Misses and errors are recorded per name and
/// never stop the remaining lookups.
pub async fn resolve_baselines<C, S>(
    repo: &C,
    location: &RepoLocation,
    mode: BaselineMode,
    services: &[S],
) -> BaselineResult
where
    C: RepositoryContents + ?Sized,
    S: AsRef<str>,
{
    let mut result = BaselineResult::default();

    for service in services {
        let service = service.as_ref();
        let outcome = match lookup_baseline(repo, location, mode, service).await {
            Ok(Some(found)) => {
                info!("Baseline found for {}", service);
                found
            }
            Ok(None) => {
                warn!("No baseline found for {}", service);
                BaselineOutcome::NotFound
            }
            Err(e) => {
                error!("Error looking up baseline for {}: {}", service, e);
                BaselineOutcome::Failed(e.to_string())
            }
        };
        result.entries.push((service.to_string(), outcome));
    }

    result
}

/// Splits a comma-separated service list and resolves it, followed by
/// `extra_lookups`.
pub async fn resolve_service_list<C>(
    repo: &C,
    location: &RepoLocation,
    mode: BaselineMode,
    service_list: &str,
    extra_lookups: &[String],
) -> BaselineResult
where
    C: RepositoryContents + ?Sized,
{
    let mut candidates = parse_service_list(service_list);
    candidates.extend(extra_lookups.iter().cloned());
    resolve_baselines(repo, location, mode, &candidates).await
}
