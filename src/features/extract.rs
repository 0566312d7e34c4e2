//! Text extraction: submit an image, poll the recognition job, collect lines.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info};

use crate::clients::TextRecognizer;
use crate::core::config::PollConfig;
use crate::core::models::{ExtractedDocument, OperationId, OperationStatus};
use crate::errors::PipelineError;

enum PollError {
    Pending(OperationStatus),
    Fatal(PipelineError),
}

/// Reads `image_path` and runs it through the recognizer.
///
/// # Errors
///
/// Fails if the file cannot be read or recognition fails (see [`recognize`]).
pub async fn extract_text<R>(
    recognizer: &R,
    image_path: &Path,
    poll: &PollConfig,
) -> Result<ExtractedDocument, PipelineError>
where
    R: TextRecognizer + ?Sized,
{
    let image = tokio::fs::read(image_path).await.map_err(|e| {
        PipelineError::IoError(format!("{}: {e}", image_path.display()))
    })?;

    let file_name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| image_path.display().to_string());
    info!("Extracting text from local image {}", file_name);

    recognize(recognizer, image, poll).await
}

/// Submits image bytes and waits for the job to finish.
///
/// # Errors
///
/// Returns `OcrFailed` if the job fails, `PollExhausted`/`PollTimeout` when
/// the configured caps are hit, or the transport error of any remote call.
pub async fn recognize<R>(
    recognizer: &R,
    image: Vec<u8>,
    poll: &PollConfig,
) -> Result<ExtractedDocument, PipelineError>
where
    R: TextRecognizer + ?Sized,
{
    let id = recognizer.submit(image).await?;
    let document = wait_for_completion(recognizer, &id, poll).await?;
    info!(
        "Job {} finished with {} recognized lines",
        id,
        document.lines.len()
    );
    Ok(document)
}

/// Polls job `id` every `poll.interval` until it succeeds or fails.
///
/// A job that is still pending after N queries is queried exactly N+1 times
/// if it then succeeds.
///
/// # Errors
///
/// See [`recognize`].
pub async fn wait_for_completion<R>(
    recognizer: &R,
    id: &OperationId,
    poll: &PollConfig,
) -> Result<ExtractedDocument, PipelineError>
where
    R: TextRecognizer + ?Sized,
{
    let queries = AtomicUsize::new(0);
    let retries = poll
        .max_attempts
        .map_or(usize::MAX, |max| max.saturating_sub(1));
    let strategy = FixedInterval::new(poll.interval).take(retries);

    let action = {
        let queries = &queries;
        move || async move {
            let attempt = queries.fetch_add(1, Ordering::SeqCst) + 1;
            let operation = recognizer.poll(id).await.map_err(PollError::Fatal)?;
            debug!("Job {} poll #{}: {:?}", id, attempt, operation.status);

            match operation.status {
                OperationStatus::NotStarted | OperationStatus::Running => {
                    Err(PollError::Pending(operation.status))
                }
                OperationStatus::Failed => Err(PollError::Fatal(PipelineError::OcrFailed(
                    format!("job {id} reported status failed"),
                ))),
                OperationStatus::Succeeded => Ok(operation
                    .analyze_result
                    .as_ref()
                    .map(ExtractedDocument::from_analyze_result)
                    .unwrap_or_default()),
            }
        }
    };

    let polling = RetryIf::start(strategy, action, |e: &PollError| {
        matches!(e, PollError::Pending(_))
    });

    let outcome = match poll.timeout {
        Some(limit) => tokio::time::timeout(limit, polling)
            .await
            .map_err(|_| PipelineError::PollTimeout(limit))?,
        None => polling.await,
    };

    outcome.map_err(|e| match e {
        PollError::Fatal(err) => err,
        PollError::Pending(status) => {
            let attempts = queries.load(Ordering::SeqCst);
            debug!("Job {} still {:?} after {} queries", id, status, attempts);
            PipelineError::PollExhausted(attempts)
        }
    })
}
