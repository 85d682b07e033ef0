//! Moderation analysis orchestration.
//!
//! Walks a batch of queue entries through AI analysis and applies the
//! auto-resolution policy. One bad entry never aborts the batch;
//! failures are recorded on the entry and the walk continues.

use std::sync::Arc;
use uuid::Uuid;

use sqlx::PgPool;
use tracing::{info, warn};

use domain::models::{AnalysisBatchResponse, ModerationAnalysis};
use domain::services::audit::ModerationActionBuilder;
use domain::services::auto_resolution::{self, AutoOutcome};
use persistence::repositories::{ModerationQueueRepository, ModerationResolution, PhotoRepository};

use crate::error::ApiError;
use crate::services::moderation_ai::PhotoAnalyzer;

/// Analyze up to `batch_size` pending entries for an event.
///
/// `retry` selects the moderator identity recorded on auto-resolved
/// actions, so the audit log distinguishes the normal pass from the
/// admin retry batch.
pub async fn run_analysis_batch(
    pool: &PgPool,
    analyzer: Option<&Arc<dyn PhotoAnalyzer>>,
    event_id: Uuid,
    batch_size: i64,
    retry: bool,
) -> Result<AnalysisBatchResponse, ApiError> {
    let queue_repo = ModerationQueueRepository::new(pool.clone());
    let photo_repo = PhotoRepository::new(pool.clone());

    let entries = queue_repo.find_needing_analysis(event_id, batch_size).await?;

    let mut analyzed = 0;
    let mut auto_resolved = 0;
    let mut failed = 0;

    for entry in entries {
        let analysis = analyze_entry(&photo_repo, analyzer, entry.photo_id).await?;
        analyzed += 1;

        match auto_resolution::decide(&analysis) {
            AutoOutcome::Resolve { decision, reason } => {
                let mut builder = ModerationActionBuilder::new(entry.photo_id, decision);
                builder = if retry {
                    builder.by_retry()
                } else {
                    builder.by_auto()
                };
                let resolution = ModerationResolution {
                    photo_id: entry.photo_id,
                    new_status: decision.photo_status().as_str().to_string(),
                    suggestion: analysis.suggestion.map(|s| s.as_str().to_string()),
                    confidence: Some(analysis.confidence),
                    action: builder.reason(reason).build(),
                };
                if photo_repo.resolve_moderation(&resolution).await?.is_some() {
                    auto_resolved += 1;
                    info!(
                        photo_id = %entry.photo_id,
                        decision = decision.as_str(),
                        confidence = analysis.confidence,
                        "Photo auto-resolved"
                    );
                }
            }
            AutoOutcome::Pending => {
                if analysis.is_failure() {
                    failed += 1;
                    warn!(
                        photo_id = %entry.photo_id,
                        error = analysis.error_message.as_deref().unwrap_or(""),
                        "Analysis failed, photo left for manual review"
                    );
                }
                queue_repo
                    .record_analysis(
                        entry.id,
                        analysis.suggestion.map(|s| s.as_str()),
                        analysis.suggestion.map(|_| analysis.confidence),
                        analysis.error_message.as_deref(),
                    )
                    .await?;
            }
        }
    }

    Ok(AnalysisBatchResponse {
        analyzed,
        auto_resolved,
        failed,
    })
}

async fn analyze_entry(
    photo_repo: &PhotoRepository,
    analyzer: Option<&Arc<dyn PhotoAnalyzer>>,
    photo_id: Uuid,
) -> Result<ModerationAnalysis, ApiError> {
    let Some(analyzer) = analyzer else {
        return Ok(ModerationAnalysis::failure("AI analysis not configured"));
    };

    let photo = photo_repo
        .find_by_id(photo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;

    let Some(url) = photo.storage_url.as_deref() else {
        return Ok(ModerationAnalysis::failure("photo has no storage URL"));
    };

    Ok(analyzer.analyze(url).await)
}
