use chrono::{DateTime, Utc};
use deadpool_postgres::PoolError;
use tokio_postgres::types::Json;
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::api::MatchReportView;
use crate::db::PgPool;
use crate::matching::report::ReportContent;

#[derive(Debug, thiserror::Error)]
pub enum ReportStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to serialize radar data: {0}")]
    Serialization(String),
}

/// 落库一份分析报告并返回完整视图。
#[instrument(skip(pool, content))]
pub async fn insert_report(
    pool: &PgPool,
    match_result_id: i64,
    content: &ReportContent,
) -> Result<MatchReportView, ReportStorageError> {
    let client = pool.get().await?;
    let radar = serde_json::to_value(&content.radar)
        .map_err(|e| ReportStorageError::Serialization(e.to_string()))?;

    let row = client
        .query_one(
            "INSERT INTO hr.match_report (
                match_result_id, report_type, advantage, weakness,
                unmet_requirements, suggestions, radar_data
             ) VALUES ($1, 'detail', $2, $3, $4, $5, $6)
             RETURNING id, create_time",
            &[
                &match_result_id,
                &content.advantage,
                &content.weakness,
                &content.unmet_requirements,
                &content.suggestions,
                &Json(&radar),
            ],
        )
        .await?;

    let id: i64 = row.get("id");
    let create_time: DateTime<Utc> = row.get("create_time");

    Ok(MatchReportView {
        id,
        match_result_id,
        report_type: "detail".to_string(),
        advantage: content.advantage.clone(),
        weakness: content.weakness.clone(),
        unmet_requirements: content.unmet_requirements.clone(),
        suggestions: content.suggestions.clone(),
        radar_data: content.radar.clone(),
        create_time,
    })
}
