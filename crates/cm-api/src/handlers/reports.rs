use axum::{
    extract::{Path, State},
    Json,
};

use cm_common::api::MatchReportView;
use cm_common::service;

use crate::error::ApiError;
use crate::SharedState;

/// 由落库的匹配结果生成分析报告
pub async fn generate_report(
    State(state): State<SharedState>,
    Path(result_id): Path<i64>,
) -> Result<Json<MatchReportView>, ApiError> {
    let report = service::generate_report(&state.pool, result_id).await?;
    Ok(Json(report))
}
