use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use cm_common::api::{MatchPreview, MatchResultView, PagedMatchResults, PositionComparison};
use cm_common::db::MatchResultFilter;
use cm_common::matching::scoring::MatchLevel;
use cm_common::service;

use crate::error::ApiError;
use crate::SharedState;

const MAX_BATCH_CADRES: usize = 200;
const MAX_COMPARE_POSITIONS: usize = 20;

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub cadre_id: i64,
    pub position_id: i64,
    #[serde(default = "default_save")]
    pub save_to_db: bool,
}

const fn default_save() -> bool {
    true
}

/// 单个干部×岗位匹配计算
pub async fn calculate(
    State(state): State<SharedState>,
    Json(request): Json<CalculateRequest>,
) -> Result<Json<MatchResultView>, ApiError> {
    let result = service::calculate(
        &state.pool,
        request.cadre_id,
        request.position_id,
        request.save_to_db,
    )
    .await?;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct BatchCalculateRequest {
    pub position_id: i64,
}

#[derive(Debug, Serialize)]
pub struct BatchCalculateResponse {
    pub position_id: i64,
    pub results: Vec<MatchResultView>,
}

/// 岗位 × 全部在职干部批量计算（落库）
pub async fn batch_calculate(
    State(state): State<SharedState>,
    Json(request): Json<BatchCalculateRequest>,
) -> Result<Json<BatchCalculateResponse>, ApiError> {
    let results = service::batch_calculate(&state.pool, request.position_id).await?;

    Ok(Json(BatchCalculateResponse {
        position_id: request.position_id,
        results,
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchCadresRequest {
    pub position_id: i64,
    pub cadre_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct BatchCadresResponse {
    pub position_id: i64,
    pub results: Vec<MatchPreview>,
}

/// 候选短名单预览（不落库，精简投影）
pub async fn batch_calculate_cadres(
    State(state): State<SharedState>,
    Json(request): Json<BatchCadresRequest>,
) -> Result<Json<BatchCadresResponse>, ApiError> {
    if request.cadre_ids.is_empty() {
        return Err(ApiError::BadRequest("cadre_ids must not be empty".into()));
    }
    if request.cadre_ids.len() > MAX_BATCH_CADRES {
        return Err(ApiError::BadRequest(format!(
            "cadre_ids exceeds the limit of {MAX_BATCH_CADRES}"
        )));
    }

    let results =
        service::batch_calculate_cadres(&state.pool, request.position_id, &request.cadre_ids)
            .await?;

    Ok(Json(BatchCadresResponse {
        position_id: request.position_id,
        results,
    }))
}

#[derive(Debug, Deserialize, Default)]
pub struct MatchResultQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub cadre_id: Option<i64>,
    pub position_id: Option<i64>,
    pub match_level: Option<String>,
}

const fn default_page() -> i64 {
    1
}

const fn default_page_size() -> i64 {
    20
}

/// 匹配结果分页列表
pub async fn list_results(
    State(state): State<SharedState>,
    Query(query): Query<MatchResultQuery>,
) -> Result<Json<PagedMatchResults>, ApiError> {
    let match_level = query
        .match_level
        .as_deref()
        .map(|raw| {
            MatchLevel::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown match level: {raw}")))
        })
        .transpose()?;

    let filter = MatchResultFilter {
        cadre_id: query.cadre_id,
        position_id: query.position_id,
        match_level,
    };

    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 200);
    let results = service::get_match_results(&state.pool, filter, page, page_size).await?;

    Ok(Json(results))
}

/// 匹配结果详情
pub async fn get_result(
    State(state): State<SharedState>,
    Path(result_id): Path<i64>,
) -> Result<Json<MatchResultView>, ApiError> {
    let result = service::get_match_result(&state.pool, result_id).await?;
    Ok(Json(result))
}

/// 干部当前岗位匹配结果列表
pub async fn current_position_results(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MatchPreview>>, ApiError> {
    let results = service::get_current_position_matches(&state.pool).await?;
    Ok(Json(results))
}

/// 全员当前岗位匹配刷新（删旧结果与报告后重算落库）
pub async fn refresh_current_position(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MatchResultView>>, ApiError> {
    let results = service::refresh_current_position_matches(&state.pool).await?;
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub cadre_id: i64,
    pub position_ids: Vec<i64>,
}

/// 多岗位对比
pub async fn compare_positions(
    State(state): State<SharedState>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<PositionComparison>, ApiError> {
    if request.position_ids.is_empty() {
        return Err(ApiError::BadRequest("position_ids must not be empty".into()));
    }
    if request.position_ids.len() > MAX_COMPARE_POSITIONS {
        return Err(ApiError::BadRequest(format!(
            "position_ids exceeds the limit of {MAX_COMPARE_POSITIONS}"
        )));
    }

    let comparison =
        service::compare_positions(&state.pool, request.cadre_id, &request.position_ids).await?;

    Ok(Json(comparison))
}
