use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use cm_common::analytics::age_structure::AgeStructure;
use cm_common::analytics::flow::{FlowCadreList, SourceFlowStatistics, SourceType};
use cm_common::analytics::portrait::CadrePortrait;
use cm_common::analytics::risk::PositionRisk;
use cm_common::analytics::statistics::MatchStatistics;
use cm_common::service;

use crate::error::ApiError;
use crate::SharedState;

/// 匹配度统计（全员 + 关键岗位）
pub async fn match_statistics(
    State(state): State<SharedState>,
) -> Result<Json<MatchStatistics>, ApiError> {
    Ok(Json(service::get_match_statistics(&state.pool).await?))
}

#[derive(Debug, Deserialize, Default)]
pub struct AgeStructureQuery {
    /// true 时每个桶携带人员清单
    #[serde(default)]
    pub details: bool,
}

/// 干部梯队与年龄结构
pub async fn age_structure(
    State(state): State<SharedState>,
    Query(query): Query<AgeStructureQuery>,
) -> Result<Json<AgeStructure>, ApiError> {
    Ok(Json(
        service::get_age_structure(&state.pool, query.details).await?,
    ))
}

/// 岗位风险评估
pub async fn position_risk(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PositionRisk>>, ApiError> {
    Ok(Json(service::get_position_risk(&state.pool).await?))
}

/// 干部质量画像
pub async fn quality_portrait(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CadrePortrait>>, ApiError> {
    Ok(Json(service::get_quality_portrait(&state.pool).await?))
}

/// 干部来源与流动统计
pub async fn source_and_flow(
    State(state): State<SharedState>,
) -> Result<Json<SourceFlowStatistics>, ApiError> {
    Ok(Json(service::get_source_and_flow(&state.pool).await?))
}

#[derive(Debug, Deserialize, Default)]
pub struct FlowCadresQuery {
    pub year: Option<i32>,
    pub source_type: Option<String>,
}

/// 流动干部明细（近 5 年）
pub async fn flow_cadres(
    State(state): State<SharedState>,
    Query(query): Query<FlowCadresQuery>,
) -> Result<Json<FlowCadreList>, ApiError> {
    let source_type = query
        .source_type
        .as_deref()
        .map(|raw| {
            SourceType::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown source type: {raw}")))
        })
        .transpose()?;

    Ok(Json(
        service::get_flow_cadres(&state.pool, query.year, source_type).await?,
    ))
}
