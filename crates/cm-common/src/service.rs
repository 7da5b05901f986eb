//! 匹配计算编排层：组合 db 读写与纯计算引擎，对外提供
//! 单次计算、批量计算、多岗位对比、当前岗位刷新、报告生成与各类统计。

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate, Utc};
use thiserror::Error;
use tracing::{instrument, warn};

use crate::analytics::flow::{
    flow_details, source_and_flow, FlowCadreList, FlowInput, SourceFlowStatistics, SourceType,
};
use crate::analytics::portrait::{build_portraits, CadrePortrait, PortraitInput};
use crate::analytics::risk::{assess_positions, IncumbentInput, PositionRisk, RiskInput};
use crate::analytics::statistics::{summarize_matches, CurrentMatchRow, MatchStatistics};
use crate::analytics::age_structure as age_structure_mod;
use crate::api::{
    CadreSummary, ComparisonRow, DepartmentRef, MatchPreview, MatchReportView, MatchResultView,
    PagedMatchResults, PositionComparison, PositionRef, PositionSummary,
};
use crate::db::{
    cadres, match_results, positions, reports, CadreStorageError, MatchResultFilter,
    MatchResultRecord, MatchResultStorageError, PgPool, PositionStorageError, ReportStorageError,
    StoredMatchResult,
};
use crate::matching::report::build_report;
use crate::matching::scoring::compute_match;
use crate::{CadreProfile, Position, PositionProfile};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("cadre storage error: {0}")]
    Cadre(#[from] CadreStorageError),
    #[error("position storage error: {0}")]
    Position(#[from] PositionStorageError),
    #[error("match result storage error: {0}")]
    MatchResult(#[from] MatchResultStorageError),
    #[error("report storage error: {0}")]
    Report(#[from] ReportStorageError),
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn three_years_ago(date: NaiveDate) -> NaiveDate {
    date.with_year(date.year() - 3).unwrap_or(date)
}

fn sort_by_final_score_desc<T>(items: &mut [T], score: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| score(b).partial_cmp(&score(a)).unwrap_or(Ordering::Equal));
}

async fn require_cadre_profile(
    pool: &PgPool,
    cadre_id: i64,
) -> Result<CadreProfile, ServiceError> {
    cadres::load_cadre_profile(pool, cadre_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("cadre {cadre_id} not found")))
}

async fn require_position_profile(
    pool: &PgPool,
    position_id: i64,
) -> Result<PositionProfile, ServiceError> {
    positions::load_position_profile(pool, position_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("position {position_id} not found")))
}

fn position_summary(position: &Position) -> Option<PositionSummary> {
    position.id.map(|id| PositionSummary {
        id,
        position_code: position.position_code.clone(),
        position_name: position.position_name.clone(),
        is_key_position: position.is_key_position,
    })
}

fn stored_to_view(stored: StoredMatchResult) -> MatchResultView {
    MatchResultView {
        id: Some(stored.id),
        cadre_id: stored.cadre_id,
        position_id: stored.position_id,
        base_score: stored.base_score,
        deduction_score: stored.deduction_score,
        final_score: stored.final_score,
        match_level: stored.match_level,
        is_meet_mandatory: stored.is_meet_mandatory,
        match_detail: stored.detail,
        create_time: Some(stored.create_time),
        cadre: None,
        position: None,
    }
}

/// 单次干部×岗位匹配计算。
/// `persist=false` 时结果不落库，视图携带干部/岗位快照供直接序列化。
#[instrument(skip(pool))]
pub async fn calculate(
    pool: &PgPool,
    cadre_id: i64,
    position_id: i64,
    persist: bool,
) -> Result<MatchResultView, ServiceError> {
    let profile = require_cadre_profile(pool, cadre_id).await?;
    let position = require_position_profile(pool, position_id).await?;

    let computation = compute_match(&profile, &position, today());

    let (id, create_time) = if persist {
        let (id, create_time) = match_results::insert_match_result(
            pool,
            &MatchResultRecord {
                cadre_id,
                position_id,
                base_score: computation.base_score,
                deduction_score: computation.deduction_score,
                final_score: computation.final_score,
                match_level: computation.match_level,
                is_meet_mandatory: computation.is_meet_mandatory,
                detail: computation.detail.clone(),
            },
        )
        .await?;
        (Some(id), Some(create_time))
    } else {
        (None, None)
    };

    let cadre_summary = cadres::fetch_cadre_summary(pool, cadre_id).await?;

    Ok(MatchResultView {
        id,
        cadre_id,
        position_id,
        base_score: computation.base_score,
        deduction_score: computation.deduction_score,
        final_score: computation.final_score,
        match_level: computation.match_level,
        is_meet_mandatory: computation.is_meet_mandatory,
        match_detail: computation.detail,
        create_time,
        cadre: cadre_summary,
        position: position_summary(&position.position),
    })
}

/// 一个岗位 × 全部在职干部，逐个计算并落库。
/// 单个干部失败只告警跳过，不中断批次。结果按最终得分降序。
#[instrument(skip(pool))]
pub async fn batch_calculate(
    pool: &PgPool,
    position_id: i64,
) -> Result<Vec<MatchResultView>, ServiceError> {
    // 岗位不存在直接失败；干部级错误才做跳过处理
    require_position_profile(pool, position_id).await?;

    let cadres_list = cadres::fetch_active_cadres(pool).await?;

    let mut results = Vec::new();
    for cadre in cadres_list {
        let Some(cadre_id) = cadre.id else { continue };
        match calculate(pool, cadre_id, position_id, true).await {
            Ok(view) => results.push(view),
            Err(err) => {
                warn!(cadre_id, position_id, error = %err, "batch computation skipped for cadre");
            }
        }
    }

    sort_by_final_score_desc(&mut results, |r| r.final_score);
    Ok(results)
}

/// 候选短名单预览：指定干部集合 × 一个岗位，不落库，返回精简投影。
#[instrument(skip(pool, cadre_ids))]
pub async fn batch_calculate_cadres(
    pool: &PgPool,
    position_id: i64,
    cadre_ids: &[i64],
) -> Result<Vec<MatchPreview>, ServiceError> {
    require_position_profile(pool, position_id).await?;

    let mut results = Vec::new();
    for &cadre_id in cadre_ids {
        // 与批量计算同口径：只评估在职干部
        match cadres::fetch_cadre(pool, cadre_id).await {
            Ok(Some(cadre)) if cadre.is_active() => {}
            Ok(_) => {
                warn!(cadre_id, position_id, "preview skipped: cadre missing or inactive");
                continue;
            }
            Err(err) => {
                warn!(cadre_id, position_id, error = %err, "preview skipped: cadre lookup failed");
                continue;
            }
        }

        match calculate(pool, cadre_id, position_id, false).await {
            Ok(view) => results.push(MatchPreview {
                cadre_id: view.cadre_id,
                position_id: view.position_id,
                base_score: view.base_score,
                deduction_score: view.deduction_score,
                final_score: view.final_score,
                match_level: view.match_level,
                is_meet_mandatory: view.is_meet_mandatory,
                cadre: view.cadre,
            }),
            Err(err) => {
                warn!(cadre_id, position_id, error = %err, "preview computation skipped for cadre");
            }
        }
    }

    sort_by_final_score_desc(&mut results, |r| r.final_score);
    Ok(results)
}

/// 多岗位对比：已有落库结果直接复用，否则现算并落库；按得分排名。
#[instrument(skip(pool, position_ids))]
pub async fn compare_positions(
    pool: &PgPool,
    cadre_id: i64,
    position_ids: &[i64],
) -> Result<PositionComparison, ServiceError> {
    if cadres::fetch_cadre(pool, cadre_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("cadre {cadre_id} not found")));
    }

    let mut comparison = Vec::new();
    for &position_id in position_ids {
        let position = positions::fetch_position(pool, position_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("position {position_id} not found")))?;

        let (final_score, match_level) =
            match match_results::find_latest_for_pair(pool, cadre_id, position_id).await? {
                Some(existing) => (existing.final_score, existing.match_level),
                None => {
                    let computed = calculate(pool, cadre_id, position_id, true).await?;
                    (computed.final_score, computed.match_level)
                }
            };

        comparison.push(ComparisonRow {
            position_id,
            position_name: position.position_name,
            final_score,
            match_level,
        });
    }

    sort_by_final_score_desc(&mut comparison, |r| r.final_score);
    let ranking = comparison.iter().map(|r| r.position_id).collect();

    Ok(PositionComparison {
        cadre_id,
        comparison,
        ranking,
    })
}

/// 全员“当前岗位”匹配刷新：逐干部删除旧的干部×当前岗位结果
/// （级联清理报告）后重算落库。完成后每组合至多一条存活结果。
#[instrument(skip(pool))]
pub async fn refresh_current_position_matches(
    pool: &PgPool,
) -> Result<Vec<MatchResultView>, ServiceError> {
    let cadres_list = cadres::fetch_active_cadres(pool).await?;

    let mut results = Vec::new();
    for cadre in cadres_list {
        let (Some(cadre_id), Some(position_id)) = (cadre.id, cadre.position_id) else {
            continue;
        };

        let refresh = async {
            match_results::delete_pair_results(pool, cadre_id, position_id).await?;
            calculate(pool, cadre_id, position_id, true).await
        };

        match refresh.await {
            Ok(view) => results.push(view),
            Err(err) => {
                warn!(cadre_id, position_id, error = %err, "refresh skipped for cadre");
            }
        }
    }

    sort_by_final_score_desc(&mut results, |r| r.final_score);
    Ok(results)
}

/// 由落库的匹配结果生成分析报告并落库。
#[instrument(skip(pool))]
pub async fn generate_report(
    pool: &PgPool,
    match_result_id: i64,
) -> Result<MatchReportView, ServiceError> {
    let stored = match_results::fetch_match_result(pool, match_result_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("match result {match_result_id} not found"))
        })?;

    let content = build_report(&stored.detail, stored.match_level);
    Ok(reports::insert_report(pool, match_result_id, &content).await?)
}

/// 匹配结果分页查询（可按干部/岗位/等级过滤）
#[instrument(skip(pool))]
pub async fn get_match_results(
    pool: &PgPool,
    filter: MatchResultFilter,
    page: i64,
    page_size: i64,
) -> Result<PagedMatchResults, ServiceError> {
    let (items, total) = match_results::list_match_results(pool, filter, page, page_size).await?;

    Ok(PagedMatchResults {
        items: items.into_iter().map(stored_to_view).collect(),
        total,
        page,
        page_size,
    })
}

#[instrument(skip(pool))]
pub async fn get_match_result(
    pool: &PgPool,
    result_id: i64,
) -> Result<MatchResultView, ServiceError> {
    let stored = match_results::fetch_match_result(pool, result_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match result {result_id} not found")))?;

    let mut view = stored_to_view(stored);
    view.cadre = cadres::fetch_cadre_summary(pool, view.cadre_id).await?;
    if let Some(position) = positions::fetch_position(pool, view.position_id).await? {
        view.position = position_summary(&position);
    }
    Ok(view)
}

/// 当前岗位匹配结果列表（精简投影）
#[instrument(skip(pool))]
pub async fn get_current_position_matches(
    pool: &PgPool,
) -> Result<Vec<MatchPreview>, ServiceError> {
    let rows = match_results::fetch_current_position_matches(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| MatchPreview {
            cadre_id: row.cadre_id,
            position_id: row.position_id,
            base_score: row.base_score,
            deduction_score: row.deduction_score,
            final_score: row.final_score,
            match_level: row.match_level,
            is_meet_mandatory: row.is_meet_mandatory,
            cadre: Some(CadreSummary {
                id: row.cadre_id,
                employee_no: row.employee_no,
                name: row.cadre_name,
                position_id: Some(row.position_id),
                position: Some(PositionRef {
                    id: row.position_id,
                    position_name: row.position_name,
                }),
                department: row.department_id.map(|id| DepartmentRef {
                    id,
                    name: row.department_name.unwrap_or_default(),
                }),
            }),
        })
        .collect())
}

/// 匹配度统计（全员 + 关键岗位口径）
#[instrument(skip(pool))]
pub async fn get_match_statistics(pool: &PgPool) -> Result<MatchStatistics, ServiceError> {
    let rows = match_results::fetch_current_position_matches(pool).await?;

    let stat_rows: Vec<CurrentMatchRow> = rows
        .iter()
        .map(|row| CurrentMatchRow {
            final_score: row.final_score,
            match_level: row.match_level,
            is_key_position: row.is_key_position,
        })
        .collect();

    Ok(summarize_matches(&stat_rows))
}

/// 干部梯队与年龄结构
#[instrument(skip(pool))]
pub async fn get_age_structure(
    pool: &PgPool,
    include_personnel: bool,
) -> Result<age_structure_mod::AgeStructure, ServiceError> {
    let overviews = cadres::fetch_cadre_overviews(pool).await?;
    Ok(age_structure_mod::age_structure(
        &overviews,
        today(),
        include_personnel,
    ))
}

/// 关键岗位风险评估
#[instrument(skip(pool))]
pub async fn get_position_risk(pool: &PgPool) -> Result<Vec<PositionRisk>, ServiceError> {
    let now = today();
    let positions_list = positions::fetch_active_positions(pool).await?;
    let overviews = cadres::fetch_cadre_overviews(pool).await?;
    let pair_scores = match_results::fetch_latest_pair_scores(pool).await?;
    let training_counts = cadres::fetch_training_counts(pool, three_years_ago(now)).await?;

    let department_headcount = |department_id: Option<i64>| {
        overviews
            .iter()
            .filter(|c| department_id.is_some() && c.department_id == department_id)
            .count()
    };

    let inputs: Vec<RiskInput> = positions_list
        .iter()
        .filter_map(|position| {
            let position_id = position.id?;
            let incumbent = overviews
                .iter()
                .find(|c| c.position_id == Some(position_id));

            Some(RiskInput {
                position_id,
                position_code: position.position_code.clone(),
                position_name: position.position_name.clone(),
                department_name: incumbent.and_then(|c| c.department_name.clone()),
                incumbent: incumbent.map(|cadre| IncumbentInput {
                    cadre_id: cadre.id,
                    name: cadre.name.clone(),
                    birth_date: cadre.birth_date,
                    entry_date: cadre.entry_date,
                    match_score: pair_scores.get(&(cadre.id, position_id)).copied(),
                    same_department_alternatives: department_headcount(cadre.department_id)
                        .saturating_sub(1),
                    recent_training_count: training_counts.get(&cadre.id).copied().unwrap_or(0),
                }),
            })
        })
        .collect();

    Ok(assess_positions(&inputs, now))
}

/// 干部质量画像
#[instrument(skip(pool))]
pub async fn get_quality_portrait(pool: &PgPool) -> Result<Vec<CadrePortrait>, ServiceError> {
    let now = today();
    let overviews = cadres::fetch_cadre_overviews(pool).await?;
    let performance_counts = cadres::fetch_performance_counts(pool, three_years_ago(now)).await?;
    let core_project_counts = cadres::fetch_core_project_counts(pool).await?;
    let pair_scores = match_results::fetch_latest_pair_scores(pool).await?;

    let inputs: Vec<PortraitInput> = overviews
        .into_iter()
        .map(|cadre| {
            let match_score = cadre
                .position_id
                .and_then(|position_id| pair_scores.get(&(cadre.id, position_id)))
                .copied()
                .unwrap_or(0.0);

            PortraitInput {
                performance_count: performance_counts.get(&cadre.id).copied().unwrap_or(0) as u32,
                core_project_count: core_project_counts.get(&cadre.id).copied().unwrap_or(0)
                    as u32,
                match_score,
                cadre,
            }
        })
        .collect();

    Ok(build_portraits(&inputs))
}

async fn load_flow_inputs(pool: &PgPool) -> Result<Vec<FlowInput>, ServiceError> {
    let overviews = cadres::fetch_cadre_overviews(pool).await?;
    let mut appointments = cadres::fetch_appointment_start_dates(pool).await?;

    Ok(overviews
        .into_iter()
        .map(|cadre| {
            let appointment_start_dates = appointments.remove(&cadre.id).unwrap_or_default();
            FlowInput {
                cadre,
                appointment_start_dates,
            }
        })
        .collect())
}

/// 干部来源与流动统计
#[instrument(skip(pool))]
pub async fn get_source_and_flow(pool: &PgPool) -> Result<SourceFlowStatistics, ServiceError> {
    let inputs = load_flow_inputs(pool).await?;
    Ok(source_and_flow(&inputs, today().year()))
}

/// 流动干部明细（近 5 年，支持年份/来源筛选）
#[instrument(skip(pool))]
pub async fn get_flow_cadres(
    pool: &PgPool,
    year: Option<i32>,
    source_type: Option<SourceType>,
) -> Result<FlowCadreList, ServiceError> {
    let inputs = load_flow_inputs(pool).await?;
    Ok(flow_details(&inputs, today(), year, source_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_descending_with_nan_tolerance() {
        let mut scores = vec![61.0, 90.5, 75.0];
        sort_by_final_score_desc(&mut scores, |s| *s);
        assert_eq!(scores, vec![90.5, 75.0, 61.0]);
    }

    #[test]
    fn three_years_ago_handles_plain_dates() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        assert_eq!(
            three_years_ago(date),
            NaiveDate::from_ymd_opt(2023, 7, 15).unwrap()
        );
    }

    #[test]
    fn not_found_errors_render_plainly() {
        let err = ServiceError::NotFound("cadre 42 not found".into());
        assert_eq!(err.to_string(), "cadre 42 not found");
    }
}
