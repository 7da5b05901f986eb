use std::collections::HashMap;

use chrono::{DateTime, Utc};
use deadpool_postgres::PoolError;
use serde_json::Value;
use tokio_postgres::types::Json;
use tokio_postgres::{Error as PgError, Row};
use tracing::{instrument, warn};

use crate::db::PgPool;
use crate::matching::scoring::{MatchDetail, MatchLevel};

#[derive(Debug, thiserror::Error)]
pub enum MatchResultStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to map match result row: {0}")]
    Mapping(String),
}

/// 入库载荷
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResultRecord {
    pub cadre_id: i64,
    pub position_id: i64,
    pub base_score: f64,
    pub deduction_score: f64,
    pub final_score: f64,
    pub match_level: MatchLevel,
    pub is_meet_mandatory: bool,
    pub detail: MatchDetail,
}

/// 已入库的匹配结果
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMatchResult {
    pub id: i64,
    pub cadre_id: i64,
    pub position_id: i64,
    pub base_score: f64,
    pub deduction_score: f64,
    pub final_score: f64,
    pub match_level: MatchLevel,
    pub is_meet_mandatory: bool,
    pub detail: MatchDetail,
    pub create_time: DateTime<Utc>,
}

fn parse_level(raw: &str) -> MatchLevel {
    MatchLevel::parse(raw).unwrap_or_else(|| {
        warn!(match_level = raw, "unknown match level in storage, treated as unqualified");
        MatchLevel::Unqualified
    })
}

fn row_to_stored(row: &Row) -> Result<StoredMatchResult, MatchResultStorageError> {
    let raw_level: String = row.get("match_level");
    let detail_value: Option<Value> = row.get("match_detail");
    let detail = detail_value
        .map(serde_json::from_value::<MatchDetail>)
        .transpose()
        .map_err(|e| MatchResultStorageError::Mapping(e.to_string()))?
        .ok_or_else(|| MatchResultStorageError::Mapping("match_detail is null".into()))?;

    Ok(StoredMatchResult {
        id: row.get("id"),
        cadre_id: row.get("cadre_id"),
        position_id: row.get("position_id"),
        base_score: row.get("base_score"),
        deduction_score: row.get("deduction_score"),
        final_score: row.get("final_score"),
        match_level: parse_level(&raw_level),
        is_meet_mandatory: row.get("is_meet_mandatory"),
        detail,
        create_time: row.get("create_time"),
    })
}

const RESULT_COLUMNS: &str = "id, cadre_id, position_id, base_score, deduction_score, \
     final_score, match_level, is_meet_mandatory, match_detail, create_time";

/// 写入一条匹配结果，返回 id 与入库时间。
#[instrument(skip(pool, record))]
pub async fn insert_match_result(
    pool: &PgPool,
    record: &MatchResultRecord,
) -> Result<(i64, DateTime<Utc>), MatchResultStorageError> {
    let client = pool.get().await?;
    let detail = serde_json::to_value(&record.detail)
        .map_err(|e| MatchResultStorageError::Mapping(e.to_string()))?;

    let row = client
        .query_one(
            "INSERT INTO hr.match_result (
                cadre_id, position_id, base_score, deduction_score, final_score,
                match_level, is_meet_mandatory, match_detail
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, create_time",
            &[
                &record.cadre_id,
                &record.position_id,
                &record.base_score,
                &record.deduction_score,
                &record.final_score,
                &record.match_level.as_str(),
                &record.is_meet_mandatory,
                &Json(&detail),
            ],
        )
        .await?;

    Ok((row.get("id"), row.get("create_time")))
}

#[instrument(skip(pool))]
pub async fn fetch_match_result(
    pool: &PgPool,
    result_id: i64,
) -> Result<Option<StoredMatchResult>, MatchResultStorageError> {
    let client = pool.get().await?;
    let query = format!("SELECT {RESULT_COLUMNS} FROM hr.match_result WHERE id = $1");
    let row = client.query_opt(&query, &[&result_id]).await?;
    row.as_ref().map(row_to_stored).transpose()
}

/// 干部×岗位组合的最新一条匹配结果
#[instrument(skip(pool))]
pub async fn find_latest_for_pair(
    pool: &PgPool,
    cadre_id: i64,
    position_id: i64,
) -> Result<Option<StoredMatchResult>, MatchResultStorageError> {
    let client = pool.get().await?;
    let query = format!(
        "SELECT {RESULT_COLUMNS} FROM hr.match_result
         WHERE cadre_id = $1 AND position_id = $2
         ORDER BY create_time DESC, id DESC
         LIMIT 1"
    );
    let row = client.query_opt(&query, &[&cadre_id, &position_id]).await?;
    row.as_ref().map(row_to_stored).transpose()
}

/// 删除干部×岗位组合的全部匹配结果。
/// 关联报告由 match_report 的 ON DELETE CASCADE 一并清理。
#[instrument(skip(pool))]
pub async fn delete_pair_results(
    pool: &PgPool,
    cadre_id: i64,
    position_id: i64,
) -> Result<u64, MatchResultStorageError> {
    let client = pool.get().await?;
    let deleted = client
        .execute(
            "DELETE FROM hr.match_result WHERE cadre_id = $1 AND position_id = $2",
            &[&cadre_id, &position_id],
        )
        .await?;
    Ok(deleted)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchResultFilter {
    pub cadre_id: Option<i64>,
    pub position_id: Option<i64>,
    pub match_level: Option<MatchLevel>,
}

/// 分页查询匹配结果，按最终得分降序。返回 (行, 总数)。
#[instrument(skip(pool))]
pub async fn list_match_results(
    pool: &PgPool,
    filter: MatchResultFilter,
    page: i64,
    page_size: i64,
) -> Result<(Vec<StoredMatchResult>, i64), MatchResultStorageError> {
    let client = pool.get().await?;

    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = Vec::new();

    if let Some(cadre_id) = filter.cadre_id.as_ref() {
        params.push(cadre_id);
        conditions.push(format!("cadre_id = ${}", params.len()));
    }
    if let Some(position_id) = filter.position_id.as_ref() {
        params.push(position_id);
        conditions.push(format!("position_id = ${}", params.len()));
    }
    let level_str = filter.match_level.map(|l| l.as_str());
    if let Some(level) = level_str.as_ref() {
        params.push(level);
        conditions.push(format!("match_level = ${}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_query = format!("SELECT COUNT(*) AS total FROM hr.match_result {where_clause}");
    let total: i64 = client.query_one(&count_query, &params).await?.get("total");

    let offset = (page.max(1) - 1) * page_size;
    let query = format!(
        "SELECT {RESULT_COLUMNS} FROM hr.match_result {where_clause}
         ORDER BY final_score DESC, id DESC
         LIMIT {page_size} OFFSET {offset}"
    );
    let rows = client.query(&query, &params).await?;
    let items = rows
        .iter()
        .map(row_to_stored)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((items, total))
}

/// 当前岗位匹配行（精简投影 + 干部/岗位/部门快照字段）
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPositionMatchRow {
    pub id: i64,
    pub cadre_id: i64,
    pub position_id: i64,
    pub base_score: f64,
    pub deduction_score: f64,
    pub final_score: f64,
    pub match_level: MatchLevel,
    pub is_meet_mandatory: bool,
    pub is_key_position: bool,
    pub employee_no: String,
    pub cadre_name: String,
    pub position_name: String,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
}

/// 在职且有岗位的干部，其“当前岗位”的匹配结果（每组合取最新一条），
/// 按最终得分降序。匹配统计与当前岗位列表共用。
#[instrument(skip(pool))]
pub async fn fetch_current_position_matches(
    pool: &PgPool,
) -> Result<Vec<CurrentPositionMatchRow>, MatchResultStorageError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT DISTINCT ON (m.cadre_id, m.position_id)
                    m.id, m.cadre_id, m.position_id, m.base_score, m.deduction_score,
                    m.final_score, m.match_level, m.is_meet_mandatory,
                    p.is_key_position, p.position_name,
                    c.employee_no, c.name AS cadre_name,
                    c.department_id, d.name AS department_name
             FROM hr.match_result m
             JOIN hr.cadre_basic_info c ON c.id = m.cadre_id
             JOIN hr.position_info p ON p.id = m.position_id
             LEFT JOIN hr.department d ON d.id = c.department_id
             WHERE c.status = 1
               AND c.position_id IS NOT NULL
               AND m.position_id = c.position_id
             ORDER BY m.cadre_id, m.position_id, m.create_time DESC, m.id DESC",
            &[],
        )
        .await?;

    let mut results: Vec<CurrentPositionMatchRow> = rows
        .iter()
        .map(|row| {
            let raw_level: String = row.get("match_level");
            CurrentPositionMatchRow {
                id: row.get("id"),
                cadre_id: row.get("cadre_id"),
                position_id: row.get("position_id"),
                base_score: row.get("base_score"),
                deduction_score: row.get("deduction_score"),
                final_score: row.get("final_score"),
                match_level: parse_level(&raw_level),
                is_meet_mandatory: row.get("is_meet_mandatory"),
                is_key_position: row.get("is_key_position"),
                employee_no: row.get("employee_no"),
                cadre_name: row.get("cadre_name"),
                position_name: row.get("position_name"),
                department_id: row.get("department_id"),
                department_name: row.get("department_name"),
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(results)
}

/// 各 (cadre, position) 组合的最新最终得分（风险/画像分析用）
#[instrument(skip(pool))]
pub async fn fetch_latest_pair_scores(
    pool: &PgPool,
) -> Result<HashMap<(i64, i64), f64>, MatchResultStorageError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT DISTINCT ON (cadre_id, position_id)
                    cadre_id, position_id, final_score
             FROM hr.match_result
             ORDER BY cadre_id, position_id, create_time DESC, id DESC",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| {
            (
                (row.get("cadre_id"), row.get("position_id")),
                row.get("final_score"),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_degrades_to_unqualified() {
        assert_eq!(parse_level("excellent"), MatchLevel::Excellent);
        assert_eq!(parse_level("legendary"), MatchLevel::Unqualified);
    }
}
