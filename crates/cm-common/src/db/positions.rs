use deadpool_postgres::PoolError;
use tokio_postgres::{Error as PgError, Row};
use tracing::{instrument, warn};

use crate::db::PgPool;
use crate::matching::requirements::{IndicatorType, Operator, Requirement, RequirementKind};
use crate::{AbilityWeight, Position, PositionProfile};

#[derive(Debug, thiserror::Error)]
pub enum PositionStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

fn row_to_position(row: &Row) -> Position {
    Position {
        id: Some(row.get("id")),
        position_code: row.get("position_code"),
        position_name: row.get("position_name"),
        is_key_position: row.get("is_key_position"),
        status: row.get("status"),
    }
}

#[instrument(skip(pool))]
pub async fn fetch_position(
    pool: &PgPool,
    position_id: i64,
) -> Result<Option<Position>, PositionStorageError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            "SELECT id, position_code, position_name, is_key_position, status
             FROM hr.position_info WHERE id = $1",
            &[&position_id],
        )
        .await?;
    Ok(row.as_ref().map(row_to_position))
}

/// 启用中的岗位全量（status=1）
#[instrument(skip(pool))]
pub async fn fetch_active_positions(pool: &PgPool) -> Result<Vec<Position>, PositionStorageError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT id, position_code, position_name, is_key_position, status
             FROM hr.position_info WHERE status = 1 ORDER BY id",
            &[],
        )
        .await?;
    Ok(rows.iter().map(row_to_position).collect())
}

#[instrument(skip(pool))]
pub async fn fetch_ability_weights(
    pool: &PgPool,
    position_id: i64,
) -> Result<Vec<AbilityWeight>, PositionStorageError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT position_id, ability_dimension, weight
             FROM hr.position_ability_weight WHERE position_id = $1 ORDER BY id",
            &[&position_id],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| AbilityWeight {
            position_id: row.get("position_id"),
            dimension: row.get("ability_dimension"),
            weight: row.get("weight"),
        })
        .collect())
}

/// 启用中的岗位要求配置。
/// 无法归类的 requirement_type 行丢弃并告警；未识别的操作符回退为 `>=`（列默认值）。
#[instrument(skip(pool))]
pub async fn fetch_requirements(
    pool: &PgPool,
    position_id: i64,
) -> Result<Vec<Requirement>, PositionStorageError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT position_id, requirement_type, indicator_type, operator, compare_value,
                    deduction_score, deduction_limit
             FROM hr.position_requirement
             WHERE position_id = $1 AND status = 1
             ORDER BY id",
            &[&position_id],
        )
        .await?;

    Ok(rows
        .iter()
        .filter_map(|row| {
            let raw_kind: String = row.get("requirement_type");
            let Some(kind) = RequirementKind::parse(&raw_kind) else {
                warn!(
                    position_id,
                    requirement_type = raw_kind.as_str(),
                    "unknown requirement type, row skipped"
                );
                return None;
            };

            let raw_operator: String = row.get("operator");
            let operator = Operator::parse(&raw_operator).unwrap_or_else(|| {
                warn!(
                    position_id,
                    operator = raw_operator.as_str(),
                    "unknown operator, falling back to >="
                );
                Operator::GreaterEqual
            });

            let raw_indicator: String = row.get("indicator_type");
            Some(Requirement {
                position_id: row.get("position_id"),
                kind,
                indicator: IndicatorType::parse(&raw_indicator),
                operator,
                compare_value: row
                    .get::<_, Option<String>>("compare_value")
                    .unwrap_or_default(),
                deduction_score: row.get("deduction_score"),
                deduction_limit: row.get("deduction_limit"),
            })
        })
        .collect())
}

/// 组装匹配计算所需的岗位侧完整输入。岗位不存在时返回 None。
#[instrument(skip(pool))]
pub async fn load_position_profile(
    pool: &PgPool,
    position_id: i64,
) -> Result<Option<PositionProfile>, PositionStorageError> {
    let Some(position) = fetch_position(pool, position_id).await? else {
        return Ok(None);
    };

    let weights = fetch_ability_weights(pool, position_id).await?;
    let requirements = fetch_requirements(pool, position_id).await?;

    Ok(Some(PositionProfile {
        position,
        weights,
        requirements,
    }))
}
