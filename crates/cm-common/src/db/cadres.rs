use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use deadpool_postgres::PoolError;
use tokio_postgres::{Error as PgError, Row};
use tracing::instrument;

use crate::analytics::CadreOverview;
use crate::api::{CadreSummary, DepartmentRef, PositionRef};
use crate::db::PgPool;
use crate::{AbilityScore, Cadre, CadreProfile, DynamicKind, DynamicRecord};

#[derive(Debug, thiserror::Error)]
pub enum CadreStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

fn row_to_cadre(row: &Row) -> Cadre {
    Cadre {
        id: Some(row.get("id")),
        employee_no: row.get("employee_no"),
        name: row.get("name"),
        department_id: row.get("department_id"),
        position_id: row.get("position_id"),
        job_grade: row.get("job_grade"),
        management_level: row.get("management_level"),
        gender: row.get("gender"),
        birth_date: row.get("birth_date"),
        education: row.get("education"),
        political_status: row.get("political_status"),
        entry_date: row.get("entry_date"),
        status: row.get("status"),
    }
}

const CADRE_COLUMNS: &str = "id, employee_no, name, department_id, position_id, job_grade, \
     management_level, gender, birth_date, education, political_status, entry_date, status";

#[instrument(skip(pool))]
pub async fn fetch_cadre(pool: &PgPool, cadre_id: i64) -> Result<Option<Cadre>, CadreStorageError> {
    let client = pool.get().await?;
    let query = format!("SELECT {CADRE_COLUMNS} FROM hr.cadre_basic_info WHERE id = $1");
    let row = client.query_opt(&query, &[&cadre_id]).await?;
    Ok(row.as_ref().map(row_to_cadre))
}

/// 在职干部全量（status=1）
#[instrument(skip(pool))]
pub async fn fetch_active_cadres(pool: &PgPool) -> Result<Vec<Cadre>, CadreStorageError> {
    let client = pool.get().await?;
    let query =
        format!("SELECT {CADRE_COLUMNS} FROM hr.cadre_basic_info WHERE status = 1 ORDER BY id");
    let rows = client.query(&query, &[]).await?;
    Ok(rows.iter().map(row_to_cadre).collect())
}

#[instrument(skip(pool))]
pub async fn fetch_ability_scores(
    pool: &PgPool,
    cadre_id: i64,
) -> Result<Vec<AbilityScore>, CadreStorageError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT cadre_id, ability_dimension, ability_tag, score
             FROM hr.cadre_ability_score WHERE cadre_id = $1 ORDER BY id",
            &[&cadre_id],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| AbilityScore {
            cadre_id: row.get("cadre_id"),
            dimension: row.get("ability_dimension"),
            tag: row.get("ability_tag"),
            score: row.get("score"),
        })
        .collect())
}

#[instrument(skip(pool))]
pub async fn fetch_dynamic_records(
    pool: &PgPool,
    cadre_id: i64,
) -> Result<Vec<DynamicRecord>, CadreStorageError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT cadre_id, info_type, work_company, assessment_grade, is_core_project,
                    term_start_date, term_end_date, create_time
             FROM hr.cadre_dynamic_info WHERE cadre_id = $1 ORDER BY create_time",
            &[&cadre_id],
        )
        .await?;

    // 未识别的 info_type 行直接丢弃
    Ok(rows
        .iter()
        .filter_map(|row| {
            let kind = DynamicKind::from_code(row.get("info_type"))?;
            Some(DynamicRecord {
                cadre_id: row.get("cadre_id"),
                kind,
                work_company: row.get("work_company"),
                assessment_grade: row.get("assessment_grade"),
                is_core_project: row.get("is_core_project"),
                term_start_date: row.get("term_start_date"),
                term_end_date: row.get("term_end_date"),
                created_at: row.get("create_time"),
            })
        })
        .collect())
}

async fn fetch_names(
    pool: &PgPool,
    query: &str,
    cadre_id: i64,
) -> Result<Vec<String>, CadreStorageError> {
    let client = pool.get().await?;
    let rows = client.query(query, &[&cadre_id]).await?;
    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// 组装匹配计算所需的干部侧完整输入。干部不存在时返回 None。
#[instrument(skip(pool))]
pub async fn load_cadre_profile(
    pool: &PgPool,
    cadre_id: i64,
) -> Result<Option<CadreProfile>, CadreStorageError> {
    let Some(cadre) = fetch_cadre(pool, cadre_id).await? else {
        return Ok(None);
    };

    let ability_scores = fetch_ability_scores(pool, cadre_id).await?;
    let records = fetch_dynamic_records(pool, cadre_id).await?;
    let majors = fetch_names(
        pool,
        "SELECT major_name FROM hr.cadre_major WHERE cadre_id = $1 ORDER BY id",
        cadre_id,
    )
    .await?;
    let certificates = fetch_names(
        pool,
        "SELECT certificate_name FROM hr.cadre_certificate WHERE cadre_id = $1 ORDER BY id",
        cadre_id,
    )
    .await?;

    Ok(Some(CadreProfile {
        cadre,
        ability_scores,
        records,
        majors,
        certificates,
    }))
}

/// 干部快照（含当前岗位/部门名称），嵌入匹配结果响应。
#[instrument(skip(pool))]
pub async fn fetch_cadre_summary(
    pool: &PgPool,
    cadre_id: i64,
) -> Result<Option<CadreSummary>, CadreStorageError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            "SELECT c.id, c.employee_no, c.name, c.position_id,
                    p.id AS p_id, p.position_name,
                    d.id AS d_id, d.name AS d_name
             FROM hr.cadre_basic_info c
             LEFT JOIN hr.position_info p ON p.id = c.position_id
             LEFT JOIN hr.department d ON d.id = c.department_id
             WHERE c.id = $1",
            &[&cadre_id],
        )
        .await?;

    Ok(row.map(|row| CadreSummary {
        id: row.get("id"),
        employee_no: row.get("employee_no"),
        name: row.get("name"),
        position_id: row.get("position_id"),
        position: row
            .get::<_, Option<i64>>("p_id")
            .map(|id| PositionRef {
                id,
                position_name: row.get("position_name"),
            }),
        department: row.get::<_, Option<i64>>("d_id").map(|id| DepartmentRef {
            id,
            name: row.get("d_name"),
        }),
    }))
}

/// 分析统计用的在职干部概览（联部门/岗位名称）
#[instrument(skip(pool))]
pub async fn fetch_cadre_overviews(pool: &PgPool) -> Result<Vec<CadreOverview>, CadreStorageError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT c.id, c.employee_no, c.name, c.gender, c.birth_date, c.education,
                    c.political_status, c.entry_date, c.management_level, c.job_grade,
                    c.position_id, p.position_name,
                    c.department_id, d.name AS department_name
             FROM hr.cadre_basic_info c
             LEFT JOIN hr.position_info p ON p.id = c.position_id
             LEFT JOIN hr.department d ON d.id = c.department_id
             WHERE c.status = 1
             ORDER BY c.id",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| CadreOverview {
            id: row.get("id"),
            employee_no: row.get("employee_no"),
            name: row.get("name"),
            gender: row.get("gender"),
            birth_date: row.get("birth_date"),
            education: row.get("education"),
            political_status: row.get("political_status"),
            entry_date: row.get("entry_date"),
            management_level: row.get("management_level"),
            job_grade: row.get("job_grade"),
            position_id: row.get("position_id"),
            position_name: row.get("position_name"),
            department_id: row.get("department_id"),
            department_name: row.get("department_name"),
        })
        .collect())
}

async fn fetch_counts_by_cadre(
    pool: &PgPool,
    query: &str,
    params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
) -> Result<HashMap<i64, usize>, CadreStorageError> {
    let client = pool.get().await?;
    let rows = client.query(query, params).await?;
    Ok(rows
        .iter()
        .map(|row| {
            let count: i64 = row.get("count");
            (row.get("cadre_id"), count.max(0) as usize)
        })
        .collect())
}

/// 各干部近 N 年培训记录数（风险分析：培养缺失因子）
#[instrument(skip(pool))]
pub async fn fetch_training_counts(
    pool: &PgPool,
    cutoff: NaiveDate,
) -> Result<HashMap<i64, usize>, CadreStorageError> {
    let cutoff = cutoff
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);

    fetch_counts_by_cadre(
        pool,
        "SELECT cadre_id, COUNT(*) AS count FROM hr.cadre_dynamic_info
         WHERE info_type = 1 AND create_time >= $1
         GROUP BY cadre_id",
        &[&cutoff],
    )
    .await
}

/// 各干部近 N 年 A/S 绩效次数（质量画像：绩效轴）
#[instrument(skip(pool))]
pub async fn fetch_performance_counts(
    pool: &PgPool,
    cutoff: NaiveDate,
) -> Result<HashMap<i64, usize>, CadreStorageError> {
    let cutoff = cutoff
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);

    fetch_counts_by_cadre(
        pool,
        "SELECT cadre_id, COUNT(*) AS count FROM hr.cadre_dynamic_info
         WHERE info_type = 3 AND assessment_grade IN ('A', 'S') AND create_time >= $1
         GROUP BY cadre_id",
        &[&cutoff],
    )
    .await
}

/// 各干部核心项目数
#[instrument(skip(pool))]
pub async fn fetch_core_project_counts(
    pool: &PgPool,
) -> Result<HashMap<i64, usize>, CadreStorageError> {
    fetch_counts_by_cadre(
        pool,
        "SELECT cadre_id, COUNT(*) AS count FROM hr.cadre_dynamic_info
         WHERE info_type = 2 AND is_core_project
         GROUP BY cadre_id",
        &[],
    )
    .await
}

/// 各干部职务变更记录的任期开始日期（按时间升序，来源/流动分析用）
#[instrument(skip(pool))]
pub async fn fetch_appointment_start_dates(
    pool: &PgPool,
) -> Result<HashMap<i64, Vec<Option<NaiveDate>>>, CadreStorageError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT cadre_id, term_start_date FROM hr.cadre_dynamic_info
             WHERE info_type = 5
             ORDER BY cadre_id, create_time",
            &[],
        )
        .await?;

    let mut map: HashMap<i64, Vec<Option<NaiveDate>>> = HashMap::new();
    for row in rows {
        map.entry(row.get("cadre_id"))
            .or_default()
            .push(row.get("term_start_date"));
    }
    Ok(map)
}
