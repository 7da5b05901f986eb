use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::{DbPoolError, PgPool};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to build pool: {0}")]
    PoolBuild(#[from] DbPoolError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    id: 1,
    description: "hr schema: reference tables, score/weight/requirement config, match results",
    sql: r#"
CREATE TABLE IF NOT EXISTS hr.department (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hr.position_info (
    id BIGSERIAL PRIMARY KEY,
    position_code TEXT NOT NULL,
    position_name TEXT NOT NULL,
    is_key_position BOOLEAN NOT NULL DEFAULT FALSE,
    status INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS hr.cadre_basic_info (
    id BIGSERIAL PRIMARY KEY,
    employee_no TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    department_id BIGINT REFERENCES hr.department(id),
    position_id BIGINT REFERENCES hr.position_info(id),
    job_grade INTEGER,
    management_level TEXT,
    gender TEXT,
    birth_date DATE,
    education TEXT,
    political_status TEXT,
    entry_date DATE,
    status INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS hr.cadre_ability_score (
    id BIGSERIAL PRIMARY KEY,
    cadre_id BIGINT NOT NULL REFERENCES hr.cadre_basic_info(id) ON DELETE CASCADE,
    ability_dimension TEXT NOT NULL,
    ability_tag TEXT NOT NULL,
    score DOUBLE PRECISION NOT NULL CHECK (score >= 1.0 AND score <= 5.0),
    CONSTRAINT uq_cadre_ability UNIQUE (cadre_id, ability_tag)
);

CREATE TABLE IF NOT EXISTS hr.cadre_dynamic_info (
    id BIGSERIAL PRIMARY KEY,
    cadre_id BIGINT NOT NULL REFERENCES hr.cadre_basic_info(id) ON DELETE CASCADE,
    info_type INTEGER NOT NULL,
    work_company TEXT,
    assessment_grade TEXT,
    is_core_project BOOLEAN NOT NULL DEFAULT FALSE,
    term_start_date DATE,
    term_end_date DATE,
    create_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_dynamic_info_cadre_type
    ON hr.cadre_dynamic_info(cadre_id, info_type);

CREATE TABLE IF NOT EXISTS hr.cadre_major (
    id BIGSERIAL PRIMARY KEY,
    cadre_id BIGINT NOT NULL REFERENCES hr.cadre_basic_info(id) ON DELETE CASCADE,
    major_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hr.cadre_certificate (
    id BIGSERIAL PRIMARY KEY,
    cadre_id BIGINT NOT NULL REFERENCES hr.cadre_basic_info(id) ON DELETE CASCADE,
    certificate_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hr.position_ability_weight (
    id BIGSERIAL PRIMARY KEY,
    position_id BIGINT NOT NULL REFERENCES hr.position_info(id) ON DELETE CASCADE,
    ability_dimension TEXT NOT NULL,
    weight DOUBLE PRECISION NOT NULL CHECK (weight >= 0.0 AND weight <= 100.0),
    CONSTRAINT uq_position_dimension UNIQUE (position_id, ability_dimension)
);

CREATE TABLE IF NOT EXISTS hr.position_requirement (
    id BIGSERIAL PRIMARY KEY,
    position_id BIGINT NOT NULL REFERENCES hr.position_info(id) ON DELETE CASCADE,
    requirement_type TEXT NOT NULL,
    indicator_type TEXT NOT NULL,
    operator TEXT NOT NULL DEFAULT '>=',
    compare_value TEXT,
    deduction_score DOUBLE PRECISION NOT NULL DEFAULT 0,
    deduction_limit DOUBLE PRECISION NOT NULL DEFAULT 0,
    status INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS hr.match_result (
    id BIGSERIAL PRIMARY KEY,
    cadre_id BIGINT NOT NULL REFERENCES hr.cadre_basic_info(id),
    position_id BIGINT NOT NULL REFERENCES hr.position_info(id),
    base_score DOUBLE PRECISION NOT NULL,
    deduction_score DOUBLE PRECISION NOT NULL DEFAULT 0,
    final_score DOUBLE PRECISION NOT NULL CHECK (final_score >= 0.0),
    match_level TEXT NOT NULL,
    is_meet_mandatory BOOLEAN NOT NULL DEFAULT TRUE,
    match_detail JSONB,
    create_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_match_result_cadre_position
    ON hr.match_result(cadre_id, position_id);
CREATE INDEX IF NOT EXISTS idx_match_result_final_score
    ON hr.match_result(final_score);
CREATE INDEX IF NOT EXISTS idx_match_result_level
    ON hr.match_result(match_level);

CREATE TABLE IF NOT EXISTS hr.match_report (
    id BIGSERIAL PRIMARY KEY,
    match_result_id BIGINT NOT NULL REFERENCES hr.match_result(id) ON DELETE CASCADE,
    report_type TEXT,
    advantage TEXT,
    weakness TEXT,
    unmet_requirements TEXT,
    suggestions TEXT,
    radar_data JSONB,
    create_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_match_report_result
    ON hr.match_report(match_result_id);
"#,
}];

#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS hr;
             CREATE TABLE IF NOT EXISTS hr.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM hr.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO hr.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}
