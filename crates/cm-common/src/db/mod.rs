pub mod cadres;
pub mod match_results;
pub mod migrations;
pub mod pool;
pub mod positions;
pub mod reports;

// Keep re-exports unique so downstream crates see a single symbol per helper.
pub use cadres::{
    fetch_active_cadres, fetch_appointment_start_dates, fetch_cadre, fetch_cadre_overviews,
    fetch_cadre_summary, fetch_core_project_counts, fetch_performance_counts,
    fetch_training_counts, load_cadre_profile, CadreStorageError,
};
pub use match_results::{
    delete_pair_results, fetch_current_position_matches, fetch_latest_pair_scores,
    fetch_match_result, find_latest_for_pair, insert_match_result, list_match_results,
    CurrentPositionMatchRow, MatchResultFilter, MatchResultRecord, MatchResultStorageError,
    StoredMatchResult,
};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, create_pool_from_url_checked, DbPoolError, PgPool};
pub use positions::{
    fetch_active_positions, fetch_position, load_position_profile, PositionStorageError,
};
pub use reports::{insert_report, ReportStorageError};
