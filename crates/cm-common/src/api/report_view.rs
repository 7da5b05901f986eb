use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::report::RadarData;

/// 匹配分析报告视图。radar_data 的落库形态与响应形态为同一结构。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReportView {
    pub id: i64,
    pub match_result_id: i64,
    pub report_type: String,
    pub advantage: String,
    pub weakness: String,
    pub unmet_requirements: String,
    pub suggestions: String,
    pub radar_data: RadarData,
    pub create_time: DateTime<Utc>,
}
