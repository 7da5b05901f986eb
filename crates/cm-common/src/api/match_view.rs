use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::scoring::{MatchDetail, MatchLevel};

/// 干部快照（嵌入匹配结果响应的必要字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadreSummary {
    pub id: i64,
    pub employee_no: String,
    pub name: String,
    pub position_id: Option<i64>,
    pub position: Option<PositionRef>,
    pub department: Option<DepartmentRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRef {
    pub id: i64,
    pub position_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRef {
    pub id: i64,
    pub name: String,
}

/// 岗位快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub id: i64,
    pub position_code: String,
    pub position_name: String,
    pub is_key_position: bool,
}

/// 匹配结果视图。
///
/// `id = None` 表示临时预览（persist=false），此时 cadre/position 为计算时
/// 附带的快照，避免为序列化再查库。入库结果的 `id`/`create_time` 均有值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResultView {
    pub id: Option<i64>,
    pub cadre_id: i64,
    pub position_id: i64,
    pub base_score: f64,
    pub deduction_score: f64,
    pub final_score: f64,
    pub match_level: MatchLevel,
    pub is_meet_mandatory: bool,
    pub match_detail: MatchDetail,
    pub create_time: Option<DateTime<Utc>>,
    pub cadre: Option<CadreSummary>,
    pub position: Option<PositionSummary>,
}

/// 批量预览的精简投影（候选短名单 UI 用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPreview {
    pub cadre_id: i64,
    pub position_id: i64,
    pub base_score: f64,
    pub deduction_score: f64,
    pub final_score: f64,
    pub match_level: MatchLevel,
    pub is_meet_mandatory: bool,
    pub cadre: Option<CadreSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub position_id: i64,
    pub position_name: String,
    pub final_score: f64,
    pub match_level: MatchLevel,
}

/// 多岗位对比结果：逐岗位摘要 + 按得分的岗位排名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionComparison {
    pub cadre_id: i64,
    pub comparison: Vec<ComparisonRow>,
    pub ranking: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedMatchResults {
    pub items: Vec<MatchResultView>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
