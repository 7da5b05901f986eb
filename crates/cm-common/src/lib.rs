pub mod analytics;
pub mod api;
pub mod constants;
pub mod db;
pub mod logging;
pub mod matching;
pub mod service;

use chrono::{DateTime, NaiveDate, Utc};

use matching::requirements::Requirement;

// Commonly used data models for the matching engine. Loaded by the db layer,
// consumed by pure computation functions.

/// 干部基础信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cadre {
    pub id: Option<i64>,
    pub employee_no: String,
    pub name: String,
    pub department_id: Option<i64>,
    pub position_id: Option<i64>,
    pub job_grade: Option<i32>,
    pub management_level: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub education: Option<String>,
    pub political_status: Option<String>,
    pub entry_date: Option<NaiveDate>,
    pub status: i32,
}

impl Cadre {
    /// 在职判定（status=1）
    pub fn is_active(&self) -> bool {
        self.status == 1
    }
}

/// 岗位信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    pub id: Option<i64>,
    pub position_code: String,
    pub position_name: String,
    pub is_key_position: bool,
    pub status: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Department {
    pub id: Option<i64>,
    pub name: String,
}

/// 干部能力评分。每个 (cadre, tag) 至多一行。
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityScore {
    pub cadre_id: i64,
    pub dimension: String,
    pub tag: String,
    pub score: f64,
}

/// 岗位能力权重（0-100，写入时校验总和接近100）
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityWeight {
    pub position_id: i64,
    pub dimension: String,
    pub weight: f64,
}

/// 干部动态信息类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicKind {
    Training,
    Project,
    Performance,
    Reward,
    Appointment,
    WorkHistory,
}

impl DynamicKind {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Training),
            2 => Some(Self::Project),
            3 => Some(Self::Performance),
            4 => Some(Self::Reward),
            5 => Some(Self::Appointment),
            6 => Some(Self::WorkHistory),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Training => 1,
            Self::Project => 2,
            Self::Performance => 3,
            Self::Reward => 4,
            Self::Appointment => 5,
            Self::WorkHistory => 6,
        }
    }
}

/// 动态信息记录。只保留指标评估与分析统计实际消费的字段。
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    pub cadre_id: i64,
    pub kind: DynamicKind,
    pub work_company: Option<String>,
    pub assessment_grade: Option<String>,
    pub is_core_project: bool,
    pub term_start_date: Option<NaiveDate>,
    pub term_end_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl DynamicRecord {
    pub fn new(cadre_id: i64, kind: DynamicKind) -> Self {
        Self {
            cadre_id,
            kind,
            work_company: None,
            assessment_grade: None,
            is_core_project: false,
            term_start_date: None,
            term_end_date: None,
            created_at: None,
        }
    }
}

/// 匹配计算的干部侧输入：基础信息 + 能力评分 + 动态记录 + 专业/证书集合。
#[derive(Debug, Clone, Default)]
pub struct CadreProfile {
    pub cadre: Cadre,
    pub ability_scores: Vec<AbilityScore>,
    pub records: Vec<DynamicRecord>,
    pub majors: Vec<String>,
    pub certificates: Vec<String>,
}

impl CadreProfile {
    /// 指定类别的动态记录
    pub fn records_of(&self, kind: DynamicKind) -> impl Iterator<Item = &DynamicRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }
}

/// 匹配计算的岗位侧输入：基础信息 + 维度权重 + 要求配置。
#[derive(Debug, Clone, Default)]
pub struct PositionProfile {
    pub position: Position,
    pub weights: Vec<AbilityWeight>,
    pub requirements: Vec<Requirement>,
}
