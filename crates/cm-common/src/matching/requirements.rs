use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{education_rank, grade_points};
use crate::{CadreProfile, DynamicKind};

/// 要求分类：硬性要求（一票否决）/ 建议要求（未满足按配置扣分）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    Mandatory,
    Suggested,
}

impl RequirementKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "mandatory" => Some(Self::Mandatory),
            "suggested" | "bonus" => Some(Self::Suggested),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Suggested => "suggested",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    GreaterEqual,
    LessThan,
    In,
}

impl Operator {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            ">=" => Some(Self::GreaterEqual),
            "<" => Some(Self::LessThan),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GreaterEqual => ">=",
            Self::LessThan => "<",
            Self::In => "in",
        }
    }
}

/// 指标类型。未识别的配置保留原始串，评估时一律视为未满足。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorType {
    Education,
    Major,
    Certificate,
    Experience,
    PerformanceAvg,
    KpiCompletion,
    AvgTenure,
    JobHoppingFreq,
    ProjectCount,
    Unsupported(String),
}

impl IndicatorType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "education" => Self::Education,
            "major" => Self::Major,
            "certificate" => Self::Certificate,
            "experience" => Self::Experience,
            "performance_avg" => Self::PerformanceAvg,
            "kpi_completion" => Self::KpiCompletion,
            "avg_tenure" => Self::AvgTenure,
            "job_hopping_freq" => Self::JobHoppingFreq,
            "project_count" => Self::ProjectCount,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// 展示名（报告/详情用）
    pub fn label(&self) -> &str {
        match self {
            Self::Education => "学历",
            Self::Major => "专业",
            Self::Certificate => "证书",
            Self::Experience => "岗位经验年限",
            Self::PerformanceAvg => "最近三年绩效平均分",
            Self::KpiCompletion => "KPI达成率",
            Self::AvgTenure => "岗位平均任职年限",
            Self::JobHoppingFreq => "跳槽频率",
            Self::ProjectCount => "项目经验数",
            Self::Unsupported(raw) => raw,
        }
    }
}

/// 岗位要求配置行
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub position_id: i64,
    pub kind: RequirementKind,
    pub indicator: IndicatorType,
    pub operator: Operator,
    pub compare_value: String,
    pub deduction_score: f64,
    pub deduction_limit: f64,
}

/// 单条硬性要求的检查结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementCheck {
    pub requirement_item: String,
    pub requirement_value: String,
    pub is_meet: bool,
}

/// 单条建议要求的扣分明细（仅未满足的要求产生明细）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionItem {
    pub requirement_item: String,
    pub deduction_score: f64,
    pub is_meet: bool,
}

/// 硬性要求检查：逐条评估，整体结论为全部满足的 AND。
pub fn check_mandatory(
    profile: &CadreProfile,
    requirements: &[Requirement],
    today: NaiveDate,
) -> (bool, Vec<RequirementCheck>) {
    let mut all_meet = true;
    let mut details = Vec::new();

    for req in requirements
        .iter()
        .filter(|r| r.kind == RequirementKind::Mandatory)
    {
        let is_meet = is_requirement_met(profile, req, today);
        if !is_meet {
            all_meet = false;
        }
        details.push(RequirementCheck {
            requirement_item: req.indicator.label().to_string(),
            requirement_value: req.compare_value.clone(),
            is_meet,
        });
    }

    (all_meet, details)
}

/// 建议要求扣分：每条未满足的要求扣 min(deduction_score, deduction_limit)，
/// 满足的要求不扣分。总扣分四舍五入保留两位小数。
pub fn calculate_deduction(
    profile: &CadreProfile,
    requirements: &[Requirement],
    today: NaiveDate,
) -> (f64, Vec<DeductionItem>) {
    let mut total = 0.0;
    let mut details = Vec::new();

    for req in requirements
        .iter()
        .filter(|r| r.kind == RequirementKind::Suggested)
    {
        if is_requirement_met(profile, req, today) {
            continue;
        }

        let deduction = req.deduction_score.min(req.deduction_limit).max(0.0);
        total += deduction;
        details.push(DeductionItem {
            requirement_item: req.indicator.label().to_string(),
            deduction_score: deduction,
            is_meet: false,
        });
    }

    (round2(total), details)
}

/// 单条要求评估。比较值解析失败或干部数据缺失一律判不满足。
pub fn is_requirement_met(profile: &CadreProfile, req: &Requirement, today: NaiveDate) -> bool {
    match &req.indicator {
        IndicatorType::Education => check_education(profile, req),
        IndicatorType::Major => check_membership(&profile.majors, &req.compare_value),
        IndicatorType::Certificate => check_membership(&profile.certificates, &req.compare_value),
        IndicatorType::Experience => {
            let years = profile
                .cadre
                .entry_date
                .map(|entry| whole_years_between(entry, today) as f64);
            compare_numeric(years, req)
        }
        IndicatorType::PerformanceAvg => compare_numeric(performance_average(profile, today), req),
        IndicatorType::KpiCompletion => compare_numeric(kpi_completion(profile, today), req),
        IndicatorType::AvgTenure => compare_numeric(average_tenure_years(profile, today), req),
        IndicatorType::JobHoppingFreq => {
            compare_numeric(Some(prior_employer_count(profile) as f64), req)
        }
        IndicatorType::ProjectCount => compare_numeric(
            Some(profile.records_of(DynamicKind::Project).count() as f64),
            req,
        ),
        IndicatorType::Unsupported(raw) => {
            warn!(indicator = raw.as_str(), "unsupported indicator type, treated as unmet");
            false
        }
    }
}

/// 周岁（生日未过减一）。入职年限/任职年限同口径。
pub fn whole_years_between(start: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - start.year();
    if (today.month(), today.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years
}

fn check_education(profile: &CadreProfile, req: &Requirement) -> bool {
    let Some(education) = profile.cadre.education.as_deref() else {
        return false;
    };

    // JSON 数组形式按集合成员判断，标量形式按学历阶梯序数比较
    if let Some(allowed) = parse_string_set(&req.compare_value) {
        return allowed.iter().any(|v| v == education);
    }

    let (Some(actual), Some(required)) =
        (education_rank(education), education_rank(req.compare_value.trim()))
    else {
        return false;
    };

    match req.operator {
        Operator::GreaterEqual => actual >= required,
        Operator::LessThan => actual < required,
        Operator::In => actual == required,
    }
}

fn check_membership(owned: &[String], compare_value: &str) -> bool {
    let allowed = match parse_string_set(compare_value) {
        Some(values) => values,
        None => vec![compare_value.trim().to_string()],
    };

    owned.iter().any(|item| allowed.iter().any(|v| v == item))
}

fn compare_numeric(actual: Option<f64>, req: &Requirement) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    let Ok(expected) = req.compare_value.trim().parse::<f64>() else {
        warn!(
            compare_value = req.compare_value.as_str(),
            indicator = req.indicator.label(),
            "non-numeric compare value for numeric indicator, treated as unmet"
        );
        return false;
    };

    match req.operator {
        Operator::GreaterEqual => actual >= expected,
        Operator::LessThan => actual < expected,
        Operator::In => false,
    }
}

fn parse_string_set(raw: &str) -> Option<Vec<String>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
    Some(
        values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
    )
}

fn within_last_years(record_date: Option<chrono::DateTime<chrono::Utc>>, today: NaiveDate, years: i32) -> bool {
    let Some(date) = record_date.map(|d| d.date_naive()) else {
        return false;
    };
    let cutoff = today
        .with_year(today.year() - years)
        .unwrap_or(today);
    date >= cutoff
}

fn performance_average(profile: &CadreProfile, today: NaiveDate) -> Option<f64> {
    let points: Vec<f64> = profile
        .records_of(DynamicKind::Performance)
        .filter(|r| within_last_years(r.created_at, today, 3))
        .filter_map(|r| r.assessment_grade.as_deref().and_then(grade_points))
        .collect();

    if points.is_empty() {
        return None;
    }
    Some(points.iter().sum::<f64>() / points.len() as f64)
}

/// 近三年考核中达到 B 级及以上的比例（0-100）
fn kpi_completion(profile: &CadreProfile, today: NaiveDate) -> Option<f64> {
    let grades: Vec<f64> = profile
        .records_of(DynamicKind::Performance)
        .filter(|r| within_last_years(r.created_at, today, 3))
        .filter_map(|r| r.assessment_grade.as_deref().and_then(grade_points))
        .collect();

    if grades.is_empty() {
        return None;
    }
    let reached = grades.iter().filter(|p| **p >= 3.0).count();
    Some(reached as f64 / grades.len() as f64 * 100.0)
}

fn average_tenure_years(profile: &CadreProfile, today: NaiveDate) -> Option<f64> {
    let lengths: Vec<f64> = profile
        .records_of(DynamicKind::Appointment)
        .filter_map(|r| {
            let start = r.term_start_date?;
            let end = r.term_end_date.unwrap_or(today);
            let days = (end - start).num_days();
            (days >= 0).then(|| days as f64 / 365.25)
        })
        .collect();

    if lengths.is_empty() {
        return None;
    }
    Some(lengths.iter().sum::<f64>() / lengths.len() as f64)
}

fn prior_employer_count(profile: &CadreProfile) -> usize {
    let mut companies: Vec<&str> = profile
        .records_of(DynamicKind::WorkHistory)
        .filter_map(|r| r.work_company.as_deref())
        .collect();
    companies.sort_unstable();
    companies.dedup();

    if companies.is_empty() {
        // 单位名缺失时退化为记录条数
        profile.records_of(DynamicKind::WorkHistory).count()
    } else {
        companies.len()
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
