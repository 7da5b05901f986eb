use chrono::NaiveDate;
use serde::Serialize;

use super::age_on;

const LOW_MATCH_THRESHOLD: f64 = 70.0;
const AGE_RISK_THRESHOLD: i32 = 55;
const LONG_TERM_YEARS: i32 = 6;

/// 五项风险因子
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskFactors {
    /// 匹配度低（人岗匹配 < 70）
    pub low_match: bool,
    /// 年龄风险（任职者 > 55 岁）
    pub age_risk: bool,
    /// 单点任职（同部门无可接替干部，或岗位空缺）
    pub single_point: bool,
    /// 培养缺失（近 3 年无培训记录）
    pub no_training: bool,
    /// 任期过长（任职 > 6 年）
    pub long_term: bool,
}

impl RiskFactors {
    pub fn count(&self) -> usize {
        [
            self.low_match,
            self.age_risk,
            self.single_point,
            self.no_training,
            self.long_term,
        ]
        .iter()
        .filter(|v| **v)
        .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// 高风险 ≥3 项，中风险 =2 项，低风险 ≤1 项
    pub fn from_count(count: usize) -> Self {
        if count >= 3 {
            Self::High
        } else if count == 2 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    fn order(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// 风险评估的单岗位输入（db 层装配）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskInput {
    pub position_id: i64,
    pub position_code: String,
    pub position_name: String,
    pub department_name: Option<String>,
    pub incumbent: Option<IncumbentInput>,
}

/// 在任者数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncumbentInput {
    pub cadre_id: i64,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub entry_date: Option<NaiveDate>,
    pub match_score: Option<f64>,
    /// 同部门其他在职干部数（接替候选口径）
    pub same_department_alternatives: usize,
    /// 近 3 年培训记录数
    pub recent_training_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncumbentView {
    pub id: i64,
    pub name: String,
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRisk {
    pub position_id: i64,
    pub position_code: String,
    pub position_name: String,
    pub department: String,
    pub incumbent: Option<IncumbentView>,
    pub risks: RiskFactors,
    pub risk_count: usize,
    pub risk_level: RiskLevel,
}

/// 评估单个岗位的风险。空缺岗位自动记单点任职风险。
pub fn assess_position(input: &RiskInput, today: NaiveDate) -> PositionRisk {
    let mut risks = RiskFactors::default();
    let mut incumbent_view = None;

    match &input.incumbent {
        Some(incumbent) => {
            if matches!(incumbent.match_score, Some(score) if score < LOW_MATCH_THRESHOLD) {
                risks.low_match = true;
            }

            let age = incumbent.birth_date.map(|birth| age_on(birth, today));
            if matches!(age, Some(a) if a > AGE_RISK_THRESHOLD) {
                risks.age_risk = true;
            }

            if incumbent.same_department_alternatives == 0 {
                risks.single_point = true;
            }
            if incumbent.recent_training_count == 0 {
                risks.no_training = true;
            }
            if let Some(entry) = incumbent.entry_date {
                if age_on(entry, today) > LONG_TERM_YEARS {
                    risks.long_term = true;
                }
            }

            incumbent_view = Some(IncumbentView {
                id: incumbent.cadre_id,
                name: incumbent.name.clone(),
                age,
                match_score: incumbent.match_score,
            });
        }
        None => {
            risks.single_point = true;
        }
    }

    let risk_count = risks.count();
    PositionRisk {
        position_id: input.position_id,
        position_code: input.position_code.clone(),
        position_name: input.position_name.clone(),
        department: input
            .department_name
            .clone()
            .unwrap_or_else(|| "未分配".to_string()),
        incumbent: incumbent_view,
        risks,
        risk_count,
        risk_level: RiskLevel::from_count(risk_count),
    }
}

/// 全量岗位风险评估，按风险等级（高→低）、因子数（多→少）排序。
pub fn assess_positions(inputs: &[RiskInput], today: NaiveDate) -> Vec<PositionRisk> {
    let mut results: Vec<PositionRisk> = inputs
        .iter()
        .map(|input| assess_position(input, today))
        .collect();

    results.sort_by(|a, b| {
        a.risk_level
            .order()
            .cmp(&b.risk_level.order())
            .then(b.risk_count.cmp(&a.risk_count))
    });
    results
}
