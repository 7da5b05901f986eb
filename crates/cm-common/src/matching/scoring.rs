use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aggregate::aggregate_scores;
use super::requirements::{
    calculate_deduction, check_mandatory, round2, DeductionItem, RequirementCheck,
};
use crate::{CadreProfile, PositionProfile};

/// 匹配等级：优质(≥80) / 合格(≥60) / 不合格(<60)。
/// 硬性要求不满足时无条件判不合格。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
    Excellent,
    Qualified,
    Unqualified,
}

impl MatchLevel {
    pub fn from_final_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Qualified
        } else {
            Self::Unqualified
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Qualified => "qualified",
            Self::Unqualified => "unqualified",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "excellent" => Some(Self::Excellent),
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }
}

/// 单个维度的基础分明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDetail {
    pub ability_dimension: String,
    pub weight: f64,
    pub scores: Vec<f64>,
    pub total_score: f64,
    pub max_score: f64,
    pub percentage_score: f64,
    pub weighted_contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MandatoryCheck {
    pub is_meet: bool,
    pub details: Vec<RequirementCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    pub total_deduction: f64,
    pub details: Vec<DeductionItem>,
}

/// 匹配详情。入库与 API 响应共用同一结构，经 serde_json 无损往返。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub base_score: f64,
    pub base_score_details: Vec<DimensionDetail>,
    pub mandatory_check: MandatoryCheck,
    pub deduction: Deduction,
}

/// 一次匹配计算的完整输出
#[derive(Debug, Clone, PartialEq)]
pub struct MatchComputation {
    pub base_score: f64,
    pub deduction_score: f64,
    pub final_score: f64,
    pub match_level: MatchLevel,
    pub is_meet_mandatory: bool,
    pub detail: MatchDetail,
}

/// 干部×岗位匹配计算（纯函数，入参为预加载数据）。
///
/// 基础分 = Σ 维度百分制分 × 权重/100（缺失维度贡献 0），
/// 最终分 = max(0, 基础分 − 建议要求扣分)，两位小数。
pub fn compute_match(
    profile: &CadreProfile,
    position: &PositionProfile,
    today: NaiveDate,
) -> MatchComputation {
    let aggregates = aggregate_scores(&profile.ability_scores);

    let mut base_score = 0.0;
    let mut base_details = Vec::new();
    for weight in &position.weights {
        let Some(aggregate) = aggregates.get(&weight.dimension) else {
            continue;
        };

        let weighted_contribution = aggregate.percentage * (weight.weight / 100.0);
        base_score += weighted_contribution;

        base_details.push(DimensionDetail {
            ability_dimension: aggregate.dimension.clone(),
            weight: weight.weight,
            scores: aggregate.scores.clone(),
            total_score: aggregate.total,
            max_score: aggregate.max,
            percentage_score: round2(aggregate.percentage),
            weighted_contribution: round2(weighted_contribution),
        });
    }
    let base_score = round2(base_score);

    let (is_meet_mandatory, mandatory_details) =
        check_mandatory(profile, &position.requirements, today);
    let (deduction_score, deduction_details) =
        calculate_deduction(profile, &position.requirements, today);

    let final_score = round2((base_score - deduction_score).max(0.0));

    let match_level = if is_meet_mandatory {
        MatchLevel::from_final_score(final_score)
    } else {
        MatchLevel::Unqualified
    };

    MatchComputation {
        base_score,
        deduction_score,
        final_score,
        match_level,
        is_meet_mandatory,
        detail: MatchDetail {
            base_score,
            base_score_details: base_details,
            mandatory_check: MandatoryCheck {
                is_meet: is_meet_mandatory,
                details: mandatory_details,
            },
            deduction: Deduction {
                total_deduction: deduction_score,
                details: deduction_details,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::requirements::{
        IndicatorType, Operator, Requirement, RequirementKind,
    };
    use crate::{AbilityScore, AbilityWeight, Cadre, Position};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn score(dimension: &str, tag: &str, value: f64) -> AbilityScore {
        AbilityScore {
            cadre_id: 1,
            dimension: dimension.into(),
            tag: tag.into(),
            score: value,
        }
    }

    fn weight(dimension: &str, value: f64) -> AbilityWeight {
        AbilityWeight {
            position_id: 10,
            dimension: dimension.into(),
            weight: value,
        }
    }

    fn base_profile() -> CadreProfile {
        CadreProfile {
            cadre: Cadre {
                id: Some(1),
                employee_no: "E001".into(),
                name: "张三".into(),
                education: Some("本科".into()),
                status: 1,
                ..Cadre::default()
            },
            ability_scores: vec![
                score("执行力", "任务完成率", 5.0),
                score("执行力", "应急处突", 4.0),
                score("执行力", "成本控制", 3.0),
            ],
            ..CadreProfile::default()
        }
    }

    fn base_position(requirements: Vec<Requirement>) -> PositionProfile {
        PositionProfile {
            position: Position {
                id: Some(10),
                position_code: "P010".into(),
                position_name: "研发负责人".into(),
                is_key_position: true,
                status: 1,
            },
            weights: vec![weight("执行力", 40.0)],
            requirements,
        }
    }

    fn suggested_certificate_requirement(deduction: f64, limit: f64) -> Requirement {
        Requirement {
            position_id: 10,
            kind: RequirementKind::Suggested,
            indicator: IndicatorType::Certificate,
            operator: Operator::In,
            compare_value: r#"["CPA"]"#.into(),
            deduction_score: deduction,
            deduction_limit: limit,
        }
    }

    #[test]
    fn weighted_dimension_contributes_percentage_times_weight() {
        // 执行力 [5,4,3] → 80%，权重 40% → 贡献 32.0
        let computation = compute_match(&base_profile(), &base_position(vec![]), today());

        assert_eq!(computation.base_score, 32.0);
        assert_eq!(computation.detail.base_score_details.len(), 1);
        let detail = &computation.detail.base_score_details[0];
        assert_eq!(detail.percentage_score, 80.0);
        assert_eq!(detail.weighted_contribution, 32.0);
    }

    #[test]
    fn absent_dimension_contributes_zero_not_a_penalty() {
        let mut position = base_position(vec![]);
        position.weights.push(weight("领导力", 60.0));

        let computation = compute_match(&base_profile(), &position, today());

        assert_eq!(computation.base_score, 32.0);
        // 缺失维度不进入明细
        assert_eq!(computation.detail.base_score_details.len(), 1);
    }

    #[test]
    fn deduction_is_subtracted_and_floored_at_zero() {
        let mut profile = base_profile();
        profile.ability_scores = vec![score("执行力", "任务完成率", 1.0)];
        let position = base_position(vec![suggested_certificate_requirement(50.0, 50.0)]);

        let computation = compute_match(&profile, &position, today());

        // 基础分 1/5*100*0.4 = 8.0，扣 50 → 最终分钳到 0
        assert_eq!(computation.base_score, 8.0);
        assert_eq!(computation.final_score, 0.0);
    }

    #[test]
    fn qualified_tier_after_bounded_deduction() {
        // base 75：执行力全 5 分(100%) × 权重 75
        let mut profile = base_profile();
        profile.ability_scores = vec![
            score("执行力", "任务完成率", 5.0),
            score("执行力", "应急处突", 5.0),
        ];
        let mut position = base_position(vec![suggested_certificate_requirement(10.0, 8.0)]);
        position.weights = vec![weight("执行力", 75.0)];

        let computation = compute_match(&profile, &position, today());

        assert_eq!(computation.base_score, 75.0);
        assert_eq!(computation.deduction_score, 8.0);
        assert_eq!(computation.final_score, 67.0);
        assert_eq!(computation.match_level, MatchLevel::Qualified);
    }

    #[test]
    fn failed_mandatory_forces_unqualified_despite_high_score() {
        let mut profile = base_profile();
        profile.ability_scores = vec![
            score("执行力", "任务完成率", 5.0),
            score("执行力", "应急处突", 5.0),
        ];
        let mut position = base_position(vec![Requirement {
            position_id: 10,
            kind: RequirementKind::Mandatory,
            indicator: IndicatorType::Education,
            operator: Operator::GreaterEqual,
            compare_value: "博士".into(),
            deduction_score: 0.0,
            deduction_limit: 0.0,
        }]);
        position.weights = vec![weight("执行力", 90.0)];

        let computation = compute_match(&profile, &position, today());

        assert_eq!(computation.base_score, 90.0);
        assert!(!computation.is_meet_mandatory);
        assert_eq!(computation.match_level, MatchLevel::Unqualified);
    }

    #[test]
    fn recomputation_is_deterministic() {
        let profile = base_profile();
        let position = base_position(vec![suggested_certificate_requirement(4.0, 4.0)]);

        let first = compute_match(&profile, &position, today());
        let second = compute_match(&profile, &position, today());

        assert_eq!(first.base_score, second.base_score);
        assert_eq!(first.final_score, second.final_score);
        assert_eq!(first.match_level, second.match_level);
    }

    #[test]
    fn match_detail_round_trips_through_json() {
        let computation = compute_match(
            &base_profile(),
            &base_position(vec![suggested_certificate_requirement(3.0, 2.0)]),
            today(),
        );

        let serialized = serde_json::to_string(&computation.detail).unwrap();
        let parsed: MatchDetail = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, computation.detail);
    }

    #[test]
    fn level_thresholds_match_contract() {
        assert_eq!(MatchLevel::from_final_score(80.0), MatchLevel::Excellent);
        assert_eq!(MatchLevel::from_final_score(79.99), MatchLevel::Qualified);
        assert_eq!(MatchLevel::from_final_score(60.0), MatchLevel::Qualified);
        assert_eq!(MatchLevel::from_final_score(59.99), MatchLevel::Unqualified);
    }
}
