use serde::{Deserialize, Serialize};

use super::requirements::round2;
use super::scoring::{MatchDetail, MatchLevel};

/// 雷达图数据：维度标签与各维度平均分的平行数组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarData {
    pub dimensions: Vec<String>,
    pub scores: Vec<f64>,
}

/// 分析报告正文（落库前的纯内容）
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContent {
    pub advantage: String,
    pub weakness: String,
    pub unmet_requirements: String,
    pub suggestions: String,
    pub radar: RadarData,
}

const ADVANTAGE_THRESHOLD: f64 = 4.0;
const WEAKNESS_THRESHOLD: f64 = 2.0;

/// 由匹配详情生成分析报告。
pub fn build_report(detail: &MatchDetail, level: MatchLevel) -> ReportContent {
    let (advantage, weakness) = analyze_advantage_weakness(detail);

    ReportContent {
        advantage,
        weakness,
        unmet_requirements: unmet_requirements(detail),
        suggestions: build_suggestions(detail, level),
        radar: radar_data(detail),
    }
}

fn analyze_advantage_weakness(detail: &MatchDetail) -> (String, String) {
    let mut advantages = Vec::new();
    let mut weaknesses = Vec::new();

    for dimension in &detail.base_score_details {
        if dimension.scores.is_empty() {
            continue;
        }
        let avg = dimension.total_score / dimension.scores.len() as f64;

        if avg >= ADVANTAGE_THRESHOLD {
            advantages.push(format!(
                "{}：平均得分 {:.1}/5，总分 {}/{}",
                dimension.ability_dimension, avg, dimension.total_score, dimension.max_score
            ));
        } else if avg <= WEAKNESS_THRESHOLD {
            weaknesses.push(format!(
                "{}：平均得分 {:.1}/5，总分 {}/{}，建议加强",
                dimension.ability_dimension, avg, dimension.total_score, dimension.max_score
            ));
        }
    }

    let advantage = if advantages.is_empty() {
        "各项能力均衡".to_string()
    } else {
        advantages.join("\n")
    };
    let weakness = if weaknesses.is_empty() {
        "无明显短板".to_string()
    } else {
        weaknesses.join("\n")
    };

    (advantage, weakness)
}

fn unmet_requirements(detail: &MatchDetail) -> String {
    if detail.mandatory_check.is_meet {
        return String::new();
    }

    detail
        .mandatory_check
        .details
        .iter()
        .filter(|check| !check.is_meet)
        .map(|check| check.requirement_item.as_str())
        .collect::<Vec<_>>()
        .join("、")
}

fn build_suggestions(detail: &MatchDetail, level: MatchLevel) -> String {
    let mut lines = vec![match level {
        MatchLevel::Excellent => "该干部与岗位匹配度优质，建议优先考虑。".to_string(),
        MatchLevel::Qualified => "该干部与岗位匹配度合格，建议根据实际情况综合考虑。".to_string(),
        MatchLevel::Unqualified => "该干部与岗位匹配度不合格，建议考虑其他候选人。".to_string(),
    }];

    if !detail.deduction.details.is_empty() {
        let items = detail
            .deduction
            .details
            .iter()
            .map(|d| d.requirement_item.as_str())
            .collect::<Vec<_>>()
            .join("、");
        lines.push(format!("建议关注以下方面：{items}"));
    }

    lines.join("\n")
}

fn radar_data(detail: &MatchDetail) -> RadarData {
    let mut dimensions = Vec::new();
    let mut scores = Vec::new();

    for dimension in &detail.base_score_details {
        if dimension.scores.is_empty() {
            continue;
        }
        let avg = dimension.total_score / dimension.scores.len() as f64;
        dimensions.push(dimension.ability_dimension.clone());
        scores.push(round2(avg));
    }

    RadarData { dimensions, scores }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::requirements::{DeductionItem, RequirementCheck};
    use crate::matching::scoring::{Deduction, DimensionDetail, MandatoryCheck};

    fn dimension(name: &str, scores: Vec<f64>) -> DimensionDetail {
        let total: f64 = scores.iter().sum();
        let max = scores.len() as f64 * 5.0;
        DimensionDetail {
            ability_dimension: name.into(),
            weight: 50.0,
            total_score: total,
            max_score: max,
            percentage_score: total / max * 100.0,
            weighted_contribution: 0.0,
            scores,
        }
    }

    fn detail(dimensions: Vec<DimensionDetail>) -> MatchDetail {
        MatchDetail {
            base_score: 70.0,
            base_score_details: dimensions,
            mandatory_check: MandatoryCheck {
                is_meet: true,
                details: vec![],
            },
            deduction: Deduction {
                total_deduction: 0.0,
                details: vec![],
            },
        }
    }

    #[test]
    fn strong_dimension_becomes_advantage_line() {
        let report = build_report(
            &detail(vec![dimension("领导力", vec![5.0, 4.0, 4.0])]),
            MatchLevel::Excellent,
        );

        assert!(report.advantage.contains("领导力"));
        assert!(report.advantage.contains("平均得分 4.3/5"));
        assert_eq!(report.weakness, "无明显短板");
    }

    #[test]
    fn weak_dimension_becomes_weakness_line() {
        let report = build_report(
            &detail(vec![dimension("专业能力", vec![2.0, 1.5])]),
            MatchLevel::Unqualified,
        );

        assert_eq!(report.advantage, "各项能力均衡");
        assert!(report.weakness.contains("专业能力"));
        assert!(report.weakness.contains("建议加强"));
    }

    #[test]
    fn neutral_dimensions_get_default_statements() {
        let report = build_report(
            &detail(vec![dimension("执行力", vec![3.0, 3.0])]),
            MatchLevel::Qualified,
        );

        assert_eq!(report.advantage, "各项能力均衡");
        assert_eq!(report.weakness, "无明显短板");
    }

    #[test]
    fn unmet_mandatory_items_are_joined() {
        let mut d = detail(vec![]);
        d.mandatory_check = MandatoryCheck {
            is_meet: false,
            details: vec![
                RequirementCheck {
                    requirement_item: "学历".into(),
                    requirement_value: "硕士".into(),
                    is_meet: false,
                },
                RequirementCheck {
                    requirement_item: "证书".into(),
                    requirement_value: r#"["CPA"]"#.into(),
                    is_meet: false,
                },
                RequirementCheck {
                    requirement_item: "岗位经验年限".into(),
                    requirement_value: "5".into(),
                    is_meet: true,
                },
            ],
        };

        let report = build_report(&d, MatchLevel::Unqualified);
        assert_eq!(report.unmet_requirements, "学历、证书");
    }

    #[test]
    fn met_mandatory_leaves_unmet_list_empty() {
        let report = build_report(&detail(vec![]), MatchLevel::Qualified);
        assert!(report.unmet_requirements.is_empty());
    }

    #[test]
    fn suggestions_follow_level_and_deduction_items() {
        let mut d = detail(vec![]);
        d.deduction = Deduction {
            total_deduction: 6.0,
            details: vec![DeductionItem {
                requirement_item: "项目经验数".into(),
                deduction_score: 6.0,
                is_meet: false,
            }],
        };

        let report = build_report(&d, MatchLevel::Qualified);
        assert!(report.suggestions.contains("匹配度合格"));
        assert!(report.suggestions.contains("建议关注以下方面：项目经验数"));
    }

    #[test]
    fn radar_series_are_parallel_dimension_averages() {
        let report = build_report(
            &detail(vec![
                dimension("执行力", vec![5.0, 4.0, 3.0]),
                dimension("潜力", vec![2.0, 2.0]),
            ]),
            MatchLevel::Qualified,
        );

        assert_eq!(report.radar.dimensions, vec!["执行力", "潜力"]);
        assert_eq!(report.radar.scores, vec![4.0, 2.0]);
    }
}
