use std::collections::BTreeMap;

use crate::constants::FULL_TAG_SCORE;
use crate::AbilityScore;

/// 单个维度的聚合结果：标签分列表、维度总分、维度满分、百分制分数。
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionAggregate {
    pub dimension: String,
    pub scores: Vec<f64>,
    pub total: f64,
    pub max: f64,
    pub percentage: f64,
}

/// 按维度聚合一名干部的能力评分。
///
/// 维度总分 = 标签分相加；维度满分 = 标签数 × 5；百分制 = 总分/满分 × 100。
/// 没有评分的维度不出现在结果中（缺失维度对基础分贡献 0，不做零填充）。
pub fn aggregate_scores(scores: &[AbilityScore]) -> BTreeMap<String, DimensionAggregate> {
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for score in scores {
        grouped
            .entry(score.dimension.clone())
            .or_default()
            .push(score.score);
    }

    grouped
        .into_iter()
        .map(|(dimension, scores)| {
            let total: f64 = scores.iter().sum();
            let max = scores.len() as f64 * FULL_TAG_SCORE;
            let percentage = total / max * 100.0;
            (
                dimension.clone(),
                DimensionAggregate {
                    dimension,
                    scores,
                    total,
                    max,
                    percentage,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(dimension: &str, tag: &str, value: f64) -> AbilityScore {
        AbilityScore {
            cadre_id: 1,
            dimension: dimension.into(),
            tag: tag.into(),
            score: value,
        }
    }

    #[test]
    fn empty_score_set_yields_empty_map() {
        assert!(aggregate_scores(&[]).is_empty());
    }

    #[test]
    fn aggregates_execution_dimension_to_eighty_percent() {
        let scores = vec![
            score("执行力", "任务完成率", 5.0),
            score("执行力", "应急处突", 4.0),
            score("执行力", "成本控制", 3.0),
        ];

        let aggregates = aggregate_scores(&scores);
        let execution = aggregates.get("执行力").unwrap();

        assert_eq!(execution.total, 12.0);
        assert_eq!(execution.max, 15.0);
        assert!((execution.percentage - 80.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_is_hundred_only_when_all_tags_full() {
        let full = vec![score("领导力", "战略思维", 5.0), score("领导力", "团队建设", 5.0)];
        let aggregates = aggregate_scores(&full);
        assert_eq!(aggregates.get("领导力").unwrap().percentage, 100.0);

        let not_full = vec![score("领导力", "战略思维", 5.0), score("领导力", "团队建设", 4.9)];
        let aggregates = aggregate_scores(&not_full);
        assert!(aggregates.get("领导力").unwrap().percentage < 100.0);
    }

    #[test]
    fn groups_dimensions_independently() {
        let scores = vec![
            score("执行力", "任务完成率", 2.0),
            score("潜力", "学习敏锐度", 4.0),
            score("潜力", "成长意愿", 3.0),
        ];

        let aggregates = aggregate_scores(&scores);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates.get("执行力").unwrap().scores, vec![2.0]);
        assert_eq!(aggregates.get("潜力").unwrap().total, 7.0);
    }

    #[test]
    fn percentages_stay_in_valid_range() {
        let scores = vec![
            score("职业素养", "责任心", 1.0),
            score("职业素养", "敬业度", 1.0),
        ];

        let aggregates = aggregate_scores(&scores);
        let pct = aggregates.get("职业素养").unwrap().percentage;
        assert!((0.0..=100.0).contains(&pct));
        assert!((pct - 20.0).abs() < 1e-9);
    }
}
