use serde::Serialize;

use super::percentage;
use crate::matching::requirements::round2;
use crate::matching::scoring::MatchLevel;

/// 当前岗位匹配结果的统计输入行
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentMatchRow {
    pub final_score: f64,
    pub match_level: MatchLevel,
    pub is_key_position: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelSlice {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelDistribution {
    pub excellent: LevelSlice,
    pub qualified: LevelSlice,
    pub unqualified: LevelSlice,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchBandStats {
    pub total_count: usize,
    pub avg_score: f64,
    pub level_distribution: LevelDistribution,
}

/// 匹配度统计：全员口径 + 关键岗位口径
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchStatistics {
    pub overall: MatchBandStats,
    pub key_position: MatchBandStats,
}

/// 对当前岗位匹配结果做两个口径的汇总。
pub fn summarize_matches(rows: &[CurrentMatchRow]) -> MatchStatistics {
    MatchStatistics {
        overall: summarize_band(rows.iter()),
        key_position: summarize_band(rows.iter().filter(|r| r.is_key_position)),
    }
}

fn summarize_band<'a>(rows: impl Iterator<Item = &'a CurrentMatchRow>) -> MatchBandStats {
    let rows: Vec<&CurrentMatchRow> = rows.collect();
    let total = rows.len();
    if total == 0 {
        return MatchBandStats::default();
    }

    let sum: f64 = rows.iter().map(|r| r.final_score).sum();
    let count_of = |level: MatchLevel| rows.iter().filter(|r| r.match_level == level).count();

    let slice = |level: MatchLevel| {
        let count = count_of(level);
        LevelSlice {
            count,
            percentage: percentage(count, total),
        }
    };

    MatchBandStats {
        total_count: total,
        avg_score: round2(sum / total as f64),
        level_distribution: LevelDistribution {
            excellent: slice(MatchLevel::Excellent),
            qualified: slice(MatchLevel::Qualified),
            unqualified: slice(MatchLevel::Unqualified),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(score: f64, level: MatchLevel, key: bool) -> CurrentMatchRow {
        CurrentMatchRow {
            final_score: score,
            match_level: level,
            is_key_position: key,
        }
    }

    #[test]
    fn empty_input_yields_zeroed_statistics() {
        let stats = summarize_matches(&[]);
        assert_eq!(stats.overall.total_count, 0);
        assert_eq!(stats.overall.avg_score, 0.0);
        assert_eq!(stats.key_position.level_distribution.excellent.count, 0);
    }

    #[test]
    fn splits_overall_and_key_position_bands() {
        let rows = vec![
            row(90.0, MatchLevel::Excellent, true),
            row(70.0, MatchLevel::Qualified, false),
            row(50.0, MatchLevel::Unqualified, true),
        ];

        let stats = summarize_matches(&rows);

        assert_eq!(stats.overall.total_count, 3);
        assert_eq!(stats.overall.avg_score, 70.0);
        assert_eq!(stats.overall.level_distribution.qualified.count, 1);

        assert_eq!(stats.key_position.total_count, 2);
        assert_eq!(stats.key_position.avg_score, 70.0);
        assert_eq!(stats.key_position.level_distribution.excellent.count, 1);
        assert_eq!(stats.key_position.level_distribution.qualified.count, 0);
    }

    #[test]
    fn percentages_are_within_tier_not_global() {
        let rows = vec![
            row(85.0, MatchLevel::Excellent, true),
            row(82.0, MatchLevel::Excellent, true),
            row(65.0, MatchLevel::Qualified, false),
            row(64.0, MatchLevel::Qualified, false),
        ];

        let stats = summarize_matches(&rows);
        assert_eq!(stats.overall.level_distribution.excellent.percentage, 50.0);
        assert_eq!(stats.key_position.level_distribution.excellent.percentage, 100.0);
    }
}
