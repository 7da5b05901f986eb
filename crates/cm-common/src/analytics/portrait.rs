use serde::Serialize;

use super::CadreOverview;

const HIGH_PERFORMANCE_COUNT: u32 = 2;
const MEDIUM_PERFORMANCE_COUNT: u32 = 1;
const HIGH_MATCH_SCORE: f64 = 80.0;
const MEDIUM_MATCH_SCORE: f64 = 60.0;

/// 质量画像分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityType {
    /// 明星干部：高绩效 + 高匹配
    Star,
    /// 潜力干部：高绩效+中匹配 或 中绩效+高匹配
    Potential,
    /// 稳健干部：中绩效 + 中匹配
    Stable,
    /// 需调整：低绩效 或 低匹配
    Adjust,
}

impl QualityType {
    fn order(self) -> u8 {
        match self {
            Self::Star => 0,
            Self::Potential => 1,
            Self::Stable => 2,
            Self::Adjust => 3,
        }
    }
}

/// 画像输入：干部概览 + 近 3 年 A/S 绩效次数 + 当前岗位匹配分 + 核心项目数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortraitInput {
    pub cadre: CadreOverview,
    pub performance_count: u32,
    pub match_score: f64,
    pub core_project_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CadrePortrait {
    pub id: i64,
    pub name: String,
    pub employee_no: String,
    pub department: String,
    pub position: String,
    pub match_score: f64,
    pub performance_score: u32,
    pub core_project_count: u32,
    pub quality_type: QualityType,
}

/// 绩效 × 匹配的 2×2 分类。
pub fn classify(performance_count: u32, match_score: f64) -> QualityType {
    let high_performance = performance_count >= HIGH_PERFORMANCE_COUNT;
    let medium_performance = performance_count >= MEDIUM_PERFORMANCE_COUNT;
    let high_match = match_score >= HIGH_MATCH_SCORE;
    let medium_match = match_score >= MEDIUM_MATCH_SCORE;

    if high_performance && high_match {
        QualityType::Star
    } else if (high_performance && medium_match) || (medium_performance && high_match) {
        QualityType::Potential
    } else if medium_performance && medium_match {
        QualityType::Stable
    } else {
        QualityType::Adjust
    }
}

/// 全员质量画像，按类型（明星→需调整）、绩效次数（多→少）排序。
pub fn build_portraits(inputs: &[PortraitInput]) -> Vec<CadrePortrait> {
    let mut portraits: Vec<CadrePortrait> = inputs
        .iter()
        .map(|input| CadrePortrait {
            id: input.cadre.id,
            name: input.cadre.name.clone(),
            employee_no: input.cadre.employee_no.clone(),
            department: input
                .cadre
                .department_name
                .clone()
                .unwrap_or_else(|| "未分配".to_string()),
            position: input
                .cadre
                .position_name
                .clone()
                .unwrap_or_else(|| "未分配".to_string()),
            match_score: input.match_score,
            performance_score: input.performance_count,
            core_project_count: input.core_project_count,
            quality_type: classify(input.performance_count, input.match_score),
        })
        .collect();

    portraits.sort_by(|a, b| {
        a.quality_type
            .order()
            .cmp(&b.quality_type.order())
            .then(b.performance_score.cmp(&a.performance_score))
    });
    portraits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matrix_matches_thresholds() {
        assert_eq!(classify(2, 80.0), QualityType::Star);
        assert_eq!(classify(3, 95.0), QualityType::Star);
        assert_eq!(classify(2, 79.9), QualityType::Potential);
        assert_eq!(classify(1, 80.0), QualityType::Potential);
        assert_eq!(classify(1, 60.0), QualityType::Stable);
        assert_eq!(classify(0, 95.0), QualityType::Adjust);
        assert_eq!(classify(2, 59.9), QualityType::Adjust);
    }

    fn input(id: i64, performance: u32, score: f64) -> PortraitInput {
        PortraitInput {
            cadre: CadreOverview {
                id,
                employee_no: format!("E{id:03}"),
                name: format!("干部{id}"),
                ..CadreOverview::default()
            },
            performance_count: performance,
            match_score: score,
            core_project_count: 0,
        }
    }

    #[test]
    fn portraits_sort_by_type_then_performance() {
        let portraits = build_portraits(&[
            input(1, 0, 40.0), // adjust
            input(2, 2, 90.0), // star
            input(3, 3, 85.0), // star，绩效更多应排前
            input(4, 1, 65.0), // stable
        ]);

        let ids: Vec<i64> = portraits.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn missing_department_and_position_render_as_unassigned() {
        let portraits = build_portraits(&[input(1, 1, 70.0)]);
        assert_eq!(portraits[0].department, "未分配");
        assert_eq!(portraits[0].position, "未分配");
        assert_eq!(portraits[0].quality_type, QualityType::Stable);
    }
}
