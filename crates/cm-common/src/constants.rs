//! 能力维度/标签目录与各类字典常量。

/// 能力维度与标签映射表（维度 → 标签列表）
pub const ABILITY_DIMENSIONS: &[(&str, &[&str])] = &[
    ("政治素养", &["政治判断力", "政策执行力", "廉洁自律"]),
    ("职业素养", &["责任心", "敬业度", "保密意识"]),
    ("领导力", &["战略思维", "团队建设", "跨部门协同"]),
    ("专业能力", &["业务精通度", "数字化能力", "创新突破"]),
    ("执行力", &["任务完成率", "应急处突", "成本控制"]),
    ("个性特质", &["抗压能力", "情绪稳定性", "适应性"]),
    ("潜力", &["学习敏锐度", "成长意愿", "未来胜任力"]),
    ("履历与业绩", &["行业经验", "管理年限", "重大项目经验", "业绩贡献"]),
];

/// 管理层级（从上到下）
pub const MANAGEMENT_LEVELS: [&str; 4] = ["战略层", "经营层", "中层", "基层"];

/// 学历阶梯（从低到高）。序数比较用。
pub const EDUCATION_LADDER: [&str; 5] = ["高中", "大专", "本科", "硕士", "博士"];

/// 单个能力标签的满分
pub const FULL_TAG_SCORE: f64 = 5.0;

pub fn tags_by_dimension(dimension: &str) -> Option<&'static [&'static str]> {
    ABILITY_DIMENSIONS
        .iter()
        .find(|(name, _)| *name == dimension)
        .map(|(_, tags)| *tags)
}

/// 学历在阶梯中的序数。未知学历返回 None。
pub fn education_rank(education: &str) -> Option<usize> {
    EDUCATION_LADDER.iter().position(|e| *e == education)
}

/// 考核等级折算分值（绩效平均分指标用）
pub fn grade_points(grade: &str) -> Option<f64> {
    match grade {
        "S" => Some(5.0),
        "A" => Some(4.0),
        "B+" => Some(3.5),
        "B" => Some(3.0),
        "B-" => Some(2.5),
        "C" => Some(2.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_lookup_returns_tags() {
        let tags = tags_by_dimension("执行力").unwrap();
        assert_eq!(tags, &["任务完成率", "应急处突", "成本控制"]);
        assert!(tags_by_dimension("不存在的维度").is_none());
    }

    #[test]
    fn education_ladder_orders_degrees() {
        assert!(education_rank("博士").unwrap() > education_rank("本科").unwrap());
        assert!(education_rank("大专").unwrap() < education_rank("硕士").unwrap());
        assert!(education_rank("函授").is_none());
    }

    #[test]
    fn grade_points_cover_known_grades() {
        assert_eq!(grade_points("S"), Some(5.0));
        assert_eq!(grade_points("B+"), Some(3.5));
        assert_eq!(grade_points("D"), None);
    }
}
