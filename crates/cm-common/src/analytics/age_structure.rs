use chrono::NaiveDate;
use serde::Serialize;

use super::{age_on, percentage, CadreOverview};
use crate::constants::MANAGEMENT_LEVELS;

/// 年龄段定义：(key, 展示标签, 图例颜色)
pub const AGE_BANDS: [(&str, &str, &str); 4] = [
    ("le_35", "≤35岁", "#4ade80"),
    ("36_45", "36-45岁", "#60a5fa"),
    ("46_55", "46-55岁", "#fbbf24"),
    ("ge_56", "≥56岁", "#f87171"),
];

/// 年龄落入的年龄段 key。边界：35 归 ≤35，36 归 36-45。
pub fn age_band_key(age: i32) -> &'static str {
    if age <= 35 {
        "le_35"
    } else if age <= 45 {
        "36_45"
    } else if age <= 55 {
        "46_55"
    } else {
        "ge_56"
    }
}

/// 单个层级×年龄段的桶
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBucket {
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub count: usize,
    pub percentage: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub personnel: Vec<PersonnelEntry>,
}

/// 详情口径下桶内的人员条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonnelEntry {
    pub id: i64,
    pub employee_no: String,
    pub name: String,
    pub gender: Option<String>,
    pub age: i32,
    pub birth_date: Option<NaiveDate>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub job_grade: Option<i32>,
    pub education: Option<String>,
    pub political_status: Option<String>,
    pub entry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierRow {
    pub level: &'static str,
    pub total: usize,
    pub age_distribution: Vec<AgeBucket>,
}

/// 干部梯队与年龄结构（金字塔）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeStructure {
    pub levels: Vec<&'static str>,
    pub data: Vec<TierRow>,
    pub total_count: usize,
}

/// 按管理层级 × 年龄段统计在职干部。
/// `include_personnel` 为 true 时每个桶附带人员清单（详情口径）。
/// 无管理层级或无出生日期的干部不计入。
pub fn age_structure(
    cadres: &[CadreOverview],
    today: NaiveDate,
    include_personnel: bool,
) -> AgeStructure {
    let mut data: Vec<TierRow> = MANAGEMENT_LEVELS
        .iter()
        .copied()
        .map(|level| TierRow {
            level,
            total: 0,
            age_distribution: AGE_BANDS
                .iter()
                .copied()
                .map(|(key, label, color)| AgeBucket {
                    key,
                    label,
                    color,
                    count: 0,
                    percentage: 0.0,
                    personnel: Vec::new(),
                })
                .collect(),
        })
        .collect();

    let mut total_count = 0;
    for cadre in cadres {
        let Some(level) = cadre.management_level.as_deref() else {
            continue;
        };
        let Some(tier) = data.iter_mut().find(|t| t.level == level) else {
            continue;
        };
        let Some(birth_date) = cadre.birth_date else {
            continue;
        };

        let age = age_on(birth_date, today);
        let band_key = age_band_key(age);
        let Some(band_idx) = tier.age_distribution.iter().position(|b| b.key == band_key) else {
            continue;
        };

        total_count += 1;
        tier.total += 1;
        let bucket = &mut tier.age_distribution[band_idx];
        bucket.count += 1;

        if include_personnel {
            bucket.personnel.push(PersonnelEntry {
                id: cadre.id,
                employee_no: cadre.employee_no.clone(),
                name: cadre.name.clone(),
                gender: cadre.gender.clone(),
                age,
                birth_date: cadre.birth_date,
                department: cadre.department_name.clone(),
                position: cadre.position_name.clone(),
                job_grade: cadre.job_grade,
                education: cadre.education.clone(),
                political_status: cadre.political_status.clone(),
                entry_date: cadre.entry_date,
            });
        }
    }

    for tier in &mut data {
        for bucket in &mut tier.age_distribution {
            bucket.percentage = percentage(bucket.count, tier.total);
        }
    }

    AgeStructure {
        levels: MANAGEMENT_LEVELS.to_vec(),
        data,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
    }

    fn cadre(id: i64, level: &str, birth: (i32, u32, u32)) -> CadreOverview {
        CadreOverview {
            id,
            employee_no: format!("E{id:03}"),
            name: format!("干部{id}"),
            management_level: Some(level.into()),
            birth_date: NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2),
            ..CadreOverview::default()
        }
    }

    #[test]
    fn band_boundary_puts_35_low_and_36_high() {
        assert_eq!(age_band_key(35), "le_35");
        assert_eq!(age_band_key(36), "36_45");
        assert_eq!(age_band_key(45), "36_45");
        assert_eq!(age_band_key(46), "46_55");
        assert_eq!(age_band_key(55), "46_55");
        assert_eq!(age_band_key(56), "ge_56");
    }

    #[test]
    fn buckets_by_tier_and_band_with_tier_local_percentages() {
        let cadres = vec![
            cadre(1, "中层", (1991, 1, 1)),  // 35 → le_35
            cadre(2, "中层", (1990, 6, 1)),  // 36 → 36_45
            cadre(3, "基层", (1998, 1, 1)),  // 28 → le_35
        ];

        let structure = age_structure(&cadres, today(), false);
        assert_eq!(structure.total_count, 3);

        let middle = structure.data.iter().find(|t| t.level == "中层").unwrap();
        assert_eq!(middle.total, 2);
        let le_35 = middle.age_distribution.iter().find(|b| b.key == "le_35").unwrap();
        assert_eq!(le_35.count, 1);
        assert_eq!(le_35.percentage, 50.0);

        let grassroots = structure.data.iter().find(|t| t.level == "基层").unwrap();
        let le_35 = grassroots.age_distribution.iter().find(|b| b.key == "le_35").unwrap();
        assert_eq!(le_35.percentage, 100.0);
    }

    #[test]
    fn skips_cadres_without_tier_or_birth_date() {
        let mut unknown_tier = cadre(1, "未知层级", (1980, 1, 1));
        unknown_tier.management_level = Some("未知层级".into());
        let mut no_birth = cadre(2, "基层", (1980, 1, 1));
        no_birth.birth_date = None;

        let structure = age_structure(&[unknown_tier, no_birth], today(), false);
        assert_eq!(structure.total_count, 0);
    }

    #[test]
    fn details_variant_carries_personnel_roster() {
        let structure = age_structure(&[cadre(7, "经营层", (1965, 2, 1))], today(), true);

        let tier = structure.data.iter().find(|t| t.level == "经营层").unwrap();
        let bucket = tier.age_distribution.iter().find(|b| b.key == "ge_56").unwrap();
        assert_eq!(bucket.personnel.len(), 1);
        assert_eq!(bucket.personnel[0].name, "干部7");
        assert_eq!(bucket.personnel[0].age, 61);
    }

    #[test]
    fn summary_variant_keeps_buckets_empty_of_personnel() {
        let structure = age_structure(&[cadre(7, "经营层", (1965, 2, 1))], today(), false);
        let tier = structure.data.iter().find(|t| t.level == "经营层").unwrap();
        assert!(tier.age_distribution.iter().all(|b| b.personnel.is_empty()));
    }
}
