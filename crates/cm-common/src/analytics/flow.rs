use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{age_on, percentage, CadreOverview};
use crate::constants::MANAGEMENT_LEVELS;

const TREND_YEARS: i32 = 5;

/// 来源分类：内部培养（多于一条职务变更记录）/ 外部引进
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Internal,
    External,
}

impl SourceType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Internal => "内部培养",
            Self::External => "外部引进",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "internal" => Some(Self::Internal),
            "external" => Some(Self::External),
            _ => None,
        }
    }
}

/// 来源/流动分析的单干部输入。
/// `appointment_start_dates` 为职务变更记录的任期开始日期（按时间升序，可含 None）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowInput {
    pub cadre: CadreOverview,
    pub appointment_start_dates: Vec<Option<NaiveDate>>,
}

impl FlowInput {
    /// 多于一条职务变更记录视为内部培养
    pub fn source_type(&self) -> SourceType {
        if self.appointment_start_dates.len() > 1 {
            SourceType::Internal
        } else {
            SourceType::External
        }
    }

    /// 流动年份：内部培养取首次职务变更年份，外部引进取入职年份
    pub fn flow_year(&self) -> Option<i32> {
        match self.source_type() {
            SourceType::Internal => self
                .appointment_start_dates
                .first()
                .copied()
                .flatten()
                .map(|d| d.year()),
            SourceType::External => self.cadre.entry_date.map(|d| d.year()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceSlice {
    pub count: usize,
    pub percentage: f64,
    pub label: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceDistribution {
    pub internal: SourceSlice,
    pub external: SourceSlice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSourceRow {
    pub level: &'static str,
    pub total: usize,
    pub internal: usize,
    pub external: usize,
    pub internal_percentage: f64,
    pub external_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowTrendRow {
    pub year: String,
    pub total: usize,
    pub internal: usize,
    pub external: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceFlowStatistics {
    pub total_count: usize,
    pub source_distribution: SourceDistribution,
    pub source_by_level: Vec<LevelSourceRow>,
    pub flow_trend: Vec<FlowTrendRow>,
}

/// 来源占比 + 分层分布 + 近 5 年流动趋势。
pub fn source_and_flow(inputs: &[FlowInput], current_year: i32) -> SourceFlowStatistics {
    let mut internal_count = 0;
    let mut external_count = 0;
    let mut by_level = vec![(0usize, 0usize); MANAGEMENT_LEVELS.len()];
    let year_range: Vec<i32> = (current_year - TREND_YEARS..=current_year).collect();
    let mut by_year = vec![(0usize, 0usize); year_range.len()];

    for input in inputs {
        let source = input.source_type();
        match source {
            SourceType::Internal => internal_count += 1,
            SourceType::External => external_count += 1,
        }

        if let Some(level) = input.cadre.management_level.as_deref() {
            if let Some(idx) = MANAGEMENT_LEVELS.iter().position(|l| *l == level) {
                match source {
                    SourceType::Internal => by_level[idx].0 += 1,
                    SourceType::External => by_level[idx].1 += 1,
                }
            }
        }

        if let Some(year) = input.flow_year() {
            if let Some(idx) = year_range.iter().position(|y| *y == year) {
                match source {
                    SourceType::Internal => by_year[idx].0 += 1,
                    SourceType::External => by_year[idx].1 += 1,
                }
            }
        }
    }

    let total_count = internal_count + external_count;

    SourceFlowStatistics {
        total_count,
        source_distribution: SourceDistribution {
            internal: SourceSlice {
                count: internal_count,
                percentage: percentage(internal_count, total_count),
                label: SourceType::Internal.label(),
            },
            external: SourceSlice {
                count: external_count,
                percentage: percentage(external_count, total_count),
                label: SourceType::External.label(),
            },
        },
        source_by_level: MANAGEMENT_LEVELS
            .iter()
            .copied()
            .zip(by_level)
            .map(|(level, (internal, external))| {
                let total = internal + external;
                LevelSourceRow {
                    level,
                    total,
                    internal,
                    external,
                    internal_percentage: percentage(internal, total),
                    external_percentage: percentage(external, total),
                }
            })
            .collect(),
        flow_trend: year_range
            .iter()
            .zip(by_year)
            .map(|(year, (internal, external))| FlowTrendRow {
                year: year.to_string(),
                total: internal + external,
                internal,
                external,
            })
            .collect(),
    }
}

/// 流动干部详情行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowCadreRow {
    pub id: i64,
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub management_level: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub source_type: SourceType,
    pub source_type_name: &'static str,
    pub flow_year: Option<i32>,
    pub entry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowCadreList {
    pub total: usize,
    pub cadres: Vec<FlowCadreRow>,
}

/// 流动干部明细（近 5 年），支持按年份与来源类型筛选，按流动年份倒序。
pub fn flow_details(
    inputs: &[FlowInput],
    today: NaiveDate,
    year_filter: Option<i32>,
    source_filter: Option<SourceType>,
) -> FlowCadreList {
    let current_year = today.year();

    let mut cadres: Vec<FlowCadreRow> = inputs
        .iter()
        .filter_map(|input| {
            let source = input.source_type();
            let flow_year = input.flow_year();

            match flow_year {
                Some(year) if year >= current_year - TREND_YEARS => {}
                _ => return None,
            }
            if let Some(filter) = year_filter {
                if flow_year != Some(filter) {
                    return None;
                }
            }
            if let Some(filter) = source_filter {
                if source != filter {
                    return None;
                }
            }

            Some(FlowCadreRow {
                id: input.cadre.id,
                name: input.cadre.name.clone(),
                gender: input.cadre.gender.clone(),
                age: input.cadre.birth_date.map(|birth| age_on(birth, today)),
                management_level: input.cadre.management_level.clone(),
                position: input.cadre.position_name.clone(),
                department: input.cadre.department_name.clone(),
                source_type: source,
                source_type_name: source.label(),
                flow_year,
                entry_date: input.cadre.entry_date,
            })
        })
        .collect();

    cadres.sort_by(|a, b| b.flow_year.unwrap_or(0).cmp(&a.flow_year.unwrap_or(0)));

    FlowCadreList {
        total: cadres.len(),
        cadres,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cadre(id: i64, level: &str, entry: (i32, u32, u32)) -> CadreOverview {
        CadreOverview {
            id,
            employee_no: format!("E{id:03}"),
            name: format!("干部{id}"),
            management_level: Some(level.into()),
            entry_date: NaiveDate::from_ymd_opt(entry.0, entry.1, entry.2),
            ..CadreOverview::default()
        }
    }

    fn internal_input(id: i64, level: &str, first_term: (i32, u32, u32)) -> FlowInput {
        FlowInput {
            cadre: cadre(id, level, (2010, 1, 1)),
            appointment_start_dates: vec![
                NaiveDate::from_ymd_opt(first_term.0, first_term.1, first_term.2),
                NaiveDate::from_ymd_opt(first_term.0 + 2, first_term.1, first_term.2),
            ],
        }
    }

    fn external_input(id: i64, level: &str, entry: (i32, u32, u32)) -> FlowInput {
        FlowInput {
            cadre: cadre(id, level, entry),
            appointment_start_dates: vec![],
        }
    }

    #[test]
    fn multiple_appointment_records_mean_internal() {
        assert_eq!(
            internal_input(1, "中层", (2023, 1, 1)).source_type(),
            SourceType::Internal
        );
        assert_eq!(
            external_input(2, "中层", (2023, 1, 1)).source_type(),
            SourceType::External
        );
        // 单条记录仍视为外部引进
        let single = FlowInput {
            cadre: cadre(3, "中层", (2023, 1, 1)),
            appointment_start_dates: vec![NaiveDate::from_ymd_opt(2023, 1, 1)],
        };
        assert_eq!(single.source_type(), SourceType::External);
    }

    #[test]
    fn flow_year_depends_on_source() {
        assert_eq!(internal_input(1, "中层", (2023, 5, 1)).flow_year(), Some(2023));
        assert_eq!(external_input(2, "中层", (2024, 3, 1)).flow_year(), Some(2024));
    }

    #[test]
    fn distribution_counts_and_percentages() {
        let inputs = vec![
            internal_input(1, "中层", (2024, 1, 1)),
            internal_input(2, "基层", (2023, 1, 1)),
            external_input(3, "中层", (2025, 1, 1)),
            external_input(4, "战略层", (2022, 1, 1)),
        ];

        let stats = source_and_flow(&inputs, 2026);
        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.source_distribution.internal.count, 2);
        assert_eq!(stats.source_distribution.internal.percentage, 50.0);
        assert_eq!(stats.source_distribution.external.label, "外部引进");

        let middle = stats.source_by_level.iter().find(|r| r.level == "中层").unwrap();
        assert_eq!(middle.internal, 1);
        assert_eq!(middle.external, 1);
        assert_eq!(middle.internal_percentage, 50.0);
    }

    #[test]
    fn trend_covers_last_five_years_inclusive() {
        let inputs = vec![
            internal_input(1, "中层", (2024, 1, 1)),
            external_input(2, "中层", (2021, 1, 1)),
            external_input(3, "中层", (2015, 1, 1)), // 窗口外
        ];

        let stats = source_and_flow(&inputs, 2026);
        assert_eq!(stats.flow_trend.len(), 6);
        assert_eq!(stats.flow_trend.first().unwrap().year, "2021");
        assert_eq!(stats.flow_trend.last().unwrap().year, "2026");

        let y2024 = stats.flow_trend.iter().find(|r| r.year == "2024").unwrap();
        assert_eq!(y2024.internal, 1);
        let y2021 = stats.flow_trend.iter().find(|r| r.year == "2021").unwrap();
        assert_eq!(y2021.external, 1);
    }

    #[test]
    fn details_filter_by_year_and_source() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let inputs = vec![
            internal_input(1, "中层", (2024, 1, 1)),
            external_input(2, "中层", (2024, 3, 1)),
            external_input(3, "中层", (2023, 3, 1)),
            external_input(4, "中层", (2010, 1, 1)), // 窗口外
        ];

        let all = flow_details(&inputs, today, None, None);
        assert_eq!(all.total, 3);
        // 按年份倒序
        assert!(all.cadres[0].flow_year >= all.cadres[1].flow_year);

        let only_2024 = flow_details(&inputs, today, Some(2024), None);
        assert_eq!(only_2024.total, 2);

        let internal_only = flow_details(&inputs, today, None, Some(SourceType::Internal));
        assert_eq!(internal_only.total, 1);
        assert_eq!(internal_only.cadres[0].id, 1);
    }
}
