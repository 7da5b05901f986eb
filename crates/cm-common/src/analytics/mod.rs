pub mod age_structure;
pub mod flow;
pub mod portrait;
pub mod risk;
pub mod statistics;

use chrono::NaiveDate;
use serde::Serialize;

/// 分析统计共用的干部概览行（基础信息 + 部门/岗位名称快照）。
/// 由 db 层联表查询装配，分析函数本身只做纯计算。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CadreOverview {
    pub id: i64,
    pub employee_no: String,
    pub name: String,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub education: Option<String>,
    pub political_status: Option<String>,
    pub entry_date: Option<NaiveDate>,
    pub management_level: Option<String>,
    pub job_grade: Option<i32>,
    pub position_id: Option<i64>,
    pub position_name: Option<String>,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
}

/// 周岁。生日未过减一。
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    crate::matching::requirements::whole_years_between(birth_date, today)
}

pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    crate::matching::requirements::round2(count as f64 / total as f64 * 100.0)
}
