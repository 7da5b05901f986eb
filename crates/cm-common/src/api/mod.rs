pub mod match_view;
pub mod report_view;

pub use match_view::{
    CadreSummary, ComparisonRow, DepartmentRef, MatchPreview, MatchResultView, PagedMatchResults,
    PositionComparison, PositionRef, PositionSummary,
};
pub use report_view::MatchReportView;
