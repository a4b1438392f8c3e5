use serde::Serialize;

use crate::models::assignments::entities::AssignmentRecord;
use crate::queries::QueryContext;
use crate::queries::grades::{
    ClassTrend, GradeAdvice, GradeStats, class_trends, grade_advice, grade_stats,
};
use crate::queries::progress::{WeeklyProgress, weekly_progress};
use crate::queries::submissions::{TOP_PENDING_LIMIT, top_pending_work};
use crate::queries::updates::{UpdateItem, latest_updates};
use crate::sync::MirrorView;

/// 首页汇总，供展示层一次性读取
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub user_id: Option<String>,
    pub weekly_progress: WeeklyProgress,
    pub pending_work: Vec<AssignmentRecord>,
    pub latest_updates: Vec<UpdateItem>,
    pub grade_stats: GradeStats,
    pub class_trends: Vec<ClassTrend>,
    pub grade_advice: Option<GradeAdvice>,
}

impl DashboardSummary {
    pub fn build(view: &MirrorView, ctx: &QueryContext) -> Self {
        let class_trends = class_trends(view);
        Self {
            user_id: ctx.user().map(str::to_string),
            weekly_progress: weekly_progress(view, ctx),
            pending_work: top_pending_work(view, ctx, TOP_PENDING_LIMIT)
                .into_iter()
                .cloned()
                .collect(),
            latest_updates: latest_updates(view, ctx),
            grade_stats: grade_stats(view),
            grade_advice: grade_advice(&class_trends),
            class_trends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::{context, entity};
    use serde_json::json;

    #[test]
    fn test_summary_for_signed_out_user() {
        let view = MirrorView::builder()
            .classes(vec![entity("c1", json!({ "classStudents": ["u1"] }))])
            .assignments(vec![entity("a1", json!({ "classID": "c1" }))])
            .build();
        let summary = DashboardSummary::build(&view, &context(None));
        assert!(summary.user_id.is_none());
        assert!(summary.pending_work.is_empty());
        assert_eq!(summary.weekly_progress.progress_ratio, 0.0);

        let summary = DashboardSummary::build(&view, &context(Some("u1")));
        assert_eq!(summary.pending_work.len(), 1);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["latest_updates"][0]["kind"], "Assignment");
    }

    #[test]
    fn test_summary_limits_pending_work() {
        let assignments = (0..12)
            .map(|i| entity(&format!("a{i:02}"), json!({ "classID": "c1", "assignmentDueDate": 100 - i })))
            .collect();
        let view = MirrorView::builder()
            .classes(vec![entity("c1", json!({ "classStudents": ["u1"] }))])
            .assignments(assignments)
            .build();
        let summary = DashboardSummary::build(&view, &context(Some("u1")));
        assert_eq!(summary.pending_work.len(), TOP_PENDING_LIMIT);
        assert_eq!(summary.pending_work[0].id, "a11");
        assert!(summary.grade_advice.is_some());
    }
}
