//! 提交状态与待办作业

use std::collections::HashSet;

use crate::models::assignments::entities::AssignmentRecord;
use crate::queries::QueryContext;
use crate::queries::enrollment::{enrolled_class_ids, in_enrolled};
use crate::sync::MirrorView;
use crate::utils::{ids_equal, normalize_id};

/// 用户已提交的作业 ID（规范化后）
pub fn submitted_assignment_ids(view: &MirrorView, ctx: &QueryContext) -> HashSet<String> {
    let Some(user) = ctx.user() else {
        return HashSet::new();
    };
    view.submissions
        .iter()
        .filter(|s| ids_equal(s.submitter_id.as_deref(), Some(user)))
        .filter_map(|s| normalize_id(s.assignment_id.as_deref()).map(str::to_string))
        .collect()
}

pub fn has_submitted(view: &MirrorView, ctx: &QueryContext, assignment_id: &str) -> bool {
    let Some(user) = ctx.user() else {
        return false;
    };
    view.submissions.iter().any(|s| {
        ids_equal(s.submitter_id.as_deref(), Some(user))
            && ids_equal(s.assignment_id.as_deref(), Some(assignment_id))
    })
}

/// 是否存在 assignmentID 匹配的成绩记录
pub fn has_grade(view: &MirrorView, assignment_id: &str) -> bool {
    view.grades
        .iter()
        .any(|g| ids_equal(g.assignment_id.as_deref(), Some(assignment_id)))
}

/// 首页展示的待办作业条数
pub const TOP_PENDING_LIMIT: usize = 10;

/// 待办作业：属于已选班级、用户未提交、且没有对应成绩
///
/// 按截止时间升序，没有截止时间的排在最后；截止时间相同保持镜像顺序。
pub fn pending_work<'a>(view: &'a MirrorView, ctx: &QueryContext) -> Vec<&'a AssignmentRecord> {
    let enrolled = enrolled_class_ids(view, ctx);
    if enrolled.is_empty() {
        return Vec::new();
    }
    let submitted = submitted_assignment_ids(view, ctx);
    let graded: HashSet<&str> = view
        .grades
        .iter()
        .filter_map(|g| normalize_id(g.assignment_id.as_deref()))
        .collect();

    let mut pending: Vec<&AssignmentRecord> = view
        .assignments
        .iter()
        .filter(|a| in_enrolled(a.class_id.as_deref(), &enrolled))
        .filter(|a| {
            normalize_id(Some(&a.id)).is_none_or(|id| !submitted.contains(id) && !graded.contains(id))
        })
        .collect();
    pending.sort_by(|a, b| due_or_last(a).total_cmp(&due_or_last(b)));
    pending
}

fn due_or_last(assignment: &AssignmentRecord) -> f64 {
    assignment.due_date.unwrap_or(f64::INFINITY)
}

/// 截止时间最近的前 `limit` 条待办作业
pub fn top_pending_work<'a>(
    view: &'a MirrorView,
    ctx: &QueryContext,
    limit: usize,
) -> Vec<&'a AssignmentRecord> {
    let mut pending = pending_work(view, ctx);
    pending.truncate(limit);
    pending
}

/// 单个班级视图中仍需展示的作业：用户提交后隐藏，未登录时全部展示
pub fn visible_assignments<'a>(
    view: &'a MirrorView,
    ctx: &QueryContext,
    class_id: &str,
) -> Vec<&'a AssignmentRecord> {
    let submitted = submitted_assignment_ids(view, ctx);
    view.assignments
        .iter()
        .filter(|a| ids_equal(a.class_id.as_deref(), Some(class_id)))
        .filter(|a| normalize_id(Some(&a.id)).is_none_or(|id| !submitted.contains(id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::{context, entity};
    use serde_json::json;

    fn view() -> MirrorView {
        MirrorView::builder()
            .classes(vec![
                entity("c1", json!({ "classStudents": ["U"] })),
                entity("c2", json!({ "classStudents": ["V"] })),
            ])
            .assignments(vec![
                entity("A1", json!({ "classID": "c1" })),
                entity("A2", json!({ "classID": "c1" })),
                entity("A3", json!({ "classID": "c1" })),
                entity("A4", json!({ "classID": "c2" })),
            ])
            .submissions(vec![
                entity("s1", json!({ "assignmentSubmitterID": "U", "assignmentID": "A1 " })),
                entity("s2", json!({ "assignmentSubmitterID": "V", "assignmentID": "A2" })),
            ])
            .grades(vec![entity("g1", json!({ "assignmentID": "A3", "gradePoints": 5 }))])
            .build()
    }

    #[test]
    fn test_submission_status_uses_normalized_ids() {
        let view = view();
        let ctx = context(Some("U"));
        assert!(has_submitted(&view, &ctx, "A1"));
        assert!(!has_submitted(&view, &ctx, "A2"));
        assert!(!has_submitted(&view, &context(None), "A1"));
    }

    #[test]
    fn test_submitted_ungraded_is_not_pending() {
        let view = view();
        assert!(!has_grade(&view, "A1"));
        let pending: Vec<_> = pending_work(&view, &context(Some("U")))
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        // A1 已提交，A3 已有成绩，A4 不在已选班级
        assert_eq!(pending, vec!["A2"]);
    }

    #[test]
    fn test_pending_work_sorted_by_due_date() {
        let view = MirrorView::builder()
            .classes(vec![entity("c1", json!({ "classStudents": ["U"] }))])
            .assignments(vec![
                entity("a1", json!({ "classID": "c1" })),
                entity("a2", json!({ "classID": "c1", "assignmentDueDate": 300 })),
                entity("a3", json!({ "classID": "c1", "assignmentDueDate": 100 })),
            ])
            .build();
        let ctx = context(Some("U"));
        let pending: Vec<_> = pending_work(&view, &ctx).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(pending, vec!["a3", "a2", "a1"]);

        let top: Vec<_> = top_pending_work(&view, &ctx, 2).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(top, vec!["a3", "a2"]);
    }

    #[test]
    fn test_signed_out_has_no_pending_work() {
        assert!(pending_work(&view(), &context(None)).is_empty());
    }

    #[test]
    fn test_visible_assignments_hide_submitted() {
        let view = view();
        let visible: Vec<_> = visible_assignments(&view, &context(Some("U")), "c1")
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(visible, vec!["A2", "A3"]);

        let signed_out = visible_assignments(&view, &context(None), "c1");
        assert_eq!(signed_out.len(), 3);
    }
}
