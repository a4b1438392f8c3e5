//! 选课相关查询

use std::collections::HashSet;

use crate::models::announcements::entities::AnnouncementRecord;
use crate::models::assignments::entities::AssignmentRecord;
use crate::models::classes::entities::ClassRecord;
use crate::queries::QueryContext;
use crate::sync::MirrorView;
use crate::utils::normalize_id;

/// 找不到班级时显示的名称
pub const UNKNOWN_CLASS: &str = "Unknown Class";

/// 用户作为学生或教师所在的班级；未登录时为空
pub fn enrolled_classes<'a>(view: &'a MirrorView, ctx: &QueryContext) -> Vec<&'a ClassRecord> {
    let Some(user) = ctx.user() else {
        return Vec::new();
    };
    view.classes.iter().filter(|c| c.has_member(user)).collect()
}

pub fn enrolled_class_ids(view: &MirrorView, ctx: &QueryContext) -> HashSet<String> {
    enrolled_classes(view, ctx)
        .into_iter()
        .filter_map(|c| normalize_id(Some(&c.id)).map(str::to_string))
        .collect()
}

/// 记录的 classID 是否属于已选班级
pub(crate) fn in_enrolled(class_id: Option<&str>, enrolled: &HashSet<String>) -> bool {
    normalize_id(class_id).is_some_and(|id| enrolled.contains(id))
}

/// 已选班级中的作业，保持镜像顺序
pub fn assignments_for_user<'a>(
    view: &'a MirrorView,
    ctx: &QueryContext,
) -> Vec<&'a AssignmentRecord> {
    let enrolled = enrolled_class_ids(view, ctx);
    view.assignments
        .iter()
        .filter(|a| in_enrolled(a.class_id.as_deref(), &enrolled))
        .collect()
}

/// 已选班级中的公告
pub fn announcements_for_user<'a>(
    view: &'a MirrorView,
    ctx: &QueryContext,
) -> Vec<&'a AnnouncementRecord> {
    let enrolled = enrolled_class_ids(view, ctx);
    view.announcements
        .iter()
        .filter(|a| in_enrolled(a.class_id.as_deref(), &enrolled))
        .collect()
}

/// 班级名称，找不到时返回 [`UNKNOWN_CLASS`]
pub fn class_name(view: &MirrorView, class_id: Option<&str>) -> String {
    let Some(id) = normalize_id(class_id) else {
        return UNKNOWN_CLASS.to_string();
    };
    view.classes
        .get(id)
        .or_else(|| view.classes.iter().find(|c| normalize_id(Some(&c.id)) == Some(id)))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| UNKNOWN_CLASS.to_string())
}
