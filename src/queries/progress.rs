//! 本周进度

use chrono::Datelike;
use serde::Serialize;

use crate::models::assignments::entities::AssignmentRecord;
use crate::queries::QueryContext;
use crate::queries::enrollment::assignments_for_user;
use crate::queries::submissions::submitted_assignment_ids;
use crate::sync::MirrorView;
use crate::utils::{EpochSeconds, normalize_id};

const SECONDS_PER_DAY: i64 = 86_400;

/// 一周区间，两端都包含
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekInterval {
    pub start: EpochSeconds,
    pub end: EpochSeconds,
}

impl WeekInterval {
    pub fn contains(&self, ts: EpochSeconds) -> bool {
        ts >= self.start && ts <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyProgress {
    pub interval: WeekInterval,
    pub due_this_week: Vec<AssignmentRecord>,
    pub completed_due_this_week: Vec<AssignmentRecord>,
    pub progress_ratio: f64,
}

/// 包含 `now` 的日历周：从周起始日本地零点开始，共七天
pub fn week_interval(ctx: &QueryContext) -> WeekInterval {
    let local = ctx.now.naive_local();
    let days_since_start = (local.weekday().num_days_from_monday() + 7
        - ctx.week_start.num_days_from_monday())
        % 7;
    let midnight = local.date().and_time(chrono::NaiveTime::MIN);
    let start = midnight.and_utc().timestamp()
        - i64::from(ctx.now.offset().local_minus_utc())
        - i64::from(days_since_start) * SECONDS_PER_DAY;
    let end = start + 7 * SECONDS_PER_DAY;
    WeekInterval {
        start: start as f64,
        end: end as f64,
    }
}

pub fn weekly_progress(view: &MirrorView, ctx: &QueryContext) -> WeeklyProgress {
    let interval = week_interval(ctx);
    let due_this_week: Vec<AssignmentRecord> = assignments_for_user(view, ctx)
        .into_iter()
        .filter(|a| a.due_date.is_some_and(|due| interval.contains(due)))
        .cloned()
        .collect();

    let submitted = submitted_assignment_ids(view, ctx);
    let completed_due_this_week: Vec<AssignmentRecord> = due_this_week
        .iter()
        .filter(|a| normalize_id(Some(&a.id)).is_some_and(|id| submitted.contains(id)))
        .cloned()
        .collect();

    let progress_ratio = if due_this_week.is_empty() {
        0.0
    } else {
        completed_due_this_week.len() as f64 / due_this_week.len() as f64
    };

    WeeklyProgress {
        interval,
        due_this_week,
        completed_due_this_week,
        progress_ratio,
    }
}
