//! 成绩汇总与趋势分类
//!
//! 汇总只统计 `points` 与 `maxPoints` 同时存在的成绩记录：
//! 缺少任一字段的记录对两个合计都不产生贡献。

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::grades::entities::GradeRecord;
use crate::queries::enrollment::class_name;
use crate::sync::MirrorView;
use crate::utils::{ids_equal, normalize_id};

/// 分节趋势的判定阈值
pub const SECTION_TREND_THRESHOLD: f64 = 0.8;
const TIE_EPSILON: f64 = 1e-4;

/// 未设置分节的成绩归入的分组
pub const UNGROUPED_SECTION: &str = "Ungrouped";

/// 班级平均分趋势阈值（百分制）
pub const CLASS_TREND_UP_ABOVE: f64 = 80.0;
pub const CLASS_TREND_SAME_FROM: f64 = 60.0;

/// 最近成绩找不到作业时显示的标题
pub const UNKNOWN_ASSIGNMENT: &str = "Assignment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Same,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GradeAggregate {
    pub total_points: f64,
    pub total_max_points: f64,
    pub ratio: f64,
}

impl GradeAggregate {
    fn add(&mut self, grade: &GradeRecord) {
        if let Some((points, max_points)) = grade.scored() {
            self.total_points += points;
            self.total_max_points += max_points;
        }
    }

    /// 计算比值，分母为 0 时为 0.0，结果限制在 [0, 1]
    fn finish(mut self) -> Self {
        self.ratio = if self.total_max_points == 0.0 {
            0.0
        } else {
            (self.total_points / self.total_max_points).clamp(0.0, 1.0)
        };
        self
    }

    pub fn percent(&self) -> i64 {
        (self.ratio * 100.0).round() as i64
    }
}

fn grades_of_class<'a>(
    view: &'a MirrorView,
    class_id: &'a str,
) -> impl Iterator<Item = &'a GradeRecord> + 'a {
    view.grades
        .iter()
        .filter(move |g| ids_equal(g.class_id.as_deref(), Some(class_id)))
}

/// 单个班级的成绩汇总
pub fn class_grade(view: &MirrorView, class_id: &str) -> GradeAggregate {
    let mut aggregate = GradeAggregate::default();
    for grade in grades_of_class(view, class_id) {
        aggregate.add(grade);
    }
    aggregate.finish()
}

/// 比值与 0.8 的比较，恰好 0.8（误差 1e-4 内）视为持平
pub fn classify_ratio(ratio: f64) -> TrendDirection {
    if (ratio - SECTION_TREND_THRESHOLD).abs() < TIE_EPSILON {
        TrendDirection::Same
    } else if ratio > SECTION_TREND_THRESHOLD {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionTrend {
    pub section: String,
    pub aggregate: GradeAggregate,
    pub direction: TrendDirection,
}

/// 按分节分组的趋势，按满分合计降序
///
/// 未设置分节归入 [`UNGROUPED_SECTION`]；分节去除空白后为空的成绩不参与输出。
pub fn section_trends(view: &MirrorView, class_id: &str) -> Vec<SectionTrend> {
    let mut groups: BTreeMap<String, GradeAggregate> = BTreeMap::new();
    for grade in grades_of_class(view, class_id) {
        let section = match grade.section.as_deref() {
            None => UNGROUPED_SECTION,
            Some(raw) => raw.trim(),
        };
        if section.is_empty() {
            continue;
        }
        groups.entry(section.to_string()).or_default().add(grade);
    }

    let mut trends: Vec<SectionTrend> = groups
        .into_iter()
        .map(|(section, aggregate)| {
            let aggregate = aggregate.finish();
            SectionTrend {
                section,
                direction: classify_ratio(aggregate.ratio),
                aggregate,
            }
        })
        .collect();
    // 稳定排序，满分相同时保持分节名升序
    trends.sort_by(|a, b| {
        b.aggregate
            .total_max_points
            .total_cmp(&a.aggregate.total_max_points)
    });
    trends
}

/// 百分比统计（四舍五入）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GradeStats {
    pub mean: i64,
    pub min: i64,
    pub max: i64,
    pub count: usize,
}

/// 统计所有满分大于 0 且得分非负的成绩
pub fn grade_stats(view: &MirrorView) -> GradeStats {
    let percents: Vec<f64> = view
        .grades
        .iter()
        .filter_map(GradeRecord::scored)
        .filter(|&(points, max_points)| max_points > 0.0 && points >= 0.0)
        .map(|(points, max_points)| points / max_points * 100.0)
        .collect();
    if percents.is_empty() {
        return GradeStats::default();
    }

    let sum: f64 = percents.iter().sum();
    let min = percents.iter().copied().fold(f64::INFINITY, f64::min);
    let max = percents.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    GradeStats {
        mean: (sum / percents.len() as f64).round() as i64,
        min: min.round() as i64,
        max: max.round() as i64,
        count: percents.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassTrend {
    pub class_id: String,
    pub class_name: String,
    pub mean_percent: f64,
    pub direction: TrendDirection,
}

pub fn classify_class_mean(mean: f64) -> TrendDirection {
    if mean > CLASS_TREND_UP_ABOVE {
        TrendDirection::Up
    } else if mean >= CLASS_TREND_SAME_FROM {
        TrendDirection::Same
    } else {
        TrendDirection::Down
    }
}

/// 班级平均百分比：满分大于 0 的成绩取平均，没有则为 0
pub fn class_mean_percent(view: &MirrorView, class_id: &str) -> f64 {
    let percents: Vec<f64> = grades_of_class(view, class_id)
        .filter_map(GradeRecord::scored)
        .filter(|&(_, max_points)| max_points > 0.0)
        .map(|(points, max_points)| points / max_points * 100.0)
        .collect();
    if percents.is_empty() {
        0.0
    } else {
        percents.iter().sum::<f64>() / percents.len() as f64
    }
}

/// 每个班级的平均分趋势
///
/// 没有班级镜像数据时，班级 ID 取自成绩记录。
pub fn class_trends(view: &MirrorView) -> Vec<ClassTrend> {
    let class_ids: Vec<String> = if view.classes.is_empty() {
        view.grades
            .iter()
            .filter_map(|g| normalize_id(g.class_id.as_deref()).map(str::to_string))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        view.classes.iter().map(|c| c.id.clone()).collect()
    };

    class_ids
        .into_iter()
        .map(|class_id| {
            let mean_percent = class_mean_percent(view, &class_id);
            ClassTrend {
                class_name: class_name(view, Some(&class_id)),
                direction: classify_class_mean(mean_percent),
                mean_percent,
                class_id,
            }
        })
        .collect()
}

/// 所有班级都达标时的平均分门槛（百分制）
pub const ADVICE_THRESHOLD: f64 = 70.0;

/// 依据班级平均分给出的建议
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeAdvice {
    pub lowest_percent: i64,
    pub meets_threshold: bool,
    pub message: &'static str,
}

/// 每个班级平均分都不低于门槛；没有班级时为 false
pub fn meets_all_classes_threshold(trends: &[ClassTrend], threshold: f64) -> bool {
    !trends.is_empty() && trends.iter().all(|t| t.mean_percent >= threshold)
}

/// 按最低班级百分比选择建议文案
pub fn advice_for_lowest_percent(lowest_percent: i64) -> &'static str {
    match lowest_percent {
        70..=100 => "You're doing well in most areas. Keep it up!",
        60..=69 => {
            "You're getting close. A bit more effort and you'll be above 70% in all classes."
        }
        50..=59 => {
            "You're making progress, but some classes need more attention. Try reviewing recent feedback."
        }
        40..=49 => {
            "You're falling behind in a few classes. Consider reaching out to instructors for help."
        }
        _ => {
            "It looks like some classes need significant attention. Let's make a plan to improve your scores."
        }
    }
}

/// 根据班级趋势生成建议，没有班级时为 `None`
pub fn grade_advice(trends: &[ClassTrend]) -> Option<GradeAdvice> {
    let lowest = trends
        .iter()
        .map(|t| t.mean_percent)
        .min_by(f64::total_cmp)?;
    let lowest_percent = lowest.round() as i64;
    Some(GradeAdvice {
        lowest_percent,
        meets_threshold: meets_all_classes_threshold(trends, ADVICE_THRESHOLD),
        message: advice_for_lowest_percent(lowest_percent),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestGraded {
    pub grade_id: String,
    pub assignment_title: String,
    pub class_name: String,
    pub percent: i64,
    pub points: Option<f64>,
    pub max_points: Option<f64>,
    pub section: Option<String>,
}

/// 最近的已评分成绩，键越大越新
pub fn latest_graded(view: &MirrorView, limit: usize) -> Vec<LatestGraded> {
    let mut graded: Vec<&GradeRecord> = view.grades.iter().filter(|g| g.points.is_some()).collect();
    graded.sort_by(|a, b| b.id.cmp(&a.id));

    graded
        .into_iter()
        .take(limit)
        .map(|g| {
            let assignment_title = normalize_id(g.assignment_id.as_deref())
                .and_then(|id| view.assignments.get(id))
                .map(|a| a.title.clone())
                .unwrap_or_else(|| UNKNOWN_ASSIGNMENT.to_string());
            let percent = match (g.points, g.max_points) {
                (Some(p), Some(m)) if m > 0.0 => (p / m * 100.0).round() as i64,
                (Some(p), _) => p.round() as i64,
                _ => 0,
            };
            LatestGraded {
                grade_id: g.id.clone(),
                assignment_title,
                class_name: class_name(view, g.class_id.as_deref()),
                percent,
                points: g.points,
                max_points: g.max_points,
                section: g.section.clone(),
            }
        })
        .collect()
}
