//! 数据模型定义
//!
//! 每个集合对应一个子模块：`entities` 为规范化后的类型化实体，
//! `requests` 为写入远程存储时使用的载荷。

pub mod announcements;
pub mod assignments;
pub mod classes;
pub mod grades;
pub mod groups;
pub mod submissions;
pub mod users;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ClassHubError;
use crate::utils::RawFields;

/// 一次推送的完整快照：按顺序排列的（键, 原始值）
pub type Snapshot = Vec<(String, Value)>;

/// 集合类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Classes,
    Assignments,
    Grades,
    Announcements,
    AssignmentSubmissions,
    Groups,
    GroupTasks,
    GroupTaskCompletions,
    GroupAttachments,
    GroupMessages,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 10] = [
        CollectionKind::Classes,
        CollectionKind::Assignments,
        CollectionKind::Grades,
        CollectionKind::Announcements,
        CollectionKind::AssignmentSubmissions,
        CollectionKind::Groups,
        CollectionKind::GroupTasks,
        CollectionKind::GroupTaskCompletions,
        CollectionKind::GroupAttachments,
        CollectionKind::GroupMessages,
    ];

    /// 远程存储中的节点路径
    pub fn path(&self) -> &'static str {
        match self {
            CollectionKind::Classes => "classes",
            CollectionKind::Assignments => "assignments",
            CollectionKind::Grades => "grades",
            CollectionKind::Announcements => "announcements",
            CollectionKind::AssignmentSubmissions => "assignmentSubmissions",
            CollectionKind::Groups => "groups",
            CollectionKind::GroupTasks => "groupTasks",
            CollectionKind::GroupTaskCompletions => "groupTaskCompletions",
            CollectionKind::GroupAttachments => "groupAttachments",
            CollectionKind::GroupMessages => "groupMessages",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl std::str::FromStr for CollectionKind {
    type Err = ClassHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionKind::ALL
            .into_iter()
            .find(|kind| kind.path() == s)
            .ok_or_else(|| ClassHubError::validation(format!("Unknown collection: {s}")))
    }
}

/// 可由原始记录规范化得到的实体
pub trait Entity: Clone + Send + Sync + 'static {
    /// 实体所属集合
    const KIND: CollectionKind;

    /// 从原始记录构造实体；记录不是字段表时返回 `None`（无效记录）
    fn from_raw(key: &str, value: &Value) -> Option<Self> {
        value.as_object().map(|fields| Self::from_fields(key, fields))
    }

    /// 从字段表构造实体，缺失或类型不符的字段取默认值
    fn from_fields(key: &str, fields: &RawFields) -> Self;

    /// 远程存储分配的键
    fn key(&self) -> &str;
}
