//! 集合镜像
//!
//! 每个集合保存最近一次快照规范化后的实体序列。内容以 `Arc` 整体替换，
//! 读取方拿到的要么是完整的旧内容，要么是完整的新内容。

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::watch;

use crate::models::Entity;
use crate::models::announcements::entities::AnnouncementRecord;
use crate::models::assignments::entities::AssignmentRecord;
use crate::models::classes::entities::ClassRecord;
use crate::models::grades::entities::GradeRecord;
use crate::models::groups::entities::{
    GroupAttachmentRecord, GroupMessageRecord, GroupRecord, GroupTaskCompletionRecord,
    GroupTaskRecord,
};
use crate::models::submissions::entities::AssignmentSubmissionRecord;

/// 某一时刻的镜像内容，键唯一
#[derive(Debug)]
pub struct MirrorContents<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Entity> MirrorContents<T> {
    /// 同一快照中重复出现的键以后出现者为准，位置保持首次出现处
    fn build(entities: Vec<T>) -> Self {
        let mut items: Vec<T> = Vec::with_capacity(entities.len());
        let mut index = HashMap::with_capacity(entities.len());
        for entity in entities {
            if let Some(&pos) = index.get(entity.key()) {
                items[pos] = entity;
                continue;
            }
            index.insert(entity.key().to_string(), items.len());
            items.push(entity);
        }
        Self { items, index }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&pos| &self.items[pos])
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> Deref for MirrorContents<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for MirrorContents<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

pub struct CollectionMirror<T> {
    inner: Arc<watch::Sender<Arc<MirrorContents<T>>>>,
}

impl<T> Clone for CollectionMirror<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> Default for CollectionMirror<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> CollectionMirror<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(MirrorContents::default()));
        Self {
            inner: Arc::new(tx),
        }
    }

    /// 整体替换内容，返回替换后的实体数
    ///
    /// 仅供订阅管理器调用。
    pub(crate) fn replace(&self, entities: Vec<T>) -> usize {
        let contents = Arc::new(MirrorContents::build(entities));
        let len = contents.len();
        self.inner.send_replace(contents);
        len
    }

    /// 当前内容；之后的替换对本次返回值不可见
    pub fn all(&self) -> Arc<MirrorContents<T>> {
        Arc::clone(&self.inner.borrow())
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.inner.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 订阅内容变化
    pub fn subscribe(&self) -> watch::Receiver<Arc<MirrorContents<T>>> {
        self.inner.subscribe()
    }
}

/// 十个集合的镜像
#[derive(Clone, Default)]
pub struct Mirrors {
    pub classes: CollectionMirror<ClassRecord>,
    pub assignments: CollectionMirror<AssignmentRecord>,
    pub grades: CollectionMirror<GradeRecord>,
    pub announcements: CollectionMirror<AnnouncementRecord>,
    pub submissions: CollectionMirror<AssignmentSubmissionRecord>,
    pub groups: CollectionMirror<GroupRecord>,
    pub group_tasks: CollectionMirror<GroupTaskRecord>,
    pub group_task_completions: CollectionMirror<GroupTaskCompletionRecord>,
    pub group_attachments: CollectionMirror<GroupAttachmentRecord>,
    pub group_messages: CollectionMirror<GroupMessageRecord>,
}

impl Mirrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 逐个集合读取当前内容；各集合之间不保证一致
    pub fn view(&self) -> MirrorView {
        MirrorView {
            classes: self.classes.all(),
            assignments: self.assignments.all(),
            grades: self.grades.all(),
            announcements: self.announcements.all(),
            submissions: self.submissions.all(),
            groups: self.groups.all(),
            group_tasks: self.group_tasks.all(),
            group_task_completions: self.group_task_completions.all(),
            group_attachments: self.group_attachments.all(),
            group_messages: self.group_messages.all(),
        }
    }
}

/// 派生查询的输入
#[derive(Clone, Default)]
pub struct MirrorView {
    pub classes: Arc<MirrorContents<ClassRecord>>,
    pub assignments: Arc<MirrorContents<AssignmentRecord>>,
    pub grades: Arc<MirrorContents<GradeRecord>>,
    pub announcements: Arc<MirrorContents<AnnouncementRecord>>,
    pub submissions: Arc<MirrorContents<AssignmentSubmissionRecord>>,
    pub groups: Arc<MirrorContents<GroupRecord>>,
    pub group_tasks: Arc<MirrorContents<GroupTaskRecord>>,
    pub group_task_completions: Arc<MirrorContents<GroupTaskCompletionRecord>>,
    pub group_attachments: Arc<MirrorContents<GroupAttachmentRecord>>,
    pub group_messages: Arc<MirrorContents<GroupMessageRecord>>,
}

impl MirrorView {
    /// 由实体列表直接构造，用于测试与离线计算
    pub fn builder() -> MirrorViewBuilder {
        MirrorViewBuilder::default()
    }
}

#[derive(Default)]
pub struct MirrorViewBuilder {
    view: MirrorView,
}

macro_rules! view_setter {
    ($($field:ident: $ty:ty),* $(,)?) => {
        impl MirrorViewBuilder {
            $(
                pub fn $field(mut self, items: Vec<$ty>) -> Self {
                    self.view.$field = Arc::new(MirrorContents::build(items));
                    self
                }
            )*

            pub fn build(self) -> MirrorView {
                self.view
            }
        }
    };
}

view_setter! {
    classes: ClassRecord,
    assignments: AssignmentRecord,
    grades: GradeRecord,
    announcements: AnnouncementRecord,
    submissions: AssignmentSubmissionRecord,
    groups: GroupRecord,
    group_tasks: GroupTaskRecord,
    group_task_completions: GroupTaskCompletionRecord,
    group_attachments: GroupAttachmentRecord,
    group_messages: GroupMessageRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn class(key: &str, name: &str) -> ClassRecord {
        ClassRecord::from_raw(key, &json!({ "className": name })).unwrap()
    }

    #[test]
    fn test_replace_leaves_no_residue() {
        let mirror = CollectionMirror::<ClassRecord>::new();
        mirror.replace(vec![class("c1", "Art"), class("c2", "Math")]);
        mirror.replace(vec![class("c3", "History")]);

        let all = mirror.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "c3");
        assert!(mirror.get("c1").is_none());
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let mirror = CollectionMirror::<ClassRecord>::new();
        let len = mirror.replace(vec![class("c1", "Art"), class("c2", "Math"), class("c1", "Music")]);
        assert_eq!(len, 2);
        let all = mirror.all();
        assert_eq!(all[0].name, "Music");
        assert_eq!(all[1].name, "Math");
    }

    #[test]
    fn test_held_contents_unaffected_by_replace() {
        let mirror = CollectionMirror::<ClassRecord>::new();
        mirror.replace(vec![class("c1", "Art")]);
        let before = mirror.all();
        mirror.replace(Vec::new());
        assert_eq!(before.len(), 1);
        assert!(mirror.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_observe_replace() {
        let mirror = CollectionMirror::<ClassRecord>::new();
        let mut rx = mirror.subscribe();
        mirror.replace(vec![class("c1", "Art")]);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }

    #[test]
    fn test_clones_share_contents() {
        let mirrors = Mirrors::new();
        let other = mirrors.clone();
        mirrors.classes.replace(vec![class("c1", "Art")]);
        assert_eq!(other.view().classes.len(), 1);
    }

    #[test]
    fn test_last_applied_snapshot_wins() {
        let mirror = CollectionMirror::<ClassRecord>::new();
        let older = vec![class("c1", "Art")];
        let newer = vec![class("c1", "Music"), class("c2", "Math")];

        mirror.replace(newer.clone());
        mirror.replace(newer);
        assert_eq!(mirror.len(), 2);

        // 过期快照晚到时同样整体生效
        mirror.replace(older);
        assert_eq!(mirror.len(), 1);
        assert_eq!(mirror.get("c1").unwrap().name, "Art");
        assert!(mirror.get("c2").is_none());
    }

    #[test]
    fn test_readers_never_observe_partial_replace() {
        let mirror = CollectionMirror::<ClassRecord>::new();
        std::thread::scope(|scope| {
            let writer = mirror.clone();
            scope.spawn(move || {
                for n in 1..=300usize {
                    let generation = format!("v{n}");
                    let snapshot = (0..n).map(|i| class(&format!("c{i}"), &generation)).collect();
                    writer.replace(snapshot);
                }
            });

            for _ in 0..4 {
                let reader = mirror.clone();
                scope.spawn(move || {
                    for _ in 0..2_000 {
                        let all = reader.all();
                        let expected = format!("v{}", all.len());
                        assert!(all.iter().all(|c| c.name == expected));
                    }
                });
            }
        });
        assert_eq!(mirror.len(), 300);
    }
}
