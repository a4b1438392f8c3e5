//! 订阅管理器
//!
//! 每个集合建立一个推送订阅，在独立任务中解码快照并替换对应镜像。
//! 关闭时先关闭投递闸门（写锁），再通知并中止所有任务：
//! 闸门关闭之后不会再有任何 `replace` 发生，即使有投递正在进行。

use std::sync::{Arc, Mutex, RwLock};

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{ClassHubError, Result};
use crate::models::{CollectionKind, Entity, Snapshot};
use crate::store::RemoteStore;
use crate::sync::mirror::{CollectionMirror, Mirrors};
use crate::sync::sink::{ErrorReport, ErrorSink};

/// 解码一次快照，返回有效实体与被跳过的记录数
pub fn decode_snapshot<T: Entity>(snapshot: &Snapshot) -> (Vec<T>, usize) {
    let mut skipped = 0;
    let entities = snapshot
        .iter()
        .filter_map(|(key, value)| {
            let entity = T::from_raw(key, value);
            if entity.is_none() {
                skipped += 1;
            }
            entity
        })
        .collect();
    (entities, skipped)
}

/// 一次快照中被跳过的记录汇总为解码错误，没有跳过时为 `None`
///
/// 解码错误只记录日志，不上报也不中断订阅。
pub fn skipped_records_error(kind: CollectionKind, skipped: usize) -> Option<ClassHubError> {
    (skipped > 0).then(|| {
        ClassHubError::decode(format!(
            "{skipped} record(s) in {} could not be decoded and were skipped",
            kind.path()
        ))
    })
}

#[derive(Default)]
struct DeliveryGate {
    closed: RwLock<bool>,
}

impl DeliveryGate {
    /// 闸门打开时执行替换；已关闭返回 `false`
    fn apply<F: FnOnce()>(&self, f: F) -> bool {
        let closed = self
            .closed
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *closed {
            return false;
        }
        f();
        true
    }

    /// 等待正在进行的替换完成后关闭
    fn close(&self) {
        let mut closed = self
            .closed
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *closed = true;
    }

    fn is_closed(&self) -> bool {
        *self
            .closed
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct SubscriptionManager {
    gate: Arc<DeliveryGate>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<(CollectionKind, JoinHandle<()>)>>,
}

impl SubscriptionManager {
    /// 为十个集合各建立一个订阅
    ///
    /// 单个集合订阅失败只上报，不影响其他集合。
    pub async fn start(
        store: Arc<dyn RemoteStore>,
        mirrors: &Mirrors,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self> {
        let manager = Self {
            gate: Arc::new(DeliveryGate::default()),
            shutdown_tx: watch::channel(false).0,
            tasks: Mutex::new(Vec::with_capacity(CollectionKind::ALL.len())),
        };

        manager.spawn(&store, mirrors.classes.clone(), &sink).await;
        manager.spawn(&store, mirrors.assignments.clone(), &sink).await;
        manager.spawn(&store, mirrors.grades.clone(), &sink).await;
        manager.spawn(&store, mirrors.announcements.clone(), &sink).await;
        manager.spawn(&store, mirrors.submissions.clone(), &sink).await;
        manager.spawn(&store, mirrors.groups.clone(), &sink).await;
        manager.spawn(&store, mirrors.group_tasks.clone(), &sink).await;
        manager
            .spawn(&store, mirrors.group_task_completions.clone(), &sink)
            .await;
        manager
            .spawn(&store, mirrors.group_attachments.clone(), &sink)
            .await;
        manager.spawn(&store, mirrors.group_messages.clone(), &sink).await;

        info!(
            "Subscription manager started with {} active subscriptions",
            manager.active_kinds().len()
        );
        Ok(manager)
    }

    async fn spawn<T: Entity>(
        &self,
        store: &Arc<dyn RemoteStore>,
        mirror: CollectionMirror<T>,
        sink: &Arc<dyn ErrorSink>,
    ) {
        let kind = T::KIND;
        let stream = match store.subscribe(kind).await {
            Ok(stream) => stream,
            Err(e) => {
                sink.report(ErrorReport::subscription(kind, e));
                return;
            }
        };

        let handle = tokio::spawn(run_subscription(
            stream,
            mirror,
            Arc::clone(&self.gate),
            self.shutdown_tx.subscribe(),
            Arc::clone(sink),
        ));
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((kind, handle));
    }

    /// 已建立订阅的集合
    pub fn active_kinds(&self) -> Vec<CollectionKind> {
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn is_shut_down(&self) -> bool {
        self.gate.is_closed()
    }

    /// 取消所有订阅并等待任务退出
    pub async fn shutdown(&self) -> Result<()> {
        self.gate.close();
        self.shutdown_tx.send_replace(true);

        let tasks: Vec<_> = std::mem::take(
            &mut *self
                .tasks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );

        let mut failed = Vec::new();
        for (kind, handle) in tasks {
            handle.abort();
            match handle.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    warn!(%kind, "Subscription task ended abnormally: {}", e);
                    failed.push(kind.path());
                }
            }
        }

        if failed.is_empty() {
            info!("All subscriptions cancelled");
            Ok(())
        } else {
            Err(ClassHubError::shutdown(format!(
                "Subscription tasks failed: {}",
                failed.join(", ")
            )))
        }
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.gate.close();
        let tasks = self
            .tasks
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (_, handle) in tasks.drain(..) {
            handle.abort();
        }
    }
}

async fn run_subscription<T: Entity>(
    mut stream: crate::store::SnapshotStream,
    mirror: CollectionMirror<T>,
    gate: Arc<DeliveryGate>,
    mut shutdown_rx: watch::Receiver<bool>,
    sink: Arc<dyn ErrorSink>,
) {
    let kind = T::KIND;
    loop {
        let delivery = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            delivery = stream.next() => delivery,
        };

        match delivery {
            Some(Ok(snapshot)) => {
                let (entities, skipped) = decode_snapshot::<T>(&snapshot);
                let mut count = 0;
                if !gate.apply(|| count = mirror.replace(entities)) {
                    break;
                }
                if let Some(e) = skipped_records_error(kind, skipped) {
                    warn!(%kind, code = e.code(), "{}", e.message());
                }
                debug!(%kind, count, skipped, "Snapshot applied");
            }
            Some(Err(e)) => sink.report(ErrorReport::subscription(kind, e)),
            None => {
                debug!(%kind, "Snapshot stream ended");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classes::entities::ClassRecord;
    use crate::models::grades::entities::GradeRecord;
    use crate::store::MemoryRemoteStore;
    use crate::sync::sink::{ErrorSource, RecordingErrorSink};
    use crate::utils::RawFields;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn fields(value: Value) -> RawFields {
        value.as_object().cloned().unwrap_or_default()
    }

    async fn wait_for<T: Entity>(mirror: &CollectionMirror<T>, len: usize) {
        let mut rx = mirror.subscribe();
        tokio::time::timeout(Duration::from_secs(2), async {
            while rx.borrow_and_update().len() != len {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_decode_skips_invalid_records() {
        let snapshot: Snapshot = vec![
            ("c1".into(), json!({ "className": "Art" })),
            ("c2".into(), json!("not a map")),
            ("c3".into(), json!({})),
        ];
        let (classes, skipped) = decode_snapshot::<ClassRecord>(&snapshot);
        assert_eq!(skipped, 1);
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[1].id, "c3");

        let err = skipped_records_error(CollectionKind::Classes, skipped).unwrap();
        assert_eq!(err.code(), "E006");
        assert!(skipped_records_error(CollectionKind::Classes, 0).is_none());
    }

    #[tokio::test]
    async fn test_snapshots_replace_mirror() {
        let store = Arc::new(MemoryRemoteStore::default());
        store
            .set_value(CollectionKind::Classes, "c1", fields(json!({ "className": "Art" })))
            .await
            .unwrap();

        let mirrors = Mirrors::new();
        let sink = Arc::new(RecordingErrorSink::new());
        let manager = SubscriptionManager::start(store.clone(), &mirrors, sink.clone())
            .await
            .unwrap();
        assert_eq!(manager.active_kinds().len(), CollectionKind::ALL.len());
        wait_for(&mirrors.classes, 1).await;

        store
            .set_value(CollectionKind::Classes, "c2", fields(json!({ "className": "Math" })))
            .await
            .unwrap();
        store.remove_value(CollectionKind::Classes, "c1").await.unwrap();
        store
            .set_value(CollectionKind::Classes, "c3", fields(json!({ "className": "Music" })))
            .await
            .unwrap();
        wait_for(&mirrors.classes, 2).await;

        let ids: Vec<_> = mirrors.classes.all().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["c2", "c3"]);
        assert!(sink.is_empty());
        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_delivery_error_keeps_last_snapshot() {
        let store = Arc::new(MemoryRemoteStore::default());
        store
            .set_value(CollectionKind::Grades, "g1", fields(json!({ "gradePoints": 5 })))
            .await
            .unwrap();

        let mirrors = Mirrors::new();
        let sink = Arc::new(RecordingErrorSink::new());
        let manager = SubscriptionManager::start(store.clone(), &mirrors, sink.clone())
            .await
            .unwrap();
        wait_for(&mirrors.grades, 1).await;

        store.inject_delivery_error(CollectionKind::Grades, "permission denied");
        store
            .set_value(CollectionKind::Classes, "c1", RawFields::new())
            .await
            .unwrap();
        wait_for(&mirrors.classes, 1).await;
        tokio::time::timeout(Duration::from_secs(2), async {
            while sink.is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(mirrors.grades.len(), 1);
        let reports = sink.reports();
        assert_eq!(
            reports[0].source,
            ErrorSource::Subscription {
                kind: CollectionKind::Grades
            }
        );

        // 之后的正常推送继续生效
        store
            .set_value(CollectionKind::Grades, "g2", fields(json!({ "gradePoints": 7 })))
            .await
            .unwrap();
        wait_for(&mirrors.grades, 2).await;
        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_replace_after_shutdown() {
        let store = Arc::new(MemoryRemoteStore::default());
        let mirrors = Mirrors::new();
        let sink = Arc::new(RecordingErrorSink::new());
        let manager = SubscriptionManager::start(store.clone(), &mirrors, sink)
            .await
            .unwrap();

        manager.shutdown().await.unwrap();
        assert!(manager.is_shut_down());
        assert!(manager.active_kinds().is_empty());

        let mut rx = mirrors.grades.subscribe();
        rx.borrow_and_update();
        store
            .set_value(CollectionKind::Grades, "g1", fields(json!({ "gradePoints": 1 })))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!rx.has_changed().unwrap());
        assert!(mirrors.grades.all().iter().all(|g: &GradeRecord| g.id != "g1"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shutdown_during_deliveries_stops_replacing() {
        let store = Arc::new(MemoryRemoteStore::default());
        let mirrors = Mirrors::new();
        let manager = SubscriptionManager::start(
            store.clone(),
            &mirrors,
            Arc::new(RecordingErrorSink::new()),
        )
        .await
        .unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..500 {
                    store
                        .set_value(
                            CollectionKind::Classes,
                            &format!("c{i:03}"),
                            fields(json!({ "className": "Art" })),
                        )
                        .await
                        .unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        tokio::time::timeout(Duration::from_secs(2), async {
            while mirrors.classes.is_empty() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
        manager.shutdown().await.unwrap();

        let mut rx = mirrors.classes.subscribe();
        rx.borrow_and_update();
        let frozen = mirrors.classes.len();

        writer.await.unwrap();
        store
            .set_value(CollectionKind::Classes, "late", RawFields::new())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!rx.has_changed().unwrap());
        assert_eq!(mirrors.classes.len(), frozen);
        assert!(mirrors.classes.get("late").is_none());
    }

    #[tokio::test]
    async fn test_repeated_snapshot_keeps_mirror_intact() {
        let store = Arc::new(MemoryRemoteStore::default());
        let mirrors = Mirrors::new();
        let manager = SubscriptionManager::start(
            store.clone(),
            &mirrors,
            Arc::new(RecordingErrorSink::new()),
        )
        .await
        .unwrap();

        let art = fields(json!({ "className": "Art" }));
        store
            .set_value(CollectionKind::Classes, "c1", art.clone())
            .await
            .unwrap();
        // 相同内容再推送一次
        store
            .set_value(CollectionKind::Classes, "c1", art)
            .await
            .unwrap();
        store
            .set_value(CollectionKind::Classes, "c2", fields(json!({ "className": "Math" })))
            .await
            .unwrap();
        wait_for(&mirrors.classes, 2).await;

        let all = mirrors.classes.all();
        assert_eq!(all.len(), 2);
        assert_eq!(mirrors.classes.get("c1").unwrap().name, "Art");
        assert_eq!(mirrors.classes.get("c2").unwrap().name, "Math");
        manager.shutdown().await.unwrap();
    }
}
