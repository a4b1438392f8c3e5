//! 写入网关
//!
//! 每个写操作都在后台任务中提交到远程存储，立即返回 [`WriteTicket`]：
//! 创建操作的键在提交前就已分配。写入成功不会修改任何镜像，
//! 调用方只能通过下一次推送的快照看到结果；失败不会自动重试，
//! 会通过凭据返回给调用方并上报到可观测性接收端。

pub mod announcements;
pub mod assignments;
pub mod classes;
pub mod grades;
pub mod groups;
pub mod submissions;

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::oneshot;
use tracing::debug;

use crate::errors::{ClassHubError, Result};
use crate::models::CollectionKind;
use crate::store::RemoteStore;
use crate::sync::{ErrorReport, ErrorSink};
use crate::utils::{RawFields, normalize_id};

/// 一次写入的凭据：目标键与完成信号
#[derive(Debug)]
pub struct WriteTicket {
    key: String,
    completion: oneshot::Receiver<Result<()>>,
}

impl WriteTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 等待写入完成
    pub async fn wait(self) -> Result<()> {
        self.completion
            .await
            .unwrap_or_else(|_| Err(ClassHubError::write("Write task dropped before completion")))
    }
}

/// 等待一组写入全部完成，返回第一个错误
pub async fn wait_all(tickets: Vec<WriteTicket>) -> Result<()> {
    join_all(tickets.into_iter().map(WriteTicket::wait))
        .await
        .into_iter()
        .collect()
}

enum WriteOp {
    Set(RawFields),
    Update(RawFields),
    Remove,
}

impl WriteOp {
    fn name(&self) -> &'static str {
        match self {
            WriteOp::Set(_) => "set",
            WriteOp::Update(_) => "update",
            WriteOp::Remove => "remove",
        }
    }
}

#[derive(Clone)]
pub struct WriteGateway {
    store: Arc<dyn RemoteStore>,
    sink: Arc<dyn ErrorSink>,
}

impl WriteGateway {
    pub fn new(store: Arc<dyn RemoteStore>, sink: Arc<dyn ErrorSink>) -> Self {
        Self { store, sink }
    }

    /// 分配新键并写入整条记录
    ///
    /// 需要在 tokio 运行时中调用。
    pub fn create(&self, kind: CollectionKind, fields: RawFields) -> WriteTicket {
        let key = self.store.allocate_key(kind);
        self.submit(kind, key, WriteOp::Set(fields))
    }

    /// 合并更新已有记录的顶层字段
    pub fn update(&self, kind: CollectionKind, key: &str, fields: RawFields) -> WriteTicket {
        match normalize_id(Some(key)) {
            Some(key) => self.submit(kind, key.to_string(), WriteOp::Update(fields)),
            None => self.reject(kind, key, "Cannot update a record without a key"),
        }
    }

    pub fn delete(&self, kind: CollectionKind, key: &str) -> WriteTicket {
        match normalize_id(Some(key)) {
            Some(key) => self.submit(kind, key.to_string(), WriteOp::Remove),
            None => self.reject(kind, key, "Cannot delete a record without a key"),
        }
    }

    fn reject(&self, kind: CollectionKind, key: &str, message: &str) -> WriteTicket {
        let error = ClassHubError::validation(message);
        self.sink.report(ErrorReport::write(kind, key, error.clone()));
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(error));
        WriteTicket {
            key: key.to_string(),
            completion: rx,
        }
    }

    fn submit(&self, kind: CollectionKind, key: String, op: WriteOp) -> WriteTicket {
        let (tx, rx) = oneshot::channel();
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let task_key = key.clone();

        tokio::spawn(async move {
            let op_name = op.name();
            let result = match op {
                WriteOp::Set(fields) => store.set_value(kind, &task_key, fields).await,
                WriteOp::Update(fields) => store.update_values(kind, &task_key, fields).await,
                WriteOp::Remove => store.remove_value(kind, &task_key).await,
            };
            match &result {
                Ok(()) => debug!(%kind, key = %task_key, op = op_name, "Write completed"),
                Err(e) => sink.report(ErrorReport::write(kind, task_key.as_str(), e.clone())),
            }
            // 调用方不关心结果时接收端已被丢弃
            let _ = tx.send(result);
        });

        WriteTicket {
            key,
            completion: rx,
        }
    }
}
