//! 可观测性接收端
//!
//! 订阅推送错误与写入错误都上报到这里，接收端不要求持久化。

use std::sync::Mutex;

use tracing::{error, warn};

use crate::errors::ClassHubError;
use crate::models::CollectionKind;

/// 错误来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSource {
    Subscription { kind: CollectionKind },
    Write { kind: CollectionKind, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub source: ErrorSource,
    pub error: ClassHubError,
}

impl ErrorReport {
    pub fn subscription(kind: CollectionKind, error: ClassHubError) -> Self {
        Self {
            source: ErrorSource::Subscription { kind },
            error,
        }
    }

    pub fn write(kind: CollectionKind, key: impl Into<String>, error: ClassHubError) -> Self {
        Self {
            source: ErrorSource::Write {
                kind,
                key: key.into(),
            },
            error,
        }
    }
}

pub trait ErrorSink: Send + Sync {
    fn report(&self, report: ErrorReport);
}

/// 默认接收端：写入日志
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, report: ErrorReport) {
        match report.source {
            ErrorSource::Subscription { kind } => {
                warn!(
                    %kind,
                    code = report.error.code(),
                    error = %report.error.message(),
                    "Subscription delivery failed, keeping last snapshot"
                );
            }
            ErrorSource::Write { kind, key } => {
                error!(
                    %kind,
                    %key,
                    code = report.error.code(),
                    error = %report.error.message(),
                    "Write operation failed"
                );
            }
        }
    }
}

/// 在内存中收集上报，供测试断言
#[derive(Debug, Default)]
pub struct RecordingErrorSink {
    reports: Mutex<Vec<ErrorReport>>,
}

impl RecordingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorSink for RecordingErrorSink {
    fn report(&self, report: ErrorReport) {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingErrorSink::new();
        assert!(sink.is_empty());
        sink.report(ErrorReport::subscription(
            CollectionKind::Grades,
            ClassHubError::subscription("permission denied"),
        ));
        sink.report(ErrorReport::write(
            CollectionKind::Classes,
            "c1",
            ClassHubError::write("offline"),
        ));

        let reports = sink.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(
            reports[0].source,
            ErrorSource::Subscription {
                kind: CollectionKind::Grades
            }
        );
        assert_eq!(reports[1].error.code(), "E005");
    }
}
