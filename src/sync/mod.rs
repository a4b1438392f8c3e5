//! 同步层：集合镜像、订阅管理与错误上报

pub mod mirror;
pub mod sink;
pub mod subscription;

pub use mirror::{CollectionMirror, MirrorContents, MirrorView, Mirrors};
pub use sink::{ErrorReport, ErrorSink, ErrorSource, RecordingErrorSink, TracingErrorSink};
pub use subscription::{SubscriptionManager, decode_snapshot, skipped_records_error};
