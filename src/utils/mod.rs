pub mod normalize;

pub use normalize::{EpochSeconds, RawFields, ids_equal, normalize_epoch, normalize_id};

/// 当前时间（秒）
pub fn now_epoch_seconds() -> EpochSeconds {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
