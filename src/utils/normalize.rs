//! 原始记录字段规范化
//!
//! 远程存储推送的每条记录都是无类型的键值表，字段可能缺失、类型可能不符。
//! 这里的函数只做"尽量读取"，读取失败一律返回 `None` 或默认值，不会报错。

use serde_json::{Map, Value};

/// 以秒为单位的 Unix 时间戳
pub type EpochSeconds = f64;

/// 大于该值的时间戳视为毫秒
pub const MILLISECOND_THRESHOLD: f64 = 1_000_000_000_000.0;

/// 原始记录（字段表）
pub type RawFields = Map<String, Value>;

/// 将时间戳统一为秒
pub fn normalize_epoch(raw: f64) -> EpochSeconds {
    if raw > MILLISECOND_THRESHOLD {
        raw / 1000.0
    } else {
        raw
    }
}

/// 规范化 ID：去除首尾空白，空串视为缺失
pub fn normalize_id(id: Option<&str>) -> Option<&str> {
    let trimmed = id?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// 比较两个 ID：两者都存在且规范化后相同才相等
pub fn ids_equal(a: Option<&str>, b: Option<&str>) -> bool {
    match (normalize_id(a), normalize_id(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// 读取字符串字段
pub fn string_field(fields: &RawFields, name: &str) -> Option<String> {
    fields.get(name)?.as_str().map(str::to_string)
}

/// 读取数值字段（任意 JSON 数字表示）
pub fn number_field(fields: &RawFields, name: &str) -> Option<f64> {
    let value = fields.get(name)?.as_f64()?;
    value.is_finite().then_some(value)
}

/// 读取整数字段，小数部分截断
pub fn integer_field(fields: &RawFields, name: &str) -> Option<i64> {
    let value = fields.get(name)?;
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(n) = value.as_u64() {
        return Some(i64::try_from(n).unwrap_or(i64::MAX));
    }
    let n = value.as_f64()?;
    n.is_finite().then(|| n.trunc() as i64)
}

/// 读取布尔字段，数字非零视为 true
pub fn bool_field(fields: &RawFields, name: &str) -> Option<bool> {
    match fields.get(name)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    }
}

/// 读取时间戳字段并统一为秒
pub fn timestamp_field(fields: &RawFields, name: &str) -> Option<EpochSeconds> {
    number_field(fields, name).map(normalize_epoch)
}

/// 读取字符串列表，非字符串元素被跳过
pub fn string_list_field(fields: &RawFields, name: &str) -> Vec<String> {
    match fields.get(name) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> RawFields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_epoch_seconds_unchanged() {
        assert_eq!(normalize_epoch(1_700_000_000.0), 1_700_000_000.0);
    }

    #[test]
    fn test_epoch_milliseconds_divided() {
        assert_eq!(normalize_epoch(1_700_000_000_000.0), 1_700_000_000.0);
    }

    #[test]
    fn test_epoch_threshold_is_exclusive() {
        assert_eq!(normalize_epoch(MILLISECOND_THRESHOLD), MILLISECOND_THRESHOLD);
    }

    #[test]
    fn test_timestamp_field_accepts_integer_and_float() {
        let raw = fields(json!({ "a": 1_700_000_000_000i64, "b": 1_700_000_000.5 }));
        assert_eq!(timestamp_field(&raw, "a"), Some(1_700_000_000.0));
        assert_eq!(timestamp_field(&raw, "b"), Some(1_700_000_000.5));
        assert_eq!(timestamp_field(&raw, "missing"), None);
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id(Some("abc ")), Some("abc"));
        assert_eq!(normalize_id(Some("")), None);
        assert_eq!(normalize_id(Some(" ")), None);
        assert_eq!(normalize_id(None), None);
    }

    #[test]
    fn test_ids_equal() {
        assert!(ids_equal(Some("abc "), Some("abc")));
        assert!(ids_equal(Some("\tabc"), Some("abc\n")));
        assert!(!ids_equal(Some(" "), Some("")));
        assert!(!ids_equal(None, None));
        assert!(!ids_equal(Some("abc"), Some("abd")));
    }

    #[test]
    fn test_integer_field_coercion() {
        let raw = fields(json!({ "i": 10, "f": 12.9, "s": "7" }));
        assert_eq!(integer_field(&raw, "i"), Some(10));
        assert_eq!(integer_field(&raw, "f"), Some(12));
        assert_eq!(integer_field(&raw, "s"), None);
    }

    #[test]
    fn test_bool_field_accepts_numbers() {
        let raw = fields(json!({ "t": true, "one": 1, "zero": 0, "s": "yes" }));
        assert_eq!(bool_field(&raw, "t"), Some(true));
        assert_eq!(bool_field(&raw, "one"), Some(true));
        assert_eq!(bool_field(&raw, "zero"), Some(false));
        assert_eq!(bool_field(&raw, "s"), None);
    }

    #[test]
    fn test_string_list_skips_non_strings() {
        let raw = fields(json!({ "l": ["a", 1, "b", null], "o": { "x": "y" } }));
        assert_eq!(string_list_field(&raw, "l"), vec!["a", "b"]);
        assert!(string_list_field(&raw, "o").is_empty());
        assert!(string_list_field(&raw, "missing").is_empty());
    }
}
