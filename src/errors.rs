//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_classhub_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ClassHubError {
            $($variant(String),)*
        }

        impl ClassHubError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ClassHubError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ClassHubError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ClassHubError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ClassHubError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ClassHubError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_classhub_errors! {
    Config("E001", "Configuration Error"),
    StoreConnection("E002", "Remote Store Connection Error"),
    StorePluginNotFound("E003", "Remote Store Plugin Not Found"),
    Subscription("E004", "Subscription Delivery Error"),
    Write("E005", "Write Operation Error"),
    Decode("E006", "Record Decode Error"),
    NotFound("E007", "Resource Not Found"),
    Validation("E008", "Validation Error"),
    Serialization("E009", "Serialization Error"),
    Authentication("E010", "Authentication Error"),
    Shutdown("E011", "Shutdown Error"),
}

impl ClassHubError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ClassHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ClassHubError {}

// 为常见的错误类型实现 From trait
impl From<config::ConfigError> for ClassHubError {
    fn from(err: config::ConfigError) -> Self {
        ClassHubError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ClassHubError {
    fn from(err: std::io::Error) -> Self {
        ClassHubError::StoreConnection(err.to_string())
    }
}

impl From<serde_json::Error> for ClassHubError {
    fn from(err: serde_json::Error) -> Self {
        ClassHubError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClassHubError>;
