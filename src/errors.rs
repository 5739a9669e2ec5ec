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
macro_rules! define_edulytics_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum EdulyticsError {
            $($variant(String),)*
        }

        impl EdulyticsError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(EdulyticsError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(EdulyticsError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(EdulyticsError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl EdulyticsError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        EdulyticsError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_edulytics_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    StoragePluginNotFound("E010", "Storage Plugin Not Found"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    Conflict("E014", "Resource Conflict"),
    ExternalService("E015", "External Service Error"),
    Mail("E016", "Mail Delivery Error"),
    MailPluginNotFound("E017", "Mail Plugin Not Found"),
    Import("E018", "Import Error"),
}

impl EdulyticsError {
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

impl fmt::Display for EdulyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for EdulyticsError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for EdulyticsError {
    fn from(err: sea_orm::DbErr) -> Self {
        EdulyticsError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for EdulyticsError {
    fn from(err: std::io::Error) -> Self {
        EdulyticsError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for EdulyticsError {
    fn from(err: serde_json::Error) -> Self {
        EdulyticsError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for EdulyticsError {
    fn from(err: chrono::ParseError) -> Self {
        EdulyticsError::DateParse(err.to_string())
    }
}

impl From<reqwest::Error> for EdulyticsError {
    fn from(err: reqwest::Error) -> Self {
        EdulyticsError::ExternalService(err.to_string())
    }
}

impl From<csv::Error> for EdulyticsError {
    fn from(err: csv::Error) -> Self {
        EdulyticsError::Import(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EdulyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(EdulyticsError::cache_connection("test").code(), "E001");
        assert_eq!(EdulyticsError::database_config("test").code(), "E003");
        assert_eq!(EdulyticsError::validation("test").code(), "E007");
        assert_eq!(EdulyticsError::authentication("test").code(), "E012");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            EdulyticsError::cache_connection("test").error_type(),
            "Cache Connection Error"
        );
        assert_eq!(
            EdulyticsError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_domain_error_codes() {
        assert_eq!(EdulyticsError::conflict("dup").code(), "E014");
        assert_eq!(EdulyticsError::external_service("down").code(), "E015");
        assert_eq!(
            EdulyticsError::mail_plugin_not_found("smtp").error_type(),
            "Mail Plugin Not Found"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: EdulyticsError = serde_json::from_str::<Vec<u8>>("not json")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "E009");
    }

    #[test]
    fn test_error_message() {
        let err = EdulyticsError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = EdulyticsError::validation("Invalid rating");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid rating"));
    }
}
