use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 配置值类型
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub enum SettingValueType {
    String,
    Integer,
    Float,
    Boolean,
    JsonArray,
}

impl SettingValueType {
    /// 检查字符串能否按该类型解析
    pub fn validate(&self, value: &str) -> Result<(), String> {
        let ok = match self {
            SettingValueType::String => true,
            SettingValueType::Integer => value.trim().parse::<i64>().is_ok(),
            SettingValueType::Float => value.trim().parse::<f64>().is_ok_and(|v| v.is_finite()),
            SettingValueType::Boolean => matches!(value.trim(), "true" | "false"),
            SettingValueType::JsonArray => serde_json::from_str::<Vec<String>>(value).is_ok(),
        };
        if ok {
            Ok(())
        } else {
            Err(format!("配置值 '{value}' 不是有效的 {self}"))
        }
    }
}

impl<'de> Deserialize<'de> for SettingValueType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的配置值类型: '{s}'. 支持的类型: string, integer, float, boolean, json_array"
            ))
        })
    }
}

impl std::fmt::Display for SettingValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValueType::String => write!(f, "string"),
            SettingValueType::Integer => write!(f, "integer"),
            SettingValueType::Float => write!(f, "float"),
            SettingValueType::Boolean => write!(f, "boolean"),
            SettingValueType::JsonArray => write!(f, "json_array"),
        }
    }
}

impl std::str::FromStr for SettingValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(SettingValueType::String),
            "integer" => Ok(SettingValueType::Integer),
            "float" => Ok(SettingValueType::Float),
            "boolean" => Ok(SettingValueType::Boolean),
            "json_array" => Ok(SettingValueType::JsonArray),
            _ => Err(format!("Invalid setting value type: {s}")),
        }
    }
}

/// 已知配置键
#[derive(Debug, Clone, PartialEq)]
pub enum KnownSettingKey {
    SystemName,
    AccessTokenExpiry,
    RefreshTokenExpiry,
    PassingScore,
    MaxFailureAttempts,
    PeriodDays,
    SchoolHeadEmail,
    AiEnabled,
    ActivityLogRetentionDays,
}

impl KnownSettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownSettingKey::SystemName => "app.system_name",
            KnownSettingKey::AccessTokenExpiry => "jwt.access_token_expiry",
            KnownSettingKey::RefreshTokenExpiry => "jwt.refresh_token_expiry",
            KnownSettingKey::PassingScore => "evaluation.passing_score",
            KnownSettingKey::MaxFailureAttempts => "evaluation.max_failure_attempts",
            KnownSettingKey::PeriodDays => "evaluation.period_days",
            KnownSettingKey::SchoolHeadEmail => "mail.school_head_email",
            KnownSettingKey::AiEnabled => "ai.enabled",
            KnownSettingKey::ActivityLogRetentionDays => "activity_log.retention_days",
        }
    }

    pub fn value_type(&self) -> SettingValueType {
        match self {
            KnownSettingKey::SystemName | KnownSettingKey::SchoolHeadEmail => {
                SettingValueType::String
            }
            KnownSettingKey::PassingScore => SettingValueType::Float,
            KnownSettingKey::AiEnabled => SettingValueType::Boolean,
            KnownSettingKey::AccessTokenExpiry
            | KnownSettingKey::RefreshTokenExpiry
            | KnownSettingKey::MaxFailureAttempts
            | KnownSettingKey::PeriodDays
            | KnownSettingKey::ActivityLogRetentionDays => SettingValueType::Integer,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            KnownSettingKey::SystemName,
            KnownSettingKey::AccessTokenExpiry,
            KnownSettingKey::RefreshTokenExpiry,
            KnownSettingKey::PassingScore,
            KnownSettingKey::MaxFailureAttempts,
            KnownSettingKey::PeriodDays,
            KnownSettingKey::SchoolHeadEmail,
            KnownSettingKey::AiEnabled,
            KnownSettingKey::ActivityLogRetentionDays,
        ]
    }
}

impl std::str::FromStr for KnownSettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown setting key: {s}"))
    }
}

/// 系统设置实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub value_type: SettingValueType,
    pub description: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub updated_by: Option<i64>,
}

/// 设置审计日志实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SettingAudit {
    pub id: i64,
    pub setting_key: String,
    pub old_value: Option<String>,
    pub new_value: String,
    pub changed_by: i64,
    pub changed_at: chrono::DateTime<chrono::Utc>,
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_key_roundtrip() {
        for key in KnownSettingKey::all() {
            assert_eq!(key.as_str().parse::<KnownSettingKey>().unwrap(), key);
        }
        assert!("upload.max_size".parse::<KnownSettingKey>().is_err());
    }

    #[test]
    fn test_value_validation() {
        let passing = KnownSettingKey::PassingScore.value_type();
        assert!(passing.validate("72.5").is_ok());
        assert!(passing.validate("abc").is_err());
        assert!(SettingValueType::Boolean.validate("yes").is_err());
        assert!(SettingValueType::Integer.validate(" 3 ").is_ok());
        assert!(SettingValueType::JsonArray.validate(r#"["a"]"#).is_ok());
    }
}
