use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    Student,     // 学生
    Faculty,     // 教师
    Coordinator, // 项目协调员
    Dean,        // 院长
    Admin,       // 管理员
}

impl UserRole {
    pub const STUDENT: &'static str = "student";
    pub const FACULTY: &'static str = "faculty";
    pub const COORDINATOR: &'static str = "coordinator";
    pub const DEAN: &'static str = "dean";
    pub const ADMIN: &'static str = "admin";

    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }
    /// 可被评估的教职工
    pub fn staff_roles() -> &'static [&'static UserRole] {
        &[&Self::Faculty, &Self::Coordinator, &Self::Dean]
    }
    pub fn staff_and_admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Faculty, &Self::Coordinator, &Self::Dean, &Self::Admin]
    }
    pub fn evaluator_roles() -> &'static [&'static UserRole] {
        &[&Self::Student, &Self::Faculty, &Self::Coordinator, &Self::Dean]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[
            &Self::Student,
            &Self::Faculty,
            &Self::Coordinator,
            &Self::Dean,
            &Self::Admin,
        ]
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Faculty | Self::Coordinator | Self::Dean)
    }

    /// 院长与协调员使用管理岗位的建议模板
    pub fn is_leader(&self) -> bool {
        matches!(self, Self::Coordinator | Self::Dean)
    }

    /// 界面与邮件中显示的名称
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::Faculty => "Faculty",
            UserRole::Coordinator => "Coordinator",
            UserRole::Dean => "Dean",
            UserRole::Admin => "Admin",
        }
    }

    /// 导出排序：学生、教师、协调员、院长、管理员
    pub fn sort_order(&self) -> u8 {
        match self {
            UserRole::Student => 0,
            UserRole::Faculty => 1,
            UserRole::Coordinator => 2,
            UserRole::Dean => 3,
            UserRole::Admin => 4,
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: student, faculty, coordinator, dean, admin"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
            UserRole::Faculty => write!(f, "{}", UserRole::FACULTY),
            UserRole::Coordinator => write!(f, "{}", UserRole::COORDINATOR),
            UserRole::Dean => write!(f, "{}", UserRole::DEAN),
            UserRole::Admin => write!(f, "{}", UserRole::ADMIN),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    // 导入文件中常见大写写法，忽略大小写
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            UserRole::STUDENT => Ok(UserRole::Student),
            UserRole::FACULTY => Ok(UserRole::Faculty),
            UserRole::COORDINATOR => Ok(UserRole::Coordinator),
            UserRole::DEAN => Ok(UserRole::Dean),
            UserRole::ADMIN => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户状态
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserStatus {
    Active,    // 活跃
    Inactive,  // 非活跃
    Suspended, // 暂停
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户状态: '{s}'. 支持的状态: active, inactive, suspended"
            ))
        })
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
            UserStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Invalid user status: {s}")),
        }
    }
}

// 用户档案
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserProfile {
    pub display_name: String,
    /// 学号，格式 NN-NNNN
    #[serde(default)]
    pub student_number: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub section_id: Option<i64>,
    /// 教职工所属学院
    #[serde(default)]
    pub institute: Option<String>,
    /// 非正常班学生不受班级分配限制
    #[serde(default)]
    pub is_irregular: bool,
}

// 评估未通过跟踪
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct FailureTracking {
    pub failure_count: i32,
    pub last_failure_date: Option<chrono::DateTime<chrono::Utc>>,
    pub alert_sent: bool,
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub profile: UserProfile,
    /// 所在班级代码（由 profile.section_id 关联得到）
    pub section_code: Option<String>,
    pub failure: FailureTracking,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.profile.display_name.is_empty() {
            &self.username
        } else {
            &self.profile.display_name
        }
    }

    // 生成访问令牌
    pub fn generate_access_token(&self) -> crate::errors::Result<String> {
        crate::utils::jwt::JwtUtils::generate_access_token(self.id, &self.role.to_string())
            .map_err(|e| crate::errors::EdulyticsError::authentication(format!("生成 access token 失败: {e}")))
    }

    // 生成 token 对（access + refresh）
    pub fn generate_token_pair(
        &self,
        refresh_token_expiry: Option<chrono::TimeDelta>,
    ) -> Result<crate::utils::jwt::TokenPair, String> {
        crate::utils::jwt::JwtUtils::generate_token_pair(
            self.id,
            &self.role.to_string(),
            refresh_token_expiry,
        )
        .map_err(|e| format!("生成 token 对失败: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("FACULTY".parse::<UserRole>().unwrap(), UserRole::Faculty);
        assert_eq!(" Dean ".parse::<UserRole>().unwrap(), UserRole::Dean);
        assert!("teacher".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_groups() {
        assert!(UserRole::Coordinator.is_staff());
        assert!(!UserRole::Admin.is_staff());
        assert!(!UserRole::Student.is_staff());
        assert!(UserRole::Dean.is_leader());
        assert!(!UserRole::Faculty.is_leader());
        assert_eq!(UserRole::staff_roles().len(), 3);
    }

    #[test]
    fn test_role_serde_roundtrip_uses_snake_case() {
        let json = serde_json::to_string(&UserRole::Coordinator).unwrap();
        assert_eq!(json, "\"coordinator\"");
        let role: UserRole = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, UserRole::Student);
    }
}
