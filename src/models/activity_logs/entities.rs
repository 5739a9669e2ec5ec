use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 管理员操作类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/activity_log.ts")]
pub enum ActivityAction {
    ReleaseEvaluation,
    UnreleaseEvaluation,
    CreateUser,
    UpdateUser,
    DeleteUser,
    ImportAccounts,
    ExportAccounts,
    CreateSection,
    UpdateSection,
    DeleteSection,
    AssignSection,
    RemoveSectionAssignment,
    UpdateQuestions,
    ResetQuestions,
    ResetFailures,
    ProcessResults,
    UpdateSetting,
    CleanupLogs,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::ReleaseEvaluation => "release_evaluation",
            ActivityAction::UnreleaseEvaluation => "unrelease_evaluation",
            ActivityAction::CreateUser => "create_user",
            ActivityAction::UpdateUser => "update_user",
            ActivityAction::DeleteUser => "delete_user",
            ActivityAction::ImportAccounts => "import_accounts",
            ActivityAction::ExportAccounts => "export_accounts",
            ActivityAction::CreateSection => "create_section",
            ActivityAction::UpdateSection => "update_section",
            ActivityAction::DeleteSection => "delete_section",
            ActivityAction::AssignSection => "assign_section",
            ActivityAction::RemoveSectionAssignment => "remove_section_assignment",
            ActivityAction::UpdateQuestions => "update_questions",
            ActivityAction::ResetQuestions => "reset_questions",
            ActivityAction::ResetFailures => "reset_failures",
            ActivityAction::ProcessResults => "process_results",
            ActivityAction::UpdateSetting => "update_setting",
            ActivityAction::CleanupLogs => "cleanup_logs",
        }
    }

    pub fn all() -> &'static [ActivityAction] {
        &[
            ActivityAction::ReleaseEvaluation,
            ActivityAction::UnreleaseEvaluation,
            ActivityAction::CreateUser,
            ActivityAction::UpdateUser,
            ActivityAction::DeleteUser,
            ActivityAction::ImportAccounts,
            ActivityAction::ExportAccounts,
            ActivityAction::CreateSection,
            ActivityAction::UpdateSection,
            ActivityAction::DeleteSection,
            ActivityAction::AssignSection,
            ActivityAction::RemoveSectionAssignment,
            ActivityAction::UpdateQuestions,
            ActivityAction::ResetQuestions,
            ActivityAction::ResetFailures,
            ActivityAction::ProcessResults,
            ActivityAction::UpdateSetting,
            ActivityAction::CleanupLogs,
        ]
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Invalid activity action: {s}"))
    }
}

// 管理员操作日志
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/activity_log.ts")]
pub struct AdminActivityLog {
    pub id: i64,
    pub admin_id: Option<i64>,
    pub action: ActivityAction,
    pub target_user_id: Option<i64>,
    pub target_section_id: Option<i64>,
    pub description: String,
    pub ip_address: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// 新日志（存储层输入）
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub admin_id: Option<i64>,
    pub action: ActivityAction,
    pub target_user_id: Option<i64>,
    pub target_section_id: Option<i64>,
    pub description: String,
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_string_roundtrip() {
        for action in ActivityAction::all() {
            assert_eq!(action.as_str().parse::<ActivityAction>().unwrap(), *action);
            let json = serde_json::to_string(action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }
}
