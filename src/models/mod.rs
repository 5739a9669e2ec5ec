pub mod activity_logs;
pub mod auth;
pub mod common;
pub mod evaluations;
pub mod recommendations;
pub mod results;
pub mod sections;
pub mod system;
pub mod users;

pub use common::*;

use serde::Serialize;
use ts_rs::TS;

/// 业务错误码
///
/// 0 表示成功；1xxx 通用，2xxx 认证，3xxx 用户，4xxx 班级，
/// 5xxx 评估，6xxx 导入导出，7xxx AI 建议，8xxx 系统设置。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    AuthFailed = 2000,
    RegisterFailed = 2001,
    EmailDomainNotAllowed = 2002,

    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserNameInvalid = 3002,
    UserEmailInvalid = 3003,
    UserPasswordInvalid = 3004,
    UserNameAlreadyExists = 3005,
    UserEmailAlreadyExists = 3006,
    UserCreationFailed = 3007,
    UserUpdateFailed = 3008,
    UserDeleteFailed = 3009,
    UserProfileInvalid = 3010,
    CanNotDeleteCurrentUser = 3011,

    SectionNotFound = 4000,
    SectionAlreadyExists = 4001,
    SectionAssignmentExists = 4002,
    SectionAssignmentNotFound = 4003,
    SectionCodeInvalid = 4004,

    EvaluationNotReleased = 5000,
    EvaluationAlreadyReleased = 5001,
    EvaluationPeriodNotFound = 5002,
    EvaluationAlreadySubmitted = 5003,
    EvaluationNotAllowed = 5004,
    EvaluationRatingsInvalid = 5005,
    EvaluationResultsLocked = 5006,
    EvaluationQuestionNotFound = 5007,

    ImportFileParseFailed = 6000,
    ImportFileMissingColumn = 6001,
    ImportFileDataInvalid = 6002,
    ImportFileTypeNotAllowed = 6003,
    ImportFileSizeExceeded = 6004,
    ExportFailed = 6005,

    RecommendationFailed = 7000,

    SettingNotFound = 8000,
    SettingValueInvalid = 8001,
}
