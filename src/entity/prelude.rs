//! 预导入模块，方便使用

pub use super::admin_activity_logs::{
    ActiveModel as AdminActivityLogActiveModel, Entity as AdminActivityLogs,
    Model as AdminActivityLogModel,
};
pub use super::ai_recommendations::{
    ActiveModel as AiRecommendationActiveModel, Entity as AiRecommendations,
    Model as AiRecommendationModel,
};
pub use super::evaluation_failure_logs::{
    ActiveModel as FailureLogActiveModel, Entity as EvaluationFailureLogs,
    Model as FailureLogModel,
};
pub use super::evaluation_history::{
    ActiveModel as HistoryActiveModel, Entity as EvaluationHistory, Model as HistoryModel,
};
pub use super::evaluation_periods::{
    ActiveModel as PeriodActiveModel, Entity as EvaluationPeriods, Model as PeriodModel,
};
pub use super::evaluation_questions::{
    ActiveModel as QuestionActiveModel, Entity as EvaluationQuestions, Model as QuestionModel,
};
pub use super::evaluation_responses::{
    ActiveModel as ResponseActiveModel, Entity as EvaluationResponses, Model as ResponseModel,
};
pub use super::evaluation_results::{
    ActiveModel as ResultActiveModel, Entity as EvaluationResults, Model as ResultModel,
};
pub use super::evaluations::{
    ActiveModel as EvaluationActiveModel, Entity as Evaluations, Model as EvaluationModel,
};
pub use super::irregular_evaluations::{
    ActiveModel as IrregularActiveModel, Entity as IrregularEvaluations,
    Model as IrregularModel,
};
pub use super::section_assignments::{
    ActiveModel as SectionAssignmentActiveModel, Entity as SectionAssignments,
    Model as SectionAssignmentModel,
};
pub use super::sections::{
    ActiveModel as SectionActiveModel, Entity as Sections, Model as SectionModel,
};
pub use super::system_settings::{
    ActiveModel as SystemSettingActiveModel, Entity as SystemSettings, Model as SystemSettingModel,
};
pub use super::system_settings_audit::{
    ActiveModel as SettingAuditActiveModel, Entity as SystemSettingsAudit,
    Model as SettingAuditModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
