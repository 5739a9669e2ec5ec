use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{
    PaginatedResponse,
    activity_logs::{
        entities::{AdminActivityLog, NewActivityLog},
        requests::ActivityLogListQuery,
        responses::ActionCount,
    },
    evaluations::{
        entities::{
            Evaluation, EvaluationPeriod, EvaluationQuestion, EvaluationResponse, EvaluationType,
            IrregularEvaluation, NewEvaluationResponse,
        },
        responses::PeriodListResponse,
    },
    recommendations::entities::{Recommendation, StoredRecommendation},
    results::{
        entities::{EvaluationHistory, EvaluationResult, FailureLog, ResultUpsert},
        requests::HistoryListQuery,
        responses::HistoryListResponse,
    },
    sections::{
        entities::{Section, SectionAssignment},
        requests::{CreateSectionRequest, SectionListQuery, UpdateSectionRequest},
        responses::SectionListResponse,
    },
    system::{
        entities::SystemSetting, requests::SettingAuditQuery, responses::SettingAuditListResponse,
    },
    users::{
        entities::{User, UserRole},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段为哈希后的密码）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 按角色列出全部用户（按用户名排序）
    async fn list_users_by_roles(&self, roles: &[UserRole]) -> Result<Vec<User>>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 评估未通过跟踪
    // 记录一次未通过，返回更新后的连续未通过次数
    async fn record_evaluation_failure(
        &self,
        user_id: i64,
        period_id: Option<i64>,
        score: f64,
        passing_score: f64,
    ) -> Result<i32>;
    // 标记已向校长发送警报
    async fn mark_failure_alert_sent(&self, user_id: i64) -> Result<bool>;
    // 清零未通过次数；user_ids 为 None 时作用于全部用户并清空记录
    async fn reset_evaluation_failures(&self, user_ids: Option<Vec<i64>>) -> Result<u64>;
    // 最近的未通过记录
    async fn list_failure_logs(&self, user_id: i64, limit: u64) -> Result<Vec<FailureLog>>;

    /// 班级管理方法
    async fn create_section(&self, section: CreateSectionRequest) -> Result<Section>;
    async fn get_section_by_id(&self, id: i64) -> Result<Option<Section>>;
    async fn get_section_by_code(&self, code: &str) -> Result<Option<Section>>;
    async fn list_sections_with_pagination(
        &self,
        query: SectionListQuery,
    ) -> Result<SectionListResponse>;
    async fn update_section(
        &self,
        id: i64,
        update: UpdateSectionRequest,
    ) -> Result<Option<Section>>;
    async fn delete_section(&self, id: i64) -> Result<bool>;
    // 教职工任课班级
    async fn assign_section(&self, user_id: i64, section_id: i64) -> Result<SectionAssignment>;
    async fn remove_section_assignment(&self, user_id: i64, section_id: i64) -> Result<bool>;
    async fn list_user_section_assignments(&self, user_id: i64)
    -> Result<Vec<SectionAssignment>>;
    async fn has_section_assignment(&self, user_id: i64, section_id: i64) -> Result<bool>;

    /// 评估周期与发布状态
    async fn create_period(
        &self,
        name: &str,
        evaluation_type: EvaluationType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        is_active: bool,
    ) -> Result<EvaluationPeriod>;
    async fn get_period_by_id(&self, id: i64) -> Result<Option<EvaluationPeriod>>;
    async fn find_period_by_name(
        &self,
        evaluation_type: EvaluationType,
        name: &str,
    ) -> Result<Option<EvaluationPeriod>>;
    // 当前进行中的周期（多个时取最新）
    async fn get_active_period(
        &self,
        evaluation_type: EvaluationType,
    ) -> Result<Option<EvaluationPeriod>>;
    // 最近结束的周期
    async fn get_latest_inactive_period(
        &self,
        evaluation_type: EvaluationType,
    ) -> Result<Option<EvaluationPeriod>>;
    async fn list_periods(
        &self,
        evaluation_type: EvaluationType,
        is_active: Option<bool>,
    ) -> Result<Vec<EvaluationPeriod>>;
    async fn list_periods_with_pagination(
        &self,
        evaluation_type: Option<EvaluationType>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<PeriodListResponse>;
    // 重新激活周期
    async fn activate_period(
        &self,
        id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<EvaluationPeriod>>;
    // 关闭该类型所有进行中的周期，返回被关闭的周期
    async fn deactivate_active_periods(
        &self,
        evaluation_type: EvaluationType,
        end: DateTime<Utc>,
    ) -> Result<Vec<EvaluationPeriod>>;
    async fn get_evaluation_state(
        &self,
        evaluation_type: EvaluationType,
    ) -> Result<Option<Evaluation>>;
    // 设置发布状态，不存在时创建
    async fn set_evaluation_release(
        &self,
        evaluation_type: EvaluationType,
        is_released: bool,
        period_id: Option<i64>,
    ) -> Result<Evaluation>;

    /// 评估题目
    async fn list_questions(
        &self,
        evaluation_type: EvaluationType,
        active_only: bool,
    ) -> Result<Vec<EvaluationQuestion>>;
    async fn get_question_by_id(&self, id: i64) -> Result<Option<EvaluationQuestion>>;
    // 按题号写入题目，存在则更新文本
    async fn upsert_question(
        &self,
        evaluation_type: EvaluationType,
        question_number: i32,
        question_text: &str,
    ) -> Result<EvaluationQuestion>;
    async fn update_question(
        &self,
        id: i64,
        question_text: Option<String>,
        is_active: Option<bool>,
    ) -> Result<Option<EvaluationQuestion>>;
    // 删除题号大于 max_number 的题目
    async fn delete_questions_beyond(
        &self,
        evaluation_type: EvaluationType,
        max_number: i32,
    ) -> Result<u64>;

    /// 评估答卷
    async fn create_response(&self, response: NewEvaluationResponse)
    -> Result<EvaluationResponse>;
    async fn create_irregular_evaluation(
        &self,
        response: NewEvaluationResponse,
    ) -> Result<IrregularEvaluation>;
    // 同一周期内是否已评估过（含非正常班答卷）
    async fn response_exists(
        &self,
        evaluator_id: i64,
        evaluatee_id: i64,
        period_id: i64,
    ) -> Result<bool>;
    // section 为班级代码，按 student_section 精确匹配
    async fn list_responses_for_evaluatee(
        &self,
        evaluatee_id: i64,
        period_id: Option<i64>,
        section: Option<&str>,
    ) -> Result<Vec<EvaluationResponse>>;
    async fn list_irregular_for_evaluatee(
        &self,
        evaluatee_id: i64,
        period_id: Option<i64>,
    ) -> Result<Vec<IrregularEvaluation>>;
    // 评估者在周期内已评估的对象
    async fn list_evaluated_ids(&self, evaluator_id: i64, period_id: i64) -> Result<Vec<i64>>;
    // 周期内收到过答卷的对象
    async fn list_evaluatee_ids_with_responses(&self, period_id: i64) -> Result<Vec<i64>>;

    /// 评估结果与历史
    async fn upsert_result(&self, result: ResultUpsert) -> Result<EvaluationResult>;
    async fn list_results_by_period(&self, period_id: i64) -> Result<Vec<EvaluationResult>>;
    async fn list_results_for_user(
        &self,
        user_id: i64,
        period_id: Option<i64>,
    ) -> Result<Vec<EvaluationResult>>;
    async fn get_latest_result_for_user(&self, user_id: i64) -> Result<Option<EvaluationResult>>;
    // 把周期内全部结果写入历史，返回写入条数
    async fn archive_period_results(&self, period: &EvaluationPeriod) -> Result<usize>;
    async fn has_history_for_period(&self, period_id: i64) -> Result<bool>;
    async fn list_history_with_pagination(
        &self,
        query: HistoryListQuery,
    ) -> Result<HistoryListResponse>;
    async fn get_history_by_id(&self, id: i64) -> Result<Option<EvaluationHistory>>;

    /// AI 建议
    // 替换用户在该周期的全部建议
    async fn replace_recommendations(
        &self,
        user_id: i64,
        period_id: i64,
        evaluation_type: EvaluationType,
        section_code: Option<String>,
        recommendations: &[Recommendation],
    ) -> Result<Vec<StoredRecommendation>>;
    async fn list_recommendations(
        &self,
        user_id: i64,
        period_id: Option<i64>,
    ) -> Result<Vec<StoredRecommendation>>;

    /// 管理员操作日志
    async fn create_activity_log(&self, log: NewActivityLog) -> Result<AdminActivityLog>;
    async fn list_activity_logs_with_pagination(
        &self,
        query: ActivityLogListQuery,
    ) -> Result<PaginatedResponse<AdminActivityLog>>;
    async fn count_activity_logs_by_action(&self) -> Result<Vec<ActionCount>>;
    async fn delete_activity_logs_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// 系统设置
    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>>;
    async fn get_setting_by_key(&self, key: &str) -> Result<Option<SystemSetting>>;
    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        user_id: i64,
        ip_address: Option<String>,
    ) -> Result<SystemSetting>;
    async fn batch_update_settings(
        &self,
        updates: Vec<(String, String)>,
        user_id: i64,
        ip_address: Option<String>,
    ) -> Result<Vec<SystemSetting>>;
    async fn list_setting_audits(&self, query: SettingAuditQuery)
    -> Result<SettingAuditListResponse>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
