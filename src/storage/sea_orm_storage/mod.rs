//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod activity_logs;
mod failures;
mod periods;
mod questions;
mod recommendations;
mod responses;
mod results;
mod sections;
mod system_settings;
mod users;

use crate::config::AppConfig;
use crate::errors::{EdulyticsError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EdulyticsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| EdulyticsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| EdulyticsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EdulyticsError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 测试用内存数据库
    #[cfg(test)]
    pub(crate) async fn new_in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .map_err(|e| EdulyticsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }
}


// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn list_users_by_roles(&self, roles: &[UserRole]) -> Result<Vec<User>> {
        self.list_users_by_roles_impl(roles).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 未通过跟踪
    async fn record_evaluation_failure(
        &self,
        user_id: i64,
        period_id: Option<i64>,
        score: f64,
        passing_score: f64,
    ) -> Result<i32> {
        self.record_evaluation_failure_impl(user_id, period_id, score, passing_score).await
    }

    async fn mark_failure_alert_sent(&self, user_id: i64) -> Result<bool> {
        self.mark_failure_alert_sent_impl(user_id).await
    }

    async fn reset_evaluation_failures(&self, user_ids: Option<Vec<i64>>) -> Result<u64> {
        self.reset_evaluation_failures_impl(user_ids).await
    }

    async fn list_failure_logs(&self, user_id: i64, limit: u64) -> Result<Vec<FailureLog>> {
        self.list_failure_logs_impl(user_id, limit).await
    }

    // 班级模块
    async fn create_section(&self, section: CreateSectionRequest) -> Result<Section> {
        self.create_section_impl(section).await
    }

    async fn get_section_by_id(&self, id: i64) -> Result<Option<Section>> {
        self.get_section_by_id_impl(id).await
    }

    async fn get_section_by_code(&self, code: &str) -> Result<Option<Section>> {
        self.get_section_by_code_impl(code).await
    }

    async fn list_sections_with_pagination(
        &self,
        query: SectionListQuery,
    ) -> Result<SectionListResponse> {
        self.list_sections_with_pagination_impl(query).await
    }

    async fn update_section(
        &self,
        id: i64,
        update: UpdateSectionRequest,
    ) -> Result<Option<Section>> {
        self.update_section_impl(id, update).await
    }

    async fn delete_section(&self, id: i64) -> Result<bool> {
        self.delete_section_impl(id).await
    }

    async fn assign_section(&self, user_id: i64, section_id: i64) -> Result<SectionAssignment> {
        self.assign_section_impl(user_id, section_id).await
    }

    async fn remove_section_assignment(&self, user_id: i64, section_id: i64) -> Result<bool> {
        self.remove_section_assignment_impl(user_id, section_id).await
    }

    async fn list_user_section_assignments(&self, user_id: i64) -> Result<Vec<SectionAssignment>> {
        self.list_user_section_assignments_impl(user_id).await
    }

    async fn has_section_assignment(&self, user_id: i64, section_id: i64) -> Result<bool> {
        self.has_section_assignment_impl(user_id, section_id).await
    }

    // 评估周期模块
    async fn create_period(
        &self,
        name: &str,
        evaluation_type: EvaluationType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        is_active: bool,
    ) -> Result<EvaluationPeriod> {
        self.create_period_impl(name, evaluation_type, start, end, is_active).await
    }

    async fn get_period_by_id(&self, id: i64) -> Result<Option<EvaluationPeriod>> {
        self.get_period_by_id_impl(id).await
    }

    async fn find_period_by_name(
        &self,
        evaluation_type: EvaluationType,
        name: &str,
    ) -> Result<Option<EvaluationPeriod>> {
        self.find_period_by_name_impl(evaluation_type, name).await
    }

    async fn get_active_period(
        &self,
        evaluation_type: EvaluationType,
    ) -> Result<Option<EvaluationPeriod>> {
        self.get_active_period_impl(evaluation_type).await
    }

    async fn get_latest_inactive_period(
        &self,
        evaluation_type: EvaluationType,
    ) -> Result<Option<EvaluationPeriod>> {
        self.get_latest_inactive_period_impl(evaluation_type).await
    }

    async fn list_periods(
        &self,
        evaluation_type: EvaluationType,
        is_active: Option<bool>,
    ) -> Result<Vec<EvaluationPeriod>> {
        self.list_periods_impl(evaluation_type, is_active).await
    }

    async fn list_periods_with_pagination(
        &self,
        evaluation_type: Option<EvaluationType>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<PeriodListResponse> {
        self.list_periods_with_pagination_impl(evaluation_type, page, size).await
    }

    async fn activate_period(
        &self,
        id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<EvaluationPeriod>> {
        self.activate_period_impl(id, start, end).await
    }

    async fn deactivate_active_periods(
        &self,
        evaluation_type: EvaluationType,
        end: DateTime<Utc>,
    ) -> Result<Vec<EvaluationPeriod>> {
        self.deactivate_active_periods_impl(evaluation_type, end).await
    }

    async fn get_evaluation_state(
        &self,
        evaluation_type: EvaluationType,
    ) -> Result<Option<Evaluation>> {
        self.get_evaluation_state_impl(evaluation_type).await
    }

    async fn set_evaluation_release(
        &self,
        evaluation_type: EvaluationType,
        is_released: bool,
        period_id: Option<i64>,
    ) -> Result<Evaluation> {
        self.set_evaluation_release_impl(evaluation_type, is_released, period_id).await
    }

    // 题目模块
    async fn list_questions(
        &self,
        evaluation_type: EvaluationType,
        active_only: bool,
    ) -> Result<Vec<EvaluationQuestion>> {
        self.list_questions_impl(evaluation_type, active_only).await
    }

    async fn get_question_by_id(&self, id: i64) -> Result<Option<EvaluationQuestion>> {
        self.get_question_by_id_impl(id).await
    }

    async fn upsert_question(
        &self,
        evaluation_type: EvaluationType,
        question_number: i32,
        question_text: &str,
    ) -> Result<EvaluationQuestion> {
        self.upsert_question_impl(evaluation_type, question_number, question_text).await
    }

    async fn update_question(
        &self,
        id: i64,
        question_text: Option<String>,
        is_active: Option<bool>,
    ) -> Result<Option<EvaluationQuestion>> {
        self.update_question_impl(id, question_text, is_active).await
    }

    async fn delete_questions_beyond(
        &self,
        evaluation_type: EvaluationType,
        max_number: i32,
    ) -> Result<u64> {
        self.delete_questions_beyond_impl(evaluation_type, max_number).await
    }

    // 答卷模块
    async fn create_response(&self, response: NewEvaluationResponse) -> Result<EvaluationResponse> {
        self.create_response_impl(response).await
    }

    async fn create_irregular_evaluation(
        &self,
        response: NewEvaluationResponse,
    ) -> Result<IrregularEvaluation> {
        self.create_irregular_evaluation_impl(response).await
    }

    async fn response_exists(
        &self,
        evaluator_id: i64,
        evaluatee_id: i64,
        period_id: i64,
    ) -> Result<bool> {
        self.response_exists_impl(evaluator_id, evaluatee_id, period_id).await
    }

    async fn list_responses_for_evaluatee(
        &self,
        evaluatee_id: i64,
        period_id: Option<i64>,
        section: Option<&str>,
    ) -> Result<Vec<EvaluationResponse>> {
        self.list_responses_for_evaluatee_impl(evaluatee_id, period_id, section).await
    }

    async fn list_irregular_for_evaluatee(
        &self,
        evaluatee_id: i64,
        period_id: Option<i64>,
    ) -> Result<Vec<IrregularEvaluation>> {
        self.list_irregular_for_evaluatee_impl(evaluatee_id, period_id).await
    }

    async fn list_evaluated_ids(&self, evaluator_id: i64, period_id: i64) -> Result<Vec<i64>> {
        self.list_evaluated_ids_impl(evaluator_id, period_id).await
    }

    async fn list_evaluatee_ids_with_responses(&self, period_id: i64) -> Result<Vec<i64>> {
        self.list_evaluatee_ids_with_responses_impl(period_id).await
    }

    // 结果与历史模块
    async fn upsert_result(&self, result: ResultUpsert) -> Result<EvaluationResult> {
        self.upsert_result_impl(result).await
    }

    async fn list_results_by_period(&self, period_id: i64) -> Result<Vec<EvaluationResult>> {
        self.list_results_by_period_impl(period_id).await
    }

    async fn list_results_for_user(
        &self,
        user_id: i64,
        period_id: Option<i64>,
    ) -> Result<Vec<EvaluationResult>> {
        self.list_results_for_user_impl(user_id, period_id).await
    }

    async fn get_latest_result_for_user(&self, user_id: i64) -> Result<Option<EvaluationResult>> {
        self.get_latest_result_for_user_impl(user_id).await
    }

    async fn archive_period_results(&self, period: &EvaluationPeriod) -> Result<usize> {
        self.archive_period_results_impl(period).await
    }

    async fn has_history_for_period(&self, period_id: i64) -> Result<bool> {
        self.has_history_for_period_impl(period_id).await
    }

    async fn list_history_with_pagination(
        &self,
        query: HistoryListQuery,
    ) -> Result<HistoryListResponse> {
        self.list_history_with_pagination_impl(query).await
    }

    async fn get_history_by_id(&self, id: i64) -> Result<Option<EvaluationHistory>> {
        self.get_history_by_id_impl(id).await
    }

    // 建议模块
    async fn replace_recommendations(
        &self,
        user_id: i64,
        period_id: i64,
        evaluation_type: EvaluationType,
        section_code: Option<String>,
        recommendations: &[Recommendation],
    ) -> Result<Vec<StoredRecommendation>> {
        self.replace_recommendations_impl(
            user_id,
            period_id,
            evaluation_type,
            section_code,
            recommendations,
        )
        .await
    }

    async fn list_recommendations(
        &self,
        user_id: i64,
        period_id: Option<i64>,
    ) -> Result<Vec<StoredRecommendation>> {
        self.list_recommendations_impl(user_id, period_id).await
    }

    // 操作日志模块
    async fn create_activity_log(&self, log: NewActivityLog) -> Result<AdminActivityLog> {
        self.create_activity_log_impl(log).await
    }

    async fn list_activity_logs_with_pagination(
        &self,
        query: ActivityLogListQuery,
    ) -> Result<PaginatedResponse<AdminActivityLog>> {
        self.list_activity_logs_with_pagination_impl(query).await
    }

    async fn count_activity_logs_by_action(&self) -> Result<Vec<ActionCount>> {
        self.count_activity_logs_by_action_impl().await
    }

    async fn delete_activity_logs_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.delete_activity_logs_before_impl(cutoff).await
    }

    // 系统设置模块
    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>> {
        self.list_all_settings_impl().await
    }

    async fn get_setting_by_key(&self, key: &str) -> Result<Option<SystemSetting>> {
        self.get_setting_by_key_impl(key).await
    }

    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        user_id: i64,
        ip_address: Option<String>,
    ) -> Result<SystemSetting> {
        self.update_setting_impl(key, value, user_id, ip_address).await
    }

    async fn batch_update_settings(
        &self,
        updates: Vec<(String, String)>,
        user_id: i64,
        ip_address: Option<String>,
    ) -> Result<Vec<SystemSetting>> {
        self.batch_update_settings_impl(updates, user_id, ip_address).await
    }

    async fn list_setting_audits(
        &self,
        query: SettingAuditQuery,
    ) -> Result<SettingAuditListResponse> {
        self.list_setting_audits_impl(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity_logs::entities::ActivityAction;
    use crate::models::results::entities::{CategoryScores, RatingDistribution};
    use crate::models::users::entities::UserProfile;

    async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::new_in_memory()
            .await
            .expect("in-memory storage")
    }

    async fn create_user(
        storage: &SeaOrmStorage,
        username: &str,
        role: UserRole,
        section_id: Option<i64>,
    ) -> User {
        storage
            .create_user(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@cca.edu.ph"),
                password: "hash".to_string(),
                role,
                profile: UserProfile {
                    display_name: username.to_string(),
                    section_id,
                    institute: Some("ICSLIS".to_string()),
                    ..Default::default()
                },
            })
            .await
            .expect("create user")
    }

    fn new_response(evaluator_id: i64, evaluatee_id: i64, period_id: i64) -> NewEvaluationResponse {
        NewEvaluationResponse {
            evaluator_id,
            evaluatee_id,
            evaluation_period_id: period_id,
            evaluation_type: EvaluationType::Student,
            student_number: Some("21-1234".to_string()),
            student_section: "BSIT-3A".to_string(),
            comments: Some("Very helpful".to_string()),
            ratings: vec![5; 19],
        }
    }

    #[tokio::test]
    async fn test_user_carries_section_code() {
        let storage = storage().await;
        let section = storage
            .create_section(CreateSectionRequest {
                code: "BSIT-3A".to_string(),
                name: None,
                year_level: Some(3),
            })
            .await
            .unwrap();

        let user = create_user(&storage, "juan", UserRole::Student, Some(section.id)).await;
        assert_eq!(user.section_code.as_deref(), Some("BSIT-3A"));

        let found = storage
            .get_user_by_username_or_email("JUAN@cca.edu.ph")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.failure.failure_count, 0);
    }

    #[tokio::test]
    async fn test_response_exists_and_evaluated_ids() {
        let storage = storage().await;
        let student = create_user(&storage, "student", UserRole::Student, None).await;
        let teacher = create_user(&storage, "teacher", UserRole::Faculty, None).await;
        let now = Utc::now();
        let period = storage
            .create_period("Student Evaluation", EvaluationType::Student, now, now, true)
            .await
            .unwrap();

        assert!(
            !storage
                .response_exists(student.id, teacher.id, period.id)
                .await
                .unwrap()
        );

        storage
            .create_irregular_evaluation(new_response(student.id, teacher.id, period.id))
            .await
            .unwrap();

        assert!(
            storage
                .response_exists(student.id, teacher.id, period.id)
                .await
                .unwrap()
        );
        assert_eq!(
            storage.list_evaluated_ids(student.id, period.id).await.unwrap(),
            vec![teacher.id]
        );
        assert_eq!(
            storage
                .list_evaluatee_ids_with_responses(period.id)
                .await
                .unwrap(),
            vec![teacher.id]
        );
    }

    #[tokio::test]
    async fn test_upsert_result_without_section_keeps_one_row() {
        let storage = storage().await;
        let teacher = create_user(&storage, "teacher", UserRole::Faculty, None).await;
        let now = Utc::now();
        let period = storage
            .create_period("Student Evaluation", EvaluationType::Student, now, now, false)
            .await
            .unwrap();

        for total in [60.0, 85.0] {
            storage
                .upsert_result(ResultUpsert {
                    user_id: teacher.id,
                    evaluation_period_id: period.id,
                    section_id: None,
                    scores: CategoryScores {
                        total,
                        ..Default::default()
                    },
                    average_rating: total / 20.0,
                    total_responses: 2,
                    distribution: RatingDistribution::default(),
                })
                .await
                .unwrap();
        }

        let results = storage.list_results_by_period(period.id).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].total_percentage, 85.0);

        assert_eq!(storage.archive_period_results(&period).await.unwrap(), 1);
        assert_eq!(storage.archive_period_results(&period).await.unwrap(), 1);
        let history = storage
            .list_history_with_pagination(HistoryListQuery::default())
            .await
            .unwrap();
        assert_eq!(history.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_failure_counter_and_reset() {
        let storage = storage().await;
        let teacher = create_user(&storage, "teacher", UserRole::Faculty, None).await;

        assert_eq!(
            storage
                .record_evaluation_failure(teacher.id, None, 60.0, 70.0)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            storage
                .record_evaluation_failure(teacher.id, None, 65.0, 70.0)
                .await
                .unwrap(),
            2
        );
        assert!(storage.mark_failure_alert_sent(teacher.id).await.unwrap());
        assert_eq!(storage.list_failure_logs(teacher.id, 5).await.unwrap().len(), 2);

        assert_eq!(storage.reset_evaluation_failures(None).await.unwrap(), 1);
        let user = storage.get_user_by_id(teacher.id).await.unwrap().unwrap();
        assert_eq!(user.failure.failure_count, 0);
        assert!(!user.failure.alert_sent);
        assert!(user.failure.last_failure_date.is_none());
        assert!(storage.list_failure_logs(teacher.id, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_release_state_upsert() {
        let storage = storage().await;
        assert!(
            storage
                .get_evaluation_state(EvaluationType::Peer)
                .await
                .unwrap()
                .is_none()
        );

        storage
            .set_evaluation_release(EvaluationType::Peer, true, None)
            .await
            .unwrap();
        let state = storage
            .set_evaluation_release(EvaluationType::Peer, false, None)
            .await
            .unwrap();
        assert!(!state.is_released);
        assert_eq!(
            storage
                .get_evaluation_state(EvaluationType::Peer)
                .await
                .unwrap()
                .unwrap()
                .id,
            state.id
        );
    }

    #[tokio::test]
    async fn test_activity_log_cleanup() {
        let storage = storage().await;
        for action in [ActivityAction::CreateUser, ActivityAction::CreateUser] {
            storage
                .create_activity_log(NewActivityLog {
                    admin_id: None,
                    action,
                    target_user_id: None,
                    target_section_id: None,
                    description: "created".to_string(),
                    ip_address: None,
                })
                .await
                .unwrap();
        }

        let counts = storage.count_activity_logs_by_action().await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 2);

        let deleted = storage
            .delete_activity_logs_before(Utc::now() + chrono::Duration::seconds(5))
            .await
            .unwrap();
        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn test_setting_update_writes_audit() {
        let storage = storage().await;
        let setting = storage
            .update_setting("evaluation.passing_score", "75.0", 1, None)
            .await
            .unwrap();
        assert_eq!(setting.value, "75.0");

        let audits = storage
            .list_setting_audits(SettingAuditQuery::default())
            .await
            .unwrap();
        assert_eq!(audits.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_batch_setting_update() {
        let storage = storage().await;
        let updated = storage
            .batch_update_settings(
                vec![
                    ("evaluation.passing_score".to_string(), "72.5".to_string()),
                    ("evaluation.max_failure_attempts".to_string(), "3".to_string()),
                ],
                1,
                Some("10.0.0.8".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(updated[1].value, "3");

        let stored = storage
            .get_setting_by_key("evaluation.passing_score")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.value, "72.5");

        let audits = storage
            .list_setting_audits(SettingAuditQuery::default())
            .await
            .unwrap();
        assert_eq!(audits.pagination.total, 2);
        assert!(
            audits
                .audits
                .iter()
                .all(|a| a.ip_address.as_deref() == Some("10.0.0.8"))
        );
    }
}
