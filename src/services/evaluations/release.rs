//! 评估表发布与收回
//!
//! 发布期间（is_released）学生/教职工可以提交评估，结果不可查看；
//! 收回后计算本期结果并执行未通过跟踪。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Duration, Utc};
use tracing::{error, info};

use super::EvaluationService;
use super::failures::process_evaluation_failures;
use super::processing::{
    archive_period_results_to_history, create_fallback_period, process_all_results,
};
use crate::config::AppConfig;
use crate::errors::{EdulyticsError, Result};
use crate::mail::{Mailer, send_bulk, templates};
use crate::models::activity_logs::entities::ActivityAction;
use crate::models::evaluations::entities::{EvaluationPeriod, EvaluationType};
use crate::models::evaluations::responses::{
    BulkReleaseItem, BulkReleaseResponse, EmailNotificationSummary, ReleaseResponse,
    ReleaseState, ReleaseStatusResponse, UnreleaseResponse,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};
use crate::services::system::DynamicConfig;
use crate::storage::Storage;

/// 该类型评估表是否处于发布状态
pub async fn is_period_active(
    storage: &Arc<dyn Storage>,
    evaluation_type: EvaluationType,
) -> Result<bool> {
    Ok(storage
        .get_evaluation_state(evaluation_type)
        .await?
        .is_some_and(|e| e.is_released))
}

/// 收回后才能查看结果
pub async fn can_view_results(
    storage: &Arc<dyn Storage>,
    evaluation_type: EvaluationType,
) -> Result<bool> {
    Ok(!is_period_active(storage, evaluation_type).await?)
}

/// 发布期间只有管理员能查看结果
pub async fn results_locked_for(
    storage: &Arc<dyn Storage>,
    role: &UserRole,
    evaluation_type: EvaluationType,
) -> Result<bool> {
    if *role == UserRole::Admin {
        return Ok(false);
    }
    Ok(!can_view_results(storage, evaluation_type).await?)
}

/// 给该类型的受众群发通知
async fn notify_audience(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    evaluation_type: EvaluationType,
    mail: templates::RenderedMail,
) -> EmailNotificationSummary {
    let roles: Vec<UserRole> = templates::release_audience(evaluation_type)
        .iter()
        .map(|r| (*r).clone())
        .collect();
    let recipients: Vec<String> = match storage.list_users_by_roles(&roles).await {
        Ok(users) => users.into_iter().map(|u| u.email).collect(),
        Err(e) => {
            error!("Failed to load notification recipients: {}", e);
            return EmailNotificationSummary {
                sent: 0,
                failed: 0,
                message: format!("Failed to load recipients: {e}"),
            };
        }
    };

    let report = send_bulk(mailer.as_ref(), &recipients, &mail.subject, &mail.body).await;
    let message = if report.failed.is_empty() {
        format!("Notification sent to {} users", report.sent)
    } else {
        format!(
            "Notification sent to {} users, {} failed",
            report.sent,
            report.failed_count()
        )
    };
    EmailNotificationSummary {
        sent: report.sent,
        failed: report.failed_count(),
        message,
    }
}

/// 按当月名称取得或创建新周期并激活
async fn open_new_period(
    storage: &Arc<dyn Storage>,
    evaluation_type: EvaluationType,
) -> Result<EvaluationPeriod> {
    let now = Utc::now();
    let end = now + Duration::days(DynamicConfig::period_days().await);
    let name = evaluation_type.period_name(now);

    match storage.find_period_by_name(evaluation_type, &name).await? {
        Some(existing) => storage
            .activate_period(existing.id, now, end)
            .await?
            .ok_or_else(|| EdulyticsError::not_found(format!("Evaluation period {name}"))),
        None => {
            storage
                .create_period(&name, evaluation_type, now, end, true)
                .await
        }
    }
}

pub(crate) async fn release_evaluation(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    evaluation_type: EvaluationType,
) -> Result<ReleaseResponse> {
    if is_period_active(storage, evaluation_type).await? {
        return Err(EdulyticsError::conflict(format!(
            "{} evaluation is already released",
            evaluation_type.label()
        )));
    }

    let mut periods_archived = 0;

    // 仍在进行中的周期先计算结果再归档
    if let Some(active) = storage.get_active_period(evaluation_type).await? {
        process_all_results(storage, &active).await?;
        if archive_period_results_to_history(storage, &active).await? > 0 {
            periods_archived += 1;
        }
    }

    // 尚未归档的已结束周期
    for period in storage.list_periods(evaluation_type, Some(false)).await? {
        if archive_period_results_to_history(storage, &period).await? > 0 {
            periods_archived += 1;
        }
    }

    storage
        .deactivate_active_periods(evaluation_type, Utc::now())
        .await?;
    let new_period = open_new_period(storage, evaluation_type).await?;
    storage
        .set_evaluation_release(evaluation_type, true, Some(new_period.id))
        .await?;

    info!(
        "{} evaluation released, period '{}' active until {}",
        evaluation_type.label(),
        new_period.name,
        new_period.end_date
    );

    let mail = templates::release_notice(evaluation_type, &AppConfig::get().mail.site_url);
    let email_notification = notify_audience(storage, mailer, evaluation_type, mail).await;

    Ok(ReleaseResponse {
        success: true,
        message: format!(
            "{} evaluation form released. {} period(s) archived.",
            evaluation_type.label(),
            periods_archived
        ),
        periods_archived,
        new_period,
        email_notification,
    })
}

pub(crate) async fn unrelease_evaluation(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    evaluation_type: EvaluationType,
) -> Result<UnreleaseResponse> {
    if !is_period_active(storage, evaluation_type).await? {
        return Err(EdulyticsError::conflict(format!(
            "{} evaluation is not currently released",
            evaluation_type.label()
        )));
    }

    let period = match storage.get_active_period(evaluation_type).await? {
        Some(period) => period,
        None => create_fallback_period(storage, evaluation_type).await?,
    };

    let (mut processing_results, processed) = process_all_results(storage, &period).await?;
    let failure_details = process_evaluation_failures(storage, mailer, &processed).await;
    processing_results.details.extend(failure_details);

    storage
        .deactivate_active_periods(evaluation_type, Utc::now())
        .await?;
    storage
        .set_evaluation_release(evaluation_type, false, Some(period.id))
        .await?;

    info!(
        "{} evaluation unreleased, {} staff results processed",
        evaluation_type.label(),
        processing_results.processed_count
    );

    let mail = templates::close_notice(evaluation_type);
    let email_notification = notify_audience(storage, mailer, evaluation_type, mail).await;

    Ok(UnreleaseResponse {
        success: true,
        message: format!(
            "{} evaluation form unreleased. Results are now available.",
            evaluation_type.label()
        ),
        processing_results,
        email_notification,
    })
}

fn release_error(e: EdulyticsError, released: bool) -> HttpResponse {
    match e {
        EdulyticsError::Conflict(msg) => {
            let code = if released {
                ErrorCode::EvaluationAlreadyReleased
            } else {
                ErrorCode::EvaluationNotReleased
            };
            HttpResponse::Conflict().json(ApiResponse::error_empty(code, msg))
        }
        e => {
            error!("Release control failed: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Release control failed: {e}"),
            ))
        }
    }
}

fn reject_upward(evaluation_type: EvaluationType) -> Option<HttpResponse> {
    (!EvaluationType::releasable().contains(&evaluation_type)).then(|| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!(
                "{} evaluations cannot be released from here",
                evaluation_type.label()
            ),
        ))
    })
}

pub async fn release(
    service: &EvaluationService,
    evaluation_type: EvaluationType,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(response) = reject_upward(evaluation_type) {
        return Ok(response);
    }
    let storage = service.get_storage(request);
    let mailer = service.get_mailer(request);

    match release_evaluation(&storage, &mailer, evaluation_type).await {
        Ok(response) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::ReleaseEvaluation,
                format!(
                    "Released {} evaluation ({})",
                    evaluation_type.label(),
                    response.new_period.name
                ),
                ActivityTarget::default(),
            )
            .await;
            let message = response.message.clone();
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, message)))
        }
        Err(e) => Ok(release_error(e, true)),
    }
}

pub async fn unrelease(
    service: &EvaluationService,
    evaluation_type: EvaluationType,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(response) = reject_upward(evaluation_type) {
        return Ok(response);
    }
    let storage = service.get_storage(request);
    let mailer = service.get_mailer(request);

    match unrelease_evaluation(&storage, &mailer, evaluation_type).await {
        Ok(response) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::UnreleaseEvaluation,
                format!(
                    "Unreleased {} evaluation, processed {} of {} staff",
                    evaluation_type.label(),
                    response.processing_results.processed_count,
                    response.processing_results.total_staff
                ),
                ActivityTarget::default(),
            )
            .await;
            let message = response.message.clone();
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, message)))
        }
        Err(e) => Ok(release_error(e, false)),
    }
}

/// 发布或收回全部类型，单个类型失败不影响其他类型
pub async fn set_all(
    service: &EvaluationService,
    released: bool,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let mailer = service.get_mailer(request);

    let mut items = Vec::new();
    for &evaluation_type in EvaluationType::releasable() {
        let outcome = if released {
            release_evaluation(&storage, &mailer, evaluation_type)
                .await
                .map(|r| r.message)
        } else {
            unrelease_evaluation(&storage, &mailer, evaluation_type)
                .await
                .map(|r| r.message)
        };
        let item = match outcome {
            Ok(message) => {
                let (action, verb) = if released {
                    (ActivityAction::ReleaseEvaluation, "Released")
                } else {
                    (ActivityAction::UnreleaseEvaluation, "Unreleased")
                };
                log_admin_activity(
                    &storage,
                    request,
                    action,
                    format!("{verb} {} evaluation", evaluation_type.label()),
                    ActivityTarget::default(),
                )
                .await;
                BulkReleaseItem {
                    evaluation_type,
                    success: true,
                    message,
                }
            }
            Err(e) => BulkReleaseItem {
                evaluation_type,
                success: false,
                message: e.message().to_string(),
            },
        };
        items.push(item);
    }

    let message = if released {
        "Release requested for all evaluation forms"
    } else {
        "Unrelease requested for all evaluation forms"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(BulkReleaseResponse { items }, message)))
}

/// 读取单个类型的发布状态及关联周期
async fn load_release_state(
    storage: &Arc<dyn Storage>,
    evaluation_type: EvaluationType,
) -> Result<ReleaseState> {
    let state = storage.get_evaluation_state(evaluation_type).await?;
    let is_released = state.as_ref().is_some_and(|s| s.is_released);
    let period = match state.and_then(|s| s.evaluation_period_id) {
        Some(id) => storage.get_period_by_id(id).await?,
        None => None,
    };
    Ok(ReleaseState {
        is_released,
        can_view_results: !is_released,
        period,
    })
}

pub(crate) async fn release_status(storage: &Arc<dyn Storage>) -> Result<ReleaseStatusResponse> {
    Ok(ReleaseStatusResponse {
        student: load_release_state(storage, EvaluationType::Student).await?,
        peer: load_release_state(storage, EvaluationType::Peer).await?,
    })
}

pub async fn status(
    service: &EvaluationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match release_status(&storage).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Release status retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to load release status: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to load release status: {e}"),
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::testing::RecordingMailer;
    use crate::models::evaluations::entities::NewEvaluationResponse;
    use crate::models::users::entities::UserProfile;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[tokio::test]
    async fn test_release_cycle() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let recording = Arc::new(RecordingMailer::default());
        let mailer: Arc<dyn Mailer> = recording.clone();
        storage
            .create_user(CreateUserRequest {
                username: "student1".to_string(),
                email: "student1@cca.edu.ph".to_string(),
                password: "hash".to_string(),
                role: UserRole::Student,
                profile: UserProfile {
                    display_name: "Student One".to_string(),
                    is_irregular: true,
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert!(can_view_results(&storage, EvaluationType::Student).await.unwrap());

        let released = release_evaluation(&storage, &mailer, EvaluationType::Student)
            .await
            .unwrap();
        assert!(released.new_period.is_active);
        assert_eq!(released.periods_archived, 0);
        assert_eq!(released.email_notification.sent, 1);
        assert!(is_period_active(&storage, EvaluationType::Student).await.unwrap());
        assert!(!is_period_active(&storage, EvaluationType::Peer).await.unwrap());

        // 重复发布报冲突
        assert!(matches!(
            release_evaluation(&storage, &mailer, EvaluationType::Student).await,
            Err(EdulyticsError::Conflict(_))
        ));

        let closed = unrelease_evaluation(&storage, &mailer, EvaluationType::Student)
            .await
            .unwrap();
        assert_eq!(
            closed.processing_results.evaluation_period.as_deref(),
            Some(released.new_period.name.as_str())
        );
        assert!(
            storage
                .get_active_period(EvaluationType::Student)
                .await
                .unwrap()
                .is_none()
        );
        assert!(can_view_results(&storage, EvaluationType::Student).await.unwrap());

        // 同月再次发布会重新激活同名周期
        let again = release_evaluation(&storage, &mailer, EvaluationType::Student)
            .await
            .unwrap();
        assert_eq!(again.new_period.id, released.new_period.id);
        assert_eq!(recording.messages().len(), 3);
    }

    fn user_request(username: &str, role: UserRole) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@cca.edu.ph"),
            password: "hash".to_string(),
            role,
            profile: UserProfile {
                display_name: username.to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_release_archives_closed_periods_once() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer::default());
        let faculty = storage
            .create_user(user_request("faculty1", UserRole::Faculty))
            .await
            .unwrap();
        let student = storage
            .create_user(user_request("student1", UserRole::Student))
            .await
            .unwrap();

        let now = Utc::now();
        let closed = storage
            .create_period(
                "Student Evaluation Earlier",
                EvaluationType::Student,
                now - Duration::days(60),
                now - Duration::days(30),
                false,
            )
            .await
            .unwrap();
        storage
            .create_response(NewEvaluationResponse {
                evaluator_id: student.id,
                evaluatee_id: faculty.id,
                evaluation_period_id: closed.id,
                evaluation_type: EvaluationType::Student,
                student_number: None,
                student_section: "BSIT-3A".to_string(),
                comments: None,
                ratings: vec![4; 19],
            })
            .await
            .unwrap();
        process_all_results(&storage, &closed).await.unwrap();
        assert!(!storage.has_history_for_period(closed.id).await.unwrap());

        let released = release_evaluation(&storage, &mailer, EvaluationType::Student)
            .await
            .unwrap();
        assert_eq!(released.periods_archived, 1);
        assert!(storage.has_history_for_period(closed.id).await.unwrap());

        // 已归档的周期不会重复计入
        unrelease_evaluation(&storage, &mailer, EvaluationType::Student)
            .await
            .unwrap();
        let again = release_evaluation(&storage, &mailer, EvaluationType::Student)
            .await
            .unwrap();
        assert_eq!(again.periods_archived, 0);
    }

    #[tokio::test]
    async fn test_unrelease_without_active_period_uses_past_window() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer::default());

        let released = release_evaluation(&storage, &mailer, EvaluationType::Peer)
            .await
            .unwrap();
        storage
            .deactivate_active_periods(EvaluationType::Peer, Utc::now())
            .await
            .unwrap();

        let closed = unrelease_evaluation(&storage, &mailer, EvaluationType::Peer)
            .await
            .unwrap();
        assert_eq!(closed.processing_results.processed_count, 0);

        let state = storage
            .get_evaluation_state(EvaluationType::Peer)
            .await
            .unwrap()
            .unwrap();
        assert!(!state.is_released);
        let period_id = state.evaluation_period_id.unwrap();
        assert_ne!(period_id, released.new_period.id);

        let period = storage.get_period_by_id(period_id).await.unwrap().unwrap();
        assert!(!period.is_active);
        assert_eq!((period.end_date - period.start_date).num_days(), 30);
        assert_eq!(
            closed.processing_results.evaluation_period.as_deref(),
            Some(period.name.as_str())
        );
    }

    #[tokio::test]
    async fn test_release_status_keyed_by_type() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer::default());
        let released = release_evaluation(&storage, &mailer, EvaluationType::Student)
            .await
            .unwrap();

        let status = release_status(&storage).await.unwrap();
        assert!(status.student.is_released);
        assert!(!status.student.can_view_results);
        assert_eq!(
            status.student.period.as_ref().map(|p| p.id),
            Some(released.new_period.id)
        );
        assert!(!status.peer.is_released);
        assert!(status.peer.period.is_none());

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["student"]["is_released"], true);
        assert_eq!(json["peer"]["is_released"], false);
    }
}
