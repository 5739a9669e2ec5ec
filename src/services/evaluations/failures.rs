//! 未通过跟踪
//!
//! 收回评估表并计算结果后执行：低于及格线记一次未通过，第一次提醒本人，
//! 达到上限后每次都通知校长；及格则清零。

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::Result;
use crate::mail::{MailMessage, Mailer, templates};
use crate::models::results::entities::EvaluationResult;
use crate::models::users::entities::User;
use crate::services::system::DynamicConfig;
use crate::storage::Storage;

/// 记录未通过后需要发送的通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureNotice {
    None,
    WarnUser,
    AlertSchoolHead,
}

pub fn failure_notice(failure_count: i32, max_failure_attempts: i32) -> FailureNotice {
    if failure_count == 1 {
        FailureNotice::WarnUser
    } else if failure_count >= max_failure_attempts {
        FailureNotice::AlertSchoolHead
    } else {
        FailureNotice::None
    }
}

/// 未通过判定参数
#[derive(Debug, Clone)]
pub struct FailurePolicy {
    pub passing_score: f64,
    pub max_attempts: i32,
    pub school_head_email: String,
}

impl FailurePolicy {
    /// 取当前动态配置
    pub async fn current() -> Self {
        Self {
            passing_score: DynamicConfig::passing_score().await,
            max_attempts: DynamicConfig::max_failure_attempts().await,
            school_head_email: DynamicConfig::school_head_email().await,
        }
    }
}

/// 按本期结果更新未通过次数，返回每人的处理说明
pub async fn process_evaluation_failures(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    processed: &[(User, EvaluationResult)],
) -> Vec<String> {
    let policy = FailurePolicy::current().await;
    apply_failure_policy(storage, mailer, processed, &policy).await
}

pub async fn apply_failure_policy(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    processed: &[(User, EvaluationResult)],
    policy: &FailurePolicy,
) -> Vec<String> {
    let passing_score = policy.passing_score;
    let max_attempts = policy.max_attempts;
    let school_head = policy.school_head_email.as_str();

    let mut details = Vec::with_capacity(processed.len());
    for (user, result) in processed {
        let score = result.total_percentage;
        if score <= 0.0 {
            details.push(format!("{}: No evaluations - Skipped", user.username));
            continue;
        }

        let outcome = if score < passing_score {
            handle_failure(
                storage,
                mailer,
                user,
                result,
                passing_score,
                max_attempts,
                school_head,
            )
            .await
            .map(|msg| format!("Failed ({score:.2}%) - {msg}"))
        } else if user.failure.failure_count > 0 {
            storage
                .reset_evaluation_failures(Some(vec![user.id]))
                .await
                .map(|_| format!("Passed ({score:.2}%) - Failures reset"))
        } else {
            Ok(format!("Passed ({score:.2}%)"))
        };

        match outcome {
            Ok(msg) => details.push(format!("{} ({}): {}", user.username, user.role.label(), msg)),
            Err(e) => {
                warn!("Failure tracking for {} failed: {}", user.username, e);
                details.push(format!("{}: Error - {}", user.username, e));
            }
        }
    }
    details
}

async fn handle_failure(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    user: &User,
    result: &EvaluationResult,
    passing_score: f64,
    max_attempts: i32,
    school_head: &str,
) -> Result<String> {
    let score = result.total_percentage;
    let count = storage
        .record_evaluation_failure(
            user.id,
            Some(result.evaluation_period_id),
            score,
            passing_score,
        )
        .await?;
    info!(
        "{}: failure count {} -> {}",
        user.username,
        count - 1,
        count
    );

    let mut message = format!("Failure count: {count}");
    match failure_notice(count, max_attempts) {
        FailureNotice::WarnUser => {
            let mail = templates::failure_warning(user, score, passing_score, count);
            match mailer
                .send(&MailMessage::new(&user.email, mail.subject, mail.body))
                .await
            {
                Ok(()) => message.push_str(" - Warning email sent"),
                Err(e) => {
                    warn!("Warning email to {} failed: {}", user.email, e);
                    message.push_str(" - Warning email failed");
                }
            }
        }
        FailureNotice::AlertSchoolHead => {
            if school_head.trim().is_empty() {
                warn!("School head email is not configured, alert for {} skipped", user.username);
                message.push_str(" - Alert skipped (no school head email)");
            } else {
                let mail = templates::failure_alert(user, score, passing_score, count);
                match mailer
                    .send(&MailMessage::new(school_head, mail.subject, mail.body))
                    .await
                {
                    Ok(()) => {
                        storage.mark_failure_alert_sent(user.id).await?;
                        message.push_str(" - Alert email sent to school head");
                    }
                    Err(e) => {
                        warn!("Alert email for {} failed: {}", user.username, e);
                        message.push_str(" - Alert email failed");
                    }
                }
            }
        }
        FailureNotice::None => {}
    }
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::testing::RecordingMailer;
    use crate::models::results::entities::{CategoryScores, RatingDistribution};
    use crate::models::users::entities::{UserProfile, UserRole};
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[test]
    fn test_failure_notice() {
        assert_eq!(failure_notice(1, 2), FailureNotice::WarnUser);
        assert_eq!(failure_notice(2, 2), FailureNotice::AlertSchoolHead);
        assert_eq!(failure_notice(5, 2), FailureNotice::AlertSchoolHead);
        assert_eq!(failure_notice(2, 3), FailureNotice::None);
    }

    fn result_for(user_id: i64, total: f64) -> EvaluationResult {
        EvaluationResult {
            id: 1,
            user_id,
            evaluation_period_id: 1,
            section_id: None,
            scores: CategoryScores {
                total,
                ..Default::default()
            },
            total_percentage: total,
            average_rating: total / 20.0,
            total_responses: 3,
            distribution: RatingDistribution::default(),
            calculated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_failures_warn_then_pass_resets() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let user = storage
            .create_user(CreateUserRequest {
                username: "faculty1".to_string(),
                email: "faculty1@cca.edu.ph".to_string(),
                password: "hash".to_string(),
                role: UserRole::Faculty,
                profile: UserProfile {
                    display_name: "Faculty One".to_string(),
                    institute: Some("ICSLIS".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        let recording = Arc::new(RecordingMailer::default());
        let mailer: Arc<dyn Mailer> = recording.clone();

        let details =
            process_evaluation_failures(&storage, &mailer, &[(user.clone(), result_for(user.id, 60.0))])
                .await;
        assert!(details[0].contains("Warning email sent"), "{details:?}");
        let after = storage.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(after.failure.failure_count, 1);
        assert_eq!(recording.messages()[0].to, "faculty1@cca.edu.ph");

        let details =
            process_evaluation_failures(&storage, &mailer, &[(after, result_for(user.id, 85.0))])
                .await;
        assert!(details[0].contains("Failures reset"), "{details:?}");
        let reset = storage.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reset.failure.failure_count, 0);
    }

    #[tokio::test]
    async fn test_repeated_failure_alerts_school_head() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let user = storage
            .create_user(CreateUserRequest {
                username: "dean1".to_string(),
                email: "dean1@cca.edu.ph".to_string(),
                password: "hash".to_string(),
                role: UserRole::Dean,
                profile: UserProfile {
                    display_name: "Dean One".to_string(),
                    institute: Some("ICSLIS".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        let recording = Arc::new(RecordingMailer::default());
        let mailer: Arc<dyn Mailer> = recording.clone();
        let policy = FailurePolicy {
            passing_score: 70.0,
            max_attempts: 2,
            school_head_email: "head@cca.edu.ph".to_string(),
        };

        apply_failure_policy(&storage, &mailer, &[(user.clone(), result_for(user.id, 55.0))], &policy)
            .await;
        let first = storage.get_user_by_id(user.id).await.unwrap().unwrap();
        assert!(!first.failure.alert_sent);

        let details =
            apply_failure_policy(&storage, &mailer, &[(first, result_for(user.id, 50.0))], &policy)
                .await;
        assert!(details[0].contains("Alert email sent to school head"), "{details:?}");

        let messages = recording.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].to, "dean1@cca.edu.ph");
        assert_eq!(messages[1].to, "head@cca.edu.ph");

        let after = storage.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(after.failure.failure_count, 2);
        assert!(after.failure.alert_sent);
        assert_eq!(storage.list_failure_logs(user.id, 5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_alert_skipped_without_school_head_email() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let user = storage
            .create_user(CreateUserRequest {
                username: "coord1".to_string(),
                email: "coord1@cca.edu.ph".to_string(),
                password: "hash".to_string(),
                role: UserRole::Coordinator,
                profile: UserProfile {
                    display_name: "Coordinator One".to_string(),
                    institute: Some("ICSLIS".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        let recording = Arc::new(RecordingMailer::default());
        let mailer: Arc<dyn Mailer> = recording.clone();
        let policy = FailurePolicy {
            passing_score: 70.0,
            max_attempts: 1,
            school_head_email: String::new(),
        };

        // 上限为 1 时第一次仍只提醒本人
        let details =
            apply_failure_policy(&storage, &mailer, &[(user.clone(), result_for(user.id, 40.0))], &policy)
                .await;
        assert!(details[0].contains("Warning email sent"), "{details:?}");

        let current = storage.get_user_by_id(user.id).await.unwrap().unwrap();
        let details =
            apply_failure_policy(&storage, &mailer, &[(current, result_for(user.id, 40.0))], &policy)
                .await;
        assert!(details[0].contains("Alert skipped"), "{details:?}");
        let after = storage.get_user_by_id(user.id).await.unwrap().unwrap();
        assert!(!after.failure.alert_sent);
        assert_eq!(recording.messages().len(), 1);
    }
}
