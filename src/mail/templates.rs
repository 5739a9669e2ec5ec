//! 通知邮件模板（纯文本）

use chrono::Utc;

use crate::models::evaluations::entities::EvaluationType;
use crate::models::users::entities::{User, UserRole};

const FOOTER: &str = "---\nCity College of Angeles - Edulytics Evaluation System\n\
This is an automated notification. Please do not reply to this email.";

/// 渲染后的邮件内容
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMail {
    pub subject: String,
    pub body: String,
}

fn form_name(evaluation_type: EvaluationType) -> String {
    format!("{} Evaluation Form", evaluation_type.label())
}

/// 发布通知的收件角色
pub fn release_audience(evaluation_type: EvaluationType) -> &'static [&'static UserRole] {
    match evaluation_type {
        EvaluationType::Student => &[&UserRole::Student],
        EvaluationType::Peer => UserRole::staff_roles(),
        EvaluationType::Upward => &[&UserRole::Faculty],
    }
}

pub fn release_notice(evaluation_type: EvaluationType, site_url: &str) -> RenderedMail {
    let name = form_name(evaluation_type);
    RenderedMail {
        subject: format!(
            "🎓 {} Evaluation Form Released - Action Required",
            evaluation_type.label()
        ),
        body: format!(
            "The {name} has been officially released and is now ACTIVE.\n\n\
WHAT'S NEXT?\n\
Please log in to the Edulytics system and complete your evaluation forms.\n\
Your feedback is valuable to our institution's continuous improvement.\n\n\
KEY DETAILS:\n\
- Evaluation Type: {name}\n\
- Status: Active\n\
- Action Required: Please complete your evaluation\n\n\
ACCESS YOUR EVALUATION:\n\
Log in to the Edulytics System at {site_url}\n\n\
If you have any questions or experience technical difficulties,\n\
please contact the administration office.\n\n{FOOTER}"
        ),
    }
}

pub fn close_notice(evaluation_type: EvaluationType) -> RenderedMail {
    let name = form_name(evaluation_type);
    RenderedMail {
        subject: format!("📋 {} Evaluation Period Closed", evaluation_type.label()),
        body: format!(
            "The {name} evaluation period has ended and is now CLOSED.\n\n\
IMPORTANT NOTICE:\n\
No further evaluations can be submitted. The evaluation period has officially closed.\n\n\
SUMMARY:\n\
- Evaluation Type: {name}\n\
- Status: Closed\n\
- Submissions: No longer accepted\n\n\
Thank you for your participation. Your feedback has been valuable to our \
institution's evaluation process.\n\n{FOOTER}"
        ),
    }
}

/// 第一次未通过时发给本人
pub fn failure_warning(user: &User, score: f64, passing_score: f64, failure_count: i32) -> RenderedMail {
    let name = user.display_name();
    RenderedMail {
        subject: format!("⚠️ Evaluation Warning - {name}"),
        body: format!(
            "Dear {name},\n\n\
Your latest evaluation score is {score:.2}%, which is below the passing score of \
{passing_score:.2}%.\n\
This is failure number {failure_count} on record.\n\n\
You will be evaluated again in the next evaluation period. Please review your \
results and AI recommendations in the Edulytics system and reach out to your \
coordinator or dean for support.\n\n{FOOTER}"
        ),
    }
}

/// 连续未通过达到上限时发给校长
pub fn failure_alert(user: &User, score: f64, passing_score: f64, failure_count: i32) -> RenderedMail {
    let name = user.display_name();
    let institute = user.profile.institute.as_deref().unwrap_or("CCA");
    RenderedMail {
        subject: format!("🚨 Evaluation Failure Alert - {name}"),
        body: format!(
            "Evaluation failure alert\n\n\
- Name: {name}\n\
- Role: {role}\n\
- Institute: {institute}\n\
- Latest score: {score:.2}%\n\
- Passing score: {passing_score:.2}%\n\
- Consecutive failures: {failure_count}\n\
- Date: {date}\n\n\
This staff member has not reached the passing score in consecutive evaluation \
periods. Please review their evaluation history in the Edulytics system.\n\n{FOOTER}",
            role = user.role.label(),
            date = Utc::now().format("%Y-%m-%d %H:%M:%S"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{FailureTracking, UserProfile, UserStatus};

    fn faculty() -> User {
        User {
            id: 3,
            username: "mreyes".to_string(),
            email: "mreyes@cca.edu.ph".to_string(),
            password_hash: String::new(),
            role: UserRole::Faculty,
            status: UserStatus::Active,
            profile: UserProfile {
                display_name: "Maria Reyes".to_string(),
                institute: Some("ICSLIS".to_string()),
                ..Default::default()
            },
            section_code: None,
            failure: FailureTracking::default(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_release_and_close_subjects() {
        let mail = release_notice(EvaluationType::Peer, "https://edulytics.cca.edu.ph");
        assert_eq!(mail.subject, "🎓 Peer Evaluation Form Released - Action Required");
        assert!(mail.body.contains("https://edulytics.cca.edu.ph"));
        assert_eq!(
            close_notice(EvaluationType::Student).subject,
            "📋 Student Evaluation Period Closed"
        );
    }

    #[test]
    fn test_failure_mails_use_display_name() {
        let user = faculty();
        let warning = failure_warning(&user, 65.5, 70.0, 1);
        assert_eq!(warning.subject, "⚠️ Evaluation Warning - Maria Reyes");
        assert!(warning.body.contains("65.50%"));

        let alert = failure_alert(&user, 60.0, 70.0, 2);
        assert_eq!(alert.subject, "🚨 Evaluation Failure Alert - Maria Reyes");
        assert!(alert.body.contains("Institute: ICSLIS"));
    }

    #[test]
    fn test_release_audience() {
        assert_eq!(release_audience(EvaluationType::Student), &[&UserRole::Student]);
        assert_eq!(release_audience(EvaluationType::Peer).len(), 3);
    }
}
