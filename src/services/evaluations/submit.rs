use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::EvaluationService;
use super::release::is_period_active;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::entities::{EvaluationType, NewEvaluationResponse};
use crate::models::evaluations::requests::SubmitEvaluationRequest;
use crate::models::evaluations::responses::SubmitEvaluationResponse;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};

/// 评估者与被评估者的关系
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationRoute {
    /// 非正常班学生，可以评估任意教职工
    Irregular,
    /// 正常班学生，需要被评估者任教该班级
    Section(i64),
    /// 同学院教职工互评
    Peer,
}

/// 评估者提交的评估类型，管理员不参与评估
pub fn submission_type(evaluator: &User) -> Option<EvaluationType> {
    match evaluator.role {
        UserRole::Student => Some(EvaluationType::Student),
        ref role if role.is_staff() => Some(EvaluationType::Peer),
        _ => None,
    }
}

fn same_institute(a: &User, b: &User) -> bool {
    match (&a.profile.institute, &b.profile.institute) {
        (Some(x), Some(y)) => {
            let x = x.trim();
            !x.is_empty() && x.eq_ignore_ascii_case(y.trim())
        }
        _ => false,
    }
}

/// 判断是否允许评估，不含任课班级查询
pub fn evaluation_route(evaluator: &User, evaluatee: &User) -> Result<EvaluationRoute, &'static str> {
    if !evaluatee.role.is_staff() {
        return Err("Only faculty, coordinators and deans can be evaluated");
    }

    match evaluator.role {
        UserRole::Student if evaluator.profile.is_irregular => Ok(EvaluationRoute::Irregular),
        UserRole::Student => evaluator
            .profile
            .section_id
            .map(EvaluationRoute::Section)
            .ok_or("You are not assigned to a section"),
        ref role if role.is_staff() => {
            if evaluator.id == evaluatee.id {
                Err("You cannot evaluate yourself")
            } else if same_institute(evaluator, evaluatee) {
                Ok(EvaluationRoute::Peer)
            } else {
                Err("You can only evaluate colleagues from your institute")
            }
        }
        _ => Err("You are not allowed to submit evaluations"),
    }
}

/// 答卷上记录的班级标签
pub fn student_section_label(evaluator: &User) -> String {
    if evaluator.role.is_staff() {
        let institute = evaluator.profile.institute.as_deref().unwrap_or("CCA");
        return format!("{institute} Staff");
    }
    evaluator
        .section_code
        .clone()
        .unwrap_or_else(|| "No Section".to_string())
}

pub fn validate_ratings(ratings: &[i32], evaluation_type: EvaluationType) -> Result<(), String> {
    let expected = evaluation_type.question_count();
    if ratings.len() != expected {
        return Err(format!(
            "All {expected} questions must be answered, got {}",
            ratings.len()
        ));
    }
    if let Some(pos) = ratings.iter().position(|r| !(1..=5).contains(r)) {
        return Err(format!("Question {} must be rated from 1 to 5", pos + 1));
    }
    Ok(())
}

fn forbidden(code: ErrorCode, msg: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, msg))
}

fn internal(e: impl std::fmt::Display) -> HttpResponse {
    error!("Evaluation submission failed: {}", e);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Evaluation submission failed: {e}"),
    ))
}

pub async fn submit_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    data: SubmitEvaluationRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let evaluator = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Authentication required",
            )));
        }
    };

    let Some(evaluation_type) = submission_type(&evaluator) else {
        return Ok(forbidden(
            ErrorCode::EvaluationNotAllowed,
            "You are not allowed to submit evaluations",
        ));
    };

    match is_period_active(&storage, evaluation_type).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(forbidden(
                ErrorCode::EvaluationNotReleased,
                format!(
                    "The {} evaluation form is not currently released",
                    evaluation_type.label()
                ),
            ));
        }
        Err(e) => return Ok(internal(e)),
    }

    let evaluatee = match storage.get_user_by_id(data.evaluatee_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "The person being evaluated does not exist",
            )));
        }
        Err(e) => return Ok(internal(e)),
    };

    let route = match evaluation_route(&evaluator, &evaluatee) {
        Ok(route) => route,
        Err(msg) => return Ok(forbidden(ErrorCode::EvaluationNotAllowed, msg)),
    };
    if let EvaluationRoute::Section(section_id) = route {
        match storage.has_section_assignment(evaluatee.id, section_id).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(forbidden(
                    ErrorCode::EvaluationNotAllowed,
                    "This instructor is not assigned to your section",
                ));
            }
            Err(e) => return Ok(internal(e)),
        }
    }

    let period = match storage.get_active_period(evaluation_type).await {
        Ok(Some(period)) => period,
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::EvaluationPeriodNotFound,
                "There is no active evaluation period",
            )));
        }
        Err(e) => return Ok(internal(e)),
    };

    match storage
        .response_exists(evaluator.id, evaluatee.id, period.id)
        .await
    {
        Ok(false) => {}
        Ok(true) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::EvaluationAlreadySubmitted,
                "You have already evaluated this person in the current period",
            )));
        }
        Err(e) => return Ok(internal(e)),
    }

    if let Err(msg) = validate_ratings(&data.ratings, evaluation_type) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::EvaluationRatingsInvalid, msg)));
    }

    let student_number = if evaluator.role == UserRole::Student {
        data.student_number
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| evaluator.profile.student_number.clone())
    } else {
        None
    };

    let new_response = NewEvaluationResponse {
        evaluator_id: evaluator.id,
        evaluatee_id: evaluatee.id,
        evaluation_period_id: period.id,
        evaluation_type,
        student_number,
        student_section: student_section_label(&evaluator),
        comments: data.comments,
        ratings: data.ratings,
    };

    let irregular = route == EvaluationRoute::Irregular;
    let saved = if irregular {
        storage
            .create_irregular_evaluation(new_response)
            .await
            .map(|r| r.id)
    } else {
        storage.create_response(new_response).await.map(|r| r.id)
    };

    match saved {
        Ok(response_id) => {
            info!(
                "{} evaluation {} submitted by user {} for user {}",
                evaluation_type.label(),
                response_id,
                evaluator.id,
                evaluatee.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                SubmitEvaluationResponse {
                    response_id,
                    evaluation_type,
                    irregular,
                },
                "Evaluation submitted successfully",
            )))
        }
        Err(e) => Ok(internal(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{FailureTracking, UserProfile, UserStatus};

    fn user(id: i64, role: UserRole, profile: UserProfile) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@cca.edu.ph"),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            profile,
            section_code: None,
            failure: FailureTracking::default(),
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn staff(id: i64, institute: &str) -> User {
        user(
            id,
            UserRole::Faculty,
            UserProfile {
                display_name: "Staff".to_string(),
                institute: Some(institute.to_string()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_student_routes() {
        let teacher = staff(1, "ICSLIS");
        let regular = user(
            2,
            UserRole::Student,
            UserProfile {
                section_id: Some(7),
                ..Default::default()
            },
        );
        let irregular = user(
            3,
            UserRole::Student,
            UserProfile {
                is_irregular: true,
                ..Default::default()
            },
        );
        let unassigned = user(4, UserRole::Student, UserProfile::default());

        assert_eq!(evaluation_route(&regular, &teacher), Ok(EvaluationRoute::Section(7)));
        assert_eq!(evaluation_route(&irregular, &teacher), Ok(EvaluationRoute::Irregular));
        assert!(evaluation_route(&unassigned, &teacher).is_err());
        assert!(evaluation_route(&teacher, &regular).is_err());
    }

    #[test]
    fn test_peer_routes() {
        let a = staff(1, "ICSLIS");
        let b = staff(2, "icslis");
        let c = staff(3, "IBM");
        let admin = user(4, UserRole::Admin, UserProfile::default());

        assert_eq!(evaluation_route(&a, &b), Ok(EvaluationRoute::Peer));
        assert!(evaluation_route(&a, &a).is_err());
        assert!(evaluation_route(&a, &c).is_err());
        assert!(evaluation_route(&admin, &a).is_err());
        assert_eq!(submission_type(&admin), None);
        assert_eq!(submission_type(&a), Some(EvaluationType::Peer));
    }

    #[test]
    fn test_section_labels() {
        let mut student = user(2, UserRole::Student, UserProfile::default());
        assert_eq!(student_section_label(&student), "No Section");
        student.section_code = Some("BSIT-3A".to_string());
        assert_eq!(student_section_label(&student), "BSIT-3A");
        assert_eq!(student_section_label(&staff(1, "ICSLIS")), "ICSLIS Staff");
    }

    #[test]
    fn test_validate_ratings() {
        assert!(validate_ratings(&[5; 19], EvaluationType::Student).is_ok());
        assert!(validate_ratings(&[5; 15], EvaluationType::Student).is_err());
        assert!(validate_ratings(&[5; 15], EvaluationType::Peer).is_ok());
        let mut ratings = vec![3; 15];
        ratings[4] = 6;
        assert_eq!(
            validate_ratings(&ratings, EvaluationType::Peer).unwrap_err(),
            "Question 5 must be rated from 1 to 5"
        );
    }
}
