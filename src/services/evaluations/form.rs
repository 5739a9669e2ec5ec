use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use super::release::is_period_active;
use super::submit::{EvaluationRoute, evaluation_route, submission_type};
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::responses::{EvaluateeItem, EvaluationFormResponse};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 评估者当前可评估的教职工
pub async fn list_evaluatees(storage: &dyn Storage, evaluator: &User) -> Result<Vec<User>> {
    let roles: Vec<UserRole> = UserRole::staff_roles().iter().map(|r| (*r).clone()).collect();
    let staff = storage.list_users_by_roles(&roles).await?;

    let mut allowed = Vec::new();
    for user in staff {
        match evaluation_route(evaluator, &user) {
            Ok(EvaluationRoute::Section(section_id)) => {
                if storage.has_section_assignment(user.id, section_id).await? {
                    allowed.push(user);
                }
            }
            Ok(_) => allowed.push(user),
            Err(_) => {}
        }
    }
    Ok(allowed)
}

pub async fn evaluation_form(
    service: &EvaluationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(evaluator) = RequireJWT::extract_user_claims(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let Some(evaluation_type) = submission_type(&evaluator) else {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::EvaluationNotAllowed,
            "You are not allowed to submit evaluations",
        )));
    };

    let form: Result<Option<EvaluationFormResponse>> = async {
        if !is_period_active(&storage, evaluation_type).await? {
            return Ok(None);
        }
        let Some(period) = storage.get_active_period(evaluation_type).await? else {
            return Ok(None);
        };

        let questions = storage.list_questions(evaluation_type, true).await?;
        let evaluated: HashSet<i64> = storage
            .list_evaluated_ids(evaluator.id, period.id)
            .await?
            .into_iter()
            .collect();
        let evaluatees = list_evaluatees(storage.as_ref(), &evaluator)
            .await?
            .into_iter()
            .map(|u| EvaluateeItem {
                id: u.id,
                display_name: u.display_name().to_string(),
                already_evaluated: evaluated.contains(&u.id),
                role: u.role,
                institute: u.profile.institute,
            })
            .collect();

        Ok(Some(EvaluationFormResponse {
            evaluation_type,
            period,
            questions,
            evaluatees,
        }))
    }
    .await;

    match form {
        Ok(Some(form)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            form,
            "Evaluation form retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::EvaluationNotReleased,
            format!(
                "The {} evaluation form is not currently released",
                evaluation_type.label()
            ),
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load evaluation form: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sections::requests::CreateSectionRequest;
    use crate::models::users::entities::UserProfile;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    async fn create(storage: &SeaOrmStorage, name: &str, role: UserRole, profile: UserProfile) -> User {
        storage
            .create_user(CreateUserRequest {
                username: name.to_string(),
                email: format!("{name}@cca.edu.ph"),
                password: "hash".to_string(),
                role,
                profile,
            })
            .await
            .unwrap()
    }

    fn staff_profile(institute: &str) -> UserProfile {
        UserProfile {
            display_name: "Staff".to_string(),
            institute: Some(institute.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_evaluatees_follow_section_assignments() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let section = storage
            .create_section(CreateSectionRequest {
                code: "BSIT-3A".to_string(),
                name: None,
                year_level: None,
            })
            .await
            .unwrap();

        let assigned = create(&storage, "teacher1", UserRole::Faculty, staff_profile("ICSLIS")).await;
        let other = create(&storage, "teacher2", UserRole::Faculty, staff_profile("IBM")).await;
        storage.assign_section(assigned.id, section.id).await.unwrap();

        let student = create(
            &storage,
            "student1",
            UserRole::Student,
            UserProfile {
                display_name: "Student".to_string(),
                section_id: Some(section.id),
                ..Default::default()
            },
        )
        .await;
        let ids: Vec<i64> = list_evaluatees(&storage, &student)
            .await
            .unwrap()
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![assigned.id]);

        let irregular = create(
            &storage,
            "student2",
            UserRole::Student,
            UserProfile {
                display_name: "Irregular".to_string(),
                is_irregular: true,
                ..Default::default()
            },
        )
        .await;
        assert_eq!(list_evaluatees(&storage, &irregular).await.unwrap().len(), 2);

        let peer = create(&storage, "teacher3", UserRole::Dean, staff_profile("ICSLIS")).await;
        let ids: Vec<i64> = list_evaluatees(&storage, &peer)
            .await
            .unwrap()
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![assigned.id]);
        assert!(!ids.contains(&other.id));
    }
}
