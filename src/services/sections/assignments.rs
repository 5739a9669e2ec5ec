//! 教职工任课班级分配

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SectionService;
use crate::models::{
    ApiResponse, ErrorCode, activity_logs::entities::ActivityAction,
    sections::responses::SectionAssignmentListResponse, users::entities::User,
};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};

async fn load_staff(
    service: &SectionService,
    request: &HttpRequest,
    user_id: i64,
) -> Result<User, HttpResponse> {
    match service.get_storage(request).get_user_by_id(user_id).await {
        Ok(Some(user)) if user.role.is_staff() => Ok(user),
        Ok(Some(_)) => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Only faculty, coordinators and deans can be assigned to sections",
        ))),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Err(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get user information: {e}"),
            )),
        ),
    }
}

pub async fn list_assignments(
    service: &SectionService,
    request: &HttpRequest,
    user_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_user_section_assignments(user_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SectionAssignmentListResponse { user_id, items },
            "Section assignments retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve section assignments: {e}"),
            )),
        ),
    }
}

pub async fn assign_section(
    service: &SectionService,
    request: &HttpRequest,
    user_id: i64,
    section_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match load_staff(service, request, user_id).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    match storage.get_section_by_id(section_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SectionNotFound,
                "Section not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get section: {e}"),
                )),
            );
        }
    }

    if let Ok(true) = storage.has_section_assignment(user_id, section_id).await {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::SectionAssignmentExists,
            "Section is already assigned to this user",
        )));
    }

    match storage.assign_section(user_id, section_id).await {
        Ok(assignment) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::AssignSection,
                format!(
                    "Assigned section {} to {}",
                    assignment.section_code,
                    user.display_name()
                ),
                ActivityTarget {
                    user_id: Some(user_id),
                    section_id: Some(section_id),
                },
            )
            .await;
            Ok(HttpResponse::Created().json(ApiResponse::success(assignment, "Section assigned")))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to assign section: {e}"),
            )),
        ),
    }
}

pub async fn remove_assignment(
    service: &SectionService,
    request: &HttpRequest,
    user_id: i64,
    section_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.remove_section_assignment(user_id, section_id).await {
        Ok(true) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::RemoveSectionAssignment,
                format!("Removed section {section_id} from user {user_id}"),
                ActivityTarget {
                    user_id: Some(user_id),
                    section_id: Some(section_id),
                },
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Section assignment removed")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SectionAssignmentNotFound,
            "Section assignment not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to remove section assignment: {e}"),
            )),
        ),
    }
}
