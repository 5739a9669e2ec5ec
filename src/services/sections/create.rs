use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SectionService;
use crate::models::{
    ApiResponse, ErrorCode, activity_logs::entities::ActivityAction,
    sections::requests::CreateSectionRequest,
};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};
use crate::utils::validate::normalize_section_code;

pub async fn create_section(
    service: &SectionService,
    request: &HttpRequest,
    mut data: CreateSectionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    data.code = match normalize_section_code(&data.code) {
        Ok(code) => code,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::SectionCodeInvalid, msg)));
        }
    };
    data.name = data.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    match storage.get_section_by_code(&data.code).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::SectionAlreadyExists,
                format!("Section '{}' already exists", data.code),
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to check section: {e}"),
                )),
            );
        }
    }

    match storage.create_section(data).await {
        Ok(section) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::CreateSection,
                format!("Created section {}", section.code),
                ActivityTarget::section(section.id),
            )
            .await;
            Ok(HttpResponse::Created().json(ApiResponse::success(section, "Section created")))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to create section: {e}"),
            )),
        ),
    }
}
