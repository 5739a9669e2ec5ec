use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SectionService;
use crate::models::{
    ApiResponse, ErrorCode, activity_logs::entities::ActivityAction,
    sections::requests::UpdateSectionRequest,
};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};
use crate::utils::validate::normalize_section_code;

pub async fn update_section(
    service: &SectionService,
    request: &HttpRequest,
    section_id: i64,
    mut data: UpdateSectionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Some(code) = data.code.take() {
        let code = match normalize_section_code(&code) {
            Ok(code) => code,
            Err(msg) => {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::SectionCodeInvalid, msg)));
            }
        };
        // 代码不能与其他班级重复
        if let Ok(Some(other)) = storage.get_section_by_code(&code).await
            && other.id != section_id
        {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::SectionAlreadyExists,
                format!("Section '{code}' already exists"),
            )));
        }
        data.code = Some(code);
    }

    match storage.update_section(section_id, data).await {
        Ok(Some(section)) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::UpdateSection,
                format!("Updated section {}", section.code),
                ActivityTarget::section(section.id),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(section, "Section updated")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SectionNotFound,
            "Section not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to update section: {e}"),
            )),
        ),
    }
}
