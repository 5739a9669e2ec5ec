use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SectionService;
use crate::models::{ApiResponse, ErrorCode, activity_logs::entities::ActivityAction};
use crate::services::activity_logs::log_admin_activity;

pub async fn delete_section(
    service: &SectionService,
    request: &HttpRequest,
    section_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let section = match storage.get_section_by_id(section_id).await {
        Ok(Some(section)) => section,
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
    };

    // 学生的 section_id 置空，任课分配级联删除
    match storage.delete_section(section_id).await {
        Ok(true) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::DeleteSection,
                format!("Deleted section {}", section.code),
                Default::default(),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Section deleted")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SectionNotFound,
            "Section not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to delete section: {e}"),
            )),
        ),
    }
}
