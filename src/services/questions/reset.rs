use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::defaults::reset_to_defaults;
use super::{QuestionService, reject_without_questions};
use crate::models::activity_logs::entities::ActivityAction;
use crate::models::evaluations::requests::ResetQuestionsRequest;
use crate::models::evaluations::responses::QuestionListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};

pub async fn reset_questions(
    service: &QuestionService,
    request: &HttpRequest,
    data: ResetQuestionsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let evaluation_type = data.evaluation_type;

    if let Some(resp) = reject_without_questions(evaluation_type) {
        return Ok(resp);
    }

    match reset_to_defaults(&storage, evaluation_type).await {
        Ok(items) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::ResetQuestions,
                format!(
                    "Reset {} evaluation questions to defaults",
                    evaluation_type.label()
                ),
                ActivityTarget::default(),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                QuestionListResponse {
                    evaluation_type,
                    items,
                },
                "Questions reset to defaults",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to reset questions: {e}"),
            )),
        ),
    }
}
