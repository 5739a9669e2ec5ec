use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{QuestionService, reject_without_questions};
use crate::models::activity_logs::entities::ActivityAction;
use crate::models::evaluations::requests::{BulkUpdateQuestionsRequest, UpdateQuestionRequest};
use crate::models::evaluations::responses::QuestionListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};

const MAX_QUESTION_LENGTH: usize = 500;

fn normalize_text(text: &str) -> Result<String, &'static str> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Question text cannot be empty");
    }
    if text.chars().count() > MAX_QUESTION_LENGTH {
        return Err("Question text must be at most 500 characters");
    }
    Ok(text.to_string())
}

pub async fn update_question(
    service: &QuestionService,
    request: &HttpRequest,
    question_id: i64,
    data: UpdateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let question_text = match data.question_text.as_deref().map(normalize_text) {
        Some(Ok(text)) => Some(text),
        Some(Err(msg)) => {
            return Ok(
                HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
            );
        }
        None => None,
    };

    match storage
        .update_question(question_id, question_text, data.is_active)
        .await
    {
        Ok(Some(question)) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::UpdateQuestions,
                format!(
                    "Updated {} question {}",
                    question.evaluation_type, question.question_number
                ),
                ActivityTarget::default(),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(question, "Question updated")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::EvaluationQuestionNotFound,
            "Question not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to update question: {e}"),
            )),
        ),
    }
}

pub async fn bulk_update_questions(
    service: &QuestionService,
    request: &HttpRequest,
    data: BulkUpdateQuestionsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let evaluation_type = data.evaluation_type;

    if let Some(resp) = reject_without_questions(evaluation_type) {
        return Ok(resp);
    }

    // 先全部校验，再写入
    let max_number = evaluation_type.question_count() as i32;
    let mut updates = Vec::with_capacity(data.questions.len());
    for item in data.questions {
        if !(1..=max_number).contains(&item.question_number) {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                format!(
                    "Question number must be between 1 and {max_number}, got {}",
                    item.question_number
                ),
            )));
        }
        match normalize_text(&item.question_text) {
            Ok(text) => updates.push((item.question_number, text)),
            Err(msg) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    format!("Question {}: {msg}", item.question_number),
                )));
            }
        }
    }

    for (number, text) in &updates {
        if let Err(e) = storage.upsert_question(evaluation_type, *number, text).await {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to update question {number}: {e}"),
                )),
            );
        }
    }

    info!("Updated {} {} questions", updates.len(), evaluation_type);
    log_admin_activity(
        &storage,
        request,
        ActivityAction::UpdateQuestions,
        format!("Updated {} {} questions", updates.len(), evaluation_type.label()),
        ActivityTarget::default(),
    )
    .await;

    match storage.list_questions(evaluation_type, false).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            QuestionListResponse {
                evaluation_type,
                items,
            },
            "Questions updated",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve questions: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Is punctual ").unwrap(), "Is punctual");
        assert!(normalize_text("   ").is_err());
        assert!(normalize_text(&"x".repeat(501)).is_err());
    }
}
