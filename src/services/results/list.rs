use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ResultService, target_user_id};
use crate::middlewares::RequireJWT;
use crate::models::evaluations::entities::EvaluationType;
use crate::models::results::requests::ResultsQuery;
use crate::models::results::responses::ResultListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::evaluations::periods::resolve_period;
use crate::services::evaluations::release::results_locked_for;

/// 某周期内按班级保存的结果
pub async fn list_results(
    service: &ResultService,
    request: &HttpRequest,
    query: ResultsQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(viewer) = RequireJWT::extract_user_claims(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user claims",
        )));
    };

    let evaluation_type = query.evaluation_type.unwrap_or(EvaluationType::Student);
    match results_locked_for(&storage, &viewer.role, evaluation_type).await {
        Ok(false) => {}
        Ok(true) => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::EvaluationResultsLocked,
                "Results are not available while the evaluation is released",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to check evaluation status: {e}"),
                )),
            );
        }
    }

    let period = match resolve_period(&storage, evaluation_type, query.period_id).await {
        Ok(Some(period)) => period,
        Ok(None) => {
            return Ok(HttpResponse::Ok().json(ApiResponse::success(
                ResultListResponse { items: Vec::new() },
                "No evaluation period found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to resolve evaluation period: {e}"),
                )),
            );
        }
    };

    let user_id = target_user_id(&viewer, query.user_id);
    match storage.list_results_for_user(user_id, Some(period.id)).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ResultListResponse { items },
            "Evaluation results retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve evaluation results: {e}"),
            )),
        ),
    }
}
