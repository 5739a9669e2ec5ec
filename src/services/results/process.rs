use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ResultService;
use crate::models::activity_logs::entities::ActivityAction;
use crate::models::results::requests::ProcessResultsRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};
use crate::services::evaluations::processing::process_all_results;

/// 重新计算周期内所有教职工的结果，不触发未通过跟踪
pub async fn process_results(
    service: &ResultService,
    request: &HttpRequest,
    data: ProcessResultsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let period = match storage.get_period_by_id(data.period_id).await {
        Ok(Some(period)) => period,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::EvaluationPeriodNotFound,
                "Evaluation period not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get evaluation period: {e}"),
                )),
            );
        }
    };

    match process_all_results(&storage, &period).await {
        Ok((summary, _)) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::ProcessResults,
                format!(
                    "Processed results for '{}': {} of {} staff",
                    period.name, summary.processed_count, summary.total_staff
                ),
                ActivityTarget::default(),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                summary,
                "Evaluation results processed successfully",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to process evaluation results: {e}"),
            )),
        ),
    }
}
