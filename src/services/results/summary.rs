use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ResultService, target_user_id};
use crate::middlewares::RequireJWT;
use crate::models::evaluations::entities::{
    EvaluationPeriod, EvaluationQuestion, EvaluationType, ScoredResponse,
};
use crate::models::results::requests::ResultsQuery;
use crate::models::results::responses::ResultSummaryResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::evaluations::periods::resolve_period;
use crate::services::evaluations::processing::{load_scored_responses, normalize_section};
use crate::services::evaluations::release::results_locked_for;
use crate::services::evaluations::scoring::{
    average_rating, category_breakdown, compute_category_scores, question_scores,
    rating_distribution,
};
use crate::services::questions::reject_without_questions;
use crate::services::system::DynamicConfig;

/// 由答卷计算结果摘要
pub fn build_summary(
    user_id: i64,
    evaluation_type: EvaluationType,
    section: Option<String>,
    period: Option<EvaluationPeriod>,
    responses: &[ScoredResponse],
    questions: &[EvaluationQuestion],
    passing_score: f64,
) -> ResultSummaryResponse {
    let summary = compute_category_scores(responses);
    let total = summary.scores.total;

    ResultSummaryResponse {
        user_id,
        evaluation_type,
        section,
        period,
        categories: category_breakdown(&summary.scores, evaluation_type),
        total_percentage: total,
        average_rating: average_rating(total),
        total_responses: responses.len(),
        distribution: rating_distribution(responses),
        question_scores: question_scores(responses, questions),
        passed: !responses.is_empty() && total >= passing_score,
    }
}

pub async fn result_summary(
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
    if let Some(response) = reject_without_questions(evaluation_type) {
        return Ok(response);
    }

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

    let user_id = target_user_id(&viewer, query.user_id);
    if user_id != viewer.id {
        match storage.get_user_by_id(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::UserNotFound,
                    "User not found",
                )));
            }
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to get user: {e}"),
                    )),
                );
            }
        }
    }

    let period = match resolve_period(&storage, evaluation_type, query.period_id).await {
        Ok(period) => period,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to resolve evaluation period: {e}"),
                )),
            );
        }
    };

    if query.period_id.is_some() && period.is_none() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::EvaluationPeriodNotFound,
            "Evaluation period not found",
        )));
    }

    let section = normalize_section(query.section);
    let responses = match &period {
        Some(p) => load_scored_responses(&storage, user_id, Some(p.id), section.as_deref()).await,
        None => Ok(Vec::new()),
    };
    let questions = storage.list_questions(evaluation_type, true).await;

    let (responses, questions) = match (responses, questions) {
        (Ok(r), Ok(q)) => (r, q),
        (Err(e), _) | (_, Err(e)) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to load evaluation responses: {e}"),
                )),
            );
        }
    };

    let passing_score = DynamicConfig::passing_score().await;
    let response = build_summary(
        user_id,
        evaluation_type,
        section,
        period,
        &responses,
        &questions,
        passing_score,
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Evaluation results retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: i32) -> ScoredResponse {
        ScoredResponse {
            ratings: vec![value; 19],
            comments: None,
            student_section: "BSIT-3A".to_string(),
        }
    }

    #[test]
    fn test_summary_pass_and_fail() {
        let passed = build_summary(1, EvaluationType::Student, None, None, &[response(4)], &[], 70.0);
        assert_eq!(passed.total_percentage, 80.0);
        assert_eq!(passed.average_rating, 4.0);
        assert_eq!(passed.categories.len(), 4);
        assert_eq!(passed.distribution.very_satisfactory, 15);
        assert!(passed.passed);

        let failed = build_summary(1, EvaluationType::Peer, None, None, &[response(3)], &[], 70.0);
        assert_eq!(failed.total_percentage, 60.0);
        assert!(!failed.passed);
        assert_eq!(failed.categories[0].name, "Communication and Collaboration");
    }

    #[test]
    fn test_summary_without_responses_never_passes() {
        let empty = build_summary(1, EvaluationType::Student, None, None, &[], &[], 0.0);
        assert_eq!(empty.total_responses, 0);
        assert_eq!(empty.total_percentage, 0.0);
        assert!(!empty.passed);
    }
}
