use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ResultService, target_user_id};
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::entities::EvaluationType;
use crate::models::recommendations::entities::Sentiment;
use crate::models::results::entities::AnonymousComment;
use crate::models::results::requests::ResultsQuery;
use crate::models::results::responses::{CommentListResponse, SentimentCounts};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::evaluations::periods::resolve_period;
use crate::services::evaluations::processing::{IRREGULAR_SECTION, normalize_section};
use crate::services::evaluations::release::results_locked_for;
use crate::services::recommendations::sentiment::analyze_comment_sentiment;
use crate::storage::Storage;

const IRREGULAR_LABEL: &str = "Irregular";

fn anonymous(
    comment: Option<String>,
    section: String,
    submitted_at: chrono::DateTime<chrono::Utc>,
) -> Option<AnonymousComment> {
    let comment = comment?.trim().to_string();
    if comment.is_empty() {
        return None;
    }
    Some(AnonymousComment {
        sentiment: analyze_comment_sentiment(&comment),
        comment,
        section,
        submitted_at,
    })
}

/// 收集评语，不带评估者信息，按时间倒序
pub async fn collect_comments(
    storage: &Arc<dyn Storage>,
    evaluatee_id: i64,
    period_id: i64,
    section: Option<&str>,
) -> Result<Vec<AnonymousComment>> {
    let irregular_only = section.is_some_and(|s| s.eq_ignore_ascii_case(IRREGULAR_SECTION));
    let mut comments = Vec::new();

    if !irregular_only {
        let responses = storage
            .list_responses_for_evaluatee(evaluatee_id, Some(period_id), section)
            .await?;
        comments.extend(
            responses
                .into_iter()
                .filter_map(|r| anonymous(r.comments, r.student_section, r.submitted_at)),
        );
    }

    if section.is_none() || irregular_only {
        let irregular = storage
            .list_irregular_for_evaluatee(evaluatee_id, Some(period_id))
            .await?;
        comments.extend(irregular.into_iter().filter_map(|r| {
            anonymous(r.comments, IRREGULAR_LABEL.to_string(), r.submitted_at)
        }));
    }

    comments.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(comments)
}

pub fn count_sentiments(comments: &[AnonymousComment]) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for comment in comments {
        match comment.sentiment {
            Sentiment::Positive => counts.positive += 1,
            Sentiment::Negative => counts.negative += 1,
            Sentiment::Mixed => counts.mixed += 1,
            Sentiment::Neutral => counts.neutral += 1,
        }
    }
    counts
}

pub async fn list_comments(
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

    if !viewer.role.is_staff() && viewer.role != UserRole::Admin {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Comments are only available to faculty and staff",
        )));
    }

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
                CommentListResponse {
                    items: Vec::new(),
                    counts: SentimentCounts::default(),
                },
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
    let section = normalize_section(query.section);

    match collect_comments(&storage, user_id, period.id, section.as_deref()).await {
        Ok(items) => {
            let counts = count_sentiments(&items);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                CommentListResponse { items, counts },
                "Comments retrieved successfully",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve comments: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::evaluations::entities::NewEvaluationResponse;
    use crate::models::users::entities::UserProfile;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn new_response(
        evaluator_id: i64,
        evaluatee_id: i64,
        period_id: i64,
        section: &str,
        comments: Option<&str>,
    ) -> NewEvaluationResponse {
        NewEvaluationResponse {
            evaluator_id,
            evaluatee_id,
            evaluation_period_id: period_id,
            evaluation_type: EvaluationType::Student,
            student_number: None,
            student_section: section.to_string(),
            comments: comments.map(str::to_string),
            ratings: vec![4; 19],
        }
    }

    #[tokio::test]
    async fn test_collect_comments_by_section() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let mut ids = Vec::new();
        for (name, role) in [
            ("teacher", UserRole::Faculty),
            ("s1", UserRole::Student),
            ("s2", UserRole::Student),
            ("s3", UserRole::Student),
        ] {
            let user = storage
                .create_user(CreateUserRequest {
                    username: name.to_string(),
                    email: format!("{name}@cca.edu.ph"),
                    password: "hash".to_string(),
                    role,
                    profile: UserProfile {
                        display_name: name.to_string(),
                        ..Default::default()
                    },
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        let now = Utc::now();
        let period = storage
            .create_period("Student", EvaluationType::Student, now, now, false)
            .await
            .unwrap();

        storage
            .create_response(new_response(ids[1], ids[0], period.id, "BSIT-3A", Some("Great and patient")))
            .await
            .unwrap();
        storage
            .create_response(new_response(ids[2], ids[0], period.id, "BSIT-3B", Some("   ")))
            .await
            .unwrap();
        storage
            .create_irregular_evaluation(new_response(ids[3], ids[0], period.id, "", Some("Boring lectures")))
            .await
            .unwrap();

        let all = collect_comments(&storage, ids[0], period.id, None).await.unwrap();
        assert_eq!(all.len(), 2);
        let counts = count_sentiments(&all);
        assert_eq!(counts.positive, 1);
        assert_eq!(counts.negative, 1);

        let section = collect_comments(&storage, ids[0], period.id, Some("BSIT-3A")).await.unwrap();
        assert_eq!(section.len(), 1);
        assert_eq!(section[0].section, "BSIT-3A");

        let irregular = collect_comments(&storage, ids[0], period.id, Some("irregular")).await.unwrap();
        assert_eq!(irregular.len(), 1);
        assert_eq!(irregular[0].section, IRREGULAR_LABEL);
    }
}
