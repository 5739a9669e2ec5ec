use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::{info, warn};

use super::RecommendationService;
use super::client::ChatClient;
use super::context::{EvaluationSnapshot, build_context, system_prompt, user_prompt};
use super::fallback::{contextual_fallback, is_generic};
use super::parser::{MAX_RECOMMENDATIONS, parse_recommendations};
use super::sentiment::bucket_comments;
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::entities::{EvaluationPeriod, EvaluationType};
use crate::models::recommendations::entities::Recommendation;
use crate::models::recommendations::requests::RecommendationQuery;
use crate::models::recommendations::responses::{
    RecommendationMetadata, RecommendationResponse, RecommendationSource,
};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::evaluations::periods::resolve_period;
use crate::services::evaluations::processing::{load_scored_responses, normalize_section};
use crate::services::evaluations::release::results_locked_for;
use crate::services::evaluations::scoring::{compute_category_scores, question_scores};
use crate::services::questions::reject_without_questions;
use crate::services::system::DynamicConfig;
use crate::storage::Storage;

/// 汇总某位教职工在周期内的评估数据
pub async fn build_snapshot(
    storage: &Arc<dyn Storage>,
    educator: &User,
    evaluation_type: EvaluationType,
    period: Option<&EvaluationPeriod>,
    section: Option<String>,
) -> Result<EvaluationSnapshot> {
    let responses = match period {
        Some(period) => {
            load_scored_responses(storage, educator.id, Some(period.id), section.as_deref()).await?
        }
        None => Vec::new(),
    };
    let questions = storage.list_questions(evaluation_type, true).await?;
    let summary = compute_category_scores(&responses);

    Ok(EvaluationSnapshot {
        educator: educator.display_name().to_string(),
        role: educator.role.clone(),
        evaluation_type,
        scores: summary.scores,
        total_responses: responses.len(),
        question_scores: question_scores(&responses, &questions),
        comments: bucket_comments(responses.iter().filter_map(|r| r.comments.as_deref())),
        section,
    })
}

/// 调用 AI 生成建议，失败或内容笼统时使用预设建议
pub async fn recommend(
    client: Option<&dyn ChatClient>,
    snapshot: &EvaluationSnapshot,
) -> (Vec<Recommendation>, RecommendationSource) {
    let Some(client) = client else {
        return (contextual_fallback(snapshot), RecommendationSource::Fallback);
    };

    let prompt = user_prompt(snapshot.evaluation_type, &build_context(snapshot));
    match client
        .complete(system_prompt(snapshot.evaluation_type), &prompt)
        .await
    {
        Ok(reply) => {
            let mut recommendations = parse_recommendations(&reply);
            recommendations.truncate(MAX_RECOMMENDATIONS);
            if is_generic(&recommendations, snapshot.evaluation_type) {
                warn!(
                    "AI recommendations for {} were too generic, using fallback",
                    snapshot.educator
                );
                (contextual_fallback(snapshot), RecommendationSource::Fallback)
            } else {
                (recommendations, RecommendationSource::Ai)
            }
        }
        Err(e) => {
            warn!("AI recommendation request failed: {}", e);
            (contextual_fallback(snapshot), RecommendationSource::Fallback)
        }
    }
}

pub async fn generate_recommendations(
    service: &RecommendationService,
    request: &HttpRequest,
    query: RecommendationQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user claims",
        )));
    };

    if !user.role.is_staff() {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Recommendations are only available to faculty and staff",
        )));
    }

    let evaluation_type = query.evaluation_type.unwrap_or(EvaluationType::Student);
    if let Some(response) = reject_without_questions(evaluation_type) {
        return Ok(response);
    }

    match results_locked_for(&storage, &user.role, evaluation_type).await {
        Ok(true) => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::EvaluationResultsLocked,
                "Results are not available while the evaluation is released",
            )));
        }
        Ok(false) => {}
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

    let section = normalize_section(query.section);
    let snapshot = match build_snapshot(
        &storage,
        &user,
        evaluation_type,
        period.as_ref(),
        section,
    )
    .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::RecommendationFailed,
                    format!("Failed to load evaluation data: {e}"),
                )),
            );
        }
    };

    let client = service.get_chat_client(request);
    let use_ai = DynamicConfig::ai_enabled().await && snapshot.has_data();
    let (recommendations, source) = recommend(
        client.as_deref().filter(|_| use_ai),
        &snapshot,
    )
    .await;

    if let Some(period) = &period
        && let Err(e) = storage
            .replace_recommendations(
                user.id,
                period.id,
                evaluation_type,
                snapshot.section.clone(),
                &recommendations,
            )
            .await
    {
        warn!("Failed to store recommendations for user {}: {}", user.id, e);
    }

    info!(
        "Generated {} recommendations for user {} ({:?})",
        recommendations.len(),
        user.id,
        source
    );

    let response = RecommendationResponse {
        recommendations,
        metadata: RecommendationMetadata {
            source,
            evaluation_type,
            section: snapshot.section_label().to_string(),
            evaluation_period_id: period.map(|p| p.id),
            total_responses: snapshot.total_responses,
            overall_score: snapshot.scores.total,
            generated_at: Utc::now(),
        },
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Recommendations generated successfully",
    )))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::evaluations::entities::NewEvaluationResponse;
    use crate::models::users::entities::{UserProfile, UserRole};
    use crate::models::users::requests::CreateUserRequest;
    use crate::services::recommendations::client::testing::ScriptedClient;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn user_request(username: &str, role: UserRole) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@cca.edu.ph"),
            password: "hashed".to_string(),
            role,
            profile: UserProfile {
                display_name: username.to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_snapshot_and_recommend() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let teacher = storage
            .create_user(user_request("teacher", UserRole::Faculty))
            .await
            .unwrap();
        let student = storage
            .create_user(user_request("student", UserRole::Student))
            .await
            .unwrap();
        let now = Utc::now();
        let period = storage
            .create_period(
                "Student 1",
                EvaluationType::Student,
                now - Duration::days(30),
                now - Duration::days(1),
                false,
            )
            .await
            .unwrap();
        storage
            .create_response(NewEvaluationResponse {
                evaluator_id: student.id,
                evaluatee_id: teacher.id,
                evaluation_period_id: period.id,
                evaluation_type: EvaluationType::Student,
                student_number: None,
                student_section: "BSIT-3A".to_string(),
                comments: Some("Very helpful and clear".to_string()),
                ratings: vec![3; 19],
            })
            .await
            .unwrap();

        let snapshot = build_snapshot(&storage, &teacher, EvaluationType::Student, Some(&period), None)
            .await
            .unwrap();
        assert_eq!(snapshot.total_responses, 1);
        assert_eq!(snapshot.scores.total, 60.0);
        assert_eq!(snapshot.comments.positive.len(), 1);

        let reply = "1. Clarify Expectations\nShare rubrics in advance.\n\n2. Return Feedback Faster\nGrade within a week.";
        let client = ScriptedClient::replying(reply);
        let (recs, source) = recommend(Some(&client), &snapshot).await;
        assert_eq!(source, RecommendationSource::Ai);
        assert_eq!(recs.len(), 2);
        assert!(client.prompts.lock().unwrap()[0].contains("Educator: teacher"));

        let failing = ScriptedClient::failing();
        let (recs, source) = recommend(Some(&failing), &snapshot).await;
        assert_eq!(source, RecommendationSource::Fallback);
        assert!(!recs.is_empty());

        let (_, source) = recommend(None, &snapshot).await;
        assert_eq!(source, RecommendationSource::Fallback);
    }
}
