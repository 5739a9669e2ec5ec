//! 结果计算、历史归档

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use super::scoring::{average_rating, compute_category_scores, rating_distribution};
use crate::errors::Result;
use crate::models::evaluations::entities::{EvaluationPeriod, EvaluationType, ScoredResponse};
use crate::models::evaluations::responses::ProcessingResults;
use crate::models::results::entities::{EvaluationResult, ResultUpsert};
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

/// 非正常班答卷的班级标识
pub const IRREGULAR_SECTION: &str = "irregular";
/// 没有周期时补建的过去周期天数
const FALLBACK_PERIOD_DAYS: i64 = 30;

/// "Overall" 或空值表示所有班级
pub fn normalize_section(section: Option<String>) -> Option<String> {
    section
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("overall"))
}

/// 读取参与计分的答卷
///
/// `section` 为班级代码时只取该班答卷，为 `irregular` 时只取非正常班答卷，
/// 为空时两者都取。
pub async fn load_scored_responses(
    storage: &Arc<dyn Storage>,
    evaluatee_id: i64,
    period_id: Option<i64>,
    section: Option<&str>,
) -> Result<Vec<ScoredResponse>> {
    let section = section.map(str::trim).filter(|s| !s.is_empty());

    if section.is_some_and(|s| s.eq_ignore_ascii_case(IRREGULAR_SECTION)) {
        let irregular = storage
            .list_irregular_for_evaluatee(evaluatee_id, period_id)
            .await?;
        return Ok(irregular.into_iter().map(Into::into).collect());
    }

    let mut responses: Vec<ScoredResponse> = storage
        .list_responses_for_evaluatee(evaluatee_id, period_id, section)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    if section.is_none() {
        let irregular = storage
            .list_irregular_for_evaluatee(evaluatee_id, period_id)
            .await?;
        responses.extend(irregular.into_iter().map(ScoredResponse::from));
    }

    Ok(responses)
}

/// 出现次数最多的班级代码，次数相同取先出现的
pub fn most_common_section(responses: &[ScoredResponse]) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, response) in responses.iter().enumerate() {
        let entry = counts
            .entry(response.student_section.as_str())
            .or_insert((0, idx));
        entry.0 += 1;
    }
    counts
        .into_iter()
        .filter(|(code, _)| !code.is_empty())
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(code, _)| code.to_string())
}

/// 最近结束的学生评估周期，没有时补建一个过去 30 天的周期
pub async fn latest_or_fallback_period(storage: &Arc<dyn Storage>) -> Result<EvaluationPeriod> {
    if let Some(period) = storage
        .get_latest_inactive_period(EvaluationType::Student)
        .await?
    {
        return Ok(period);
    }
    create_fallback_period(storage, EvaluationType::Student).await
}

/// 补建一个已结束的过去周期
pub async fn create_fallback_period(
    storage: &Arc<dyn Storage>,
    evaluation_type: EvaluationType,
) -> Result<EvaluationPeriod> {
    let now = Utc::now();
    let name = evaluation_type.period_name(now);
    info!("Creating fallback evaluation period '{}'", name);
    storage
        .create_period(
            &name,
            evaluation_type,
            now - Duration::days(FALLBACK_PERIOD_DAYS),
            now,
            false,
        )
        .await
}

/// 计算并保存单个用户在周期内的结果，没有答卷时返回 None
pub async fn process_results_for_user(
    storage: &Arc<dyn Storage>,
    user: &User,
    period: Option<&EvaluationPeriod>,
) -> Result<Option<EvaluationResult>> {
    let period = match period {
        Some(period) => period.clone(),
        None => latest_or_fallback_period(storage).await?,
    };

    let responses = load_scored_responses(storage, user.id, Some(period.id), None).await?;
    if responses.is_empty() {
        return Ok(None);
    }

    let summary = compute_category_scores(&responses);
    let distribution = rating_distribution(&responses);

    // 优先使用档案中的班级
    let section_id = match user.profile.section_id {
        Some(id) => Some(id),
        None => match most_common_section(&responses) {
            Some(code) => storage.get_section_by_code(&code).await?.map(|s| s.id),
            None => None,
        },
    };

    let result = storage
        .upsert_result(ResultUpsert {
            user_id: user.id,
            evaluation_period_id: period.id,
            section_id,
            scores: summary.scores,
            average_rating: average_rating(summary.scores.total),
            total_responses: responses.len() as i32,
            distribution,
        })
        .await?;

    Ok(Some(result))
}

/// 处理周期内所有收到答卷的教职工，返回汇总和已保存的结果
pub async fn process_all_results(
    storage: &Arc<dyn Storage>,
    period: &EvaluationPeriod,
) -> Result<(ProcessingResults, Vec<(User, EvaluationResult)>)> {
    let staff_roles: Vec<UserRole> = UserRole::staff_roles()
        .iter()
        .map(|r| (*r).clone())
        .collect();
    let staff = storage.list_users_by_roles(&staff_roles).await?;
    let evaluated: HashSet<i64> = storage
        .list_evaluatee_ids_with_responses(period.id)
        .await?
        .into_iter()
        .collect();

    let mut details = Vec::with_capacity(staff.len());
    let mut processed = Vec::new();

    for user in &staff {
        if !evaluated.contains(&user.id) {
            details.push(format!("No evaluations for {}", user.username));
            continue;
        }
        match process_results_for_user(storage, user, Some(period)).await {
            Ok(Some(result)) => {
                details.push(format!(
                    "Processed {}: {:.1}% ({} evaluations)",
                    user.username, result.total_percentage, result.total_responses
                ));
                processed.push((user.clone(), result));
            }
            Ok(None) => details.push(format!("No evaluations for {}", user.username)),
            Err(e) => {
                warn!("Failed to process results for {}: {}", user.username, e);
                details.push(format!("Error processing {}: {}", user.username, e));
            }
        }
    }

    info!(
        "Processed {} of {} staff members for period '{}'",
        processed.len(),
        staff.len(),
        period.name
    );

    let summary = ProcessingResults {
        success: true,
        processed_count: processed.len(),
        total_staff: staff.len(),
        details,
        evaluation_period: Some(period.name.clone()),
    };
    Ok((summary, processed))
}

/// 把周期结果写入历史，已归档过的周期跳过
pub async fn archive_period_results_to_history(
    storage: &Arc<dyn Storage>,
    period: &EvaluationPeriod,
) -> Result<usize> {
    if storage.has_history_for_period(period.id).await? {
        return Ok(0);
    }
    let archived = storage.archive_period_results(period).await?;
    if archived > 0 {
        info!(
            "Archived {} evaluation results for period '{}'",
            archived, period.name
        );
    }
    Ok(archived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluations::entities::NewEvaluationResponse;
    use crate::models::sections::requests::CreateSectionRequest;
    use crate::models::users::entities::UserProfile;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn scored(section: &str) -> ScoredResponse {
        ScoredResponse {
            ratings: vec![5; 19],
            comments: None,
            student_section: section.to_string(),
        }
    }

    #[test]
    fn test_normalize_section() {
        assert_eq!(normalize_section(Some("Overall".into())), None);
        assert_eq!(normalize_section(Some("  ".into())), None);
        assert_eq!(normalize_section(Some(" BSIT-3A ".into())), Some("BSIT-3A".into()));
    }

    #[test]
    fn test_most_common_section() {
        let responses = vec![scored("A"), scored("B"), scored("B"), scored("A"), scored("C")];
        assert_eq!(most_common_section(&responses).as_deref(), Some("A"));
        assert_eq!(most_common_section(&[]), None);
        let responses = vec![scored("C"), scored("B"), scored("B")];
        assert_eq!(most_common_section(&responses).as_deref(), Some("B"));
    }

    async fn storage() -> Arc<dyn Storage> {
        Arc::new(SeaOrmStorage::new_in_memory().await.unwrap())
    }

    async fn user(storage: &Arc<dyn Storage>, name: &str, role: UserRole) -> User {
        storage
            .create_user(CreateUserRequest {
                username: name.to_string(),
                email: format!("{name}@cca.edu.ph"),
                password: "hash".to_string(),
                role,
                profile: UserProfile {
                    display_name: name.to_string(),
                    institute: Some("ICSLIS".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_process_and_archive() {
        let storage = storage().await;
        let section = storage
            .create_section(CreateSectionRequest {
                code: "BSIT-3A".to_string(),
                name: None,
                year_level: Some(3),
            })
            .await
            .unwrap();
        let faculty = user(&storage, "faculty1", UserRole::Faculty).await;
        let idle = user(&storage, "faculty2", UserRole::Faculty).await;
        let student = user(&storage, "student1", UserRole::Student).await;
        let now = Utc::now();
        let period = storage
            .create_period("Student Evaluation", EvaluationType::Student, now, now, true)
            .await
            .unwrap();

        storage
            .create_response(NewEvaluationResponse {
                evaluator_id: student.id,
                evaluatee_id: faculty.id,
                evaluation_period_id: period.id,
                evaluation_type: EvaluationType::Student,
                student_number: Some("21-0001".to_string()),
                student_section: "BSIT-3A".to_string(),
                comments: Some("Great teacher".to_string()),
                ratings: vec![4; 19],
            })
            .await
            .unwrap();

        let (summary, processed) = process_all_results(&storage, &period).await.unwrap();
        assert_eq!(summary.processed_count, 1);
        assert_eq!(summary.total_staff, 2);
        assert_eq!(processed[0].0.id, faculty.id);
        let result = &processed[0].1;
        assert_eq!(result.total_percentage, 80.0);
        assert_eq!(result.average_rating, 4.0);
        assert_eq!(result.section_id, Some(section.id));
        assert_eq!(result.distribution.very_satisfactory, 15);

        assert!(
            process_results_for_user(&storage, &idle, Some(&period))
                .await
                .unwrap()
                .is_none()
        );

        assert_eq!(
            archive_period_results_to_history(&storage, &period)
                .await
                .unwrap(),
            1
        );
        // 重复归档不再写入
        assert_eq!(
            archive_period_results_to_history(&storage, &period)
                .await
                .unwrap(),
            0
        );
    }
}
