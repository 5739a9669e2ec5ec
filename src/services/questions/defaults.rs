use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::models::evaluations::entities::{EvaluationQuestion, EvaluationType};
use crate::storage::Storage;

pub const STUDENT_QUESTIONS: [&str; 19] = [
    "Demonstrates mastery of the subject and the ability to translate competencies into meaningful lessons.",
    "Shows ability to stimulate independent and critical thinking",
    "Is focused and explains the lesson clearly",
    "Knowledgable and uses a variety of teaching strategies.",
    "Demonstrates enthusiasm for the subject matter",
    "Establishes and communicates clearly parameters for student classroom behaviour based on student handbook and OVPAA Guidelines for the conduct of Flexible Learning Modalities.",
    "Promote self-discipline, respect and treats all students in fair and equitable manner.",
    "Keeps accurate accounting of student's attendance and records",
    "Demonstrates fairness and consistency in handling student's problems.",
    "Maintains harmonious relations with students characterized by mutual respect and understanding.",
    "Reports to class regularly.",
    "Demonstrates exceptional punctuality in observing work hours and college official functions.",
    "Returns quizzes, examination results, assignments and other activities on time.",
    "Informs the students on their academic performances and grades.",
    "Uses Google Meet and Classroom as the official platform for online classes.",
    "Commands respect by example in appearance, manners and behaviour and language.",
    "Maintains a good disposition.",
    "Relates well with students in a pleasing manner.",
    "Possesses a sense of balance that combines good humor, sincerity and fairness when confronted with difficulties in the classroom",
];

pub const PEER_QUESTIONS: [&str; 15] = [
    "Effectively communicates with others in the workplace",
    "Listens actively and values others' opinions and perspectives",
    "Shows respect in all professional interactions",
    "Contributes actively to team discussions and collaborative efforts",
    "Completes assigned duties and responsibilities on time",
    "Demonstrates reliability and accountability in work",
    "Takes initiative when appropriate and needed",
    "Makes valuable contributions to institutional goals and objectives",
    "Shows leadership qualities when needed or appropriate",
    "Helps resolve conflicts constructively when they arise",
    "Accepts and applies feedback for personal and professional improvement",
    "Maintains focus and engagement in professional duties",
    "Is prepared and organized in carrying out responsibilities",
    "Demonstrates strong work ethic and professional integrity",
    "Would you want to work with this colleague again in future projects?",
];

/// 内置题目，upward 表单没有题库
pub fn default_questions(evaluation_type: EvaluationType) -> Option<&'static [&'static str]> {
    match evaluation_type {
        EvaluationType::Student => Some(&STUDENT_QUESTIONS),
        EvaluationType::Peer => Some(&PEER_QUESTIONS),
        EvaluationType::Upward => None,
    }
}

/// 把某类题目恢复为内置题目：按题号更新，并删除多余题号
pub async fn reset_to_defaults(
    storage: &Arc<dyn Storage>,
    evaluation_type: EvaluationType,
) -> Result<Vec<EvaluationQuestion>> {
    let Some(defaults) = default_questions(evaluation_type) else {
        return Ok(Vec::new());
    };

    let mut questions = Vec::with_capacity(defaults.len());
    for (idx, text) in defaults.iter().enumerate() {
        let question = storage
            .upsert_question(evaluation_type, idx as i32 + 1, text)
            .await?;
        // upsert 不修改启用状态，重置时统一启用
        let question = if question.is_active {
            question
        } else {
            storage
                .update_question(question.id, None, Some(true))
                .await?
                .unwrap_or(question)
        };
        questions.push(question);
    }
    storage
        .delete_questions_beyond(evaluation_type, defaults.len() as i32)
        .await?;

    Ok(questions)
}

/// 启动时同步内置题目
pub async fn sync_default_questions(storage: &Arc<dyn Storage>) -> Result<()> {
    for evaluation_type in EvaluationType::releasable() {
        let questions = reset_to_defaults(storage, *evaluation_type).await?;
        info!(
            "Synced {} {} evaluation questions",
            questions.len(),
            evaluation_type
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[tokio::test]
    async fn test_sync_restores_defaults() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());

        storage
            .upsert_question(EvaluationType::Peer, 1, "Edited text")
            .await
            .unwrap();
        storage
            .upsert_question(EvaluationType::Peer, 20, "Leftover")
            .await
            .unwrap();

        sync_default_questions(&storage).await.unwrap();

        let peer = storage.list_questions(EvaluationType::Peer, false).await.unwrap();
        assert_eq!(peer.len(), 15);
        assert_eq!(peer[0].question_text, PEER_QUESTIONS[0]);

        let student = storage
            .list_questions(EvaluationType::Student, true)
            .await
            .unwrap();
        assert_eq!(student.len(), EvaluationType::Student.question_count());
    }
}
