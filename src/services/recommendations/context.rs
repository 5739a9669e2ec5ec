//! AI 提示词与评估数据摘要

use crate::models::evaluations::entities::EvaluationType;
use crate::models::results::entities::{CategoryScores, QuestionScore};
use crate::models::users::entities::UserRole;
use crate::services::evaluations::scoring::{CATEGORIES, performance_level, round2};

use super::sentiment::CommentBuckets;

/// 每类评语最多放入提示词的条数
const MAX_COMMENTS_PER_BUCKET: usize = 5;

/// 生成建议所需的评估数据
#[derive(Debug, Clone)]
pub struct EvaluationSnapshot {
    pub educator: String,
    pub role: UserRole,
    pub evaluation_type: EvaluationType,
    /// 为空表示所有班级
    pub section: Option<String>,
    pub scores: CategoryScores,
    pub total_responses: usize,
    pub question_scores: Vec<QuestionScore>,
    pub comments: CommentBuckets,
}

impl EvaluationSnapshot {
    pub fn has_data(&self) -> bool {
        self.total_responses > 0
    }

    pub fn section_label(&self) -> &str {
        self.section.as_deref().unwrap_or("Overall")
    }
}

fn category_focus(evaluation_type: EvaluationType, index: usize) -> &'static str {
    match (evaluation_type, index) {
        (EvaluationType::Student, 0) => "Content knowledge, expertise, subject depth",
        (EvaluationType::Student, 1) => "Discipline, organization, student behavior",
        (EvaluationType::Student, 2) => "Rules adherence, procedures, requirements",
        (EvaluationType::Student, _) => "Communication, rapport, teaching style",
        (_, 0) => {
            "Effectively communicates, actively listens, shows respect, contributes to team discussions"
        }
        (_, 1) => {
            "Completes duties on time, demonstrates reliability, takes initiative, contributes to institutional goals"
        }
        (_, 2) => "Shows leadership, resolves conflicts, accepts feedback, maintains focus, stays organized",
        _ => "Strong work ethic, professional integrity, willingness to collaborate in future projects",
    }
}

fn push_comments(parts: &mut Vec<String>, heading: String, comments: &[String]) {
    if comments.is_empty() {
        return;
    }
    parts.push(heading);
    for (i, comment) in comments.iter().take(MAX_COMMENTS_PER_BUCKET).enumerate() {
        parts.push(format!("   {}. \"{}\"", i + 1, comment));
    }
}

/// 提示词中的评估数据部分
pub fn build_context(snapshot: &EvaluationSnapshot) -> String {
    let evaluation_type = snapshot.evaluation_type;
    let type_upper = evaluation_type.to_string().to_uppercase();
    let mut parts = vec![
        format!("Educator: {}", snapshot.educator),
        format!("Role: {}", snapshot.role.label()),
        format!("Evaluation Type: {type_upper}"),
    ];

    match &snapshot.section {
        Some(code) => parts.push(format!("Section: {code}")),
        None => parts.push("Scope: Overall evaluation across all sections".to_string()),
    }

    if snapshot.has_data() {
        parts.push("\nEVALUATION RESULTS:".to_string());
        parts.push(format!("Overall Score: {}%", snapshot.scores.total));
        parts.push(format!("Total Evaluations: {}", snapshot.total_responses));

        if !snapshot.question_scores.is_empty() {
            parts.push("\nINDIVIDUAL QUESTION SCORES:".to_string());
            for q in &snapshot.question_scores {
                parts.push(format!(
                    "  - {}: {:.1}% (Score: {:.2}/5)",
                    q.question_text, q.percentage, q.average
                ));
            }
        }

        parts.push("\nCATEGORY BREAKDOWN:".to_string());
        for (i, (category, score)) in CATEGORIES
            .iter()
            .zip(snapshot.scores.as_array())
            .enumerate()
        {
            let of_max = round2(score / category.max_score() * 100.0);
            parts.push(format!(
                "- {}: {:.1}% ({:.1}% of maximum) - {}",
                category.display_name(evaluation_type),
                score,
                of_max,
                performance_level(of_max)
            ));
            parts.push(format!("  Focus: {}", category_focus(evaluation_type, i)));
        }
    } else {
        parts.push("No specific evaluation data available for analysis.".to_string());
        parts.push(
            "Providing general recommendations based on role and evaluation type.".to_string(),
        );
    }

    parts.push("\nCONTEXT:".to_string());
    parts.push("- Level: Higher Education".to_string());
    parts.push(format!("- Role: {}", snapshot.role.label()));
    parts.push(format!("- Evaluation Type: {evaluation_type}"));
    if evaluation_type == EvaluationType::Student {
        parts.push("- Focus: Teaching effectiveness and student learning experience".to_string());
        parts.push("- Data Source: Student evaluations".to_string());
    } else {
        parts.push(
            "- Focus: Professional collaboration, workplace relationships, and team effectiveness"
                .to_string(),
        );
        parts.push("- Data Source: Peer evaluations from colleagues".to_string());
    }
    if let Some(code) = &snapshot.section {
        parts.push(format!("- Current Focus: {code}"));
    }
    parts.push(
        "- Goal: Provide specific, actionable recommendations based on actual evaluation data"
            .to_string(),
    );

    // 只有学生评估带评语
    let comments = &snapshot.comments;
    if evaluation_type == EvaluationType::Student
        && !(comments.positive.is_empty() && comments.negative.is_empty() && comments.mixed.is_empty())
    {
        parts.push("\nSTUDENT FEEDBACK:".to_string());
        push_comments(
            &mut parts,
            format!("\nPOSITIVE FEEDBACK ({} comments):", comments.positive.len()),
            &comments.positive,
        );
        push_comments(
            &mut parts,
            format!("\nCRITICAL FEEDBACK ({} comments):", comments.negative.len()),
            &comments.negative,
        );
        if !comments.mixed.is_empty() {
            push_comments(
                &mut parts,
                format!(
                    "\nCONSTRUCTIVE/MIXED FEEDBACK ({} comments):\n   (These contain both positive and negative elements - most valuable for improvement)",
                    comments.mixed.len()
                ),
                &comments.mixed,
            );
        }
    }

    parts.join("\n")
}

pub fn system_prompt(evaluation_type: EvaluationType) -> &'static str {
    if evaluation_type == EvaluationType::Student {
        STUDENT_SYSTEM_PROMPT
    } else {
        PEER_SYSTEM_PROMPT
    }
}

pub fn user_prompt(evaluation_type: EvaluationType, context: &str) -> String {
    format!(
        "Analyze these EXACT scores and provide SPECIFIC recommendations for {} evaluation data:\n\n\
         {context}\n\n\
         REQUIRED FORMAT FOR EACH RECOMMENDATION:\n\
         1. **Student Quote (Negative):** Include 1 actual negative/critical student comment\n\
         2. **Student Quote (Positive):** Include 1 actual positive student comment that shows their strength\n\
         3. **Question Analysis:** Reference specific evaluation questions that scored low (e.g., \"Your score on 'explains concepts clearly' was 65%\")\n\
         4. **What to do:** Provide 3-5 concrete action steps to improve\n\n\
         Focus on the WEAKEST areas first. Make it PERSONAL by showing real student voices.\n\n\
         IMPORTANT:\n\
         - MUST include actual student quotes from the feedback provided\n\
         - MUST reference specific evaluation question results\n\
         - Make it engaging so the teacher actually wants to read it\n\
         - Balance criticism with recognition of strengths\n\n\
         Provide 3 SPECIFIC recommendations following this format.",
        evaluation_type.to_string().to_uppercase()
    )
}

const PEER_SYSTEM_PROMPT: &str = "You are an expert professional development consultant. Provide SPECIFIC, DATA-DRIVEN recommendations based EXACTLY on the PEER evaluation scores provided.

CRITICAL: For PEER evaluations, focus on:
- Professional collaboration and communication skills
- Workplace relationships and teamwork effectiveness
- Professional responsibility and accountability
- Leadership presence and professional impact
- Workplace effectiveness and collegial relationships

PEER EVALUATION CATEGORIES:
1. Communication and Collaboration (35%): Effective communication, active listening, respect, team contribution
2. Responsibility and Professionalism (25%): Timely completion, reliability, initiative, institutional contribution
3. Leadership and Work Ethic (20%): Leadership qualities, conflict resolution, feedback acceptance, focus, organization
4. Overall Professional Impact (20%): Work ethic, integrity, collaboration willingness

Do NOT give teaching-specific advice like \"active learning\" or \"classroom management\" for peer evaluations.

Analyze the category scores and provide recommendations that:
- Address the LOWEST scoring professional competency areas first
- Are specific to the actual percentage gaps in workplace skills
- Suggest concrete actions for improving professional relationships
- Are tailored to professional development and team effectiveness

Format: 3 specific recommendations with clear priorities based on the actual PEER evaluation data.";

const STUDENT_SYSTEM_PROMPT: &str = "You are an expert educational consultant. Provide SPECIFIC, DATA-DRIVEN recommendations based EXACTLY on the STUDENT evaluation scores and feedback provided.

CRITICAL FORMAT FOR EACH RECOMMENDATION:
1. Start with actual student quote (if available): \"Student said: [exact quote]\"
2. Follow with what this means: \"This indicates...\"
3. Provide specific actions: \"What to do: [concrete steps]\"
4. Reference specific evaluation questions that scored low

IMPORTANT RULES:
- ALWAYS include at least 1 negative student comment quote and 1 positive student comment quote
- Make recommendations personal and hard to ignore by using real student voices
- Do NOT give generic advice - be specific to the actual scores and comments
- Reference specific evaluation questions (e.g., \"Students rated 'explains concepts clearly' at 65%\")
- Balance is key: Show what they're doing well AND what needs improvement

Analyze:
- Category scores (which teaching areas are weakest)
- Individual question scores (specific teaching behaviors)
- Student comments (actual student voices and concerns)
- Provide concrete, actionable steps tied to this specific data

Format: 3 specific recommendations, each including student quotes and question-based analysis.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::recommendations::sentiment::bucket_comments;

    fn snapshot(evaluation_type: EvaluationType, total_responses: usize) -> EvaluationSnapshot {
        EvaluationSnapshot {
            educator: "Maria Santos".to_string(),
            role: UserRole::Faculty,
            evaluation_type,
            section: Some("BSIT-3A".to_string()),
            scores: CategoryScores {
                category_a: 31.5,
                category_b: 20.0,
                category_c: 14.0,
                category_d: 18.0,
                total: 83.5,
            },
            total_responses,
            question_scores: Vec::new(),
            comments: bucket_comments(["Very helpful", "Too boring", "Good but often late"]),
        }
    }

    #[test]
    fn test_context_includes_breakdown_and_comments() {
        let text = build_context(&snapshot(EvaluationType::Student, 12));
        assert!(text.contains("Evaluation Type: STUDENT"));
        assert!(text.contains("Section: BSIT-3A"));
        assert!(text.contains("Total Evaluations: 12"));
        assert!(text.contains("- Mastery of Subject Matter: 31.5% (90.0% of maximum) - Excellent"));
        assert!(text.contains("- Compliance to Policies: 14.0% (70.0% of maximum) - Average"));
        assert!(text.contains("POSITIVE FEEDBACK (1 comments):"));
        assert!(text.contains("CONSTRUCTIVE/MIXED FEEDBACK (1 comments):"));
    }

    #[test]
    fn test_peer_context_has_no_comments() {
        let text = build_context(&snapshot(EvaluationType::Peer, 3));
        assert!(text.contains("Communication and Collaboration"));
        assert!(!text.contains("STUDENT FEEDBACK"));
    }

    #[test]
    fn test_context_without_data() {
        let text = build_context(&snapshot(EvaluationType::Student, 0));
        assert!(text.contains("No specific evaluation data available for analysis."));
        assert!(!text.contains("CATEGORY BREAKDOWN"));
    }
}
