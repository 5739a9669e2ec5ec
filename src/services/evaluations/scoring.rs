//! 评分计算
//!
//! 只有第 1-15 题参与类别得分与评分分布，学生表单的第 16-19 题只出现在单题得分中。
//! 缺失或越界的评分按 1 分（Poor）计。

use std::ops::RangeInclusive;

use crate::models::evaluations::entities::{EvaluationQuestion, EvaluationType, ScoredResponse};
use crate::models::results::entities::{
    CategoryBreakdown, CategoryScores, QuestionScore, RatingDistribution,
};

pub const MAX_RATING: f64 = 5.0;

/// 表现阈值（百分比）
pub const EXCELLENT_THRESHOLD: f64 = 90.0;
pub const ACCEPTABLE_THRESHOLD: f64 = 80.0;
pub const WEAK_THRESHOLD: f64 = 75.0;

/// 评分类别
#[derive(Debug, Clone)]
pub struct Category {
    pub name: &'static str,
    pub peer_name: &'static str,
    pub questions: RangeInclusive<usize>,
    pub weight: f64,
}

impl Category {
    /// 类别满分
    pub fn max_score(&self) -> f64 {
        self.weight * 100.0
    }

    pub fn display_name(&self, evaluation_type: EvaluationType) -> &'static str {
        match evaluation_type {
            EvaluationType::Student => self.name,
            _ => self.peer_name,
        }
    }
}

pub const CATEGORIES: [Category; 4] = [
    Category {
        name: "Mastery of Subject Matter",
        peer_name: "Communication and Collaboration",
        questions: 1..=4,
        weight: 0.35,
    },
    Category {
        name: "Classroom Management",
        peer_name: "Responsibility and Professionalism",
        questions: 5..=8,
        weight: 0.25,
    },
    Category {
        name: "Compliance to Policies",
        peer_name: "Leadership and Work Ethic",
        questions: 9..=12,
        weight: 0.20,
    },
    Category {
        name: "Personality",
        peer_name: "Overall Professional Impact",
        questions: 13..=15,
        weight: 0.20,
    },
];

/// 参与计分的最后一题
pub const SCORED_QUESTIONS: usize = 15;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 第 `question` 题（从 1 开始）的评分
pub fn rating_value(ratings: &[i32], question: usize) -> i32 {
    question
        .checked_sub(1)
        .and_then(|idx| ratings.get(idx))
        .copied()
        .filter(|v| (1..=5).contains(v))
        .unwrap_or(1)
}

/// 类别得分及各类别原始评分和
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreSummary {
    pub scores: CategoryScores,
    pub raw_totals: [i32; 4],
}

pub fn compute_category_scores(responses: &[ScoredResponse]) -> ScoreSummary {
    let mut raw_totals = [0i32; 4];
    let mut counts = [0usize; 4];

    for response in responses {
        for (i, category) in CATEGORIES.iter().enumerate() {
            for question in category.questions.clone() {
                raw_totals[i] += rating_value(&response.ratings, question);
                counts[i] += 1;
            }
        }
    }

    let mut scaled = [0.0f64; 4];
    for (i, category) in CATEGORIES.iter().enumerate() {
        if counts[i] > 0 {
            let average = raw_totals[i] as f64 / counts[i] as f64;
            scaled[i] = average / MAX_RATING * category.weight * 100.0;
        }
    }

    let total = round2(scaled.iter().sum());
    ScoreSummary {
        scores: CategoryScores {
            category_a: round2(scaled[0]),
            category_b: round2(scaled[1]),
            category_c: round2(scaled[2]),
            category_d: round2(scaled[3]),
            total,
        },
        raw_totals,
    }
}

pub fn rating_distribution(responses: &[ScoredResponse]) -> RatingDistribution {
    let mut distribution = RatingDistribution::default();
    for response in responses {
        for question in 1..=SCORED_QUESTIONS {
            match rating_value(&response.ratings, question) {
                1 => distribution.poor += 1,
                2 => distribution.unsatisfactory += 1,
                3 => distribution.satisfactory += 1,
                4 => distribution.very_satisfactory += 1,
                _ => distribution.outstanding += 1,
            }
        }
    }
    distribution
}

pub fn question_scores(
    responses: &[ScoredResponse],
    questions: &[EvaluationQuestion],
) -> Vec<QuestionScore> {
    questions
        .iter()
        .map(|q| {
            let number = q.question_number.max(1) as usize;
            let average = if responses.is_empty() {
                0.0
            } else {
                let sum: i32 = responses
                    .iter()
                    .map(|r| rating_value(&r.ratings, number))
                    .sum();
                sum as f64 / responses.len() as f64
            };
            QuestionScore {
                question_number: q.question_number,
                question_text: q.question_text.clone(),
                average: round2(average),
                percentage: round2(average / MAX_RATING * 100.0),
            }
        })
        .collect()
}

/// 百分比换算为 5 分制
pub fn average_rating(total_percentage: f64) -> f64 {
    round2(total_percentage / 20.0)
}

pub fn category_breakdown(
    scores: &CategoryScores,
    evaluation_type: EvaluationType,
) -> Vec<CategoryBreakdown> {
    CATEGORIES
        .iter()
        .zip(scores.as_array())
        .map(|(category, score)| CategoryBreakdown {
            name: category.display_name(evaluation_type).to_string(),
            score,
            max_score: category.max_score(),
            performance: round2(score / category.max_score() * 100.0),
        })
        .collect()
}

/// 表现等级
pub fn performance_level(performance: f64) -> &'static str {
    if performance >= EXCELLENT_THRESHOLD {
        "Excellent"
    } else if performance >= ACCEPTABLE_THRESHOLD {
        "Good"
    } else if performance >= 70.0 {
        "Average"
    } else {
        "Needs Improvement"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(ratings: Vec<i32>) -> ScoredResponse {
        ScoredResponse {
            ratings,
            comments: None,
            student_section: "BSIT-3A".to_string(),
        }
    }

    #[test]
    fn test_all_outstanding_scores_full_weight() {
        let summary = compute_category_scores(&[response(vec![5; 19])]);
        assert_eq!(summary.scores.category_a, 35.0);
        assert_eq!(summary.scores.category_b, 25.0);
        assert_eq!(summary.scores.category_c, 20.0);
        assert_eq!(summary.scores.category_d, 20.0);
        assert_eq!(summary.scores.total, 100.0);
        assert_eq!(summary.raw_totals, [20, 20, 20, 15]);
    }

    #[test]
    fn test_mixed_ratings() {
        // A 全 4, B 全 3, C 全 2, D 全 5
        let mut ratings = vec![4, 4, 4, 4, 3, 3, 3, 3, 2, 2, 2, 2, 5, 5, 5];
        ratings.extend([1, 1, 1, 1]);
        let summary = compute_category_scores(&[response(ratings)]);
        assert_eq!(summary.scores.category_a, 28.0);
        assert_eq!(summary.scores.category_b, 15.0);
        assert_eq!(summary.scores.category_c, 8.0);
        assert_eq!(summary.scores.category_d, 20.0);
        assert_eq!(summary.scores.total, 71.0);
        assert_eq!(average_rating(summary.scores.total), 3.55);
    }

    #[test]
    fn test_no_responses_scores_zero() {
        let summary = compute_category_scores(&[]);
        assert_eq!(summary.scores, CategoryScores::default());
    }

    #[test]
    fn test_missing_and_invalid_ratings_count_as_poor() {
        assert_eq!(rating_value(&[5, 9], 2), 1);
        assert_eq!(rating_value(&[5], 3), 1);
        assert_eq!(rating_value(&[5], 0), 1);
        let summary = compute_category_scores(&[response(vec![])]);
        assert_eq!(summary.scores.total, 20.0);
    }

    #[test]
    fn test_distribution_ignores_questions_after_15() {
        let mut ratings = vec![5; 15];
        ratings.extend([1, 1, 1, 1]);
        let distribution = rating_distribution(&[response(ratings), response(vec![3; 15])]);
        assert_eq!(distribution.outstanding, 15);
        assert_eq!(distribution.satisfactory, 15);
        assert_eq!(distribution.poor, 0);
    }

    #[test]
    fn test_question_scores() {
        let now = chrono::Utc::now();
        let questions: Vec<EvaluationQuestion> = (1..=2)
            .map(|n| EvaluationQuestion {
                id: n as i64,
                evaluation_type: EvaluationType::Student,
                question_number: n,
                question_text: format!("Q{n}"),
                is_active: true,
                updated_at: now,
            })
            .collect();
        let scores = question_scores(&[response(vec![5, 2]), response(vec![4, 3])], &questions);
        assert_eq!(scores[0].average, 4.5);
        assert_eq!(scores[0].percentage, 90.0);
        assert_eq!(scores[1].average, 2.5);
        assert_eq!(scores[1].percentage, 50.0);
    }

    #[test]
    fn test_breakdown_and_levels() {
        let summary = compute_category_scores(&[response(vec![4; 15])]);
        let breakdown = category_breakdown(&summary.scores, EvaluationType::Peer);
        assert_eq!(breakdown[0].name, "Communication and Collaboration");
        assert_eq!(breakdown[0].max_score, 35.0);
        assert_eq!(breakdown[0].performance, 80.0);
        assert_eq!(performance_level(95.0), "Excellent");
        assert_eq!(performance_level(80.0), "Good");
        assert_eq!(performance_level(70.0), "Average");
        assert_eq!(performance_level(69.9), "Needs Improvement");
    }
}
