//! 评语情感分析（关键词匹配）

use crate::models::recommendations::entities::Sentiment;

const POSITIVE_INDICATORS: [&str; 22] = [
    "excellent", "great", "good", "wonderful", "amazing", "helpful", "clear", "engaging",
    "knowledgeable", "patient", "friendly", "caring", "supportive", "effective", "love", "best",
    "awesome", "fantastic", "outstanding", "brilliant", "inspiring", "dedicated",
];

const NEGATIVE_INDICATORS: [&str; 23] = [
    "poor", "bad", "terrible", "worst", "boring", "confusing", "unclear", "unfair", "difficult",
    "hard", "hate", "dislike", "unprofessional", "rude", "unhelpful", "lazy", "absent",
    "disorganized", "disappointing", "frustrating", "inadequate", "abused", "abuse",
];

const MIXED_INDICATORS: [&str; 9] = [
    "but", "however", "although", "sometimes", "though", "could be", "should be",
    "would be better", "except",
];

/// 子串匹配，"unclear" 同时命中 "clear" 与 "unclear"
pub fn analyze_comment_sentiment(comment: &str) -> Sentiment {
    let lower = comment.to_lowercase();
    if lower.trim().is_empty() {
        return Sentiment::Neutral;
    }

    let positive = POSITIVE_INDICATORS
        .iter()
        .filter(|w| lower.contains(*w))
        .count();
    let negative = NEGATIVE_INDICATORS
        .iter()
        .filter(|w| lower.contains(*w))
        .count();
    let has_mixed = MIXED_INDICATORS.iter().any(|w| lower.contains(w));

    if (positive > 0 && negative > 0) || (has_mixed && positive + negative > 0) {
        Sentiment::Mixed
    } else if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// 按情感分组的评语
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentBuckets {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub mixed: Vec<String>,
    pub neutral: Vec<String>,
}

pub fn bucket_comments<'a>(comments: impl IntoIterator<Item = &'a str>) -> CommentBuckets {
    let mut buckets = CommentBuckets::default();
    for comment in comments {
        let comment = comment.trim();
        if comment.is_empty() {
            continue;
        }
        let bucket = match analyze_comment_sentiment(comment) {
            Sentiment::Positive => &mut buckets.positive,
            Sentiment::Negative => &mut buckets.negative,
            Sentiment::Mixed => &mut buckets.mixed,
            Sentiment::Neutral => &mut buckets.neutral,
        };
        bucket.push(comment.to_string());
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_classification() {
        assert_eq!(
            analyze_comment_sentiment("Very helpful and patient teacher"),
            Sentiment::Positive
        );
        assert_eq!(
            analyze_comment_sentiment("Always absent and rude"),
            Sentiment::Negative
        );
        assert_eq!(
            analyze_comment_sentiment("Great lessons, but sometimes late"),
            Sentiment::Mixed
        );
        assert_eq!(analyze_comment_sentiment("No comment"), Sentiment::Neutral);
        assert_eq!(analyze_comment_sentiment("   "), Sentiment::Neutral);
    }

    #[test]
    fn test_substring_overlap_counts_both_sides() {
        // "unclear" 包含 "clear"
        assert_eq!(
            analyze_comment_sentiment("The lesson was unclear"),
            Sentiment::Mixed
        );
    }

    #[test]
    fn test_bucket_comments_skips_blank() {
        let buckets = bucket_comments(["Excellent!", "", "  ", "boring"]);
        assert_eq!(buckets.positive, vec!["Excellent!".to_string()]);
        assert_eq!(buckets.negative, vec!["boring".to_string()]);
        assert!(buckets.mixed.is_empty());
    }
}
