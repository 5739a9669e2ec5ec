//! 解析 AI 返回的文本
//!
//! 依次尝试：编号条目、Markdown 标题、`**1. 标题**` 块、段落。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::recommendations::entities::{Priority, Recommendation};

/// 最多保留的建议条数
pub const MAX_RECOMMENDATIONS: usize = 3;

const DEFAULT_DESCRIPTION: &str = "Focus on improving this area based on evaluation feedback.";

static NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)[.)]\s*(.+)$").expect("Invalid numbered item regex"));

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,3}\s+(.+)$").expect("Invalid markdown header regex"));

static BOLD_NUMBERED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*\*(\d+)\.\s*([^*]+?)\*\*\s*$").expect("Invalid bold numbered regex")
});

static LEADING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]\s*").expect("Invalid leading number regex"));

fn clean_title(raw: &str) -> String {
    let title = raw.replace('*', "");
    let title = title.trim().trim_end_matches(':').trim();
    // 去掉括号中的分数等说明
    let title = match title.find('(') {
        Some(idx) => title[..idx].trim(),
        None => title,
    };
    title.to_string()
}

fn into_recommendations(items: Vec<(String, String)>) -> Vec<Recommendation> {
    items
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .enumerate()
        .map(|(i, (title, description))| Recommendation {
            title,
            description: if description.is_empty() {
                DEFAULT_DESCRIPTION.to_string()
            } else {
                description
            },
            priority: Priority::for_position(i),
            reason: None,
        })
        .collect()
}

/// 按标题行切分：`heading` 返回 Some(标题) 的行开始新条目，之后的行都属于正文
fn split_by_headings<F>(text: &str, heading: F) -> Vec<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut items: Vec<(String, Vec<&str>)> = Vec::new();
    for line in text.lines() {
        match heading(line) {
            Some(title) => items.push((title, Vec::new())),
            None => {
                if let Some((_, body)) = items.last_mut() {
                    body.push(line);
                }
            }
        }
    }
    items
        .into_iter()
        .map(|(title, body)| (title, body.join("\n").trim().to_string()))
        .filter(|(title, _)| !title.is_empty())
        .collect()
}

fn parse_numbered(text: &str) -> Vec<(String, String)> {
    split_by_headings(text, |line| {
        NUMBERED_RE
            .captures(line)
            .map(|caps| clean_title(&caps[2]))
    })
    .into_iter()
    // 没有正文的编号行是行内列表，不算一条建议
    .filter(|(_, body)| !body.is_empty())
    .collect()
}

fn parse_headers(text: &str) -> Vec<(String, String)> {
    split_by_headings(text, |line| {
        HEADER_RE
            .captures(line)
            .map(|caps| caps[1].trim().to_string())
    })
}

fn parse_bold_numbered(text: &str) -> Vec<(String, String)> {
    split_by_headings(text, |line| {
        BOLD_NUMBERED_RE
            .captures(line.trim())
            .map(|caps| caps[2].trim().to_string())
    })
    .into_iter()
    .filter(|(_, body)| !body.is_empty())
    .collect()
}

fn parse_paragraphs(text: &str) -> Vec<(String, String)> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| p.chars().count() > 20)
        .map(|para| {
            let mut lines = para.lines();
            let first: String = lines.next().unwrap_or_default().trim().chars().take(100).collect();
            let rest: Vec<&str> = lines.collect();
            let description = if rest.is_empty() {
                para.to_string()
            } else {
                rest.join("\n")
            };
            let title = LEADING_NUMBER_RE.replace(&first, "");
            let title = title.replace(['*', '#'], "").trim().to_string();
            (title, description)
        })
        .collect()
}

/// 解析为最多三条建议，优先级按出现顺序为 High/Medium/Low
pub fn parse_recommendations(text: &str) -> Vec<Recommendation> {
    let strategies: [fn(&str) -> Vec<(String, String)>; 4] = [
        parse_numbered,
        parse_headers,
        parse_bold_numbered,
        parse_paragraphs,
    ];
    for strategy in strategies {
        let items = strategy(text);
        if !items.is_empty() {
            return into_recommendations(items);
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_items_with_bold_titles() {
        let text = "Here are my suggestions.\n\n\
            1. **Clarify Lesson Objectives (72%):**\n\
            Students said the lessons felt rushed.\n\
            What to do: state goals at the start.\n\
            2) Return Work Faster\n\
            Grades were returned late.\n\
            3. **Build Rapport**\n\
            Greet students by name.\n\
            4. Extra Item\n\
            Ignored.";
        let recs = parse_recommendations(text);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].title, "Clarify Lesson Objectives");
        assert_eq!(
            recs[0].description,
            "Students said the lessons felt rushed.\nWhat to do: state goals at the start."
        );
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[1].title, "Return Work Faster");
        assert_eq!(recs[1].priority, Priority::Medium);
        assert_eq!(recs[2].title, "Build Rapport");
        assert_eq!(recs[2].priority, Priority::Low);
    }

    #[test]
    fn test_markdown_headers() {
        let text = "### Improve Communication\nSpeak clearly in meetings.\n\n## Meet Deadlines\nUse a planner.";
        let recs = parse_recommendations(text);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].title, "Improve Communication");
        assert_eq!(recs[1].description, "Use a planner.");
    }

    #[test]
    fn test_bold_numbered_blocks() {
        let text = "Intro text\n**1. Engage Students**\nUse more examples.\n**2. Give Feedback**\nComment on work.";
        let recs = parse_recommendations(text);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].title, "Engage Students");
        assert_eq!(recs[1].description, "Comment on work.");
    }

    #[test]
    fn test_paragraph_fallback() {
        let text = "Short.\n\nFocus on punctual class attendance every week\n\nPrepare materials ahead of each lecture session";
        let recs = parse_recommendations(text);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].title, "Focus on punctual class attendance every week");
        assert_eq!(recs[0].description, recs[0].title);
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_recommendations("").is_empty());
        assert!(parse_recommendations("ok").is_empty());
    }
}
