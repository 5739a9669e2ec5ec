//! AI 不可用或结果过于笼统时的预设建议

use crate::models::evaluations::entities::EvaluationType;
use crate::models::recommendations::entities::{Priority, Recommendation};
use crate::services::evaluations::scoring::{ACCEPTABLE_THRESHOLD, CATEGORIES};

use super::context::EvaluationSnapshot;
use super::parser::MAX_RECOMMENDATIONS;

const TEACHING_TERMS: [&str; 17] = [
    "classroom",
    "student",
    "teaching",
    "lesson",
    "homework",
    "assignment",
    "curriculum",
    "syllabus",
    "lecture",
    "pedagogy",
    "instructional",
    "learning objectives",
    "formative assessment",
    "active learning",
    "differentiated instruction",
    "student engagement",
    "lesson plan",
];

const STOCK_ACTIVITIES: [&str; 5] = [
    "think-pair-share",
    "exit tickets",
    "minute papers",
    "jigsaw activities",
    "fishbowl discussion",
];

fn rec(title: &str, description: impl Into<String>, priority: Priority, reason: Option<String>) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        description: description.into(),
        priority,
        reason,
    }
}

/// 同事互评出现教学用语，或学生评估过半是套话时判为笼统
pub fn is_generic(recommendations: &[Recommendation], evaluation_type: EvaluationType) -> bool {
    if recommendations.is_empty() {
        return true;
    }

    let texts: Vec<String> = recommendations
        .iter()
        .map(|r| format!("{} {}", r.title, r.description).to_lowercase())
        .collect();

    if evaluation_type == EvaluationType::Student {
        let generic = texts
            .iter()
            .filter(|t| STOCK_ACTIVITIES.iter().any(|term| t.contains(term)))
            .count();
        generic * 2 > recommendations.len()
    } else {
        texts
            .iter()
            .any(|t| TEACHING_TERMS.iter().any(|term| t.contains(term)))
    }
}

/// 类别表现，按表现从低到高排序
struct CategoryPerformance {
    index: usize,
    name: &'static str,
    performance: f64,
}

fn weak_categories(snapshot: &EvaluationSnapshot) -> Vec<CategoryPerformance> {
    let mut performances: Vec<CategoryPerformance> = CATEGORIES
        .iter()
        .zip(snapshot.scores.as_array())
        .enumerate()
        .map(|(index, (category, score))| CategoryPerformance {
            index,
            name: category.display_name(snapshot.evaluation_type),
            performance: score / category.max_score() * 100.0,
        })
        .collect();
    performances.sort_by(|a, b| a.performance.total_cmp(&b.performance));
    performances
        .into_iter()
        .filter(|p| p.performance < ACCEPTABLE_THRESHOLD)
        .collect()
}

/// 根据实际得分生成，没有数据时使用角色预设
pub fn contextual_fallback(snapshot: &EvaluationSnapshot) -> Vec<Recommendation> {
    if !snapshot.has_data() {
        return role_fallback(snapshot.role.is_leader(), snapshot.evaluation_type);
    }
    if snapshot.evaluation_type == EvaluationType::Student {
        student_fallback(snapshot)
    } else {
        peer_fallback(snapshot)
    }
}

fn peer_advice(index: usize) -> &'static str {
    match index {
        0 => {
            "Practice active listening techniques and ensure you understand colleagues' perspectives before responding. Make conscious efforts to contribute meaningfully to team discussions."
        }
        1 => {
            "Set clear deadlines for yourself and communicate progress regularly. Take ownership of tasks and look for opportunities to contribute beyond your immediate responsibilities."
        }
        2 => {
            "Volunteer for leadership roles in team projects and demonstrate strong organizational skills. Be proactive in addressing challenges and helping colleagues."
        }
        _ => {
            "Focus on building trust with colleagues through consistent performance and professional integrity. Make yourself available for collaboration and mentorship opportunities."
        }
    }
}

fn peer_fallback(snapshot: &EvaluationSnapshot) -> Vec<Recommendation> {
    let weak = weak_categories(snapshot);
    let mut recommendations = Vec::with_capacity(MAX_RECOMMENDATIONS);

    if let Some(weakest) = weak.first() {
        let score = weakest.performance;
        let reason = |source: &str| {
            Some(format!(
                "Based on {:.1}% performance in {} from {source}",
                weakest.performance, weakest.name
            ))
        };
        recommendations.push(match weakest.index {
            0 => rec(
                "Enhance Professional Communication Skills",
                format!("Your communication and collaboration score is {score:.1}%. Focus on active listening in meetings, providing clear and timely updates to colleagues, and seeking clarification to ensure mutual understanding."),
                Priority::High,
                reason("peer feedback"),
            ),
            1 => rec(
                "Strengthen Professional Accountability",
                format!("With a {score:.1}% score in Responsibility and Professionalism, focus on consistently meeting deadlines, taking ownership of responsibilities, and proactively contributing to institutional goals. Document your contributions and follow through on commitments."),
                Priority::High,
                reason("peer evaluations"),
            ),
            2 => rec(
                "Develop Leadership Presence and Impact",
                format!("Your leadership and work ethic score of {score:.1}% indicates opportunity for growth. Take initiative in group projects, demonstrate strong organizational skills, and help resolve team conflicts constructively. Be more open to feedback and apply it for improvement."),
                Priority::High,
                reason("colleague feedback"),
            ),
            _ => rec(
                "Increase Professional Impact and Collegiality",
                format!("Based on your {score:.1}% score in Overall Professional Impact, focus on demonstrating strong work ethic, maintaining professional integrity, and building relationships that make colleagues want to collaborate with you on future projects."),
                Priority::High,
                reason("peer assessments"),
            ),
        });
    }

    if let Some(second) = weak.get(1) {
        recommendations.push(Recommendation {
            title: format!("Improve {}", second.name),
            description: format!(
                "Peer feedback shows opportunity in {} (score: {:.1}%). {}",
                second.name.to_lowercase(),
                second.performance,
                peer_advice(second.index)
            ),
            priority: Priority::Medium,
            reason: Some(format!(
                "Based on {:.1}% performance in {} from colleague evaluations",
                second.performance, second.name
            )),
        });
    }

    let fillers = [
        rec(
            "Seek Constructive Peer Feedback",
            "Regularly ask colleagues for specific feedback on your collaborative approach and professional contributions. Create an action plan based on their input and track your progress.",
            Priority::Medium,
            Some("Professional development strategy based on peer evaluation context".to_string()),
        ),
        rec(
            "Build Cross-Functional Relationships",
            "Initiate collaborative projects with colleagues from different departments to broaden your professional network, gain diverse perspectives, and demonstrate institutional commitment.",
            Priority::Medium,
            Some("Relationship building and professional growth strategy".to_string()),
        ),
    ];
    for filler in fillers {
        if recommendations.len() >= MAX_RECOMMENDATIONS {
            break;
        }
        recommendations.push(filler);
    }

    recommendations
}

fn student_fallback(snapshot: &EvaluationSnapshot) -> Vec<Recommendation> {
    let weak = weak_categories(snapshot);
    let mut recommendations = Vec::with_capacity(2);

    if let Some(weakest) = weak.first() {
        let score = weakest.performance;
        let focus = |default: &str| {
            snapshot
                .section
                .clone()
                .unwrap_or_else(|| default.to_string())
        };
        let reason = Some(format!(
            "Based on {:.1}% performance in {} from student evaluations",
            weakest.performance, weakest.name
        ));
        recommendations.push(match weakest.index {
            0 => rec(
                "Enhance Content Depth and Expertise",
                format!("Based on your {score:.1}% score in Mastery of Subject Matter, focus on deepening content knowledge through advanced preparation and real-world applications specific to {}.", focus("your subject")),
                Priority::High,
                reason,
            ),
            1 => rec(
                "Strengthen Classroom Management Systems",
                format!("Address your {score:.1}% Classroom Management score by establishing clear routines and proactive engagement strategies tailored to {}.", focus("your classroom")),
                Priority::High,
                reason,
            ),
            2 => rec(
                "Improve Policy Adherence and Procedures",
                format!("With a {score:.1}% Compliance score, systematically follow institutional policies and documentation requirements for {}.", focus("course delivery")),
                Priority::High,
                reason,
            ),
            _ => rec(
                "Enhance Communication and Rapport Building",
                format!("Based on your {score:.1}% Personality score, develop stronger student relationships through improved communication and creating a positive climate in {}.", focus("your teaching")),
                Priority::High,
                reason,
            ),
        });
    }

    recommendations.push(rec(
        "Implement Data-Driven Improvement",
        "Use student evaluation data to create targeted improvement plans with measurable goals and regular progress monitoring.",
        Priority::Medium,
        Some("Evidence-based teaching improvement strategy".to_string()),
    ));

    recommendations
}

/// 没有评估数据时的角色预设
pub fn role_fallback(is_leader: bool, evaluation_type: EvaluationType) -> Vec<Recommendation> {
    let items: [(&str, &str, Priority, Option<&str>); 3] = match (evaluation_type == EvaluationType::Student, is_leader) {
        (false, true) => [
            (
                "Develop Faculty Collaboration Systems",
                "Create structured programs for peer mentoring, interdisciplinary collaboration, and professional community building to enhance team effectiveness.",
                Priority::High,
                Some("Leadership role in fostering professional collaboration"),
            ),
            (
                "Enhance Team Communication Protocols",
                "Establish clear communication channels and meeting structures to improve information sharing and collaborative decision-making across departments.",
                Priority::High,
                Some("Organizational communication improvement"),
            ),
            (
                "Promote Professional Development Culture",
                "Encourage continuous professional growth through workshops, peer learning groups, and leadership opportunities focused on workplace effectiveness.",
                Priority::Medium,
                Some("Building learning organization culture"),
            ),
        ],
        (false, false) => [
            (
                "Build Strong Professional Networks",
                "Develop meaningful collegial relationships through regular communication, collaboration, and mutual support across the institution.",
                Priority::High,
                Some("Fundamental professional relationship building"),
            ),
            (
                "Enhance Collaborative Communication",
                "Practice active listening, clear expression of ideas, and constructive feedback in all professional interactions with colleagues.",
                Priority::High,
                Some("Professional communication skills development"),
            ),
            (
                "Develop Professional Leadership Skills",
                "Take initiative in team projects, contribute to institutional goals, and mentor colleagues to strengthen your professional impact.",
                Priority::Medium,
                Some("Professional growth and leadership development"),
            ),
        ],
        (true, true) => [
            (
                "Develop Faculty Support Systems",
                "Create structured mentoring programs and professional development opportunities tailored to departmental teaching needs.",
                Priority::High,
                None,
            ),
            (
                "Implement Curriculum Alignment Strategies",
                "Ensure course objectives, assessments, and instructional methods are aligned across the program for cohesive student learning.",
                Priority::High,
                None,
            ),
            (
                "Establish Data-Driven Improvement Cycles",
                "Use evaluation data to identify program strengths and areas for improvement, creating targeted intervention plans.",
                Priority::Medium,
                None,
            ),
        ],
        (true, false) => [
            (
                "Design Engaging Learning Experiences",
                "Create interactive lessons that promote critical thinking and active student participation through varied instructional strategies.",
                Priority::High,
                None,
            ),
            (
                "Develop Comprehensive Assessment Plans",
                "Implement diverse assessment methods that accurately measure student learning and provide meaningful feedback for improvement.",
                Priority::High,
                None,
            ),
            (
                "Build Strong Student Relationships",
                "Establish positive rapport with students through effective communication, accessibility, and supportive learning environments.",
                Priority::Medium,
                None,
            ),
        ],
    };

    items
        .into_iter()
        .map(|(title, description, priority, reason)| {
            rec(title, description, priority, reason.map(str::to_string))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::results::entities::CategoryScores;
    use crate::models::users::entities::UserRole;
    use crate::services::recommendations::sentiment::CommentBuckets;

    fn snapshot(evaluation_type: EvaluationType, scores: [f64; 4], responses: usize) -> EvaluationSnapshot {
        EvaluationSnapshot {
            educator: "J. Cruz".to_string(),
            role: UserRole::Faculty,
            evaluation_type,
            section: None,
            scores: CategoryScores {
                category_a: scores[0],
                category_b: scores[1],
                category_c: scores[2],
                category_d: scores[3],
                total: scores.iter().sum(),
            },
            total_responses: responses,
            question_scores: Vec::new(),
            comments: CommentBuckets::default(),
        }
    }

    #[test]
    fn test_generic_checks() {
        let peer = vec![rec("Improve lesson plans", "More structure", Priority::High, None)];
        assert!(is_generic(&peer, EvaluationType::Peer));
        let peer = vec![rec("Communicate updates", "Share weekly notes", Priority::High, None)];
        assert!(!is_generic(&peer, EvaluationType::Peer));

        let student = vec![
            rec("Use exit tickets", "", Priority::High, None),
            rec("Try think-pair-share", "", Priority::Medium, None),
            rec("Return grades promptly", "", Priority::Low, None),
        ];
        assert!(is_generic(&student, EvaluationType::Student));
        assert!(!is_generic(&student[1..], EvaluationType::Student));
        assert!(is_generic(&[], EvaluationType::Student));
    }

    #[test]
    fn test_peer_fallback_targets_weakest_categories() {
        // 表现：A 60%，B 72%，C 95%，D 90%
        let recs = contextual_fallback(&snapshot(EvaluationType::Peer, [21.0, 18.0, 19.0, 18.0], 4));
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].title, "Enhance Professional Communication Skills");
        assert_eq!(recs[1].title, "Improve Responsibility and Professionalism");
        assert_eq!(recs[2].title, "Seek Constructive Peer Feedback");
    }

    #[test]
    fn test_student_fallback_adds_one_filler() {
        let recs = contextual_fallback(&snapshot(EvaluationType::Student, [34.0, 24.0, 12.0, 19.0], 8));
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].title, "Improve Policy Adherence and Procedures");
        assert!(recs[0].description.contains("course delivery"));

        let strong = contextual_fallback(&snapshot(EvaluationType::Student, [35.0, 25.0, 20.0, 20.0], 8));
        assert_eq!(strong.len(), 1);
        assert_eq!(strong[0].title, "Implement Data-Driven Improvement");
    }

    #[test]
    fn test_role_fallback_without_data() {
        let recs = contextual_fallback(&snapshot(EvaluationType::Peer, [0.0; 4], 0));
        assert_eq!(recs[0].title, "Build Strong Professional Networks");
        let leader = role_fallback(true, EvaluationType::Student);
        assert_eq!(leader[0].title, "Develop Faculty Support Systems");
        assert_eq!(leader[2].priority, Priority::Medium);
    }
}
