use crate::models::candidate::{CandidateSummary, InterviewSummary};
use crate::models::session::Session;

pub struct GradingService;

impl GradingService {
    /// Totals the numeric scores of a session. Ungraded questions and grades
    /// without a score are left out of both the total and the average.
    pub fn summarize(session: &Session) -> InterviewSummary {
        let scores: Vec<f64> = session
            .questions
            .iter()
            .filter_map(|q| q.grade.as_ref().and_then(|g| g.score))
            .collect();

        let total: f64 = scores.iter().sum();
        let average = if scores.is_empty() {
            None
        } else {
            Some(total / scores.len() as f64)
        };

        InterviewSummary {
            total_score: total,
            average_score: average,
            num_questions: session.questions.len(),
        }
    }

    pub fn candidate_summary(session: &Session) -> CandidateSummary {
        let summary = Self::summarize(session);
        CandidateSummary {
            id: session.id,
            created_at: session.created_at,
            completed_at: session.completed_at,
            num_questions: summary.num_questions,
            total_score: summary.total_score,
            average_score: summary.average_score,
            candidate: session.candidate.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grade::Grade;
    use crate::models::question::{Difficulty, GeneratedQuestion};
    use chrono::Utc;

    fn session_with_scores(scores: &[Option<Option<f64>>]) -> Session {
        let questions = scores
            .iter()
            .enumerate()
            .map(|(i, _)| GeneratedQuestion {
                difficulty: Difficulty::Medium,
                question: format!("Q{}", i),
                expected: None,
            })
            .collect();
        let mut session = Session::new(questions, None);
        for (q, score) in session.questions.iter_mut().zip(scores) {
            if let Some(score) = score {
                q.answer = Some("answer".into());
                q.grade = Some(Grade {
                    score: *score,
                    strengths: vec![],
                    weaknesses: vec![],
                    explanation: String::new(),
                });
                q.answered_at = Some(Utc::now());
            }
        }
        session
    }

    #[test]
    fn averages_only_numeric_scores() {
        let s = session_with_scores(&[Some(Some(6.0)), Some(None), Some(Some(9.0)), None]);
        let summary = GradingService::summarize(&s);
        assert_eq!(summary.total_score, 15.0);
        assert_eq!(summary.average_score, Some(7.5));
        assert_eq!(summary.num_questions, 4);
    }

    #[test]
    fn no_scores_means_no_average() {
        let s = session_with_scores(&[Some(None), None]);
        let summary = GradingService::summarize(&s);
        assert_eq!(summary.total_score, 0.0);
        assert_eq!(summary.average_score, None);
    }
}
