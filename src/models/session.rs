use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::candidate::ResumeFields;
use super::grade::Grade;
use super::question::{Difficulty, GeneratedQuestion};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuestion {
    pub difficulty: Difficulty,
    pub question: String,
    pub expected: Option<String>,
    pub answer: Option<String>,
    pub grade: Option<Grade>,
    pub asked_at: Option<DateTime<Utc>>,
    pub answered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timed_out: bool,
}

impl From<GeneratedQuestion> for SessionQuestion {
    fn from(q: GeneratedQuestion) -> Self {
        Self {
            difficulty: q.difficulty,
            question: q.question,
            expected: q.expected,
            answer: None,
            grade: None,
            asked_at: None,
            answered_at: None,
            timed_out: false,
        }
    }
}

impl SessionQuestion {
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<SessionQuestion>,
    pub current_index: usize,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub candidate: Option<ResumeFields>,
}

impl Session {
    pub fn new(questions: Vec<GeneratedQuestion>, candidate: Option<ResumeFields>) -> Self {
        let now = Utc::now();
        let mut questions: Vec<SessionQuestion> =
            questions.into_iter().map(SessionQuestion::from).collect();
        if let Some(first) = questions.first_mut() {
            first.asked_at = Some(now);
        }
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            questions,
            current_index: 0,
            completed: false,
            completed_at: None,
            candidate,
        }
    }

    pub fn current_question(&self) -> Option<&SessionQuestion> {
        if self.completed {
            return None;
        }
        self.questions.get(self.current_index)
    }

    /// Stores the answer and its grade on `index`, then moves the session forward.
    /// The caller is responsible for checking that `index` is the current question.
    pub fn record_answer(
        &mut self,
        index: usize,
        answer: String,
        grade: Grade,
        timed_out: bool,
        now: DateTime<Utc>,
    ) {
        let len = self.questions.len();
        let Some(q) = self.questions.get_mut(index) else {
            return;
        };
        q.answer = Some(answer);
        q.grade = Some(grade);
        q.answered_at = Some(now);
        q.timed_out = timed_out;

        if index + 1 == len {
            self.completed = true;
            self.current_index = len;
            self.completed_at = Some(now);
        } else {
            self.current_index = (self.current_index + 1).min(len - 1);
            if let Some(next) = self.questions.get_mut(self.current_index) {
                if next.asked_at.is_none() {
                    next.asked_at = Some(now);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: usize) -> Vec<GeneratedQuestion> {
        (0..n)
            .map(|i| GeneratedQuestion {
                difficulty: Difficulty::Easy,
                question: format!("Q{}", i),
                expected: None,
            })
            .collect()
    }

    fn grade(score: f64) -> Grade {
        Grade {
            score: Some(score),
            strengths: vec![],
            weaknesses: vec![],
            explanation: String::new(),
        }
    }

    #[test]
    fn new_session_starts_clock_on_first_question_only() {
        let s = Session::new(questions(3), None);
        assert_eq!(s.current_index, 0);
        assert!(!s.completed);
        assert!(s.questions[0].asked_at.is_some());
        assert!(s.questions[1].asked_at.is_none());
    }

    #[test]
    fn answering_advances_and_last_answer_completes() {
        let mut s = Session::new(questions(2), None);
        let now = Utc::now();

        s.record_answer(0, "a".into(), grade(7.0), false, now);
        assert_eq!(s.current_index, 1);
        assert!(!s.completed);
        assert_eq!(s.questions[1].asked_at, Some(now));

        s.record_answer(1, "b".into(), grade(5.0), false, now);
        assert!(s.completed);
        assert_eq!(s.current_index, 2);
        assert_eq!(s.completed_at, Some(now));
        assert!(s.current_question().is_none());
    }
}
