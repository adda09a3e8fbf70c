//! Interview session lifecycle: start, timed per-question answers, grading,
//! advance, completion and summary.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::dto::interview_dto::{
    AnsweredQuestion, PublicQuestion, SessionStatusResponse, StartInterviewResponse,
    SubmitAnswerResponse,
};
use crate::error::{Error, Result};
use crate::models::candidate::{CandidateSummary, ResumeFields};
use crate::models::grade::Grade;
use crate::models::question::Difficulty;
use crate::models::session::Session;
use crate::services::grading_service::GradingService;
use crate::services::question_service::QuestionService;
use crate::services::session_store::SessionStore;

pub const DIFFICULTY_MIX: [Difficulty; 6] = [
    Difficulty::Easy,
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::Hard,
];

#[derive(Clone)]
pub struct InterviewService {
    store: SessionStore,
    questions: QuestionService,
    time_limit: Duration,
}

impl InterviewService {
    pub fn new(store: SessionStore, questions: QuestionService, time_limit_secs: i64) -> Self {
        Self {
            store,
            questions,
            time_limit: Duration::seconds(time_limit_secs.max(1)),
        }
    }

    pub fn time_limit_seconds(&self) -> i64 {
        self.time_limit.num_seconds()
    }

    pub async fn start_interview(
        &self,
        candidate: Option<ResumeFields>,
    ) -> Result<StartInterviewResponse> {
        let mut difficulties = DIFFICULTY_MIX.to_vec();
        difficulties.shuffle(&mut rand::thread_rng());

        let mut generated = Vec::with_capacity(difficulties.len());
        for difficulty in difficulties {
            generated.push(self.questions.generate_question(difficulty).await?);
        }

        let session = Session::new(generated, candidate);
        let response = StartInterviewResponse {
            ok: true,
            session_id: session.id,
            questions: session
                .questions
                .iter()
                .enumerate()
                .map(|(index, q)| PublicQuestion {
                    index,
                    difficulty: q.difficulty,
                    question: q.question.clone(),
                })
                .collect(),
            time_limit_seconds: self.time_limit_seconds(),
        };

        tracing::info!(session_id = %session.id, "Interview started");
        self.store.insert(session).await;
        Ok(response)
    }

    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        question_index: i64,
        answer: String,
    ) -> Result<SubmitAnswerResponse> {
        let session = self
            .store
            .get(session_id)
            .await
            .ok_or_else(|| Error::NotFound("session not found".to_string()))?;

        let index = check_submittable(&session, question_index)?;
        let question_text = session.questions[index].question.clone();

        // Lock is released while the model grades.
        let grade = self.questions.grade_answer(&question_text, &answer).await?;

        let now = Utc::now();
        let recorded = self
            .store
            .update(session_id, |s| {
                check_submittable(s, question_index)?;
                s.record_answer(index, answer, grade.clone(), false, now);
                Ok::<_, Error>(submit_response(s, index, grade))
            })
            .await
            .ok_or_else(|| Error::NotFound("session not found".to_string()))??;

        tracing::info!(
            session_id = %session_id,
            question_index = index,
            score = ?recorded.grade.score,
            completed = recorded.completed,
            "Answer recorded"
        );
        Ok(recorded)
    }

    pub async fn list_candidates(&self) -> Vec<CandidateSummary> {
        self.store
            .completed()
            .await
            .iter()
            .map(GradingService::candidate_summary)
            .collect()
    }

    pub async fn session_status(&self, session_id: Uuid) -> Result<SessionStatusResponse> {
        let session = self
            .store
            .get(session_id)
            .await
            .ok_or_else(|| Error::NotFound("session not found".to_string()))?;
        Ok(self.status_view(&session, Utc::now()))
    }

    fn status_view(&self, session: &Session, now: DateTime<Utc>) -> SessionStatusResponse {
        let current = session.current_question();
        SessionStatusResponse {
            ok: true,
            session_id: session.id,
            created_at: session.created_at,
            completed: session.completed,
            current_index: session.current_index,
            num_questions: session.questions.len(),
            current_question: current.map(|q| PublicQuestion {
                index: session.current_index,
                difficulty: q.difficulty,
                question: q.question.clone(),
            }),
            time_remaining_seconds: current
                .and_then(|q| q.asked_at)
                .map(|asked| (asked + self.time_limit - now).num_seconds().max(0)),
            answered: session
                .questions
                .iter()
                .enumerate()
                .filter(|(_, q)| q.is_answered())
                .map(|(index, q)| AnsweredQuestion {
                    index,
                    difficulty: q.difficulty,
                    question: q.question.clone(),
                    answer: q.answer.clone(),
                    grade: q.grade.clone(),
                    timed_out: q.timed_out,
                })
                .collect(),
            summary: session.completed.then(|| GradingService::summarize(session)),
        }
    }

    /// Auto-submits an empty answer with a zero grade for every current
    /// question whose time limit has passed. Returns how many were expired.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> usize {
        let mut expired = 0;
        for id in self.store.active_ids().await {
            let time_limit = self.time_limit;
            let hit = self
                .store
                .update(id, |s| {
                    let mut hit = 0;
                    // A session idle for several limits loses one question per elapsed limit.
                    while let Some(q) = s.current_question() {
                        let overdue = q
                            .asked_at
                            .is_some_and(|asked| now - asked >= time_limit);
                        if !overdue || q.is_answered() {
                            break;
                        }
                        let deadline = q.asked_at.map(|a| a + time_limit).unwrap_or(now);
                        let index = s.current_index;
                        s.record_answer(index, String::new(), Grade::timed_out(), true, deadline);
                        hit += 1;
                    }
                    hit
                })
                .await
                .unwrap_or(0);
            if hit > 0 {
                tracing::info!(session_id = %id, expired = hit, "Auto-submitted overdue questions");
            }
            expired += hit;
        }
        expired
    }

    pub fn spawn_deadline_sweeper(&self, interval: std::time::Duration) {
        let svc = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                svc.expire_overdue(Utc::now()).await;
            }
        });
    }
}

fn check_submittable(session: &Session, question_index: i64) -> Result<usize> {
    let len = session.questions.len();
    if question_index < 0 || question_index as usize >= len {
        return Err(Error::BadRequest("invalid questionIndex".to_string()));
    }
    if session.completed {
        return Err(Error::Conflict("interview already completed".to_string()));
    }
    let index = question_index as usize;
    if index < session.current_index || session.questions[index].is_answered() {
        return Err(Error::Conflict("question already answered".to_string()));
    }
    if index > session.current_index {
        return Err(Error::BadRequest("question not reached yet".to_string()));
    }
    Ok(index)
}

fn submit_response(session: &Session, index: usize, grade: Grade) -> SubmitAnswerResponse {
    let next_question = if session.completed {
        None
    } else {
        let next = index + 1;
        session.questions.get(next).map(|q| PublicQuestion {
            index: next,
            difficulty: q.difficulty,
            question: q.question.clone(),
        })
    };

    SubmitAnswerResponse {
        ok: true,
        grade,
        next_question,
        completed: session.completed,
        summary: session.completed.then(|| GradingService::summarize(session)),
    }
}
