use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::candidate::{CandidateSummary, InterviewSummary, ResumeFields};
use crate::models::grade::Grade;
use crate::models::question::Difficulty;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CandidateInfo {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 40))]
    pub phone: Option<String>,
}

impl From<CandidateInfo> for ResumeFields {
    fn from(c: CandidateInfo) -> Self {
        ResumeFields {
            name: c.name,
            email: c.email,
            phone: c.phone,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct StartInterviewRequest {
    #[validate(nested)]
    pub candidate: Option<CandidateInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicQuestion {
    pub index: usize,
    pub difficulty: Difficulty,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewResponse {
    pub ok: bool,
    pub session_id: Uuid,
    pub questions: Vec<PublicQuestion>,
    pub time_limit_seconds: i64,
}

/// Fields are optional so a missing one can be reported as a 400 with the
/// same message regardless of which one it was.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub session_id: Option<String>,
    pub question_index: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    pub answer: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub ok: bool,
    pub grade: Grade,
    pub next_question: Option<PublicQuestion>,
    pub completed: bool,
    pub summary: Option<InterviewSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatesResponse {
    pub ok: bool,
    pub candidates: Vec<CandidateSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub index: usize,
    pub difficulty: Difficulty,
    pub question: String,
    pub answer: Option<String>,
    pub grade: Option<Grade>,
    pub timed_out: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub ok: bool,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    pub current_index: usize,
    pub num_questions: usize,
    pub current_question: Option<PublicQuestion>,
    pub time_remaining_seconds: Option<i64>,
    pub answered: Vec<AnsweredQuestion>,
    pub summary: Option<InterviewSummary>,
}

/// `Some` for any value the client sent, `null` included; only an absent
/// field falls back to `None` through `#[serde(default)]`.
pub fn present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

/// Stringifies an answer the way a form would: strings as-is, anything else as JSON.
pub fn answer_text(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_answer_is_kept_apart_from_a_missing_one() {
        let null: SubmitAnswerRequest =
            serde_json::from_value(json!({ "sessionId": "s", "questionIndex": 0, "answer": null }))
                .unwrap();
        assert_eq!(null.answer, Some(JsonValue::Null));
        assert_eq!(null.answer.as_ref().map(answer_text).as_deref(), Some(""));

        let missing: SubmitAnswerRequest =
            serde_json::from_value(json!({ "sessionId": "s", "questionIndex": 0 })).unwrap();
        assert_eq!(missing.answer, None);
    }

    #[test]
    fn non_string_answers_are_stringified() {
        assert_eq!(answer_text(&json!("plain")), "plain");
        assert_eq!(answer_text(&json!(42)), "42");
        assert_eq!(answer_text(&json!({ "a": 1 })), r#"{"a":1}"#);
    }
}
