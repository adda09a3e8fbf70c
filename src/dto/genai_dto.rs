use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::dto::interview_dto::present;
use crate::models::grade::Grade;
use crate::models::question::GeneratedQuestion;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct GeneratePayload {
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
    #[serde(default)]
    pub contents: JsonValue,
    #[serde(default)]
    pub config: JsonValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub ok: bool,
    pub text: Option<String>,
    pub raw: JsonValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResult {
    pub ok: bool,
    pub question: GeneratedQuestion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradePayload {
    pub question: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub answer: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeResult {
    pub ok: bool,
    pub grade: Grade,
}
