use crate::error::{Error, Result};
use crate::models::grade::{Grade, MAX_SCORE};
use crate::models::question::{Difficulty, GeneratedQuestion};
use crate::services::genai_client::{extract_json, GenAiClient};
use serde_json::Value as JsonValue;

#[derive(Clone)]
pub struct QuestionService {
    genai: GenAiClient,
}

impl QuestionService {
    pub fn new(genai: GenAiClient) -> Self {
        Self { genai }
    }

    pub async fn generate_question(&self, difficulty: Difficulty) -> Result<GeneratedQuestion> {
        let prompt = format!(
            "You are an expert interview question generator. Produce a single programming interview question appropriate for difficulty level: {difficulty}.\n\n\
             Respond with a JSON object EXACTLY in the following shape (no extra commentary): \
             {{\"difficulty\":\"<difficulty>\", \"question\":\"<the question text>\", \"expected\":\"<a short expected answer or guideline>\"}}"
        );

        let req = self.genai.request(
            prompt,
            serde_json::json!({ "maxOutputTokens": 400, "temperature": 0.2 }),
        );
        let res = self.genai.generate_with_retry(&req).await?;
        let question = parse_question(res.text.as_deref(), difficulty);
        tracing::info!(%difficulty, "Generated interview question");
        Ok(question)
    }

    pub async fn grade_answer(&self, question: &str, candidate_answer: &str) -> Result<Grade> {
        if question.trim().is_empty() {
            return Err(Error::BadRequest("question is required".to_string()));
        }

        let prompt = format!(
            "You are an expert interview grader. Given the interview question below and a candidate's answer, grade the answer on a 0-10 scale (10 best). \
             Provide a JSON object EXACTLY in this shape: {{\"score\": <number>, \"strengths\": [\"...\"], \"weaknesses\": [\"...\"], \"explanation\": \"...\"}}.\n\n\
             Question:\n{question}\n\nCandidate Answer:\n{candidate_answer}\n\nBe concise but specific."
        );

        let req = self.genai.request(
            prompt,
            serde_json::json!({ "maxOutputTokens": 400, "temperature": 0.0 }),
        );
        let res = self.genai.generate_with_retry(&req).await?;
        let grade = parse_grade(res.text.as_deref());
        tracing::info!(score = ?grade.score, "Graded answer");
        Ok(grade)
    }
}

pub fn parse_question(text: Option<&str>, requested: Difficulty) -> GeneratedQuestion {
    let parsed = text.and_then(extract_json);
    let question = parsed
        .as_ref()
        .and_then(|v| v.get("question"))
        .and_then(|q| q.as_str())
        .filter(|q| !q.trim().is_empty());

    match (parsed.as_ref(), question) {
        (Some(v), Some(question)) => GeneratedQuestion {
            difficulty: v
                .get("difficulty")
                .and_then(|d| d.as_str())
                .and_then(Difficulty::parse)
                .unwrap_or(requested),
            question: question.trim().to_string(),
            expected: v
                .get("expected")
                .and_then(|e| e.as_str())
                .filter(|e| !e.trim().is_empty())
                .map(|e| e.trim().to_string()),
        },
        _ => GeneratedQuestion {
            difficulty: requested,
            question: text.unwrap_or_default().to_string(),
            expected: None,
        },
    }
}

pub fn parse_grade(text: Option<&str>) -> Grade {
    let Some(parsed) = text.and_then(extract_json) else {
        return Grade::unparsed(text);
    };
    // A present but null score still carries the model's feedback.
    let Some(raw_score) = parsed.get("score") else {
        return Grade::unparsed(text);
    };

    Grade {
        score: coerce_score(raw_score),
        strengths: string_list(parsed.get("strengths")),
        weaknesses: string_list(parsed.get("weaknesses")),
        explanation: parsed
            .get("explanation")
            .and_then(|e| e.as_str())
            .unwrap_or_default()
            .to_string(),
    }
}

fn coerce_score(v: &JsonValue) -> Option<f64> {
    let n = match v {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().trim_end_matches("/10").trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if n.is_finite() {
        Some(n.clamp(0.0, MAX_SCORE))
    } else {
        None
    }
}

fn string_list(v: Option<&JsonValue>) -> Vec<String> {
    match v {
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(|x| match x {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(JsonValue::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_uses_model_json_when_present() {
        let text = r#"{"difficulty":"hard","question":"Reverse a linked list in place.","expected":"Iterate with three pointers."}"#;
        let q = parse_question(Some(text), Difficulty::Easy);
        assert_eq!(q.difficulty, Difficulty::Hard);
        assert_eq!(q.question, "Reverse a linked list in place.");
        assert_eq!(q.expected.as_deref(), Some("Iterate with three pointers."));
    }

    #[test]
    fn question_keeps_requested_difficulty_when_model_omits_it() {
        let q = parse_question(Some(r#"{"question":"What is a mutex?"}"#), Difficulty::Medium);
        assert_eq!(q.difficulty, Difficulty::Medium);
        assert_eq!(q.expected, None);
    }

    #[test]
    fn question_falls_back_to_raw_text() {
        let q = parse_question(Some("Explain big-O notation."), Difficulty::Easy);
        assert_eq!(q.question, "Explain big-O notation.");
        assert_eq!(q.difficulty, Difficulty::Easy);

        let empty = parse_question(None, Difficulty::Hard);
        assert_eq!(empty.question, "");
    }

    #[test]
    fn grade_parses_full_object() {
        let text = r#"Here you go: {"score": 8, "strengths": ["clear"], "weaknesses": ["no tests"], "explanation": "Solid."}"#;
        let g = parse_grade(Some(text));
        assert_eq!(g.score, Some(8.0));
        assert_eq!(g.strengths, vec!["clear".to_string()]);
        assert_eq!(g.weaknesses, vec!["no tests".to_string()]);
        assert_eq!(g.explanation, "Solid.");
    }

    #[test]
    fn grade_score_is_coerced_and_clamped() {
        assert_eq!(parse_grade(Some(r#"{"score": "7"}"#)).score, Some(7.0));
        assert_eq!(parse_grade(Some(r#"{"score": "6/10"}"#)).score, Some(6.0));
        assert_eq!(parse_grade(Some(r#"{"score": 14}"#)).score, Some(10.0));
        assert_eq!(parse_grade(Some(r#"{"score": -2}"#)).score, Some(0.0));
        assert_eq!(parse_grade(Some(r#"{"score": "great"}"#)).score, None);
    }

    #[test]
    fn null_score_keeps_feedback() {
        let g = parse_grade(Some(
            r#"{"score": null, "strengths": ["concise"], "weaknesses": ["no example"], "explanation": "Hard to judge."}"#,
        ));
        assert_eq!(g.score, None);
        assert_eq!(g.strengths, vec!["concise".to_string()]);
        assert_eq!(g.weaknesses, vec!["no example".to_string()]);
        assert_eq!(g.explanation, "Hard to judge.");
    }

    #[test]
    fn grade_without_score_keeps_raw_text_as_explanation() {
        let g = parse_grade(Some("I cannot grade this."));
        assert_eq!(g.score, None);
        assert!(g.strengths.is_empty());
        assert_eq!(g.explanation, "I cannot grade this.");

        assert_eq!(parse_grade(None).explanation, "No parseable response");
        assert_eq!(
            parse_grade(Some(r#"{"explanation":"x"}"#)).explanation,
            r#"{"explanation":"x"}"#
        );
    }
}
