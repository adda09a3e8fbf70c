use serde::{Deserialize, Serialize};

pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grade {
    pub score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

impl Grade {
    pub fn unparsed(raw: Option<&str>) -> Self {
        let explanation = match raw {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => "No parseable response".to_string(),
        };
        Self {
            score: None,
            strengths: vec![],
            weaknesses: vec![],
            explanation,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            score: Some(0.0),
            strengths: vec![],
            weaknesses: vec!["No answer was given".to_string()],
            explanation: "No answer submitted before the time limit".to_string(),
        }
    }
}
