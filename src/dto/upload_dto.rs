use serde::{Deserialize, Serialize};

use crate::models::candidate::ResumeFields;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub fields: ResumeFields,
    pub missing: Vec<String>,
}

impl From<ResumeFields> for UploadResponse {
    fn from(fields: ResumeFields) -> Self {
        let missing = fields.missing().into_iter().map(String::from).collect();
        Self { fields, missing }
    }
}
