pub mod genai_dto;
pub mod interview_dto;
pub mod upload_dto;
