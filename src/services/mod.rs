pub mod genai_client;
pub mod grading_service;
pub mod interview_service;
pub mod question_service;
pub mod resume_service;
pub mod session_store;
