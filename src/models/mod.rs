pub mod candidate;
pub mod grade;
pub mod question;
pub mod session;
