pub mod auth;
pub mod enrollment_service;
pub mod hour_log_service;
pub mod lead_service;
pub mod period_service;
pub mod student_service;
