pub mod connection;
pub use connection::Database;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod admin_repo;
pub use admin_repo::AdminRepository;
pub mod student_repo;
pub use student_repo::StudentRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
pub mod university_repo;
pub use university_repo::UniversityRepository;
pub mod period_repo;
pub use period_repo::PeriodRepository;
pub mod enrollment_repo;
pub use enrollment_repo::EnrollmentRepository;
pub mod hour_log_repo;
pub use hour_log_repo::HourLogRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
