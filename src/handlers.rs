pub mod activity;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod hour_logs;
pub mod leads;
pub mod periods;
pub mod students;
pub mod universities;
