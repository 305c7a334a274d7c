pub mod activity;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod enrollment;
pub mod hour_log;
pub mod lead;
pub mod period;
pub mod student;
pub mod university;
