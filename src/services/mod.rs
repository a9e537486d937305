pub mod analytics_service;
pub mod auth_service;
pub mod filter;
pub mod report_service;
pub mod tracking_service;
