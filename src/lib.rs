pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    analytics_service::AnalyticsService, auth_service::AuthService,
    report_service::ReportService, tracking_service::TrackingService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub tracking_service: TrackingService,
    pub report_service: ReportService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let auth_service = AuthService::new(pool.clone());
        let tracking_service = TrackingService::new(pool.clone());
        let report_service = ReportService::new(pool.clone());
        let analytics_service = AnalyticsService::new(pool.clone());

        Self {
            pool,
            auth_service,
            tracking_service,
            report_service,
            analytics_service,
        }
    }
}
