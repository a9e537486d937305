pub mod analytics;
pub mod answer;
pub mod user;
