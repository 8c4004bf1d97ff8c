//! Column statistics for the `Rawdata` sheet of uploaded workbooks, served over HTTP.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use services::report_cache::ReportCache;

// Application state
pub struct AppState {
    config: config::Config,
    reports: ReportCache,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let reports = ReportCache::new(config.report_cache_capacity, config.report_ttl);
        Self { config, reports }
    }
}
