use candidate_report::candidates::{
    CandidateReportService, FileReportPublisher, JsonFileStore,
};
use candidate_report::config::AppConfig;
use candidate_report::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type FileBackedService = CandidateReportService<JsonFileStore, FileReportPublisher>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the JSON candidate file and the report file from configuration into one service.
///
/// The candidate file is created with an empty list on first start.
pub(crate) fn file_backed_service(config: &AppConfig) -> Result<FileBackedService, AppError> {
    let store = JsonFileStore::new(&config.storage.candidates_path);
    store.initialize()?;

    let publisher = FileReportPublisher::new(
        &config.storage.report_path,
        config.storage.report_location.clone(),
    );

    Ok(CandidateReportService::new(
        Arc::new(store),
        Arc::new(publisher),
        config.eligibility.clone(),
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    use candidate_report::candidates::eligibility::EligibilityPolicy;
    use candidate_report::config::{
        AppConfig, AppEnvironment, ServerConfig, StorageConfig, TelemetryConfig,
    };
    use std::path::Path;

    pub(crate) fn config_in(root: &Path) -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            storage: StorageConfig {
                candidates_path: root.join("data").join("candidates.json"),
                report_path: root.join("reports").join("report.pdf"),
                report_location: "/api/v1/reports/latest.pdf".to_string(),
            },
            eligibility: EligibilityPolicy::default(),
        }
    }
}
