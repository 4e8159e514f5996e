use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Инициализация системы трассировки (tracing)
///
/// Логи пишутся в:
/// - stdout (с цветами)
/// - `<log_dir>/backend.log` (без цветов)
///
/// Уровень задаётся через `RUST_LOG`, по умолчанию SQL-запросы скрыты.
pub fn initialize(log_dir: &Path) -> anyhow::Result<()> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!(
            "✗ ERROR: Cannot create log directory {}: {}",
            log_dir.display(),
            e
        );
        return Err(anyhow::anyhow!("Cannot create log directory: {}", e));
    }

    let log_file_path = log_dir.join("backend.log");
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!(
                "✗ ERROR: Cannot open log file {}: {} ({:?})",
                log_file_path.display(),
                e,
                e.kind()
            );
            return Err(anyhow::anyhow!("Cannot open log file: {}", e));
        }
    };

    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sqlx=warn,sea_orm=warn".into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    tracing::info!(
        "Logging initialized: level '{}', file {}",
        log_level,
        log_file_path.display()
    );
    Ok(())
}
