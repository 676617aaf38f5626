use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Default log location, next to the stored progress.
pub fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leveltest")
        .join("leveltest.log")
}

/// Install a JSON subscriber writing to `path`, filtered by `RUST_LOG`
/// (default `info`).
///
/// The terminal belongs to the UI, so nothing is written to stdout or
/// stderr. If the log file cannot be opened logging stays disabled.
pub fn init_logging(path: &Path) -> bool {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    if let Some(parent) = path.parent()
        && fs::create_dir_all(parent).is_err()
    {
        return false;
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .json(),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(path = %path.display(), "structured logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_named_after_the_app() {
        let path = default_log_path();
        assert!(path.ends_with("leveltest/leveltest.log"));
    }

    #[test]
    fn unopenable_path_disables_logging() {
        let dir = tempfile::TempDir::new().unwrap();
        // a directory cannot be opened for appending
        assert!(!init_logging(dir.path()));
    }
}
