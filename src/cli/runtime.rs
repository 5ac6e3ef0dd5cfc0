use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging switches collected from the global flags
#[derive(Debug, Clone)]
pub struct LogOptions<'a> {
    pub level: &'a str,
    pub debug: bool,
    pub json: bool,
    pub file: Option<&'a Path>,
}

/// Install the global subscriber. Console logs go to stderr so stdout
/// carries only command output. Keep the returned guard alive until exit
/// or buffered file lines are lost.
pub fn init_logging(options: &LogOptions<'_>) -> Result<Option<WorkerGuard>> {
    let level = if options.debug {
        Level::DEBUG
    } else {
        options
            .level
            .parse::<Level>()
            .with_context(|| format!("Invalid log level '{}'", options.level))?
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let console = if options.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file_layer, guard) = match options.file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path {} has no file name", path.display()))?;
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_level() {
        let options = LogOptions {
            level: "chatty",
            debug: false,
            json: false,
            file: None,
        };
        let err = init_logging(&options).unwrap_err();
        assert!(err.to_string().contains("chatty"));
    }
}
