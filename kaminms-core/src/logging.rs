use std::path::PathBuf;
use tracing::{info_span, Span, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc, MakeWriter},
    prelude::*,
    registry::LookupSpan,
    EnvFilter, Layer,
};

pub const LOG_FILTER_ENV: &str = "KAMINMS_LOG";
pub const LOG_FORMAT_ENV: &str = "KAMINMS_LOG_FORMAT";
pub const LOG_DIR_ENV: &str = "KAMINMS_LOG_DIR";

const DEFAULT_FILTER: &str = "kaminms_core=info,kaminms_versions=info,warn";

/// Where and how the layer writes its own diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive.
    pub filter: String,
    /// One JSON object per event instead of text lines.
    pub json: bool,
    /// Also write to a daily rolling file in this directory.
    pub dir: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            filter: DEFAULT_FILTER.to_string(),
            json: false,
            dir: None,
            file_prefix: "kaminms".to_string(),
        }
    }
}

impl LogSettings {
    /// Defaults overridden by `KAMINMS_LOG`, `KAMINMS_LOG_FORMAT` and `KAMINMS_LOG_DIR`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut settings = LogSettings::default();
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|f| !f.trim().is_empty()) {
            settings.filter = filter;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            settings.json = match format.trim().to_ascii_lowercase().as_str() {
                "json" => true,
                "text" | "" => false,
                other => anyhow::bail!("{} must be `text` or `json`, got {:?}", LOG_FORMAT_ENV, other),
            };
        }
        settings.dir = lookup(LOG_DIR_ENV).filter(|d| !d.is_empty()).map(PathBuf::from);
        Ok(settings)
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }
}

/// The span every facade log line is recorded under.
pub fn plugin_span(plugin: &str) -> Span {
    info_span!("kaminms", plugin = %plugin)
}

fn fmt_layer<S, W>(json: bool, ansi: bool, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(ansi)
        .with_writer(writer);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Installs a global subscriber: stderr, plus a rolling file when `dir` is set.
///
/// Inside a server the host's subscriber usually already exists and this
/// returns an error; the facade's spans then go to that subscriber instead.
pub fn init_logging(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&settings.filter)?;

    let file_layer = match &settings.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&settings.file_prefix)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // the writer flushes until process exit
            std::mem::forget(guard);
            Some(fmt_layer(settings.json, false, writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(settings.json, true, std::io::stderr))
        .with(file_layer)
        .try_init()?;

    tracing::info!(filter = %settings.filter, dir = ?settings.dir, "kaminms logging installed");
    Ok(())
}

/// Console-only logging for tests; repeated calls are harmless.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kaminms_core=trace,kaminms_versions=trace,debug")),
        )
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn captured(json: bool, emit: impl FnOnce()) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber =
            tracing_subscriber::registry().with(fmt_layer(json, false, move || writer.clone()));
        tracing::subscriber::with_default(subscriber, emit);
        capture.text()
    }

    #[test]
    fn test_text_lines_carry_the_plugin() {
        let out = captured(false, || {
            let _entered = plugin_span("Factions").entered();
            tracing::info!("bound server version");
        });
        assert!(out.contains("kaminms{plugin=Factions}"), "{}", out);
        assert!(out.contains("bound server version"));
    }

    #[test]
    fn test_json_lines_carry_the_plugin() {
        let out = captured(true, || {
            let _entered = plugin_span("Factions").entered();
            tracing::warn!(capability = "namespaced", "capability failed");
        });
        let line: serde_json::Value = serde_json::from_str(out.lines().next().unwrap()).unwrap();
        assert_eq!(line["span"]["plugin"], "Factions");
        assert_eq!(line["fields"]["capability"], "namespaced");
    }

    #[test]
    fn test_settings_from_lookup() {
        let settings = LogSettings::from_lookup(|key| match key {
            LOG_FILTER_ENV => Some("kaminms_core=debug".to_string()),
            LOG_FORMAT_ENV => Some("JSON".to_string()),
            LOG_DIR_ENV => Some("/tmp/kaminms".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(settings.filter, "kaminms_core=debug");
        assert!(settings.json);
        assert_eq!(settings.dir, Some(PathBuf::from("/tmp/kaminms")));

        assert_eq!(LogSettings::from_lookup(|_| None).unwrap(), LogSettings::default());
        assert!(LogSettings::from_lookup(|key| (key == LOG_FORMAT_ENV).then(|| "xml".to_string())).is_err());
    }

    #[test]
    fn test_bad_filter_is_refused() {
        let settings = LogSettings {
            filter: "kaminms_core=loud".to_string(),
            ..LogSettings::default()
        };
        assert!(init_logging(&settings).is_err());
    }
}
