use env_logger::{Builder, Env};
use std::io::Write;

/// Installs the logger. Records go to stderr as `<level>: <message>`. The
/// level comes from `RUST_LOG`, defaulting to `warn`, or `info` when
/// `verbose` is set.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    Builder::from_env(Env::default().filter_or("RUST_LOG", default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}: {}",
                record.level().as_str().to_ascii_lowercase(),
                record.args()
            )
        })
        .init();
}

/// A logger for tests which keeps every record in memory. Tests run in
/// parallel and share it, so look records up by something unique to the test
/// (e.g. a temporary path).
#[cfg(test)]
pub(crate) mod capture {
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::{Mutex, Once};

    struct CaptureLogger {
        records: Mutex<Vec<(Level, String)>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger {
        records: Mutex::new(Vec::new()),
    };
    static INIT: Once = Once::new();

    /// Installs the capturing logger once per test binary.
    pub fn install() {
        INIT.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(LevelFilter::Info);
        });
    }

    /// The warnings logged so far whose message contains `needle`.
    pub fn warnings_mentioning(needle: &str) -> Vec<String> {
        LOGGER
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, message)| *level == Level::Warn && message.contains(needle))
            .map(|(_, message)| message.clone())
            .collect()
    }
}
