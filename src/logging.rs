use chrono::Local;
use std::path::PathBuf;
use std::sync::Once;

static INIT: Once = Once::new();

pub const LOG_LEVELS: &[&str] = &["all", "debug", "info", "warn", "error", "none"];

/// Maps a `--log-level` value onto a filter. Plain `log` level names are accepted too.
pub fn parse_level(value: &str) -> Result<log::LevelFilter, String> {
    match value.trim().to_lowercase().as_str() {
        "all" => Ok(log::LevelFilter::Trace),
        "none" => Ok(log::LevelFilter::Off),
        other => other.parse::<log::LevelFilter>().map_err(|_| {
            format!(
                "log level {} unknown; possible values are: {}",
                value,
                LOG_LEVELS.join(", ")
            )
        }),
    }
}

pub fn init_logging(app_name: &str, level: Option<log::LevelFilter>) -> Result<(), String> {
    let mut init_result: Result<(), String> = Ok(());
    INIT.call_once(|| {
        if let Err(err) = init_logging_inner(app_name, level) {
            init_result = Err(err);
        }
    });
    init_result
}

fn init_logging_inner(app_name: &str, level: Option<log::LevelFilter>) -> Result<(), String> {
    let level = match level {
        Some(level) => level,
        None => std::env::var("IBANGEN_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .and_then(|value| parse_level(&value).ok())
            .unwrap_or(log::LevelFilter::Info),
    };

    let log_dir = match std::env::var("IBANGEN_LOG_DIR").ok().as_deref() {
        None | Some("off") | Some("none") | Some("") => None,
        Some(path) => Some(PathBuf::from(path)),
    };

    // stdout carries generated IBANs, so log lines go to stderr.
    let mut dispatch = fern::Dispatch::new()
        .level(level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} | {:<5} | {} | {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    if let Some(dir) = log_dir {
        std::fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let date = Local::now().format("%Y_%m_%d");
        let file_path = dir.join(format!("{app_name}-{date}.log"));
        dispatch = dispatch.chain(fern::log_file(file_path).map_err(|err| err.to_string())?);
    }

    dispatch.apply().map_err(|err| err.to_string())
}
