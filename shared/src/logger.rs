use std::io::Write;

use chrono::Local;
use colored::Colorize;
use log::Level;

/// Installs the process-wide logger. Level comes from `RUST_LOG`, `info` otherwise.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");

    // A second init (tests, `local` mode) is harmless.
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => "ERROR".red().bold(),
                Level::Warn => "WARN ".yellow().bold(),
                Level::Info => "INFO ".green(),
                Level::Debug => "DEBUG".blue(),
                Level::Trace => "TRACE".purple(),
            };
            writeln!(
                buf,
                "{} {} [{}] {}",
                Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                level,
                record.target(),
                record.args()
            )
        })
        .try_init();
}
