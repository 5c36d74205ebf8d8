use log::LevelFilter;
use log4rs::{
    Config,
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const LOG_SIZE_LIMIT: u64 = 10 * 1024 * 1024; // 10 MB

const LOG_FILE_COUNT: u32 = 3;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} - {m}\n";

/// Rolling file + stderr when LOG_FILE_PATH / LOG_ARCHIVE_PATTERN are set;
/// stderr only otherwise (local runs).
pub fn init_logger() {
    let stderr_level = LevelFilter::Info;
    let file_level = LevelFilter::Debug;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let stderr_appender = Appender::builder()
        .filter(Box::new(ThresholdFilter::new(stderr_level)))
        .build("stderr", Box::new(stderr));

    let file_config = std::env::var("LOG_FILE_PATH")
        .ok()
        .zip(std::env::var("LOG_ARCHIVE_PATTERN").ok());

    let config = match file_config {
        Some((file_path, archive_pattern)) => {
            let trigger = SizeTrigger::new(LOG_SIZE_LIMIT);
            let roller = FixedWindowRoller::builder()
                .build(&archive_pattern, LOG_FILE_COUNT)
                .expect("Invalid LOG_ARCHIVE_PATTERN");
            let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

            let logfile = log4rs::append::rolling_file::RollingFileAppender::builder()
                .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                .build(file_path, Box::new(policy))
                .expect("Failed to build log file appender");

            Config::builder()
                .appender(
                    Appender::builder()
                        .filter(Box::new(ThresholdFilter::new(file_level)))
                        .build("logfile", Box::new(logfile)),
                )
                .appender(stderr_appender)
                .build(
                    Root::builder()
                        .appender("logfile")
                        .appender("stderr")
                        .build(LevelFilter::Trace),
                )
        }
        None => Config::builder().appender(stderr_appender).build(
            Root::builder()
                .appender("stderr")
                .build(LevelFilter::Trace),
        ),
    }
    .expect("Failed to build logger config");

    let _handle = log4rs::init_config(config).expect("Failed to initialize logger");
}
