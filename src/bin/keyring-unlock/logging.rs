//! Logger setup for the command line tool.

use std::path::Path;

use flexi_logger::{FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle};
use log::LevelFilter;

/// Start logging at `level`, to `log_file` if given and standard error otherwise.
///
/// The returned handle must be kept alive until exit so buffered file output
/// is written.
pub fn setup_logger(
    level: LevelFilter,
    log_file: Option<&Path>,
) -> Result<LoggerHandle, FlexiLoggerError> {
    let spec = LogSpecification::builder().default(level).build();
    let logger = Logger::with(spec).format(flexi_logger::default_format);

    let logger = match log_file {
        Some(path) => logger
            .log_to_file(FileSpec::try_from(path)?)
            .append()
            .format_for_files(flexi_logger::detailed_format),
        None => logger.log_to_stderr(),
    };

    logger.start()
}
