use crate::numerical::BVP_linear::BVP_problem::SolutionSample;
use chrono::Local;
use csv::Writer;
use log::{LevelFilter, info};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::error::Error;
use std::fs::File;

/// Terminal logger, plus a log_<date>_<time>.txt file when `save_log` is set.
/// A second call (logger already installed) is not an error.
pub fn init_logger(level: LevelFilter, save_log: bool) -> Result<(), Box<dyn Error>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if save_log {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        loggers.push(WriteLogger::new(level, Config::default(), File::create(&name)?));
    }
    if CombinedLogger::init(loggers).is_ok() {
        info!("logger initialized with level {}", level);
    }
    Ok(())
}

/// Long format: one `method,x,y` record per sample point
pub fn save_samples_to_csv(
    samples: &[&SolutionSample],
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(["method", "x", "y"])?;
    for sample in samples {
        let method = sample.method.to_string();
        for (x, y) in sample.points() {
            writer.write_record([method.clone(), x.to_string(), y.to_string()])?;
        }
    }
    writer.flush()?;
    Ok(())
}
