use log::info;
use std::time::{Duration, Instant};

/// human readable (unit, value) pair for a duration
pub fn elapsed_time(elapsed: Duration) -> (String, f64) {
    let time = elapsed.as_micros();
    if time < 1000 {
        (" us".to_string(), time as f64)
    } else if time < 1_000_000 {
        (" ms".to_string(), time as f64 / 1000.0)
    } else if time < 60_000_000 {
        (" s".to_string(), elapsed.as_secs_f64())
    } else {
        (" min".to_string(), elapsed.as_secs_f64() / 60.0)
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let (unit, value) = elapsed_time(elapsed);
    format!("{:.3}{}", value, unit)
}

/// runs `f` and measures the wall clock time it took
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let res = f();
    let elapsed = start.elapsed();
    info!("{} finished in {}", label, format_elapsed(elapsed));
    (res, elapsed)
}
