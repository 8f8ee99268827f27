use chrono::Local;

use super::Toolbox;

/// `YYYY-MM-DD HH:MM:SS`
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Toolbox {
    /// Current local date and time.
    pub fn date_time(&self) -> String {
        Local::now().format(DATE_TIME_FORMAT).to_string()
    }
}
