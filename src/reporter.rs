use std::time::{Duration, Instant};

use num_format::ToFormattedString;

use crate::config::user_locale;

/// Simple methods to track time and report progress after a while.
pub struct Reporter {
    total: u64,
    start_time: Instant,
    last_progress_time: Instant,
    report_progress_after: Duration,
}

impl Reporter {
    pub fn new_default(total: u64) -> Self {
        Self {
            total,
            start_time: Instant::now(),
            last_progress_time: Instant::now(),
            report_progress_after: Duration::new(2, 0),
        }
    }

    pub fn is_due_progress(&self) -> bool {
        self.last_progress_time.elapsed() > self.report_progress_after
    }

    /// Reports progress as x of y (for percentage). This should be called when
    /// [Self::is_due_progress] returns true, calling it every time would be inefficient.
    pub fn report(&mut self, processed: u64) -> String {
        self.last_progress_time = Instant::now();
        let locale = user_locale();
        let percent = if self.total > 0 {
            processed as f64 * 100.0 / self.total as f64
        } else {
            0.0
        };

        format!(
            "{} of {} machines ({percent:.1}%), elapsed {}",
            processed.to_formatted_string(&locale),
            self.total.to_formatted_string(&locale),
            format_duration_hhmmss_ms(self.start_time.elapsed())
        )
    }
}

/// Formats a duration as hh:mm:ss.mmm, hours omitted when 0.
pub fn format_duration_hhmmss_ms(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{minutes}:{seconds:02}.{millis:03}")
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn reporter_format_duration() {
        assert_eq!(
            "0:01.500",
            format_duration_hhmmss_ms(Duration::from_millis(1500))
        );
        assert_eq!(
            "1:01:05.000",
            format_duration_hhmmss_ms(Duration::from_secs(3665))
        );
    }

    #[test]
    fn reporter_report_contains_percentage() {
        let mut reporter = Reporter::new_default(1000);
        let s = reporter.report(500);
        assert!(s.contains("50.0%"));
        assert!(s.contains("500 of 1,000"));
    }
}
