use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One major peak-to-trough-to-recovery decline of the equity curve.
///
/// An episode stays open (`recovery_date = None`) when the window ends
/// before equity revisits the peak that started it. Day counts are
/// calendar-day differences between the recorded dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownEpisode {
    /// Date of the peak the decline started from.
    pub start_date: NaiveDate,
    pub trough_date: NaiveDate,
    pub recovery_date: Option<NaiveDate>,
    /// Trough depth relative to the peak, in percent, negative.
    pub depth_pct: f64,
    pub days_to_trough: i64,
    pub days_to_recovery: Option<i64>,
    pub total_duration_days: i64,
}

struct OpenEpisode {
    start_date: NaiveDate,
    peak: f64,
    trough: f64,
    trough_date: NaiveDate,
}

impl OpenEpisode {
    fn close(&self, recovery: Option<NaiveDate>, end_date: NaiveDate) -> DrawdownEpisode {
        // Scale before dividing so round-number depths land exactly on
        // the threshold boundary.
        let depth_pct =
            if self.peak > 0.0 { (self.trough - self.peak) * 100.0 / self.peak } else { 0.0 };
        DrawdownEpisode {
            start_date: self.start_date,
            trough_date: self.trough_date,
            recovery_date: recovery,
            depth_pct,
            days_to_trough: (self.trough_date - self.start_date).num_days(),
            days_to_recovery: recovery.map(|r| (r - self.trough_date).num_days()),
            total_duration_days: (end_date - self.start_date).num_days(),
        }
    }
}

/// Scans a dated equity curve (absolute account values) for drawdown
/// episodes whose trough is strictly deeper than `min_depth_pct`
/// (e.g. -10.0 keeps only declines worse than -10%).
///
/// An episode opens when equity falls strictly below the running peak;
/// a tie at the peak never opens one. It closes when equity returns to
/// or exceeds that peak, or stays open if the input ends first. Output
/// is sorted worst depth first.
pub fn detect_episodes(equity: &[(NaiveDate, f64)], min_depth_pct: f64) -> Vec<DrawdownEpisode> {
    if equity.len() < 2 {
        return Vec::new();
    }

    let mut episodes = Vec::new();
    let (mut peak_date, mut peak) = equity[0];
    let mut open: Option<OpenEpisode> = None;

    for &(date, value) in &equity[1..] {
        match open.as_mut() {
            None => {
                if value < peak {
                    open = Some(OpenEpisode {
                        start_date: peak_date,
                        peak,
                        trough: value,
                        trough_date: date,
                    });
                } else {
                    peak = value;
                    peak_date = date;
                }
            }
            Some(episode) => {
                if value < episode.trough {
                    episode.trough = value;
                    episode.trough_date = date;
                }
                if value >= episode.peak {
                    episodes.push(episode.close(Some(date), date));
                    open = None;
                    peak = value;
                    peak_date = date;
                }
            }
        }
    }
    if let Some(episode) = open {
        episodes.push(episode.close(None, equity.last().map(|&(d, _)| d).unwrap_or(peak_date)));
    }

    episodes.retain(|e| e.depth_pct < min_depth_pct);
    episodes.sort_by(|a, b| a.depth_pct.partial_cmp(&b.depth_pct).unwrap_or(std::cmp::Ordering::Equal));
    trace!(count = episodes.len(), threshold = min_depth_pct, "detected drawdown episodes");
    episodes
}
