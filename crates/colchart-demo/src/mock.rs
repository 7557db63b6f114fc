//! Mock play-count engine for demo/development

use std::time::Duration;

use chrono::Utc;
use colchart_core::{Accumulator, sort_by_display};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    BritishColumbia,
    Manitoba,
    NovaScotia,
    Ontario,
    Quebec,
}

impl Province {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BritishColumbia => "British Columbia",
            Self::Manitoba => "Manitoba",
            Self::NovaScotia => "Nova Scotia",
            Self::Ontario => "Ontario",
            Self::Quebec => "Quebec",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayCount {
    pub artist: String,
    pub count: f64,
    pub province: Province,
    /// Milliseconds since the epoch
    pub updated_at: i64,
}

impl PlayCount {
    fn new(artist: &str, count: f64, province: Province) -> Self {
        Self {
            artist: artist.to_string(),
            count,
            province,
            updated_at: Utc::now().timestamp_millis(),
        }
    }

    /// Sort key ignoring a leading "The "
    pub fn sort_name(&self) -> &str {
        self.artist.strip_prefix("The ").unwrap_or(&self.artist)
    }
}

fn catalogue() -> Vec<PlayCount> {
    use Province::*;
    vec![
        PlayCount::new("Hawksley Workman", 31910.0, Ontario),
        PlayCount::new("Buck 65", 21192.0, NovaScotia),
        PlayCount::new("The Weakerthans", 13495.0, Manitoba),
        PlayCount::new("Metric", 10067.0, Ontario),
        PlayCount::new("The New Pornographers", 6201.0, BritishColumbia),
        PlayCount::new("Bike For Three!", 6022.0, NovaScotia),
        PlayCount::new("Mounties", 3097.0, Ontario),
        PlayCount::new("Limblifter", 2800.0, BritishColumbia),
        PlayCount::new("Arcade Fire", 2172.0, Quebec),
    ]
}

/// Pacing and length of the mock feed
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Delay between releases
    pub interval: Duration,
    /// Extra rounds of jittered counts after the catalogue is released
    pub live_rounds: usize,
    /// Largest relative change applied per live round
    pub volatility: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
            live_rounds: 4,
            volatility: 0.05,
        }
    }
}

struct MockPlays {
    pending: std::vec::IntoIter<PlayCount>,
    accumulated: Accumulator<PlayCount>,
    volatility: f64,
}

impl MockPlays {
    fn new(volatility: f64) -> Self {
        Self {
            pending: catalogue().into_iter(),
            accumulated: Accumulator::new(),
            volatility,
        }
    }

    /// Release the next catalogue entry; `None` once everything is out
    fn release(&mut self) -> Option<Vec<PlayCount>> {
        let next = self.pending.next()?;
        self.accumulated.push([next]);
        Some(self.batch())
    }

    /// Nudge every count by a random amount within the volatility
    fn jitter(&mut self) -> Vec<PlayCount> {
        let mut rng = rand::thread_rng();
        let now = Utc::now().timestamp_millis();
        let mut records: Vec<PlayCount> = self.accumulated.records().to_vec();
        for record in &mut records {
            let change = (rng.r#gen::<f64>() - 0.5) * 2.0 * self.volatility;
            record.count = (record.count * (1.0 + change)).round().max(0.0);
            record.updated_at = now;
        }
        self.accumulated.clear();
        self.accumulated.push(records);
        self.batch()
    }

    fn batch(&self) -> Vec<PlayCount> {
        sort_by_display(self.accumulated.records(), |p: &PlayCount| p.sort_name().to_string())
    }
}

/// Publish accumulated, sorted batches until the catalogue and the live
/// rounds are exhausted. Dropping the sender afterwards closes the channel.
pub async fn run_mock_engine(tx: broadcast::Sender<Vec<PlayCount>>, config: MockConfig) {
    tracing::info!("Starting mock play-count engine");

    let mut plays = MockPlays::new(config.volatility);
    let mut ticker = interval(config.interval);
    let mut live_rounds = 0;

    loop {
        ticker.tick().await;

        let batch = match plays.release() {
            Some(batch) => batch,
            None if live_rounds < config.live_rounds => {
                live_rounds += 1;
                plays.jitter()
            }
            None => break,
        };

        tracing::debug!(records = batch.len(), "publishing mock batch");
        if tx.send(batch).is_err() {
            tracing::warn!("No receivers left for mock batches");
            break;
        }
    }

    tracing::info!("Mock play-count engine finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_accumulates_sorted() {
        let mut plays = MockPlays::new(0.0);
        plays.release();
        plays.release();
        let batch = plays.release().unwrap();

        let artists: Vec<_> = batch.iter().map(|p| p.artist.as_str()).collect();
        assert_eq!(artists, vec!["Buck 65", "Hawksley Workman", "The Weakerthans"]);
    }

    #[test]
    fn test_release_ends_after_catalogue() {
        let mut plays = MockPlays::new(0.0);
        let released = std::iter::from_fn(|| plays.release()).count();
        assert_eq!(released, 9);
        assert_eq!(plays.accumulated.len(), 9);
    }

    #[test]
    fn test_jitter_keeps_records() {
        let mut plays = MockPlays::new(0.1);
        while plays.release().is_some() {}
        let batch = plays.jitter();

        assert_eq!(batch.len(), 9);
        assert!(batch.iter().all(|p| p.count >= 0.0));
        let hawksley = batch.iter().find(|p| p.artist == "Hawksley Workman").unwrap();
        assert!((hawksley.count - 31910.0).abs() <= 31910.0 * 0.1 + 1.0);
    }

    #[test]
    fn test_sort_name() {
        let play = PlayCount::new("The Weakerthans", 1.0, Province::Manitoba);
        assert_eq!(play.sort_name(), "Weakerthans");
        assert_eq!(Province::NovaScotia.label(), "Nova Scotia");
    }

    #[tokio::test]
    async fn test_engine_closes_channel() {
        let (tx, mut rx) = broadcast::channel(32);
        let config = MockConfig {
            interval: Duration::from_millis(1),
            live_rounds: 1,
            volatility: 0.0,
        };
        tokio::spawn(run_mock_engine(tx, config));

        let mut batches = 0;
        while rx.recv().await.is_ok() {
            batches += 1;
        }
        assert_eq!(batches, 10);
    }
}
