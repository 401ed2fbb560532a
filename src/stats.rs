//! Per-epoch summary shown in the side panel.

use crate::data::{epoch_first_height, epoch_last_height, BlockRecord, ParseReport};
use crate::picking::tooltip::{format_date, format_duration, group_thousands};

#[derive(Debug, Clone, PartialEq)]
pub struct EpochStats {
    pub epoch: u64,
    pub first_height: u64,
    pub last_height: u64,
    pub block_count: usize,
    /// Timestamp of the first / last record
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    /// Mean gap over all records, the first one counting as 0
    pub average_gap: f64,
    /// Shortest / longest positive gap, first record excluded (0 if none)
    pub min_gap: i64,
    pub max_gap: i64,
    /// Fields replaced by fallbacks while decoding
    pub fallbacks: usize,
}

impl EpochStats {
    pub fn compute(epoch: u64, records: &[BlockRecord], report: &ParseReport) -> Self {
        let gaps = records
            .iter()
            .enumerate()
            .map(|(i, r)| if i == 0 { 0 } else { r.time_difference });

        // i128 holds 2016 gaps of any i64 value
        let sum: i128 = gaps.clone().map(i128::from).sum();
        let average_gap = if records.is_empty() {
            0.0
        } else {
            sum as f64 / records.len() as f64
        };

        let positive = gaps.skip(1).filter(|&g| g > 0);
        let min_gap = positive.clone().min().unwrap_or(0);
        let max_gap = positive.max().unwrap_or(0);

        Self {
            epoch,
            first_height: epoch_first_height(epoch),
            last_height: epoch_last_height(epoch),
            block_count: records.len(),
            start_time: records.first().map(|r| r.time),
            end_time: records.last().map(|r| r.time),
            average_gap,
            min_gap,
            max_gap,
            fallbacks: report.fallbacks(),
        }
    }

    /// Label/value rows for the panel.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let date = |t: Option<i64>| t.map(format_date).unwrap_or_else(|| "-".to_string());
        let mut rows = vec![
            ("Adjustment", self.epoch.to_string()),
            (
                "Blocks",
                format!(
                    "{} - {}",
                    group_thousands(self.first_height),
                    group_thousands(self.last_height)
                ),
            ),
            ("Start", date(self.start_time)),
            ("End", date(self.end_time)),
            ("Average block time", format_duration(self.average_gap.round() as i64)),
            ("Fastest block", format_duration(self.min_gap)),
            ("Slowest block", format_duration(self.max_gap)),
        ];
        if self.fallbacks > 0 {
            rows.push(("Missing fields", self.fallbacks.to_string()));
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(time: i64, td: i64) -> BlockRecord {
        BlockRecord {
            height: 0,
            time,
            n_tx: 1,
            size: 216,
            time_difference: td,
        }
    }

    #[test]
    fn summary_of_a_small_epoch() {
        let records = vec![rec(1_231_006_505, 9999), rec(1_231_007_105, 600), rec(1_231_007_000, -105), rec(1_231_008_200, 1200)];
        let stats = EpochStats::compute(0, &records, &ParseReport::default());
        assert_eq!(stats.first_height, 0);
        assert_eq!(stats.last_height, 2015);
        // first gap forced to 0, negative gap kept in the mean
        assert!((stats.average_gap - (600.0 - 105.0 + 1200.0) / 4.0).abs() < 1e-12);
        assert_eq!(stats.min_gap, 600);
        assert_eq!(stats.max_gap, 1200);
        assert_eq!(stats.start_time, Some(1_231_006_505));
        assert_eq!(stats.end_time, Some(1_231_008_200));
    }

    #[test]
    fn extreme_gaps_do_not_overflow() {
        let records = vec![rec(0, 600), rec(600, i64::MAX), rec(1200, i64::MAX), rec(1800, 600)];
        let stats = EpochStats::compute(1, &records, &ParseReport::default());
        let expected = (2.0 * i64::MAX as f64 + 600.0) / 4.0;
        assert!((stats.average_gap - expected).abs() / expected < 1e-12);
        assert_eq!(stats.max_gap, i64::MAX);
        assert_eq!(stats.min_gap, 600);
        assert!(!stats.rows().is_empty());
    }

    #[test]
    fn no_positive_gaps() {
        let records = vec![rec(0, 600), rec(0, 0), rec(0, -5)];
        let stats = EpochStats::compute(3, &records, &ParseReport::default());
        assert_eq!((stats.min_gap, stats.max_gap), (0, 0));
    }

    #[test]
    fn empty_epoch() {
        let stats = EpochStats::compute(5, &[], &ParseReport::default());
        assert_eq!(stats.block_count, 0);
        assert_eq!(stats.average_gap, 0.0);
        assert_eq!(stats.start_time, None);
        assert_eq!(stats.rows()[2], ("Start", "-".to_string()));
    }

    #[test]
    fn rows_render() {
        let records = vec![rec(1_231_006_505, 0), rec(1_231_007_105, 600)];
        let report = ParseReport {
            records: 2,
            missing_size: 2,
            ..ParseReport::default()
        };
        let rows = EpochStats::compute(450, &records, &report).rows();
        assert_eq!(rows[1], ("Blocks", "907,200 - 909,215".to_string()));
        assert_eq!(rows[2], ("Start", "Jan 3, 2009".to_string()));
        assert_eq!(rows[4], ("Average block time", "5m 0s".to_string()));
        assert_eq!(rows.last(), Some(&("Missing fields", "2".to_string())));
    }
}
