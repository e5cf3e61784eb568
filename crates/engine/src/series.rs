//! History aggregation: raw cash records into a daily net series.

use chrono::{Days, NaiveDate};

/// The engine-boundary view of one transaction record.
///
/// Only the calendar date and the amount are consumed by the forecaster.
/// A record whose stored date is missing or unparsable surfaces here with
/// `date: None` and is skipped silently during aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CashRecord {
    pub date: Option<NaiveDate>,
    pub amount_minor: i64,
}

/// One entry per calendar day over `[today - lookback, today]`, net of
/// inflows minus outflows, zero-filled for days with no records.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyNetSeries {
    /// Strictly ascending, no gaps, `lookback + 1` entries.
    pub dates: Vec<NaiveDate>,
    /// Same length as `dates`, in minor units.
    pub net: Vec<f64>,
}

impl DailyNetSeries {
    /// Aggregates inflow and outflow records into a zero-filled daily series.
    ///
    /// Records outside the window or without a date are ignored; inflows add
    /// to their day's bucket, outflows subtract.
    pub fn build(
        today: NaiveDate,
        lookback_days: u32,
        inflows: &[CashRecord],
        outflows: &[CashRecord],
    ) -> Self {
        let start = today - Days::new(u64::from(lookback_days));
        let len = lookback_days as usize + 1;

        let dates: Vec<NaiveDate> = (0..len).map(|i| start + Days::new(i as u64)).collect();
        let mut net = vec![0.0; len];

        let mut bucket = |record: &CashRecord, sign: f64| {
            let Some(date) = record.date else { return };
            if date < start || date > today {
                return;
            }
            let index = date.signed_duration_since(start).num_days() as usize;
            net[index] += sign * record.amount_minor as f64;
        };

        for record in inflows {
            bucket(record, 1.0);
        }
        for record in outflows {
            bucket(record, -1.0);
        }

        Self { dates, net }
    }

    pub fn len(&self) -> usize {
        self.net.len()
    }

    pub fn is_empty(&self) -> bool {
        self.net.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn record(day: &str, amount_minor: i64) -> CashRecord {
        CashRecord {
            date: Some(date(day)),
            amount_minor,
        }
    }

    #[test]
    fn window_is_dense_and_zero_filled() {
        let series = DailyNetSeries::build(date("2026-03-10"), 4, &[], &[]);

        assert_eq!(series.len(), 5);
        assert_eq!(series.dates.first(), Some(&date("2026-03-06")));
        assert_eq!(series.dates.last(), Some(&date("2026-03-10")));
        assert!(series.dates.windows(2).all(|w| w[1] == w[0] + Days::new(1)));
        assert!(series.net.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn inflows_add_and_outflows_subtract() {
        let inflows = [record("2026-03-08", 500), record("2026-03-08", 250)];
        let outflows = [record("2026-03-08", 100), record("2026-03-10", 40)];

        let series = DailyNetSeries::build(date("2026-03-10"), 4, &inflows, &outflows);

        assert_eq!(series.net, vec![0.0, 0.0, 650.0, 0.0, -40.0]);
    }

    #[test]
    fn dateless_and_out_of_window_records_are_skipped() {
        let inflows = [
            CashRecord {
                date: None,
                amount_minor: 9_999,
            },
            record("2026-02-01", 9_999),
            record("2026-03-11", 9_999),
            record("2026-03-09", 10),
        ];

        let series = DailyNetSeries::build(date("2026-03-10"), 4, &inflows, &[]);

        assert_eq!(series.net.iter().sum::<f64>(), 10.0);
    }
}
