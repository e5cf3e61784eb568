//! Balance projection and runway derivation.

/// Integrates the combined daily forecast onto the starting balance:
/// `out[i] = current_balance + Σ combined[..=i]`.
pub fn project_balance(current_balance: f64, combined: &[f64]) -> Vec<f64> {
    combined
        .iter()
        .scan(current_balance, |balance, delta| {
            *balance += delta;
            Some(*balance)
        })
        .collect()
}

/// 1-based index of the first day the cumulative balance goes negative,
/// `None` if it never does within the horizon.
///
/// Runway answers "how many days until the first shortfall": the first
/// crossing governs even when the balance recovers afterwards.
pub fn runway_days(cumulative: &[f64]) -> Option<u32> {
    cumulative
        .iter()
        .position(|&balance| balance < 0.0)
        .map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_a_running_sum() {
        let cumulative = project_balance(100.0, &[10.0, -30.0, 5.0]);
        assert_eq!(cumulative, vec![110.0, 80.0, 85.0]);
    }

    #[test]
    fn runway_is_one_based_first_crossing() {
        // Crosses at 0-based index 2, recovers afterwards.
        let cumulative = [50.0, 10.0, -5.0, 20.0, -40.0];
        assert_eq!(runway_days(&cumulative), Some(3));
    }

    #[test]
    fn runway_none_when_balance_stays_non_negative() {
        assert_eq!(runway_days(&[5.0, 0.0, 3.0]), None);
        assert_eq!(runway_days(&[]), None);
    }

    #[test]
    fn negative_start_has_runway_one() {
        let cumulative = project_balance(-1.0, &[0.0, 0.0]);
        assert_eq!(runway_days(&cumulative), Some(1));
    }
}
