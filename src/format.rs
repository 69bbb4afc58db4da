// Presentation - monetary magnitude formatting
//
// Stored and aggregated amounts keep full precision; only the outward-facing
// representation is reduced to "<n.n>M" / "<n.n>B".

const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;

/// Render a monetary value in millions, or in billions from 1B upwards.
///
/// Values under one million still render in M ("0.0M" for 500).
pub fn format_magnitude(value: f64) -> String {
    if value >= BILLION {
        format!("{:.1}B", value / BILLION)
    } else {
        format!("{:.1}M", value / MILLION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millions() {
        assert_eq!(format_magnitude(500_000.0), "0.5M");
        assert_eq!(format_magnitude(1_000_000.0), "1.0M");
        assert_eq!(format_magnitude(15_000_000.0), "15.0M");
        assert_eq!(format_magnitude(250_000_000.0), "250.0M");
    }

    #[test]
    fn test_below_one_million_stays_in_millions() {
        assert_eq!(format_magnitude(500.0), "0.0M");
        assert_eq!(format_magnitude(0.0), "0.0M");
    }

    #[test]
    fn test_billion_threshold_is_inclusive() {
        // 999,999,999 rounds to 1000.0 but stays below the B threshold
        assert_eq!(format_magnitude(999_999_999.0), "1000.0M");
        assert_eq!(format_magnitude(1_000_000_000.0), "1.0B");
        assert_eq!(format_magnitude(2_500_000_000.0), "2.5B");
    }
}
