//! Millisecond conversion for timeout values
//!
//! The wire format carries timeouts as 32-bit milliseconds, so anything above
//! 2^32 - 1 ms (about 49.7 days) is rejected instead of being truncated.

use std::time::Duration;

use super::error::ValidationError;

/// Largest timeout the wire format can carry, in milliseconds
pub const MAX_DURATION_MILLIS: u64 = u32::MAX as u64;

/// Convert a duration into whole milliseconds, failing if it overflows `u32`
pub fn duration_to_millis(field: &'static str, duration: Duration) -> Result<u32, ValidationError> {
    let millis = duration.as_millis();
    u32::try_from(millis).map_err(|_| ValidationError::DurationOutOfRange {
        field,
        millis: millis as i128,
    })
}

/// Build a duration from signed milliseconds, as supplied by CLI flags or config files
///
/// Negative values and values above [`MAX_DURATION_MILLIS`] are range errors.
pub fn signed_millis_to_duration(
    field: &'static str,
    millis: i64,
) -> Result<Duration, ValidationError> {
    if millis < 0 || millis as u64 > MAX_DURATION_MILLIS {
        return Err(ValidationError::DurationOutOfRange {
            field,
            millis: millis as i128,
        });
    }
    Ok(Duration::from_millis(millis as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_values_round_trip() {
        for ms in [0u64, 1, 250, 3_000, MAX_DURATION_MILLIS] {
            let millis = duration_to_millis("request timeout", Duration::from_millis(ms)).unwrap();
            assert_eq!(millis as u64, ms);
        }
    }

    #[test]
    fn test_sub_millisecond_part_is_truncated() {
        let d = Duration::from_micros(1_999);
        assert_eq!(duration_to_millis("request timeout", d).unwrap(), 1);
    }

    #[test]
    fn test_above_ceiling_fails() {
        let d = Duration::from_millis(MAX_DURATION_MILLIS + 1);
        let err = duration_to_millis("connection timeout", d).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DurationOutOfRange {
                field: "connection timeout",
                millis: (MAX_DURATION_MILLIS + 1) as i128,
            }
        );
    }

    #[test]
    fn test_signed_millis() {
        assert_eq!(
            signed_millis_to_duration("request timeout", 1_500).unwrap(),
            Duration::from_millis(1_500)
        );
        assert!(signed_millis_to_duration("request timeout", -1).is_err());
        assert!(signed_millis_to_duration("request timeout", MAX_DURATION_MILLIS as i64 + 1).is_err());
        assert!(signed_millis_to_duration("request timeout", MAX_DURATION_MILLIS as i64).is_ok());
    }
}
