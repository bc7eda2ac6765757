use crate::{MtfError, Timeframe};

/// Parse a human-readable timeframe token into its duration in seconds.
///
/// The token is `<positive-integer><unit>` with unit one of `s`, `m`, `h`,
/// `d`, `w`, `M` (30 days) or `y` (365 days).
///
/// ```
/// use mtf_core::parse_timeframe;
/// assert_eq!(parse_timeframe("3h").unwrap(), 10_800);
/// assert_eq!(parse_timeframe("15m").unwrap(), 900);
/// assert!(parse_timeframe("1g").is_err());
/// ```
///
/// # Errors
/// - `InvalidTimeframeFormat` if the token is empty or its amount is not a
///   positive integer.
/// - `UnsupportedTimeframeUnit` if the unit is not in the table.
pub fn parse_timeframe(token: &str) -> Result<i64, MtfError> {
    token.parse::<Timeframe>().map(Timeframe::duration_seconds)
}

/// Same as [`parse_timeframe`]; named for symmetry with [`timeframe_to_minutes`].
///
/// # Errors
/// See [`parse_timeframe`].
pub fn timeframe_to_seconds(token: &str) -> Result<i64, MtfError> {
    parse_timeframe(token)
}

/// Duration of a timeframe token in whole minutes.
///
/// Floors, so sub-minute timeframes (`"30s"`) map to `0`.
///
/// # Errors
/// See [`parse_timeframe`].
pub fn timeframe_to_minutes(token: &str) -> Result<i64, MtfError> {
    parse_timeframe(token).map(|secs| secs / 60)
}
