/// Parsed result of one successful weather fetch.
///
/// Built only from a well-formed provider response and never patched field by
/// field: a new search replaces the whole value or clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature_celsius: i64,
    pub conditions: String,
    pub humidity_percent: u8,
    pub wind_speed_mps: f64,
}

impl WeatherSnapshot {
    /// Build a snapshot from raw provider values, rounding the temperature.
    pub fn from_raw(
        temperature_c: f64,
        conditions: impl Into<String>,
        humidity_percent: u8,
        wind_speed_mps: f64,
    ) -> Self {
        Self {
            temperature_celsius: round_half_up(temperature_c),
            conditions: conditions.into(),
            humidity_percent,
            wind_speed_mps,
        }
    }
}

/// Round to the nearest integer, ties going towards positive infinity.
///
/// `15.5 -> 16`, `-2.5 -> -2`. Compares the exact fractional part; `value + 0.5`
/// is itself rounded near ties and above 2^52.
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// Trimmed, non-empty city name, or `None` for blank input.
///
/// Strips Unicode whitespace and the byte order mark `U+FEFF`.
pub fn normalize_query(raw: &str) -> Option<&str> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    (!trimmed.is_empty()).then_some(trimmed)
}
