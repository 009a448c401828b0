use std::fmt;

/// A resampling target, as accepted by the `--interval` flag: `5m`, `15m`,
/// `25m`, `75m`, `125m`, `1h`, `4h`, `1d`, `1w`, `1M`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interval {
    Minutes(u32),
    Hours(u32),
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    /// Bucket width in minutes for the intraday variants; `None` for the
    /// calendar-based ones, which bucket by date rather than fixed duration.
    pub fn intraday_minutes(&self) -> Option<u32> {
        match self {
            Interval::Minutes(n) => Some(*n),
            Interval::Hours(n) => Some(n * 60),
            Interval::Daily | Interval::Weekly | Interval::Monthly => None,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Minutes(n) => write!(f, "{n}m"),
            Interval::Hours(n) => write!(f, "{n}h"),
            Interval::Daily => write!(f, "1d"),
            Interval::Weekly => write!(f, "1w"),
            Interval::Monthly => write!(f, "1M"),
        }
    }
}

/// Rejected by `parse` when the flag text doesn't match a known unit or
/// carries a zero/non-numeric count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalParseError(pub String);

impl fmt::Display for IntervalParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid interval '{}'", self.0)
    }
}

impl std::error::Error for IntervalParseError {}

pub fn parse(raw: &str) -> Result<Interval, IntervalParseError> {
    let err = || IntervalParseError(raw.to_string());

    if raw == "1M" {
        return Ok(Interval::Monthly);
    }
    if raw == "1w" {
        return Ok(Interval::Weekly);
    }

    let split_at = raw.find(|c: char| !c.is_ascii_digit()).ok_or_else(err)?;
    let (digits, unit) = raw.split_at(split_at);
    let count: u32 = digits.parse().map_err(|_| err())?;
    if count == 0 {
        return Err(err());
    }

    match unit {
        "m" => Ok(Interval::Minutes(count)),
        "h" => Ok(Interval::Hours(count)),
        "d" if count == 1 => Ok(Interval::Daily),
        _ => Err(err()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_documented_interval() {
        assert_eq!(parse("5m").unwrap(), Interval::Minutes(5));
        assert_eq!(parse("15m").unwrap(), Interval::Minutes(15));
        assert_eq!(parse("25m").unwrap(), Interval::Minutes(25));
        assert_eq!(parse("75m").unwrap(), Interval::Minutes(75));
        assert_eq!(parse("125m").unwrap(), Interval::Minutes(125));
        assert_eq!(parse("1h").unwrap(), Interval::Hours(1));
        assert_eq!(parse("4h").unwrap(), Interval::Hours(4));
        assert_eq!(parse("1d").unwrap(), Interval::Daily);
        assert_eq!(parse("1w").unwrap(), Interval::Weekly);
        assert_eq!(parse("1M").unwrap(), Interval::Monthly);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("5x").is_err());
        assert!(parse("0m").is_err());
        assert!(parse("m5").is_err());
        assert!(parse("").is_err());
    }
}
