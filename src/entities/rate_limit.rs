/// Rate limit state reported alongside an api response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    remaining: f64,
    reset_after: f64,
}

/// Missing, empty or unparsable header values count as zero.
pub fn from_headers(remaining: Option<&str>, reset_after: Option<&str>) -> RateLimit {
    RateLimit {
        remaining: parse_or_zero(remaining),
        reset_after: parse_or_zero(reset_after),
    }
}

fn parse_or_zero(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

impl RateLimit {
    /// Seconds until the bucket refills.
    pub fn reset_after(&self) -> f64 {
        self.reset_after
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0.0
    }
}
