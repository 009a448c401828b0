/// `true` when `(prev_a, prev_b)` had `a <= b` and `(cur_a, cur_b)` has
/// `a > b` — a classic two-series crossover, with `None` treated as "not
/// crossed" rather than panicking (handles not-yet-valid warm-up reads).
pub fn crossed_above(prev_a: Option<f64>, prev_b: Option<f64>, cur_a: Option<f64>, cur_b: Option<f64>) -> bool {
    match (prev_a, prev_b, cur_a, cur_b) {
        (Some(pa), Some(pb), Some(ca), Some(cb)) => pa <= pb && ca > cb,
        _ => false,
    }
}

pub fn crossed_below(prev_a: Option<f64>, prev_b: Option<f64>, cur_a: Option<f64>, cur_b: Option<f64>) -> bool {
    crossed_above(prev_b, prev_a, cur_b, cur_a)
}

/// Deserialize a JSON params override, falling back to `T::default()` for
/// `Value::Null` (the common "no overrides supplied" case).
pub fn parse_params<T>(params: &serde_json::Value) -> Result<T, crate::error::StrategyError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params.clone())
        .map_err(|e| crate::error::StrategyError::InvalidParams(e.to_string()))
}
