/// Get the current time in seconds since the UNIX epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Get the current time in seconds since the UNIX epoch
///
/// `performance.now()` counts from page load, so it is offset by the page's
/// `timeOrigin` (epoch milliseconds).
#[cfg(target_arch = "wasm32")]
pub fn current_time_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| (perf.time_origin() + perf.now()) / 1000.0)
        .unwrap_or(0.0)
}

/// Get a timestamp in whole seconds since the UNIX epoch
pub fn timestamp_secs() -> u64 {
    current_time_secs() as u64
}

/// Seconds elapsed from `start` to `now`, never negative.
pub fn elapsed_secs(start: f64, now: f64) -> f64 {
    let elapsed = now - start;
    if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_never_negative() {
        assert_eq!(elapsed_secs(10.0, 12.5), 2.5);
        assert_eq!(elapsed_secs(10.0, 9.0), 0.0);
        assert_eq!(elapsed_secs(10.0, f64::NAN), 0.0);
    }

    #[test]
    fn timestamp_is_epoch_based() {
        // 2020-01-01T00:00:00Z
        assert!(timestamp_secs() > 1_577_836_800);
    }
}
