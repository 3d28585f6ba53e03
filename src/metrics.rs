//! Throughput measurement: MPixel/s, logged at the end of a `tile()` call.

use std::time::Duration;

/// Megapixels processed per second, given the pyramid's full-resolution
/// pixel count and the wall-clock duration of the whole `tile()` call.
pub fn mpixels_per_second(width: u32, height: u32, elapsed: Duration) -> f64 {
    let pixels = width as f64 * height as f64;
    let seconds = elapsed.as_secs_f64();
    if seconds <= 0.0 {
        return f64::INFINITY;
    }
    pixels / 1_000_000.0 / seconds
}
