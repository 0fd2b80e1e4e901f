//! Pure technical indicator math
//!
//! Stateless free functions over price/volume slices. Rolling indicators
//! return series aligned with their input; entries before the first full
//! window are `NAN`, and callers are expected to check finiteness and
//! abstain. Nothing here allocates shared state or panics on short input.

/// Exponential moving average, span-style smoothing (alpha = 2 / (period + 1)),
/// seeded from the first value.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return Vec::new();
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Wilder-style exponential smoothing (alpha = 1 / period).
fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return Vec::new();
    }
    let alpha = 1.0 / period as f64;
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Relative Strength Index over simple rolling means of gains and losses.
///
/// The first `period` entries are `NAN`.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut out = vec![f64::NAN; n];
    if n <= period || period == 0 {
        return out;
    }
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            gains[i] = delta;
        } else {
            losses[i] = -delta;
        }
    }
    for i in period..n {
        let up: f64 = gains[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
        let down: f64 = losses[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
        let rs = up / (down + 1e-12);
        out[i] = 100.0 - 100.0 / (1.0 + rs);
    }
    out
}

/// Wilder's Average True Range.
pub fn atr_wilder(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len().min(high.len()).min(low.len());
    if n == 0 {
        return Vec::new();
    }
    let mut tr = Vec::with_capacity(n);
    tr.push(high[0] - low[0]);
    for i in 1..n {
        let hl = (high[i] - low[i]).abs();
        let hc = (high[i] - close[i - 1]).abs();
        let lc = (low[i] - close[i - 1]).abs();
        tr.push(hl.max(hc).max(lc));
    }
    wilder_smooth(&tr, period)
}

/// Average Directional Index (trend strength, 0-100).
pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len().min(high.len()).min(low.len());
    if n == 0 {
        return Vec::new();
    }
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }
    let atr = atr_wilder(high, low, close, period);
    let plus_sm = wilder_smooth(&plus_dm, period);
    let minus_sm = wilder_smooth(&minus_dm, period);

    let mut dx = Vec::with_capacity(n);
    for i in 0..n {
        let plus_di = 100.0 * plus_sm[i] / (atr[i] + 1e-12);
        let minus_di = 100.0 * minus_sm[i] / (atr[i] + 1e-12);
        dx.push(100.0 * (plus_di - minus_di).abs() / (plus_di + minus_di + 1e-12));
    }
    wilder_smooth(&dx, period)
}

/// Bollinger band values for the most recent bar.
#[derive(Debug, Clone, Copy)]
pub struct Bollinger {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    /// (upper - lower) / middle
    pub bandwidth: f64,
}

/// Bollinger bands over the trailing `period` closes; `None` when the window
/// is not yet full.
pub fn bollinger_last(closes: &[f64], period: usize, k: f64) -> Option<Bollinger> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    let var = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / period as f64;
    let std = var.sqrt();
    let upper = mean + k * std;
    let lower = mean - k * std;
    Some(Bollinger {
        middle: mean,
        upper,
        lower,
        bandwidth: (upper - lower) / (mean + 1e-12),
    })
}

/// Donchian channel over the `window` bars preceding the latest bar.
///
/// Strategies always test the current close against the channel as it stood
/// one bar earlier, so the latest bar is excluded.
pub fn donchian_prev(high: &[f64], low: &[f64], window: usize) -> Option<(f64, f64)> {
    let n = high.len().min(low.len());
    if window == 0 || n < window + 1 {
        return None;
    }
    let hi = &high[n - 1 - window..n - 1];
    let lo = &low[n - 1 - window..n - 1];
    let upper = hi.iter().cloned().fold(f64::MIN, f64::max);
    let lower = lo.iter().cloned().fold(f64::MAX, f64::min);
    Some((upper, lower))
}

/// Candle body strength: |close - open| / (high - low), zero on a zero range.
pub fn body_strength(open: f64, high: f64, low: f64, close: f64) -> f64 {
    let range = high - low;
    if range <= 0.0 {
        return 0.0;
    }
    (close - open).abs() / range
}

/// Simple moving average of the trailing `period` values.
pub fn sma_last(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    Some(values[values.len() - period..].iter().sum::<f64>() / period as f64)
}

/// Fractal swing points: bar `i` is a swing high when its high is the strict
/// first maximum of the surrounding `left + right + 1` bars (ties resolve to
/// the earliest bar, matching the fractal definition). Returns (highs, lows)
/// as bar indices in ascending order.
pub fn find_swings(
    high: &[f64],
    low: &[f64],
    left: usize,
    right: usize,
) -> (Vec<usize>, Vec<usize>) {
    let n = high.len().min(low.len());
    let mut highs = Vec::new();
    let mut lows = Vec::new();
    if n < left + right + 1 {
        return (highs, lows);
    }
    for i in left..n - right {
        let lo_bound = i - left;
        let hi_bound = i + right;

        let mut max_idx = lo_bound;
        let mut min_idx = lo_bound;
        for j in lo_bound..=hi_bound {
            if high[j] > high[max_idx] {
                max_idx = j;
            }
            if low[j] < low[min_idx] {
                min_idx = j;
            }
        }
        if max_idx == i {
            highs.push(i);
        }
        if min_idx == i {
            lows.push(i);
        }
    }
    (highs, lows)
}

/// Most recent three-bar imbalance gaps within `lookback` bars.
///
/// Bullish: a bar's low clears the high two bars earlier; bearish mirrored.
/// Each returned pair is the (lower, upper) price bound of the gap zone.
pub fn find_gaps(
    high: &[f64],
    low: &[f64],
    lookback: usize,
) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
    let n = high.len().min(low.len());
    if n < 3 {
        return (None, None);
    }
    let start = 2.max(n.saturating_sub(lookback));
    let mut bull = None;
    let mut bear = None;
    for i in start..n {
        if low[i] > high[i - 2] {
            bull = Some((high[i - 2], low[i]));
        }
        if high[i] < low[i - 2] {
            bear = Some((high[i], low[i - 2]));
        }
    }
    (bull, bear)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_constant_series() {
        let values = vec![5.0; 30];
        let out = ema(&values, 9);
        assert_eq!(out.len(), 30);
        assert!((out[29] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_tracks_trend() {
        let values: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let out = ema(&values, 9);
        // EMA lags but rises with the series
        assert!(out[49] > out[40]);
        assert!(out[49] < values[49]);
    }

    #[test]
    fn test_ema_empty() {
        assert!(ema(&[], 9).is_empty());
    }

    #[test]
    fn test_rsi_bounds_and_warmup() {
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64) * 0.5).collect();
        let out = rsi(&closes, 14);
        assert!(out[13].is_nan());
        let last = out[39];
        assert!(last.is_finite());
        // Pure uptrend pushes the oscillator towards 100
        assert!(last > 90.0);

        closes.reverse();
        let out = rsi(&closes, 14);
        assert!(out[39] < 10.0);
    }

    #[test]
    fn test_atr_positive_and_smooth() {
        let high: Vec<f64> = (0..60).map(|i| 101.0 + (i % 5) as f64 * 0.2).collect();
        let low: Vec<f64> = high.iter().map(|h| h - 1.0).collect();
        let close: Vec<f64> = high.iter().map(|h| h - 0.5).collect();
        let out = atr_wilder(&high, &low, &close, 14);
        assert_eq!(out.len(), 60);
        assert!(out.iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_adx_strong_trend_vs_flat() {
        let n = 120;
        let high: Vec<f64> = (0..n).map(|i| 101.0 + i as f64).collect();
        let low: Vec<f64> = (0..n).map(|i| 99.0 + i as f64).collect();
        let close: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let trending = adx(&high, &low, &close, 14);

        let high_f = vec![101.0; n];
        let low_f = vec![99.0; n];
        let close_f = vec![100.0; n];
        let flat = adx(&high_f, &low_f, &close_f, 14);

        assert!(trending[n - 1] > 25.0);
        assert!(flat[n - 1] < trending[n - 1]);
    }

    #[test]
    fn test_bollinger_flat_series() {
        let closes = vec![50.0; 25];
        let bb = bollinger_last(&closes, 20, 2.0).unwrap();
        assert!((bb.middle - 50.0).abs() < 1e-9);
        assert!((bb.upper - bb.lower).abs() < 1e-9);
        assert!(bb.bandwidth.abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_short_window() {
        let closes = vec![50.0; 10];
        assert!(bollinger_last(&closes, 20, 2.0).is_none());
    }

    #[test]
    fn test_donchian_excludes_latest_bar() {
        let mut high = vec![10.0; 25];
        let mut low = vec![9.0; 25];
        // Latest bar spikes; the previous-bar channel must not include it
        high[24] = 50.0;
        low[24] = 1.0;
        let (upper, lower) = donchian_prev(&high, &low, 20).unwrap();
        assert_eq!(upper, 10.0);
        assert_eq!(lower, 9.0);
    }

    #[test]
    fn test_body_strength() {
        assert!((body_strength(10.0, 11.0, 10.0, 10.8) - 0.8).abs() < 1e-9);
        assert_eq!(body_strength(10.0, 10.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn test_find_swings_simple_peak() {
        //          0    1    2     3    4    5    6
        let high = [1.0, 2.0, 5.0, 2.0, 1.0, 2.0, 1.0];
        let low = [0.5, 1.0, 3.0, 1.0, 0.2, 1.0, 0.5];
        let (highs, lows) = find_swings(&high, &low, 2, 2);
        assert!(highs.contains(&2));
        assert!(lows.contains(&4));
    }

    #[test]
    fn test_find_gaps_bullish() {
        // Bar 4 low (12.0) clears bar 2 high (10.5)
        let high = [10.0, 10.2, 10.5, 11.5, 13.0];
        let low = [9.0, 9.5, 9.8, 11.0, 12.0];
        let (bull, bear) = find_gaps(&high, &low, 20);
        assert_eq!(bull, Some((10.5, 12.0)));
        assert!(bear.is_none());
    }

    #[test]
    fn test_find_gaps_bearish() {
        let high = [13.0, 12.5, 12.0, 10.0, 9.0];
        let low = [12.0, 11.5, 11.0, 9.5, 8.5];
        let (bull, bear) = find_gaps(&high, &low, 20);
        assert!(bull.is_none());
        assert_eq!(bear, Some((9.0, 11.0)));
    }

    #[test]
    fn test_sma_last() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(sma_last(&values, 2), Some(3.5));
        assert!(sma_last(&values, 5).is_none());
    }
}
