use std::f64::consts::PI;

/// Sinusoidal platform motion sampled at `time` seconds.
pub fn swell(time: f64, amplitude: f64, period: f64, phase: f64) -> f64 {
    if period <= 0.0 {
        return 0.0;
    }
    amplitude * (2.0 * PI * time / period + phase).sin()
}

/// `length` samples of one motion channel starting at `start`, spaced `interval` apart.
pub fn sine_wave(start: f64, interval: f64, length: usize, amplitude: f64, period: f64) -> Vec<(f64, f64)> {
    (0..length)
        .map(|i| {
            let time = start + i as f64 * interval;
            (time, swell(time, amplitude, period, 0.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swell_repeats_every_period() {
        let a = swell(1.3, 2.0, 8.0, 0.4);
        let b = swell(9.3, 2.0, 8.0, 0.4);
        assert!((a - b).abs() < 1e-9);
        assert_eq!(swell(3.0, 2.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn sine_wave_is_evenly_spaced() {
        let wave = sine_wave(10.0, 0.5, 5, 1.0, 4.0);
        assert_eq!(wave.len(), 5);
        assert_eq!(wave[4].0, 12.0);
        assert!(wave.iter().all(|(_, value)| value.abs() <= 1.0));
    }
}
