/// FIR filter over a circular history buffer
///
/// One instance serves both pipeline roles in turn: anti-aliasing ahead of
/// decimation on the record path, anti-imaging after zero-stuffing on the
/// playback path. `reset` clears the history between roles so one session's
/// tail never rings into the next.
pub struct FirFilter {
    taps: Vec<f64>,
    history: Vec<f64>,
    pos: usize,
}

impl FirFilter {
    /// Create a filter with the given tap coefficients
    pub fn new(taps: Vec<f64>) -> Self {
        Self {
            history: vec![0.0; taps.len()],
            taps,
            pos: 0,
        }
    }

    /// Process a single sample through the filter
    ///
    /// Inserts the sample at the current history slot, returns the dot
    /// product of the taps with the history read from that slot onward, and
    /// advances the insertion index. O(N), no allocation.
    pub fn process(&mut self, sample: f32) -> f32 {
        self.history[self.pos] = sample as f64;

        let n = self.taps.len();
        let mut output = 0.0f64;

        // Walk the ring in two contiguous ranges so the inner loop carries
        // no per-tap modulo.
        let mut tap_i = 0usize;
        for history_idx in self.pos..n {
            output += self.taps[tap_i] * self.history[history_idx];
            tap_i += 1;
        }
        for history_idx in 0..self.pos {
            output += self.taps[tap_i] * self.history[history_idx];
            tap_i += 1;
        }
        debug_assert_eq!(tap_i, n);

        self.pos += 1;
        if self.pos == n {
            self.pos = 0;
        }
        output as f32
    }

    /// Process an entire buffer of samples in-place
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Zero the history and the insertion index without reallocating
    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.pos = 0;
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Get access to the tap coefficients
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Direct evaluation of the same sum the filter computes: taps[0]
    /// against the newest sample, taps[1..] against the remaining history
    /// oldest-first.
    fn direct_reference(taps: &[f64], inputs: &[f32]) -> Vec<f32> {
        let n = taps.len();
        let mut history = vec![0.0f64; n];
        let mut pos = 0usize;
        let mut outputs = Vec::with_capacity(inputs.len());

        for &input in inputs {
            history[pos] = input as f64;
            let mut sum = 0.0f64;
            for (i, tap) in taps.iter().enumerate() {
                sum += tap * history[(pos + i) % n];
            }
            outputs.push(sum as f32);
            pos = (pos + 1) % n;
        }
        outputs
    }

    #[test]
    fn test_matches_direct_convolution() {
        let taps = vec![0.5, 0.25, -0.125, 0.0625];
        let inputs = [1.0, 2.0, -3.0, 4.0, 0.5, -1.5, 2.5, -0.25, 7.0, -6.0];

        let mut filter = FirFilter::new(taps.clone());
        let expected = direct_reference(&taps, &inputs);

        for (i, &input) in inputs.iter().enumerate() {
            let output = filter.process(input);
            assert_relative_eq!(output, expected[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_impulse_response_reproduces_taps() {
        // With this indexing, an impulse surfaces taps[0] immediately
        // and the remaining taps in reverse order as the impulse ages.
        let taps = vec![0.4, 0.3, 0.2, 0.1];
        let mut filter = FirFilter::new(taps.clone());

        let outputs: Vec<f32> = [1.0, 0.0, 0.0, 0.0]
            .iter()
            .map(|&s| filter.process(s))
            .collect();

        assert_relative_eq!(outputs[0], 0.4, epsilon = 1e-6);
        assert_relative_eq!(outputs[1], 0.1, epsilon = 1e-6);
        assert_relative_eq!(outputs[2], 0.2, epsilon = 1e-6);
        assert_relative_eq!(outputs[3], 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_dc_gain_is_tap_sum() {
        let taps = vec![0.25; 4];
        let mut filter = FirFilter::new(taps);

        let mut last = 0.0;
        for _ in 0..8 {
            last = filter.process(10.0);
        }
        assert_relative_eq!(last, 10.0, epsilon = 1e-5);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut filter = FirFilter::new(vec![0.5, 0.5, 0.5]);
        for _ in 0..5 {
            filter.process(123.0);
        }

        filter.reset();

        for _ in 0..3 {
            assert_eq!(filter.process(0.0), 0.0);
        }
    }
}
