/// Exponential moving average over a fixed-size record of signals.
///
/// Formula: `s[t] = s[t-1] + alpha * (x[t] - s[t-1])`; the first sample
/// passes through unchanged.
#[derive(Clone, Debug)]
pub struct EmaSmoother<const N: usize> {
    alpha: f64,
    state: Option<[f64; N]>,
}

impl<const N: usize> EmaSmoother<N> {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, state: None }
    }

    pub fn smooth(&mut self, raw: [f64; N]) -> [f64; N] {
        let smoothed = match self.state {
            None => raw,
            Some(mut prev) => {
                for (s, r) in prev.iter_mut().zip(raw) {
                    *s += (r - *s) * self.alpha;
                }
                prev
            }
        };
        self.state = Some(smoothed);
        smoothed
    }

    pub fn current(&self) -> Option<[f64; N]> {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}
