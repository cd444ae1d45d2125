//! Window Statistics

/// Summary statistics over a short window of sales values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowStats {
    /// Mean value
    pub mean: f64,
    /// Population standard deviation (divides by n)
    pub std_dev: f64,
    /// Sample standard deviation (divides by n - 1), `None` below two values
    pub sample_std_dev: Option<f64>,
}

impl WindowStats {
    /// Compute window statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();
        let sample_std_dev = if values.len() >= 2 {
            Some((m2 / (n - 1.0)).sqrt())
        } else {
            None
        };

        Self {
            mean,
            std_dev,
            sample_std_dev,
        }
    }

    /// Mean of a slice, 0.0 when empty
    pub fn mean_of(values: &[f64]) -> f64 {
        Self::compute(values).mean
    }
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
