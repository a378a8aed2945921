use serde::{Deserialize, Serialize};
use crate::drivers::GraphError;
/// How early samples are weighted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EwmaConvention {
    /// `s[i] = (1 - a) * s[i-1] + a * x[i]`, seeded with `s[0] = x[0]`.
    #[default]
    Unadjusted,
    /// Normalised by the sum of the weights seen so far, so early values are not biased toward `x[0]`.
    Adjusted,
}
/// Exponentially weighted moving average with decay `a = 1 / (1 + com)`.
#[derive(Clone, Copy, Debug)]
pub struct Ewma {
    alpha: f64,
    convention: EwmaConvention,
}
impl Ewma {
    pub fn from_com(com: f64, convention: EwmaConvention) -> Result<Self, GraphError> {
        if !com.is_finite() || com < 0.0 {
            return Err(GraphError::InvalidSmoothing(com));
        }
        Ok(Self {
            alpha: 1.0 / (1.0 + com),
            convention,
        })
    }
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
    pub fn apply(&self, raw: &[f64]) -> Vec<f64> {
        let Some(&first) = raw.first() else {
            return Vec::new();
        };
        let decay = 1.0 - self.alpha;
        let mut out = Vec::with_capacity(raw.len());
        match self.convention {
            EwmaConvention::Unadjusted => {
                let mut state = first;
                out.push(state);
                for &x in &raw[1..] {
                    state = decay * state + self.alpha * x;
                    out.push(state);
                }
            }
            EwmaConvention::Adjusted => {
                let mut numerator = first;
                let mut weight = 1.0;
                out.push(first);
                for &x in &raw[1..] {
                    numerator = x + decay * numerator;
                    weight = 1.0 + decay * weight;
                    out.push(numerator / weight);
                }
            }
        }
        out
    }
}
pub fn ewma(raw: &[f64], com: f64, convention: EwmaConvention) -> Result<Vec<f64>, GraphError> {
    Ok(Ewma::from_com(com, convention)?.apply(raw))
}
