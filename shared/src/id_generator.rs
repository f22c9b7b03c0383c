use crate::WidgetId;

/// Produces fresh widget ids: 32 lowercase hex characters drawn from a
/// 128-bit random value
pub struct IdGenerator {
    rng: fastrand::Rng,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Deterministic sequence, for tests and reproducible sessions
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn generate(&mut self) -> WidgetId {
        WidgetId::new(format!("{:032x}", self.rng.u128(..)))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
