/// Exponential moving average of episode rewards used as REINFORCE baseline.
#[derive(Debug, Clone, Copy)]
pub struct RewardBaseline {
    value: f64,
    decay: f64,
}

impl RewardBaseline {
    pub fn new(decay: f64) -> Self {
        RewardBaseline { value: 0.0, decay }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// `b <- decay * b + (1 - decay) * reward`, returns the new value
    pub fn update(&mut self, reward: f64) -> f64 {
        self.value = self.decay * self.value + (1.0 - self.decay) * reward;
        self.value
    }
}
