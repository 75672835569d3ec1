//! Early stopping on a monitored evaluation metric

/// Tracks the best value of one metric and signals when it has not improved
/// for `patience` consecutive rounds.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best_value: Option<f64>,
    best_round: usize,
    current_round: usize,
    higher_is_better: bool,
    improved: bool,
}

impl EarlyStopping {
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
            higher_is_better,
            improved: false,
        }
    }

    /// Record this round's value. Returns `true` once `patience` rounds
    /// have passed since the best one.
    pub fn should_stop(&mut self, value: f64) -> bool {
        self.improved = match self.best_value {
            None => !value.is_nan(),
            Some(best) => {
                if self.higher_is_better {
                    value > best
                } else {
                    value < best
                }
            }
        };

        if self.improved {
            self.best_value = Some(value);
            self.best_round = self.current_round;
        }

        self.current_round += 1;
        self.current_round - self.best_round > self.patience
    }

    /// Whether the last recorded value was a new best
    pub fn improved(&self) -> bool {
        self.improved
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    pub fn best_round(&self) -> usize {
        self.best_round
    }

    pub fn patience(&self) -> usize {
        self.patience
    }
}
