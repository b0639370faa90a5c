use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrialStatus {
    pub eligible: bool,
    pub has_used_trial: bool,
    pub trial_price: f64,
}

impl TrialStatus {
    pub fn new(has_used_trial: bool, trial_price: f64) -> Self {
        Self {
            eligible: !has_used_trial,
            has_used_trial,
            trial_price,
        }
    }

    /// Used when the student's record can't be read: no trial offered.
    pub fn unavailable(trial_price: f64) -> Self {
        Self {
            eligible: false,
            has_used_trial: false,
            trial_price,
        }
    }
}
