use crate::domain::models::trial::TrialStatus;
use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Allowed lengths of a weekly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RecurringWeeks {
    One,
    Two,
    Four,
    Eight,
}

impl RecurringWeeks {
    pub fn count(self) -> u32 {
        match self {
            RecurringWeeks::One => 1,
            RecurringWeeks::Two => 2,
            RecurringWeeks::Four => 4,
            RecurringWeeks::Eight => 8,
        }
    }
}

impl TryFrom<u32> for RecurringWeeks {
    type Error = AppError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RecurringWeeks::One),
            2 => Ok(RecurringWeeks::Two),
            4 => Ok(RecurringWeeks::Four),
            8 => Ok(RecurringWeeks::Eight),
            other => Err(AppError::Validation(format!("Recurring weeks must be 1, 2, 4 or 8 (got {})", other))),
        }
    }
}

impl From<RecurringWeeks> for u32 {
    fn from(weeks: RecurringWeeks) -> Self {
        weeks.count()
    }
}

/// Step function: `>= 4` weeks earns 10%, `>= 2` earns 5%.
pub fn discount_percent(weeks: u32) -> u32 {
    if weeks >= 4 {
        10
    } else if weeks >= 2 {
        5
    } else {
        0
    }
}

/// The booking form's option state.
///
/// Recurring and trial are mutually exclusive; switching recurring on
/// clears the trial flag in the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingOptions {
    is_recurring: bool,
    weeks: RecurringWeeks,
    use_trial: bool,
}

impl Default for BookingOptions {
    fn default() -> Self {
        Self { is_recurring: false, weeks: RecurringWeeks::One, use_trial: false }
    }
}

impl BookingOptions {
    pub fn single() -> Self {
        Self::default()
    }

    pub fn trial() -> Self {
        Self { use_trial: true, ..Self::default() }
    }

    pub fn recurring(weeks: RecurringWeeks) -> Self {
        Self { is_recurring: true, weeks, use_trial: false }
    }

    /// Builds options from a raw request, refusing the trial+recurring combination.
    pub fn from_request(is_recurring: bool, weeks: Option<u32>, use_trial: bool) -> Result<Self, AppError> {
        if is_recurring && use_trial {
            return Err(AppError::Validation("A trial lesson cannot be part of a recurring booking".into()));
        }
        if is_recurring {
            let weeks = weeks.ok_or_else(|| AppError::Validation("Recurring weeks are required".into()))?;
            Ok(Self::recurring(RecurringWeeks::try_from(weeks)?))
        } else if use_trial {
            Ok(Self::trial())
        } else {
            Ok(Self::single())
        }
    }

    pub fn set_recurring(&mut self, on: bool) {
        self.is_recurring = on;
        if on {
            self.use_trial = false;
        }
    }

    pub fn set_weeks(&mut self, weeks: RecurringWeeks) {
        self.weeks = weeks;
    }

    /// Ignored while the booking is recurring.
    pub fn set_use_trial(&mut self, on: bool) {
        self.use_trial = on && !self.is_recurring;
    }

    pub fn is_recurring(&self) -> bool {
        self.is_recurring
    }

    pub fn use_trial(&self) -> bool {
        self.use_trial
    }

    /// Number of lessons charged: the series length when recurring, else one.
    pub fn lesson_count(&self) -> u32 {
        if self.is_recurring { self.weeks.count() } else { 1 }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub amount: f64,
    pub full_price: f64,
    pub savings: f64,
    pub discount_percent: u32,
    pub weeks: u32,
    pub is_trial: bool,
    pub display_amount: i64,
}

/// Upper bound accepted for a tutor's hourly rate, in major units.
pub const MAX_HOURLY_RATE: f64 = 100_000.0;

/// Prices are computed in cents so the discount tiers stay exact.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

pub fn compute_price(hourly_rate: f64, options: &BookingOptions, trial: &TrialStatus) -> Result<Quote, AppError> {
    if !hourly_rate.is_finite() || hourly_rate <= 0.0 || hourly_rate > MAX_HOURLY_RATE {
        return Err(AppError::Validation("Tutor hourly rate is out of range".into()));
    }
    let rate_cents = to_cents(hourly_rate);
    let weeks = options.lesson_count();

    if options.use_trial() && trial.eligible && !options.is_recurring() {
        let trial_cents = to_cents(trial.trial_price);
        return Ok(build_quote(trial_cents, rate_cents, 0, 1, true));
    }

    let overflow = || AppError::InternalWithMsg(format!("price overflow for rate {} x {} weeks", hourly_rate, weeks));
    let full_cents = rate_cents.checked_mul(i64::from(weeks)).ok_or_else(overflow)?;
    let percent = if options.is_recurring() { discount_percent(weeks) } else { 0 };
    let discount_cents = full_cents.checked_mul(i64::from(percent)).ok_or_else(overflow)? / 100;
    Ok(build_quote(full_cents - discount_cents, full_cents, percent, weeks, false))
}

fn build_quote(amount_cents: i64, full_cents: i64, discount_percent: u32, weeks: u32, is_trial: bool) -> Quote {
    Quote {
        amount: from_cents(amount_cents),
        full_price: from_cents(full_cents),
        savings: from_cents(full_cents - amount_cents),
        discount_percent,
        weeks,
        is_trial,
        display_amount: (amount_cents as f64 / 100.0).round() as i64,
    }
}

/// Splits a series total over its lessons; leftover cents go to the first.
pub fn split_amount(total: f64, parts: u32) -> Vec<f64> {
    if parts == 0 {
        return Vec::new();
    }
    let total_cents = to_cents(total);
    let share = total_cents / i64::from(parts);
    let remainder = total_cents - share * i64::from(parts);
    (0..parts)
        .map(|i| from_cents(if i == 0 { share + remainder } else { share }))
        .collect()
}
