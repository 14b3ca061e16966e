mod engine;
mod solver;
mod types;

pub use engine::{
    estimate_current_yearly_income, estimate_future_social_security_income,
    estimate_income_at_year_n,
};
pub use solver::{calculate_retirement_age, evaluate_household};
pub use types::{FilingStatus, HouseholdProfile, Scenario, ScenarioOutcomes, ScenarioParams};
