use super::engine::{
    estimate_current_yearly_income, estimate_future_social_security_income,
    estimate_income_at_year_n,
};
use super::types::{FilingStatus, HouseholdProfile, Scenario, ScenarioOutcomes, ScenarioParams};

const MAX_RETIREMENT_AGE: u32 = 75;
const HORIZON_END_AGE: u32 = 90;
const RMD_START_AGE: u32 = 73;
const RMD_RATE: f64 = 0.04;
const TAX_DEFERRED_SAVINGS_SHARE: f64 = 0.7;
const AFTER_TAX_SAVINGS_SHARE: f64 = 0.3;

#[derive(Copy, Clone, Debug)]
struct SimulationState {
    tax_deferred: f64,
    after_tax: f64,
}

impl SimulationState {
    fn from_profile(profile: &HouseholdProfile) -> Self {
        Self {
            tax_deferred: profile.tax_deferred_balance,
            after_tax: profile.after_tax_balance,
        }
    }

    fn total(self) -> f64 {
        self.tax_deferred + self.after_tax
    }
}

pub fn evaluate_household(profile: &HouseholdProfile) -> ScenarioOutcomes {
    ScenarioOutcomes {
        conservative: calculate_retirement_age(profile, Scenario::Conservative),
        normal: calculate_retirement_age(profile, Scenario::Normal),
        optimistic: calculate_retirement_age(profile, Scenario::Optimistic),
    }
}

pub fn calculate_retirement_age(profile: &HouseholdProfile, scenario: Scenario) -> Option<u32> {
    let params = scenario.params();
    let filing = FilingStatus::from_spouse(profile.spouse_age);

    let current_income = estimate_current_yearly_income(
        profile.user_age,
        profile.spouse_age,
        profile.tax_deferred_balance,
        profile.after_tax_balance,
    );

    // Ascending sweep, so the first solvent candidate is the earliest one.
    for candidate_age in profile.user_age..=MAX_RETIREMENT_AGE {
        let mut state = SimulationState::from_profile(profile);

        accumulate_working_years(
            profile,
            params,
            filing,
            current_income,
            candidate_age,
            &mut state,
        );

        if survives_retirement(profile, params, candidate_age, &mut state) {
            return Some(candidate_age);
        }
    }

    None
}

fn accumulate_working_years(
    profile: &HouseholdProfile,
    params: ScenarioParams,
    filing: FilingStatus,
    current_income: f64,
    candidate_age: u32,
    state: &mut SimulationState,
) {
    for age in profile.user_age..candidate_age {
        let year_offset = age - profile.user_age;
        let income = estimate_income_at_year_n(
            filing,
            current_income,
            &profile.state_code,
            year_offset,
            0.0,
        );
        let savings = income * params.savings_rate;

        state.tax_deferred = state.tax_deferred * (1.0 + params.asset_growth_rate)
            + savings * TAX_DEFERRED_SAVINGS_SHARE;
        state.after_tax = state.after_tax * (1.0 + params.asset_growth_rate)
            + savings * AFTER_TAX_SAVINGS_SHARE;
    }
}

fn survives_retirement(
    profile: &HouseholdProfile,
    params: ScenarioParams,
    candidate_age: u32,
    state: &mut SimulationState,
) -> bool {
    let annual_expense_today = profile.monthly_expense_today * 12.0;
    let years_worked = candidate_age - profile.user_age;

    for age in candidate_age..=HORIZON_END_AGE {
        let year_offset = age - profile.user_age;
        let expense =
            annual_expense_today * (1.0 + params.inflation_rate).powi(year_offset as i32);

        // The benefit projection tracks the balances as they stand this year.
        let ss_income = estimate_future_social_security_income(
            profile.user_age,
            profile.spouse_age,
            state.tax_deferred,
            state.after_tax,
            years_worked,
        );

        let mut rmd = 0.0;
        if age >= RMD_START_AGE {
            rmd = state.tax_deferred * RMD_RATE;
            state.tax_deferred -= rmd;
        }

        let mut shortfall = expense - (ss_income + rmd);
        if shortfall > 0.0 {
            if state.after_tax >= shortfall {
                state.after_tax -= shortfall;
            } else {
                shortfall -= state.after_tax;
                state.after_tax = 0.0;
                state.tax_deferred -= shortfall;
            }
        }

        state.tax_deferred *= 1.0 + params.asset_growth_rate;
        state.after_tax *= 1.0 + params.asset_growth_rate;

        if state.total() <= 0.0 {
            return false;
        }
    }

    true
}
