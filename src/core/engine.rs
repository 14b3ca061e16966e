use super::types::FilingStatus;

const CAREER_START_AGE: u32 = 22;

const TAX_DEFERRED_RETURN: f64 = 0.055;
const AFTER_TAX_RETURN: f64 = 0.04;

const CLAIM_AGE: u32 = 62;
const TOP_EARNING_YEARS: usize = 35;
const WAGE_GROWTH: f64 = 0.032;
const BENEFIT_GROWTH: f64 = 0.025;
const TAXABLE_MAX_GROWTH: f64 = 0.03;
const BASE_TAXABLE_MAX: f64 = 168_600.0;
const EARLY_CLAIM_FACTOR: f64 = 0.70;
const SPOUSAL_MIN_FACTOR: f64 = 0.50;
const PIA_BEND_POINT_1: f64 = 1_174.0;
const PIA_BEND_POINT_2: f64 = 7_078.0;
const PRIMARY_EARNER_SHARE: f64 = 0.55;
const SPOUSE_EARNER_SHARE: f64 = 0.45;

const INCOME_GROWTH_RATE: f64 = 0.03;
const TAX_INFLATION_RATE: f64 = 0.025;

#[derive(Copy, Clone, Debug)]
struct TaxBracket {
    up_to: f64,
    rate: f64,
}

const FEDERAL_BRACKETS_MARRIED: [TaxBracket; 7] = [
    TaxBracket { up_to: 22_000.0, rate: 0.10 },
    TaxBracket { up_to: 89_450.0, rate: 0.12 },
    TaxBracket { up_to: 190_750.0, rate: 0.22 },
    TaxBracket { up_to: 364_200.0, rate: 0.24 },
    TaxBracket { up_to: 462_500.0, rate: 0.32 },
    TaxBracket { up_to: 693_750.0, rate: 0.35 },
    TaxBracket { up_to: f64::INFINITY, rate: 0.37 },
];

const FEDERAL_BRACKETS_SINGLE: [TaxBracket; 7] = [
    TaxBracket { up_to: 11_000.0, rate: 0.10 },
    TaxBracket { up_to: 44_725.0, rate: 0.12 },
    TaxBracket { up_to: 95_375.0, rate: 0.22 },
    TaxBracket { up_to: 182_100.0, rate: 0.24 },
    TaxBracket { up_to: 231_250.0, rate: 0.32 },
    TaxBracket { up_to: 578_125.0, rate: 0.35 },
    TaxBracket { up_to: f64::INFINITY, rate: 0.37 },
];

const CALIFORNIA_BRACKETS: [TaxBracket; 7] = [
    TaxBracket { up_to: 10_099.0, rate: 0.01 },
    TaxBracket { up_to: 23_942.0, rate: 0.02 },
    TaxBracket { up_to: 37_788.0, rate: 0.04 },
    TaxBracket { up_to: 52_455.0, rate: 0.06 },
    TaxBracket { up_to: 66_295.0, rate: 0.08 },
    TaxBracket { up_to: 338_639.0, rate: 0.093 },
    TaxBracket { up_to: f64::INFINITY, rate: 0.123 },
];

const NEW_YORK_BRACKETS: [TaxBracket; 6] = [
    TaxBracket { up_to: 8_500.0, rate: 0.04 },
    TaxBracket { up_to: 11_700.0, rate: 0.045 },
    TaxBracket { up_to: 13_900.0, rate: 0.0525 },
    TaxBracket { up_to: 21_400.0, rate: 0.059 },
    TaxBracket { up_to: 80_650.0, rate: 0.0621 },
    TaxBracket { up_to: f64::INFINITY, rate: 0.0685 },
];

#[derive(Copy, Clone, Debug)]
enum StateTaxSystem {
    Progressive {
        brackets: &'static [TaxBracket],
        deduction_married: f64,
        deduction_single: f64,
    },
    Flat {
        rate: f64,
        deduction_married: f64,
        deduction_single: f64,
    },
}

impl StateTaxSystem {
    fn standard_deduction(self, filing: FilingStatus) -> f64 {
        let (married, single) = match self {
            StateTaxSystem::Progressive {
                deduction_married,
                deduction_single,
                ..
            } => (deduction_married, deduction_single),
            StateTaxSystem::Flat {
                deduction_married,
                deduction_single,
                ..
            } => (deduction_married, deduction_single),
        };
        if filing.is_married() { married } else { single }
    }
}

fn state_tax_system(state_code: &str) -> StateTaxSystem {
    match state_code {
        "CA" => StateTaxSystem::Progressive {
            brackets: &CALIFORNIA_BRACKETS,
            deduction_married: 10_652.0,
            deduction_single: 5_326.0,
        },
        "NY" => StateTaxSystem::Progressive {
            brackets: &NEW_YORK_BRACKETS,
            deduction_married: 16_050.0,
            deduction_single: 8_000.0,
        },
        "TX" | "FL" | "WA" | "NV" => StateTaxSystem::Flat {
            rate: 0.0,
            deduction_married: 0.0,
            deduction_single: 0.0,
        },
        // Every remaining code shares one approximate table.
        _ => StateTaxSystem::Flat {
            rate: 0.05,
            deduction_married: 8_000.0,
            deduction_single: 4_000.0,
        },
    }
}

fn working_years(age: u32) -> u32 {
    age.saturating_sub(CAREER_START_AGE).max(1)
}

fn age_savings_multiplier(age: u32) -> f64 {
    if age < 30 {
        0.85
    } else if age < 40 {
        1.0
    } else if age < 50 {
        1.1
    } else if age < 60 {
        1.05
    } else {
        0.9
    }
}

fn base_saving_rate(household_assets: f64) -> f64 {
    if household_assets < 100_000.0 {
        0.06
    } else if household_assets < 300_000.0 {
        0.09
    } else if household_assets < 750_000.0 {
        0.13
    } else if household_assets < 1_500_000.0 {
        0.17
    } else {
        0.20
    }
}

fn estimate_income_from_balance(
    balance: f64,
    saving_rate: f64,
    working_years: u32,
    market_return: f64,
) -> f64 {
    if balance <= 0.0 || market_return == 0.0 {
        return 0.0;
    }

    let growth_factor = ((1.0 + market_return).powi(working_years as i32) - 1.0) / market_return;
    balance / (saving_rate * growth_factor)
}

pub fn estimate_current_yearly_income(
    user_age: u32,
    spouse_age: Option<u32>,
    tax_deferred_balance: f64,
    after_tax_balance: f64,
) -> f64 {
    let household_assets = tax_deferred_balance + after_tax_balance;

    let user_working_years = working_years(user_age);
    let user_saving_rate = base_saving_rate(household_assets) * age_savings_multiplier(user_age);

    let income_from_tax_deferred = estimate_income_from_balance(
        tax_deferred_balance,
        user_saving_rate,
        user_working_years,
        TAX_DEFERRED_RETURN,
    );
    let income_from_after_tax = estimate_income_from_balance(
        after_tax_balance,
        user_saving_rate,
        user_working_years,
        AFTER_TAX_RETURN,
    );

    let mut user_income = income_from_tax_deferred + income_from_after_tax;
    let mut spouse_income = 0.0;

    if let Some(spouse_age) = spouse_age {
        let spouse_working_years = working_years(spouse_age);
        let spouse_weight =
            spouse_working_years as f64 / (user_working_years + spouse_working_years) as f64;
        spouse_income = user_income * spouse_weight;
        user_income *= 1.0 - spouse_weight;
    }

    (user_income + spouse_income).round()
}

fn build_indexed_earnings(age: u32, income: f64, years_remaining_to_work: u32) -> Vec<f64> {
    if age == 0 || income <= 0.0 {
        return Vec::new();
    }

    let past_years = age.saturating_sub(CAREER_START_AGE);
    let mut earnings = Vec::with_capacity((past_years + years_remaining_to_work) as usize);
    let mut taxable_max = BASE_TAXABLE_MAX;

    for i in 0..past_years {
        let indexed = income.min(taxable_max) * (1.0 + WAGE_GROWTH).powi((past_years - i) as i32);
        earnings.push(indexed);
        taxable_max *= 1.0 + TAXABLE_MAX_GROWTH;
    }

    // The taxable maximum keeps compounding from wherever the past years left it.
    for i in 1..=years_remaining_to_work {
        let future = income * (1.0 + WAGE_GROWTH).powi(i as i32);
        earnings.push(future.min(taxable_max));
        taxable_max *= 1.0 + TAXABLE_MAX_GROWTH;
    }

    earnings.sort_by(|a, b| b.total_cmp(a));
    earnings.truncate(TOP_EARNING_YEARS);
    earnings
}

fn average_indexed_monthly_earnings(earnings: &[f64]) -> f64 {
    if earnings.is_empty() {
        return 0.0;
    }

    let total: f64 = earnings.iter().sum();
    total / (TOP_EARNING_YEARS as f64 * 12.0)
}

fn primary_insurance_amount(aime: f64) -> f64 {
    if aime <= PIA_BEND_POINT_1 {
        return 0.9 * aime;
    }
    if aime <= PIA_BEND_POINT_2 {
        return 0.9 * PIA_BEND_POINT_1 + 0.32 * (aime - PIA_BEND_POINT_1);
    }

    0.9 * PIA_BEND_POINT_1
        + 0.32 * (PIA_BEND_POINT_2 - PIA_BEND_POINT_1)
        + 0.15 * (aime - PIA_BEND_POINT_2)
}

fn spousal_minimum(user_pia: f64, spouse_pia: f64) -> f64 {
    let minimum = user_pia.max(spouse_pia) * SPOUSAL_MIN_FACTOR;
    if spouse_pia < minimum {
        minimum
    } else {
        spouse_pia
    }
}

pub fn estimate_future_social_security_income(
    user_age: u32,
    spouse_age: Option<u32>,
    tax_deferred_balance: f64,
    after_tax_balance: f64,
    years_remaining_to_work: u32,
) -> f64 {
    let household_income = estimate_current_yearly_income(
        user_age,
        spouse_age,
        tax_deferred_balance,
        after_tax_balance,
    );

    let (user_income, spouse_income) = match spouse_age {
        Some(_) => (
            household_income * PRIMARY_EARNER_SHARE,
            household_income * SPOUSE_EARNER_SHARE,
        ),
        None => (household_income, 0.0),
    };

    let user_earnings = build_indexed_earnings(user_age, user_income, years_remaining_to_work);
    let mut user_pia = primary_insurance_amount(average_indexed_monthly_earnings(&user_earnings));

    let mut spouse_pia = 0.0;
    if let Some(spouse_age) = spouse_age {
        let spouse_earnings =
            build_indexed_earnings(spouse_age, spouse_income, years_remaining_to_work);
        spouse_pia = primary_insurance_amount(average_indexed_monthly_earnings(&spouse_earnings));
        spouse_pia = spousal_minimum(user_pia, spouse_pia);
    }

    user_pia *= EARLY_CLAIM_FACTOR;
    spouse_pia *= EARLY_CLAIM_FACTOR;

    let years_until_claim = CLAIM_AGE.saturating_sub(user_age);
    let growth = (1.0 + BENEFIT_GROWTH).powi(years_until_claim as i32);

    let user_monthly = user_pia * growth;
    let spouse_monthly = spouse_pia * growth;

    ((user_monthly + spouse_monthly) * 12.0).round()
}

fn inflation_factor(year_offset: u32) -> f64 {
    (1.0 + TAX_INFLATION_RATE).powi(year_offset as i32)
}

fn taxable_social_security(
    filing: FilingStatus,
    ss_income: f64,
    other_income: f64,
    bracket_inflation: f64,
) -> f64 {
    let base = if filing.is_married() { 32_000.0 } else { 25_000.0 };
    let adjusted_base = base * bracket_inflation;

    if other_income < adjusted_base {
        return 0.0;
    }
    if other_income < adjusted_base * 1.5 {
        return ss_income * 0.5;
    }
    ss_income * 0.85
}

fn progressive_tax(income: f64, brackets: &[TaxBracket], bracket_inflation: f64) -> f64 {
    let mut tax = 0.0;
    let mut prev_cap = 0.0;

    for bracket in brackets {
        let cap = bracket.up_to * bracket_inflation;
        if income <= prev_cap {
            break;
        }
        let taxable = income.min(cap) - prev_cap;
        tax += taxable * bracket.rate;
        prev_cap = cap;
    }

    tax
}

pub fn estimate_income_at_year_n(
    filing: FilingStatus,
    current_annual_income: f64,
    state_code: &str,
    year_offset: u32,
    social_security_income: f64,
) -> f64 {
    let projected_income =
        current_annual_income * (1.0 + INCOME_GROWTH_RATE).powi(year_offset as i32);
    let gross_income = projected_income + social_security_income;

    let bracket_inflation = inflation_factor(year_offset);

    let taxable_ss = taxable_social_security(
        filing,
        social_security_income,
        projected_income,
        bracket_inflation,
    );

    let federal_deduction = if filing.is_married() { 27_700.0 } else { 13_850.0 };
    let federal_brackets: &[TaxBracket] = if filing.is_married() {
        &FEDERAL_BRACKETS_MARRIED
    } else {
        &FEDERAL_BRACKETS_SINGLE
    };

    let federal_taxable =
        (projected_income + taxable_ss - federal_deduction * bracket_inflation).max(0.0);
    let federal_tax = progressive_tax(federal_taxable, federal_brackets, bracket_inflation);

    let state = state_tax_system(state_code);
    let state_taxable =
        (projected_income - state.standard_deduction(filing) * bracket_inflation).max(0.0);
    let state_tax = match state {
        StateTaxSystem::Flat { rate, .. } => state_taxable * rate,
        StateTaxSystem::Progressive { brackets, .. } => {
            progressive_tax(state_taxable, brackets, bracket_inflation)
        }
    };

    (gross_income - (federal_tax + state_tax)).round()
}
