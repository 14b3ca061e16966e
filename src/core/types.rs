use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Scenario {
    Conservative,
    Normal,
    Optimistic,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::Conservative,
        Scenario::Normal,
        Scenario::Optimistic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Conservative => "conservative",
            Scenario::Normal => "normal",
            Scenario::Optimistic => "optimistic",
        }
    }

    pub fn params(self) -> ScenarioParams {
        match self {
            Scenario::Conservative => ScenarioParams {
                asset_growth_rate: 0.03,
                inflation_rate: 0.028,
                savings_rate: 0.08,
            },
            Scenario::Normal => ScenarioParams {
                asset_growth_rate: 0.05,
                inflation_rate: 0.025,
                savings_rate: 0.12,
            },
            Scenario::Optimistic => ScenarioParams {
                asset_growth_rate: 0.07,
                inflation_rate: 0.023,
                savings_rate: 0.18,
            },
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ScenarioParams {
    pub asset_growth_rate: f64,
    pub inflation_rate: f64,
    pub savings_rate: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilingStatus {
    Single,
    Married,
}

impl FilingStatus {
    pub fn from_spouse(spouse_age: Option<u32>) -> Self {
        if spouse_age.is_some() {
            FilingStatus::Married
        } else {
            FilingStatus::Single
        }
    }

    pub fn is_married(self) -> bool {
        self == FilingStatus::Married
    }
}

#[derive(Debug, Clone)]
pub struct HouseholdProfile {
    pub user_age: u32,
    pub spouse_age: Option<u32>,
    pub tax_deferred_balance: f64,
    pub after_tax_balance: f64,
    pub state_code: String,
    pub monthly_expense_today: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcomes {
    pub conservative: Option<u32>,
    pub normal: Option<u32>,
    pub optimistic: Option<u32>,
}

impl ScenarioOutcomes {
    pub fn get(self, scenario: Scenario) -> Option<u32> {
        match scenario {
            Scenario::Conservative => self.conservative,
            Scenario::Normal => self.normal,
            Scenario::Optimistic => self.optimistic,
        }
    }
}
