use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{HouseholdProfile, Scenario, ScenarioOutcomes, evaluate_household};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RetirementPayload {
    #[serde(alias = "user_age")]
    user_age: Option<u32>,
    #[serde(alias = "spouse_age")]
    spouse_age: Option<u32>,
    #[serde(alias = "state", alias = "state_code")]
    state_code: Option<String>,
    #[serde(alias = "monthly_expense")]
    monthly_expense: Option<f64>,
    #[serde(alias = "tax_deferred", alias = "tax_deferred_balance")]
    tax_deferred_balance: Option<f64>,
    #[serde(alias = "after_tax", alias = "after_tax_balance")]
    after_tax_balance: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "glidepath",
    about = "Earliest-retirement-age estimator (conservative / normal / optimistic scenarios)"
)]
struct Cli {
    #[arg(long, help = "Primary earner's current age")]
    user_age: u32,
    #[arg(long, help = "Spouse's current age; omit for a single-person household")]
    spouse_age: Option<u32>,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Tax-deferred savings balance today (401k, IRA)"
    )]
    tax_deferred_balance: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "After-tax savings balance today (brokerage, cash)"
    )]
    after_tax_balance: f64,
    #[arg(
        long,
        default_value = "CA",
        help = "Two-letter state code; unrecognized codes fall back to the default state tax table"
    )]
    state_code: String,
    #[arg(long, help = "Household monthly expenses in today's dollars")]
    monthly_expense: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioAssumptions {
    scenario: &'static str,
    asset_growth_rate: f64,
    inflation_rate: f64,
    savings_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetirementResponse {
    age_conservative: Option<u32>,
    age_normal: Option<u32>,
    age_optimistic: Option<u32>,
    user_age: u32,
    spouse_age: Option<u32>,
    state_code: String,
    monthly_expense: f64,
    tax_deferred_balance: f64,
    after_tax_balance: f64,
    assumptions: Vec<ScenarioAssumptions>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn default_cli_for_api() -> Cli {
    Cli {
        user_age: 45,
        spouse_age: None,
        tax_deferred_balance: 250_000.0,
        after_tax_balance: 100_000.0,
        state_code: "CA".to_string(),
        monthly_expense: 4_000.0,
    }
}

fn build_profile(cli: Cli) -> Result<HouseholdProfile, String> {
    if cli.user_age == 0 {
        return Err("--user-age must be > 0".to_string());
    }

    if cli.spouse_age == Some(0) {
        return Err("--spouse-age must be > 0 when provided".to_string());
    }

    if !cli.tax_deferred_balance.is_finite() || cli.tax_deferred_balance < 0.0 {
        return Err("--tax-deferred-balance must be >= 0".to_string());
    }

    if !cli.after_tax_balance.is_finite() || cli.after_tax_balance < 0.0 {
        return Err("--after-tax-balance must be >= 0".to_string());
    }

    if !cli.monthly_expense.is_finite() || cli.monthly_expense < 0.0 {
        return Err("--monthly-expense must be >= 0".to_string());
    }

    let state_code = cli.state_code.trim().to_ascii_uppercase();
    if state_code.is_empty() {
        return Err("--state-code must not be empty".to_string());
    }

    Ok(HouseholdProfile {
        user_age: cli.user_age,
        spouse_age: cli.spouse_age,
        tax_deferred_balance: cli.tax_deferred_balance,
        after_tax_balance: cli.after_tax_balance,
        state_code,
        monthly_expense_today: cli.monthly_expense,
    })
}

fn profile_from_payload(payload: RetirementPayload) -> Result<HouseholdProfile, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.user_age {
        cli.user_age = v;
    }
    if payload.spouse_age.is_some() {
        cli.spouse_age = payload.spouse_age;
    }
    if let Some(v) = payload.state_code {
        cli.state_code = v;
    }
    if let Some(v) = payload.monthly_expense {
        cli.monthly_expense = v;
    }
    if let Some(v) = payload.tax_deferred_balance {
        cli.tax_deferred_balance = v;
    }
    if let Some(v) = payload.after_tax_balance {
        cli.after_tax_balance = v;
    }

    build_profile(cli)
}

#[cfg(test)]
fn profile_from_json(json: &str) -> Result<HouseholdProfile, String> {
    let payload = serde_json::from_str::<RetirementPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    profile_from_payload(payload)
}

fn build_retirement_response(
    profile: &HouseholdProfile,
    outcomes: ScenarioOutcomes,
) -> RetirementResponse {
    let assumptions = Scenario::ALL
        .iter()
        .map(|scenario| {
            let params = scenario.params();
            ScenarioAssumptions {
                scenario: scenario.name(),
                asset_growth_rate: params.asset_growth_rate,
                inflation_rate: params.inflation_rate,
                savings_rate: params.savings_rate,
            }
        })
        .collect();

    RetirementResponse {
        age_conservative: outcomes.conservative,
        age_normal: outcomes.normal,
        age_optimistic: outcomes.optimistic,
        user_age: profile.user_age,
        spouse_age: profile.spouse_age,
        state_code: profile.state_code.clone(),
        monthly_expense: profile.monthly_expense_today,
        tax_deferred_balance: profile.tax_deferred_balance,
        after_tax_balance: profile.after_tax_balance,
        assumptions,
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route(
            "/api/retirement",
            get(retirement_get_handler).post(retirement_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("glidepath HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    "glidepath retirement API: GET or POST /api/retirement"
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn retirement_get_handler(Query(payload): Query<RetirementPayload>) -> Response {
    retirement_handler_impl(payload).await
}

async fn retirement_post_handler(Json(payload): Json<RetirementPayload>) -> Response {
    retirement_handler_impl(payload).await
}

async fn retirement_handler_impl(payload: RetirementPayload) -> Response {
    let profile = match profile_from_payload(payload) {
        Ok(profile) => profile,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let outcomes = evaluate_household(&profile);
    json_response(StatusCode::OK, build_retirement_response(&profile, outcomes))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn build_profile_uppercases_and_trims_state_code() {
        let mut cli = sample_cli();
        cli.state_code = " tx ".to_string();

        let profile = build_profile(cli).expect("valid profile");
        assert_eq!(profile.state_code, "TX");
    }

    #[test]
    fn build_profile_rejects_zero_user_age() {
        let mut cli = sample_cli();
        cli.user_age = 0;

        let err = build_profile(cli).expect_err("must reject zero age");
        assert!(err.contains("--user-age"));
    }

    #[test]
    fn build_profile_rejects_zero_spouse_age() {
        let mut cli = sample_cli();
        cli.spouse_age = Some(0);

        let err = build_profile(cli).expect_err("must reject zero spouse age");
        assert!(err.contains("--spouse-age"));
    }

    #[test]
    fn build_profile_rejects_negative_balances() {
        let mut cli = sample_cli();
        cli.tax_deferred_balance = -1.0;
        let err = build_profile(cli).expect_err("must reject negative balance");
        assert!(err.contains("--tax-deferred-balance"));

        let mut cli = sample_cli();
        cli.after_tax_balance = f64::NAN;
        let err = build_profile(cli).expect_err("must reject non-finite balance");
        assert!(err.contains("--after-tax-balance"));
    }

    #[test]
    fn build_profile_rejects_negative_monthly_expense() {
        let mut cli = sample_cli();
        cli.monthly_expense = -100.0;

        let err = build_profile(cli).expect_err("must reject negative expense");
        assert!(err.contains("--monthly-expense"));
    }

    #[test]
    fn build_profile_rejects_blank_state_code() {
        let mut cli = sample_cli();
        cli.state_code = "   ".to_string();

        let err = build_profile(cli).expect_err("must reject blank state");
        assert!(err.contains("--state-code"));
    }

    #[test]
    fn profile_from_json_parses_camel_case_keys() {
        let json = r#"{
          "userAge": 52,
          "spouseAge": 49,
          "stateCode": "ny",
          "monthlyExpense": 5200,
          "taxDeferredBalance": 400000,
          "afterTaxBalance": 150000
        }"#;
        let profile = profile_from_json(json).expect("json should parse");

        assert_eq!(profile.user_age, 52);
        assert_eq!(profile.spouse_age, Some(49));
        assert_eq!(profile.state_code, "NY");
        assert_approx(profile.monthly_expense_today, 5_200.0);
        assert_approx(profile.tax_deferred_balance, 400_000.0);
        assert_approx(profile.after_tax_balance, 150_000.0);
    }

    #[test]
    fn profile_from_json_accepts_snake_case_and_short_aliases() {
        let json = r#"{
          "user_age": 33,
          "state": "wa",
          "monthly_expense": 2800,
          "tax_deferred": 60000,
          "after_tax": 25000
        }"#;
        let profile = profile_from_json(json).expect("json should parse");

        assert_eq!(profile.user_age, 33);
        assert_eq!(profile.spouse_age, None);
        assert_eq!(profile.state_code, "WA");
        assert_approx(profile.monthly_expense_today, 2_800.0);
        assert_approx(profile.tax_deferred_balance, 60_000.0);
        assert_approx(profile.after_tax_balance, 25_000.0);
    }

    #[test]
    fn profile_from_json_fills_missing_fields_with_defaults() {
        let profile = profile_from_json("{}").expect("empty payload should use defaults");

        assert_eq!(profile.user_age, 45);
        assert_eq!(profile.spouse_age, None);
        assert_eq!(profile.state_code, "CA");
        assert_approx(profile.tax_deferred_balance, 250_000.0);
        assert_approx(profile.after_tax_balance, 100_000.0);
        assert_approx(profile.monthly_expense_today, 4_000.0);
    }

    #[test]
    fn profile_from_json_rejects_invalid_values_with_parameter_name() {
        let err = profile_from_json(r#"{"userAge": 0}"#).expect_err("must reject zero age");
        assert!(err.contains("--user-age"));

        let err = profile_from_json(r#"{"monthlyExpense": -5}"#)
            .expect_err("must reject negative expense");
        assert!(err.contains("--monthly-expense"));
    }

    #[test]
    fn retirement_response_serialization_contains_expected_fields() {
        let profile = HouseholdProfile {
            user_age: 60,
            spouse_age: None,
            tax_deferred_balance: 0.0,
            after_tax_balance: 0.0,
            state_code: "TX".to_string(),
            monthly_expense_today: 3_000.0,
        };
        let outcomes = evaluate_household(&profile);
        let response = build_retirement_response(&profile, outcomes);
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"ageConservative\""));
        assert!(json.contains("\"ageNormal\""));
        assert!(json.contains("\"ageOptimistic\""));
        assert!(json.contains("\"assumptions\""));
        assert!(json.contains("\"conservative\""));
        assert!(json.contains("\"savingsRate\""));
    }

    #[test]
    fn infeasible_outcomes_serialize_as_null() {
        let profile = HouseholdProfile {
            user_age: 60,
            spouse_age: None,
            tax_deferred_balance: 0.0,
            after_tax_balance: 0.0,
            state_code: "TX".to_string(),
            monthly_expense_today: 3_000.0,
        };
        let outcomes = evaluate_household(&profile);
        let response = build_retirement_response(&profile, outcomes);
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"ageConservative\":null"));
        assert!(json.contains("\"ageNormal\":null"));
        assert!(json.contains("\"ageOptimistic\":null"));
    }

    #[test]
    fn wealthy_profile_reports_the_user_age_for_every_scenario() {
        let profile = HouseholdProfile {
            user_age: 60,
            spouse_age: None,
            tax_deferred_balance: 50_000_000.0,
            after_tax_balance: 50_000_000.0,
            state_code: "TX".to_string(),
            monthly_expense_today: 2_000.0,
        };
        let outcomes = evaluate_household(&profile);

        assert_eq!(outcomes.conservative, Some(60));
        assert_eq!(outcomes.normal, Some(60));
        assert_eq!(outcomes.optimistic, Some(60));
    }
}
