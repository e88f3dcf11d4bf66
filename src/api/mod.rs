use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    AssumptionSet, DEFAULT_ASSUMPTIONS, MAX_AGE, MAX_RATE_PCT, PlanResult, Trajectory,
    TrajectoryPoint, compute, first_crossover_age, funding_progress_pct, required_monthly_savings, required_savings_exact,
};
use crate::render::{format_inr, format_percent};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "fireplan",
    about = "FIRE number, required monthly savings and SIP projection calculator"
)]
pub struct Cli {
    #[arg(long, default_value_t = DEFAULT_ASSUMPTIONS.current_age)]
    pub current_age: u32,
    #[arg(long, default_value_t = DEFAULT_ASSUMPTIONS.retirement_age)]
    pub retirement_age: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_ASSUMPTIONS.monthly_expenses,
        help = "Monthly expenses in today's money"
    )]
    pub monthly_expenses: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_ASSUMPTIONS.monthly_investment,
        help = "Monthly SIP contribution"
    )]
    pub monthly_investment: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_ASSUMPTIONS.investment_return_rate,
        help = "Expected annual return in percent, e.g. 12"
    )]
    pub investment_return_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_ASSUMPTIONS.inflation_rate,
        help = "Expected annual inflation in percent, e.g. 6"
    )]
    pub inflation_rate: f64,
    #[arg(long, help = "Print the savings trajectory for every year of age")]
    pub trajectory: bool,
    #[arg(long, help = "Print the full plan as JSON instead of a report")]
    pub json: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    monthly_expenses: Option<f64>,
    monthly_investment: Option<f64>,
    investment_return_rate: Option<f64>,
    inflation_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RequiredSavingsPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    target_amount: Option<f64>,
    investment_return_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub assumptions: AssumptionSet,
    pub result: PlanResult,
    pub required_savings_exact: Option<f64>,
    pub funding_progress_pct: Option<f64>,
    pub crossover_age: Option<u32>,
    pub trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequiredSavingsResponse {
    monthly_savings: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_assumptions(cli: &Cli) -> Result<AssumptionSet, String> {
    let assumptions = AssumptionSet {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        monthly_expenses: cli.monthly_expenses,
        monthly_investment: cli.monthly_investment,
        investment_return_rate: cli.investment_return_rate,
        inflation_rate: cli.inflation_rate,
    };
    assumptions.validate().map_err(|e| e.to_string())?;
    Ok(assumptions)
}

pub fn build_plan_response(assumptions: &AssumptionSet) -> PlanResponse {
    let result = compute(assumptions);
    let trajectory: Vec<TrajectoryPoint> = Trajectory::new(assumptions).collect();
    PlanResponse {
        assumptions: *assumptions,
        result,
        required_savings_exact: required_savings_exact(assumptions, result.fire).ok(),
        funding_progress_pct: funding_progress_pct(assumptions, &result),
        crossover_age: first_crossover_age(trajectory.iter().copied()),
        trajectory,
    }
}

pub fn run_cli(cli: Cli) -> Result<(), String> {
    let assumptions = build_assumptions(&cli)?;
    let response = build_plan_response(&assumptions);
    if cli.json {
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("Failed to encode plan as JSON: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", render_report(&response, cli.trajectory));
    }
    Ok(())
}

pub fn render_report(response: &PlanResponse, with_trajectory: bool) -> String {
    let a = &response.assumptions;
    let r = &response.result;
    let sip = &r.sip_returns;
    let required_exact = response
        .required_savings_exact
        .map(format_inr)
        .unwrap_or_else(|| "n/a".to_string());
    let progress = response
        .funding_progress_pct
        .map(|p| format!(" ({} of target)", format_percent(p, 1)))
        .unwrap_or_default();

    let mut lines = vec![
        format!(
            "FIRE plan: age {} -> {} ({} months)",
            a.current_age, a.retirement_age, r.total_months
        ),
        format!(
            "Annual expenses: {} today, {} at retirement ({} inflation)",
            format_inr(r.current_annual_expenses),
            format_inr(r.future_annual_expenses),
            format_percent(r.inflation_rate, 1)
        ),
        format!("  Lean FIRE  {}", format_inr(r.lean_fire)),
        format!("  FIRE       {}", format_inr(r.fire)),
        format!("  Fat FIRE   {}", format_inr(r.fat_fire)),
        format!(
            "Required monthly investment: {required_exact} ({} with 20% buffer)",
            format_inr(r.monthly_savings_required)
        ),
        format!(
            "Current monthly investment:  {}{progress}",
            format_inr(a.monthly_investment)
        ),
        "SIP returns:".to_string(),
        format!("  Future value      {}", format_inr(sip.future_value)),
        format!("  Total investment  {}", format_inr(sip.total_investment)),
        format!("  Total returns     {}", format_inr(sip.total_returns)),
        format!("  Absolute return   {}", format_percent(sip.absolute_return, 2)),
        format!(
            "  IRR               {}{}",
            format_percent(sip.irr, 2),
            if sip.irr_converged { "" } else { " (not converged)" }
        ),
        match response.crossover_age {
            Some(age) => format!("On track: projected to reach the FIRE number at age {age}."),
            None => "Off track: the current investment may not reach the FIRE number before retirement."
                .to_string(),
        },
    ];

    if with_trajectory {
        lines.push(format!("{:>4}  {:>18}  {:>18}", "Age", "Required", "Projected"));
        lines.extend(response.trajectory.iter().map(|point| {
            format!(
                "{:>4}  {:>18}  {:>18}",
                point.age,
                format_inr(point.required_savings),
                format_inr(point.projected_savings)
            )
        }));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .route(
            "/api/required-savings",
            get(required_savings_get_handler).post(required_savings_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("fireplan HTTP API bound to {addr}");
    println!("FIRE plan HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/plan");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    plan_handler_impl(payload)
}

async fn plan_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    plan_handler_impl(payload)
}

async fn required_savings_get_handler(Query(payload): Query<RequiredSavingsPayload>) -> Response {
    required_savings_handler_impl(payload)
}

async fn required_savings_post_handler(Json(payload): Json<RequiredSavingsPayload>) -> Response {
    required_savings_handler_impl(payload)
}

fn plan_handler_impl(payload: PlanPayload) -> Response {
    let assumptions = match assumptions_from_payload(payload) {
        Ok(assumptions) => assumptions,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    debug!("plan request: {assumptions:?}");
    json_response(StatusCode::OK, build_plan_response(&assumptions))
}

fn required_savings_handler_impl(payload: RequiredSavingsPayload) -> Response {
    let defaults = compute(&DEFAULT_ASSUMPTIONS);
    let current_age = payload.current_age.unwrap_or(DEFAULT_ASSUMPTIONS.current_age);
    let retirement_age = payload
        .retirement_age
        .unwrap_or(DEFAULT_ASSUMPTIONS.retirement_age);
    let target_amount = payload.target_amount.unwrap_or(defaults.fire);
    let rate = payload
        .investment_return_rate
        .unwrap_or(DEFAULT_ASSUMPTIONS.investment_return_rate);

    if !target_amount.is_finite() || target_amount < 0.0 {
        return error_response(StatusCode::BAD_REQUEST, "targetAmount must be >= 0");
    }
    if !rate.is_finite() || rate <= 0.0 {
        return error_response(StatusCode::BAD_REQUEST, "investmentReturnRate must be > 0");
    }
    if rate > MAX_RATE_PCT {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("investmentReturnRate must be <= {MAX_RATE_PCT}"),
        );
    }
    if current_age > MAX_AGE || retirement_age > MAX_AGE {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("currentAge and retirementAge must be <= {MAX_AGE}"),
        );
    }
    match required_monthly_savings(current_age, retirement_age, target_amount, rate) {
        Ok(monthly_savings) => {
            json_response(StatusCode::OK, RequiredSavingsResponse { monthly_savings })
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
fn assumptions_from_json(json: &str) -> Result<AssumptionSet, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    assumptions_from_payload(payload)
}

fn assumptions_from_payload(payload: PlanPayload) -> Result<AssumptionSet, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.monthly_expenses {
        cli.monthly_expenses = v;
    }
    if let Some(v) = payload.monthly_investment {
        cli.monthly_investment = v;
    }
    if let Some(v) = payload.investment_return_rate {
        cli.investment_return_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }

    build_assumptions(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: DEFAULT_ASSUMPTIONS.current_age,
        retirement_age: DEFAULT_ASSUMPTIONS.retirement_age,
        monthly_expenses: DEFAULT_ASSUMPTIONS.monthly_expenses,
        monthly_investment: DEFAULT_ASSUMPTIONS.monthly_investment,
        investment_return_rate: DEFAULT_ASSUMPTIONS.investment_return_rate,
        inflation_rate: DEFAULT_ASSUMPTIONS.inflation_rate,
        trajectory: false,
        json: false,
    }
}
