//! Integration tests for the payroll engine.
//!
//! This test suite covers:
//! - Daily income tax and local tax through the summary endpoint
//! - Employment insurance and net pay
//! - Same-day record merging in date groups
//! - Grand totals across workers
//! - Day-by-day worker totals and time-versioned rates
//! - Holiday classification
//! - Error cases
//! - Property tests for the calculation invariants

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/rates.yaml").expect("Failed to load config");
    AppState::from_config(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

fn create_record(id: &str, date: &str, hours: u32, wage: u32) -> Value {
    json!({
        "id": id,
        "work_date": date,
        "hours": hours,
        "daily_wage": wage,
    })
}

fn create_worker(worker_id: &str, name: &str, records: Vec<Value>) -> Value {
    json!({
        "worker_id": worker_id,
        "name": name,
        "records": records,
    })
}

/// Reads a decimal field that may be serialized as a string or number.
fn field(value: &Value, path: &[&str]) -> Decimal {
    let mut current = value;
    for key in path {
        current = &current[*key];
    }
    match current {
        Value::String(s) => decimal(s),
        Value::Number(n) => decimal(&n.to_string()),
        other => panic!("Expected a decimal at {:?}, got {}", path, other),
    }
}

// =============================================================================
// SECTION 1: Income Tax and Local Tax
// =============================================================================

#[tokio::test]
async fn test_wage_200000_taxes_1350_and_135() {
    let router = create_router_for_test();
    let body = json!({
        "workers": [create_worker("w1", "Kim", vec![create_record("r1", "2025-03-04", 8, 200000)])]
    });

    let (status, result) = post(router, "/payroll/summary", body).await;

    assert_eq!(status, StatusCode::OK);
    let subtotal = &result["workers"][0]["subtotal"];
    assert_eq!(field(subtotal, &["total_income_tax"]), decimal("1350"));
    assert_eq!(field(subtotal, &["total_local_tax"]), decimal("135"));
    assert_eq!(field(subtotal, &["total_employment_insurance"]), decimal("1800"));
}

#[tokio::test]
async fn test_wage_at_daily_deduction_is_untaxed() {
    let router = create_router_for_test();
    let body = json!({
        "workers": [create_worker("w1", "Kim", vec![create_record("r1", "2025-03-04", 8, 150000)])]
    });

    let (_, result) = post(router, "/payroll/summary", body).await;

    assert_eq!(
        field(&result, &["grand_total", "total_income_tax"]),
        Decimal::ZERO
    );
}

#[tokio::test]
async fn test_minimum_tax_boundary() {
    let router = create_router_for_test();
    // 187,000 taxes 999 (not collected); 187,038 taxes 1,000
    let body = json!({
        "workers": [
            create_worker("w1", "Kim", vec![create_record("r1", "2025-03-04", 8, 187000)]),
            create_worker("w2", "Lee", vec![create_record("r2", "2025-03-04", 8, 187038)]),
        ]
    });

    let (_, result) = post(router, "/payroll/summary", body).await;

    assert_eq!(
        field(&result["workers"][0], &["subtotal", "total_income_tax"]),
        Decimal::ZERO
    );
    assert_eq!(
        field(&result["workers"][1], &["subtotal", "total_income_tax"]),
        decimal("1000")
    );
}

// =============================================================================
// SECTION 2: Employment Insurance and Net Pay
// =============================================================================

#[tokio::test]
async fn test_wage_100000_only_employment_insurance() {
    let router = create_router_for_test();
    let body = json!({
        "workers": [create_worker("w1", "Kim", vec![create_record("r1", "2025-03-04", 8, 100000)])]
    });

    let (_, result) = post(router, "/payroll/summary", body).await;
    let subtotal = &result["workers"][0]["subtotal"];

    assert_eq!(field(subtotal, &["total_income_tax"]), Decimal::ZERO);
    assert_eq!(field(subtotal, &["total_local_tax"]), Decimal::ZERO);
    assert_eq!(field(subtotal, &["total_employment_insurance"]), decimal("900"));
    assert_eq!(field(subtotal, &["total_net_pay"]), decimal("99100"));
}

#[tokio::test]
async fn test_precomputed_contributions_are_deducted() {
    let router = create_router_for_test();
    let body = json!({
        "workers": [create_worker("w1", "Kim", vec![json!({
            "id": "r1",
            "work_date": "2025-03-04",
            "daily_wage": 200000,
            "national_pension": 9000,
            "health_insurance": "7090",
            "long_term_care": 918,
            "industrial_accident": null,
        })])]
    });

    let (_, result) = post(router, "/payroll/summary", body).await;
    let subtotal = &result["workers"][0]["subtotal"];

    // 1,350 + 135 + 9,000 + 7,090 + 1,800 + 0 + 918
    assert_eq!(field(subtotal, &["total_deduction"]), decimal("20293"));
    assert_eq!(field(subtotal, &["total_net_pay"]), decimal("179707"));
}

// =============================================================================
// SECTION 3: Date Groups
// =============================================================================

#[tokio::test]
async fn test_same_day_records_merge_with_recomputed_deductions() {
    let router = create_router_for_test();
    let body = json!({
        "workers": [create_worker("w1", "Kim", vec![
            create_record("r1", "2025-03-04", 4, 75000),
            create_record("r2", "2025-03-04", 4, 75000),
        ])]
    });

    let (_, result) = post(router, "/payroll/summary", body).await;

    let groups = result["date_groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    let entry = &groups[0]["workers"][0];
    assert_eq!(field(entry, &["record", "hours"]), decimal("8"));
    assert_eq!(field(entry, &["record", "daily_wage"]), decimal("150000"));
    assert_eq!(field(entry, &["total_deduction"]), decimal("1350"));
    assert_eq!(groups[0]["has_unpaid"], true);
}

#[tokio::test]
async fn test_date_groups_ordered_and_paid_excluded_from_unpaid() {
    let router = create_router_for_test();
    let mut paid = create_record("r3", "2025-03-04", 8, 200000);
    paid["status"] = json!("paid");
    let body = json!({
        "workers": [
            create_worker("w1", "Kim", vec![create_record("r1", "2025-03-05", 8, 100000)]),
            create_worker("w2", "Lee", vec![paid]),
        ]
    });

    let (_, result) = post(router, "/payroll/summary", body).await;
    let groups = result["date_groups"].as_array().unwrap();

    assert_eq!(groups[0]["label"], "3월 4일");
    assert_eq!(groups[0]["has_unpaid"], false);
    assert_eq!(field(&groups[0], &["unpaid_net_amount"]), Decimal::ZERO);
    assert_eq!(groups[1]["label"], "3월 5일");
    assert_eq!(field(&groups[1], &["unpaid_net_amount"]), decimal("99100"));
}

// =============================================================================
// SECTION 4: Grand Total
// =============================================================================

#[tokio::test]
async fn test_grand_total_sums_worker_subtotals() {
    let router = create_router_for_test();
    let body = json!({
        "workers": [
            create_worker("w1", "Kim", vec![
                create_record("r1", "2025-03-04", 8, 200000),
                create_record("r2", "2025-03-05", 8, 180000),
            ]),
            create_worker("w2", "Lee", vec![create_record("r3", "2025-03-04", 8, 120000)]),
        ]
    });

    let (_, result) = post(router, "/payroll/summary", body).await;

    let grand = &result["grand_total"];
    assert_eq!(grand["total_workers"], 2);
    assert_eq!(grand["total_days"], 3);

    for key in ["total_wage", "total_deduction", "total_net_pay", "total_income_tax"] {
        let summed: Decimal = result["workers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|w| field(w, &["subtotal", key]))
            .sum();
        assert_eq!(field(grand, &[key]), summed, "{key} should be additive");
    }
}

// =============================================================================
// SECTION 5: Worker Totals and Time-Versioned Rates
// =============================================================================

#[tokio::test]
async fn test_worker_totals_use_rates_for_as_of_date() {
    let records = vec![create_record("r1", "2025-12-30", 8, 200000)];

    let (_, result_2025) = post(
        create_router_for_test(),
        "/payroll/worker-totals",
        json!({ "records": records.clone() }),
    )
    .await;
    let (_, result_2026) = post(
        create_router_for_test(),
        "/payroll/worker-totals",
        json!({ "as_of": "2026-01-05", "records": records }),
    )
    .await;

    assert_eq!(
        field(&result_2025, &["totals", "national_pension"]),
        decimal("9000")
    );
    assert_eq!(
        field(&result_2026, &["totals", "national_pension"]),
        decimal("9500")
    );
}

#[tokio::test]
async fn test_rates_endpoint_switches_on_effective_date() {
    let (status, before) = get(create_router_for_test(), "/rates?date=2025-12-31").await;
    let (_, after) = get(create_router_for_test(), "/rates?date=2026-01-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&before, &["rates", "health_insurance_rate"]), decimal("0.03545"));
    assert_eq!(field(&after, &["rates", "health_insurance_rate"]), decimal("0.03595"));
}

// =============================================================================
// SECTION 6: Holidays
// =============================================================================

#[tokio::test]
async fn test_childrens_day_2025_is_a_holiday() {
    let (status, result) = get(create_router_for_test(), "/calendar?month=2025-05").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["days_in_month"], 31);
    assert_eq!(result["days"][4]["is_holiday"], true);
    assert_eq!(result["days"][6]["is_holiday"], false);
}

// =============================================================================
// SECTION 7: Error Cases
// =============================================================================

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let router = create_router_for_test();
    let (status, result) = send(
        router,
        Request::builder()
            .method("POST")
            .uri("/payroll/summary")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_bad_numeric_input_is_treated_as_zero() {
    let router = create_router_for_test();
    let body = json!({
        "workers": [create_worker("w1", "Kim", vec![json!({
            "work_date": "2025-03-04",
            "daily_wage": "not a number",
        })])]
    });

    let (status, result) = post(router, "/payroll/summary", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&result, &["grand_total", "total_wage"]), Decimal::ZERO);
    assert_eq!(field(&result, &["grand_total", "total_net_pay"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_invalid_rate_date_returns_400() {
    let (status, result) = get(create_router_for_test(), "/rates?date=03/04/2025").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "INVALID_DATE");
}

// =============================================================================
// SECTION 8: Properties
// =============================================================================

mod properties {
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use payroll_engine::calculation::{
        NoOverride, calculate_grand_total, calculate_income_tax, calculate_net_pay,
        calculate_total_deduction, calculate_worker_subtotal,
    };
    use payroll_engine::config::PayrollRates;
    use payroll_engine::models::{WorkRecord, WorkerRecords, WorkerSubtotal};

    fn record(day: u32, wage: u32, allowances: u32, exemption: u32) -> WorkRecord {
        let mut r = WorkRecord::new(
            NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            Decimal::from(wage),
        );
        r.allowances = Decimal::from(allowances);
        r.tax_exemption = Decimal::from(exemption);
        r
    }

    fn record_strategy() -> impl Strategy<Value = WorkRecord> {
        (1u32..=28, 0u32..=1_000_000, 0u32..=200_000, 0u32..=200_000)
            .prop_map(|(day, wage, allowances, exemption)| {
                record(day, wage, allowances, exemption)
            })
    }

    fn workers_strategy() -> impl Strategy<Value = Vec<WorkerRecords>> {
        prop::collection::vec(prop::collection::vec(record_strategy(), 0..6), 0..6).prop_map(
            |lists| {
                lists
                    .into_iter()
                    .enumerate()
                    .map(|(i, records)| WorkerRecords {
                        worker_id: format!("w{i}"),
                        name: String::new(),
                        records,
                    })
                    .collect()
            },
        )
    }

    proptest! {
        /// Nothing is withheld at or below the daily income deduction.
        #[test]
        fn no_tax_at_or_below_deduction(wage in 0u32..=150_000) {
            prop_assert_eq!(calculate_income_tax(&record(4, wage, 0, 0)), Decimal::ZERO);
        }

        /// Income tax is never negative, whatever the exemption.
        #[test]
        fn income_tax_never_negative(r in record_strategy()) {
            prop_assert!(calculate_income_tax(&r) >= Decimal::ZERO);
        }

        /// Collected tax is either zero or at least the minimum.
        #[test]
        fn collected_tax_meets_minimum(r in record_strategy()) {
            let tax = calculate_income_tax(&r);
            prop_assert!(tax.is_zero() || tax >= Decimal::from(1000));
        }

        /// Net pay is gross pay less every deduction.
        #[test]
        fn net_pay_identity(r in record_strategy()) {
            prop_assert_eq!(
                calculate_net_pay(&r),
                r.daily_wage + r.allowances - calculate_total_deduction(&r)
            );
        }

        /// Recalculating the same input gives the same subtotal.
        #[test]
        fn subtotal_is_idempotent(records in prop::collection::vec(record_strategy(), 0..10)) {
            let rates = PayrollRates::default();
            prop_assert_eq!(
                calculate_worker_subtotal(&records, &NoOverride, &rates),
                calculate_worker_subtotal(&records, &NoOverride, &rates)
            );
        }

        /// The grand total is the field-wise sum of the subtotals.
        #[test]
        fn grand_total_is_additive(workers in workers_strategy()) {
            let rates = PayrollRates::default();
            let grand = calculate_grand_total(&workers, &NoOverride, &rates);

            let mut expected = WorkerSubtotal::default();
            for worker in &workers {
                expected += &calculate_worker_subtotal(&worker.records, &NoOverride, &rates);
            }
            prop_assert_eq!(grand.totals, expected);
            prop_assert_eq!(grand.total_workers, workers.len());
        }

        /// Worker order does not change the grand total.
        #[test]
        fn grand_total_is_order_independent(workers in workers_strategy()) {
            let rates = PayrollRates::default();
            let forward = calculate_grand_total(&workers, &NoOverride, &rates);
            let mut reversed = workers.clone();
            reversed.reverse();
            prop_assert_eq!(forward, calculate_grand_total(&reversed, &NoOverride, &rates));
        }
    }
}
