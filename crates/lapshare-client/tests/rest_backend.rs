//! RestBackend against a local stand-in for the marketplace backend

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use lapshare_client::{ClientConfig, RestBackend};
use lapshare_common::{
    CompensationStatus, CompensationStore, ContractStore, DepositStore, LapshareError,
    LifecycleError, NewCompensationTransaction, RecordId, Vnd,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TOKEN: &str = "staff-token";
const BEARER: &str = "Bearer staff-token";
const CONTRACT_ID: RecordId = 7;
const SETTLED_REPORT_ID: RecordId = 21;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(BEARER)
}

async fn contract(headers: HeaderMap, Path(id): Path<RecordId>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id != CONTRACT_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "id": CONTRACT_ID,
        "userId": 3,
        "itemId": 11,
        "itemValue": 15_000_000,
        "expectedReturnDate": "2024-06-01T00:00:00Z",
        "terms": "Return within 30 days"
    }))
    .into_response()
}

async fn deposits(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let body = match params.get("contractId").map(String::as_str) {
        Some("7") => json!([
            {"id": 4, "contractId": 7, "amount": 3_000_000, "depositDate": "2024-05-01T08:30:00Z"},
            {"id": 5, "contractId": 7, "amount": 1_000_000, "depositDate": "2024-05-02T08:30:00Z"}
        ]),
        _ => json!([]),
    };
    Json(body).into_response()
}

async fn compensations(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("reportDamageId").map(String::as_str) {
        Some("404") => StatusCode::NOT_FOUND.into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn create_compensation(headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if body["reportDamageId"] == json!(SETTLED_REPORT_ID) {
        return (StatusCode::CONFLICT, "compensation already exists").into_response();
    }
    body["id"] = json!(99);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/contracts/:id", get(contract))
        .route("/api/deposits", get(deposits))
        .route(
            "/api/compensations",
            get(compensations).post(create_compensation),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/api")
}

fn new_transaction(report_id: RecordId) -> NewCompensationTransaction {
    NewCompensationTransaction {
        contract_id: CONTRACT_ID,
        user_id: 3,
        report_damage_id: report_id,
        deposit_transaction_id: 4,
        compensation_amount: Vnd::new(800_000),
        used_deposit_amount: Vnd::new(500_000),
        extra_payment_required: Vnd::new(300_000),
        status: CompensationStatus::Done,
    }
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let base_url = spawn_backend().await;

    let backend = RestBackend::new(&ClientConfig::new(&base_url).with_token(TOKEN)).unwrap();
    let contract = backend.get_contract(CONTRACT_ID).await.unwrap().unwrap();
    assert_eq!(contract.id, CONTRACT_ID);
    assert_eq!(contract.item_value, Vnd::new(15_000_000));

    let anonymous = RestBackend::new(&ClientConfig::new(&base_url)).unwrap();
    let err = anonymous.get_contract(CONTRACT_ID).await.unwrap_err();
    assert!(matches!(err, LapshareError::Backend { status: 401, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_missing_records_are_none() {
    let base_url = spawn_backend().await;
    let backend = RestBackend::new(&ClientConfig::new(base_url).with_token(TOKEN)).unwrap();

    assert!(backend.get_contract(8).await.unwrap().is_none());
    assert!(backend.compensation_for_report(404).await.unwrap().is_none());
    assert!(backend.compensation_for_report(22).await.unwrap().is_none());
}

#[tokio::test]
async fn test_filtered_lookup_takes_first_record() {
    let base_url = spawn_backend().await;
    let backend = RestBackend::new(&ClientConfig::new(base_url).with_token(TOKEN)).unwrap();

    let deposit = backend
        .deposit_for_contract(CONTRACT_ID)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deposit.id, 4);
    assert_eq!(deposit.amount, Vnd::new(3_000_000));

    assert!(backend.deposit_for_contract(8).await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_compensation() {
    let base_url = spawn_backend().await;
    let backend = RestBackend::new(&ClientConfig::new(base_url).with_token(TOKEN)).unwrap();

    let created = backend.create_compensation(new_transaction(22)).await.unwrap();
    assert_eq!(created.id, 99);
    assert_eq!(created.report_damage_id, 22);
    assert_eq!(created.extra_payment_required, Vnd::new(300_000));
    assert_eq!(created.status, CompensationStatus::Done);
}

#[tokio::test]
async fn test_conflict_means_already_settled() {
    let base_url = spawn_backend().await;
    let backend = RestBackend::new(&ClientConfig::new(base_url).with_token(TOKEN)).unwrap();

    let err = backend
        .create_compensation(new_transaction(SETTLED_REPORT_ID))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LapshareError::Lifecycle(LifecycleError::AlreadySettled {
            report_id: SETTLED_REPORT_ID
        })
    ));
    assert!(!err.is_retryable());
}
