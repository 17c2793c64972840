//! Analytical query routes.
//!
//! Each query has its own route so its parameter is typed; unknown ids fall
//! through to a JSON 404.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use cripto_common::error::AppError;
use cripto_common::types::{
    CoinAboveValue, CoinTotalValue, CoinValueAndCount, ContractNearMax, ContractValue,
    ExchangeContractCount, ExchangeWalletCount, QueryResponse, WalletContractCount,
};
use cripto_engine::catalog::{QueryId, QueryInfo};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/query", get(list_queries))
        .route("/api/query/1", get(coins_above_value))
        .route("/api/query/2", get(wallets_by_contract_count))
        .route("/api/query/3", get(exchanges_by_wallet_count))
        .route("/api/query/4", get(exchanges_by_coin_count))
        .route("/api/query/5", get(contract_value_ranking))
        .route("/api/query/6", get(coin_total_value))
        .route("/api/query/7", get(coin_total_value_and_count))
        .route("/api/query/8", get(exchange_total_value_ranking))
        .route("/api/query/9", get(contracts_near_max_value))
        .route("/api/query/{id}", get(unknown_query))
}

/// Query string of query 1.
#[derive(Debug, Default, Deserialize)]
pub struct CoinsAboveValueParams {
    #[serde(rename = "valorActual", alias = "ValorActual", alias = "valoractual")]
    pub valor_actual: Option<i64>,
}

/// Query string of query 2.
#[derive(Debug, Default, Deserialize)]
pub struct WalletsByContractCountParams {
    #[serde(rename = "valorMonedas", alias = "ValorMonedas", alias = "valormonedas")]
    pub valor_monedas: Option<i64>,
}

/// Query string of query 9.
#[derive(Debug, Default, Deserialize)]
pub struct ContractsNearMaxParams {
    #[serde(
        rename = "valorPorcentaje",
        alias = "ValorPorcentaje",
        alias = "valorporcentaje"
    )]
    pub valor_porcentaje: Option<i64>,
}

type QueryResult<T> = Result<Json<QueryResponse<T>>, AppError>;

/// Unwrap a query-string extraction, turning a malformed value into a 400.
fn params<T>(extracted: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    extracted
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Wrap rows in the response envelope.
fn respond<T: Serialize>(state: &AppState, query: QueryId, values: Vec<T>) -> QueryResult<T> {
    tracing::debug!(
        query_id = query.number(),
        rows = values.len(),
        store = state.store.kind(),
        "Query executed"
    );

    Ok(Json(QueryResponse {
        query_id: query.number(),
        description: query.description().to_string(),
        values,
    }))
}

/// GET /api/query — List the available queries with their parameters and defaults.
async fn list_queries(State(state): State<AppState>) -> Json<Vec<QueryInfo>> {
    Json(QueryId::catalog(&state.defaults))
}

/// GET /api/query/1?valorActual=50 — Coins currently worth more than `valorActual`.
async fn coins_above_value(
    State(state): State<AppState>,
    query: Result<Query<CoinsAboveValueParams>, QueryRejection>,
) -> QueryResult<CoinAboveValue> {
    let threshold = params(query)?
        .valor_actual
        .unwrap_or(state.defaults.valor_actual);
    let rows = state.store.coins_above_value(threshold).await?;
    respond(&state, QueryId::CoinsAboveValue, rows)
}

/// GET /api/query/2?valorMonedas=2 — Wallets holding more than `valorMonedas` contracts.
async fn wallets_by_contract_count(
    State(state): State<AppState>,
    query: Result<Query<WalletsByContractCountParams>, QueryRejection>,
) -> QueryResult<WalletContractCount> {
    let min_count = params(query)?
        .valor_monedas
        .unwrap_or(state.defaults.valor_monedas);
    let rows = state.store.wallets_by_contract_count(min_count).await?;
    respond(&state, QueryId::WalletsByContractCount, rows)
}

/// GET /api/query/3 — Exchanges by number of wallets.
async fn exchanges_by_wallet_count(
    State(state): State<AppState>,
) -> QueryResult<ExchangeWalletCount> {
    let rows = state.store.exchanges_by_wallet_count().await?;
    respond(&state, QueryId::ExchangesByWalletCount, rows)
}

/// GET /api/query/4 — Contract count of each wallet, grouped by exchange.
async fn exchanges_by_coin_count(
    State(state): State<AppState>,
) -> QueryResult<ExchangeContractCount> {
    let rows = state.store.exchanges_by_coin_count().await?;
    respond(&state, QueryId::ExchangesByCoinCount, rows)
}

/// GET /api/query/5 — Contracts ranked by current value.
async fn contract_value_ranking(State(state): State<AppState>) -> QueryResult<ContractValue> {
    let rows = state.store.contract_value_ranking().await?;
    respond(&state, QueryId::ContractValueRanking, rows)
}

/// GET /api/query/6 — Coins ranked by their total value across contracts.
async fn coin_total_value(State(state): State<AppState>) -> QueryResult<CoinTotalValue> {
    let rows = state.store.coin_total_value().await?;
    respond(&state, QueryId::CoinTotalValueAcrossContracts, rows)
}

/// GET /api/query/7 — Coins with total value and contract count, ranked by count.
async fn coin_total_value_and_count(
    State(state): State<AppState>,
) -> QueryResult<CoinValueAndCount> {
    let rows = state.store.coin_total_value_and_count().await?;
    respond(&state, QueryId::CoinTotalValueAndCount, rows)
}

/// GET /api/query/8 — Returns the query 7 aggregation under its own id.
async fn exchange_total_value_ranking(
    State(state): State<AppState>,
) -> QueryResult<CoinValueAndCount> {
    let rows = state.store.exchange_total_value_ranking().await?;
    respond(&state, QueryId::ExchangeTotalValueRanking, rows)
}

/// GET /api/query/9?valorPorcentaje=90 — Contracts whose coin is above `valorPorcentaje`% of its maximum.
async fn contracts_near_max_value(
    State(state): State<AppState>,
    query: Result<Query<ContractsNearMaxParams>, QueryRejection>,
) -> QueryResult<ContractNearMax> {
    let threshold = params(query)?
        .valor_porcentaje
        .unwrap_or(state.defaults.valor_porcentaje);
    let rows = state.store.contracts_near_max_value(threshold).await?;
    respond(&state, QueryId::ContractsNearMaxValue, rows)
}

/// GET /api/query/:id — Any id without a dedicated route.
async fn unknown_query(Path(id): Path<String>) -> AppError {
    match id.parse::<QueryId>() {
        Ok(query) => AppError::NotFound(format!(
            "Query '{}' does not exist, did you mean /api/query/{}?",
            id,
            query.number()
        )),
        Err(err) => err,
    }
}
