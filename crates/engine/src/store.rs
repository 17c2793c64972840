//! Backend selection for the query service.

use std::sync::Arc;

use sqlx::PgPool;

use cripto_common::error::AppError;
use cripto_common::types::{
    CoinAboveValue, CoinTotalValue, CoinValueAndCount, ContractNearMax, ContractValue,
    ExchangeContractCount, ExchangeWalletCount, WalletContractCount,
};

use crate::dataset::Dataset;
use crate::queries::QueryService;

/// Where queries are evaluated.
#[derive(Debug, Clone)]
pub enum QueryStore {
    /// SQL against a PostgreSQL pool.
    Postgres(PgPool),
    /// Evaluation over an immutable in-memory snapshot.
    Memory(Arc<Dataset>),
}

impl QueryStore {
    pub fn memory(dataset: Dataset) -> Self {
        QueryStore::Memory(Arc::new(dataset))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueryStore::Postgres(_) => "postgres",
            QueryStore::Memory(_) => "memory",
        }
    }

    pub async fn coins_above_value(&self, threshold: i64) -> Result<Vec<CoinAboveValue>, AppError> {
        match self {
            QueryStore::Postgres(pool) => QueryService::coins_above_value(pool, threshold).await,
            QueryStore::Memory(dataset) => Ok(dataset.coins_above_value(threshold)),
        }
    }

    pub async fn wallets_by_contract_count(
        &self,
        min_count: i64,
    ) -> Result<Vec<WalletContractCount>, AppError> {
        match self {
            QueryStore::Postgres(pool) => {
                QueryService::wallets_by_contract_count(pool, min_count).await
            }
            QueryStore::Memory(dataset) => Ok(dataset.wallets_by_contract_count(min_count)),
        }
    }

    pub async fn exchanges_by_wallet_count(&self) -> Result<Vec<ExchangeWalletCount>, AppError> {
        match self {
            QueryStore::Postgres(pool) => QueryService::exchanges_by_wallet_count(pool).await,
            QueryStore::Memory(dataset) => Ok(dataset.exchanges_by_wallet_count()),
        }
    }

    pub async fn exchanges_by_coin_count(&self) -> Result<Vec<ExchangeContractCount>, AppError> {
        match self {
            QueryStore::Postgres(pool) => QueryService::exchanges_by_coin_count(pool).await,
            QueryStore::Memory(dataset) => Ok(dataset.exchanges_by_coin_count()),
        }
    }

    pub async fn contract_value_ranking(&self) -> Result<Vec<ContractValue>, AppError> {
        match self {
            QueryStore::Postgres(pool) => QueryService::contract_value_ranking(pool).await,
            QueryStore::Memory(dataset) => Ok(dataset.contract_value_ranking()),
        }
    }

    pub async fn coin_total_value(&self) -> Result<Vec<CoinTotalValue>, AppError> {
        match self {
            QueryStore::Postgres(pool) => QueryService::coin_total_value(pool).await,
            QueryStore::Memory(dataset) => Ok(dataset.coin_total_value()),
        }
    }

    pub async fn coin_total_value_and_count(&self) -> Result<Vec<CoinValueAndCount>, AppError> {
        match self {
            QueryStore::Postgres(pool) => QueryService::coin_total_value_and_count(pool).await,
            QueryStore::Memory(dataset) => Ok(dataset.coin_total_value_and_count()),
        }
    }

    pub async fn exchange_total_value_ranking(
        &self,
    ) -> Result<Vec<CoinValueAndCount>, AppError> {
        match self {
            QueryStore::Postgres(pool) => QueryService::exchange_total_value_ranking(pool).await,
            QueryStore::Memory(dataset) => Ok(dataset.exchange_total_value_ranking()),
        }
    }

    pub async fn contracts_near_max_value(
        &self,
        percent_threshold: i64,
    ) -> Result<Vec<ContractNearMax>, AppError> {
        match self {
            QueryStore::Postgres(pool) => {
                QueryService::contracts_near_max_value(pool, percent_threshold).await
            }
            QueryStore::Memory(dataset) => dataset.contracts_near_max_value(percent_threshold),
        }
    }
}
