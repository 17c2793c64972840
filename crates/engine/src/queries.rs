//! Query service — the nine analytical queries as hand-written SQL.
//!
//! Text sort keys use the `"C"` collation so ordering is byte-wise and
//! independent of the database locale.

use sqlx::PgPool;

use cripto_common::error::AppError;
use cripto_common::types::{
    CoinAboveValue, CoinTotalValue, CoinValueAndCount, ContractNearMax, ContractValue,
    ExchangeContractCount, ExchangeWalletCount, WalletContractCount,
};

/// Service layer for the PostgreSQL-backed queries.
pub struct QueryService;

/// Query 9 row before the zero-maximum check; `percentage` is NULL when the maximum is zero.
#[derive(Debug, sqlx::FromRow)]
struct NearMaxRow {
    coin_id: String,
    contract: String,
    max_value: f64,
    current_value: f64,
    percentage: Option<f64>,
}

impl QueryService {
    /// Query 1: coins whose current value is above `threshold`.
    pub async fn coins_above_value(
        pool: &PgPool,
        threshold: i64,
    ) -> Result<Vec<CoinAboveValue>, AppError> {
        let rows: Vec<CoinAboveValue> = sqlx::query_as(
            r#"
            SELECT coin_id, max_value, current_value
            FROM coins
            WHERE current_value > $1
            ORDER BY coin_id COLLATE "C"
            "#,
        )
        .bind(threshold as f64)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Query 2: wallets holding more than `min_count` contracts.
    pub async fn wallets_by_contract_count(
        pool: &PgPool,
        min_count: i64,
    ) -> Result<Vec<WalletContractCount>, AppError> {
        let rows: Vec<WalletContractCount> = sqlx::query_as(
            r#"
            SELECT w.wallet_id, COUNT(k.contract_id) AS contract_count
            FROM wallets w
            LEFT JOIN contracts k ON k.wallet_id = w.wallet_id
            GROUP BY w.wallet_id
            HAVING COUNT(k.contract_id) > $1
            ORDER BY w.wallet_id
            "#,
        )
        .bind(min_count)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Query 3: number of wallets per exchange, largest first.
    pub async fn exchanges_by_wallet_count(
        pool: &PgPool,
    ) -> Result<Vec<ExchangeWalletCount>, AppError> {
        let rows: Vec<ExchangeWalletCount> = sqlx::query_as(
            r#"
            SELECT exchange, COUNT(*) AS wallet_count
            FROM wallets
            GROUP BY exchange
            ORDER BY wallet_count DESC, exchange COLLATE "C"
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Query 4: contract count of every wallet, clustered by exchange.
    pub async fn exchanges_by_coin_count(
        pool: &PgPool,
    ) -> Result<Vec<ExchangeContractCount>, AppError> {
        let rows: Vec<ExchangeContractCount> = sqlx::query_as(
            r#"
            SELECT w.exchange, COUNT(k.contract_id) AS contract_count
            FROM wallets w
            LEFT JOIN contracts k ON k.wallet_id = w.wallet_id
            GROUP BY w.wallet_id, w.exchange
            ORDER BY w.exchange COLLATE "C", w.wallet_id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Query 5: value of every contract, highest first.
    pub async fn contract_value_ranking(pool: &PgPool) -> Result<Vec<ContractValue>, AppError> {
        let rows: Vec<ContractValue> = sqlx::query_as(
            r#"
            SELECT k.coin_id,
                   k.coin_id || k.contract_id::text AS contract,
                   k.quantity * c.current_value AS value
            FROM contracts k
            JOIN coins c ON c.coin_id = k.coin_id
            ORDER BY value DESC, k.coin_id COLLATE "C", k.contract_id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Query 6: total contract value per coin, highest first.
    pub async fn coin_total_value(pool: &PgPool) -> Result<Vec<CoinTotalValue>, AppError> {
        let rows: Vec<CoinTotalValue> = sqlx::query_as(
            r#"
            SELECT k.coin_id, SUM(k.quantity * c.current_value) AS total_value
            FROM contracts k
            JOIN coins c ON c.coin_id = k.coin_id
            GROUP BY k.coin_id
            ORDER BY total_value DESC, k.coin_id COLLATE "C"
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Query 7: total contract value and contract count per coin, most contracts first.
    pub async fn coin_total_value_and_count(
        pool: &PgPool,
    ) -> Result<Vec<CoinValueAndCount>, AppError> {
        let rows: Vec<CoinValueAndCount> = sqlx::query_as(
            r#"
            SELECT k.coin_id,
                   SUM(k.quantity * c.current_value) AS total_value,
                   COUNT(*) AS contract_count
            FROM contracts k
            JOIN coins c ON c.coin_id = k.coin_id
            GROUP BY k.coin_id
            ORDER BY contract_count DESC, k.coin_id COLLATE "C"
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Query 8: currently the same aggregation as query 7, per coin rather than per exchange.
    pub async fn exchange_total_value_ranking(
        pool: &PgPool,
    ) -> Result<Vec<CoinValueAndCount>, AppError> {
        Self::coin_total_value_and_count(pool).await
    }

    /// Query 9: contracts whose coin trades above `percent_threshold` percent of its maximum.
    ///
    /// Rows over a zero maximum are always selected so the division can be
    /// reported instead of silently dropped.
    pub async fn contracts_near_max_value(
        pool: &PgPool,
        percent_threshold: i64,
    ) -> Result<Vec<ContractNearMax>, AppError> {
        let rows: Vec<NearMaxRow> = sqlx::query_as(
            r#"
            SELECT k.coin_id,
                   k.coin_id || k.contract_id::text AS contract,
                   c.max_value,
                   c.current_value,
                   c.current_value * 100 / NULLIF(c.max_value, 0) AS percentage
            FROM contracts k
            JOIN coins c ON c.coin_id = k.coin_id
            WHERE c.max_value = 0
               OR c.current_value * 100 / NULLIF(c.max_value, 0) > $1
            ORDER BY k.coin_id COLLATE "C", k.contract_id
            "#,
        )
        .bind(percent_threshold as f64)
        .fetch_all(pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let percentage = row.percentage.ok_or_else(|| {
                    AppError::Division(format!(
                        "coin {} has a maximum value of zero",
                        row.coin_id
                    ))
                })?;
                Ok(ContractNearMax {
                    coin_id: row.coin_id,
                    contract: row.contract,
                    max_value: row.max_value,
                    current_value: row.current_value,
                    percentage,
                })
            })
            .collect()
    }
}
