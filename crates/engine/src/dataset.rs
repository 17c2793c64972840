//! In-memory evaluation of the analytical queries.
//!
//! A [`Dataset`] is an immutable snapshot of coins, wallets and contracts,
//! validated on construction. Every query method mirrors the SQL in
//! [`crate::queries`], including its ordering and tie-breaks, so both stores
//! return the same rows for the same data.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use cripto_common::error::AppError;
use cripto_common::types::{
    Coin, CoinAboveValue, CoinTotalValue, CoinValueAndCount, Contract, ContractNearMax,
    ContractValue, ExchangeContractCount, ExchangeWalletCount, Wallet, WalletContractCount,
};

/// Serialized form of a dataset file.
#[derive(Debug, Deserialize)]
struct DatasetFile {
    coins: Vec<Coin>,
    wallets: Vec<Wallet>,
    contracts: Vec<Contract>,
}

/// Validated, read-only snapshot of the relational data.
#[derive(Debug, Clone)]
pub struct Dataset {
    coins: Vec<Coin>,
    wallets: Vec<Wallet>,
    contracts: Vec<Contract>,
    coin_index: HashMap<String, usize>,
}

impl Dataset {
    /// Build a dataset, checking ids are unique, references resolve and
    /// numeric fields are finite and non-negative.
    pub fn new(
        coins: Vec<Coin>,
        wallets: Vec<Wallet>,
        contracts: Vec<Contract>,
    ) -> Result<Self, AppError> {
        let mut coin_index = HashMap::with_capacity(coins.len());
        for (i, coin) in coins.iter().enumerate() {
            check_amount("coin", &coin.coin_id, "current_value", coin.current_value)?;
            check_amount("coin", &coin.coin_id, "max_value", coin.max_value)?;
            if coin_index.insert(coin.coin_id.clone(), i).is_some() {
                return Err(AppError::Validation(format!(
                    "Duplicate coin id '{}'",
                    coin.coin_id
                )));
            }
        }

        let mut wallet_ids = HashSet::with_capacity(wallets.len());
        for wallet in &wallets {
            if !wallet_ids.insert(wallet.wallet_id) {
                return Err(AppError::Validation(format!(
                    "Duplicate wallet id {}",
                    wallet.wallet_id
                )));
            }
        }

        let mut contract_ids = HashSet::with_capacity(contracts.len());
        for contract in &contracts {
            let id = contract.contract_id.to_string();
            if !contract_ids.insert(contract.contract_id) {
                return Err(AppError::Validation(format!(
                    "Duplicate contract id {}",
                    contract.contract_id
                )));
            }
            if !coin_index.contains_key(&contract.coin_id) {
                return Err(AppError::Validation(format!(
                    "Contract {} references unknown coin '{}'",
                    contract.contract_id, contract.coin_id
                )));
            }
            if !wallet_ids.contains(&contract.wallet_id) {
                return Err(AppError::Validation(format!(
                    "Contract {} references unknown wallet {}",
                    contract.contract_id, contract.wallet_id
                )));
            }
            check_amount("contract", &id, "quantity", contract.quantity)?;
        }

        Ok(Self {
            coins,
            wallets,
            contracts,
            coin_index,
        })
    }

    /// Parse and validate a dataset from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let file: DatasetFile = serde_json::from_str(json)
            .map_err(|e| AppError::Validation(format!("Invalid dataset JSON: {}", e)))?;
        Self::new(file.coins, file.wallets, file.contracts)
    }

    /// Read a dataset file from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Config(format!("Cannot read dataset {}: {}", path.display(), e))
        })?;
        let dataset = Self::from_json(&json)?;

        tracing::info!(
            path = %path.display(),
            coins = dataset.coins.len(),
            wallets = dataset.wallets.len(),
            contracts = dataset.contracts.len(),
            "Dataset loaded"
        );

        Ok(dataset)
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    fn coin(&self, coin_id: &str) -> &Coin {
        // References are checked in `new`.
        &self.coins[self.coin_index[coin_id]]
    }

    /// Contracts joined with the coin they reference.
    fn joined(&self) -> impl Iterator<Item = (&Contract, &Coin)> {
        self.contracts.iter().map(|k| (k, self.coin(&k.coin_id)))
    }

    /// Number of contracts held by each wallet, zero for wallets without any.
    fn contracts_per_wallet(&self) -> HashMap<i32, i64> {
        let mut counts: HashMap<i32, i64> = self.wallets.iter().map(|w| (w.wallet_id, 0)).collect();
        for contract in &self.contracts {
            *counts.entry(contract.wallet_id).or_default() += 1;
        }
        counts
    }

    /// Total contract value and contract count per coin, keyed by coin id.
    fn totals_per_coin(&self) -> BTreeMap<&str, (f64, i64)> {
        let mut totals: BTreeMap<&str, (f64, i64)> = BTreeMap::new();
        for (contract, coin) in self.joined() {
            let entry = totals.entry(contract.coin_id.as_str()).or_default();
            entry.0 += contract.quantity * coin.current_value;
            entry.1 += 1;
        }
        totals
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Query 1: coins whose current value is above `threshold`, by coin id.
    pub fn coins_above_value(&self, threshold: i64) -> Vec<CoinAboveValue> {
        let threshold = threshold as f64;
        let mut rows: Vec<CoinAboveValue> = self
            .coins
            .iter()
            .filter(|c| c.current_value > threshold)
            .map(|c| CoinAboveValue {
                coin_id: c.coin_id.clone(),
                max_value: c.max_value,
                current_value: c.current_value,
            })
            .collect();
        rows.sort_by(|a, b| a.coin_id.cmp(&b.coin_id));
        rows
    }

    /// Query 2: wallets holding more than `min_count` contracts, by wallet id.
    pub fn wallets_by_contract_count(&self, min_count: i64) -> Vec<WalletContractCount> {
        let mut rows: Vec<WalletContractCount> = self
            .contracts_per_wallet()
            .into_iter()
            .filter(|(_, count)| *count > min_count)
            .map(|(wallet_id, contract_count)| WalletContractCount {
                wallet_id,
                contract_count,
            })
            .collect();
        rows.sort_by_key(|r| r.wallet_id);
        rows
    }

    /// Query 3: wallet count per exchange, largest first.
    pub fn exchanges_by_wallet_count(&self) -> Vec<ExchangeWalletCount> {
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for wallet in &self.wallets {
            *counts.entry(wallet.exchange.as_str()).or_default() += 1;
        }

        let mut rows: Vec<ExchangeWalletCount> = counts
            .into_iter()
            .map(|(exchange, wallet_count)| ExchangeWalletCount {
                exchange: exchange.to_string(),
                wallet_count,
            })
            .collect();
        // Stable: ties keep exchange order.
        rows.sort_by(|a, b| b.wallet_count.cmp(&a.wallet_count));
        rows
    }

    /// Query 4: one row per wallet with its contract count, clustered by exchange.
    pub fn exchanges_by_coin_count(&self) -> Vec<ExchangeContractCount> {
        let counts = self.contracts_per_wallet();
        let mut wallets: Vec<&Wallet> = self.wallets.iter().collect();
        wallets.sort_by(|a, b| {
            a.exchange
                .cmp(&b.exchange)
                .then(a.wallet_id.cmp(&b.wallet_id))
        });

        wallets
            .into_iter()
            .map(|w| ExchangeContractCount {
                exchange: w.exchange.clone(),
                contract_count: counts.get(&w.wallet_id).copied().unwrap_or_default(),
            })
            .collect()
    }

    /// Query 5: every contract valued at quantity times current coin value, highest first.
    pub fn contract_value_ranking(&self) -> Vec<ContractValue> {
        let mut joined: Vec<(&Contract, f64)> = self
            .joined()
            .map(|(k, c)| (k, k.quantity * c.current_value))
            .collect();
        joined.sort_by(|(ka, va), (kb, vb)| {
            vb.total_cmp(va)
                .then(ka.coin_id.cmp(&kb.coin_id))
                .then(ka.contract_id.cmp(&kb.contract_id))
        });

        joined
            .into_iter()
            .map(|(k, value)| ContractValue {
                coin_id: k.coin_id.clone(),
                contract: k.label(),
                value,
            })
            .collect()
    }

    /// Query 6: total contract value per coin, highest first.
    pub fn coin_total_value(&self) -> Vec<CoinTotalValue> {
        let mut rows: Vec<CoinTotalValue> = self
            .totals_per_coin()
            .into_iter()
            .map(|(coin_id, (total_value, _))| CoinTotalValue {
                coin_id: coin_id.to_string(),
                total_value,
            })
            .collect();
        rows.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
        rows
    }

    /// Query 7: total contract value and contract count per coin, most contracts first.
    pub fn coin_total_value_and_count(&self) -> Vec<CoinValueAndCount> {
        let mut rows: Vec<CoinValueAndCount> = self
            .totals_per_coin()
            .into_iter()
            .map(|(coin_id, (total_value, contract_count))| CoinValueAndCount {
                coin_id: coin_id.to_string(),
                total_value,
                contract_count,
            })
            .collect();
        rows.sort_by(|a, b| b.contract_count.cmp(&a.contract_count));
        rows
    }

    /// Query 8: same rows and ordering as query 7.
    pub fn exchange_total_value_ranking(&self) -> Vec<CoinValueAndCount> {
        self.coin_total_value_and_count()
    }

    /// Query 9: contracts whose coin trades above `percent_threshold` percent of its maximum.
    ///
    /// Fails with [`AppError::Division`] if any contract references a coin
    /// whose maximum value is zero.
    pub fn contracts_near_max_value(
        &self,
        percent_threshold: i64,
    ) -> Result<Vec<ContractNearMax>, AppError> {
        let threshold = percent_threshold as f64;
        let mut rows = Vec::new();

        for (contract, coin) in self.joined() {
            let percentage = percentage_of_max(coin)?;
            if percentage > threshold {
                rows.push((
                    contract.contract_id,
                    ContractNearMax {
                        coin_id: contract.coin_id.clone(),
                        contract: contract.label(),
                        max_value: coin.max_value,
                        current_value: coin.current_value,
                        percentage,
                    },
                ));
            }
        }

        rows.sort_by(|(ia, a), (ib, b)| a.coin_id.cmp(&b.coin_id).then(ia.cmp(ib)));
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }
}

/// Current value as a percentage of the historical maximum.
pub fn percentage_of_max(coin: &Coin) -> Result<f64, AppError> {
    if coin.max_value == 0.0 {
        return Err(AppError::Division(format!(
            "coin {} has a maximum value of zero",
            coin.coin_id
        )));
    }
    Ok(coin.current_value * 100.0 / coin.max_value)
}

fn check_amount(entity: &str, id: &str, field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{} {} has invalid {} {}",
            entity, id, field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, current: f64, max: f64) -> Coin {
        Coin {
            coin_id: id.to_string(),
            current_value: current,
            max_value: max,
        }
    }

    fn wallet(id: i32, exchange: &str) -> Wallet {
        Wallet {
            wallet_id: id,
            exchange: exchange.to_string(),
        }
    }

    fn contract(id: i32, wallet_id: i32, coin_id: &str, quantity: f64) -> Contract {
        Contract {
            contract_id: id,
            wallet_id,
            coin_id: coin_id.to_string(),
            quantity,
        }
    }

    /// Three exchanges, four coins, contracts spread unevenly.
    fn sample() -> Dataset {
        Dataset::new(
            vec![
                coin("BTC", 95.0, 100.0),
                coin("ETH", 10.0, 40.0),
                coin("ADA", 85.0, 100.0),
                coin("XRP", 60.0, 61.0),
            ],
            vec![
                wallet(1, "Binance"),
                wallet(2, "Kraken"),
                wallet(3, "Binance"),
                wallet(4, "Coinbase"),
                wallet(5, "Binance"),
            ],
            vec![
                contract(1, 1, "ETH", 3.0),
                contract(2, 1, "ETH", 2.0),
                contract(3, 1, "BTC", 1.0),
                contract(4, 2, "ADA", 2.0),
                contract(5, 3, "BTC", 0.5),
                contract(6, 1, "ADA", 1.0),
                contract(7, 4, "ETH", 1.0),
            ],
        )
        .unwrap()
    }

    // ============================================================
    // Validation
    // ============================================================

    #[test]
    fn test_rejects_unknown_coin() {
        let err = Dataset::new(
            vec![coin("BTC", 1.0, 2.0)],
            vec![wallet(1, "Binance")],
            vec![contract(1, 1, "DOGE", 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("DOGE")));
    }

    #[test]
    fn test_rejects_unknown_wallet() {
        let err = Dataset::new(
            vec![coin("BTC", 1.0, 2.0)],
            vec![wallet(1, "Binance")],
            vec![contract(1, 9, "BTC", 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_rejects_duplicates_and_negatives() {
        assert!(Dataset::new(vec![coin("BTC", 1.0, 2.0), coin("BTC", 3.0, 4.0)], vec![], vec![])
            .is_err());
        assert!(Dataset::new(vec![], vec![wallet(1, "A"), wallet(1, "B")], vec![]).is_err());
        assert!(Dataset::new(vec![coin("BTC", -1.0, 2.0)], vec![], vec![]).is_err());
        assert!(Dataset::new(vec![coin("BTC", f64::NAN, 2.0)], vec![], vec![]).is_err());
        assert!(
            Dataset::new(
                vec![coin("BTC", 1.0, 2.0)],
                vec![wallet(1, "A")],
                vec![contract(1, 1, "BTC", -0.5)],
            )
            .is_err()
        );
    }

    #[test]
    fn test_from_json() {
        let dataset = Dataset::from_json(
            r#"{
                "coins": [{ "coin_id": "BTC", "current_value": 10.0, "max_value": 20.0 }],
                "wallets": [{ "wallet_id": 1, "exchange": "Binance" }],
                "contracts": [{ "contract_id": 1, "wallet_id": 1, "coin_id": "BTC", "quantity": 3.0 }]
            }"#,
        )
        .unwrap();
        assert_eq!(dataset.coins().len(), 1);
        assert_eq!(dataset.wallets().len(), 1);
        assert_eq!(dataset.contracts().len(), 1);

        assert!(matches!(
            Dataset::from_json("{ \"coins\": 3 }"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_load_bundled_fixture() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/dataset.json");
        let dataset = Dataset::load(path).await.unwrap();
        assert!(!dataset.contracts().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Dataset::load("/nonexistent/dataset.json").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    // ============================================================
    // Query 1
    // ============================================================

    #[test]
    fn test_coins_above_value_filters_strictly() {
        let rows = sample().coins_above_value(60);
        let ids: Vec<&str> = rows.iter().map(|r| r.coin_id.as_str()).collect();
        // XRP sits exactly at 60 and is excluded
        assert_eq!(ids, vec!["ADA", "BTC"]);
        assert_eq!(rows[1].max_value, 100.0);
        assert_eq!(rows[1].current_value, 95.0);
    }

    #[test]
    fn test_coins_above_value_is_monotonic() {
        let dataset = sample();
        let mut previous = usize::MAX;
        for threshold in [0, 10, 50, 60, 85, 95, 1000] {
            let rows = dataset.coins_above_value(threshold);
            assert!(rows.len() <= previous);
            assert!(rows.iter().all(|r| r.current_value > threshold as f64));
            previous = rows.len();
        }
        assert_eq!(dataset.coins_above_value(1000).len(), 0);
        assert_eq!(dataset.coins_above_value(-1).len(), 4);
    }

    // ============================================================
    // Queries 2–4
    // ============================================================

    #[test]
    fn test_wallets_by_contract_count() {
        let dataset = sample();
        let rows = dataset.wallets_by_contract_count(2);
        assert_eq!(
            rows,
            vec![WalletContractCount {
                wallet_id: 1,
                contract_count: 4
            }]
        );

        let all = dataset.wallets_by_contract_count(-1);
        let ids: Vec<i32> = all.iter().map(|r| r.wallet_id).collect();
        // Wallet 5 has no contracts but still counts as zero
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(all[4].contract_count, 0);
    }

    #[test]
    fn test_exchanges_by_wallet_count() {
        let dataset = sample();
        let rows = dataset.exchanges_by_wallet_count();
        assert_eq!(rows[0].exchange, "Binance");
        assert_eq!(rows[0].wallet_count, 3);
        assert!(rows.windows(2).all(|w| w[0].wallet_count >= w[1].wallet_count));
        // Ties broken by exchange name
        assert_eq!(rows[1].exchange, "Coinbase");
        assert_eq!(rows[2].exchange, "Kraken");

        let total: i64 = rows.iter().map(|r| r.wallet_count).sum();
        assert_eq!(total, dataset.wallets().len() as i64);
    }

    #[test]
    fn test_exchanges_by_coin_count_one_row_per_wallet() {
        let rows = sample().exchanges_by_coin_count();
        let pairs: Vec<(&str, i64)> = rows
            .iter()
            .map(|r| (r.exchange.as_str(), r.contract_count))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Binance", 4),
                ("Binance", 1),
                ("Binance", 0),
                ("Coinbase", 1),
                ("Kraken", 1),
            ]
        );
    }

    // ============================================================
    // Queries 5–8
    // ============================================================

    #[test]
    fn test_contract_value_ranking() {
        let rows = sample().contract_value_ranking();
        assert_eq!(rows.len(), 7);
        assert!(rows.windows(2).all(|w| w[0].value >= w[1].value));

        // 3 ETH at 10 each
        let eth1 = rows.iter().find(|r| r.contract == "ETH1").unwrap();
        assert_eq!(eth1.coin_id, "ETH");
        assert_eq!(eth1.value, 30.0);

        assert_eq!(rows[0].contract, "ADA4");
        assert_eq!(rows[0].value, 170.0);
    }

    #[test]
    fn test_coin_total_value_sums_contracts() {
        let rows = sample().coin_total_value();
        let eth = rows.iter().find(|r| r.coin_id == "ETH").unwrap();
        // 30 + 20 + 10
        assert_eq!(eth.total_value, 60.0);
        assert!(rows.windows(2).all(|w| w[0].total_value >= w[1].total_value));
        // XRP has no contracts
        assert!(rows.iter().all(|r| r.coin_id != "XRP"));
    }

    #[test]
    fn test_coin_total_value_two_contracts() {
        let dataset = Dataset::new(
            vec![coin("ETH", 10.0, 20.0)],
            vec![wallet(1, "Binance")],
            vec![contract(1, 1, "ETH", 3.0), contract(2, 1, "ETH", 2.0)],
        )
        .unwrap();
        let rows = dataset.coin_total_value();
        assert_eq!(
            rows,
            vec![CoinTotalValue {
                coin_id: "ETH".to_string(),
                total_value: 50.0
            }]
        );
    }

    #[test]
    fn test_coin_total_value_and_count() {
        let rows = sample().coin_total_value_and_count();
        let summary: Vec<(&str, i64)> = rows
            .iter()
            .map(|r| (r.coin_id.as_str(), r.contract_count))
            .collect();
        assert_eq!(summary, vec![("ETH", 3), ("ADA", 2), ("BTC", 2)]);
        assert_eq!(rows[0].total_value, 60.0);
    }

    #[test]
    fn test_exchange_ranking_matches_coin_count_ranking() {
        let dataset = sample();
        assert_eq!(
            dataset.exchange_total_value_ranking(),
            dataset.coin_total_value_and_count()
        );
    }

    // ============================================================
    // Query 9
    // ============================================================

    #[test]
    fn test_contracts_near_max_value() {
        let rows = sample().contracts_near_max_value(90).unwrap();
        let labels: Vec<&str> = rows.iter().map(|r| r.contract.as_str()).collect();
        // BTC at 95% and XRP (no contracts) qualify; ADA at 85% does not
        assert_eq!(labels, vec!["BTC3", "BTC5"]);
        assert_eq!(rows[0].percentage, 95.0);
        assert_eq!(rows[0].max_value, 100.0);
        assert_eq!(rows[0].current_value, 95.0);
    }

    #[test]
    fn test_contracts_near_max_threshold_is_strict() {
        let dataset = sample();
        assert!(dataset.contracts_near_max_value(95).unwrap().is_empty());
        assert_eq!(dataset.contracts_near_max_value(0).unwrap().len(), 7);
    }

    #[test]
    fn test_contracts_near_max_zero_maximum() {
        let dataset = Dataset::new(
            vec![coin("BTC", 95.0, 100.0), coin("LUNA", 0.0, 0.0)],
            vec![wallet(1, "Binance")],
            vec![contract(1, 1, "BTC", 1.0), contract(2, 1, "LUNA", 5.0)],
        )
        .unwrap();
        let err = dataset.contracts_near_max_value(90).unwrap_err();
        assert!(matches!(err, AppError::Division(msg) if msg.contains("LUNA")));
    }

    #[test]
    fn test_zero_maximum_without_contracts_is_ignored() {
        let dataset = Dataset::new(
            vec![coin("BTC", 95.0, 100.0), coin("LUNA", 0.0, 0.0)],
            vec![wallet(1, "Binance")],
            vec![contract(1, 1, "BTC", 1.0)],
        )
        .unwrap();
        assert_eq!(dataset.contracts_near_max_value(90).unwrap().len(), 1);
    }

    #[test]
    fn test_queries_are_idempotent() {
        let dataset = sample();
        assert_eq!(dataset.contract_value_ranking(), dataset.contract_value_ranking());
        assert_eq!(dataset.exchanges_by_coin_count(), dataset.exchanges_by_coin_count());
        assert_eq!(
            dataset.contracts_near_max_value(50).unwrap(),
            dataset.contracts_near_max_value(50).unwrap()
        );
    }
}
