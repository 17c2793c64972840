use serde::{Deserialize, Serialize};

/// A priced asset tracked by its current and historical maximum value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Coin {
    pub coin_id: String,
    pub current_value: f64,
    pub max_value: f64,
}

/// An account on one exchange, holding zero or more contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Wallet {
    pub wallet_id: i32,
    pub exchange: String,
}

/// A holding of one coin inside one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contract {
    pub contract_id: i32,
    pub wallet_id: i32,
    pub coin_id: String,
    pub quantity: f64,
}

impl Contract {
    /// Display label of a contract: the coin id followed by the contract id (`BTC7`).
    pub fn label(&self) -> String {
        format!("{}{}", self.coin_id, self.contract_id)
    }
}

/// JSON envelope returned by every query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse<T> {
    pub query_id: u8,
    pub description: String,
    pub values: Vec<T>,
}

// ============================================================
// Result rows
// ============================================================

/// Query 1 row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CoinAboveValue {
    #[serde(rename = "coinId")]
    pub coin_id: String,
    #[serde(rename = "maximo")]
    pub max_value: f64,
    #[serde(rename = "actual")]
    pub current_value: f64,
}

/// Query 2 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WalletContractCount {
    #[serde(rename = "walletId")]
    pub wallet_id: i32,
    #[serde(rename = "totalMonedas")]
    pub contract_count: i64,
}

/// Query 3 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExchangeWalletCount {
    pub exchange: String,
    #[serde(rename = "totalCarteras")]
    pub wallet_count: i64,
}

/// Query 4 row: one per wallet, carrying the wallet's exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExchangeContractCount {
    pub exchange: String,
    #[serde(rename = "totalMonedas")]
    pub contract_count: i64,
}

/// Query 5 row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContractValue {
    #[serde(rename = "moneda")]
    pub coin_id: String,
    #[serde(rename = "contrato")]
    pub contract: String,
    #[serde(rename = "valorContrato")]
    pub value: f64,
}

/// Query 6 row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CoinTotalValue {
    #[serde(rename = "moneda")]
    pub coin_id: String,
    #[serde(rename = "valorTotal")]
    pub total_value: f64,
}

/// Query 7 and 8 row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CoinValueAndCount {
    #[serde(rename = "moneda")]
    pub coin_id: String,
    #[serde(rename = "valorTotal")]
    pub total_value: f64,
    #[serde(rename = "contratos")]
    pub contract_count: i64,
}

/// Query 9 row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContractNearMax {
    #[serde(rename = "moneda")]
    pub coin_id: String,
    #[serde(rename = "contrato")]
    pub contract: String,
    #[serde(rename = "maximo")]
    pub max_value: f64,
    #[serde(rename = "actual")]
    pub current_value: f64,
    #[serde(rename = "porcentaje")]
    pub percentage: f64,
}
