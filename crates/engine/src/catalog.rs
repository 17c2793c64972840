//! The fixed set of queries exposed by the service.

use serde::Serialize;

use cripto_common::config::QueryDefaults;
use cripto_common::error::AppError;

/// Identifier of one of the nine analytical queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryId {
    CoinsAboveValue,
    WalletsByContractCount,
    ExchangesByWalletCount,
    ExchangesByCoinCount,
    ContractValueRanking,
    CoinTotalValueAcrossContracts,
    CoinTotalValueAndCount,
    ExchangeTotalValueRanking,
    ContractsNearMaxValue,
}

/// An integer parameter accepted by a query, with its effective default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryParameter {
    pub name: &'static str,
    pub default: i64,
}

/// Catalog entry served by `GET /api/query`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInfo {
    pub query_id: u8,
    pub description: &'static str,
    pub parameter: Option<QueryParameter>,
}

impl QueryId {
    pub const ALL: [QueryId; 9] = [
        QueryId::CoinsAboveValue,
        QueryId::WalletsByContractCount,
        QueryId::ExchangesByWalletCount,
        QueryId::ExchangesByCoinCount,
        QueryId::ContractValueRanking,
        QueryId::CoinTotalValueAcrossContracts,
        QueryId::CoinTotalValueAndCount,
        QueryId::ExchangeTotalValueRanking,
        QueryId::ContractsNearMaxValue,
    ];

    /// Numeric id used in routes and in the `queryId` field.
    pub fn number(self) -> u8 {
        match self {
            QueryId::CoinsAboveValue => 1,
            QueryId::WalletsByContractCount => 2,
            QueryId::ExchangesByWalletCount => 3,
            QueryId::ExchangesByCoinCount => 4,
            QueryId::ContractValueRanking => 5,
            QueryId::CoinTotalValueAcrossContracts => 6,
            QueryId::CoinTotalValueAndCount => 7,
            QueryId::ExchangeTotalValueRanking => 8,
            QueryId::ContractsNearMaxValue => 9,
        }
    }

    /// Human-readable description returned in the response envelope.
    pub fn description(self) -> &'static str {
        match self {
            QueryId::CoinsAboveValue => {
                "Monedas con valor actual superior a 50€ ordenadas alfabéticamente"
            }
            QueryId::WalletsByContractCount => "Carteras con más de 2 monedas contratadas",
            QueryId::ExchangesByWalletCount => "Exchanges ordenados por números de carteras",
            QueryId::ExchangesByCoinCount => "Exchanges ordenados por cantidad de monedas",
            QueryId::ContractValueRanking => {
                "Monedas en contratos ordenadas por valor total actual"
            }
            QueryId::CoinTotalValueAcrossContracts => {
                "Monedas en contratos ordenadas por valor actual total en todos los contratos"
            }
            QueryId::CoinTotalValueAndCount => {
                "Idem contando en cuantos contratos aparecen y ordenado por número de contratos"
            }
            QueryId::ExchangeTotalValueRanking => {
                "Idem pero con Exchanges ordenados por valor total"
            }
            QueryId::ContractsNearMaxValue => {
                "Las Contratos y Monedas de Binance con monedas cuyo valor actual es inferior al 90% del valor máximo"
            }
        }
    }

    /// The query-string parameter this query binds, if any.
    pub fn parameter_name(self) -> Option<&'static str> {
        match self {
            QueryId::CoinsAboveValue => Some("valorActual"),
            QueryId::WalletsByContractCount => Some("valorMonedas"),
            QueryId::ContractsNearMaxValue => Some("valorPorcentaje"),
            _ => None,
        }
    }

    /// The parameter together with its configured default.
    pub fn parameter(self, defaults: &QueryDefaults) -> Option<QueryParameter> {
        let default = match self {
            QueryId::CoinsAboveValue => defaults.valor_actual,
            QueryId::WalletsByContractCount => defaults.valor_monedas,
            QueryId::ContractsNearMaxValue => defaults.valor_porcentaje,
            _ => return None,
        };
        self.parameter_name()
            .map(|name| QueryParameter { name, default })
    }

    pub fn info(self, defaults: &QueryDefaults) -> QueryInfo {
        QueryInfo {
            query_id: self.number(),
            description: self.description(),
            parameter: self.parameter(defaults),
        }
    }

    /// The whole catalog in query-number order.
    pub fn catalog(defaults: &QueryDefaults) -> Vec<QueryInfo> {
        Self::ALL.iter().map(|q| q.info(defaults)).collect()
    }
}

impl TryFrom<u8> for QueryId {
    type Error = AppError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|q| q.number() == number)
            .ok_or_else(|| AppError::NotFound(format!("Query {} does not exist", number)))
    }
}

impl std::str::FromStr for QueryId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: u8 = s
            .parse()
            .map_err(|_| AppError::NotFound(format!("Query {} does not exist", s)))?;
        Self::try_from(number)
    }
}

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "query {}", self.number())
    }
}
