// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Response records for both API generations
//!
//! Every field is optional and absent keys decode to `None`. Fields the
//! remote side emits either as numbers or as strings (amounts, gas, token ids)
//! are accepted in both forms.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lenient field decoders
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings verbatim, numbers and booleans as text, containers as compact JSON
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }))
    }

    /// Unsigned integers given as numbers or numeric strings
    pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }))
    }

    /// Floats given as numbers or numeric strings
    pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }))
    }

    /// Lists where `null` means empty
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }
}

// Sim by Dune

/// `GET /evm/balances/{address}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BalancesResponse {
    /// Wallet the balances belong to, as echoed by the API
    #[serde(default, deserialize_with = "lenient::text")]
    pub wallet_address: Option<String>,
    /// Token balances
    #[serde(default, deserialize_with = "lenient::list")]
    pub balances: Vec<TokenBalance>,
}

/// One token balance of a wallet
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenBalance {
    /// Token contract address, `native` for the chain's gas token
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: Option<String>,
    /// Raw amount in the token's smallest unit
    #[serde(default, deserialize_with = "lenient::text")]
    pub amount: Option<String>,
    /// Chain name
    #[serde(default, deserialize_with = "lenient::text")]
    pub chain: Option<String>,
    /// Token decimals
    #[serde(default, deserialize_with = "lenient::u64")]
    pub decimals: Option<u64>,
    /// Unit price in USD
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price_usd: Option<f64>,
    /// Token symbol
    #[serde(default, deserialize_with = "lenient::text")]
    pub symbol: Option<String>,
    /// Position value in USD
    #[serde(default, deserialize_with = "lenient::f64")]
    pub value_usd: Option<f64>,
}

/// `GET /evm/transactions/{address}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionsResponse {
    /// Wallet the activity belongs to
    #[serde(default, deserialize_with = "lenient::text")]
    pub wallet_address: Option<String>,
    /// Transactions, most recent first
    #[serde(default, deserialize_with = "lenient::list")]
    pub transactions: Vec<Transaction>,
}

/// One wallet transaction
///
/// The API has shipped both `from`/`to`/`block_time` and the longer
/// `from_address`/`to_address`/`timestamp` spellings; accessors prefer the
/// long form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient::u64")]
    block_number: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    hash: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    from_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    from: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    to_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    to: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    value: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    gas_used: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    block_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    chain: Option<String>,
}

impl Transaction {
    /// Block height
    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    /// Transaction hash
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Sender
    pub fn from_address(&self) -> Option<&str> {
        self.from_address.as_deref().or(self.from.as_deref())
    }

    /// Recipient
    pub fn to_address(&self) -> Option<&str> {
        self.to_address.as_deref().or(self.to.as_deref())
    }

    /// Transferred native value
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Gas consumed
    pub fn gas_used(&self) -> Option<&str> {
        self.gas_used.as_deref()
    }

    /// Block timestamp
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref().or(self.block_time.as_deref())
    }

    /// Chain name
    pub fn chain(&self) -> Option<&str> {
        self.chain.as_deref()
    }
}

/// `GET /evm/collectibles/{address}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CollectiblesResponse {
    /// Wallet the collectibles belong to
    #[serde(default, deserialize_with = "lenient::text")]
    pub wallet_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    entries: Vec<Collectible>,
    #[serde(default, deserialize_with = "lenient::list")]
    collectibles: Vec<Collectible>,
}

impl CollectiblesResponse {
    /// Collectibles held by the wallet, from `entries` or the older `collectibles` field
    pub fn entries(&self) -> &[Collectible] {
        if self.entries.is_empty() {
            &self.collectibles
        } else {
            &self.entries
        }
    }
}

/// One NFT held by a wallet
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Collectible {
    /// Collection contract
    #[serde(default, deserialize_with = "lenient::text")]
    pub contract_address: Option<String>,
    /// Token id, decimal text
    #[serde(default, deserialize_with = "lenient::text")]
    pub token_id: Option<String>,
    /// Token name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    /// Token description
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    /// Image location
    #[serde(default, deserialize_with = "lenient::text")]
    pub image_url: Option<String>,
    /// Chain name
    #[serde(default, deserialize_with = "lenient::text")]
    pub chain: Option<String>,
    /// Collection name
    #[serde(default, deserialize_with = "lenient::text")]
    pub collection_name: Option<String>,
}

// Dune Analytics

/// Lifecycle state of a query execution
///
/// Unrecognized states are preserved verbatim and are never terminal, so a
/// newly introduced state keeps a poller waiting instead of failing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionState {
    /// Waiting for an executor
    Pending,
    /// Running
    Executing,
    /// Finished with a full result
    Completed,
    /// Finished with a truncated result
    CompletedPartial,
    /// Failed
    Failed,
    /// Cancelled by the user
    Cancelled,
    /// Result no longer available
    Expired,
    /// Any other state string
    Other(String),
}

impl ExecutionState {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "QUERY_STATE_PENDING",
            Self::Executing => "QUERY_STATE_EXECUTING",
            Self::Completed => "QUERY_STATE_COMPLETED",
            Self::CompletedPartial => "QUERY_STATE_COMPLETED_PARTIAL",
            Self::Failed => "QUERY_STATE_FAILED",
            Self::Cancelled => "QUERY_STATE_CANCELLED",
            Self::Expired => "QUERY_STATE_EXPIRED",
            Self::Other(state) => state,
        }
    }

    /// Whether the execution produced results
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::CompletedPartial)
    }

    /// Whether the execution will not change state anymore
    pub fn is_terminal(&self) -> bool {
        self.is_success() || matches!(self, Self::Failed | Self::Cancelled | Self::Expired)
    }
}

impl From<String> for ExecutionState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "QUERY_STATE_PENDING" => Self::Pending,
            "QUERY_STATE_EXECUTING" => Self::Executing,
            "QUERY_STATE_COMPLETED" => Self::Completed,
            "QUERY_STATE_COMPLETED_PARTIAL" => Self::CompletedPartial,
            "QUERY_STATE_FAILED" => Self::Failed,
            "QUERY_STATE_CANCELLED" => Self::Cancelled,
            "QUERY_STATE_EXPIRED" => Self::Expired,
            _ => Self::Other(value),
        }
    }
}

impl From<ExecutionState> for String {
    fn from(value: ExecutionState) -> Self {
        match value {
            ExecutionState::Other(state) => state,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST /query/{id}/execute`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecuteResponse {
    /// Identifier assigned to the new execution
    #[serde(default, deserialize_with = "lenient::text")]
    pub execution_id: Option<String>,
    /// Initial state
    #[serde(default)]
    pub state: Option<ExecutionState>,
}

/// `GET /execution/{id}/status`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecutionStatus {
    /// Execution identifier
    #[serde(default, deserialize_with = "lenient::text")]
    pub execution_id: Option<String>,
    /// Saved query the execution belongs to
    #[serde(default, deserialize_with = "lenient::u64")]
    pub query_id: Option<u64>,
    /// Current state
    #[serde(default)]
    pub state: Option<ExecutionState>,
    /// Submission time
    #[serde(default, deserialize_with = "lenient::text")]
    pub submitted_at: Option<String>,
    /// Start of execution
    #[serde(default, deserialize_with = "lenient::text")]
    pub execution_started_at: Option<String>,
    /// End of execution
    #[serde(default, deserialize_with = "lenient::text")]
    pub execution_ended_at: Option<String>,
    /// Result expiry
    #[serde(default, deserialize_with = "lenient::text")]
    pub expires_at: Option<String>,
    /// Whether the execution reached a terminal state
    #[serde(default)]
    pub is_execution_finished: Option<bool>,
}

impl ExecutionStatus {
    /// Whether the reported state is terminal
    pub fn is_finished(&self) -> bool {
        self.state.as_ref().is_some_and(ExecutionState::is_terminal)
    }
}

/// `GET /execution/{id}/results`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecutionResults {
    /// Execution identifier
    #[serde(default, deserialize_with = "lenient::text")]
    pub execution_id: Option<String>,
    /// Saved query the execution belongs to
    #[serde(default, deserialize_with = "lenient::u64")]
    pub query_id: Option<u64>,
    /// Final state
    #[serde(default)]
    pub state: Option<ExecutionState>,
    /// Columnar payload, absent until the execution completed
    #[serde(default)]
    pub result: Option<ResultPayload>,
}

/// Columnar result payload
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultPayload {
    /// Rows in result order
    #[serde(default, deserialize_with = "lenient::list")]
    pub rows: Vec<ResultRow>,
    /// Column metadata
    #[serde(default)]
    pub metadata: Option<ResultMetadata>,
}

impl ResultPayload {
    /// Column names from the metadata block, in declared order
    pub fn column_names(&self) -> &[String] {
        self.metadata
            .as_ref()
            .map(|metadata| metadata.column_names.as_slice())
            .unwrap_or_default()
    }
}

/// Result metadata block
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultMetadata {
    /// Column names in declared order
    #[serde(default, deserialize_with = "lenient::list")]
    pub column_names: Vec<String>,
}

/// One result row, positional or keyed by column name
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResultRow {
    /// Values aligned to the metadata column names
    Values(Vec<Value>),
    /// Values keyed by column name
    Record(Map<String, Value>),
}

impl ResultRow {
    /// Value of a column, by position for positional rows and by name for keyed rows
    pub fn get(&self, index: usize, column: &str) -> Option<&Value> {
        match self {
            Self::Values(values) => values.get(index),
            Self::Record(record) => record.get(column),
        }
    }
}

/// `GET /query/{id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryMetadata {
    /// Saved query id
    #[serde(default, deserialize_with = "lenient::u64")]
    pub query_id: Option<u64>,
    /// Title
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    /// Description
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    /// Owner handle
    #[serde(default, deserialize_with = "lenient::text")]
    pub owner: Option<String>,
    /// SQL text
    #[serde(default, deserialize_with = "lenient::text")]
    pub query_sql: Option<String>,
    /// Private flag
    #[serde(default)]
    pub is_private: Option<bool>,
    /// Archived flag
    #[serde(default)]
    pub is_archived: Option<bool>,
}

/// Element of `GET /contracts/trending`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrendingContract {
    /// Contract address
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: Option<String>,
    /// Chain name
    #[serde(default, deserialize_with = "lenient::text")]
    pub blockchain: Option<String>,
    /// Contract name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    /// Project the contract belongs to
    #[serde(default, deserialize_with = "lenient::text")]
    pub project: Option<String>,
    /// Transactions in the trending window
    #[serde(default, deserialize_with = "lenient::u64")]
    pub transaction_count: Option<u64>,
    /// Distinct users in the trending window
    #[serde(default, deserialize_with = "lenient::u64")]
    pub user_count: Option<u64>,
}

/// Element of `GET /dex/pairs`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DexPair {
    /// Pool address
    #[serde(default, deserialize_with = "lenient::text")]
    pub pair_address: Option<String>,
    /// Chain name
    #[serde(default, deserialize_with = "lenient::text")]
    pub blockchain: Option<String>,
    /// DEX name
    #[serde(default, deserialize_with = "lenient::text")]
    pub dex_name: Option<String>,
    /// First token symbol
    #[serde(default, deserialize_with = "lenient::text")]
    pub token0_symbol: Option<String>,
    /// Second token symbol
    #[serde(default, deserialize_with = "lenient::text")]
    pub token1_symbol: Option<String>,
    /// Pool liquidity in USD
    #[serde(default, deserialize_with = "lenient::f64")]
    pub liquidity_usd: Option<f64>,
    /// Trailing 24 hour volume in USD
    #[serde(default, deserialize_with = "lenient::f64")]
    pub volume_24h_usd: Option<f64>,
}

/// Element of `GET /markets/{market_type}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Market {
    /// Market category
    #[serde(default, deserialize_with = "lenient::text")]
    pub market_type: Option<String>,
    /// Chain name
    #[serde(default, deserialize_with = "lenient::text")]
    pub blockchain: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    project_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    project: Option<String>,
    /// Trailing 24 hour volume in USD
    #[serde(default, deserialize_with = "lenient::f64")]
    pub volume_24h_usd: Option<f64>,
    /// Total value locked in USD
    #[serde(default, deserialize_with = "lenient::f64")]
    pub tvl_usd: Option<f64>,
}

impl Market {
    /// Project name, from `project_name` or `project`
    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref().or(self.project.as_deref())
    }
}

/// Decode a JSON array of records, treating any other shape as empty
///
/// # Errors
///
/// Returns the decoding error of the first element that is not a record
pub fn decode_list<'de, T: Deserialize<'de>>(
    value: &'de Value,
) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::Array(items) => items.iter().map(T::deserialize).collect(),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn balances_accept_numbers_and_strings() {
        let response: BalancesResponse = serde_json::from_value(json!({
            "wallet_address": "0xabc",
            "balances": [
                {"address": "native", "amount": 100, "decimals": "18", "price_usd": "2.5"},
                {"symbol": "T1"}
            ]
        }))
        .unwrap();

        assert_eq!(response.wallet_address.as_deref(), Some("0xabc"));
        let first = &response.balances[0];
        assert_eq!(first.amount.as_deref(), Some("100"));
        assert_eq!(first.decimals, Some(18));
        assert_eq!(first.price_usd, Some(2.5));
        assert_eq!(response.balances[1], TokenBalance {
            symbol: Some("T1".to_string()),
            ..TokenBalance::default()
        });
    }

    #[test]
    fn null_lists_decode_empty() {
        let response: BalancesResponse =
            serde_json::from_value(json!({"balances": null})).unwrap();
        assert!(response.balances.is_empty());
        let response: TransactionsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.transactions.is_empty());
    }

    #[test]
    fn transaction_field_spellings() {
        let short: Transaction = serde_json::from_value(json!({
            "from": "0x1", "to": "0x2", "block_time": "2024-01-01T00:00:00Z", "block_number": "7"
        }))
        .unwrap();
        assert_eq!(short.from_address(), Some("0x1"));
        assert_eq!(short.to_address(), Some("0x2"));
        assert_eq!(short.timestamp(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(short.block_number(), Some(7));

        let long: Transaction = serde_json::from_value(json!({
            "from_address": "0xa", "from": "0xb", "timestamp": "t"
        }))
        .unwrap();
        assert_eq!(long.from_address(), Some("0xa"));
        assert_eq!(long.timestamp(), Some("t"));
    }

    #[test]
    fn collectibles_field_spellings() {
        let current: CollectiblesResponse =
            serde_json::from_value(json!({"entries": [{"token_id": 1}]})).unwrap();
        assert_eq!(current.entries()[0].token_id.as_deref(), Some("1"));

        let older: CollectiblesResponse =
            serde_json::from_value(json!({"collectibles": [{"name": "x"}]})).unwrap();
        assert_eq!(older.entries().len(), 1);
    }

    #[test]
    fn execution_states() {
        let state = ExecutionState::from("QUERY_STATE_COMPLETED_PARTIAL".to_string());
        assert!(state.is_success());
        assert!(state.is_terminal());

        assert!(ExecutionState::Expired.is_terminal());
        assert!(!ExecutionState::Expired.is_success());
        assert!(!ExecutionState::Executing.is_terminal());

        let unknown: ExecutionState =
            serde_json::from_value(json!("QUERY_STATE_SOMETHING_NEW")).unwrap();
        assert_eq!(unknown, ExecutionState::Other("QUERY_STATE_SOMETHING_NEW".to_string()));
        assert!(!unknown.is_terminal());
        assert_eq!(unknown.to_string(), "QUERY_STATE_SOMETHING_NEW");
    }

    #[test]
    fn result_rows_positional_and_keyed() {
        let results: ExecutionResults = serde_json::from_value(json!({
            "execution_id": "01H",
            "query_id": 42,
            "state": "QUERY_STATE_COMPLETED",
            "result": {
                "rows": [[1, "a"], {"c1": 2, "c2": "b"}],
                "metadata": {"column_names": ["c1", "c2"]}
            }
        }))
        .unwrap();

        let payload = results.result.unwrap();
        assert_eq!(payload.column_names(), ["c1", "c2"]);
        assert_eq!(payload.rows[0].get(1, "c2"), Some(&json!("a")));
        assert_eq!(payload.rows[1].get(1, "c2"), Some(&json!("b")));
        assert_eq!(payload.rows[0].get(5, "c9"), None);
    }

    #[test]
    fn decode_list_ignores_non_arrays() {
        let pairs: Vec<DexPair> = decode_list(&json!({"error": "nope"})).unwrap();
        assert!(pairs.is_empty());

        let markets: Vec<Market> =
            decode_list(&json!([{"project": "uniswap", "tvl_usd": 10}])).unwrap();
        assert_eq!(markets[0].project_name(), Some("uniswap"));
        assert_eq!(markets[0].tvl_usd, Some(10.0));

        assert!(decode_list::<DexPair>(&json!([1])).is_err());
    }
}
