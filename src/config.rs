use std::str::FromStr;

use log::LevelFilter;
use serde::Deserialize;

use crate::error::{GameError, Result};

fn default_starting_account() -> i64 {
    200
}

fn default_starting_bet() -> u32 {
    5
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RulesInput {
    #[serde(default)]
    pub dealer_stands_on: Option<u32>,
    #[serde(default)]
    pub enforce_bet_limit: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableInput {
    pub num_decks: u8,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_starting_account")]
    pub starting_account: i64,
    #[serde(default = "default_starting_bet")]
    pub starting_bet: u32,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub rules: RulesInput,
}

impl TableInput {
    pub fn log_level(&self) -> Result<LevelFilter> {
        match &self.log_level {
            None => Ok(LevelFilter::Info),
            Some(level) => LevelFilter::from_str(level)
                .map_err(|_| GameError::InvalidConfig(format!("unknown log level `{level}`"))),
        }
    }
}

/// House rules and opening balances for one table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRules {
    /// The dealer keeps drawing while its best total is below this.
    pub dealer_stands_on: u32,
    /// Reject bets larger than the account instead of letting it go negative.
    pub enforce_bet_limit: bool,
    pub starting_account: i64,
    pub starting_bet: u32,
}

impl Default for TableRules {
    fn default() -> Self {
        TableRules {
            dealer_stands_on: 16,
            enforce_bet_limit: false,
            starting_account: default_starting_account(),
            starting_bet: default_starting_bet(),
        }
    }
}

pub fn to_table_rules(input: &TableInput) -> TableRules {
    let defaults = TableRules::default();
    TableRules {
        dealer_stands_on: input
            .rules
            .dealer_stands_on
            .unwrap_or(defaults.dealer_stands_on),
        enforce_bet_limit: input
            .rules
            .enforce_bet_limit
            .unwrap_or(defaults.enforce_bet_limit),
        starting_account: input.starting_account,
        starting_bet: input.starting_bet,
    }
}

pub fn parse_table_input(json: &str) -> Result<TableInput> {
    serde_json::from_str(json).map_err(|err| GameError::InvalidConfig(err.to_string()))
}
