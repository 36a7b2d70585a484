//! Settlement configuration

use lapshare_common::{DamageFeePolicy, DepositPolicy, LapshareError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement policy configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Deposit sizing rule checked when deposits are recorded
    pub deposit: DepositPolicy,
    /// Cap applied to damage fees before settlement
    pub damage_fee: DamageFeePolicy,
}

impl SettlementConfig {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test fixtures)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let mut min_ratio = cfg.deposit.min_ratio;
        let mut max_ratio = cfg.deposit.max_ratio;

        if let Some(val) = lookup("LAPSHARE_DEPOSIT_MIN_RATIO") {
            min_ratio = parse_ratio("LAPSHARE_DEPOSIT_MIN_RATIO", &val)?;
        }
        if let Some(val) = lookup("LAPSHARE_DEPOSIT_MAX_RATIO") {
            max_ratio = parse_ratio("LAPSHARE_DEPOSIT_MAX_RATIO", &val)?;
        }
        cfg.deposit = DepositPolicy::new(min_ratio, max_ratio)?;

        if let Some(val) = lookup("LAPSHARE_CAP_DAMAGE_AT_ITEM_VALUE") {
            cfg.damage_fee.cap_at_item_value = val.parse().map_err(|_| {
                LapshareError::Config(format!(
                    "LAPSHARE_CAP_DAMAGE_AT_ITEM_VALUE must be true or false, got {val:?}"
                ))
            })?;
        }

        Ok(cfg)
    }
}

fn parse_ratio(key: &str, val: &str) -> Result<Decimal> {
    val.trim()
        .parse::<Decimal>()
        .map_err(|e| LapshareError::Config(format!("{key} is not a decimal ratio: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = SettlementConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.deposit.min_ratio, dec!(0.10));
        assert_eq!(cfg.deposit.max_ratio, dec!(0.30));
        assert!(cfg.damage_fee.cap_at_item_value);
    }

    #[test]
    fn test_overrides() {
        let cfg = SettlementConfig::from_lookup(lookup(&[
            ("LAPSHARE_DEPOSIT_MIN_RATIO", "0.15"),
            ("LAPSHARE_DEPOSIT_MAX_RATIO", "0.25"),
            ("LAPSHARE_CAP_DAMAGE_AT_ITEM_VALUE", "false"),
        ]))
        .unwrap();

        assert_eq!(cfg.deposit.min_ratio, dec!(0.15));
        assert_eq!(cfg.deposit.max_ratio, dec!(0.25));
        assert!(!cfg.damage_fee.cap_at_item_value);
    }

    #[test]
    fn test_invalid_values() {
        let bad_ratio =
            SettlementConfig::from_lookup(lookup(&[("LAPSHARE_DEPOSIT_MIN_RATIO", "ten")]));
        assert!(matches!(bad_ratio, Err(LapshareError::Config(_))));

        let inverted = SettlementConfig::from_lookup(lookup(&[
            ("LAPSHARE_DEPOSIT_MIN_RATIO", "0.5"),
            ("LAPSHARE_DEPOSIT_MAX_RATIO", "0.2"),
        ]));
        assert!(matches!(inverted, Err(LapshareError::Policy(_))));

        let above_item_value = SettlementConfig::from_lookup(lookup(&[(
            "LAPSHARE_DEPOSIT_MAX_RATIO",
            "250000",
        )]));
        assert!(matches!(above_item_value, Err(LapshareError::Policy(_))));

        let bad_flag =
            SettlementConfig::from_lookup(lookup(&[("LAPSHARE_CAP_DAMAGE_AT_ITEM_VALUE", "yes")]));
        assert!(matches!(bad_flag, Err(LapshareError::Config(_))));
    }
}
