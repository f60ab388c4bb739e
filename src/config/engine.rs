//! Engine-wide settings.

use serde::{Deserialize, Serialize};

use crate::domain::{BasisPoints, OwnerId};
use crate::error::DexError;

/// Who may finalize or revert an unexpired reservation.
///
/// Once a reservation is past its expiry slot anyone may revert it,
/// whatever the policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlerPolicy {
    /// The initiating owner, or the settler named on the intent.
    #[default]
    InitiatorOrDesignated,
    /// Any caller.
    Any,
    /// The initiating owner or any listed settler.
    Allowlist(Vec<OwnerId>),
}

impl SettlerPolicy {
    /// Returns `true` if `caller` may resolve a reservation made by `owner`
    /// that designated `designated`.
    #[must_use]
    pub fn permits(&self, caller: &OwnerId, owner: &OwnerId, designated: Option<&OwnerId>) -> bool {
        if caller == owner {
            return true;
        }
        match self {
            Self::InitiatorOrDesignated => designated == Some(caller),
            Self::Any => true,
            Self::Allowlist(settlers) => settlers.contains(caller),
        }
    }
}

/// Settings for a [`SettlementEngine`](crate::settlement::SettlementEngine).
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use hydra_dex::config::EngineConfig;
///
/// let cfg: EngineConfig = serde_json::from_str(r#"{ "settlement_ttl_slots": 20 }"#)
///     .expect("valid json");
/// assert_eq!(cfg.settlement_ttl_slots(), 20);
/// assert_eq!(cfg.ratio_tolerance().get(), 100);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    ratio_tolerance: BasisPoints,
    settlement_ttl_slots: u64,
    settler_policy: SettlerPolicy,
    max_instructions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ratio_tolerance: BasisPoints::new(100),
            settlement_ttl_slots: 150,
            settler_policy: SettlerPolicy::default(),
            max_instructions: 64,
        }
    }
}

impl EngineConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] if any field is out of
    /// range (see [`validate`](Self::validate)).
    pub fn new(
        ratio_tolerance: BasisPoints,
        settlement_ttl_slots: u64,
        settler_policy: SettlerPolicy,
        max_instructions: usize,
    ) -> Result<Self, DexError> {
        let config = Self {
            ratio_tolerance,
            settlement_ttl_slots,
            settler_policy,
            max_instructions,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// - `ratio_tolerance` is at most 100%.
    /// - `settlement_ttl_slots` and `max_instructions` are non-zero.
    /// - An allowlist policy names at least one settler.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] on the first violation.
    pub fn validate(&self) -> Result<(), DexError> {
        if !self.ratio_tolerance.within_whole() {
            return Err(DexError::InvalidConfiguration("ratio tolerance above 100%"));
        }
        if self.settlement_ttl_slots == 0 {
            return Err(DexError::InvalidConfiguration("settlement ttl must be positive"));
        }
        if self.max_instructions == 0 {
            return Err(DexError::InvalidConfiguration("instruction limit must be positive"));
        }
        if matches!(&self.settler_policy, SettlerPolicy::Allowlist(list) if list.is_empty()) {
            return Err(DexError::InvalidConfiguration("settler allowlist is empty"));
        }
        Ok(())
    }

    /// Largest accepted deviation of a deposit from the pool ratio.
    #[must_use]
    pub const fn ratio_tolerance(&self) -> BasisPoints {
        self.ratio_tolerance
    }

    /// Slots a reservation stays valid after it is made.
    #[must_use]
    pub const fn settlement_ttl_slots(&self) -> u64 {
        self.settlement_ttl_slots
    }

    /// Who may resolve unexpired reservations.
    #[must_use]
    pub const fn settler_policy(&self) -> &SettlerPolicy {
        &self.settler_policy
    }

    /// Most instructions accepted in one transaction or sequence.
    #[must_use]
    pub const fn max_instructions(&self) -> usize {
        self.max_instructions
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn owner(b: u8) -> OwnerId {
        OwnerId::from_bytes([b; 32])
    }

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        let tolerance = EngineConfig::new(BasisPoints::new(10_001), 10, SettlerPolicy::Any, 8);
        assert!(matches!(tolerance, Err(DexError::InvalidConfiguration(_))));
        let ttl = EngineConfig::new(BasisPoints::new(50), 0, SettlerPolicy::Any, 8);
        assert!(matches!(ttl, Err(DexError::InvalidConfiguration(_))));
        let empty = EngineConfig::new(BasisPoints::new(50), 10, SettlerPolicy::Allowlist(vec![]), 8);
        assert!(matches!(empty, Err(DexError::InvalidConfiguration(_))));
    }

    #[test]
    fn policy_permissions() {
        let (alice, bob, carol) = (owner(1), owner(2), owner(3));
        let default = SettlerPolicy::InitiatorOrDesignated;
        assert!(default.permits(&alice, &alice, None));
        assert!(default.permits(&bob, &alice, Some(&bob)));
        assert!(!default.permits(&carol, &alice, Some(&bob)));

        assert!(SettlerPolicy::Any.permits(&carol, &alice, None));

        let list = SettlerPolicy::Allowlist(vec![carol]);
        assert!(list.permits(&carol, &alice, Some(&bob)));
        assert!(!list.permits(&bob, &alice, Some(&bob)));
    }

    #[test]
    fn deserializes_policy() {
        let Ok(cfg) = serde_json::from_str::<EngineConfig>(r#"{ "settler_policy": "any", "ratio_tolerance": 25 }"#)
        else {
            panic!("valid json");
        };
        assert_eq!(cfg.settler_policy(), &SettlerPolicy::Any);
        assert_eq!(cfg.ratio_tolerance(), BasisPoints::new(25));
        assert_eq!(cfg.settlement_ttl_slots(), 150);
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(serde_json::from_str::<EngineConfig>(r#"{ "retries": 3 }"#).is_err());
    }
}
