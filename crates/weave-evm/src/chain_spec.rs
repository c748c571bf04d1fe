//! Fork rules: fee schedule, opcode gates and precompile registry

use crate::gas::FeeSchedule;
use crate::opcode::Opcode;
use crate::precompiles::PrecompileSet;
use serde::{Deserialize, Serialize};

/// EIP-170 contract size limit
pub const MAX_CODE_SIZE: usize = 24576;

/// Maximum nesting of CALL/CREATE frames
pub const MAX_CALL_DEPTH: usize = 1024;

/// Rules of one fork.
///
/// Missing JSON fields fall back to Constantinople. The precompile registry
/// is not part of the JSON form; it defaults to the Byzantium set.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSpec {
    /// Gas constants
    pub fee_schedule: FeeSchedule,
    /// SHL, SHR, SAR (EIP-145)
    pub has_bitwise_shifting: bool,
    /// EXTCODEHASH (EIP-1052)
    pub has_ext_code_hash: bool,
    /// CREATE2 (EIP-1014)
    pub has_create2: bool,
    /// Net-metered SSTORE (EIP-1283)
    pub sstore_net_metering: bool,
    /// REVERT, RETURNDATASIZE, RETURNDATACOPY, STATICCALL
    pub has_revert: bool,
    /// DELEGATECALL (EIP-7)
    pub has_delegate_call: bool,
    /// Forward at most all but one 64th of the remaining gas (EIP-150)
    pub eip150_call_gas: bool,
    /// Largest deployable code, `None` for unlimited
    pub max_code_size: Option<usize>,
    /// Store empty code instead of failing when the code deposit cannot be paid
    pub create_empty_contract_on_oog: bool,
    /// Charge new-account surcharges for dead rather than missing accounts (EIP-161)
    pub eip161_empty_accounts: bool,
    /// Maximum call depth
    pub max_call_depth: usize,
    /// Precompiled contracts
    #[serde(skip, default = "PrecompileSet::byzantium")]
    pub precompiles: PrecompileSet,
}

impl ChainSpec {
    /// Frontier: no DELEGATECALL, unlimited code size, free empty deploy on deposit failure
    pub fn frontier() -> Self {
        let mut fee_schedule = FeeSchedule::homestead();
        fee_schedule.tx_create_contract = fee_schedule.tx;
        Self {
            fee_schedule,
            has_bitwise_shifting: false,
            has_ext_code_hash: false,
            has_create2: false,
            sstore_net_metering: false,
            has_revert: false,
            has_delegate_call: false,
            eip150_call_gas: false,
            max_code_size: None,
            create_empty_contract_on_oog: true,
            eip161_empty_accounts: false,
            max_call_depth: MAX_CALL_DEPTH,
            precompiles: PrecompileSet::frontier(),
        }
    }

    /// Homestead: DELEGATECALL, create transactions cost 53000
    pub fn homestead() -> Self {
        Self {
            fee_schedule: FeeSchedule::homestead(),
            has_delegate_call: true,
            create_empty_contract_on_oog: false,
            ..Self::frontier()
        }
    }

    /// Byzantium: EIP-150/158/170 rules, REVERT family, modexp
    pub fn byzantium() -> Self {
        Self {
            fee_schedule: FeeSchedule::byzantium(),
            has_revert: true,
            eip150_call_gas: true,
            max_code_size: Some(MAX_CODE_SIZE),
            eip161_empty_accounts: true,
            precompiles: PrecompileSet::byzantium(),
            ..Self::homestead()
        }
    }

    /// Constantinople: shifts, EXTCODEHASH, CREATE2, net-metered SSTORE
    pub fn constantinople() -> Self {
        Self {
            has_bitwise_shifting: true,
            has_ext_code_hash: true,
            has_create2: true,
            sstore_net_metering: true,
            ..Self::byzantium()
        }
    }

    /// Petersburg: Constantinople without net-metered SSTORE
    pub fn petersburg() -> Self {
        Self {
            sstore_net_metering: false,
            ..Self::constantinople()
        }
    }

    /// Preset names accepted by [`by_name`](Self::by_name)
    pub const NAMES: &'static [&'static str] = &[
        "frontier",
        "homestead",
        "byzantium",
        "constantinople",
        "petersburg",
    ];

    /// Look up a preset, case-insensitive
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "frontier" => Some(Self::frontier()),
            "homestead" => Some(Self::homestead()),
            "byzantium" => Some(Self::byzantium()),
            "constantinople" => Some(Self::constantinople()),
            "petersburg" => Some(Self::petersburg()),
            _ => None,
        }
    }

    /// Parse a JSON override; absent fields keep their Constantinople values
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Check if `op` is available under these rules
    pub fn is_enabled(&self, op: Opcode) -> bool {
        match op {
            Opcode::SHL | Opcode::SHR | Opcode::SAR => self.has_bitwise_shifting,
            Opcode::EXTCODEHASH => self.has_ext_code_hash,
            Opcode::CREATE2 => self.has_create2,
            Opcode::REVERT
            | Opcode::RETURNDATASIZE
            | Opcode::RETURNDATACOPY
            | Opcode::STATICCALL => self.has_revert,
            Opcode::DELEGATECALL => self.has_delegate_call,
            _ => true,
        }
    }

    /// Gas a CALL may forward out of `available` after pricing
    pub fn max_forwardable(&self, available: u64) -> u64 {
        if self.eip150_call_gas {
            crate::gas::all_but_one_64th(available)
        } else {
            available
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::constantinople()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Presets ====================

    #[test]
    fn test_preset_gates() {
        let frontier = ChainSpec::frontier();
        assert!(!frontier.is_enabled(Opcode::DELEGATECALL));
        assert!(!frontier.is_enabled(Opcode::REVERT));
        assert_eq!(frontier.fee_schedule.tx_create_contract, 21000);
        assert!(frontier.create_empty_contract_on_oog);

        let homestead = ChainSpec::homestead();
        assert!(homestead.is_enabled(Opcode::DELEGATECALL));
        assert_eq!(homestead.fee_schedule.tx_create_contract, 53000);
        assert!(!homestead.create_empty_contract_on_oog);

        let byzantium = ChainSpec::byzantium();
        assert!(byzantium.is_enabled(Opcode::STATICCALL));
        assert!(!byzantium.is_enabled(Opcode::SHL));
        assert_eq!(byzantium.max_code_size, Some(MAX_CODE_SIZE));
        assert_eq!(byzantium.precompiles.len(), 5);

        let constantinople = ChainSpec::constantinople();
        assert!(constantinople.is_enabled(Opcode::CREATE2));
        assert!(constantinople.is_enabled(Opcode::EXTCODEHASH));
        assert!(constantinople.sstore_net_metering);

        assert!(!ChainSpec::petersburg().sstore_net_metering);
        assert!(ChainSpec::petersburg().has_create2);
    }

    #[test]
    fn test_by_name() {
        for name in ChainSpec::NAMES {
            assert!(ChainSpec::by_name(name).is_some(), "{name}");
        }
        assert!(ChainSpec::by_name("Byzantium").unwrap().has_revert);
        assert!(ChainSpec::by_name("istanbul").is_none());
    }

    #[test]
    fn test_max_forwardable() {
        assert_eq!(ChainSpec::byzantium().max_forwardable(6400), 6300);
        assert_eq!(ChainSpec::homestead().max_forwardable(6400), 6400);
    }

    // ==================== JSON ====================

    #[test]
    fn test_json_override() {
        let spec = ChainSpec::from_json_str(
            r#"{"has_create2": false, "max_code_size": null, "fee_schedule": {"sload": 800}}"#,
        )
        .unwrap();
        assert!(!spec.has_create2);
        assert!(spec.has_bitwise_shifting);
        assert_eq!(spec.max_code_size, None);
        assert_eq!(spec.fee_schedule.sload, 800);
        assert_eq!(spec.fee_schedule.call, 700);
        assert_eq!(spec.precompiles.len(), 5);
    }

    #[test]
    fn test_json_rejects_garbage() {
        assert!(ChainSpec::from_json_str("{not json").is_err());
    }
}
