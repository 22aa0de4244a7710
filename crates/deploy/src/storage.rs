//! Genesis storage for the marketplace contract.
//!
//! The initial storage is fully determined at deploy time: fixed admin, fixed
//! fee, a single TZIP-16 metadata pointer and otherwise empty collections.
//! Ownership of the value passes to the chain at origination; nothing in this
//! tool reads it back afterwards.

use std::collections::BTreeMap;

use crate::{Address, micheline::Micheline};

/// Content-addressed URI of the contract metadata, stored under the root key.
pub const CONTRACT_METADATA_URI: &str = "ipfs://QmRhaKzkHXRWvAtW8mxEmztHywdn2oQ9TApxQ4Yq2BqdPN";

/// The TZIP-16 "root" metadata key.
pub const METADATA_ROOT_KEY: &str = "";

/// Sole administrator of the contract at genesis.
pub const GENESIS_ADMIN: &str = "tz1dZTjhDDhFcVGiXY1WmGuDSrstRNW9Hna4";

/// Marketplace fee at genesis, in basis points.
pub const GENESIS_FEE_BPS: u64 = 25;

/// The value the contract begins its on-chain life with.
///
/// The `swaps` and `currencies` maps carry [`Micheline`] values because their
/// record shapes are owned by the contract, not by this tool; the deployer
/// only ever ships both maps empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialStorage {
    /// TZIP-16 metadata: root key to UTF-8 bytes of the metadata URI.
    pub metadata: BTreeMap<String, Vec<u8>>,
    /// Next swap identifier; monotonically non-decreasing once live.
    pub next_id: u64,
    /// Active swaps, empty at genesis.
    pub swaps: BTreeMap<u64, Micheline>,
    /// Registered FA2 token contracts, empty at genesis.
    pub fa2s: Vec<Address>,
    /// Accepted currencies, empty at genesis.
    pub currencies: BTreeMap<String, Micheline>,
    /// Sole administrator at genesis.
    pub admin: Address,
    /// Admin handover in progress, absent at genesis.
    pub pending_admin: Option<Address>,
    /// Marketplace fee in basis points.
    pub fee: u64,
    /// Whether the contract starts paused.
    pub paused: bool,
}

impl InitialStorage {
    /// Builds the genesis storage value. Pure and deterministic: constant
    /// inputs only, same output every invocation.
    pub fn genesis() -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            METADATA_ROOT_KEY.to_string(),
            CONTRACT_METADATA_URI.as_bytes().to_vec(),
        );

        Self {
            metadata,
            next_id: 0,
            swaps: BTreeMap::new(),
            fa2s: Vec::new(),
            currencies: BTreeMap::new(),
            admin: Address::from(GENESIS_ADMIN),
            pending_admin: None,
            fee: GENESIS_FEE_BPS,
            paused: false,
        }
    }

    /// Lowers the storage to its on-wire Micheline form: a right-comb of
    /// binary pairs over the fields in alphabetical order (the layout LIGO
    /// gives records by default).
    pub fn to_micheline(&self) -> Micheline {
        let metadata = Micheline::seq(
            self.metadata
                .iter()
                .map(|(key, value)| {
                    Micheline::elt(Micheline::string(key.clone()), Micheline::bytes(value.clone()))
                })
                .collect(),
        );
        let swaps = Micheline::seq(
            self.swaps
                .iter()
                .map(|(id, record)| Micheline::elt(Micheline::int(*id), record.clone()))
                .collect(),
        );
        let fa2s = Micheline::seq(
            self.fa2s
                .iter()
                .map(|address| Micheline::string(address.as_str()))
                .collect(),
        );
        let currencies = Micheline::seq(
            self.currencies
                .iter()
                .map(|(id, config)| Micheline::elt(Micheline::string(id.clone()), config.clone()))
                .collect(),
        );
        let pending_admin = match &self.pending_admin {
            Some(address) => Micheline::some(Micheline::string(address.as_str())),
            None => Micheline::none(),
        };

        Micheline::right_comb(vec![
            Micheline::string(self.admin.as_str()),
            currencies,
            fa2s,
            Micheline::int(self.fee),
            metadata,
            Micheline::int(self.next_id),
            Micheline::bool(self.paused),
            pending_admin,
            swaps,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_genesis_is_deterministic() {
        assert_eq!(InitialStorage::genesis(), InitialStorage::genesis());
        assert_eq!(
            InitialStorage::genesis().to_micheline(),
            InitialStorage::genesis().to_micheline()
        );
    }

    #[test]
    fn test_genesis_constants() {
        let storage = InitialStorage::genesis();

        assert_eq!(storage.next_id, 0);
        assert_eq!(storage.fee, 25);
        assert!(!storage.paused);
        assert!(storage.swaps.is_empty());
        assert!(storage.fa2s.is_empty());
        assert!(storage.currencies.is_empty());
        assert_eq!(storage.admin, Address::from(GENESIS_ADMIN));
        assert!(storage.pending_admin.is_none());

        assert_eq!(storage.metadata.len(), 1);
        assert_eq!(
            storage.metadata.get(METADATA_ROOT_KEY).map(Vec::as_slice),
            Some(CONTRACT_METADATA_URI.as_bytes())
        );
    }

    #[test]
    fn test_metadata_uri_is_hex_encoded_on_the_wire() {
        let storage = InitialStorage::genesis();
        let encoded = serde_json::to_string(&storage.to_micheline()).unwrap();

        let uri_hex = hex::encode(CONTRACT_METADATA_URI);
        assert!(uri_hex.starts_with("697066733a2f2f"), "hex of the ipfs:// scheme");
        assert!(encoded.contains(&uri_hex));
    }

    #[test]
    fn test_micheline_layout() {
        let storage = InitialStorage::genesis();
        let value = serde_json::to_value(storage.to_micheline()).unwrap();

        let expected = json!({
            "prim": "Pair",
            "args": [
                {"string": GENESIS_ADMIN},
                {"prim": "Pair", "args": [
                    [],
                    {"prim": "Pair", "args": [
                        [],
                        {"prim": "Pair", "args": [
                            {"int": "25"},
                            {"prim": "Pair", "args": [
                                [{"prim": "Elt", "args": [
                                    {"string": ""},
                                    {"bytes": hex::encode(CONTRACT_METADATA_URI)},
                                ]}],
                                {"prim": "Pair", "args": [
                                    {"int": "0"},
                                    {"prim": "Pair", "args": [
                                        {"prim": "False"},
                                        {"prim": "Pair", "args": [
                                            {"prim": "None"},
                                            [],
                                        ]}
                                    ]}
                                ]}
                            ]}
                        ]}
                    ]}
                ]}
            ]
        });

        assert_eq!(value, expected);
    }
}
