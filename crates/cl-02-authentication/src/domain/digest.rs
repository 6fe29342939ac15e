//! # Typed Digests
//!
//! EIP-712 style structured hashing. Each signed message type has a fixed
//! type string; its struct hash is keccak256 over the type hash followed by
//! every field encoded as a 32-byte big-endian word. The final digest is
//! `keccak256(0x19 || 0x01 || domain_separator || struct_hash)`.

use super::ecdsa::keccak256;
use shared_types::{Address, AssetId, Hash, U256};

const DOMAIN_TYPE: &[u8] =
    b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

const WITHDRAW_TYPE: &[u8] = b"Withdraw(address sender,address asset,uint256 amount,uint64 nonce)";

const LINK_SIGNER_TYPE: &[u8] = b"LinkSigner(address account,address signer,uint64 nonce)";

/// Signing domain of one ledger deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedDomain {
    separator: Hash,
}

impl TypedDomain {
    pub fn new(name: &str, version: &str, chain_id: u64, verifying_contract: Address) -> Self {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(&keccak256(DOMAIN_TYPE));
        encoded.extend_from_slice(&keccak256(name.as_bytes()));
        encoded.extend_from_slice(&keccak256(version.as_bytes()));
        encoded.extend_from_slice(&word_u256(U256::from(chain_id)));
        encoded.extend_from_slice(&word_address(&verifying_contract));

        Self {
            separator: keccak256(&encoded),
        }
    }

    pub fn separator(&self) -> &Hash {
        &self.separator
    }

    /// Digest a withdrawal authorization. An `amount` of zero is the
    /// withdraw-all sentinel and is signed as zero.
    pub fn withdraw_digest(
        &self,
        sender: &Address,
        asset: &AssetId,
        amount: U256,
        nonce: u64,
    ) -> Hash {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(&keccak256(WITHDRAW_TYPE));
        encoded.extend_from_slice(&word_address(sender));
        encoded.extend_from_slice(&word_address(asset.as_bytes()));
        encoded.extend_from_slice(&word_u256(amount));
        encoded.extend_from_slice(&word_u256(U256::from(nonce)));
        self.finalize(&keccak256(&encoded))
    }

    /// Digest the delegate's countersignature for a signer link.
    pub fn link_signer_digest(&self, account: &Address, signer: &Address, nonce: u64) -> Hash {
        let mut encoded = Vec::with_capacity(4 * 32);
        encoded.extend_from_slice(&keccak256(LINK_SIGNER_TYPE));
        encoded.extend_from_slice(&word_address(account));
        encoded.extend_from_slice(&word_address(signer));
        encoded.extend_from_slice(&word_u256(U256::from(nonce)));
        self.finalize(&keccak256(&encoded))
    }

    fn finalize(&self, struct_hash: &Hash) -> Hash {
        let mut encoded = Vec::with_capacity(2 + 2 * 32);
        encoded.extend_from_slice(&[0x19, 0x01]);
        encoded.extend_from_slice(&self.separator);
        encoded.extend_from_slice(struct_hash);
        keccak256(&encoded)
    }
}

fn word_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

fn word_u256(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}
