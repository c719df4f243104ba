// crates/resource-policy-core/src/hashing.rs
// ============================================================================
// Module: Resource Checksums
// Description: Content hashing for resource identity.
// Purpose: Derive stable resource checksums when upstream metadata has none.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! The remote service uses resource checksums as deduplication keys, so the
//! digest must be a pure function of its inputs. [`resource_checksum`] hashes
//! the provider name, the address, and the original raw-values text in that
//! order, with no salt or separator. Raw (pre-filter) values are used so the
//! checksum survives allow-list changes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;

use crate::resource::ResourceRecord;

// ============================================================================
// SECTION: Resource Checksum
// ============================================================================

/// Computes the hex checksum of a resource from its provider, address, and raw values.
#[must_use]
pub fn resource_checksum(resource: &ResourceRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(resource.provider_name.as_bytes());
    hasher.update(resource.address.as_bytes());
    hasher.update(resource.raw_values.raw().as_bytes());
    hex_encode(&hasher.finalize())
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
