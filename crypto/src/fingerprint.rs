//! Operation fingerprinting.
//!
//! A fingerprint binds a guarded function name to its full argument tuple, so
//! `set_value(1)` and `set_value(2)` collect votes independently while repeated
//! calls of `set_value(1)` accumulate on the same pending operation.

use quorum_types::OperationFingerprint;
use serde::Serialize;

use crate::hash::blake2b_256_multi;
use crate::CryptoError;

/// Domain separator mixed into every fingerprint.
pub const FINGERPRINT_DOMAIN: &[u8] = b"quorum.operation.v1";

/// Derive the fingerprint of `function` called with `args`.
///
/// The function name is length-prefixed so that no (name, args) pair can
/// collide with another by shifting bytes across the boundary.
pub fn operation_fingerprint<A: Serialize + ?Sized>(
    function: &str,
    args: &A,
) -> Result<OperationFingerprint, CryptoError> {
    let encoded = bincode::serialize(args)?;
    let name_len = (function.len() as u32).to_le_bytes();
    let digest = blake2b_256_multi(&[
        FINGERPRINT_DOMAIN,
        &name_len,
        function.as_bytes(),
        &encoded,
    ]);
    Ok(OperationFingerprint::new(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_types::Principal;

    #[test]
    fn same_call_same_fingerprint() {
        let a = operation_fingerprint("set_value", &(1u64,)).unwrap();
        let b = operation_fingerprint("set_value", &(1u64,)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_arguments_differ() {
        let a = operation_fingerprint("set_value", &(1u64,)).unwrap();
        let b = operation_fingerprint("set_value", &(2u64,)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn different_functions_differ() {
        let a = operation_fingerprint("set_value", &(1u64,)).unwrap();
        let b = operation_fingerprint("set_value_all", &(1u64,)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn name_boundary_is_unambiguous() {
        let a = operation_fingerprint("ab", "c").unwrap();
        let b = operation_fingerprint("a", "bc").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn list_order_matters() {
        let x = Principal::new([1u8; 20]);
        let y = Principal::new([2u8; 20]);
        let a = operation_fingerprint("transfer_beneficiaries", &vec![x, y]).unwrap();
        let b = operation_fingerprint("transfer_beneficiaries", &vec![y, x]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unit_arguments_are_accepted() {
        let fp = operation_fingerprint("pause", &()).unwrap();
        assert!(!fp.is_zero());
    }
}
