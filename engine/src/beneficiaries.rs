//! The ordered, duplicate-free set of principals holding voting rights.

use quorum_types::Principal;
use std::collections::HashSet;

use crate::error::{QuorumError, ValidationError};

/// Upper bound on the number of beneficiaries.
pub const MAX_BENEFICIARIES: usize = 256;

/// Ordered collection of beneficiaries.
///
/// Invariants: between 1 and [`MAX_BENEFICIARIES`] members, no duplicates, no
/// zero principal. The set is only ever replaced wholesale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeneficiarySet {
    members: Vec<Principal>,
    /// Incremented on every replacement.
    generation: u64,
}

impl BeneficiarySet {
    /// A set holding only the instantiating principal.
    pub fn new(instantiator: Principal) -> Result<Self, QuorumError> {
        Self::from_list(vec![instantiator])
    }

    /// A genesis set built from an explicit list.
    pub fn from_list(members: Vec<Principal>) -> Result<Self, QuorumError> {
        validate(&members)?;
        Ok(Self {
            members,
            generation: 0,
        })
    }

    pub fn is_beneficiary(&self, principal: &Principal) -> bool {
        self.members.contains(principal)
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// The beneficiary at `index`, in the order the set was submitted.
    pub fn at(&self, index: usize) -> Result<Principal, QuorumError> {
        self.members
            .get(index)
            .copied()
            .ok_or(QuorumError::BeneficiaryNotFound {
                index,
                count: self.members.len(),
            })
    }

    pub fn as_slice(&self) -> &[Principal] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = &Principal> {
        self.members.iter()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swap in a list that already passed [`validate`], returning the old members.
    pub(crate) fn replace(&mut self, members: Vec<Principal>) -> Vec<Principal> {
        debug_assert!(validate(&members).is_ok());
        self.generation += 1;
        std::mem::replace(&mut self.members, members)
    }
}

/// Check a proposed beneficiary list.
///
/// Checks run in a fixed order: emptiness, length, zero entries, duplicates.
pub fn validate(list: &[Principal]) -> Result<(), ValidationError> {
    if list.is_empty() {
        return Err(ValidationError::Empty);
    }
    if list.len() > MAX_BENEFICIARIES {
        return Err(ValidationError::TooMany {
            count: list.len(),
            max: MAX_BENEFICIARIES,
        });
    }
    if let Some(index) = list.iter().position(Principal::is_zero) {
        return Err(ValidationError::ZeroPrincipal { index });
    }
    let mut seen = HashSet::with_capacity(list.len());
    for principal in list {
        if !seen.insert(principal) {
            return Err(ValidationError::Duplicate {
                principal: *principal,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(n: u8) -> Principal {
        Principal::new([n; 20])
    }

    #[test]
    fn new_holds_instantiator() {
        let set = BeneficiarySet::new(wallet(1)).unwrap();
        assert_eq!(set.count(), 1);
        assert_eq!(set.at(0).unwrap(), wallet(1));
        assert!(set.is_beneficiary(&wallet(1)));
        assert!(!set.is_beneficiary(&wallet(2)));
        assert_eq!(set.generation(), 0);
    }

    #[test]
    fn zero_instantiator_rejected() {
        assert_eq!(
            BeneficiarySet::new(Principal::ZERO),
            Err(QuorumError::Validation(ValidationError::ZeroPrincipal {
                index: 0
            }))
        );
    }

    #[test]
    fn at_out_of_range() {
        let set = BeneficiarySet::from_list(vec![wallet(1), wallet(2)]).unwrap();
        assert_eq!(
            set.at(2),
            Err(QuorumError::BeneficiaryNotFound { index: 2, count: 2 })
        );
    }

    #[test]
    fn replace_bumps_generation_and_keeps_order() {
        let mut set = BeneficiarySet::new(wallet(1)).unwrap();
        let old = set.replace(vec![wallet(3), wallet(2)]);
        assert_eq!(old, vec![wallet(1)]);
        assert_eq!(set.as_slice(), &[wallet(3), wallet(2)]);
        assert_eq!(set.generation(), 1);
    }

    #[test]
    fn validate_empty() {
        assert_eq!(validate(&[]), Err(ValidationError::Empty));
    }

    #[test]
    fn validate_too_many() {
        let list: Vec<Principal> = (0..=MAX_BENEFICIARIES)
            .map(|i| {
                let mut bytes = [0u8; 20];
                bytes[..8].copy_from_slice(&(i as u64 + 1).to_be_bytes());
                Principal::new(bytes)
            })
            .collect();
        assert_eq!(
            validate(&list),
            Err(ValidationError::TooMany {
                count: MAX_BENEFICIARIES + 1,
                max: MAX_BENEFICIARIES
            })
        );
        assert!(validate(&list[..MAX_BENEFICIARIES]).is_ok());
    }

    #[test]
    fn validate_zero_anywhere() {
        for list in [
            vec![Principal::ZERO],
            vec![Principal::ZERO, wallet(1)],
            vec![wallet(1), Principal::ZERO],
            vec![wallet(1), Principal::ZERO, wallet(2)],
            vec![wallet(1), wallet(2), Principal::ZERO],
        ] {
            assert!(matches!(
                validate(&list),
                Err(ValidationError::ZeroPrincipal { .. })
            ));
        }
    }

    #[test]
    fn validate_duplicates() {
        assert_eq!(
            validate(&[wallet(1), wallet(1)]),
            Err(ValidationError::Duplicate {
                principal: wallet(1)
            })
        );
        assert!(validate(&[wallet(1), wallet(2), wallet(1)]).is_err());
    }

    #[test]
    fn length_checked_before_duplicates() {
        let list = vec![wallet(1); MAX_BENEFICIARIES + 1];
        assert!(matches!(
            validate(&list),
            Err(ValidationError::TooMany { .. })
        ));
    }
}
