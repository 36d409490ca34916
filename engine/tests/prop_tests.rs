use proptest::prelude::*;

use quorum_engine::{
    CallContext, CancellationHandler, GuardOutcome, GuardedCall, QuorumEngine, QuorumError,
    QuorumKind,
};
use quorum_types::Principal;

fn wallet(n: u8) -> Principal {
    Principal::new([n; 20])
}

fn engine(n: u8) -> QuorumEngine {
    QuorumEngine::with_beneficiaries((1..=n).map(wallet).collect()).unwrap()
}

fn vote(engine: &mut QuorumEngine, voter: u8, op: u64, quorum: QuorumKind) -> Result<GuardOutcome<()>, QuorumError> {
    let call = GuardedCall::new("op", &(op,), quorum)?;
    engine.guard(&CallContext::new(wallet(voter)), &call, |_, _| Ok(()))
}

proptest! {
    /// A majority is always strictly more than half and never more than everyone.
    #[test]
    fn many_is_strict_majority(n in 1usize..=256) {
        let required = QuorumKind::Many.required(n).unwrap();
        prop_assert!(required * 2 > n);
        prop_assert!((required - 1) * 2 <= n);
        prop_assert!(required <= n);
    }

    /// SomeK is valid exactly when 1 <= k <= n.
    #[test]
    fn some_k_validity(n in 1usize..=256, k in 0usize..300) {
        let result = QuorumKind::SomeK(k).required(n);
        prop_assert_eq!(result.is_ok(), k >= 1 && k <= n);
        if let Ok(required) = result {
            prop_assert_eq!(required, k);
        }
    }

    /// The action runs on exactly the vote that reaches the quorum.
    #[test]
    fn executes_on_threshold_vote(n in 1u8..=12, k_seed in 0usize..12) {
        let k = k_seed % n as usize + 1;
        let mut engine = engine(n);
        for voter in 1..=k as u8 {
            let outcome = vote(&mut engine, voter, 1, QuorumKind::SomeK(k)).unwrap();
            prop_assert_eq!(outcome.is_executed(), voter as usize == k);
        }
        prop_assert_eq!(engine.pending_operations_count(), 0);
    }

    /// Pending fingerprints keep their relative order across arbitrary cancels.
    #[test]
    fn pending_order_survives_cancels(
        ops in prop::collection::vec(0u64..1_000, 1..20),
        cancels in prop::collection::vec(any::<prop::sample::Index>(), 0..20),
    ) {
        let mut engine = engine(3);
        let mut expected = Vec::new();
        for op in ops {
            if vote(&mut engine, 1, op, QuorumKind::All).is_ok() {
                expected.push(*GuardedCall::new("op", &(op,), QuorumKind::All).unwrap().fingerprint());
            }
        }
        prop_assert_eq!(engine.pending_operations(), expected.as_slice());

        for index in cancels {
            if expected.is_empty() {
                break;
            }
            let fp = expected.remove(index.index(expected.len()));
            engine.cancel_pending(&wallet(1), &fp).unwrap();
            prop_assert_eq!(engine.pending_operations(), expected.as_slice());
        }
    }

    /// Any completed transfer leaves no pending operations behind.
    #[test]
    fn transfer_clears_pending(pending in 0u64..10, new_size in 1u8..=10) {
        let mut engine = engine(2);
        for op in 0..pending {
            vote(&mut engine, 1, op, QuorumKind::Many).unwrap();
        }
        let list: Vec<Principal> = (100..100 + new_size).map(wallet).collect();
        for voter in [1u8, 2] {
            engine
                .transfer_beneficiaries(&CallContext::new(wallet(voter)), list.clone())
                .unwrap();
        }
        prop_assert_eq!(engine.beneficiaries(), list.as_slice());
        prop_assert_eq!(engine.pending_operations_count(), 0);
    }
}
