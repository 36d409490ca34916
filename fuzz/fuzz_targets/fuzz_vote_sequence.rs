#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use quorum_engine::{
    CallContext, CancellationHandler, GuardedCall, QuorumEngine, QuorumError, QuorumKind,
};
use quorum_types::Principal;

#[derive(Arbitrary, Debug)]
enum Action {
    Vote { voter: u8, op: u8, quorum: u8 },
    Cancel { voter: u8, index: u8 },
    Transfer { voter: u8, members: Vec<u8>, how_many: Option<u8> },
}

fn wallet(n: u8) -> Principal {
    Principal::new([n % 16; 20])
}

fn quorum(q: u8) -> QuorumKind {
    match q % 4 {
        0 => QuorumKind::Any,
        1 => QuorumKind::Many,
        2 => QuorumKind::All,
        _ => QuorumKind::SomeK((q / 4) as usize),
    }
}

// Random interleavings of votes, cancels and transfers must never panic and
// must keep the registry consistent with the beneficiary set.
fuzz_target!(|actions: Vec<Action>| {
    let Ok(mut engine) = QuorumEngine::with_beneficiaries((1..=5).map(wallet).collect()) else {
        return;
    };

    for action in actions {
        match action {
            Action::Vote { voter, op, quorum: q } => {
                let Ok(call) = GuardedCall::new("op", &(op,), quorum(q)) else {
                    continue;
                };
                let _ = engine.guard(&CallContext::new(wallet(voter)), &call, |_, _| {
                    Ok::<_, QuorumError>(())
                });
            }
            Action::Cancel { voter, index } => {
                if let Ok(fp) = engine.pending_at(index as usize) {
                    let _ = engine.cancel_pending(&wallet(voter), &fp);
                }
            }
            Action::Transfer { voter, members, how_many } => {
                let list = members.into_iter().map(wallet).collect::<Vec<_>>();
                let ctx = CallContext::new(wallet(voter));
                let _ = match how_many {
                    Some(k) => engine.transfer_beneficiaries_with_quorum(&ctx, list, k as usize),
                    None => engine.transfer_beneficiaries(&ctx, list),
                };
            }
        }

        assert!(engine.beneficiaries_count() >= 1);
        for fp in engine.pending_operations() {
            let voters = engine.voters(fp).unwrap();
            assert!(!voters.is_empty());
            assert!(voters.iter().all(|v| engine.is_beneficiary(v)));
        }
    }
});
