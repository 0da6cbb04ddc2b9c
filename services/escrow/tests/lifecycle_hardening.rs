//! Lifecycle hardening tests
//!
//! Adversarial testing across the escrow crate:
//! - Economic conservation (payout + fee == reward, refund == reward)
//! - All-or-nothing batch funding
//! - No partial mutation on rejected operations
//! - Concurrent submissions on one bounty
//! - Fuzzed lifecycle sequences (proptest)

use std::collections::HashMap;
use std::sync::Arc;

use escrow::book::BountyBook;
use escrow::config::EscrowConfig;
use escrow::credential::CredentialLog;
use escrow::errors::{BountyError, FactoryError};
use escrow::factory;
use escrow::vault::TokenVault;
use types::amount::TokenAmount;
use types::bounty::BountyStatus;
use types::ids::{AuditId, BountyId, ContentId, Identity, IssueId};

const TOKEN: &str = "AUDIT";

fn poster() -> Identity {
    Identity::new("poster")
}

fn platform() -> Identity {
    Identity::new("platform")
}

fn test_config(reward: u128) -> EscrowConfig {
    EscrowConfig {
        default_reward: TokenAmount::new(reward),
        reward_token: TOKEN.to_string(),
        platform_recipient: platform(),
        ..EscrowConfig::default()
    }
}

fn funded(vault: &TokenVault, amount: u128) {
    vault
        .credit(&poster(), TOKEN, TokenAmount::new(amount))
        .unwrap();
    vault.approve(&poster(), &platform(), TokenAmount::new(amount));
}

fn spawn_batch(
    config: &EscrowConfig,
    vault: &TokenVault,
    book: &BountyBook,
    issue_count: usize,
) -> Result<Vec<BountyId>, FactoryError> {
    let issues: Vec<IssueId> = (0..issue_count).map(|_| IssueId::new()).collect();
    factory::create_for_audit(
        config,
        AuditId::new(),
        &poster(),
        &issues,
        &HashMap::new(),
        vault,
        book,
        1_000,
    )
}

// ═══════════════════════════════════════════════════════════════════
// Economic conservation
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_resolution_moves_exactly_the_reward_out_of_escrow() {
    let config = test_config(1_000);
    let vault = TokenVault::new();
    funded(&vault, 5_000);
    let book = BountyBook::new(config.admin.clone());
    let credentials = CredentialLog::new();

    let ids = spawn_batch(&config, &vault, &book, 2).unwrap();
    let locked_before = vault.balance(&poster(), TOKEN).locked;

    let hunter = Identity::new("hunter");
    book.submit_solution(ids[0], hunter.clone(), ContentId::from_bytes(b"fix"), 2_000)
        .unwrap();
    book.resolve(
        ids[0],
        &poster(),
        &hunter,
        ContentId::from_bytes(b"evidence"),
        config.platform_fee_bps,
        &platform(),
        80,
        &vault,
        &credentials,
        3_000,
    )
    .unwrap();

    let locked_after = vault.balance(&poster(), TOKEN).locked;
    assert_eq!(
        locked_before.checked_sub(locked_after),
        Some(TokenAmount::new(1_000)),
        "escrow decreases by exactly the reward"
    );

    // The other bounty's reward is still locked
    assert_eq!(locked_after, TokenAmount::new(1_000));
}

#[test]
fn test_escrow_equals_sum_of_open_rewards_through_lifecycle() {
    let config = test_config(1_000);
    let vault = TokenVault::new();
    funded(&vault, 10_000);
    let book = BountyBook::new(config.admin.clone());
    let credentials = CredentialLog::new();

    let ids = spawn_batch(&config, &vault, &book, 3).unwrap();

    let check = |label: &str| {
        let open_sum = TokenAmount::checked_sum(
            book.list(Some(BountyStatus::Open)).iter().map(|b| b.reward),
        )
        .unwrap();
        assert_eq!(
            vault.balance(&poster(), TOKEN).locked,
            open_sum,
            "escrow invariant after {label}"
        );
    };
    check("batch creation");

    book.close(ids[0], &poster(), &vault, 2_000).unwrap();
    check("close");

    let hunter = Identity::new("hunter");
    book.submit_solution(ids[1], hunter.clone(), ContentId::from_bytes(b"fix"), 2_500)
        .unwrap();
    book.resolve(
        ids[1],
        &poster(),
        &hunter,
        ContentId::from_bytes(b"evidence"),
        100,
        &platform(),
        70,
        &vault,
        &credentials,
        3_000,
    )
    .unwrap();
    check("resolve");
}

// ═══════════════════════════════════════════════════════════════════
// Atomic batch funding
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_underfunded_batch_is_all_or_nothing() {
    let config = test_config(1_000);
    let vault = TokenVault::new();
    funded(&vault, 2_999); // three bounties need 3000
    let book = BountyBook::new(config.admin.clone());

    let result = spawn_batch(&config, &vault, &book, 3);
    assert!(result.is_err());
    assert!(book.list(None).is_empty());
    assert_eq!(vault.balance(&poster(), TOKEN).available, TokenAmount::new(2_999));
    assert_eq!(vault.balance(&poster(), TOKEN).locked, TokenAmount::ZERO);
}

// ═══════════════════════════════════════════════════════════════════
// No partial mutation on rejection
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_rejected_resolve_leaves_everything_untouched() {
    let config = test_config(1_000);
    let vault = TokenVault::new();
    funded(&vault, 1_000);
    let book = BountyBook::new(config.admin.clone());
    let credentials = CredentialLog::new();

    let ids = spawn_batch(&config, &vault, &book, 1).unwrap();
    let hunter = Identity::new("hunter");
    book.submit_solution(ids[0], hunter.clone(), ContentId::from_bytes(b"fix"), 2_000)
        .unwrap();

    let before_bounty = book.get(ids[0]).unwrap();
    let before_balance = vault.balance(&poster(), TOKEN);

    // Wrong caller
    let err = book
        .resolve(
            ids[0],
            &Identity::new("eve"),
            &hunter,
            ContentId::from_bytes(b"evidence"),
            100,
            &platform(),
            80,
            &vault,
            &credentials,
            3_000,
        )
        .unwrap_err();
    assert_eq!(err, BountyError::NotPoster);

    assert_eq!(book.get(ids[0]).unwrap(), before_bounty);
    assert_eq!(vault.balance(&poster(), TOKEN), before_balance);
    assert!(credentials.is_empty());
}

#[test]
fn test_rejected_submission_leaves_submission_list_untouched() {
    let config = test_config(1_000);
    let vault = TokenVault::new();
    funded(&vault, 1_000);
    let book = BountyBook::new(config.admin.clone());

    let ids = spawn_batch(&config, &vault, &book, 1).unwrap();
    let hunter = Identity::new("hunter");
    book.submit_solution(ids[0], hunter.clone(), ContentId::from_bytes(b"fix"), 2_000)
        .unwrap();

    let err = book
        .submit_solution(ids[0], hunter, ContentId::from_bytes(b"fix2"), 2_100)
        .unwrap_err();
    assert_eq!(err, BountyError::DuplicateSubmission);
    assert_eq!(book.submissions(ids[0]).unwrap().len(), 1);
}

// ═══════════════════════════════════════════════════════════════════
// Concurrency
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_concurrent_submissions_serialize_per_bounty() {
    let config = test_config(1_000);
    let vault = TokenVault::new();
    funded(&vault, 1_000);
    let book = Arc::new(BountyBook::new(config.admin.clone()));
    let ids = spawn_batch(&config, &vault, &book, 1).unwrap();
    let bounty_id = ids[0];

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let book = Arc::clone(&book);
            std::thread::spawn(move || {
                let hunter = Identity::new(format!("hunter_{i}"));
                book.submit_solution(
                    bounty_id,
                    hunter,
                    ContentId::from_bytes(format!("fix_{i}").as_bytes()),
                    2_000,
                )
            })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        if handle.join().expect("submitter thread").is_ok() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 8, "distinct hunters all land");
    assert_eq!(book.submissions(bounty_id).unwrap().len(), 8);
}

#[test]
fn test_concurrent_duplicate_hunter_lands_once() {
    let config = test_config(1_000);
    let vault = TokenVault::new();
    funded(&vault, 1_000);
    let book = Arc::new(BountyBook::new(config.admin.clone()));
    let ids = spawn_batch(&config, &vault, &book, 1).unwrap();
    let bounty_id = ids[0];

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let book = Arc::clone(&book);
            std::thread::spawn(move || {
                book.submit_solution(
                    bounty_id,
                    Identity::new("same_hunter"),
                    ContentId::from_bytes(format!("attempt_{i}").as_bytes()),
                    2_000,
                )
            })
        })
        .collect();

    let mut accepted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.join().expect("submitter thread") {
            Ok(_) => accepted += 1,
            Err(BountyError::DuplicateSubmission) => duplicates += 1,
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    assert_eq!(accepted, 1, "one pending submission per hunter per bounty");
    assert_eq!(duplicates, 7);
    assert_eq!(book.submissions(bounty_id).unwrap().len(), 1);
}

// ═══════════════════════════════════════════════════════════════════
// Fuzzed lifecycles
// ═══════════════════════════════════════════════════════════════════

mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Whatever terminal path a bounty takes, no value is created or
        /// destroyed: poster refund or winner payout + platform fee always
        /// reassemble the reward.
        #[test]
        fn fuzz_terminal_paths_conserve_value(
            reward in 1u128..1_000_000,
            fee_bps in 0u32..=10_000,
            resolve_it in proptest::bool::ANY,
        ) {
            let config = EscrowConfig {
                default_reward: TokenAmount::new(reward),
                reward_token: TOKEN.to_string(),
                platform_recipient: platform(),
                ..EscrowConfig::default()
            };
            let vault = TokenVault::new();
            funded(&vault, reward);
            let book = BountyBook::new(config.admin.clone());
            let credentials = CredentialLog::new();
            let ids = spawn_batch(&config, &vault, &book, 1).unwrap();

            let hunter = Identity::new("hunter");
            if resolve_it {
                book.submit_solution(ids[0], hunter.clone(), ContentId::from_bytes(b"fix"), 2_000)
                    .unwrap();
                book.resolve(
                    ids[0], &poster(), &hunter, ContentId::from_bytes(b"e"),
                    fee_bps, &platform(), 75, &vault, &credentials, 3_000,
                ).unwrap();

                let paid = vault.balance(&hunter, TOKEN).available;
                let fee = vault.balance(&platform(), TOKEN).available;
                prop_assert_eq!(paid.checked_add(fee), Some(TokenAmount::new(reward)));
            } else {
                book.close(ids[0], &poster(), &vault, 2_000).unwrap();
                prop_assert_eq!(
                    vault.balance(&poster(), TOKEN).available,
                    TokenAmount::new(reward)
                );
            }

            prop_assert_eq!(vault.balance(&poster(), TOKEN).locked, TokenAmount::ZERO);
        }
    }
}
