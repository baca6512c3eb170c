//! # Integration Test Flows
//!
//! End-to-end scenarios through `SyncNode`: sealed notes go onto the
//! ledger, accounts register with their information keys, and signed
//! queries read the matches back.
//!
//! ## Flows Tested
//!
//! 1. **Register then transact**: live matching of data and nullifier notes
//! 2. **Transact then register**: backfill yields the same records
//! 3. **Isolation**: accounts only see notes sealed to their own key
//! 4. **Authentication**: forged or unknown requests leak nothing
//! 5. **Bus choreography**: ledger, registry and sync events in order
//! 6. **Stuck ownership test**: one slow account does not hold up the rest,
//!    and it catches up once unstuck even if no block follows

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;

    use node_runtime::{GetNotesRequest, NodeConfig, RegisterAccountRequest, SyncNode};
    use proptest::prelude::*;
    use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus, LedgerEvent};
    use shared_crypto::{note_commitment, seal_note, sign_request};
    use shared_types::{AccountId, NoteId, ViewingKey};
    use th_01_ledger_client::{InMemoryLedger, NotePayload};
    use th_04_note_sync::test_utils::SlowForKey;
    use th_04_note_sync::{NoteSyncApi, TrialDecryption};
    use th_05_query_service::Ed25519RequestVerifier;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type NoteSet = BTreeSet<(String, u64, bool)>;

    fn key(tag: u8) -> Vec<u8> {
        vec![tag; 32]
    }

    fn account(tag: u8) -> AccountId {
        AccountId::new([tag; 32])
    }

    fn sealed(key: &[u8], body: &[u8]) -> NotePayload {
        let sealed = seal_note(key, body).unwrap();
        NotePayload::new(NoteId::new(note_commitment(&sealed)), sealed)
    }

    async fn register(node: &SyncNode, tag: u8) -> u16 {
        node.register_account(RegisterAccountRequest {
            id: account(tag).to_hex(),
            information_key: hex::encode(key(tag)),
        })
        .await
        .unwrap()
        .status
    }

    fn signed_query(tag: u8, signer_key: &[u8]) -> GetNotesRequest {
        let message = "list my notes";
        let sig = sign_request(signer_key, account(tag).as_bytes(), message.as_bytes()).unwrap();
        GetNotesRequest {
            id: account(tag).to_hex(),
            signature: hex::encode(sig.as_bytes()),
            message: message.to_string(),
        }
    }

    fn notes(node: &SyncNode, tag: u8) -> NoteSet {
        node.get_notes(&signed_query(tag, &key(tag)))
            .unwrap()
            .into_iter()
            .map(|v| {
                assert_eq!(v.owner, account(tag).to_hex());
                (v.id, v.block_num, v.nullifier)
            })
            .collect()
    }

    fn node() -> SyncNode {
        SyncNode::new(NodeConfig::for_testing()).unwrap()
    }

    // =============================================================================
    // REGISTRATION VS. TRANSACTION ORDER
    // =============================================================================

    #[tokio::test]
    async fn test_register_before_transaction() {
        let node = node();
        assert_eq!(register(&node, 1).await, 201);

        let d1 = sealed(&key(1), b"asset");
        let n1 = sealed(&key(1), b"spend");
        let block = node
            .submit_transaction(vec![d1.clone()], vec![n1.clone()])
            .await
            .unwrap();
        assert_eq!(block, 0);

        let expected: NoteSet = [(d1.id.to_hex(), 0, false), (n1.id.to_hex(), 0, true)]
            .into_iter()
            .collect();
        assert_eq!(notes(&node, 1), expected);
    }

    #[tokio::test]
    async fn test_backfill_matches_live_result() {
        let d1 = sealed(&key(1), b"asset");
        let n1 = sealed(&key(1), b"spend");

        let live = node();
        register(&live, 1).await;
        live.submit_transaction(vec![d1.clone()], vec![n1.clone()])
            .await
            .unwrap();

        let backfilled = node();
        backfilled
            .submit_transaction(vec![d1], vec![n1])
            .await
            .unwrap();
        assert_eq!(register(&backfilled, 1).await, 201);

        assert_eq!(notes(&live, 1), notes(&backfilled, 1));
        assert_eq!(notes(&backfilled, 1).len(), 2);
    }

    #[tokio::test]
    async fn test_accounts_see_only_their_blocks() {
        let node = node();
        register(&node, 1).await;
        register(&node, 2).await;

        node.submit_transaction(vec![sealed(&key(1), b"a")], vec![sealed(&key(1), b"a-")])
            .await
            .unwrap();
        node.submit_transaction(vec![sealed(&key(2), b"b")], vec![sealed(&key(2), b"b-")])
            .await
            .unwrap();

        let a = notes(&node, 1);
        let b = notes(&node, 2);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert!(a.iter().all(|(_, block, _)| *block == 0));
        assert!(b.iter().all(|(_, block, _)| *block == 1));
    }

    // =============================================================================
    // AUTHENTICATION
    // =============================================================================

    #[tokio::test]
    async fn test_forged_query_is_unauthorized() {
        let node = node();
        register(&node, 1).await;
        node.submit_transaction(vec![sealed(&key(1), b"secret")], vec![])
            .await
            .unwrap();

        let forged = signed_query(1, &key(2));
        let err = node.get_notes(&forged).unwrap_err();
        assert_eq!(err.status, 401);

        let unknown = signed_query(3, &key(3));
        assert_eq!(node.get_notes(&unknown).unwrap_err(), err);
    }

    #[tokio::test]
    async fn test_registered_account_without_notes() {
        let node = node();
        register(&node, 1).await;
        node.submit_transaction(vec![sealed(&key(2), b"not yours")], vec![])
            .await
            .unwrap();
        assert!(notes(&node, 1).is_empty());
    }

    // =============================================================================
    // BUS CHOREOGRAPHY
    // =============================================================================

    #[tokio::test]
    async fn test_events_follow_the_flow() {
        let node = node();
        let mut sub = node.bus().subscribe(EventFilter::all());

        register(&node, 1).await;
        node.submit_transaction(vec![sealed(&key(1), b"x")], vec![])
            .await
            .unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(
                tokio::time::timeout(Duration::from_secs(1), sub.recv())
                    .await
                    .unwrap()
                    .unwrap(),
            );
        }

        assert_eq!(
            seen[0],
            LedgerEvent::AccountRegistered {
                account: account(1)
            }
        );
        assert!(matches!(&seen[1], LedgerEvent::BlockAppended(block) if block.number == 0));
        assert_eq!(
            seen[2],
            LedgerEvent::AccountSynced {
                account: account(1),
                watermark: 0
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_follower_with_concurrent_registrations() {
        let node = Arc::new(node());
        let follower = node.spawn_follower();
        const ACCOUNTS: u8 = 6;
        const BLOCKS: usize = 12;

        let submitter = {
            let node = node.clone();
            tokio::spawn(async move {
                for i in 0..BLOCKS {
                    let added = (1..=ACCOUNTS)
                        .map(|tag| sealed(&key(tag), format!("{}-{}", tag, i).as_bytes()))
                        .collect();
                    node.ledger().submit_transaction(added, vec![]).await.unwrap();
                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
            })
        };
        let registrations: Vec<_> = (1..=ACCOUNTS)
            .map(|tag| {
                let node = node.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(u64::from(tag) * 4)).await;
                    register(&node, tag).await
                })
            })
            .collect();

        submitter.await.unwrap();
        for registration in registrations {
            assert_eq!(registration.await.unwrap(), 201);
        }
        // Drain whatever the follower has not applied yet.
        node.resume().await.unwrap();

        for tag in 1..=ACCOUNTS {
            assert_eq!(notes(&node, tag).len(), BLOCKS, "account {}", tag);
        }

        node.shutdown();
        follower.await.unwrap();
    }

    // =============================================================================
    // ISOLATION OF A STUCK ACCOUNT
    // =============================================================================

    /// Node whose ownership test hangs on account 2's key until released.
    fn node_stuck_on_account_2(delay: Duration) -> (SyncNode, SlowForKey) {
        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = Arc::new(InMemoryLedger::with_bus(bus.clone() as Arc<dyn EventPublisher>));
        let slow = SlowForKey::new(ViewingKey::from_bytes(key(2)), delay);

        let mut config = NodeConfig::for_testing();
        config.sync.account_scan_timeout_ms = 100;
        let node = SyncNode::with_components(
            config,
            bus,
            ledger,
            Arc::new(slow.clone()),
            Arc::new(Ed25519RequestVerifier),
        )
        .unwrap();
        (node, slow)
    }

    async fn wait_for_notes(node: &SyncNode, tag: u8, count: usize) -> NoteSet {
        let mut found = NoteSet::new();
        for _ in 0..150 {
            found = notes(node, tag);
            if found.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        found
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stuck_account_recovers_after_release() {
        let (node, slow) = node_stuck_on_account_2(Duration::from_millis(600));

        register(&node, 1).await;
        register(&node, 2).await;
        node.submit_transaction(vec![prefixed(1, 10), prefixed(2, 20)], vec![])
            .await
            .unwrap();

        assert_eq!(notes(&node, 1).len(), 1);
        assert!(notes(&node, 2).is_empty());

        slow.release();
        let report = node.resume().await.unwrap();
        assert_eq!(report.recovered, vec![account(2)]);
        assert_eq!(notes(&node, 2).len(), 1);
        assert_eq!(
            node.synchronizer().watermark(&account(2)).await.unwrap(),
            Some(0)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_account_stalled_on_last_block_catches_up_without_new_blocks() {
        let (node, slow) = node_stuck_on_account_2(Duration::from_secs(30));
        let follower = node.spawn_follower();

        register(&node, 1).await;
        register(&node, 2).await;
        node.submit_transaction(vec![prefixed(1, 10), prefixed(2, 20)], vec![])
            .await
            .unwrap();

        assert_eq!(notes(&node, 1).len(), 1);
        assert!(notes(&node, 2).is_empty());
        assert_eq!(
            node.synchronizer().lagging_accounts().await,
            vec![account(2)]
        );

        // No further block is submitted; the follower's retry picks it up.
        slow.release();
        assert_eq!(wait_for_notes(&node, 2, 1).await.len(), 1);
        assert!(node.synchronizer().lagging_accounts().await.is_empty());

        node.shutdown();
        follower.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stalled_backfill_is_retried() {
        let (node, slow) = node_stuck_on_account_2(Duration::from_secs(30));
        let follower = node.spawn_follower();

        node.submit_transaction(vec![prefixed(2, 20), prefixed(2, 21)], vec![])
            .await
            .unwrap();
        assert_eq!(register(&node, 2).await, 201);
        assert!(notes(&node, 2).is_empty());

        slow.release();
        assert_eq!(wait_for_notes(&node, 2, 2).await.len(), 2);

        node.shutdown();
        follower.await.unwrap();
    }

    fn prefixed(tag: u8, id: u8) -> NotePayload {
        let mut payload = key(tag);
        payload.push(id);
        NotePayload::new(NoteId::new([id; 32]), payload)
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Every note sealed to a registered key is recorded for exactly
        /// that account.
        #[test]
        fn prop_sealed_notes_complete_and_selective(
            owners in proptest::collection::vec(proptest::collection::vec(1u8..=4, 1..4), 1..5),
            late in 1u8..=3,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async {
                let node = node();
                for tag in 1..=3u8 {
                    if tag != late {
                        register(&node, tag).await;
                    }
                }

                let mut expected: Vec<NoteSet> = vec![NoteSet::new(); 5];
                for (block, tx) in owners.iter().enumerate() {
                    let added: Vec<_> = tx
                        .iter()
                        .enumerate()
                        .map(|(i, tag)| sealed(&key(*tag), &[block as u8, i as u8]))
                        .collect();
                    for (note, tag) in added.iter().zip(tx) {
                        expected[usize::from(*tag)].insert((note.id.to_hex(), block as u64, false));
                    }
                    node.submit_transaction(added, vec![]).await.unwrap();
                }
                register(&node, late).await;

                for tag in 1..=3u8 {
                    assert_eq!(notes(&node, tag), expected[usize::from(tag)]);
                }
                // Key 4 never registered: its notes belong to nobody.
                let recorded: usize = (1..=3u8).map(|tag| notes(&node, tag).len()).sum();
                let owned_by_registered = owners.iter().flatten().filter(|t| **t != 4).count();
                assert_eq!(recorded, owned_by_registered);
            });
        }
    }

    #[test]
    fn test_trial_decryption_is_the_default_capability() {
        // The default node opens notes sealed with shared_crypto::seal_note.
        let note = sealed(&key(1), b"x").into_record(shared_types::NoteKind::Data);
        let owns = th_04_note_sync::OwnershipTest::owns(
            &TrialDecryption,
            &ViewingKey::from_bytes(key(1)),
            &note,
        );
        assert_eq!(owns, Ok(true));
    }
}
