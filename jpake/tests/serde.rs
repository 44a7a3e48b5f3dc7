#![cfg(feature = "serde")]

use jpake::{
    groups::{NamedGroup, G1024},
    Round1Message, Round2Message, Secret, Session,
};
use rand::{rngs::StdRng, SeedableRng};

/// Run an exchange where every message crosses the wire as bincode.
#[test]
fn bincode_transport() {
    let group = G1024::group();
    let mut alice = Session::new_with_rng(&group, b"alice", StdRng::seed_from_u64(1));
    let mut bob = Session::new_with_rng(&group, b"bob", StdRng::seed_from_u64(2));
    alice.set_secret(Secret::from_be_bytes(b"hunter42")).unwrap();
    bob.set_secret(Secret::from_be_bytes(b"hunter42")).unwrap();

    let wire = bincode::serialize(&alice.produce_round1().unwrap()).unwrap();
    let alice_one: Round1Message = bincode::deserialize(&wire).unwrap();
    let wire = bincode::serialize(&bob.produce_round1().unwrap()).unwrap();
    let bob_one: Round1Message = bincode::deserialize(&wire).unwrap();
    alice.consume_round1(&bob_one).unwrap();
    bob.consume_round1(&alice_one).unwrap();

    let wire = bincode::serialize(&alice.produce_round2().unwrap()).unwrap();
    let alice_two: Round2Message = bincode::deserialize(&wire).unwrap();
    let wire = bincode::serialize(&bob.produce_round2().unwrap()).unwrap();
    let bob_two: Round2Message = bincode::deserialize(&wire).unwrap();
    alice.consume_round2(&bob_two).unwrap();
    bob.consume_round2(&alice_two).unwrap();

    assert_eq!(alice.derive_key().unwrap(), bob.derive_key().unwrap());
}

#[test]
fn truncated_message() {
    let group = G1024::group();
    let mut alice = Session::new_with_rng(&group, b"alice", StdRng::seed_from_u64(3));

    let wire = bincode::serialize(&alice.produce_round1().unwrap()).unwrap();
    assert!(bincode::deserialize::<Round1Message>(&wire[..wire.len() - 1]).is_err());
}
