// SPDX-License-Identifier: Apache-2.0

use crate::{artifacts, session, MockStarknet};
use amm_testkit::{
    fixtures::{assert_constructor, deploy_amm, GET_TOKEN_A, GET_TOKEN_B},
    Calldata, Error, Felt, Fixtures, Session, Starknet, TwoTokens,
};

#[test]
fn test_constructor() {
    let mut session = session();
    let tokens = session.two_tokens().unwrap();

    let mut starknet = session.starknet();
    let amm = deploy_amm(&mut starknet, &session.artifacts().amm, &tokens).unwrap();

    let res_a = starknet.call(&amm, GET_TOKEN_A, Calldata::new()).unwrap();
    assert_eq!(res_a, vec![tokens.token_a.clone()]);
    let res_b = starknet.call(&amm, GET_TOKEN_B, Calldata::new()).unwrap();
    assert_eq!(res_b, vec![tokens.token_b.clone()]);

    assert_constructor(&starknet, &amm, &tokens).unwrap();
}

#[test]
fn tokens_are_deployed_once_per_session() {
    let mut session = session();

    let first = session.two_tokens().unwrap();
    let second = session.two_tokens().unwrap();

    assert_eq!(first, second);
    assert_ne!(first.token_a, first.token_b);
    assert_eq!(session.session_starknet().transactions(), 2);
}

#[test]
fn amm_lives_in_the_fork_only() {
    let mut session = session();

    let (starknet, amm) = session.amm().unwrap();

    assert_eq!(starknet.transactions(), 3);
    assert!(session
        .session_starknet()
        .call(&amm, GET_TOKEN_A, Calldata::new())
        .is_err());

    // every test gets a pool of its own
    let (_, other) = session.amm().unwrap();
    assert_eq!(amm, other);
    assert_eq!(session.session_starknet().transactions(), 2);
}

#[test]
fn constructor_mismatch_is_reported() {
    let mut session = session();
    let tokens = session.two_tokens().unwrap();
    let swapped = TwoTokens {
        token_a: tokens.token_b.clone(),
        token_b: tokens.token_a.clone(),
    };

    let mut starknet = session.starknet();
    let amm = deploy_amm(&mut starknet, &session.artifacts().amm, &swapped).unwrap();

    match assert_constructor(&starknet, &amm, &tokens) {
        Err(Error::UnexpectedResult {
            function,
            expected,
            found,
        }) => {
            assert_eq!(function, GET_TOKEN_A);
            assert_eq!(expected, vec![tokens.token_a.clone()]);
            assert_eq!(found, vec![tokens.token_b.clone()]);
        }
        other => panic!("expected a mismatch, got {other:?}"),
    }
}

#[test]
fn wrong_constructor_arguments_are_rejected() {
    let mut session = session();
    let tokens = session.two_tokens().unwrap();
    let mut starknet = session.starknet();

    let err = starknet
        .deploy(
            &session.artifacts().amm,
            Calldata::new().felt(tokens.token_a),
        )
        .unwrap_err();

    assert!(matches!(err, Error::Simulator { .. }));
}

#[test]
fn failed_token_deploy_keeps_token_a() {
    let mut session = Session::new(
        MockStarknet::new().failing_deploy(2),
        artifacts(),
        Fixtures::default(),
    );

    assert!(matches!(session.two_tokens(), Err(Error::Simulator { .. })));
    assert_eq!(session.session_starknet().transactions(), 1);

    let tokens = session.two_tokens().unwrap();

    // token A from the first attempt is reused
    assert_eq!(session.session_starknet().transactions(), 2);
    assert_eq!(tokens.token_a, Felt::from(0x1001u64));
    assert_eq!(tokens.token_b, Felt::from(0x1002u64));
}
