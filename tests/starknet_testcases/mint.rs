// SPDX-License-Identifier: Apache-2.0

use crate::{artifacts, session, MockStarknet};
use amm_testkit::{
    fixtures::MINT_FUNCTION, short_string_to_felt, Calldata, Error, Felt, Fixtures, Session,
    Starknet, TestkitConfig, Uint256,
};
use num_bigint::BigInt;
use num_traits::One;

fn balance_of(starknet: &MockStarknet, token: &Felt, account: &Felt) -> Vec<Felt> {
    starknet
        .call(
            token,
            "balanceOf",
            Calldata::new().felt(account.clone()),
        )
        .unwrap()
}

#[test]
fn initial_mint_reaches_recipient() {
    let mut session = session();
    let tokens = session.mint_tokens().unwrap();
    let starknet = session.starknet();

    let expected = Uint256::new(100u128 * 10u128.pow(18))
        .unwrap()
        .to_calldata()
        .unwrap()
        .to_vec();

    for token in [&tokens.token_a, &tokens.token_b] {
        assert_eq!(balance_of(&starknet, token, &Felt::from(123u64)), expected);
        assert_eq!(
            starknet
                .call(token, "totalSupply", Calldata::new())
                .unwrap(),
            expected
        );
    }

    assert_eq!(
        balance_of(&starknet, &tokens.token_a, &Felt::from(124u64)),
        vec![Felt::zero(), Felt::zero()]
    );
}

#[test]
fn tokens_keep_constructor_arguments() {
    let mut session = session();
    let tokens = session.two_tokens().unwrap();
    let starknet = session.starknet();

    let name = starknet
        .call(&tokens.token_a, "name", Calldata::new())
        .unwrap();
    assert_eq!(name, vec![short_string_to_felt("TokenA").unwrap()]);

    let symbol = starknet
        .call(&tokens.token_b, "symbol", Calldata::new())
        .unwrap();
    assert_eq!(symbol, vec![short_string_to_felt("TKNB").unwrap()]);

    let decimals = starknet
        .call(&tokens.token_b, "decimals", Calldata::new())
        .unwrap();
    assert_eq!(decimals, vec![Felt::from(18u64)]);
}

#[test]
fn mint_runs_once_per_session() {
    let mut session = session();

    session.mint_tokens().unwrap();
    let tokens = session.mint_tokens().unwrap();

    // two deploys and two mints
    assert_eq!(session.session_starknet().transactions(), 4);
    assert_eq!(
        balance_of(session.session_starknet(), &tokens.token_b, &Felt::from(123u64))[0],
        Felt::from(100_000_000_000_000_000_000u128)
    );
}

#[test]
fn forks_do_not_leak_into_the_session() {
    let mut session = session();
    let tokens = session.mint_tokens().unwrap();
    let fixtures = session.fixtures().clone();

    let mut starknet = session.starknet();
    starknet
        .invoke(
            &tokens.token_a,
            MINT_FUNCTION,
            fixtures.mint_calldata().unwrap(),
            &fixtures.minter,
        )
        .unwrap();

    assert_eq!(
        balance_of(&starknet, &tokens.token_a, &fixtures.recipient)[0],
        Felt::from(200_000_000_000_000_000_000u128)
    );
    assert_eq!(
        balance_of(session.session_starknet(), &tokens.token_a, &fixtures.recipient)[0],
        Felt::from(100_000_000_000_000_000_000u128)
    );
}

#[test]
fn only_the_minter_can_mint() {
    let mut session = session();
    let tokens = session.two_tokens().unwrap();
    let fixtures = session.fixtures().clone();
    let mut starknet = session.starknet();

    let err = starknet
        .invoke(
            &tokens.token_a,
            MINT_FUNCTION,
            fixtures.mint_calldata().unwrap(),
            &short_string_to_felt("NOBODY").unwrap(),
        )
        .unwrap_err();

    assert_eq!(err.to_string(), "simulator: caller is not the minter");
}

#[test]
fn fixtures_from_config_file() {
    let config = TestkitConfig::from_file("tests/testkit.toml".as_ref()).unwrap();
    let fixtures = Fixtures::from_config(&config).unwrap();

    assert_eq!(fixtures.minter, short_string_to_felt("ADMIN").unwrap());
    assert_eq!(fixtures.initial_mint.high(), BigInt::from(16));
    assert_eq!(fixtures.initial_mint.low(), BigInt::from(5));

    let mut session = Session::new(MockStarknet::new(), artifacts(), fixtures);
    let tokens = session.mint_tokens().unwrap();
    let starknet = session.starknet();

    assert_eq!(
        balance_of(&starknet, &tokens.token_b, &Felt::from(77u64)),
        vec![Felt::from(5u64), Felt::from(16u64)]
    );
    assert_eq!(
        starknet
            .call(&tokens.token_b, "decimals", Calldata::new())
            .unwrap(),
        vec![Felt::from(6u64)]
    );
}

#[test]
fn lenient_amounts_reach_the_contract() {
    // 2^256 is not a Uint256; lenient mode sends it anyway and the token refuses it
    let mut config = TestkitConfig::default();
    config.uint256.strict = false;
    config.mint.amount = (BigInt::one() << 256usize).to_string();

    assert!(Fixtures::from_config(&TestkitConfig {
        uint256: Default::default(),
        ..config.clone()
    })
    .is_err());

    let fixtures = Fixtures::from_config(&config).unwrap();
    let mut session = Session::new(MockStarknet::new(), artifacts(), fixtures);

    assert!(matches!(
        session.mint_tokens(),
        Err(Error::Range(_))
    ));
}

#[test]
fn failed_mint_is_not_repeated() {
    let mut session = Session::new(
        MockStarknet::new().failing_invoke(2),
        artifacts(),
        Fixtures::default(),
    );

    assert!(session.mint_tokens().is_err());

    let tokens = session.mint_tokens().unwrap();
    let starknet = session.session_starknet();

    // two deploys and one mint per token
    assert_eq!(starknet.transactions(), 4);
    for token in [&tokens.token_a, &tokens.token_b] {
        assert_eq!(
            balance_of(starknet, token, &Felt::from(123u64))[0],
            Felt::from(100_000_000_000_000_000_000u128)
        );
    }
}
