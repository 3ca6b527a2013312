use alloy::primitives::U256;

use sale_bridge_core::{spend_amount, token_count_from_payload, SpendPayload};

fn units(raw: &str) -> U256 {
    raw.parse().expect("valid decimal amount")
}

#[test]
fn spend_amount_scales_price_by_live_precision() {
    let price = U256::from(1000u64);
    let cases = [
        (1u64, 0u8, "1000"),
        (1, 6, "1000000000"),
        (1, 18, "1000000000000000000000"),
        (2, 0, "2000"),
        (2, 6, "2000000000"),
        (2, 18, "2000000000000000000000"),
        (1000, 0, "1000000"),
        (1000, 6, "1000000000000"),
        (1000, 18, "1000000000000000000000000"),
    ];
    for (tokens, decimals, expected) in cases {
        let amount = spend_amount(tokens, price, decimals).expect("amount computes");
        assert_eq!(amount, units(expected), "{tokens} tokens at {decimals} dp");
    }
}

#[test]
fn spend_amount_overflow_is_an_error_not_a_wrap() {
    let err = spend_amount(2, U256::MAX, 0).expect_err("must overflow");
    assert!(err.to_string().contains("overflow"));
}

#[test]
fn token_count_defaults_to_one() {
    assert_eq!(token_count_from_payload(None), 1);

    let absent = SpendPayload { tokens: None };
    assert_eq!(token_count_from_payload(Some(&absent)), 1);

    let non_numeric = SpendPayload {
        tokens: Some(serde_json::json!("plenty")),
    };
    assert_eq!(token_count_from_payload(Some(&non_numeric)), 1);

    let zero = SpendPayload {
        tokens: Some(serde_json::json!(0)),
    };
    assert_eq!(token_count_from_payload(Some(&zero)), 1);

    let negative = SpendPayload {
        tokens: Some(serde_json::json!(-3)),
    };
    assert_eq!(token_count_from_payload(Some(&negative)), 1);
}

#[test]
fn token_count_uses_the_requested_quantity() {
    let five = SpendPayload {
        tokens: Some(serde_json::json!(5)),
    };
    assert_eq!(token_count_from_payload(Some(&five)), 5);
}
