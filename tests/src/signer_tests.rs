//! Request signing properties

use pricewatch_core::prelude::*;
use pricewatch_exchanges::ExchangeError;
use pricewatch_exchanges::binance::{QueryParams, RequestSigner, sign};
use proptest::prelude::*;
use rstest::*;

const SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

#[fixture]
fn signer() -> RequestSigner {
    RequestSigner::new(SECRET).unwrap()
}

#[fixture]
fn account_params() -> QueryParams {
    QueryParams::new()
        .with("timestamp", 1_700_000_000_000u64)
        .with("recvWindow", 5_000u64)
}

#[rstest]
fn test_sign_is_deterministic(signer: RequestSigner, account_params: QueryParams) {
    assert_eq!(signer.sign(&account_params).unwrap(), signer.sign(&account_params).unwrap());
    assert_eq!(
        signer.sign(&account_params).unwrap(),
        sign(&account_params, SECRET.as_bytes()).unwrap()
    );
}

#[rstest]
fn test_insertion_order_does_not_matter(signer: RequestSigner) {
    let a = QueryParams::new().with("symbol", "BNBUSDT").with("timestamp", 1u64);
    let b = QueryParams::new().with("timestamp", 1u64).with("symbol", "BNBUSDT");
    assert_eq!(signer.sign(&a).unwrap(), signer.sign(&b).unwrap());
}

#[rstest]
#[case("timestamp", 1_700_000_000_001u64)]
#[case("recvWindow", 6_000u64)]
fn test_any_change_changes_signature(
    signer: RequestSigner,
    account_params: QueryParams,
    #[case] key: &str,
    #[case] value: u64,
) {
    let changed = account_params.clone().with(key, value);
    assert_ne!(signer.sign(&account_params).unwrap(), signer.sign(&changed).unwrap());
}

#[rstest]
fn test_different_secrets_differ(account_params: QueryParams) {
    let other = RequestSigner::new("another-secret").unwrap();
    assert_ne!(
        RequestSigner::new(SECRET).unwrap().sign(&account_params).unwrap(),
        other.sign(&account_params).unwrap()
    );
}

#[rstest]
fn test_signature_key_rejected(signer: RequestSigner, account_params: QueryParams) {
    let params = account_params.with("signature", "abc");
    assert!(matches!(signer.sign(&params), Err(ExchangeError::InvalidInput(_))));
    assert!(matches!(signer.signed_query(&params), Err(ExchangeError::InvalidInput(_))));
}

#[rstest]
fn test_signed_query_layout(signer: RequestSigner, account_params: QueryParams) {
    let query = signer.signed_query(&account_params).unwrap();
    assert!(query.starts_with("recvWindow=5000&timestamp=1700000000000&signature="));
    assert_eq!(query.matches("signature=").count(), 1);
}

proptest! {
    #[test]
    fn prop_signature_is_lowercase_hex(
        symbol in "[A-Z]{3,10}",
        timestamp in 1_000_000_000_000u64..2_000_000_000_000u64,
        quantity in 1i64..1_000_000,
    ) {
        let params = QueryParams::new()
            .with("symbol", symbol)
            .with("timestamp", timestamp)
            .with("quantity", Fixed::from_i64(quantity));
        let signature = sign(&params, SECRET.as_bytes()).unwrap();

        prop_assert_eq!(signature.len(), 64);
        prop_assert!(signature.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        prop_assert!(RequestSigner::new(SECRET).unwrap().verify(&params.canonical(), &signature));
    }

    #[test]
    fn prop_canonical_keys_sorted(keys in proptest::collection::btree_set("[a-zA-Z]{1,8}", 1..8)) {
        let mut params = QueryParams::new();
        for key in keys.iter().rev() {
            params.insert(key.clone(), 1u64);
        }
        let canonical = params.canonical();
        let emitted: Vec<&str> = canonical.split('&').map(|kv| kv.split('=').next().unwrap()).collect();
        let expected: Vec<&str> = keys.iter().map(String::as_str).collect();
        prop_assert_eq!(emitted, expected);
    }
}
