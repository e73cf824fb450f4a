use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

#[test]
fn generate_token_has_fixed_length() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(generate_token(&mut rng).len(), TOKEN_LEN);
}

#[test]
fn generate_token_is_lowercase_base36() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..50 {
        let token = generate_token(&mut rng);
        assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()), "bad token {token}");
    }
}

#[test]
fn generate_token_two_calls_differ() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = generate_token(&mut rng);
    let b = generate_token(&mut rng);
    assert_ne!(a, b);
}

#[test]
fn same_seed_same_sequence() {
    let mut a = StdRng::seed_from_u64(99);
    let mut b = StdRng::seed_from_u64(99);
    assert_eq!(generate_token(&mut a), generate_token(&mut b));
    assert_eq!(generate_token(&mut a), generate_token(&mut b));
}

#[test]
fn next_token_differs_from_previous() {
    let mut rng = StdRng::seed_from_u64(4);
    let first = next_token(&mut rng, None);
    let second = next_token(&mut rng, Some(&first));
    assert_ne!(first, second);
}

#[test]
fn works_through_trait_object() {
    let mut rng: Box<dyn RngCore> = Box::new(StdRng::seed_from_u64(5));
    assert_eq!(generate_token(rng.as_mut()).len(), TOKEN_LEN);
}
