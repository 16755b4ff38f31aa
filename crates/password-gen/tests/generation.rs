use keyfill_password_gen::{
    generate, generate_with, GeneratorError, GeneratorPolicy, DIGITS, LOWERCASE, SYMBOLS,
    UPPERCASE,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn full_universe() -> String {
    format!("{LOWERCASE}{UPPERCASE}{DIGITS}{SYMBOLS}")
}

#[test]
fn default_policy_draws_from_72_characters() {
    let universe = full_universe();
    assert_eq!(universe.len(), 72);
    for _ in 0..50 {
        let password = generate(&GeneratorPolicy::default()).unwrap();
        assert_eq!(password.chars().count(), 16);
        assert!(password.chars().all(|c| universe.contains(c)));
    }
}

#[test]
fn letters_only_policy_never_emits_digits_or_symbols() {
    for _ in 0..50 {
        let password = generate(&GeneratorPolicy::letters_only(16)).unwrap();
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphabetic()));
    }
}

#[test]
fn single_character_policy_is_valid() {
    let password = generate(&GeneratorPolicy::letters_only(1)).unwrap();
    assert_eq!(password.len(), 1);
}

#[test]
fn invalid_length_is_reported() {
    let err = generate(&GeneratorPolicy::letters_only(0)).unwrap_err();
    assert!(matches!(err, GeneratorError::InvalidPolicy(_)));
}

#[test]
fn seeded_rng_is_deterministic() {
    let policy = GeneratorPolicy::default();
    let first = generate_with(&mut StdRng::seed_from_u64(7), &policy).unwrap();
    let second = generate_with(&mut StdRng::seed_from_u64(7), &policy).unwrap();
    assert_eq!(first, second);
}
