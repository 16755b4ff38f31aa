//! Password generation for the vault agent.
//!
//! Every character is drawn independently and uniformly from the policy's character
//! universe using the operating system's CSPRNG.

pub mod errors;
pub mod policy;

pub use errors::GeneratorError;
pub use policy::GeneratorPolicy;

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use tracing::debug;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()";

pub const MIN_LENGTH: usize = 1;
pub const MAX_LENGTH: usize = 128;

/// Generate a password for `policy` using the OS random source.
pub fn generate(policy: &GeneratorPolicy) -> Result<String, GeneratorError> {
    generate_with(&mut OsRng, policy)
}

/// Generate a password drawing randomness from `rng`.
pub fn generate_with<R>(rng: &mut R, policy: &GeneratorPolicy) -> Result<String, GeneratorError>
where
    R: RngCore + CryptoRng,
{
    policy.validate()?;
    let universe = policy.universe();
    if universe.is_empty() {
        return Err(GeneratorError::InvalidPolicy(
            "character universe is empty".into(),
        ));
    }

    let password: String = (0..policy.length)
        .map(|_| universe[rng.gen_range(0..universe.len())] as char)
        .collect();
    debug!(
        target: "password-gen",
        length = policy.length,
        universe = universe.len(),
        "generated password"
    );
    Ok(password)
}
