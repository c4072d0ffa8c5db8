//! Password hashing utilities

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const PBKDF2_ITERATIONS: u32 = 100_000;
const HASH_LENGTH: usize = 32;

/// hash a password using pbkdf2-sha256, salted with the server id
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut hash,
    );

    hex::encode(hash)
}

/// verify a password against a hash using constant-time comparison
pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    let computed_hash = hash_password(password, salt);
    computed_hash.as_bytes().ct_eq(hash.as_bytes()).into()
}

/// generate a random string of the given length
pub fn generate_random_string(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
