/// Module that implements the key material used for accounts.
pub mod password_hash;

use rand::rngs::OsRng;
use rand::Rng;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Creates a random string of `n` ASCII letters (a-z, A-Z).
pub fn random_letters(n: usize) -> String {
    (0..n)
        .map(|_| LETTERS[OsRng.gen_range(0..LETTERS.len())] as char)
        .collect()
}
