/// Implements helper functions for the password hasher.
use anyhow::bail;
use argon2::{hash_encoded, verify_encoded, Config, ThreadMode, Variant, Version};

use crate::{OldentideError, Result};

// argon2 refuses salts shorter than 8 bytes.
const MIN_SALT_LENGTH: usize = 8;

/// Creates a String that contains the argon2id hash of the given password. The salt is the
/// salt key of the account, so it's stored twice: in its own column and inside the encoded hash.
/// Example format of the resulting hash:
/// $argon2id$v=19$m=65536,t=2,p=4$c29tZXNhbHQ$RdescudvJCsgt3ub+b+dWRWJTmaaJObG
pub fn create_hash(password_data: &[u8], salt: &str) -> Result<String> {
    if salt.len() < MIN_SALT_LENGTH {
        bail!(OldentideError::SaltTooShort(MIN_SALT_LENGTH));
    }

    let l = 32; // length of the hash in bytes
    let m = 64 * 1024; // memory to use in KiB
    let t = 3; // iterations
    let p = 4; // lanes used

    let config = create_argon2id_config(l, m, t, p);
    Ok(hash_encoded(password_data, salt.as_bytes(), &config)?)
}

/// Verifies the given password against an encoded hash. Returns true if the password can produce the given hash.
pub fn verify_hash(password_data: &[u8], hash_string: &str) -> Result<bool> {
    Ok(verify_encoded(hash_string, password_data)?)
}

// l = length of hash, m = memory, t = iterations, p = number of lanes
fn create_argon2id_config<'a>(l: u32, m: u32, t: u32, p: u32) -> Config<'a> {
    Config {
        variant: Variant::Argon2id,
        version: Version::Version13, // 0x13 hex = 19 decimal
        mem_cost: m,
        time_cost: t,
        lanes: p,
        thread_mode: ThreadMode::Parallel,
        secret: &[],
        ad: &[],
        hash_length: l,
    }
}
