//! Session token generation

use argon2::password_hash::rand_core::{OsRng, RngCore};
use data_encoding::HEXLOWER;

/// Number of random bytes per session token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Generate an opaque session token: 32 bytes from the OS CSPRNG,
/// lowercase hex encoded (64 characters).
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    HEXLOWER.encode(&bytes)
}
