//! SHA1-based challenge-response used at handshake.

use sha1::{Digest, Sha1};

/// `scramble411(password, seed) = SHA1(seed || SHA1(SHA1(password))) XOR SHA1(password)`.
///
/// Always returns 20 bytes, even for an empty password: all three SHA1
/// stages still run on an empty input.
pub fn scramble411(password: &[u8], seed: &[u8]) -> [u8; 20] {
    let s1 = Sha1::digest(password);
    let s2 = Sha1::digest(s1);

    let mut hasher = Sha1::new();
    hasher.update(seed);
    hasher.update(s2);
    let s3 = hasher.finalize();

    let mut out = [0u8; 20];
    for i in 0..20 {
        out[i] = s3[i] ^ s1[i];
    }
    out
}

/// Lowercase hex encoding of the scramble, as carried in `ClientAuth.password`.
pub fn scramble411_hex(password: &[u8], seed: &[u8]) -> String {
    hex_encode(&scramble411(password, seed))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{b:02x}").expect("writing to a String cannot fail");
    }
    out
}
