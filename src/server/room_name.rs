use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Total length of a generated room name, prefix included.
pub const MAX_NAME_LENGTH: usize = 20;

// 64 symbols, so a masked random byte indexes it uniformly.
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

#[derive(Debug, Error)]
#[error("prefix is {prefix_len} characters, room names must be at most {max_len} characters in total")]
pub struct PrefixTooLongError {
    prefix_len: usize,
    max_len: usize,
}

/// Generates a room name of exactly [`MAX_NAME_LENGTH`] characters: the given
/// prefix followed by characters drawn from the OS random source.
pub fn generate_with_prefix(prefix: &str) -> Result<String, PrefixTooLongError> {
    if prefix.len() >= MAX_NAME_LENGTH {
        return Err(PrefixTooLongError {
            prefix_len: prefix.len(),
            max_len: MAX_NAME_LENGTH,
        });
    }

    let mut suffix = vec![0u8; MAX_NAME_LENGTH - prefix.len()];
    OsRng.fill_bytes(&mut suffix);

    let mut name = String::with_capacity(MAX_NAME_LENGTH);
    name.push_str(prefix);
    for byte in suffix {
        name.push(ALPHABET[(byte & 0x3f) as usize] as char);
    }
    Ok(name)
}
