use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// generate_id returns a record id of the form `{unix millis}_{suffix}` where the suffix consists
/// of nine random base-36 characters.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();

    format!("{}_{}", millis, suffix)
}
