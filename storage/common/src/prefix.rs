/// Longest leading byte run shared by `key1` and `key2`, borrowed from `key1`.
pub fn common_prefix<'a>(key1: &'a [u8], key2: &[u8]) -> &'a [u8] {
    let len = key1.iter().zip(key2).take_while(|(a, b)| a == b).count();
    &key1[..len]
}

/// True when `prefix` is a byte-prefix of `key` (an empty prefix matches everything).
pub fn is_prefix_of(prefix: &[u8], key: &[u8]) -> bool { common_prefix(prefix, key).len() == prefix.len() }

/// Concatenate byte segments into a fresh key.
pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let mut key = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}
