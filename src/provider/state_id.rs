//! Composite resource identifiers
//!
//! A resource id packs several key fields into one opaque string: keys are
//! sorted, each pair is rendered as `base64(key):base64(value)` and pairs are
//! joined with `-`. The standard base64 alphabet contains neither `:` nor `-`,
//! so values may hold any characters.

use super::error::{ProviderError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::BTreeMap;

const PAIR_SEPARATOR: char = '-';
const KEY_VALUE_SEPARATOR: char = ':';

/// Encode named id parts into a single id string
pub fn encode_state_id<K, V>(parts: &BTreeMap<K, V>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    parts
        .iter()
        .map(|(k, v)| {
            format!(
                "{}{}{}",
                STANDARD.encode(k.as_ref()),
                KEY_VALUE_SEPARATOR,
                STANDARD.encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join(&PAIR_SEPARATOR.to_string())
}

/// Decode an id produced by [`encode_state_id`]
pub fn decode_state_id(id: &str) -> Result<BTreeMap<String, String>> {
    let invalid = || ProviderError::InvalidStateId(id.to_string());

    if id.is_empty() {
        return Err(invalid());
    }

    id.split(PAIR_SEPARATOR)
        .map(|pair| -> Result<(String, String)> {
            let (k, v) = pair.split_once(KEY_VALUE_SEPARATOR).ok_or_else(invalid)?;
            Ok((decode_part(k).ok_or_else(invalid)?, decode_part(v).ok_or_else(invalid)?))
        })
        .collect()
}

fn decode_part(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// Build an id from `(key, value)` pairs
pub fn state_id(parts: &[(&str, &str)]) -> String {
    let map: BTreeMap<&str, &str> = parts.iter().copied().collect();
    encode_state_id(&map)
}

/// Look up a required part of a decoded id
pub fn id_part<'a>(parts: &'a BTreeMap<String, String>, key: &str, id: &str) -> Result<&'a str> {
    parts
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ProviderError::InvalidStateId(id.to_string()))
}

/// Split an import id of the form `{first}-{second}` on the first `-`
pub(crate) fn split_import_id<'a>(
    id: &'a str,
    kind: &'static str,
    expected: &'static str,
) -> Result<(&'a str, &'a str)> {
    match id.split_once('-') {
        Some((first, second)) if !first.is_empty() && !second.is_empty() => Ok((first, second)),
        _ => Err(ProviderError::ImportFormat {
            id: id.to_string(),
            kind,
            expected,
        }),
    }
}
