//! Key-value list with message (KVLM).
//!
//! The text format behind commit objects:
//! ```text
//! tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904
//! parent 0123...
//! parent 4567...
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!  continued line
//!  -----END PGP SIGNATURE-----
//!
//! Free-text message, possibly
//! spanning lines.
//! ```
//!
//! Headers keep first-seen key order. A repeated key collects its values in
//! encounter order. A value line starting with a single space continues the
//! previous value; the space is dropped and the lines are joined with `\n`.
//! The first empty line ends the headers and everything after it is the
//! message.

use crate::error::{StoreError, StoreResult};

/// Ordered header block plus message.
///
/// Every key maps to a non-empty list of values, so single and repeated
/// headers are handled the same way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Kvlm {
    headers: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
    message: Vec<u8>,
}

impl Kvlm {
    /// Create an empty mapping with an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapping with no headers and the given message.
    pub fn with_message(message: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: Vec::new(),
            message: message.into(),
        }
    }

    /// The free-text message.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Replace the message.
    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) {
        self.message = message.into();
    }

    /// All values of `key`, in encounter order.
    pub fn get(&self, key: &[u8]) -> Option<&[Vec<u8>]> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// The first value of `key`.
    pub fn first(&self, key: &[u8]) -> Option<&[u8]> {
        self.get(key).and_then(|values| values.first()).map(Vec::as_slice)
    }

    /// Append a value to `key`, adding the key at the end if it is new.
    ///
    /// Keys must be non-empty and contain neither spaces nor newlines; the
    /// empty key is reserved for the message.
    pub fn push(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> StoreResult<()> {
        let key = key.into();
        validate_key(&key)?;
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.headers.push((key, vec![value])),
        }
        Ok(())
    }

    /// Replace all values of `key` with a single value, keeping its position.
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> StoreResult<()> {
        let key = key.into();
        validate_key(&key)?;
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.headers.push((key, vec![value])),
        }
        Ok(())
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.headers.iter().map(|(k, _)| k.as_slice())
    }

    /// Headers in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[Vec<u8>])> {
        self.headers
            .iter()
            .map(|(k, values)| (k.as_slice(), values.as_slice()))
    }

    /// Number of distinct header keys.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Encode headers, blank line, and message.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, values) in &self.headers {
            for value in values {
                out.extend_from_slice(key);
                out.push(b' ');
                for &b in value {
                    out.push(b);
                    if b == b'\n' {
                        out.push(b' ');
                    }
                }
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    /// Decode a KVLM payload.
    pub fn decode(raw: &[u8]) -> StoreResult<Self> {
        let mut kvlm = Self::new();
        let mut pos = 0;

        loop {
            let newline = find(raw, pos, b'\n').ok_or_else(|| {
                StoreError::format("commit", "headers are not terminated by a blank line")
            })?;
            let space = find(raw, pos, b' ');

            // A line with no key separator must be the blank line.
            let space = match space {
                Some(space) if space < newline => space,
                _ => {
                    if newline != pos {
                        return Err(StoreError::format(
                            "commit",
                            format!("header line at offset {pos} has no value"),
                        ));
                    }
                    kvlm.message = raw[pos + 1..].to_vec();
                    return Ok(kvlm);
                }
            };

            if space == pos {
                return Err(StoreError::format(
                    "commit",
                    format!("empty header key at offset {pos}"),
                ));
            }
            let key = raw[pos..space].to_vec();

            // The value ends at the first newline not followed by a
            // continuation space.
            let mut end = newline;
            while raw.get(end + 1) == Some(&b' ') {
                end = find(raw, end + 1, b'\n').ok_or_else(|| {
                    StoreError::format("commit", "unterminated continuation line")
                })?;
            }

            let value = unfold(&raw[space + 1..end]);
            match kvlm.headers.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => values.push(value),
                None => kvlm.headers.push((key, vec![value])),
            }
            pos = end + 1;
        }
    }
}

fn validate_key(key: &[u8]) -> StoreResult<()> {
    if key.is_empty() || key.iter().any(|&b| b == b' ' || b == b'\n') {
        return Err(StoreError::format(
            "commit",
            format!("invalid header key {:?}", String::from_utf8_lossy(key)),
        ));
    }
    Ok(())
}

fn find(haystack: &[u8], from: usize, needle: u8) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|offset| from + offset)
}

/// Replace every `\n ` with `\n`.
fn unfold(folded: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(folded.len());
    let mut i = 0;
    while i < folded.len() {
        out.push(folded[i]);
        if folded[i] == b'\n' && folded.get(i + 1) == Some(&b' ') {
            i += 1;
        }
        i += 1;
    }
    out
}
