//! Content fingerprints for slides.
//!
//! A fingerprint is the SHA-256 hex digest of a slide's title and topics. Two
//! slides with the same fingerprint are treated as carrying the same content
//! by the fuzzy matcher, whatever their ids, notes or layout.

use sha2::{Digest, Sha256};

use crate::model::Slide;

/// Separates the title from the topics and topics from each other so that
/// `("ab", ["c"])` and `("a", ["bc"])` hash differently.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Compute the content fingerprint of a slide.
pub fn content_fingerprint(slide: &Slide) -> String {
    let mut hasher = Sha256::new();
    hasher.update(slide.title.as_bytes());
    for topic in &slide.topics {
        let mut buf = [0u8; 4];
        hasher.update(FIELD_SEPARATOR.encode_utf8(&mut buf).as_bytes());
        hasher.update(topic.as_bytes());
    }
    hex::encode(hasher.finalize())
}
