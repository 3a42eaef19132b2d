/// Small helpers shared by the extractor, the registry and the visitors.
///
/// This module contains offset-to-line conversion, name splitting and
/// content hashing.
use sha2::{Digest, Sha256};

/// Return the last segment of a namespace-qualified name.
///
/// `"Foo\\Bar\\Baz"` → `"Baz"`, `"Baz"` → `"Baz"`.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Return the namespace part of a fully-qualified name, or `""` for the
/// global namespace.
pub fn namespace_of(name: &str) -> &str {
    name.trim_start_matches('\\')
        .rsplit_once('\\')
        .map(|(ns, _)| ns)
        .unwrap_or("")
}

/// Join a namespace and a short name.
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}\\{}", namespace, name)
    }
}

/// Convert a byte offset into a 1-based line number.
pub fn line_at(content: &str, offset: u32) -> usize {
    let end = (offset as usize).min(content.len());
    memchr::memchr_iter(b'\n', &content.as_bytes()[..end]).count() + 1
}

/// Hex-encoded SHA-256 of a file's contents.
///
/// Every class declared in the file shares this hash.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_are_one_based() {
        let src = "<?php\n\nclass A {}\n";
        assert_eq!(line_at(src, 0), 1);
        assert_eq!(line_at(src, 7), 3);
        assert_eq!(line_at(src, 10_000), 4);
    }

    #[test]
    fn namespace_splitting() {
        assert_eq!(namespace_of("\\Foo\\Bar\\Baz"), "Foo\\Bar");
        assert_eq!(namespace_of("Baz"), "");
        assert_eq!(short_name("Foo\\Bar"), "Bar");
        assert_eq!(qualify("", "Foo"), "Foo");
        assert_eq!(qualify("A\\B", "Foo"), "A\\B\\Foo");
    }

    #[test]
    fn hash_is_content_only() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
        assert_eq!(content_hash(b"").len(), 64);
    }
}
