//! Opaque handles for presentations, slides, and shapes.
//!
//! A [`Handle`] is `{kind}-{registry}-{seq}` on the wire, e.g. `slide-9f03c2aa-7`.
//! The registry segment is a [`RegistryId`] tag, so a handle minted by one
//! registry never resolves against another. `seq` comes from a single counter
//! shared by all kinds, which keeps handles unique across kinds as well.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::EnumString;

/// Identity of one registry instance (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryId(uuid::Uuid);

impl RegistryId {
    /// Create a new time-ordered ID (UUIDv7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Last 8 hex characters.
    ///
    /// The leading bytes of a v7 UUID are the millisecond timestamp, so two
    /// registries built in the same millisecond would share a prefix. The tail
    /// is random.
    pub fn tag(&self) -> u32 {
        let b = self.0.as_bytes();
        u32::from_be_bytes([b[12], b[13], b[14], b[15]])
    }
}

impl Default for RegistryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistryId({:08x})", self.tag())
    }
}

/// What a handle refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum HandleKind {
    #[strum(serialize = "pres", serialize = "presentation")]
    Presentation,
    Slide,
    Shape,
}

impl HandleKind {
    /// Wire prefix used in the handle string.
    pub fn prefix(&self) -> &'static str {
        match self {
            HandleKind::Presentation => "pres",
            HandleKind::Slide => "slide",
            HandleKind::Shape => "shape",
        }
    }

    /// Human-readable name for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::Presentation => "presentation",
            HandleKind::Slide => "slide",
            HandleKind::Shape => "shape",
        }
    }

    /// The kind a parent of this kind must have, if any.
    pub fn parent_kind(&self) -> Option<HandleKind> {
        match self {
            HandleKind::Presentation => None,
            HandleKind::Slide => Some(HandleKind::Presentation),
            HandleKind::Shape => Some(HandleKind::Slide),
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque identifier for one registry entry.
///
/// Equality covers all three components. A string whose kind prefix was
/// edited by hand therefore names a handle that was never issued.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Handle {
    kind: HandleKind,
    registry: u32,
    seq: u64,
}

impl Handle {
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Wire form: `"{kind}-{registry:08x}-{seq}"`.
    pub fn to_key(&self) -> String {
        self.to_string()
    }

    /// Parse the wire form. Returns `None` for anything that is not exactly
    /// what [`to_key`](Self::to_key) produces.
    pub fn from_key(key: &str) -> Option<Self> {
        key.parse().ok()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:08x}-{}", self.kind.prefix(), self.registry, self.seq)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({self})")
    }
}

/// Error from parsing a handle string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleParseError {
    #[error("malformed handle '{0}': expected <kind>-<registry>-<seq>")]
    Malformed(String),
    #[error("unknown handle kind '{0}'")]
    UnknownKind(String),
}

impl FromStr for Handle {
    type Err = HandleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(3, '-').collect();
        if parts.len() != 3 {
            return Err(HandleParseError::Malformed(s.to_string()));
        }
        let kind = match parts[0] {
            "pres" => HandleKind::Presentation,
            "slide" => HandleKind::Slide,
            "shape" => HandleKind::Shape,
            other => return Err(HandleParseError::UnknownKind(other.to_string())),
        };
        let (tag, seq) = (parts[1], parts[2]);
        // Only the canonical spelling: lowercase hex tag, decimal seq with no
        // sign or leading zeros.
        let tag_ok = tag.len() == 8 && tag.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        let seq_ok = !seq.is_empty()
            && seq.bytes().all(|b| b.is_ascii_digit())
            && (seq == "0" || !seq.starts_with('0'));
        if !(tag_ok && seq_ok) {
            return Err(HandleParseError::Malformed(s.to_string()));
        }
        let registry = u32::from_str_radix(tag, 16)
            .map_err(|_| HandleParseError::Malformed(s.to_string()))?;
        let seq: u64 = seq
            .parse()
            .map_err(|_| HandleParseError::Malformed(s.to_string()))?;
        Ok(Self { kind, registry, seq })
    }
}

impl Serialize for Handle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Mints handles for one registry.
///
/// One counter serves every kind. `fetch_add` makes concurrent allocations
/// disjoint without a lock.
#[derive(Debug)]
pub struct HandleAllocator {
    registry: RegistryId,
    next: AtomicU64,
}

impl HandleAllocator {
    pub fn new(registry: RegistryId) -> Self {
        Self {
            registry,
            next: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> RegistryId {
        self.registry
    }

    pub fn allocate(&self, kind: HandleKind) -> Handle {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        Handle {
            kind,
            registry: self.registry.tag(),
            seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn handle_key_roundtrip() {
        let alloc = HandleAllocator::new(RegistryId::new());
        let h = alloc.allocate(HandleKind::Slide);
        let key = h.to_key();
        assert!(key.starts_with("slide-"));
        assert_eq!(Handle::from_key(&key), Some(h));
    }

    #[test]
    fn handles_unique_across_kinds() {
        let alloc = HandleAllocator::new(RegistryId::new());
        let kinds = [HandleKind::Presentation, HandleKind::Slide, HandleKind::Shape];
        let mut seen = HashSet::new();
        for i in 0..300 {
            let h = alloc.allocate(kinds[i % 3]);
            assert!(seen.insert(h.seq()), "seq reused: {h}");
        }
        assert_eq!(seen.len(), 300);
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!(
            "".parse::<Handle>(),
            Err(HandleParseError::Malformed(_))
        ));
        assert!(matches!(
            "slide-1234".parse::<Handle>(),
            Err(HandleParseError::Malformed(_))
        ));
        assert!(matches!(
            "slide-zzzzzzzz-1".parse::<Handle>(),
            Err(HandleParseError::Malformed(_))
        ));
        assert!(matches!(
            "slide-0000abcd-x".parse::<Handle>(),
            Err(HandleParseError::Malformed(_))
        ));
        assert!(matches!(
            "chart-0000abcd-1".parse::<Handle>(),
            Err(HandleParseError::UnknownKind(_))
        ));
    }

    #[test]
    fn only_canonical_spelling_parses() {
        let h: Handle = "slide-9f03c2aa-7".parse().unwrap();
        assert_eq!(h.to_key(), "slide-9f03c2aa-7");

        for variant in [
            "slide-9f03c2aa-007",
            "slide-9f03c2aa-+7",
            "slide-9F03C2AA-7",
            "slide-+f03c2aa-7",
            " slide-9f03c2aa-7",
            "slide-9f03c2aa-7\n",
        ] {
            assert!(variant.parse::<Handle>().is_err(), "accepted {variant:?}");
        }
    }

    #[test]
    fn kind_prefix_is_part_of_identity() {
        let alloc = HandleAllocator::new(RegistryId::new());
        let h = alloc.allocate(HandleKind::Shape);
        let forged = h.to_key().replacen("shape", "slide", 1);
        let parsed: Handle = forged.parse().unwrap();
        assert_ne!(parsed, h);
        assert_eq!(parsed.seq(), h.seq());
    }

    #[test]
    fn serde_as_string() {
        let alloc = HandleAllocator::new(RegistryId::new());
        let h = alloc.allocate(HandleKind::Presentation);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{h}\""));
        let back: Handle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn parent_kinds() {
        assert_eq!(HandleKind::Presentation.parent_kind(), None);
        assert_eq!(HandleKind::Slide.parent_kind(), Some(HandleKind::Presentation));
        assert_eq!(HandleKind::Shape.parent_kind(), Some(HandleKind::Slide));
    }

    #[test]
    fn kind_from_str_aliases() {
        assert_eq!("PRES".parse::<HandleKind>().unwrap(), HandleKind::Presentation);
        assert_eq!("presentation".parse::<HandleKind>().unwrap(), HandleKind::Presentation);
        assert_eq!("Slide".parse::<HandleKind>().unwrap(), HandleKind::Slide);
    }
}
