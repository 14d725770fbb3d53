use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global interner for field ids. Ids arrive as strings from persisted
/// templates and are compared on every hit test and history restore.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a placed field, stable for the document's lifetime.
/// Internally a `Spur` index: 4 bytes, `Copy`, O(1) `Eq`/`Hash`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(Spur);

impl FieldId {
    /// Intern a string id, or return the existing handle for it.
    pub fn intern(s: &str) -> Self {
        FieldId(INTERNER.get_or_intern(s))
    }

    /// The handle for an id that has been interned before. Never grows the
    /// interner, so host-supplied strings can be checked freely.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(FieldId)
    }

    /// Resolve back to the string form used in persisted templates.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a process-unique id of the form `field_<n>`.
    ///
    /// Uniqueness against ids loaded from storage is checked by the caller,
    /// which simply asks again on collision.
    pub fn generate() -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("field_{n}"))
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FieldId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = FieldId::intern("headline");
        let b = FieldId::intern("headline");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "headline");
    }

    #[test]
    fn lookup_does_not_intern() {
        assert_eq!(FieldId::lookup("never-seen-before-id"), None);
        assert_eq!(FieldId::lookup("never-seen-before-id"), None);
        let id = FieldId::intern("subtitle");
        assert_eq!(FieldId::lookup("subtitle"), Some(id));
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = FieldId::generate();
        let b = FieldId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("field_"));
    }
}
