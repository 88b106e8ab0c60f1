use crate::core::{Result, WardenError};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of an entity within its kind: either a numeric id or a name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyId {
    Int(i64),
    Name(String),
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Int(v) => write!(f, "{}", v),
            KeyId::Name(v) => write!(f, "{}", v),
        }
    }
}

/// Hierarchical entity key. A key is a (kind, id) pair plus an optional
/// parent key; the full chain up to the root forms the entity's path.
///
/// The parent reference is used for query scoping only. Child entities are
/// owned by their parent's hydrated struct, never the other way around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    kind: String,
    id: KeyId,
    parent: Option<Box<Key>>,
}

impl Key {
    pub fn new(kind: impl Into<String>, id: KeyId) -> Self {
        Self {
            kind: kind.into(),
            id,
            parent: None,
        }
    }

    pub fn with_parent(parent: Key, kind: impl Into<String>, id: KeyId) -> Self {
        Self {
            kind: kind.into(),
            id,
            parent: Some(Box::new(parent)),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &KeyId {
        &self.id
    }

    pub fn int_id(&self) -> Option<i64> {
        match self.id {
            KeyId::Int(v) => Some(v),
            KeyId::Name(_) => None,
        }
    }

    pub fn parent(&self) -> Option<&Key> {
        self.parent.as_deref()
    }

    /// Topmost ancestor of this key, or the key itself when it has no parent.
    pub fn root(&self) -> &Key {
        match self.parent() {
            Some(parent) => parent.root(),
            None => self,
        }
    }

    /// Reports whether `other` lives under this key. A key is considered an
    /// ancestor of itself, matching ancestor-query semantics where the scope
    /// root is part of its own subtree.
    pub fn is_ancestor_of(&self, other: &Key) -> bool {
        let own = self.path();
        let theirs = other.path();
        theirs.len() >= own.len() && theirs[..own.len()] == own[..]
    }

    /// Root-first (kind, id) path. Keys order by this path, which keeps every
    /// descendant adjacent to its ancestors in the index iteration order.
    pub fn path(&self) -> Vec<(&str, &KeyId)> {
        let mut segments = match self.parent() {
            Some(parent) => parent.path(),
            None => Vec::new(),
        };
        segments.push((self.kind.as_str(), &self.id));
        segments
    }

    /// Opaque string form carried in deletion work-items.
    pub fn encode(&self) -> String {
        // serde derives on Key cannot fail for tree-shaped data
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(encoded: &str) -> Result<Key> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|err| WardenError::InvalidArgument(format!("malformed key: {}", err)))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| WardenError::InvalidArgument(format!("malformed key: {}", err)))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path().cmp(&other.path())
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (kind, id)) in self.path().into_iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}({})", kind, id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op_key(id: i64) -> Key {
        Key::new("Operation", KeyId::Int(id))
    }

    #[test]
    fn root_resolves_through_parent_chain() {
        let root = op_key(7);
        let child = Key::with_parent(root.clone(), "BackupRecord", KeyId::Int(1));
        let grandchild = Key::with_parent(child.clone(), "Kind", KeyId::Name("Article".into()));

        assert_eq!(grandchild.root(), &root);
        assert_eq!(root.root(), &root);
    }

    #[test]
    fn ancestor_scope_includes_self_and_descendants() {
        let root = op_key(7);
        let child = Key::with_parent(root.clone(), "BackupRecord", KeyId::Int(1));
        let sibling_root = op_key(8);

        assert!(root.is_ancestor_of(&root));
        assert!(root.is_ancestor_of(&child));
        assert!(!root.is_ancestor_of(&sibling_root));
        assert!(!child.is_ancestor_of(&root));
    }

    #[test]
    fn ordering_keeps_descendants_adjacent() {
        let a = op_key(1);
        let a_child = Key::with_parent(a.clone(), "BackupRecord", KeyId::Int(5));
        let b = op_key(2);

        assert!(a < a_child);
        assert!(a_child < b);
    }

    #[test]
    fn encode_round_trips() {
        let key = Key::with_parent(op_key(42), "BackupRecord", KeyId::Int(9));
        let decoded = Key::decode(&key.encode()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = Key::decode("not a key").unwrap_err();
        assert!(matches!(err, WardenError::InvalidArgument(_)));
    }
}
