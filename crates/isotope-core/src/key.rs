#![forbid(unsafe_code)]

//! Keys and chains: the addressing model for observed trees.
//!
//! A [`Key`] addresses one slot of a container: an index into a sequence or
//! a field of a map. A [`Chain`] is the ordered list of keys from the root
//! value down to a node or leaf.
//!
//! # Normalization
//!
//! Keys follow plain-data semantics. A field whose text is a canonical
//! decimal integer (`"2"`, not `"02"`) addresses a sequence slot by index,
//! and an index addressed to a map names the field with its decimal text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step in a [`Chain`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Position in a sequence.
    Index(usize),
    /// Field name in a map.
    Field(String),
}

impl Key {
    /// Interpret this key as a sequence index, if it is one.
    ///
    /// Fields only qualify when their text is the canonical decimal form of
    /// the index, so `"7"` is index 7 while `"07"` and `"+7"` are not.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Field(s) => s
                .parse::<usize>()
                .ok()
                .filter(|i| i.to_string() == *s),
        }
    }

    /// Field-name form of this key.
    #[must_use]
    pub fn to_field(&self) -> String {
        match self {
            Self::Index(i) => i.to_string(),
            Self::Field(s) => s.clone(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Field(s) => f.write_str(s),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Field(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Field(s)
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

/// Path from the root of an observed tree to one of its nodes or leaves.
///
/// Chains are fixed when a node is built. A node moved under a different key
/// afterwards keeps reporting the chain it was created at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain(Vec<Key>);

impl Chain {
    /// The empty chain, addressing the root itself.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A new chain extended by one key. `self` is left untouched.
    #[must_use]
    pub fn child(&self, key: impl Into<Key>) -> Self {
        let mut keys = Vec::with_capacity(self.0.len() + 1);
        keys.extend_from_slice(&self.0);
        keys.push(key.into());
        Self(keys)
    }

    /// Keys from root to leaf.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last key of the chain.
    #[must_use]
    pub fn last(&self) -> Option<&Key> {
        self.0.last()
    }

    /// Split into the parent chain and the final key. `None` at the root.
    #[must_use]
    pub fn split_last(&self) -> Option<(Chain, &Key)> {
        self.0
            .split_last()
            .map(|(last, parent)| (Chain(parent.to_vec()), last))
    }

    /// Whether `prefix` is an ancestor of (or equal to) this chain.
    #[must_use]
    pub fn starts_with(&self, prefix: &Chain) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.0.iter()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for key in &self.0 {
            match key {
                Key::Index(i) => write!(f, "[{i}]")?,
                Key::Field(s) => write!(f, ".{s}")?,
            }
        }
        Ok(())
    }
}

impl From<Vec<Key>> for Chain {
    fn from(keys: Vec<Key>) -> Self {
        Self(keys)
    }
}

impl<K: Into<Key>, const N: usize> From<[K; N]> for Chain {
    fn from(keys: [K; N]) -> Self {
        Self(keys.into_iter().map(Into::into).collect())
    }
}

impl FromIterator<Key> for Chain {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_index_fields() {
        assert_eq!(Key::from("7").as_index(), Some(7));
        assert_eq!(Key::from(3usize).as_index(), Some(3));
        assert_eq!(Key::from("07").as_index(), None);
        assert_eq!(Key::from("+7").as_index(), None);
        assert_eq!(Key::from("name").as_index(), None);
    }

    #[test]
    fn child_leaves_parent_untouched() {
        let parent = Chain::from(["a"]);
        let child = parent.child("b");
        assert_eq!(parent.len(), 1);
        assert_eq!(child, Chain::from(["a", "b"]));
        assert!(child.starts_with(&parent));
        assert!(!parent.starts_with(&child));
    }

    #[test]
    fn split_last_at_root_is_none() {
        assert!(Chain::root().split_last().is_none());
        let chain = Chain::from(vec![Key::from("a"), Key::from(2usize)]);
        let (parent, last) = chain.split_last().unwrap();
        assert_eq!(parent, Chain::from(["a"]));
        assert_eq!(last, &Key::Index(2));
    }

    #[test]
    fn display_reads_like_a_path() {
        let chain = Chain::from(vec![Key::from("todos"), Key::from(2usize), Key::from("done")]);
        assert_eq!(chain.to_string(), "$.todos[2].done");
        assert_eq!(Chain::root().to_string(), "$");
    }

    #[test]
    fn serializes_as_plain_array() {
        let chain = Chain::from(vec![Key::from("d"), Key::from(2usize)]);
        let json = serde_json::to_string(&chain).unwrap();
        assert_eq!(json, r#"["d",2]"#);
    }
}
