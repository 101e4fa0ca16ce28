use std::borrow::Borrow;
use std::hash::Hash;

use hashbrown::{HashMap, HashSet};

/// Assigns consecutive IDs to keys in the order they are first seen.
#[derive(Clone, Debug)]
pub struct Indexer<K> {
    ids: HashMap<K, usize>,
    keys: Vec<K>,
}

impl<K> Indexer<K>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            keys: vec![],
        }
    }

    /// Returns the ID of `key`, registering it if it is new.
    pub fn get_id<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + ToOwned<Owned = K> + Eq + Hash,
    {
        if let Some(&id) = self.ids.get(key) {
            id
        } else {
            let id = self.keys.len();
            self.keys.push(key.to_owned());
            self.ids.insert(key.to_owned(), id);
            id
        }
    }

    pub fn find_id<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }
}

impl<K> PartialEq for Indexer<K>
where
    K: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        // `ids` is derived from `keys`.
        self.keys == other.keys
    }
}

/// Drops repeated tokens, keeping the first occurrence of each.
pub fn unique_tokens<S>(tokens: &[S]) -> Vec<&str>
where
    S: AsRef<str>,
{
    let mut seen = HashSet::with_capacity(tokens.len());
    tokens
        .iter()
        .map(|token| token.as_ref())
        .filter(|&token| seen.insert(token))
        .collect()
}
