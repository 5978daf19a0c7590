use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// A hash map that remembers the order in which keys were first inserted.
///
/// Overwriting an existing key keeps its original position.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    map: HashMap<K, V>,
    keys: Vec<K>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            keys: vec![],
        }
    }
}

//
// Only implementing the methods that the stream registry needs
//
impl<K: Hash + Eq + Clone, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    //
    // Delegated methods
    //

    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(k)
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(k)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    //
    // Delegated methods with extra handling to maintain insertion order
    //

    pub fn insert(&mut self, k: K, v: V) -> Option<V> {
        self.map.insert(k.clone(), v).or_else(|| {
            self.keys.push(k);
            None
        })
    }

    pub fn remove<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.map.remove(k)?;
        self.keys.retain(|key| <K as Borrow<Q>>::borrow(key) != k);
        Some(removed)
    }

    //
    // New methods
    //

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys
            .iter()
            .filter_map(move |key| self.map.get(key).map(|value| (key, value)))
    }
}
