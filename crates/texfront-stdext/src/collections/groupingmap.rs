//! Associative containers whose mutations are rolled back at the end of each group.
//!
//! [GroupingContainer] adds TeX's grouping semantics to any container satisfying the
//! [BackingContainer] trait.
//! A group is started with [begin_group](GroupingContainer::begin_group) and finished with
//! [end_group](GroupingContainer::end_group).
//! Local insertions made during a group are rolled back when the group ends.
//! Global insertions survive the end of every open group.
//!
//! ```
//! # use texfront_stdext::collections::groupingmap::GroupingHashMap;
//! # use texfront_stdext::collections::groupingmap::Scope;
//! let mut cat_colors = GroupingHashMap::default();
//! cat_colors.insert("paganini", "black", Scope::Local);
//! cat_colors.begin_group();
//! cat_colors.insert("paganini", "gray", Scope::Local);
//! cat_colors.insert("mint", "ginger", Scope::Local);
//! assert_eq!(cat_colors.get(&"paganini"), Some(&"gray"));
//! assert_eq!(cat_colors.end_group(), Ok(()));
//! assert_eq!(cat_colors.get(&"paganini"), Some(&"black"));
//! assert_eq!(cat_colors.get(&"mint"), None);
//! ```
//!
//! The implementation follows TeX's save stack (TeX.2021.268-283).
//! The backing container holds the visible value of each key, tagged with the level of
//! the group it was assigned in.
//! The first local assignment to a key inside a group pushes the previous value onto the
//! save stack; ending the group pops the entries pushed since the group began.
//! A saved value is discarded instead of restored if the visible value was assigned globally.
use std::collections::HashMap;
use std::hash::Hash;

/// Trait for containers that can be wrapped using [GroupingContainer].
pub trait BackingContainer<K, V>: Default {
    fn insert(&mut self, k: K, v: V);

    fn get(&self, k: &K) -> Option<&V>;

    fn get_mut(&mut self, k: &K) -> Option<&mut V>;

    fn remove(&mut self, k: &K);

    fn len(&self) -> usize;
}

impl<K: Eq + Hash, V> BackingContainer<K, V> for HashMap<K, V> {
    fn insert(&mut self, k: K, v: V) {
        HashMap::insert(self, k, v);
    }
    fn get(&self, k: &K) -> Option<&V> {
        HashMap::get(self, k)
    }
    fn get_mut(&mut self, k: &K) -> Option<&mut V> {
        HashMap::get_mut(self, k)
    }
    fn remove(&mut self, k: &K) {
        HashMap::remove(self, k);
    }
    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

/// Keys are indices into the vector, which grows as needed.
impl<V> BackingContainer<usize, V> for Vec<Option<V>> {
    fn insert(&mut self, k: usize, v: V) {
        if k >= self.as_slice().len() {
            self.resize_with(k + 1, Default::default);
        }
        self[k] = Some(v);
    }
    fn get(&self, k: &usize) -> Option<&V> {
        self.as_slice().get(*k).and_then(Option::as_ref)
    }
    fn get_mut(&mut self, k: &usize) -> Option<&mut V> {
        self.as_mut_slice().get_mut(*k).and_then(Option::as_mut)
    }
    fn remove(&mut self, k: &usize) {
        if let Some(slot) = self.as_mut_slice().get_mut(*k) {
            *slot = None;
        }
    }
    fn len(&self) -> usize {
        self.iter().flatten().count()
    }
}

/// A value together with the level of the group in which it was assigned.
///
/// Level 0 means the value was assigned globally or outside of any group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<V> {
    value: V,
    level: usize,
}

/// A wrapper around [BackingContainer] types that adds group semantics.
///
/// See the module docs for more information.
#[derive(Debug)]
pub struct GroupingContainer<K, V, T> {
    current: T,
    save_stack: Vec<(K, Option<Slot<V>>)>,
    // The length of the save stack when each open group began.
    boundaries: Vec<usize>,
}

/// A grouping container based on the [HashMap] type.
pub type GroupingHashMap<K, V> = GroupingContainer<K, V, HashMap<K, Slot<V>>>;

/// A grouping container based on the [Vec] type, keyed by index.
pub type GroupingVec<V> = GroupingContainer<usize, V, Vec<Option<Slot<V>>>>;

/// Which groups an insertion is visible in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    /// Rolled back at the end of the current group.
    Local,
    /// Persists beyond the end of all open groups.
    Global,
}

impl Scope {
    pub fn from_global_flag(global: bool) -> Scope {
        if global {
            Scope::Global
        } else {
            Scope::Local
        }
    }
}

/// Error returned if there is no group to end when [GroupingContainer::end_group] is invoked.
#[derive(Debug, PartialEq, Eq)]
pub struct NoGroupToEndError;

impl std::fmt::Display for NoGroupToEndError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "there is no group to end")
    }
}

impl std::error::Error for NoGroupToEndError {}

impl<K: Clone, V, T: BackingContainer<K, Slot<V>>> GroupingContainer<K, V, T> {
    /// Inserts the key, value pair in the provided scope.
    ///
    /// Returns whether a value already existed at the key.
    pub fn insert(&mut self, key: K, value: V, scope: Scope) -> bool {
        let level = match scope {
            Scope::Global => 0,
            Scope::Local => self.boundaries.len(),
        };
        let new = Slot { value, level };
        match self.current.get_mut(&key) {
            Some(slot) => {
                let old = std::mem::replace(slot, new);
                if level > 0 && old.level != level {
                    self.save_stack.push((key, Some(old)));
                }
                true
            }
            None => {
                if level > 0 {
                    self.save_stack.push((key.clone(), None));
                }
                self.current.insert(key, new);
                false
            }
        }
    }

    /// Retrieves the currently visible value at the provided key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.current.get(key).map(|slot| &slot.value)
    }

    pub fn begin_group(&mut self) {
        self.boundaries.push(self.save_stack.len());
    }

    /// Ends the current group, restoring every value assigned locally inside it.
    pub fn end_group(&mut self) -> Result<(), NoGroupToEndError> {
        let start = self.boundaries.pop().ok_or(NoGroupToEndError)?;
        while self.save_stack.len() > start {
            let (key, saved) = match self.save_stack.pop() {
                None => break,
                Some(entry) => entry,
            };
            // TeX.2021.283: global assignments are retained.
            if matches!(self.current.get(&key), Some(slot) if slot.level == 0) {
                continue;
            }
            match saved {
                None => self.current.remove(&key),
                Some(slot) => self.current.insert(key, slot),
            }
        }
        Ok(())
    }

    /// Number of open groups.
    pub fn depth(&self) -> usize {
        self.boundaries.len()
    }

    /// Number of visible values.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V> GroupingContainer<K, V, HashMap<K, Slot<V>>> {
    /// Keys with a visible value, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.current.keys()
    }
}

/// Collects key, value pairs as global insertions.
impl<K: Clone, V, T: BackingContainer<K, Slot<V>>> FromIterator<(K, V)> for GroupingContainer<K, V, T> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut container = Self::default();
        for (key, value) in iter {
            container.insert(key, value, Scope::Global);
        }
        container
    }
}

impl<K, V, T: Default> Default for GroupingContainer<K, V, T> {
    fn default() -> Self {
        Self {
            current: Default::default(),
            save_stack: vec![],
            boundaries: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_after_nested_insert() {
        let mut map = GroupingHashMap::default();
        map.begin_group();
        map.insert(3, 5, Scope::Local);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&3), None);
        map.insert(3, 4, Scope::Local);
        assert_eq!(map.get(&3), Some(&4));
    }

    #[test]
    fn insert_global_after_no_insert() {
        let mut map = GroupingHashMap::default();
        map.begin_group();
        map.insert(3, 5, Scope::Global);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&3), Some(&5));
    }

    #[test]
    fn global_insert_survives_all_groups() {
        let mut map = GroupingHashMap::default();
        map.insert(3, 1, Scope::Local);
        map.begin_group();
        map.insert(3, 2, Scope::Local);
        map.begin_group();
        map.insert(3, 3, Scope::Local);
        map.insert(3, 4, Scope::Global);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&3), Some(&4));
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&3), Some(&4));
    }

    #[test]
    fn local_after_global_in_same_group() {
        let mut map = GroupingHashMap::default();
        map.insert(3, 1, Scope::Local);
        map.begin_group();
        map.insert(3, 2, Scope::Global);
        map.insert(3, 3, Scope::Local);
        assert_eq!(map.get(&3), Some(&3));
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&3), Some(&2));
    }

    #[test]
    fn global_insert_of_new_key_inside_local_insert() {
        let mut map = GroupingHashMap::default();
        map.begin_group();
        map.insert(3, 1, Scope::Local);
        map.begin_group();
        map.insert(3, 2, Scope::Global);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&3), Some(&2));
    }

    #[test]
    fn multiple_local_inserts_revert_to_first_value() {
        let mut map = GroupingVec::default();
        map.insert(7, 'a', Scope::Local);
        map.begin_group();
        map.insert(7, 'b', Scope::Local);
        map.insert(7, 'c', Scope::Local);
        assert_eq!(map.depth(), 1);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&7), Some(&'a'));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn nested_local_inserts() {
        let mut map = GroupingVec::default();
        map.begin_group();
        map.insert(0, 'a', Scope::Local);
        map.begin_group();
        map.insert(0, 'b', Scope::Local);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&0), Some(&'a'));
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&0), None);
        assert!(map.is_empty());
    }

    #[test]
    fn collected_values_survive_groups() {
        let mut map: GroupingHashMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
        map.begin_group();
        map.insert("a", 3, Scope::Local);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&"a"), Some(&1));
        assert_eq!(map.get(&"b"), Some(&2));
        assert_eq!(map.len(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn scope_serializes_by_name() {
        let json = serde_json::to_string(&[Scope::Local, Scope::Global]).unwrap();
        assert_eq!(json, r#"["Local","Global"]"#);
        let scopes: Vec<Scope> = serde_json::from_str(&json).unwrap();
        assert_eq!(scopes, vec![Scope::Local, Scope::Global]);
    }

    #[test]
    fn end_group_without_group() {
        let mut map = GroupingHashMap::<i32, i32>::default();
        assert_eq!(map.end_group(), Err(NoGroupToEndError));
    }
}
