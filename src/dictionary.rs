//! Dictionary: fixed slot array over one ordering list, entries clustered by slot.
//!
//! Every entry lives on a single doubly linked list. Entries whose keys land
//! in the same slot sit next to each other on that list, and the slot array
//! points at the first member of each run. Probing a key therefore touches
//! only its own cluster.
//!
//! Nodes are stored in a generational arena; links and slot pointers are
//! arena keys, so a freed node can never be reached through a stale link or
//! [`Handle`].

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash::{Djb2, SlotHasher};
use slotmap::{DefaultKey, SlotMap};
use std::collections::HashSet;

/// Stable reference to an entry, as returned by
/// [`Dictionary::lookup_entry`] and [`Dictionary::upsert`].
///
/// A handle does not own anything. Once its entry is removed every accessor
/// returns `None`, even if the storage is reused by a later insert.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub fn key<'a, V, H>(&self, dict: &'a Dictionary<V, H>) -> Option<&'a str> {
        dict.nodes.get(self.0).map(|n| &*n.key)
    }

    pub fn value<'a, V, H>(&self, dict: &'a Dictionary<V, H>) -> Option<&'a V> {
        dict.nodes.get(self.0).map(|n| &n.value)
    }

    pub fn value_mut<'a, V, H>(&self, dict: &'a mut Dictionary<V, H>) -> Option<&'a mut V> {
        dict.nodes.get_mut(self.0).map(|n| &mut n.value)
    }

    /// Slot whose cluster the entry belongs to.
    pub fn slot<V, H>(&self, dict: &Dictionary<V, H>) -> Option<usize> {
        dict.nodes.get(self.0).map(|n| n.slot)
    }
}

#[derive(Clone, Debug)]
struct Node<V> {
    key: Box<str>,
    value: V,
    // cached so cluster scans never call back into the hasher
    slot: usize,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

enum Probe {
    /// Slot has no cluster
    Vacant,
    Found(DefaultKey),
    /// Cluster exists without the key; payload is its last member
    Tail(DefaultKey),
}

#[derive(Clone)]
pub struct Dictionary<V, H = Djb2> {
    hasher: H,
    config: Config,
    slots: Box<[Option<DefaultKey>]>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    nodes: SlotMap<DefaultKey, Node<V>>,
}

impl<V> Dictionary<V> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_config_and_hasher(config, Djb2)
    }
}

impl<V> Default for Dictionary<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, H> Dictionary<V, H> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drops every entry, in list order, and leaves the dictionary empty and
    /// reusable.
    pub fn clear(&mut self) {
        log::debug!("Clearing dictionary with {} entries", self.nodes.len());
        self.teardown();
    }

    // Detaches the arena before any value is dropped, so a panicking `Drop`
    // leaves `self` empty and consistent. The drained arena is put back
    // afterwards so its bumped slot versions keep old handles stale.
    fn teardown(&mut self) {
        let mut nodes = std::mem::replace(&mut self.nodes, SlotMap::with_key());
        let mut cur = self.head.take();
        self.tail = None;
        self.slots.fill(None);
        while let Some(k) = cur {
            cur = match nodes.remove(k) {
                Some(node) => node.next,
                None => None,
            };
        }
        debug_assert!(nodes.is_empty(), "ordering list missed live entries");
        self.nodes = nodes;
    }

    fn walk(&self) -> impl Iterator<Item = (DefaultKey, &Node<V>)> + '_ {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            let k = cur?;
            let node = self.nodes.get(k)?;
            cur = node.next;
            Some((k, node))
        })
    }

    /// Splices `k` in right after `prev`, or at the front when `prev` is `None`.
    fn link_after(&mut self, prev: Option<DefaultKey>, k: DefaultKey) {
        let next = match prev {
            Some(p) => self.nodes[p].next,
            None => self.head,
        };
        {
            let node = &mut self.nodes[k];
            node.prev = prev;
            node.next = next;
        }
        match prev {
            Some(p) => self.nodes[p].next = Some(k),
            None => self.head = Some(k),
        }
        match next {
            Some(n) => self.nodes[n].prev = Some(k),
            None => self.tail = Some(k),
        }
    }

    fn unlink(&mut self, k: DefaultKey) -> Option<Node<V>> {
        let (prev, next, slot) = {
            let node = self.nodes.get(k)?;
            (node.prev, node.next, node.slot)
        };
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        if self.slots[slot] == Some(k) {
            let successor = next.filter(|&n| self.nodes[n].slot == slot);
            match successor {
                Some(_) => log::trace!("Slot {slot} advances to its next member"),
                None => log::trace!("Slot {slot} cluster is now empty"),
            }
            self.slots[slot] = successor;
        }
        self.nodes.remove(k)
    }

    fn probe(&self, slot: usize, key: &str) -> Probe {
        let Some(mut cur) = self.slots[slot] else {
            return Probe::Vacant;
        };
        loop {
            let node = &self.nodes[cur];
            if &*node.key == key {
                return Probe::Found(cur);
            }
            match node.next {
                Some(n) if self.nodes[n].slot == slot => cur = n,
                _ => return Probe::Tail(cur),
            }
        }
    }

    fn alloc(&mut self, key: &str, value: V, slot: usize) -> Result<DefaultKey> {
        if self.nodes.len() >= self.config.max_entries {
            log::debug!(
                "Refusing insert: {} entries is the configured maximum",
                self.nodes.len()
            );
            return Err(Error::ResourceExhausted);
        }
        Ok(self.nodes.insert(Node {
            key: key.into(),
            value,
            slot,
            prev: None,
            next: None,
        }))
    }
}

impl<V, H> Dictionary<V, H>
where
    H: SlotHasher,
{
    pub fn with_hasher(hasher: H) -> Self {
        Self::with_config_and_hasher(Config::default(), hasher)
    }

    pub fn with_config_and_hasher(config: Config, hasher: H) -> Self {
        let config = config.sanitized();
        log::debug!(
            "Creating dictionary with {} slots, {}-byte keys",
            config.slots,
            config.key_length
        );
        Self {
            hasher,
            slots: vec![None; config.slots].into_boxed_slice(),
            config,
            head: None,
            tail: None,
            nodes: SlotMap::with_key(),
        }
    }

    fn normalize<'k>(&self, key: &'k str) -> Result<&'k str> {
        let Config {
            key_length,
            key_policy,
            ..
        } = self.config;
        Ok(crate::key::normalize(key, key_length, key_policy)?)
    }

    fn slot_for(&self, key: &str) -> usize {
        let n = self.slots.len();
        let slot = self.hasher.slot(key, n);
        assert!(slot < n, "hasher returned slot {slot} for {n} slots");
        slot
    }

    /// Slot the hasher assigns to `key` after key normalization.
    pub fn slot_of(&self, key: &str) -> Result<usize> {
        let key = self.normalize(key)?;
        Ok(self.slot_for(key))
    }

    /// Inserts `value` under `key`, or overwrites the value of the existing
    /// entry in place. The old value is dropped.
    ///
    /// A new key joins the end of its slot's cluster, or the end of the list
    /// if the slot has no cluster yet.
    pub fn upsert(&mut self, key: &str, value: V) -> Result<Handle> {
        let (handle, _old) = self.put(key, value)?;
        Ok(handle)
    }

    /// Same as [`upsert`](Self::upsert), but hands the previous value back.
    pub fn replace(&mut self, key: &str, value: V) -> Result<Option<V>> {
        let (_, old) = self.put(key, value)?;
        Ok(old)
    }

    fn put(&mut self, key: &str, value: V) -> Result<(Handle, Option<V>)> {
        let key = self.normalize(key)?;
        let slot = self.slot_for(key);

        match self.probe(slot, key) {
            Probe::Found(k) => {
                log::trace!("Overwriting value in slot {slot}");
                let old = std::mem::replace(&mut self.nodes[k].value, value);
                Ok((Handle(k), Some(old)))
            }
            Probe::Vacant => {
                let k = self.alloc(key, value, slot)?;
                log::trace!("Opening cluster for slot {slot} at list tail");
                self.link_after(self.tail, k);
                self.slots[slot] = Some(k);
                Ok((Handle(k), None))
            }
            Probe::Tail(last) => {
                let k = self.alloc(key, value, slot)?;
                log::trace!("Appending to cluster of slot {slot}");
                self.link_after(Some(last), k);
                Ok((Handle(k), None))
            }
        }
    }

    /// Removes `key`, returning its value. `Ok(None)` if it was absent.
    pub fn remove(&mut self, key: &str) -> Result<Option<V>> {
        let key = self.normalize(key)?;
        let slot = self.slot_for(key);
        match self.probe(slot, key) {
            Probe::Found(k) => Ok(self.unlink(k).map(|n| n.value)),
            Probe::Vacant | Probe::Tail(_) => Ok(None),
        }
    }

    pub fn lookup_entry(&self, key: &str) -> Result<Option<Handle>> {
        let key = self.normalize(key)?;
        let slot = self.slot_for(key);
        match self.probe(slot, key) {
            Probe::Found(k) => Ok(Some(Handle(k))),
            Probe::Vacant | Probe::Tail(_) => Ok(None),
        }
    }

    pub fn lookup(&self, key: &str) -> Result<Option<&V>> {
        let key = self.normalize(key)?;
        let slot = self.slot_for(key);
        match self.probe(slot, key) {
            Probe::Found(k) => Ok(Some(&self.nodes[k].value)),
            Probe::Vacant | Probe::Tail(_) => Ok(None),
        }
    }

    pub fn lookup_mut(&mut self, key: &str) -> Result<Option<&mut V>> {
        let key = self.normalize(key)?;
        let slot = self.slot_for(key);
        match self.probe(slot, key) {
            Probe::Found(k) => Ok(Some(&mut self.nodes[k].value)),
            Probe::Vacant | Probe::Tail(_) => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.lookup_entry(key)?.is_some())
    }

    /// Diagnostic audit of the full structure: list links, endpoints, cached
    /// slots, key uniqueness, cluster contiguity and slot pointers. Not part
    /// of the container API; tests call it after mutating.
    ///
    /// Runs in time proportional to entries plus slots.
    #[doc(hidden)]
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let mut seen_keys: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        let mut closed: HashSet<usize> = HashSet::new();
        let mut run_slot: Option<usize> = None;
        let mut prev: Option<DefaultKey> = None;
        let mut count = 0usize;

        for (k, node) in self.walk() {
            count += 1;
            if count > self.nodes.len() {
                return Err("ordering list is cyclic".into());
            }
            if node.prev != prev {
                return Err(format!("broken prev link at {:?}", node.key));
            }
            if node.slot >= self.slots.len() || node.slot != self.slot_for(&node.key) {
                return Err(format!("stale cached slot for {:?}", node.key));
            }
            if !seen_keys.insert(&*node.key) {
                return Err(format!("duplicate key {:?}", node.key));
            }
            if run_slot != Some(node.slot) {
                if let Some(done) = run_slot {
                    closed.insert(done);
                }
                if closed.contains(&node.slot) {
                    return Err(format!("slot {} cluster is split", node.slot));
                }
                if self.slots[node.slot] != Some(k) {
                    return Err(format!(
                        "slot {} does not point at its first member",
                        node.slot
                    ));
                }
                run_slot = Some(node.slot);
            }
            prev = Some(k);
        }

        if count != self.nodes.len() {
            return Err(format!(
                "list reaches {count} of {} entries",
                self.nodes.len()
            ));
        }
        if self.tail != prev {
            return Err("tail is not the last list entry".into());
        }
        if let Some(done) = run_slot {
            closed.insert(done);
        }
        for (slot, first) in self.slots.iter().enumerate() {
            if first.is_some() != closed.contains(&slot) {
                return Err(format!("slot {slot} pointer disagrees with the list"));
            }
        }
        Ok(())
    }
}

impl<V, H> Drop for Dictionary<V, H> {
    fn drop(&mut self) {
        if !self.nodes.is_empty() {
            log::debug!("Dropping dictionary with {} entries", self.nodes.len());
        }
        self.teardown();
    }
}

impl<V: std::fmt::Debug, H> std::fmt::Debug for Dictionary<V, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.walk().map(|(_, n)| (&n.key, &n.value)))
            .finish()
    }
}

#[cfg(test)]
impl<V, H> Dictionary<V, H> {
    pub(crate) fn keys_in_order(&self) -> Vec<String> {
        self.walk().map(|(_, n)| n.key.to_string()).collect()
    }

    pub(crate) fn head_key(&self) -> Option<&str> {
        self.head.and_then(|k| self.nodes.get(k)).map(|n| &*n.key)
    }

    pub(crate) fn tail_key(&self) -> Option<&str> {
        self.tail.and_then(|k| self.nodes.get(k)).map(|n| &*n.key)
    }
}
