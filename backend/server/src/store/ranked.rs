//! Order-statistic treap.
//!
//! Binary search tree on keys, heap on random priorities, every node caching
//! the size of its subtree. Sizes turn rank and positional lookups into a
//! single root-to-leaf walk.
//!
//! | Operation            | Cost (expected)  |
//! |----------------------|------------------|
//! | insert / remove      | O(log n)         |
//! | rank / get           | O(log n)         |
//! | range(offset, count) | O(log n + count) |
//! | pop_back(count)      | O(log n + count) |
use std::cmp::Ordering;

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    priority: u64,
    size: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            priority: rand::random(),
            size: 1,
            left: None,
            right: None,
        })
    }

    fn update(&mut self) {
        self.size = 1 + size(&self.left) + size(&self.right);
    }
}

pub struct RankedSet<K, V> {
    root: Link<K, V>,
}

impl<K: Ord, V> Default for RankedSet<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> RankedSet<K, V> {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn len(&self) -> usize {
        size(&self.root)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Inserts `value` at `key`, handing back the value it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (less, rest) = split_lt(self.root.take(), &key);
        let (existing, greater) = take_first_if(rest, &key);

        let merged = merge(less, Some(Node::new(key, value)));
        self.root = merge(merged, greater);

        existing.map(|node| node.value)
    }

    #[cfg(test)]
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (less, rest) = split_lt(self.root.take(), key);
        let (existing, greater) = take_first_if(rest, key);

        self.root = merge(less, greater);

        existing.map(|node| node.value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let mut link = &self.root;

        while let Some(node) = link {
            match key.cmp(&node.key) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => link = &node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }

        None
    }

    /// 0-based position of `key`, `None` when absent.
    pub fn rank(&self, key: &K) -> Option<usize> {
        let mut link = &self.root;
        let mut before = 0;

        while let Some(node) = link {
            match key.cmp(&node.key) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => {
                    before += size(&node.left) + 1;
                    link = &node.right;
                }
                Ordering::Equal => return Some(before + size(&node.left)),
            }
        }

        None
    }

    /// Values at positions `offset..offset + count`, in key order.
    pub fn range(&self, offset: usize, count: usize) -> Vec<&V> {
        let mut out = Vec::with_capacity(count.min(self.len().saturating_sub(offset)));
        collect(&self.root, offset, count, &mut out);

        out
    }

    /// Removes the `count` greatest keys, returned in key order.
    pub fn pop_back(&mut self, count: usize) -> Vec<V> {
        let keep = self.len().saturating_sub(count);
        let (kept, evicted) = split_at(self.root.take(), keep);
        self.root = kept;

        let mut out = Vec::with_capacity(size(&evicted));
        drain(evicted, &mut out);

        out
    }
}

fn size<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.size)
}

/// Splits into keys `< key` and keys `>= key`.
fn split_lt<K: Ord, V>(link: Link<K, V>, key: &K) -> (Link<K, V>, Link<K, V>) {
    let Some(mut node) = link else {
        return (None, None);
    };

    if node.key < *key {
        let (less, rest) = split_lt(node.right.take(), key);
        node.right = less;
        node.update();

        (Some(node), rest)
    } else {
        let (less, rest) = split_lt(node.left.take(), key);
        node.left = rest;
        node.update();

        (less, Some(node))
    }
}

/// Splits off the first `count` nodes.
fn split_at<K, V>(link: Link<K, V>, count: usize) -> (Link<K, V>, Link<K, V>) {
    let Some(mut node) = link else {
        return (None, None);
    };

    let left = size(&node.left);
    if count <= left {
        let (first, rest) = split_at(node.left.take(), count);
        node.left = rest;
        node.update();

        (first, Some(node))
    } else {
        let (first, rest) = split_at(node.right.take(), count - left - 1);
        node.right = first;
        node.update();

        (Some(node), rest)
    }
}

/// Every key in `lower` must be smaller than every key in `upper`.
fn merge<K, V>(lower: Link<K, V>, upper: Link<K, V>) -> Link<K, V> {
    match (lower, upper) {
        (None, upper) => upper,
        (lower, None) => lower,
        (Some(mut lower), Some(mut upper)) => {
            if lower.priority > upper.priority {
                lower.right = merge(lower.right.take(), Some(upper));
                lower.update();

                Some(lower)
            } else {
                upper.left = merge(Some(lower), upper.left.take());
                upper.update();

                Some(upper)
            }
        }
    }
}

fn take_first_if<K: Ord, V>(link: Link<K, V>, key: &K) -> (Link<K, V>, Link<K, V>) {
    if first_key(&link) == Some(key) {
        split_at(link, 1)
    } else {
        (None, link)
    }
}

fn first_key<K, V>(mut link: &Link<K, V>) -> Option<&K> {
    let mut first = None;

    while let Some(node) = link {
        first = Some(&node.key);
        link = &node.left;
    }

    first
}

fn collect<'a, K, V>(link: &'a Link<K, V>, offset: usize, count: usize, out: &mut Vec<&'a V>) {
    let Some(node) = link else {
        return;
    };

    if out.len() >= count {
        return;
    }

    let left = size(&node.left);
    if offset < left {
        collect(&node.left, offset, count, out);

        if out.len() >= count {
            return;
        }
    }

    if offset <= left {
        out.push(&node.value);
    }

    collect(&node.right, offset.saturating_sub(left + 1), count, out);
}

fn drain<K, V>(link: Link<K, V>, out: &mut Vec<V>) {
    let Some(node) = link else {
        return;
    };

    let Node {
        value, left, right, ..
    } = *node;

    drain(left, out);
    out.push(value);
    drain(right, out);
}
