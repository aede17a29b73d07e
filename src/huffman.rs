use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::str::FromStr;

use log::{debug, trace};
use thiserror::Error;

use crate::error::{Error, Result};

pub type FreqTable = HashMap<char, u64>;

/// Index of a node inside a [`HuffmanTree`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Node {
    Leaf {
        symbol: char,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }
}

/// A full binary tree stored as an index-addressed arena.
///
/// Leaves occupy the first slots in ascending (weight, symbol) order and
/// internal nodes follow in creation order, so a node's index doubles as its
/// tie-break sequence number.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// # Panics
    /// Panics if `id` was not handed out by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Number of nodes in the arena. Never zero: an empty alphabet is
    /// rejected before a tree exists.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

/// Which pair of nodes the tree builder merges at each step.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum MergeOrder {
    /// Merge the two lowest weights. Yields an optimal prefix code.
    #[default]
    Smallest,
    /// Merge the two highest weights. Still prefix-free but not optimal;
    /// kept for compatibility with streams produced by the inverted heap
    /// comparison some older encoders used.
    Largest,
}

#[derive(Debug, Error)]
#[error("unknown merge order {0:?} (expected \"smallest\" or \"largest\")")]
pub struct UnknownMergeOrder(pub String);

impl FromStr for MergeOrder {
    type Err = UnknownMergeOrder;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smallest" => Ok(MergeOrder::Smallest),
            "largest" => Ok(MergeOrder::Largest),
            _ => Err(UnknownMergeOrder(s.to_string())),
        }
    }
}

impl fmt::Display for MergeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOrder::Smallest => f.write_str("smallest"),
            MergeOrder::Largest => f.write_str("largest"),
        }
    }
}

#[derive(Eq, PartialEq)]
struct HeapNode {
    freq: u64,
    id: NodeId,
    order: MergeOrder,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.order {
            // Reverse ordering for Min-Heap behavior in BinaryHeap (which is max-heap by default)
            MergeOrder::Smallest => (other.freq, other.id).cmp(&(self.freq, self.id)),
            MergeOrder::Largest => (self.freq, self.id).cmp(&(other.freq, other.id)),
        }
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn count_frequencies(text: &str) -> FreqTable {
    let mut freq = FreqTable::new();
    for symbol in text.chars() {
        *freq.entry(symbol).or_insert(0) += 1;
    }
    freq
}

pub fn entropy_from_freq(freq: &FreqTable) -> f64 {
    let total: u64 = freq.values().sum();
    if total == 0 {
        return 0.0;
    }
    let total_f = total as f64;

    let entropy: f64 = freq
        .values()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total_f;
            -p * p.log2()
        })
        .sum();

    debug!(
        "Calculated entropy: {:.4} bits/symbol (Total samples: {})",
        entropy, total
    );
    entropy
}

/// Builds the tree by repeatedly merging the two nodes ranked first by
/// `order`. The first node extracted becomes the left child.
pub fn build_huffman_tree(frequencies: &FreqTable, order: MergeOrder) -> Result<HuffmanTree> {
    debug!(
        "Building Huffman Tree from {} unique symbols (merge order: {})",
        frequencies.len(),
        order
    );
    if frequencies.is_empty() {
        return Err(Error::EmptyAlphabet);
    }

    let mut freq_vec: Vec<_> = frequencies.iter().collect();
    freq_vec.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)));

    let mut nodes = Vec::with_capacity(freq_vec.len() * 2 - 1);
    let mut heap = BinaryHeap::with_capacity(freq_vec.len());

    for (symbol, freq) in freq_vec {
        let id = nodes.len();
        nodes.push(Node::Leaf {
            symbol: *symbol,
            freq: *freq,
        });
        heap.push(HeapNode {
            freq: *freq,
            id,
            order,
        });
    }
    debug!("Initial heap size: {}", heap.len());

    loop {
        let Some(left) = heap.pop() else {
            return Err(Error::EmptyAlphabet);
        };
        let Some(right) = heap.pop() else {
            debug!("Tree construction complete ({} nodes).", nodes.len());
            return Ok(HuffmanTree {
                nodes,
                root: left.id,
            });
        };

        let freq = left.freq.saturating_add(right.freq);
        let id = nodes.len();
        trace!(
            "Merging nodes {} ({}) and {} ({}) into {} ({})",
            left.id, left.freq, right.id, right.freq, id, freq
        );
        nodes.push(Node::Internal {
            freq,
            left: left.id,
            right: right.id,
        });
        heap.push(HeapNode { freq, id, order });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_of(tree: &HuffmanTree, symbol: char) -> Option<usize> {
        let mut stack = vec![(tree.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match *tree.node(id) {
                Node::Leaf { symbol: s, .. } if s == symbol => return Some(depth),
                Node::Leaf { .. } => {}
                Node::Internal { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        None
    }

    #[test]
    fn test_count_frequencies() {
        let freq = count_frequencies("aaab");
        assert_eq!(freq.len(), 2);
        assert_eq!(freq[&'a'], 3);
        assert_eq!(freq[&'b'], 1);
    }

    #[test]
    fn test_count_frequencies_multibyte() {
        let freq = count_frequencies("ééa");
        assert_eq!(freq[&'é'], 2);
        assert_eq!(freq[&'a'], 1);
    }

    #[test]
    fn test_count_frequencies_empty() {
        assert!(count_frequencies("").is_empty());
    }

    #[test]
    fn test_empty_alphabet() {
        let result = build_huffman_tree(&FreqTable::new(), MergeOrder::Smallest);
        assert!(matches!(result, Err(Error::EmptyAlphabet)));
    }

    #[test]
    fn test_single_symbol_tree() {
        let tree = build_huffman_tree(&count_frequencies("zzzz"), MergeOrder::Smallest).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(*tree.node(tree.root()), Node::Leaf { symbol: 'z', freq: 4 });
    }

    #[test]
    #[should_panic]
    fn test_node_out_of_range_panics() {
        let tree = build_huffman_tree(&count_frequencies("ab"), MergeOrder::Smallest).unwrap();
        let _ = tree.node(tree.len());
    }

    #[test]
    fn test_root_weight_is_total() {
        let text = "abracadabra";
        let tree = build_huffman_tree(&count_frequencies(text), MergeOrder::Smallest).unwrap();
        assert_eq!(tree.node(tree.root()).freq(), text.chars().count() as u64);
        assert_eq!(tree.leaf_count(), 5);
        // full binary tree: n leaves, n - 1 internal nodes
        assert_eq!(tree.len(), 9);
    }

    #[test]
    fn test_frequent_symbol_is_shallower() {
        let tree = build_huffman_tree(&count_frequencies("aaab"), MergeOrder::Smallest).unwrap();
        assert_eq!(depth_of(&tree, 'a'), Some(1));
        assert_eq!(depth_of(&tree, 'b'), Some(1));

        let tree = build_huffman_tree(&count_frequencies("aaaaaaabbc"), MergeOrder::Smallest)
            .unwrap();
        assert_eq!(depth_of(&tree, 'a'), Some(1));
        assert_eq!(depth_of(&tree, 'b'), Some(2));
        assert_eq!(depth_of(&tree, 'c'), Some(2));
    }

    #[test]
    fn test_deterministic() {
        let freq = count_frequencies("the quick brown fox jumps over the lazy dog");
        let a = build_huffman_tree(&freq, MergeOrder::Smallest).unwrap();
        let b = build_huffman_tree(&freq.clone(), MergeOrder::Smallest).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tie_break_first_extracted_is_left() {
        // equal weights: leaves seeded by symbol, lower index extracted first
        let tree = build_huffman_tree(&count_frequencies("ba"), MergeOrder::Smallest).unwrap();
        match *tree.node(tree.root()) {
            Node::Internal { left, right, .. } => {
                assert_eq!(*tree.node(left), Node::Leaf { symbol: 'a', freq: 1 });
                assert_eq!(*tree.node(right), Node::Leaf { symbol: 'b', freq: 1 });
            }
            other => panic!("expected internal root, got {:?}", other),
        }
    }

    #[test]
    fn test_largest_order_builds_chain() {
        let freq = count_frequencies("abbcccddddeeeee");
        let tree = build_huffman_tree(&freq, MergeOrder::Largest).unwrap();
        let max_depth = freq.keys().filter_map(|&s| depth_of(&tree, s)).max();
        assert_eq!(max_depth, Some(freq.len() - 1));
        assert_eq!(tree.node(tree.root()).freq(), 15);
    }

    #[test]
    fn test_merge_order_parse() {
        assert_eq!("smallest".parse::<MergeOrder>().unwrap(), MergeOrder::Smallest);
        assert_eq!("LARGEST".parse::<MergeOrder>().unwrap(), MergeOrder::Largest);
        assert!("middle".parse::<MergeOrder>().is_err());
    }

    #[test]
    fn test_entropy() {
        assert_eq!(entropy_from_freq(&count_frequencies("aaaa")), 0.0);
        let e = entropy_from_freq(&count_frequencies("abab"));
        assert!((e - 1.0).abs() < 1e-12);
        assert_eq!(entropy_from_freq(&FreqTable::new()), 0.0);
    }
}
