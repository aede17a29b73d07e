use std::borrow::Borrow;
use std::collections::HashMap;

use log::{debug, trace};

use crate::bits::BitBuf;
use crate::huffman::{FreqTable, HuffmanTree, Node, NodeId};

pub type Codeword = BitBuf;

impl Borrow<[bool]> for BitBuf {
    fn borrow(&self) -> &[bool] {
        self.as_slice()
    }
}

/// Bijective symbol <-> codeword mapping.
///
/// Entries keep the order they were added in, which is the order they are
/// serialized in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codebook {
    entries: Vec<(char, Codeword)>,
    forward: HashMap<char, usize>,
    reverse: HashMap<Codeword, char>,
}

impl Codebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Returns `false` and leaves the book untouched if either
    /// the symbol or the codeword is already present.
    pub fn insert(&mut self, symbol: char, codeword: Codeword) -> bool {
        if self.forward.contains_key(&symbol) || self.reverse.contains_key(&codeword) {
            return false;
        }
        self.forward.insert(symbol, self.entries.len());
        self.reverse.insert(codeword.clone(), symbol);
        self.entries.push((symbol, codeword));
        true
    }

    pub fn codeword(&self, symbol: char) -> Option<&Codeword> {
        self.forward.get(&symbol).map(|&i| &self.entries[i].1)
    }

    pub fn symbol(&self, codeword: &[bool]) -> Option<char> {
        self.reverse.get(codeword).copied()
    }

    pub fn contains_symbol(&self, symbol: char) -> bool {
        self.forward.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Codeword)> {
        self.entries.iter().map(|(symbol, code)| (*symbol, code))
    }

    /// No codeword is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&[bool]> = self.entries.iter().map(|(_, c)| c.as_slice()).collect();
        codes.sort();
        // after sorting, a prefix always sits directly before one of its extensions
        codes.windows(2).all(|w| !w[1].starts_with(w[0]))
    }

    /// Expected codeword length in bits per symbol under `freq`.
    pub fn average_length(&self, freq: &FreqTable) -> f64 {
        let total: u64 = freq.values().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: u64 = freq
            .iter()
            .filter_map(|(symbol, &count)| self.codeword(*symbol).map(|c| count * c.len() as u64))
            .sum();
        weighted as f64 / total as f64
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum TrieNode {
    Branch([Option<usize>; 2]),
    Leaf(char),
}

/// One step of a bit-by-bit walk through a [`DecodeTrie`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Walk {
    Symbol(char),
    Continue(usize),
}

/// A codebook rebuilt as a binary trie so the decoder can follow the payload
/// one bit at a time.
///
/// `open` counts child slots that are still unassigned; the codewords form a
/// complete prefix code exactly when it reaches zero.
#[derive(Debug, Clone)]
pub struct DecodeTrie {
    nodes: Vec<TrieNode>,
    open: usize,
}

impl Default for DecodeTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeTrie {
    pub const ROOT: usize = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::Branch([None, None])],
            open: 2,
        }
    }

    pub fn from_codebook(book: &Codebook) -> Option<Self> {
        let mut trie = Self::new();
        for (symbol, code) in book.iter() {
            if !trie.insert(code.as_slice(), symbol) {
                return None;
            }
        }
        Some(trie)
    }

    /// Returns `false` if `code` is empty, duplicates an existing codeword,
    /// or is a prefix of (or prefixed by) one.
    pub fn insert(&mut self, code: &[bool], symbol: char) -> bool {
        let Some((&last, path)) = code.split_last() else {
            return false;
        };

        let mut cursor = Self::ROOT;
        for &bit in path {
            let TrieNode::Branch(children) = self.nodes[cursor] else {
                return false;
            };
            cursor = match children[bit as usize] {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::Branch([None, None]));
                    self.set_child(cursor, bit, next);
                    // one slot filled, two new ones opened
                    self.open += 1;
                    next
                }
            };
        }

        match self.nodes[cursor] {
            TrieNode::Branch(children) if children[last as usize].is_none() => {
                let leaf = self.nodes.len();
                self.nodes.push(TrieNode::Leaf(symbol));
                self.set_child(cursor, last, leaf);
                self.open -= 1;
                true
            }
            _ => false,
        }
    }

    fn set_child(&mut self, parent: usize, bit: bool, child: usize) {
        if let TrieNode::Branch(children) = &mut self.nodes[parent] {
            children[bit as usize] = Some(child);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.open == 0
    }

    /// Follow `bit` from `from`. `None` means no codeword continues this way.
    pub fn walk(&self, from: usize, bit: bool) -> Option<Walk> {
        let TrieNode::Branch(children) = self.nodes[from] else {
            return None;
        };
        let next = children[bit as usize]?;
        Some(match self.nodes[next] {
            TrieNode::Leaf(symbol) => Walk::Symbol(symbol),
            TrieNode::Branch(_) => Walk::Continue(next),
        })
    }
}

/// Assign every leaf its root-to-leaf path (left = `0`, right = `1`).
///
/// Walks the arena with an explicit stack, left subtree first. A tree that is
/// a single leaf has no path bits, so that leaf gets the placeholder
/// codeword `0`.
pub fn build_code_table(tree: &HuffmanTree) -> Codebook {
    let mut table = Codebook::new();

    if let Node::Leaf { symbol, .. } = *tree.node(tree.root()) {
        debug!("Single-symbol alphabet, assigning placeholder code '0' to {:?}", symbol);
        table.insert(symbol, std::iter::once(false).collect());
        return table;
    }

    let mut stack: Vec<(NodeId, Codeword)> = vec![(tree.root(), Codeword::new())];
    while let Some((id, prefix)) = stack.pop() {
        match *tree.node(id) {
            Node::Leaf { symbol, .. } => {
                trace!("Assigning code to {:?} (U+{:04X}) : '{}'", symbol, symbol as u32, prefix);
                table.insert(symbol, prefix);
            }
            Node::Internal { left, right, .. } => {
                let mut right_prefix = prefix.clone();
                right_prefix.push(true);
                stack.push((right, right_prefix));

                let mut left_prefix = prefix;
                left_prefix.push(false);
                stack.push((left, left_prefix));
            }
        }
    }

    debug!("Code table built with {} entries.", table.len());
    table
}
