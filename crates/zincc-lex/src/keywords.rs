//! The multi-word keyword table and the trie that folds a run of plain
//! words into the longest matching phrase.
//!
//! Zinc has no single-word keyword set the way most languages do — a
//! keyword is any word sequence present in this table, matched greedily
//! against the longest entry. This has no counterpart in a conventional
//! lexer; the closed-vocabulary-to-behavior mapping is grounded on the
//! same idea a dispatch-by-fixed-vocabulary backend uses for its
//! instruction set, generalized here from "one entry, one emission" to
//! "one entry, one folded token".

use zincc_util::FxHashMap;

/// Every recognized keyword and phrase, as a sequence of lowercase words.
/// Where two entries share a prefix (`is greater than` / `is greater than
/// or equal to`), the trie's longest-match walk prefers the longer one.
const PHRASES: &[&[&str]] = &[
    // structure / includes
    &["include"],
    &["define"],
    &["as"],
    &["having"],
    &["end"],
    &["to"],
    &["with"],
    &["called"],
    &["and", "return", "a"],
    &["to", "do", "the", "main", "thing"],
    // control flow
    &["if"],
    &["otherwise"],
    &["otherwise", "if"],
    &["then"],
    &["while"],
    &["for"],
    &["for", "each"],
    &["each"],
    &["from"],
    &["down"],
    &["down", "to"],
    &["repeat"],
    &["times"],
    &["break"],
    &["continue"],
    &["return"],
    &["stop", "the", "loop"],
    &["skip", "to", "the", "next", "one"],
    // declarations / assignment
    &["there", "is", "a"],
    &["which"],
    &["has"],
    &["set"],
    &["change"],
    &["now"],
    &["let"],
    &["be"],
    &["make"],
    &["equal"],
    &["equal", "to"],
    &["add"],
    &["subtract"],
    &["multiply"],
    &["divide"],
    &["increase"],
    &["decrease"],
    // I/O
    &["say"],
    &["print"],
    &["show"],
    &["display"],
    &["ask", "the", "user", "for"],
    &["store", "it", "in"],
    &["and", "store", "it", "in"],
    &["and", "then"],
    &["followed", "by"],
    // memory
    &["allocate", "space", "for"],
    &["and", "call", "it"],
    &["free", "the", "memory", "at"],
    // file I/O
    &["open", "the", "file", "called"],
    &["for", "reading", "and", "call", "it"],
    &["for", "writing", "and", "call", "it"],
    &["for", "appending", "and", "call", "it"],
    &["close", "the", "file"],
    &["read", "a", "line", "from"],
    // graphics
    &["call", "the", "graphics", "function"],
    // types / literals
    &["number"],
    &["decimal"],
    &["text"],
    &["character"],
    &["boolean"],
    &["true"],
    &["false"],
    &["yes"],
    &["no"],
    &["null"],
    &["list"],
    &["of"],
    // operators
    &["plus"],
    &["minus"],
    &["times"],
    &["divided", "by"],
    &["modulo"],
    &["to", "the", "power", "of"],
    &["negative"],
    &["not"],
    &["and"],
    &["or"],
    &["equals"],
    &["is", "greater", "than"],
    &["is", "greater", "than", "or", "equal", "to"],
    &["is", "less", "than"],
    &["is", "less", "than", "or", "equal", "to"],
    &["is", "at", "least"],
    &["is", "at", "most"],
    &["is", "not", "equal", "to"],
    &["is", "between"],
    // built-in phrases
    &["the", "value", "of"],
    &["the", "result", "of"],
    &["the", "address", "of"],
    &["the", "value", "at"],
    &["the", "square", "root", "of"],
    &["the", "absolute", "value", "of"],
    &["item", "number"],
    &["item"],
    &["in"],
    &["the", "first", "item", "in"],
    &["the", "last", "item", "in"],
    &["the", "length", "of"],
];

#[derive(Default)]
struct TrieNode {
    children: FxHashMap<String, TrieNode>,
    terminal: bool,
}

/// A trie over lowercase word sequences, built once and reused for every
/// file the driver compiles in a session.
pub struct KeywordTrie {
    root: TrieNode,
}

impl KeywordTrie {
    pub fn new() -> Self {
        let mut trie = Self {
            root: TrieNode::default(),
        };
        for phrase in PHRASES {
            trie.insert(phrase);
        }
        trie
    }

    fn insert(&mut self, words: &[&str]) {
        let mut node = &mut self.root;
        for word in words {
            node = node.children.entry((*word).to_string()).or_default();
        }
        node.terminal = true;
    }

    /// Walks `words` from the start, returning the number of leading words
    /// that form the longest recognized phrase, or `0` if `words[0]` isn't
    /// the start of any phrase.
    pub fn longest_match(&self, words: &[String]) -> usize {
        let mut node = &self.root;
        let mut best = 0;
        for (i, word) in words.iter().enumerate() {
            match node.children.get(word) {
                Some(next) => {
                    node = next;
                    if node.terminal {
                        best = i + 1;
                    }
                }
                None => break,
            }
        }
        best
    }
}

impl Default for KeywordTrie {
    fn default() -> Self {
        Self::new()
    }
}
