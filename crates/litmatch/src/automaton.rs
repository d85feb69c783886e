//! Aho-Corasick automaton over normalized long-pattern bytes.
//!
//! Patterns are inserted into a plain trie first; failure links and merged
//! output sets are computed in a single breadth-first pass at finalize time.
//! The finished node array is what the store serializes and what the scanner
//! traverses, so build and load converge on one representation.

use std::collections::{BTreeMap, VecDeque};

/// One automaton state. Edges are sorted by byte for binary search.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub fail: u32,
    pub edges: Vec<(u8, u32)>,
    /// Pattern indices ending at this state, including suffix-chained ones.
    pub outputs: Vec<u32>,
}

/// Finished automaton: a flat node array rooted at index 0.
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    pub nodes: Vec<Node>,
}

impl Automaton {
    /// Advance from `state` on normalized byte `b`, falling back through
    /// failure links until a goto edge exists or the root absorbs the byte.
    #[inline]
    pub fn step(&self, mut state: u32, b: u8) -> u32 {
        loop {
            let node = &self.nodes[state as usize];
            if let Ok(i) = node.edges.binary_search_by_key(&b, |&(eb, _)| eb) {
                return node.edges[i].1;
            }
            if state == 0 {
                return 0;
            }
            state = node.fail;
        }
    }

    #[inline]
    pub fn outputs(&self, state: u32) -> &[u32] {
        &self.nodes[state as usize].outputs
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

/// Incremental trie builder; `finish` runs the deferred failure-link pass.
#[derive(Debug)]
pub struct TrieBuilder {
    states: Vec<BuildState>,
}

#[derive(Debug, Default)]
struct BuildState {
    next: BTreeMap<u8, u32>,
    fail: u32,
    outputs: Vec<u32>,
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self {
            states: vec![BuildState::default()],
        }
    }

    /// Insert one normalized pattern, recording `pattern_idx` at its terminal
    /// state. `word` must be non-empty.
    pub fn insert(&mut self, word: &[u8], pattern_idx: u32) {
        let mut cur = 0u32;
        for &b in word {
            cur = match self.states[cur as usize].next.get(&b) {
                Some(&n) => n,
                None => {
                    let id = self.states.len() as u32;
                    self.states.push(BuildState::default());
                    self.states[cur as usize].next.insert(b, id);
                    id
                }
            };
        }
        self.states[cur as usize].outputs.push(pattern_idx);
    }

    /// Compute failure links breadth-first and merge each state's outputs
    /// with its failure state's outputs, then freeze into the flat form.
    pub fn finish(mut self) -> Automaton {
        let mut queue = VecDeque::new();
        let roots: Vec<u32> = self.states[0].next.values().copied().collect();
        for child in roots {
            self.states[child as usize].fail = 0;
            queue.push_back(child);
        }
        while let Some(sid) = queue.pop_front() {
            let edges: Vec<(u8, u32)> = self.states[sid as usize]
                .next
                .iter()
                .map(|(&b, &n)| (b, n))
                .collect();
            for (b, nxt) in edges {
                queue.push_back(nxt);
                let mut fail = self.states[sid as usize].fail;
                let link = loop {
                    if let Some(&t) = self.states[fail as usize].next.get(&b) {
                        if t != nxt {
                            break t;
                        }
                    }
                    if fail == 0 {
                        break 0;
                    }
                    fail = self.states[fail as usize].fail;
                };
                self.states[nxt as usize].fail = link;
                let inherited = self.states[link as usize].outputs.clone();
                self.states[nxt as usize].outputs.extend(inherited);
            }
        }

        let nodes = self
            .states
            .into_iter()
            .map(|s| Node {
                fail: s.fail,
                edges: s.next.into_iter().collect(),
                outputs: s.outputs,
            })
            .collect();
        Automaton { nodes }
    }
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_all(auto: &Automaton, lens: &[usize], hay: &[u8]) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let mut state = 0u32;
        for (i, &b) in hay.iter().enumerate() {
            state = auto.step(state, b);
            for &p in auto.outputs(state) {
                let l = lens[p as usize];
                out.push((i + 1 - l, l));
            }
        }
        out
    }

    #[test]
    fn finds_overlapping_and_suffix_chained_patterns() {
        let mut t = TrieBuilder::new();
        let pats: Vec<&[u8]> = vec![b"bazinga", b"zingab", b"ingab"];
        for (i, p) in pats.iter().enumerate() {
            t.insert(p, i as u32);
        }
        let auto = t.finish();
        let lens: Vec<usize> = pats.iter().map(|p| p.len()).collect();
        let hits = find_all(&auto, &lens, b"xbazingab");
        assert!(hits.contains(&(1, 7))); // bazinga
        assert!(hits.contains(&(3, 6))); // zingab
        assert!(hits.contains(&(4, 5))); // ingab, via suffix chain
    }

    #[test]
    fn repeated_occurrences() {
        let mut t = TrieBuilder::new();
        t.insert(b"ababa", 0);
        let auto = t.finish();
        let hits = find_all(&auto, &[5], b"abababa");
        assert_eq!(hits, vec![(0, 5), (2, 5)]);
    }

    #[test]
    fn empty_automaton_stays_at_root() {
        let auto = TrieBuilder::new().finish();
        assert!(auto.is_empty());
        assert_eq!(auto.step(0, b'x'), 0);
        assert!(auto.outputs(0).is_empty());
    }
}
