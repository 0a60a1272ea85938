//! Fuzzy string matching based on Ratcliff/Obershelp "gestalt" similarity.
//!
//! `ratio()` is `2*M / T` where `T` is the total number of characters in both
//! strings and `M` the number of characters in the matching blocks found by
//! recursively taking the longest common block and repeating on both sides of it.

use crate::utils::error::{HelpDeskError, Result};
use std::collections::HashMap;

/// Sequences at least this long get the popular-element heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
    full_b_count: Option<HashMap<char, usize>>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let mut matcher = Self {
            a: Vec::new(),
            b: Vec::new(),
            b2j: HashMap::new(),
            full_b_count: None,
        };
        matcher.set_seq2(b);
        matcher.set_seq1(a);
        matcher
    }

    pub fn set_seq1(&mut self, a: &str) {
        self.a = a.chars().collect();
    }

    /// `b` is indexed, so when comparing one string against many put it here.
    pub fn set_seq2(&mut self, b: &str) {
        self.b = b.chars().collect();
        self.full_b_count = None;
        self.b2j.clear();

        for (j, ch) in self.b.iter().enumerate() {
            self.b2j.entry(*ch).or_default().push(j);
        }

        let n = self.b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            self.b2j.retain(|_, indices| indices.len() <= ntest);
        }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, size)`.
    /// Among equally long blocks the one starting earliest in `a` wins, then earliest in `b`.
    pub fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut new_j2len = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // popular elements are not seeds but may still extend a block
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Matching blocks sorted by position in `a`.
    pub fn matching_blocks(&self) -> Vec<(usize, usize, usize)> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            blocks.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        blocks.sort_unstable();
        blocks
    }

    pub fn ratio(&self) -> f64 {
        let matches: usize = self.matching_blocks().iter().map(|(_, _, k)| k).sum();
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on `ratio()` from shared character counts.
    pub fn quick_ratio(&mut self) -> f64 {
        let b = &self.b;
        let full_b_count = self.full_b_count.get_or_insert_with(|| {
            let mut counts = HashMap::new();
            for ch in b {
                *counts.entry(*ch).or_insert(0) += 1;
            }
            counts
        });

        let mut available: HashMap<char, isize> = HashMap::new();
        let mut matches = 0;
        for ch in &self.a {
            let remaining = available
                .entry(*ch)
                .or_insert_with(|| full_b_count.get(ch).copied().unwrap_or(0) as isize);
            *remaining -= 1;
            if *remaining >= 0 {
                matches += 1;
            }
        }
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on `ratio()` from lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        let (la, lb) = (self.a.len(), self.b.len());
        calculate_ratio(la.min(lb), la + lb)
    }
}

fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 {
        return 1.0;
    }
    2.0 * matches as f64 / length as f64
}

/// Up to `n` candidates scoring at least `cutoff` against `word`, best first.
/// Equal scores order the lexically greater candidate first.
pub fn close_matches<'a, I>(word: &str, candidates: I, n: usize, cutoff: f64) -> Result<Vec<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 {
        return Err(HelpDeskError::ValidationError {
            message: format!("n must be > 0: {}", n),
        });
    }
    if !(0.0..=1.0).contains(&cutoff) {
        return Err(HelpDeskError::ValidationError {
            message: format!("cutoff must be in [0.0, 1.0]: {}", cutoff),
        });
    }

    let mut matcher = SequenceMatcher::new("", word);
    let mut scored: Vec<(f64, &'a str)> = Vec::new();

    for candidate in candidates {
        matcher.set_seq1(candidate);
        if matcher.real_quick_ratio() >= cutoff && matcher.quick_ratio() >= cutoff {
            let score = matcher.ratio();
            if score >= cutoff {
                scored.push((score, candidate));
            }
        }
    }

    scored.sort_by(|left, right| right.0.total_cmp(&left.0).then_with(|| right.1.cmp(left.1)));
    Ok(scored.into_iter().take(n).map(|(_, candidate)| candidate).collect())
}
