//! Cross-page repetition analysis.
//!
//! Pass 1 of the conversion: count on how many pages each digit-masked line
//! signature appears at the same relative position. Signatures reaching the
//! repetition threshold are flagged as boilerplate candidates. Bare numbers
//! at the page edges that count upwards from page to page are collected as
//! page numbers in the same pass.

use crate::config::ConvertConfig;
use crate::model::{Document, Line, PositionBucket};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Signatures longer than this are body text, not stamps.
const MAX_SIGNATURE_CHARS: usize = 200;

/// Non-empty lines at each page edge searched for page numbers.
const PAGE_NUMBER_EDGE_LINES: usize = 3;

/// A numbered edge slot needs this many pages before it is trusted.
const PAGE_NUMBER_MIN_PAGES: usize = 3;

/// Largest step between consecutive page numbers (skipped plates, blank pages).
const PAGE_NUMBER_MAX_STEP: u32 = 5;

/// Share of consecutive pairs in a slot that must count upwards.
const PAGE_NUMBER_SEQUENTIAL_SHARE: f64 = 0.6;

/// Lowercase, whitespace-collapsed, digit runs replaced by `#`.
pub fn signature(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_digits = false;
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        for c in word.chars() {
            if c.is_ascii_digit() {
                if !in_digits {
                    out.push('#');
                }
                in_digits = true;
            } else {
                in_digits = false;
                out.extend(c.to_lowercase());
            }
        }
        in_digits = false;
    }
    out
}

/// Position bucket of a line given the page's non-empty line count.
pub fn bucket_for(line: &Line, content_lines: usize, edge_window: usize) -> Option<PositionBucket> {
    let rank = line.content_rank?;
    if rank < edge_window {
        Some(PositionBucket::First)
    } else if content_lines.saturating_sub(rank + 1) < edge_window {
        Some(PositionBucket::Last)
    } else {
        Some(PositionBucket::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRecord {
    pub signature: String,
    pub bucket: PositionBucket,
    /// Number of distinct pages the signature appears on in this bucket.
    pub pages: usize,
}

#[derive(Debug, Clone)]
pub struct FrequencyAnalysis {
    counts: BTreeMap<(String, PositionBucket), usize>,
    page_count: usize,
    required: usize,
    enabled: bool,
    edge_window: usize,
    /// (page index, line index) of lines recognised as running page numbers.
    page_numbers: HashSet<(usize, usize)>,
}

impl FrequencyAnalysis {
    /// Count signatures across every page of `doc`.
    pub fn build(doc: &Document, config: &ConvertConfig) -> Self {
        let mut counts: BTreeMap<(String, PositionBucket), usize> = BTreeMap::new();

        for page in &doc.pages {
            let content_lines = page.content_lines();
            let mut seen_this_page = HashSet::new();
            for line in &page.lines {
                let Some(bucket) = bucket_for(line, content_lines, config.edge_window) else {
                    continue;
                };
                let sig = signature(&line.raw);
                if sig.is_empty() || sig.chars().count() > MAX_SIGNATURE_CHARS {
                    continue;
                }
                if seen_this_page.insert((sig.clone(), bucket)) {
                    *counts.entry((sig, bucket)).or_insert(0) += 1;
                }
            }
        }

        let page_count = doc.page_count();
        let analysis = FrequencyAnalysis {
            counts,
            page_count,
            required: required_pages(page_count, config.repetition_threshold),
            enabled: page_count >= config.min_sample_pages,
            edge_window: config.edge_window,
            page_numbers: detect_page_numbers(doc),
        };

        if analysis.enabled {
            for record in analysis.flagged() {
                log::debug!(
                    "repeating {} line on {}/{} pages: {}",
                    record.bucket,
                    record.pages,
                    page_count,
                    record.signature
                );
            }
        } else {
            log::info!(
                "{} page(s) is below the sample size for repetition analysis",
                page_count
            );
        }

        analysis
    }

    /// Minimum number of pages a signature must appear on to be flagged.
    pub fn required_pages(&self) -> usize {
        self.required
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The flagged record for `line`, if its signature repeats enough.
    pub fn flag_for(&self, line: &Line, content_lines: usize) -> Option<FrequencyRecord> {
        if !self.enabled {
            return None;
        }
        let bucket = bucket_for(line, content_lines, self.edge_window)?;
        let sig = signature(&line.raw);
        let pages = *self.counts.get(&(sig.clone(), bucket))?;
        (pages >= self.required).then_some(FrequencyRecord {
            signature: sig,
            bucket,
            pages,
        })
    }

    /// Every flagged (signature, bucket) pair.
    pub fn flagged(&self) -> Vec<FrequencyRecord> {
        if !self.enabled {
            return Vec::new();
        }
        self.counts
            .iter()
            .filter(|(_, pages)| **pages >= self.required)
            .map(|((signature, bucket), &pages)| FrequencyRecord {
                signature: signature.clone(),
                bucket: *bucket,
                pages,
            })
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Whether `line` belongs to a run of increasing page numbers.
    pub fn is_page_number(&self, line: &Line) -> bool {
        self.page_numbers
            .contains(&(line.page_index, line.line_index))
    }
}

fn bare_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || text.len() > 4 || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Find bare 1-4 digit lines that sit in the same edge slot on at least
/// three pages and mostly increase by small steps from page to page.
///
/// A slot is (edge, offset from that edge) over non-empty lines, so a
/// footer number stays in the same slot however long each page is.
pub fn detect_page_numbers(doc: &Document) -> HashSet<(usize, usize)> {
    let mut slots: BTreeMap<(PositionBucket, usize), Vec<(usize, usize, u32)>> = BTreeMap::new();

    for page in &doc.pages {
        let content_lines = page.content_lines();
        for line in &page.lines {
            let Some(rank) = line.content_rank else {
                continue;
            };
            let Some(number) = bare_number(&line.raw) else {
                continue;
            };
            let from_end = content_lines.saturating_sub(rank + 1);
            if rank < PAGE_NUMBER_EDGE_LINES {
                slots
                    .entry((PositionBucket::First, rank))
                    .or_default()
                    .push((page.index, line.line_index, number));
            }
            if from_end < PAGE_NUMBER_EDGE_LINES {
                slots
                    .entry((PositionBucket::Last, from_end))
                    .or_default()
                    .push((page.index, line.line_index, number));
            }
        }
    }

    let mut found = HashSet::new();
    for ((edge, offset), mut candidates) in slots {
        if candidates.len() < PAGE_NUMBER_MIN_PAGES {
            continue;
        }
        candidates.sort();
        let sequential = candidates
            .windows(2)
            .filter(|pair| {
                let (before, after) = (pair[0].2, pair[1].2);
                after > before && after - before <= PAGE_NUMBER_MAX_STEP
            })
            .count();
        if (sequential as f64) < candidates.len() as f64 * PAGE_NUMBER_SEQUENTIAL_SHARE {
            continue;
        }
        log::debug!(
            "page numbers in {} slot {} on {} page(s)",
            edge,
            offset,
            candidates.len()
        );
        found.extend(candidates.iter().map(|(page, line, _)| (*page, *line)));
    }
    found
}

/// ceil(threshold * pages), with a small epsilon against float noise, never below 1.
pub fn required_pages(pages: usize, threshold: f64) -> usize {
    let raw = threshold * pages as f64 - 1e-9;
    (raw.ceil().max(1.0)) as usize
}
