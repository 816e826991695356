#![forbid(unsafe_code)]

//! Display-width measurement.
//!
//! `str_width` answers one question: how many terminal columns does this
//! string occupy? Embedded escape sequences measure zero, grapheme clusters
//! are measured as units (a ZWJ emoji sequence is one cluster, width 2), and
//! anything unknown degrades to width 1 rather than erroring.
//!
//! # Measurement rules
//!
//! Per cluster, in order:
//! 1. Clusters made entirely of non-printing codepoints (combining marks,
//!    format/control characters, joiners, variation selectors) are width 0.
//! 2. Emoji-presentation clusters are width 2. A cheap codepoint-range
//!    pre-filter rejects most clusters before the structural check runs.
//! 3. Otherwise the leading non-printing prefix is skipped and the base
//!    codepoint's East-Asian-Width class decides: Fullwidth/Wide are 2,
//!    everything else (Ambiguous included) is 1. Unassigned codepoints
//!    degrade to 1.
//! 4. Trailing codepoints from the Halfwidth/Fullwidth Forms block add
//!    their own width on top of the base.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::escape::VisibleRuns;

/// Display width of `text` in terminal columns.
///
/// Empty input is 0; printable ASCII is measured by byte count without
/// touching the Unicode machinery. Never panics.
#[must_use]
pub fn str_width(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    if is_printable_ascii(text.as_bytes()) {
        return text.len();
    }
    VisibleRuns::new(text).map(visible_run_width).sum()
}

/// Whether every byte is printable ASCII (0x20..=0x7E).
///
/// This is the fast-path predicate: it also excludes ESC, so any string that
/// passes contains no escape sequences.
#[inline]
#[must_use]
pub fn is_printable_ascii(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| (0x20..=0x7e).contains(b))
}

/// Width of a run that contains no recognized escape sequences.
fn visible_run_width(run: &str) -> usize {
    if is_printable_ascii(run.as_bytes()) {
        return run.len();
    }
    run.graphemes(true).map(cluster_width).sum()
}

/// Width of a single grapheme cluster.
#[must_use]
pub fn cluster_width(cluster: &str) -> usize {
    let mut chars = cluster.chars();
    let Some(first) = chars.next() else {
        return 0;
    };

    // Single printable ASCII scalar: the overwhelmingly common case.
    if chars.as_str().is_empty() && (' '..='\u{7e}').contains(&first) {
        return 1;
    }

    if cluster.chars().all(is_non_printing) {
        return 0;
    }

    if emoji_prefilter(first) && is_emoji_cluster(cluster) {
        return 2;
    }

    // Skip any non-printing prefix and classify the base codepoint.
    let mut rest = cluster.chars().skip_while(|c| is_non_printing(*c));
    let Some(base) = rest.next() else {
        return 0;
    };
    let mut width = match UnicodeWidthChar::width(base) {
        Some(0) | None => 1, // degraded: unassigned or stray control as base
        Some(w) => w,
    };
    // Halfwidth/Fullwidth Forms trailing the base carry their own width.
    for c in rest {
        if ('\u{ff00}'..='\u{ffef}').contains(&c) {
            width += UnicodeWidthChar::width(c).unwrap_or(1);
        }
    }
    width
}

/// Non-printing codepoints: zero-width combiners, joiners, variation
/// selectors, format characters, and C0/C1 controls.
fn is_non_printing(c: char) -> bool {
    match c {
        '\u{200b}'..='\u{200f}' // ZWSP, ZWNJ, ZWJ, LRM, RLM
        | '\u{2028}'..='\u{202e}' // line/para separators, directional embeds
        | '\u{2060}'..='\u{2064}' // word joiner, invisible operators
        | '\u{206a}'..='\u{206f}' // deprecated format controls
        | '\u{fe00}'..='\u{fe0f}' // variation selectors
        | '\u{feff}' => true, // BOM / ZWNBSP
        _ => matches!(UnicodeWidthChar::width(c), Some(0) | None),
    }
}

/// Cheap range filter: can this cluster's first codepoint possibly start an
/// emoji presentation sequence? False positives are fine (the structural
/// check follows); false negatives are not.
fn emoji_prefilter(first: char) -> bool {
    matches!(first,
        '#' | '*' | '0'..='9'
        | '\u{2100}'..='\u{21ff}'
        | '\u{231a}'..='\u{23ff}'
        | '\u{25a0}'..='\u{27bf}'
        | '\u{2b00}'..='\u{2bff}'
        | '\u{1f000}'..='\u{1faff}')
}

/// Structural emoji-presentation check for a cluster that passed the
/// pre-filter.
fn is_emoji_cluster(cluster: &str) -> bool {
    let mut chars = cluster.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    // Keycap: `#`, `*`, or a digit combined with U+20E3.
    if cluster.contains('\u{20e3}') {
        return matches!(first, '#' | '*' | '0'..='9');
    }
    if first.is_ascii() {
        return false;
    }
    // Text-presentation selector forces narrow rendering.
    if cluster.contains('\u{fe0e}') {
        return false;
    }
    // Regional-indicator flag: exactly a pair forms one flag cluster.
    if is_regional_indicator(first) {
        return matches!(chars.next(), Some(c) if is_regional_indicator(c));
    }
    // Emoji-presentation selector, ZWJ sequence, or skin-tone modifier.
    if cluster.contains('\u{fe0f}')
        || cluster.contains('\u{200d}')
        || cluster.chars().any(|c| ('\u{1f3fb}'..='\u{1f3ff}').contains(&c))
    {
        return true;
    }
    has_default_emoji_presentation(first)
}

#[inline]
fn is_regional_indicator(c: char) -> bool {
    ('\u{1f1e6}'..='\u{1f1ff}').contains(&c)
}

/// Codepoints that render emoji-style without a variation selector
/// (Emoji_Presentation=Yes), by block.
fn has_default_emoji_presentation(c: char) -> bool {
    matches!(c,
        '\u{231a}'..='\u{231b}' // watch, hourglass
        | '\u{23e9}'..='\u{23ec}'
        | '\u{23f0}' | '\u{23f3}'
        | '\u{25fd}'..='\u{25fe}'
        | '\u{2614}'..='\u{2615}'
        | '\u{2648}'..='\u{2653}'
        | '\u{267f}' | '\u{2693}' | '\u{26a1}'
        | '\u{26aa}'..='\u{26ab}'
        | '\u{26bd}'..='\u{26be}'
        | '\u{26c4}'..='\u{26c5}'
        | '\u{26ce}' | '\u{26d4}' | '\u{26ea}'
        | '\u{26f2}'..='\u{26f3}'
        | '\u{26f5}' | '\u{26fa}' | '\u{26fd}'
        | '\u{2705}'
        | '\u{270a}'..='\u{270b}'
        | '\u{2728}' | '\u{274c}' | '\u{274e}'
        | '\u{2753}'..='\u{2755}'
        | '\u{2757}'
        | '\u{2795}'..='\u{2797}'
        | '\u{27b0}' | '\u{27bf}'
        | '\u{2b1b}'..='\u{2b1c}'
        | '\u{2b50}' | '\u{2b55}'
        | '\u{1f300}'..='\u{1f5ff}'
        | '\u{1f600}'..='\u{1f64f}'
        | '\u{1f680}'..='\u{1f6ff}'
        | '\u{1f900}'..='\u{1f9ff}'
        | '\u{1fa70}'..='\u{1faff}')
}
