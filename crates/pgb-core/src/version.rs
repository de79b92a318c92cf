//! Version and name comparators.
//!
//! Versions are opaque strings ordered numeric-aware, so `"10"` sorts
//! after `"2"` and `"1.10.0"` after `"1.9.1"`. Non-versioned buckets use
//! plain string order.

use std::cmp::Ordering;

/// Compare two version strings with numeric-aware ordering.
///
/// Digit runs are compared as unbounded integers (leading zeros ignored,
/// then used as a tiebreak so the ordering stays total); everything else
/// is compared character by character.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    let mut i = 0;
    let mut j = 0;

    while i < a_bytes.len() && j < b_bytes.len() {
        let ca = a_bytes[i];
        let cb = b_bytes[j];

        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let (a_run, a_next) = digit_run(a_bytes, i);
            let (b_run, b_next) = digit_run(b_bytes, j);
            match compare_digit_runs(a_run, b_run) {
                Ordering::Equal => {
                    i = a_next;
                    j = b_next;
                }
                other => return other,
            }
        } else {
            match ca.cmp(&cb) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                other => return other,
            }
        }
    }

    (a_bytes.len() - i).cmp(&(b_bytes.len() - j))
}

/// Extract the digit run starting at `start`, returning the run and the
/// index one past its end.
fn digit_run(bytes: &[u8], start: usize) -> (&[u8], usize) {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    (&bytes[start..end], end)
}

/// Compare two digit runs numerically, leading zeros as tiebreak.
fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a_trim = trim_leading_zeros(a);
    let b_trim = trim_leading_zeros(b);
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

fn trim_leading_zeros(run: &[u8]) -> &[u8] {
    let first = run.iter().position(|&b| b != b'0').unwrap_or(run.len());
    &run[first..]
}

/// Compare two display names or paths with plain string order.
///
/// Stand-in for locale collation; the ordering only needs to be stable
/// and deterministic across runs.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
