//! Partial-delimiter detection at chunk boundaries.

/// Length of the longest suffix of `buf` that is a strict prefix of
/// `delim`.
///
/// Used wherever a delimiter may be split across chunk boundaries: when a
/// delimiter is not found in the buffered text, the trailing overlap must
/// be withheld because it may complete in the next chunk, while everything
/// before it is safe to emit. Candidates are checked longest first, so the
/// greediest overlap wins. A full match returns 0; callers find complete
/// delimiters with `find` before asking for partial ones.
pub fn longest_prefix_at_end(buf: &str, delim: &str) -> usize {
    if buf.is_empty() || delim.is_empty() {
        return 0;
    }
    let max = buf.len().min(delim.len() - 1);
    for len in (1..=max).rev() {
        if delim.is_char_boundary(len) && buf.ends_with(&delim[..len]) {
            return len;
        }
    }
    0
}
