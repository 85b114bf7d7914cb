/// Splits a command line into its verb and the remainder of the line.
///
/// Exactly one space separates verb and args (§4.2); everything after that
/// first space is returned untouched so callers can preserve internal
/// whitespace in arguments such as filenames.
pub(crate) fn split_verb(line: &str) -> (&str, &str) {
    match memchr::memchr(b' ', line.as_bytes()) {
        Some(idx) => (&line[..idx], &line[idx + 1..]),
        None => (line, ""),
    }
}
