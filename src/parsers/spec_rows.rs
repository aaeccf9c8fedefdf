/// Split a specification row of the form `"Key: Value"` on the first colon.
///
/// Both halves are trimmed; rows without a colon or with an empty key yield
/// `None`. Colons inside the value are preserved (`"Socket: E26: 2"`).
pub fn parse_spec_row(row: &str) -> Option<(String, String)> {
    let (key, value) = row.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key.to_string(), value.trim().to_string()))
}
