/// Calculates the 1-based line and column for a byte offset into `source`.
/// Columns count characters, not bytes. Offsets past the end clamp to the
/// position just after the last character.
pub fn get_line_and_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (index, c) in source.char_indices() {
        if index >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
