//! Conversions between zero-based (row, col) indices, column letters,
//! and A1 address strings.

/// Highest valid zero-based row index (1,048,576 rows).
pub const MAX_ROW_INDEX: u32 = 1_048_575;

/// Highest valid zero-based column index (column XFD).
pub const MAX_COL_INDEX: u32 = 16_383;

/// Render a zero-based column index as letters (0 -> "A", 26 -> "AA").
pub fn column_label(col: u32) -> String {
    let mut col_index = col;
    let mut col_label = String::new();

    loop {
        let rem = (col_index % 26) as u8;
        col_label.push((b'A' + rem) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }

    col_label.chars().rev().collect()
}

/// Convert zero-based (row, col) indices to an A1 address string.
pub fn index_to_address(row: u32, col: u32) -> String {
    column_label(col) + &(row + 1).to_string()
}

/// Parse a letter run as a zero-based column index ("A" -> 0, "AA" -> 26).
/// Letters count in bijective base-26; there is no zero digit.
/// Returns `None` for empty input, non-letters, or columns past
/// [`MAX_COL_INDEX`].
pub fn column_letters_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let upper = ch.to_ascii_uppercase() as u8;
        col = col
            .checked_mul(26)?
            .checked_add((upper - b'A' + 1) as u32)?;
        if col > MAX_COL_INDEX + 1 {
            return None;
        }
    }

    Some(col - 1)
}

/// Parse an A1 address into zero-based (row, col) indices.
/// Returns `None` for malformed or out-of-range addresses.
pub fn address_to_index(a1: &str) -> Option<(u32, u32)> {
    if a1.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_letter = false;
    let mut saw_digit = false;

    for ch in a1.chars() {
        if ch.is_ascii_alphabetic() {
            saw_letter = true;
            if saw_digit {
                // Letters after digits are not allowed.
                return None;
            }
            let upper = ch.to_ascii_uppercase() as u8;
            col = col
                .checked_mul(26)?
                .checked_add((upper - b'A' + 1) as u32)?;
            if col > MAX_COL_INDEX + 1 {
                return None;
            }
        } else if ch.is_ascii_digit() {
            saw_digit = true;
            row = row.checked_mul(10)?.checked_add((ch as u8 - b'0') as u32)?;
            if row > MAX_ROW_INDEX + 1 {
                return None;
            }
        } else {
            return None;
        }
    }

    if !saw_letter || !saw_digit || row == 0 || col == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_to_address_examples() {
        assert_eq!(index_to_address(0, 0), "A1");
        assert_eq!(index_to_address(0, 25), "Z1");
        assert_eq!(index_to_address(0, 26), "AA1");
        assert_eq!(index_to_address(0, 27), "AB1");
        assert_eq!(index_to_address(0, 51), "AZ1");
        assert_eq!(index_to_address(0, 52), "BA1");
        assert_eq!(index_to_address(9, 3), "D10");
    }

    #[test]
    fn round_trip_addresses() {
        let addresses = [
            "A1", "B2", "Z10", "AA1", "AA10", "AB7", "AZ5", "BA1", "ZZ10", "AAA1", "XFD1048576",
        ];
        for addr in addresses {
            let (r, c) = address_to_index(addr).expect("address should parse");
            assert_eq!(index_to_address(r, c), addr);
        }
    }

    #[test]
    fn invalid_addresses_rejected() {
        let invalid = ["", "1A", "A0", "A", "AA0", "A-1", "A1A", "A 1"];
        for addr in invalid {
            assert!(address_to_index(addr).is_none(), "{addr} should be invalid");
        }
    }

    #[test]
    fn out_of_range_addresses_rejected() {
        assert!(address_to_index("A1048577").is_none());
        assert!(address_to_index("XFE1").is_none());
        assert!(address_to_index("A99999999999").is_none());
    }

    #[test]
    fn column_letters_examples() {
        assert_eq!(column_letters_to_index("A"), Some(0));
        assert_eq!(column_letters_to_index("z"), Some(25));
        assert_eq!(column_letters_to_index("AA"), Some(26));
        assert_eq!(column_letters_to_index("XFD"), Some(MAX_COL_INDEX));
        assert_eq!(column_letters_to_index("XFE"), None);
        assert_eq!(column_letters_to_index(""), None);
        assert_eq!(column_letters_to_index("A1"), None);
    }
}
