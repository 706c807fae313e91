//! 8x8 bitmap transforms
//!
//! A bitmap is eight row bytes. Bit 7 of a row is column 0, bit 0 is
//! column 7, which is what the column transpose below implies.

/// Rows in a module bitmap
pub const ROWS: usize = 8;

/// Columns in a module bitmap
pub const COLUMNS: usize = 8;

/// One row byte per bitmap row
pub type Bitmap = [u8; ROWS];

/// Blank bitmap
pub const BLANK: Bitmap = [0x00; ROWS];

/// Fully lit bitmap
pub const FULL: Bitmap = [0xFF; ROWS];

/// Reverse the bit order of a byte
pub const fn reverse8(b: u8) -> u8 {
    b.reverse_bits()
}

/// Rotate 90° clockwise
///
/// Bit `j` of source row `i` becomes bit `i` of row `7 - j`. Row `c` of the
/// result is column `c` of the source.
pub fn rotate_cw(data: &Bitmap) -> Bitmap {
    let mut out = BLANK;
    for (i, &row) in data.iter().enumerate() {
        for j in 0..COLUMNS {
            let bit = (row >> j) & 1;
            out[ROWS - 1 - j] |= bit << i;
        }
    }
    out
}

/// Inverse of [`rotate_cw`]
pub fn rotate_ccw(data: &Bitmap) -> Bitmap {
    // Four clockwise turns are the identity
    rotate_cw(&rotate_cw(&rotate_cw(data)))
}

/// Reverse row order (top-bottom mirror)
pub fn flip_rows(data: &Bitmap) -> Bitmap {
    let mut out = *data;
    out.reverse();
    out
}

/// Reverse bit order within every row (left-right mirror)
pub fn flip_bits(data: &Bitmap) -> Bitmap {
    data.map(reverse8)
}

/// Rotate 180°
pub fn rotate_180(data: &Bitmap) -> Bitmap {
    flip_bits(&flip_rows(data))
}

/// Complement every bit
pub fn invert(data: &Bitmap) -> Bitmap {
    data.map(|b| !b)
}
