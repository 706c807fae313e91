//! Module layout and chain index
//!
//! A layout holds modules in declared text order (rows outer, columns inner)
//! and a chain index derived once at construction by sorting on module id.
//! Text and shifts work on the declared rows; wire frames walk the chain in
//! whichever direction the chain is wired.
//!
//! ```text
//!   declared rows          chain index
//!   ┌───┬───┬───┐
//!   │ 2 │ 1 │ 0 │   ──▶    0, 1, 2, 3, 4, 5
//!   ├───┼───┼───┤
//!   │ 5 │ 4 │ 3 │
//!   └───┴───┴───┘
//! ```

use heapless::Vec;

use dotchain_protocol::MAX_CHAIN_LEN;

use crate::bitmap::{Bitmap, COLUMNS, ROWS};
use crate::error::Error;
use crate::glyph::GlyphSource;
use crate::module::{Canvas, Module};

/// Maximum modules in one layout
pub const MAX_MODULES: usize = MAX_CHAIN_LEN;

/// Maximum declared rows in one layout
pub const MAX_ROWS: usize = 16;

/// Declared module grid plus derived chain order
#[derive(Debug, Clone)]
pub struct Layout {
    /// Modules in declared order, rows concatenated
    modules: Vec<Module, MAX_MODULES>,
    /// Exclusive end offset of each declared row in `modules`
    row_ends: Vec<usize, MAX_ROWS>,
    /// Offsets into `modules`, sorted by ascending id
    chain: Vec<u8, MAX_MODULES>,
}

impl Layout {
    /// Single declared row of `count` blank modules with ids `0..count`
    pub fn single_row(count: usize) -> Result<Self, Error> {
        if count > MAX_MODULES {
            return Err(Error::LayoutTooLarge);
        }
        Self::from_rows([(0..count as u16).map(Module::new)])
    }

    /// Build from caller-supplied rows of modules
    ///
    /// Rows may have different lengths. Fails with
    /// [`Error::DuplicateModuleId`] if two modules share an id.
    pub fn from_rows<R, M>(rows: R) -> Result<Self, Error>
    where
        R: IntoIterator<Item = M>,
        M: IntoIterator<Item = Module>,
    {
        let mut modules: Vec<Module, MAX_MODULES> = Vec::new();
        let mut row_ends: Vec<usize, MAX_ROWS> = Vec::new();

        for row in rows {
            for module in row {
                modules.push(module).map_err(|_| Error::LayoutTooLarge)?;
            }
            row_ends
                .push(modules.len())
                .map_err(|_| Error::LayoutTooLarge)?;
        }

        let chain = build_chain(&modules)?;

        Ok(Self {
            modules,
            row_ends,
            chain,
        })
    }

    /// Number of declared rows
    pub fn row_count(&self) -> usize {
        self.row_ends.len()
    }

    /// Total number of modules
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Modules of one declared row, left to right
    pub fn row(&self, row: usize) -> Result<&[Module], Error> {
        let range = self.row_range(row)?;
        Ok(&self.modules[range])
    }

    /// Canvases of one declared row, left to right
    ///
    /// Only pixel state is handed out; ids and chain order stay fixed.
    pub fn row_mut(
        &mut self,
        row: usize,
    ) -> Result<impl DoubleEndedIterator<Item = &mut Canvas> + ExactSizeIterator + '_, Error> {
        let range = self.row_range(row)?;
        Ok(self.modules[range].iter_mut().map(|m| &mut **m))
    }

    /// All modules in declared order
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Canvases of all modules in declared order
    pub fn modules_mut(
        &mut self,
    ) -> impl DoubleEndedIterator<Item = &mut Canvas> + ExactSizeIterator + '_ {
        self.modules.iter_mut().map(|m| &mut **m)
    }

    /// Modules sorted by ascending id
    pub fn chain(&self) -> impl DoubleEndedIterator<Item = &Module> + ExactSizeIterator + '_ {
        self.chain.iter().map(move |&i| &self.modules[i as usize])
    }

    /// Module with the given id
    pub fn module(&self, id: u16) -> Result<&Module, Error> {
        self.modules
            .iter()
            .find(|m| m.id() == id)
            .ok_or(Error::UnknownModuleId(id))
    }

    /// Canvas of the module with the given id
    pub fn module_mut(&mut self, id: u16) -> Result<&mut Canvas, Error> {
        self.modules
            .iter_mut()
            .find(|m| m.id() == id)
            .map(|m| &mut **m)
            .ok_or(Error::UnknownModuleId(id))
    }

    /// Visit every module's id and canvas in ascending id order
    pub fn for_each_module<F: FnMut(u16, &mut Canvas)>(&mut self, mut f: F) {
        for &i in &self.chain {
            let module = &mut self.modules[i as usize];
            f(module.id(), module);
        }
    }

    /// Blank every module
    pub fn clear(&mut self) {
        self.for_each_module(|_, canvas| canvas.clear());
    }

    /// Light every module
    pub fn fill(&mut self) {
        self.for_each_module(|_, canvas| canvas.fill());
    }

    /// Invert every module
    pub fn invert(&mut self) {
        self.for_each_module(|_, canvas| canvas.invert());
    }

    /// Shift the whole layout up one pixel row
    ///
    /// Each module's top row moves into the bottom row of the module above
    /// it in the same column position. The topmost rows are discarded.
    pub fn shift_up(&mut self) {
        let mut carries: Vec<u8, MAX_MODULES> = Vec::new();
        for row in (0..self.row_count()).rev() {
            let range = self.row_ends_range(row);
            let mut next: Vec<u8, MAX_MODULES> = Vec::new();
            for (i, module) in self.modules[range].iter_mut().enumerate() {
                let carry = carries.get(i).copied().unwrap_or(0);
                let edge = module.get()[0];
                module.shift_up(1);
                module.bitmap_mut()[ROWS - 1] = carry;
                // Row length never exceeds MAX_MODULES
                let _ = next.push(edge);
            }
            carries = next;
        }
    }

    /// Shift the whole layout down one pixel row
    ///
    /// Each module's bottom row moves into the top row of the module below
    /// it in the same column position. The bottommost rows are discarded.
    pub fn shift_down(&mut self) {
        let mut carries: Vec<u8, MAX_MODULES> = Vec::new();
        for row in 0..self.row_count() {
            let range = self.row_ends_range(row);
            let mut next: Vec<u8, MAX_MODULES> = Vec::new();
            for (i, module) in self.modules[range].iter_mut().enumerate() {
                let carry = carries.get(i).copied().unwrap_or(0);
                let edge = module.get()[ROWS - 1];
                module.shift_down(1);
                module.bitmap_mut()[0] = carry;
                let _ = next.push(edge);
            }
            carries = next;
        }
    }

    /// Shift every declared row one column to the right (`>>` on row bytes)
    ///
    /// Column 7 of each module moves into column 0 of the next module in
    /// the row. The last module's column 7 is discarded.
    pub fn shift_right(&mut self) {
        for row in 0..self.row_count() {
            let range = self.row_ends_range(row);
            let mut carry = 0;
            for module in &mut self.modules[range] {
                let edge = module.read_column(COLUMNS - 1);
                module.shift_right(1);
                module.write_column(0, carry);
                carry = edge;
            }
        }
    }

    /// Shift every declared row one column to the left (`<<` on row bytes)
    ///
    /// Column 0 of each module moves into column 7 of the next module in
    /// the row. The last module's column 0 is discarded. Walking the row in
    /// the same direction as [`shift_right`](Self::shift_right) is what the
    /// scroll engine's reversed text relies on.
    pub fn shift_left(&mut self) {
        for row in 0..self.row_count() {
            let range = self.row_ends_range(row);
            let mut carry = 0;
            for module in &mut self.modules[range] {
                let edge = module.read_column(0);
                module.shift_left(1);
                module.write_column(COLUMNS - 1, carry);
                carry = edge;
            }
        }
    }

    /// Render `text` onto a declared row, one character per module
    ///
    /// All glyphs are looked up before any module changes, so a failure
    /// leaves the layout untouched. Modules past the end of the text keep
    /// their contents.
    pub fn set_text<G: GlyphSource + ?Sized>(
        &mut self,
        text: &str,
        row: usize,
        glyphs: &G,
    ) -> Result<(), Error> {
        let range = self.row_range(row)?;
        if text.chars().count() > range.len() {
            return Err(Error::TextTooLongForRow);
        }

        let mut bitmaps: Vec<Bitmap, MAX_MODULES> = Vec::new();
        for ch in text.chars() {
            // Length checked against the row above
            let _ = bitmaps.push(glyphs.glyph(ch)?);
        }

        for (module, bitmap) in self.modules[range].iter_mut().zip(bitmaps) {
            module.set_bitmap(bitmap);
        }
        Ok(())
    }

    fn row_range(&self, row: usize) -> Result<core::ops::Range<usize>, Error> {
        if row >= self.row_count() {
            return Err(Error::RowOutOfRange);
        }
        Ok(self.row_ends_range(row))
    }

    fn row_ends_range(&self, row: usize) -> core::ops::Range<usize> {
        let start = if row == 0 { 0 } else { self.row_ends[row - 1] };
        start..self.row_ends[row]
    }
}

/// Sort module offsets by id and reject duplicates
fn build_chain(modules: &[Module]) -> Result<Vec<u8, MAX_MODULES>, Error> {
    let mut chain: Vec<u8, MAX_MODULES> = (0..modules.len() as u8).collect();
    chain.sort_unstable_by_key(|&i| modules[i as usize].id());

    for pair in chain.windows(2) {
        let id = modules[pair[0] as usize].id();
        if id == modules[pair[1] as usize].id() {
            return Err(Error::DuplicateModuleId(id));
        }
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Font8x8;
    use crate::module::Preprocess;

    fn ids(layout: &Layout) -> Vec<u16, MAX_MODULES> {
        layout.chain().map(Module::id).collect()
    }

    fn grid(rows: &[&[u16]]) -> Layout {
        Layout::from_rows(rows.iter().map(|r| r.iter().map(|&id| Module::new(id)))).unwrap()
    }

    #[test]
    fn test_single_row() {
        let layout = Layout::single_row(4).unwrap();
        assert_eq!(layout.row_count(), 1);
        assert_eq!(layout.module_count(), 4);
        assert_eq!(ids(&layout).as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_chain_sorted_by_id() {
        let layout = grid(&[&[2, 1, 0], &[5, 3, 4]]);
        assert_eq!(ids(&layout).as_slice(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(layout.row(1).unwrap()[1].id(), 3);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Layout::from_rows([
            [Module::new(0), Module::new(1)],
            [Module::new(1), Module::new(2)],
        ]);
        assert_eq!(result.unwrap_err(), Error::DuplicateModuleId(1));
    }

    #[test]
    fn test_capacity() {
        assert!(Layout::single_row(MAX_MODULES).is_ok());
        assert_eq!(
            Layout::single_row(MAX_MODULES + 1).unwrap_err(),
            Error::LayoutTooLarge
        );
    }

    #[test]
    fn test_uneven_rows() {
        let layout = grid(&[&[0, 1, 2], &[3]]);
        assert_eq!(layout.row(0).unwrap().len(), 3);
        assert_eq!(layout.row(1).unwrap().len(), 1);
        assert_eq!(layout.row(2).unwrap_err(), Error::RowOutOfRange);
    }

    #[test]
    fn test_module_lookup() {
        let mut layout = grid(&[&[7, 9]]);
        layout.module_mut(9).unwrap().fill();
        assert_eq!(layout.module(9).unwrap().get(), [0xFF; 8]);
        assert_eq!(layout.module(8).unwrap_err(), Error::UnknownModuleId(8));
    }

    #[test]
    fn test_set_text() {
        let font = Font8x8;
        let mut layout = grid(&[&[0, 1, 2, 3, 4]]);
        layout.set_text("ABCDE", 0, &font).unwrap();
        for (module, ch) in layout.row(0).unwrap().iter().zip("ABCDE".chars()) {
            assert_eq!(module.get(), font.glyph(ch).unwrap());
        }
    }

    #[test]
    fn test_set_text_too_long() {
        let mut layout = grid(&[&[0, 1, 2, 3]]);
        assert_eq!(
            layout.set_text("ABCDE", 0, &Font8x8),
            Err(Error::TextTooLongForRow)
        );
        assert_eq!(
            layout.set_text("AB", 1, &Font8x8),
            Err(Error::RowOutOfRange)
        );
    }

    #[test]
    fn test_set_text_is_all_or_nothing() {
        let mut layout = grid(&[&[0, 1, 2]]);
        assert_eq!(
            layout.set_text("A#B", 0, &Font8x8),
            Err(Error::UnsupportedCharacter('#'))
        );
        assert!(layout.modules().iter().all(|m| m.get() == [0; 8]));
    }

    #[test]
    fn test_shift_left_carries_into_next_module() {
        let mut layout = grid(&[&[0, 1, 2]]);
        // Column 0 of module 0 is bit 7 of every row
        layout.module_mut(0).unwrap().set_bitmap([0x80; 8]);
        layout.shift_left();
        let row = layout.row(0).unwrap();
        assert_eq!(row[0].get(), [0x00; 8]);
        assert_eq!(row[1].get(), [0x01; 8]);

        // Carry out of the last module is dropped
        layout.module_mut(2).unwrap().set_bitmap([0x80; 8]);
        layout.shift_left();
        let row = layout.row(0).unwrap();
        assert_eq!(row[1].get(), [0x02; 8]);
        assert_eq!(row[2].get(), [0x00; 8]);
    }

    #[test]
    fn test_shift_right_carries_into_next_module() {
        let mut layout = grid(&[&[0, 1], &[2, 3]]);
        layout.module_mut(0).unwrap().set_bitmap([0x01; 8]);
        layout.shift_right();
        assert_eq!(layout.row(0).unwrap()[1].get(), [0x80; 8]);
        // Carries never cross into another declared row
        assert!(layout.row(1).unwrap().iter().all(|m| m.get() == [0; 8]));
    }

    #[test]
    fn test_shift_up_crosses_module_rows() {
        let mut layout = grid(&[&[0, 1], &[2, 3]]);
        layout.module_mut(3).unwrap().set_bitmap([0xAA, 0, 0, 0, 0, 0, 0, 0]);
        layout.module_mut(1).unwrap().set_bitmap([0x55, 0, 0, 0, 0, 0, 0, 0]);
        layout.shift_up();

        let top = layout.row(0).unwrap()[1].get();
        assert_eq!(top, [0, 0, 0, 0, 0, 0, 0, 0xAA]);
        assert_eq!(layout.row(1).unwrap()[1].get(), [0; 8]);
        assert_eq!(layout.row(0).unwrap()[0].get(), [0; 8]);
    }

    #[test]
    fn test_shift_down_crosses_module_rows() {
        let mut layout = grid(&[&[0, 1], &[2]]);
        layout.module_mut(0).unwrap().set_bitmap([0, 0, 0, 0, 0, 0, 0, 0x3C]);
        layout.module_mut(1).unwrap().set_bitmap([0, 0, 0, 0, 0, 0, 0, 0xFF]);
        layout.shift_down();

        assert_eq!(layout.row(1).unwrap()[0].get()[0], 0x3C);
        // No module below column 1, so its carry is dropped
        assert_eq!(layout.row(0).unwrap()[1].get(), [0; 8]);
    }

    #[test]
    fn test_mutable_access_keeps_ids_and_chain() {
        let mut layout = grid(&[&[2, 0, 1]]);
        *layout.module_mut(0).unwrap() = Canvas::with_preprocess(Preprocess::Rotate180);
        layout.module_mut(0).unwrap().set_bitmap([0x0F; 8]);

        // Swapping canvases moves pixels, never ids
        {
            let mut row = layout.row_mut(0).unwrap();
            let first = row.next().unwrap();
            let last = row.next_back().unwrap();
            first.set_bitmap([0xF0; 8]);
            core::mem::swap(first, last);
        }
        assert_eq!(layout.module(1).unwrap().get(), [0xF0; 8]);
        assert_eq!(layout.module(2).unwrap().get(), [0x00; 8]);

        assert_eq!(ids(&layout).as_slice(), &[0, 1, 2]);
        let declared: Vec<u16, MAX_MODULES> =
            layout.row(0).unwrap().iter().map(Module::id).collect();
        assert_eq!(declared.as_slice(), &[2, 0, 1]);
        assert_eq!(layout.module(0).unwrap().id(), 0);
        assert!(matches!(
            layout.module(0).unwrap().preprocess(),
            Preprocess::Rotate180
        ));

        let mut visited: Vec<u16, MAX_MODULES> = Vec::new();
        layout.for_each_module(|id, canvas| {
            canvas.fill();
            let _ = visited.push(id);
        });
        assert_eq!(visited.as_slice(), &[0, 1, 2]);
        assert_eq!(layout.modules_mut().len(), 3);
    }

    #[test]
    fn test_fill_invert_clear() {
        let mut layout = grid(&[&[0, 1], &[2]]);
        layout.fill();
        assert!(layout.modules().iter().all(|m| m.get() == [0xFF; 8]));
        layout.invert();
        assert!(layout.modules().iter().all(|m| m.get() == [0x00; 8]));
        layout.fill();
        layout.clear();
        assert!(layout.modules().iter().all(|m| m.get() == [0x00; 8]));
    }
}
