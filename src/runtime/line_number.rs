use crate::runtime::LineNumberTableItem;

/// Outcome of mapping a pc to a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineNumber {
    Found(u16),
    /// Native methods carry no bytecode.
    NativeMethod,
    /// The class was compiled without line information.
    NoLineTable,
    /// The pc lies before the first recorded entry or beyond the code.
    OutOfRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineNumberTable {
    entries: Vec<LineNumberTableItem>,
}

impl LineNumberTable {
    pub(crate) fn new(mut entries: Vec<LineNumberTableItem>) -> Self {
        entries.sort_by_key(|entry| entry.start_pc);
        Self { entries }
    }

    pub fn entries(&self) -> &[LineNumberTableItem] {
        &self.entries
    }

    pub fn get_line_number(&self, pc: usize) -> Option<u16> {
        let after = self
            .entries
            .partition_point(|entry| usize::from(entry.start_pc) <= pc);
        after
            .checked_sub(1)
            .map(|index| self.entries[index].line_number)
    }
}
