use crate::{
    error::{Error, ExceptionTableError, Result},
    runtime::{ConstantPool, CpClassInfo, ExceptionTableItem},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatchType {
    /// Catch type index 0, used by `finally` blocks.
    Any,
    Class(CpClassInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    start_pc: u16,
    end_pc: u16,
    handler_pc: u16,
    catch_type: CatchType,
}

impl ExceptionTableEntry {
    pub fn new(start_pc: u16, end_pc: u16, handler_pc: u16, catch_type: CatchType) -> Self {
        Self {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        }
    }

    pub fn start_pc(&self) -> u16 {
        self.start_pc
    }

    pub fn end_pc(&self) -> u16 {
        self.end_pc
    }

    pub fn handler_pc(&self) -> u16 {
        self.handler_pc
    }

    pub fn catch_type(&self) -> &CatchType {
        &self.catch_type
    }

    /// `start_pc` inclusive, `end_pc` exclusive.
    pub fn covers(&self, pc: usize) -> bool {
        usize::from(self.start_pc) <= pc && pc < usize::from(self.end_pc)
    }

    fn check(&self, code_length: usize) -> Result<(), ExceptionTableError> {
        if self.start_pc >= self.end_pc {
            return Err(ExceptionTableError::EmptyRange {
                start_pc: self.start_pc,
                end_pc: self.end_pc,
            });
        }
        if usize::from(self.end_pc) > code_length {
            return Err(ExceptionTableError::EndOutOfBounds {
                end_pc: self.end_pc,
                code_length,
            });
        }
        if usize::from(self.handler_pc) >= code_length {
            return Err(ExceptionTableError::HandlerOutOfBounds {
                handler_pc: self.handler_pc,
                code_length,
            });
        }
        Ok(())
    }
}

/// Decides whether the exception being thrown is assignable to a catch type.
pub trait ExceptionMatcher {
    fn matches(&self, catch_type: &CpClassInfo) -> bool;
}

impl<F: Fn(&CpClassInfo) -> bool> ExceptionMatcher for F {
    fn matches(&self, catch_type: &CpClassInfo) -> bool {
        self(catch_type)
    }
}

/// Handlers in class-file order. The first entry that covers the pc and matches wins,
/// which is what nested `try` blocks compile down to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionTable {
    entries: Vec<ExceptionTableEntry>,
}

impl ExceptionTable {
    pub(crate) fn new(
        method: &str,
        items: &[ExceptionTableItem],
        code_length: usize,
        constant_pool: &ConstantPool,
    ) -> Result<Self> {
        let mut entries = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let malformed = |reason| Error::MalformedExceptionTable {
                method: method.to_string(),
                index,
                reason,
            };
            let catch_type = match item.catch_type {
                0 => CatchType::Any,
                catch_type => CatchType::Class(
                    constant_pool
                        .class(catch_type)
                        .map_err(|_| malformed(ExceptionTableError::InvalidCatchType(catch_type)))?
                        .clone(),
                ),
            };
            let entry = ExceptionTableEntry::new(
                item.start_pc,
                item.end_pc,
                item.handler_pc,
                catch_type,
            );
            entry.check(code_length).map_err(malformed)?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Checks every entry against a code array of `code_length` bytes.
    pub(crate) fn validate(&self, method: &str, code_length: usize) -> Result<()> {
        for (index, entry) in self.entries.iter().enumerate() {
            entry
                .check(code_length)
                .map_err(|reason| Error::MalformedExceptionTable {
                    method: method.to_string(),
                    index,
                    reason,
                })?;
        }
        Ok(())
    }

    pub fn entries(&self) -> &[ExceptionTableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_handler<M: ExceptionMatcher + ?Sized>(
        &self,
        pc: usize,
        thrown: &M,
    ) -> Option<&ExceptionTableEntry> {
        self.entries.iter().find(|entry| {
            entry.covers(pc)
                && match &entry.catch_type {
                    CatchType::Any => true,
                    CatchType::Class(class) => thrown.matches(class),
                }
        })
    }

    /// Returns the handler pc, or `None` when the frame has to be unwound.
    pub fn lookup<M: ExceptionMatcher + ?Sized>(&self, pc: usize, thrown: &M) -> Option<usize> {
        self.find_handler(pc, thrown)
            .map(|entry| usize::from(entry.handler_pc))
    }
}
