use std::sync::Arc;

use cesu8_str::java as cesu8_java;

use crate::{
    class,
    error::{Error, Result},
};

/// A constant pool with its text decoded once. Symbolic references stay as indices.
#[derive(Debug, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolInfo>,
}

#[derive(Debug, Clone)]
pub enum ConstantPoolInfo {
    Utf8(Arc<str>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(CpClassInfo),
    String(Arc<str>),
    Fieldref {
        class_index: u16,
        name_and_type_index: u16,
    },
    Methodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    Dynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    Module(Arc<str>),
    Package(Arc<str>),
    Empty,
}

/// A symbolic class reference, matched by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CpClassInfo {
    pub(crate) name: Arc<str>,
}

impl CpClassInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }
}

impl ConstantPool {
    pub fn new(pool: &[class::ConstantPoolInfo]) -> Result<Self> {
        let mut strings = Vec::with_capacity(pool.len());
        for (i, entry) in pool.iter().enumerate() {
            let decoded = match entry {
                class::ConstantPoolInfo::Utf8(bytes) => Some(decode_utf8(bytes, index_of(i))?),
                _ => None,
            };
            strings.push(decoded);
        }
        let text = |index: u16, expected: &'static str| -> Result<Arc<str>> {
            index
                .checked_sub(1)
                .and_then(|i| strings.get(i as usize))
                .and_then(Option::clone)
                .ok_or(Error::InvalidConstantPoolIndex { index, expected })
        };

        let mut entries = Vec::with_capacity(pool.len());
        for (i, entry) in pool.iter().enumerate() {
            let entry = match *entry {
                class::ConstantPoolInfo::Utf8(_) => {
                    ConstantPoolInfo::Utf8(text(index_of(i), "Utf8")?)
                }
                class::ConstantPoolInfo::Integer(v) => ConstantPoolInfo::Integer(v),
                class::ConstantPoolInfo::Float(v) => ConstantPoolInfo::Float(v),
                class::ConstantPoolInfo::Long(v) => ConstantPoolInfo::Long(v),
                class::ConstantPoolInfo::Double(v) => ConstantPoolInfo::Double(v),
                class::ConstantPoolInfo::Class { name_index } => {
                    ConstantPoolInfo::Class(CpClassInfo {
                        name: text(name_index, "Utf8")?,
                    })
                }
                class::ConstantPoolInfo::String { string_index } => {
                    ConstantPoolInfo::String(text(string_index, "Utf8")?)
                }
                class::ConstantPoolInfo::Fieldref {
                    class_index,
                    name_and_type_index,
                } => ConstantPoolInfo::Fieldref {
                    class_index,
                    name_and_type_index,
                },
                class::ConstantPoolInfo::Methodref {
                    class_index,
                    name_and_type_index,
                } => ConstantPoolInfo::Methodref {
                    class_index,
                    name_and_type_index,
                },
                class::ConstantPoolInfo::InterfaceMethodref {
                    class_index,
                    name_and_type_index,
                } => ConstantPoolInfo::InterfaceMethodref {
                    class_index,
                    name_and_type_index,
                },
                class::ConstantPoolInfo::NameAndType {
                    name_index,
                    descriptor_index,
                } => ConstantPoolInfo::NameAndType {
                    name_index,
                    descriptor_index,
                },
                class::ConstantPoolInfo::MethodHandle {
                    reference_kind,
                    reference_index,
                } => ConstantPoolInfo::MethodHandle {
                    reference_kind,
                    reference_index,
                },
                class::ConstantPoolInfo::MethodType { descriptor_index } => {
                    ConstantPoolInfo::MethodType { descriptor_index }
                }
                class::ConstantPoolInfo::Dynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                } => ConstantPoolInfo::Dynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                },
                class::ConstantPoolInfo::InvokeDynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                } => ConstantPoolInfo::InvokeDynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                },
                class::ConstantPoolInfo::Module { name_index } => {
                    ConstantPoolInfo::Module(text(name_index, "Utf8")?)
                }
                class::ConstantPoolInfo::Package { name_index } => {
                    ConstantPoolInfo::Package(text(name_index, "Utf8")?)
                }
                class::ConstantPoolInfo::Empty => ConstantPoolInfo::Empty,
            };
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// `index` is one-based, as in the class file.
    pub fn get(&self, index: u16) -> Option<&ConstantPoolInfo> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i as usize))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn utf8(&self, index: u16) -> Result<Arc<str>> {
        match self.get(index) {
            Some(ConstantPoolInfo::Utf8(string)) => Ok(Arc::clone(string)),
            _ => Err(Error::InvalidConstantPoolIndex {
                index,
                expected: "Utf8",
            }),
        }
    }

    pub fn class(&self, index: u16) -> Result<&CpClassInfo> {
        match self.get(index) {
            Some(ConstantPoolInfo::Class(class)) => Ok(class),
            _ => Err(Error::InvalidConstantPoolIndex {
                index,
                expected: "Class",
            }),
        }
    }
}

fn index_of(position: usize) -> u16 {
    (position + 1) as u16
}

fn decode_utf8(bytes: &[u8], index: u16) -> Result<Arc<str>> {
    let java_str = cesu8_java::JavaStr::from_java_cesu8(bytes)
        .map_err(|_| Error::InvalidModifiedUtf8 { index })?;
    Ok(Arc::from(&*cesu8_java::from_java_cesu8(java_str)))
}
