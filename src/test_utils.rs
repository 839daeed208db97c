use std::collections::HashMap;

use crate::{
    class::{AttributeInfo, Class, ConstantPoolInfo, FieldInfo, MethodInfo},
    consts::{ClassAccessFlag, FieldAccessFlag, MethodAccessFlag},
    runtime::ConstantPool,
};

/// Assembles decoder output by hand.
#[derive(Default)]
pub(crate) struct PoolBuilder {
    entries: Vec<ConstantPoolInfo>,
    strings: HashMap<String, u16>,
}

impl PoolBuilder {
    fn push(&mut self, entry: ConstantPoolInfo) -> u16 {
        self.entries.push(entry);
        self.entries.len() as u16
    }

    pub(crate) fn utf8(&mut self, string: &str) -> u16 {
        if let Some(index) = self.strings.get(string) {
            return *index;
        }
        let index = self.push(ConstantPoolInfo::utf8(string));
        self.strings.insert(string.to_string(), index);
        index
    }

    pub(crate) fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.push(ConstantPoolInfo::Class { name_index })
    }

    pub(crate) fn method(
        &mut self,
        access_flags: MethodAccessFlag,
        name: &str,
        descriptor: &str,
        attributes: Vec<AttributeInfo>,
    ) -> MethodInfo {
        MethodInfo {
            access_flags,
            name_index: self.utf8(name),
            descriptor_index: self.utf8(descriptor),
            attributes,
        }
    }

    pub(crate) fn field(
        &mut self,
        access_flags: FieldAccessFlag,
        name: &str,
        descriptor: &str,
        attributes: Vec<AttributeInfo>,
    ) -> FieldInfo {
        FieldInfo {
            access_flags,
            name_index: self.utf8(name),
            descriptor_index: self.utf8(descriptor),
            attributes,
        }
    }

    pub(crate) fn raw(&mut self, name: &str, info: &[u8]) -> AttributeInfo {
        AttributeInfo {
            attribute_name_index: self.utf8(name),
            info: info.to_vec(),
        }
    }

    /// Exception table rows are `(start_pc, end_pc, handler_pc, catch_type)`.
    pub(crate) fn code(
        &mut self,
        max_stack: u16,
        max_locals: u16,
        code: &[u8],
        exception_table: &[(u16, u16, u16, u16)],
        attributes: Vec<AttributeInfo>,
    ) -> AttributeInfo {
        let mut info = Vec::new();
        info.extend_from_slice(&max_stack.to_be_bytes());
        info.extend_from_slice(&max_locals.to_be_bytes());
        info.extend_from_slice(&(code.len() as u32).to_be_bytes());
        info.extend_from_slice(code);
        info.extend_from_slice(&(exception_table.len() as u16).to_be_bytes());
        for (start_pc, end_pc, handler_pc, catch_type) in exception_table {
            for value in [start_pc, end_pc, handler_pc, catch_type] {
                info.extend_from_slice(&value.to_be_bytes());
            }
        }
        info.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for attribute in attributes {
            info.extend_from_slice(&attribute.attribute_name_index.to_be_bytes());
            info.extend_from_slice(&(attribute.info.len() as u32).to_be_bytes());
            info.extend_from_slice(&attribute.info);
        }
        self.raw("Code", &info)
    }

    /// Rows are `(start_pc, line_number)`.
    pub(crate) fn line_number_table(&mut self, rows: &[(u16, u16)]) -> AttributeInfo {
        let mut info = (rows.len() as u16).to_be_bytes().to_vec();
        for (start_pc, line_number) in rows {
            info.extend_from_slice(&start_pc.to_be_bytes());
            info.extend_from_slice(&line_number.to_be_bytes());
        }
        self.raw("LineNumberTable", &info)
    }

    pub(crate) fn exceptions(&mut self, class_indices: &[u16]) -> AttributeInfo {
        let mut info = (class_indices.len() as u16).to_be_bytes().to_vec();
        for index in class_indices {
            info.extend_from_slice(&index.to_be_bytes());
        }
        self.raw("Exceptions", &info)
    }

    pub(crate) fn constant_value(&mut self, index: u16) -> AttributeInfo {
        self.raw("ConstantValue", &index.to_be_bytes())
    }

    pub(crate) fn build(&self) -> ConstantPool {
        ConstantPool::new(&self.entries).expect("test constant pool must be valid")
    }

    pub(crate) fn class_file(
        mut self,
        name: &str,
        access_flags: ClassAccessFlag,
        fields: Vec<FieldInfo>,
        methods: Vec<MethodInfo>,
    ) -> Class {
        let this_class = self.class(name);
        Class {
            minor_version: 0,
            major_version: 61,
            constant_pool: self.entries,
            access_flags,
            this_class,
            super_class: 0,
            interfaces: vec![],
            fields,
            methods,
            attributes: vec![],
        }
    }
}
