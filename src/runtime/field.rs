use std::{ops::Deref, sync::Arc};

use crate::{
    class,
    consts::FieldAccessFlag,
    descriptor::{FieldDescriptor, FieldType},
    error::Result,
    runtime::{AttributeInfo, ConstantPool, Member, parse_attributes},
};

#[derive(Debug)]
pub struct Field {
    pub(crate) member: Member<FieldAccessFlag>,
    field_type: FieldType,
    const_value_index: Option<u16>,
    pub(crate) slot_id: usize,
}

impl Field {
    pub(crate) fn new(
        constant_pool: &ConstantPool,
        class_name: &Arc<str>,
        field_info: &class::FieldInfo,
    ) -> Result<Self> {
        let attributes = parse_attributes(&field_info.attributes, constant_pool)?;
        let member = Member::new(
            class_name,
            field_info.access_flags,
            constant_pool.utf8(field_info.name_index)?,
            constant_pool.utf8(field_info.descriptor_index)?,
            &attributes,
        );
        let FieldDescriptor(field_type) = FieldDescriptor::parse(&member.descriptor)?;
        let const_value_index = attributes.iter().find_map(|attribute| match attribute {
            AttributeInfo::ConstantValue(index) => Some(*index),
            _ => None,
        });

        Ok(Field {
            member,
            field_type,
            const_value_index,
            slot_id: 0,
        })
    }

    pub fn member(&self) -> &Member<FieldAccessFlag> {
        &self.member
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Index of the `ConstantValue` initializer, if the field has one.
    pub fn const_value_index(&self) -> Option<u16> {
        self.const_value_index
    }

    /// First slot in the static or the instance slot space, depending on the field.
    pub fn slot_id(&self) -> usize {
        self.slot_id
    }

    pub fn slot_size(&self) -> usize {
        self.field_type.slot_size()
    }
}

impl Deref for Field {
    type Target = Member<FieldAccessFlag>;

    fn deref(&self) -> &Self::Target {
        &self.member
    }
}
