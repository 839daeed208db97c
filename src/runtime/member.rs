use std::sync::{Arc, Weak};

use bitflags::Flags;

use crate::{
    consts::{FieldAccessFlag, MemberAccessFlag, MethodAccessFlag},
    runtime::{AttributeInfo, Class},
};

/// Attributes shared by methods and fields.
///
/// Populated once while the owning class is loaded and never changed afterwards.
#[derive(Debug)]
pub struct Member<F> {
    pub(crate) class: Weak<Class>,
    pub(crate) class_name: Arc<str>,
    pub(crate) access_flags: F,
    pub(crate) name: Arc<str>,
    pub(crate) descriptor: Arc<str>,
    pub(crate) signature: Option<Arc<str>>,
    pub(crate) annotation_data: Option<Arc<[u8]>>,
}

impl<F: Flags<Bits = u16> + Copy> Member<F> {
    pub(crate) fn new(
        class_name: &Arc<str>,
        access_flags: F,
        name: Arc<str>,
        descriptor: Arc<str>,
        attributes: &[AttributeInfo],
    ) -> Self {
        let mut signature = None;
        let mut annotation_data = None;
        for attribute in attributes {
            match attribute {
                AttributeInfo::Signature(s) => signature = Some(Arc::clone(s)),
                AttributeInfo::RuntimeVisibleAnnotations(data) => {
                    annotation_data = Some(Arc::clone(data))
                }
                _ => continue,
            }
        }
        Self {
            class: Weak::new(),
            class_name: Arc::clone(class_name),
            access_flags,
            name,
            descriptor,
            signature,
            annotation_data,
        }
    }

    fn shared_flags(&self) -> MemberAccessFlag {
        MemberAccessFlag::from_bits_truncate(self.access_flags.bits())
    }

    /// `None` once the owning class has been dropped.
    pub fn class(&self) -> Option<Arc<Class>> {
        self.class.upgrade()
    }

    pub fn class_name(&self) -> &Arc<str> {
        &self.class_name
    }

    pub fn access_flags(&self) -> F {
        self.access_flags
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn descriptor(&self) -> &Arc<str> {
        &self.descriptor
    }

    pub fn signature(&self) -> Option<&Arc<str>> {
        self.signature.as_ref()
    }

    /// Raw `RuntimeVisibleAnnotations` payload.
    pub fn annotation_data(&self) -> Option<&[u8]> {
        self.annotation_data.as_deref()
    }

    pub fn is_public(&self) -> bool {
        self.shared_flags().contains(MemberAccessFlag::PUBLIC)
    }

    pub fn is_private(&self) -> bool {
        self.shared_flags().contains(MemberAccessFlag::PRIVATE)
    }

    pub fn is_protected(&self) -> bool {
        self.shared_flags().contains(MemberAccessFlag::PROTECTED)
    }

    pub fn is_static(&self) -> bool {
        self.shared_flags().contains(MemberAccessFlag::STATIC)
    }

    pub fn is_final(&self) -> bool {
        self.shared_flags().contains(MemberAccessFlag::FINAL)
    }

    pub fn is_synthetic(&self) -> bool {
        self.shared_flags().contains(MemberAccessFlag::SYNTHETIC)
    }
}

impl Member<MethodAccessFlag> {
    pub fn is_synchronized(&self) -> bool {
        self.access_flags.contains(MethodAccessFlag::SYNCHRONIZED)
    }

    pub fn is_native(&self) -> bool {
        self.access_flags.contains(MethodAccessFlag::NATIVE)
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags.contains(MethodAccessFlag::ABSTRACT)
    }

    pub fn is_varargs(&self) -> bool {
        self.access_flags.contains(MethodAccessFlag::VARARGS)
    }

    pub fn is_bridge(&self) -> bool {
        self.access_flags.contains(MethodAccessFlag::BRIDGE)
    }

    pub fn is_strict(&self) -> bool {
        self.access_flags.contains(MethodAccessFlag::STRICT)
    }
}

impl Member<FieldAccessFlag> {
    pub fn is_volatile(&self) -> bool {
        self.access_flags.contains(FieldAccessFlag::VOLATILE)
    }

    pub fn is_transient(&self) -> bool {
        self.access_flags.contains(FieldAccessFlag::TRANSIENT)
    }

    pub fn is_enum(&self) -> bool {
        self.access_flags.contains(FieldAccessFlag::ENUM)
    }
}
