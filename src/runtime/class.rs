use std::sync::Arc;

use log::debug;

use crate::{
    class as raw,
    consts::{ClassAccessFlag, MAIN_METHOD_DESCRIPTOR, MAIN_METHOD_NAME},
    error::Result,
    runtime::{ConstantPool, CpClassInfo, ExceptionMatcher, Field, Method},
};

/// A loaded class. Owns its methods and fields, which point back at it weakly.
#[derive(Debug)]
pub struct Class {
    pub(crate) class_name: Arc<str>,
    pub(crate) access_flags: ClassAccessFlag,
    pub(crate) super_class: Option<Arc<Class>>,
    pub(crate) interfaces: Vec<Arc<Class>>,
    pub(crate) constant_pool: ConstantPool,
    pub(crate) fields: Vec<Field>,
    pub(crate) methods: Vec<Method>,
    pub(crate) instance_slot_count: usize,
    pub(crate) static_slot_count: usize,
}

impl Class {
    /// Builds the runtime class from decoder output.
    ///
    /// `super_class` and `interfaces` must already be loaded. Any malformed descriptor,
    /// attribute or exception table fails the whole class.
    pub fn load(
        class_file: &raw::Class,
        super_class: Option<Arc<Class>>,
        interfaces: Vec<Arc<Class>>,
    ) -> Result<Arc<Class>> {
        let constant_pool = ConstantPool::new(&class_file.constant_pool)?;
        let class_name = Arc::clone(constant_pool.class(class_file.this_class)?.name());

        let mut fields = class_file
            .fields
            .iter()
            .map(|field| Field::new(&constant_pool, &class_name, field))
            .collect::<Result<Vec<_>>>()?;
        let (instance_slot_count, static_slot_count) = assign_field_slots(&mut fields);

        let methods = class_file
            .methods
            .iter()
            .map(|method| Method::new(&constant_pool, &class_name, method))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "loaded class {class_name}: {} methods, {} fields",
            methods.len(),
            fields.len()
        );

        Ok(Arc::new_cyclic(|this| {
            for field in &mut fields {
                field.member.class = this.clone();
            }
            let methods = methods
                .into_iter()
                .map(|mut method| {
                    method.member.class = this.clone();
                    method
                })
                .collect();
            Class {
                class_name,
                access_flags: class_file.access_flags,
                super_class,
                interfaces,
                constant_pool,
                fields,
                methods,
                instance_slot_count,
                static_slot_count,
            }
        }))
    }

    pub fn name(&self) -> &Arc<str> {
        &self.class_name
    }

    pub fn access_flags(&self) -> ClassAccessFlag {
        self.access_flags
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlag::INTERFACE)
    }

    pub fn super_class(&self) -> Option<&Arc<Class>> {
        self.super_class.as_ref()
    }

    pub fn interfaces(&self) -> &[Arc<Class>] {
        &self.interfaces
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn instance_slot_count(&self) -> usize {
        self.instance_slot_count
    }

    pub fn static_slot_count(&self) -> usize {
        self.static_slot_count
    }

    pub fn get_method(&self, name: &str, descriptor: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|method| &*method.name == name && &*method.descriptor == descriptor)
    }

    pub fn get_field(&self, name: &str, descriptor: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| &*field.name == name && &*field.descriptor == descriptor)
    }

    pub fn class_initializer(&self) -> Option<&Method> {
        self.methods.iter().find(|method| method.is_class_initializer())
    }

    pub fn main_method(&self) -> Option<&Method> {
        self.get_method(MAIN_METHOD_NAME, MAIN_METHOD_DESCRIPTOR)
            .filter(|method| method.is_public() && method.is_static())
    }

    pub fn package_name(&self) -> &str {
        let Some((package, _)) = self.class_name.rsplit_once('/') else {
            return "";
        };
        package
    }

    /// Whether this class is `target_name`, extends it, or implements it.
    pub fn is_same_or_sub_class_of(&self, target_name: &str) -> bool {
        if &*self.class_name == target_name {
            return true;
        }
        if self
            .interfaces
            .iter()
            .any(|interface| interface.is_same_or_sub_class_of(target_name))
        {
            return true;
        }
        if let Some(super_class) = &self.super_class {
            return super_class.is_same_or_sub_class_of(target_name);
        }
        false
    }
}

/// The class of a thrown exception matches every catch type it is assignable to.
impl ExceptionMatcher for Class {
    fn matches(&self, catch_type: &CpClassInfo) -> bool {
        self.is_same_or_sub_class_of(catch_type.name())
    }
}

/// Returns `(instance_slot_count, static_slot_count)`.
fn assign_field_slots(fields: &mut [Field]) -> (usize, usize) {
    let mut static_size = 0;
    let mut instance_size = 0;
    for field in fields {
        let size = field.slot_size();
        if field.is_static() {
            field.slot_id = static_size;
            static_size += size;
        } else {
            field.slot_id = instance_size;
            instance_size += size;
        }
    }
    (instance_size, static_size)
}
