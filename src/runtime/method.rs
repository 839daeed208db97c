use std::{
    fmt::{self, Debug, Display},
    ops::Deref,
    sync::Arc,
};

use log::{debug, trace};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::{
    class,
    consts::{
        CLASS_INITIALIZER_NAME, CONSTRUCTOR_NAME, INIT_IDS_NAME, MethodAccessFlag,
        REGISTER_NATIVES_NAME,
    },
    descriptor::{MethodDescriptor, intern_method_descriptor},
    error::{Error, Result},
    runtime::{
        AttributeInfo, CodeAttribute, ConstantPool, CpClassInfo, ExceptionTable, LineNumber,
        LineNumberTable, Member, NativeEnv, NativeResult, NativeVariable, parse_attributes,
    },
};

const NO_ARG_VOID_DESCRIPTOR: &str = "()V";

/// An externally supplied method implementation.
pub trait NativeMethod: Send + Sync {
    fn invoke(&self, env: NativeEnv) -> NativeResult<Option<NativeVariable>>;
}

/// A resolved native implementation, cheap to clone.
#[derive(Clone)]
pub struct NativeBinding(Arc<dyn NativeMethod>);

impl NativeBinding {
    pub fn new(native: impl NativeMethod + 'static) -> Self {
        Self(Arc::new(native))
    }

    pub fn invoke(&self, env: NativeEnv) -> NativeResult<Option<NativeVariable>> {
        self.0.invoke(env)
    }

    pub fn ptr_eq(&self, other: &NativeBinding) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for NativeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native method>")
    }
}

/// Registry key: fully-qualified class name, method name, method descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeKey {
    pub class_name: Arc<str>,
    pub name: Arc<str>,
    pub descriptor: Arc<str>,
}

impl NativeKey {
    pub fn new(class_name: &str, name: &str, descriptor: &str) -> Self {
        Self {
            class_name: Arc::from(class_name),
            name: Arc::from(name),
            descriptor: Arc::from(descriptor),
        }
    }
}

impl Display for NativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class_name, self.name, self.descriptor)
    }
}

/// Source of native implementations consulted on first invocation.
pub trait NativeLookup {
    fn find_native(&self, method: &Method) -> Option<NativeBinding>;
}

#[derive(Debug)]
pub struct Method {
    pub(crate) member: Member<MethodAccessFlag>,
    max_stack: u16,
    max_locals: u16,
    arg_count: usize,
    parsed_descriptor: Arc<MethodDescriptor>,
    code: RwLock<Option<Arc<[u8]>>>,
    exception_table: ExceptionTable,
    line_number_table: Option<LineNumberTable>,
    declared_exceptions: Option<Vec<CpClassInfo>>,
    parameter_annotation_data: Option<Arc<[u8]>>,
    annotation_default_data: Option<Arc<[u8]>>,
    native_method: OnceCell<NativeBinding>,
}

impl Method {
    pub(crate) fn new(
        constant_pool: &ConstantPool,
        class_name: &Arc<str>,
        method_info: &class::MethodInfo,
    ) -> Result<Self> {
        let attributes = parse_attributes(&method_info.attributes, constant_pool)?;
        let member = Member::new(
            class_name,
            method_info.access_flags,
            constant_pool.utf8(method_info.name_index)?,
            constant_pool.utf8(method_info.descriptor_index)?,
            &attributes,
        );
        let parsed_descriptor = intern_method_descriptor(&member.descriptor)?;

        let mut method = Method {
            member,
            max_stack: 0,
            max_locals: 0,
            arg_count: parsed_descriptor.arg_count(),
            parsed_descriptor,
            code: RwLock::new(None),
            exception_table: ExceptionTable::default(),
            line_number_table: None,
            declared_exceptions: None,
            parameter_annotation_data: None,
            annotation_default_data: None,
            native_method: OnceCell::new(),
        };
        method.copy_attributes(constant_pool, attributes)?;
        method.check_code_presence()?;
        Ok(method)
    }

    fn check_code_presence(&self) -> Result<()> {
        let has_code = self.code.read().is_some();
        let message = match (self.is_bodiless(), has_code) {
            (true, true) => "unexpected on a native or abstract method",
            (false, false) => "required on a method with a body",
            _ => return Ok(()),
        };
        Err(Error::MalformedAttribute {
            attribute: Arc::from("Code"),
            message: format!("{message}: {self}"),
        })
    }

    fn copy_attributes(
        &mut self,
        constant_pool: &ConstantPool,
        attributes: Vec<AttributeInfo>,
    ) -> Result<()> {
        for attribute in attributes {
            match attribute {
                AttributeInfo::Code(code) => self.copy_code(constant_pool, code)?,
                AttributeInfo::Exceptions(indices) => {
                    let exceptions = indices
                        .into_iter()
                        .map(|index| constant_pool.class(index).cloned())
                        .collect::<Result<Vec<_>>>()?;
                    self.declared_exceptions = Some(exceptions);
                }
                AttributeInfo::RuntimeVisibleParameterAnnotations(data) => {
                    self.parameter_annotation_data = Some(data)
                }
                AttributeInfo::AnnotationDefault(data) => self.annotation_default_data = Some(data),
                _ => continue,
            }
        }
        Ok(())
    }

    fn copy_code(&mut self, constant_pool: &ConstantPool, code: CodeAttribute) -> Result<()> {
        self.max_stack = code.max_stack;
        self.max_locals = code.max_locals;
        self.exception_table = ExceptionTable::new(
            &self.to_string(),
            &code.exception_table,
            code.code.len(),
            constant_pool,
        )?;

        let mut line_numbers = None;
        for attribute in code.attributes {
            if let AttributeInfo::LineNumberTable(items) = attribute {
                line_numbers.get_or_insert_with(Vec::new).extend(items);
            }
        }
        self.line_number_table = line_numbers.map(LineNumberTable::new);
        *self.code.get_mut() = Some(code.code);
        Ok(())
    }

    pub fn member(&self) -> &Member<MethodAccessFlag> {
        &self.member
    }

    pub fn max_stack(&self) -> usize {
        usize::from(self.max_stack)
    }

    pub fn max_locals(&self) -> usize {
        usize::from(self.max_locals)
    }

    /// Parameter slots from the descriptor, excluding `this`.
    pub fn arg_count(&self) -> usize {
        self.arg_count
    }

    /// Parameter slots including the receiver of an instance method.
    pub fn actual_arg_count(&self) -> usize {
        if self.is_static() {
            self.arg_count
        } else {
            self.arg_count + 1
        }
    }

    pub fn parsed_descriptor(&self) -> &Arc<MethodDescriptor> {
        &self.parsed_descriptor
    }

    /// `None` for abstract and native methods.
    ///
    /// Frames should hold on to the returned `Arc` for as long as they execute.
    pub fn code(&self) -> Option<Arc<[u8]>> {
        self.code.read().clone()
    }

    pub(in crate::runtime) fn code_lock(&self) -> &RwLock<Option<Arc<[u8]>>> {
        &self.code
    }

    pub fn exception_table(&self) -> &ExceptionTable {
        &self.exception_table
    }

    pub fn line_number_table(&self) -> Option<&LineNumberTable> {
        self.line_number_table.as_ref()
    }

    pub fn declared_exceptions(&self) -> Option<&[CpClassInfo]> {
        self.declared_exceptions.as_deref()
    }

    /// Raw `RuntimeVisibleParameterAnnotations` payload.
    pub fn parameter_annotation_data(&self) -> Option<&[u8]> {
        self.parameter_annotation_data.as_deref()
    }

    /// Raw `AnnotationDefault` payload.
    pub fn annotation_default_data(&self) -> Option<&[u8]> {
        self.annotation_default_data.as_deref()
    }

    pub fn is_void_return_type(&self) -> bool {
        self.parsed_descriptor.is_void()
    }

    pub fn is_constructor(&self) -> bool {
        !self.is_static() && &*self.name == CONSTRUCTOR_NAME
    }

    pub fn is_class_initializer(&self) -> bool {
        self.is_static_no_arg_void(CLASS_INITIALIZER_NAME)
    }

    /// The hook some library classes use to install their own natives.
    pub fn is_register_natives(&self) -> bool {
        self.is_static_no_arg_void(REGISTER_NATIVES_NAME)
    }

    pub fn is_init_ids(&self) -> bool {
        self.is_static_no_arg_void(INIT_IDS_NAME)
    }

    /// Native and abstract methods carry no bytecode. Class initializers always do.
    pub(crate) fn is_bodiless(&self) -> bool {
        (self.is_native() || self.is_abstract()) && &*self.name != CLASS_INITIALIZER_NAME
    }

    fn is_static_no_arg_void(&self, name: &str) -> bool {
        self.is_static() && &*self.name == name && &*self.descriptor == NO_ARG_VOID_DESCRIPTOR
    }

    pub fn get_line_number(&self, pc: usize) -> LineNumber {
        if self.is_native() {
            return LineNumber::NativeMethod;
        }
        let Some(table) = &self.line_number_table else {
            return LineNumber::NoLineTable;
        };
        let code_length = self.code.read().as_ref().map_or(0, |code| code.len());
        if pc >= code_length {
            return LineNumber::OutOfRange;
        }
        match table.get_line_number(pc) {
            Some(line) => LineNumber::Found(line),
            None => LineNumber::OutOfRange,
        }
    }

    pub fn native_key(&self) -> NativeKey {
        NativeKey {
            class_name: Arc::clone(&self.class_name),
            name: Arc::clone(&self.name),
            descriptor: Arc::clone(&self.descriptor),
        }
    }

    /// Binds this native method on first call and returns the same binding afterwards.
    ///
    /// A failed lookup is not remembered, so a later call can pick up an implementation
    /// registered in the meantime.
    pub fn resolve_native_binding<L: NativeLookup + ?Sized>(
        &self,
        lookup: &L,
    ) -> Result<NativeBinding> {
        if !self.is_native() {
            return Err(Error::NotNativeMethod {
                class_name: Arc::clone(&self.class_name),
                name: Arc::clone(&self.name),
                descriptor: Arc::clone(&self.descriptor),
            });
        }
        let binding = self.native_method.get_or_try_init(|| {
            let Some(binding) = lookup.find_native(self) else {
                debug!("no native binding for {self}");
                return Err(Error::MissingNativeBinding {
                    class_name: Arc::clone(&self.class_name),
                    name: Arc::clone(&self.name),
                    descriptor: Arc::clone(&self.descriptor),
                });
            };
            trace!("bound native method {self}");
            Ok(binding)
        })?;
        Ok(binding.clone())
    }

    /// The binding memoized by an earlier successful resolution.
    pub fn bound_native(&self) -> Option<&NativeBinding> {
        self.native_method.get()
    }
}

impl Deref for Method {
    type Target = Member<MethodAccessFlag>;

    fn deref(&self) -> &Self::Target {
        &self.member
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class_name, self.name, self.descriptor)
    }
}
