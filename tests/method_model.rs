use std::sync::Arc;

use jvm_method::{
    class::{AttributeInfo, Class as ClassFile, ConstantPoolInfo, MethodInfo},
    consts::{ClassAccessFlag, MethodAccessFlag},
    error::Error,
    runtime::{
        Class, LineNumber, NativeEnv, NativeRegistry, NativeResult, NativeVariable, instrument,
    },
};

struct ClassFileBuilder {
    constant_pool: Vec<ConstantPoolInfo>,
    methods: Vec<MethodInfo>,
}

impl ClassFileBuilder {
    fn new() -> Self {
        Self {
            constant_pool: vec![],
            methods: vec![],
        }
    }

    fn push(&mut self, entry: ConstantPoolInfo) -> u16 {
        self.constant_pool.push(entry);
        self.constant_pool.len() as u16
    }

    fn utf8(&mut self, string: &str) -> u16 {
        self.push(ConstantPoolInfo::utf8(string))
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.push(ConstantPoolInfo::Class { name_index })
    }

    fn attribute(&mut self, name: &str, info: Vec<u8>) -> AttributeInfo {
        AttributeInfo {
            attribute_name_index: self.utf8(name),
            info,
        }
    }

    fn method(
        &mut self,
        access_flags: MethodAccessFlag,
        name: &str,
        descriptor: &str,
        attributes: Vec<AttributeInfo>,
    ) {
        let method = MethodInfo {
            access_flags,
            name_index: self.utf8(name),
            descriptor_index: self.utf8(descriptor),
            attributes,
        };
        self.methods.push(method);
    }

    fn build(mut self, name: &str) -> ClassFile {
        let this_class = self.class(name);
        ClassFile {
            minor_version: 0,
            major_version: 65,
            constant_pool: self.constant_pool,
            access_flags: ClassAccessFlag::PUBLIC | ClassAccessFlag::SUPER,
            this_class,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: self.methods,
            attributes: vec![],
        }
    }
}

fn u16s(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_be_bytes()).collect()
}

fn load_exception(name: &str, super_class: Option<Arc<Class>>) -> Arc<Class> {
    Class::load(&ClassFileBuilder::new().build(name), super_class, vec![]).unwrap()
}

/// ```java
/// int run() {
///     try { ... } catch (TypeA e) { ... } finally { ... }
/// }
/// ```
fn load_service() -> Arc<Class> {
    let mut builder = ClassFileBuilder::new();
    let type_a = builder.class("demo/TypeA");

    let line_number_table = builder.attribute("LineNumberTable", u16s(&[2, 0, 10, 5, 11]));
    let mut code = u16s(&[4, 2]);
    code.extend_from_slice(&40u32.to_be_bytes());
    code.extend_from_slice(&[0; 40]);
    code.extend_from_slice(&u16s(&[2, 0, 10, 20, type_a, 0, 10, 30, 0]));
    code.extend_from_slice(&u16s(&[1, line_number_table.attribute_name_index]));
    code.extend_from_slice(&(line_number_table.info.len() as u32).to_be_bytes());
    code.extend_from_slice(&line_number_table.info);
    let code = builder.attribute("Code", code);
    builder.method(MethodAccessFlag::PUBLIC, "run", "()I", vec![code]);

    builder.method(
        MethodAccessFlag::PUBLIC | MethodAccessFlag::NATIVE,
        "checksum",
        "(J[B)I",
        vec![],
    );
    builder.method(
        MethodAccessFlag::PRIVATE | MethodAccessFlag::STATIC | MethodAccessFlag::NATIVE,
        "registerNatives",
        "()V",
        vec![],
    );
    Class::load(&builder.build("demo/Service"), None, vec![]).unwrap()
}

#[test]
fn exception_dispatch_uses_declaration_order() {
    let service = load_service();
    let run = service.get_method("run", "()I").unwrap();

    let throwable = load_exception("java/lang/Throwable", None);
    let type_a = load_exception("demo/TypeA", Some(Arc::clone(&throwable)));
    let sub_a = load_exception("demo/SubA", Some(Arc::clone(&type_a)));
    let type_b = load_exception("demo/TypeB", Some(throwable));

    let table = run.exception_table();
    assert_eq!(table.lookup(5, &*type_a), Some(20));
    assert_eq!(table.lookup(5, &*sub_a), Some(20));
    assert_eq!(table.lookup(5, &*type_b), Some(30));
    assert_eq!(table.lookup(15, &*type_a), None);
}

#[test]
fn frame_setup_queries() {
    let service = load_service();
    let run = service.get_method("run", "()I").unwrap();

    assert_eq!(run.max_stack(), 4);
    assert_eq!(run.max_locals(), 2);
    assert_eq!(run.actual_arg_count(), 1);
    assert_eq!(run.code().map(|code| code.len()), Some(40));
    assert_eq!(run.to_string(), "demo/Service.run()I");

    let checksum = service.get_method("checksum", "(J[B)I").unwrap();
    assert_eq!(checksum.arg_count(), 3);
    assert_eq!(checksum.actual_arg_count(), 4);
    assert!(checksum.code().is_none());
}

#[test]
fn line_numbers() {
    let service = load_service();
    let run = service.get_method("run", "()I").unwrap();
    assert_eq!(run.get_line_number(4), LineNumber::Found(10));
    assert_eq!(run.get_line_number(5), LineNumber::Found(11));
    assert_eq!(run.get_line_number(40), LineNumber::OutOfRange);

    let checksum = service.get_method("checksum", "(J[B)I").unwrap();
    assert_eq!(checksum.get_line_number(0), LineNumber::NativeMethod);
}

fn checksum(env: NativeEnv) -> NativeResult<Option<NativeVariable>> {
    let seed = env.arg(1)?.get_long()?;
    Ok(Some(NativeVariable::Int(seed as i32)))
}

#[test]
fn native_binding_lifecycle() {
    let registry = NativeRegistry::new();
    let service = load_service();
    let method = service.get_method("checksum", "(J[B)I").unwrap();

    let err = method.resolve_native_binding(&registry).unwrap_err();
    assert_eq!(
        err.to_string(),
        "no native binding registered for demo/Service.checksum(J[B)I"
    );
    assert!(matches!(err, Error::MissingNativeBinding { .. }));

    registry.register("demo/Service", "checksum", "(J[B)I", checksum);
    let binding = method.resolve_native_binding(&registry).unwrap();
    let result = binding
        .invoke(NativeEnv {
            args: vec![
                NativeVariable::Reference(1),
                NativeVariable::Long(99),
                NativeVariable::Reference(2),
            ],
            class: Arc::clone(&service),
        })
        .unwrap();
    assert_eq!(result, Some(NativeVariable::Int(99)));
    assert!(binding.ptr_eq(&method.resolve_native_binding(&registry).unwrap()));

    let hook = service.get_method("registerNatives", "()V").unwrap();
    assert!(hook.is_register_natives());
    assert!(hook.resolve_native_binding(&registry).is_ok());
}

#[test]
fn supervised_code_replacement() {
    let service = load_service();
    let run = service.get_method("run", "()I").unwrap();
    let before = run.code().unwrap();

    assert!(instrument::replace_code(run, vec![0u8; 8]).is_err());
    assert!(Arc::ptr_eq(&run.code().unwrap(), &before));

    let previous = instrument::replace_code(run, vec![0u8; 48]).unwrap().unwrap();
    assert!(Arc::ptr_eq(&previous, &before));
    assert_eq!(run.code().map(|code| code.len()), Some(48));

    let checksum = service.get_method("checksum", "(J[B)I").unwrap();
    assert!(instrument::replace_code(checksum, vec![0xb1]).is_err());
    assert!(checksum.code().is_none());
}

#[test]
fn unloading_the_class_detaches_methods() {
    let service = load_service();
    let weak = Arc::downgrade(&service);
    assert!(service.methods()[0].class().is_some());
    drop(service);
    assert!(weak.upgrade().is_none());
}
