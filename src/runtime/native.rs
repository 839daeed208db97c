mod double;
mod float;

use std::sync::LazyLock;

use dashmap::DashMap;

use crate::{
    error::Result,
    runtime::{
        Method, NativeBinding, NativeEnv, NativeKey, NativeLookup, NativeMethod, NativeResult,
        NativeVariable,
    },
};

pub type NativeFunction = fn(NativeEnv) -> NativeResult<Option<NativeVariable>>;

impl<F> NativeMethod for F
where
    F: Fn(NativeEnv) -> NativeResult<Option<NativeVariable>> + Send + Sync,
{
    fn invoke(&self, env: NativeEnv) -> NativeResult<Option<NativeVariable>> {
        self(env)
    }
}

/// Native implementations keyed by class name, method name and descriptor.
#[derive(Debug, Default)]
pub struct NativeRegistry {
    functions: DashMap<NativeKey, NativeBinding>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the binding previously registered under the same key.
    pub fn register(
        &self,
        class_name: &str,
        name: &str,
        descriptor: &str,
        native: impl NativeMethod + 'static,
    ) -> Option<NativeBinding> {
        self.functions.insert(
            NativeKey::new(class_name, name, descriptor),
            NativeBinding::new(native),
        )
    }

    pub fn unregister(&self, key: &NativeKey) -> Option<NativeBinding> {
        self.functions.remove(key).map(|(_, binding)| binding)
    }

    pub fn get(&self, key: &NativeKey) -> Option<NativeBinding> {
        self.functions.get(key).map(|binding| binding.value().clone())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl NativeLookup for NativeRegistry {
    fn find_native(&self, method: &Method) -> Option<NativeBinding> {
        if method.is_register_natives() || method.is_init_ids() {
            return Some(NOP.clone());
        }
        self.get(&method.native_key())
    }
}

pub static NATIVE_METHODS: LazyLock<NativeRegistry> = LazyLock::new(NativeRegistry::new);

static NOP: LazyLock<NativeBinding> = LazyLock::new(|| NativeBinding::new(native_nop));

/// Installs the built-in natives into the process-wide registry.
pub fn register_natives() {
    float::register_natives(&NATIVE_METHODS);
    double::register_natives(&NATIVE_METHODS);
}

fn native_nop(_: NativeEnv) -> NativeResult<Option<NativeVariable>> {
    Ok(None)
}

impl Method {
    /// Resolves this method against [`NATIVE_METHODS`].
    pub fn native_method(&self) -> Result<NativeBinding> {
        self.resolve_native_binding(&*NATIVE_METHODS)
    }
}
