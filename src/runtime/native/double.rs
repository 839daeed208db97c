use crate::runtime::{
    NativeEnv, NativeResult, NativeVariable,
    native::{NativeFunction, NativeRegistry},
};

const NATIVES: [(&str, &str, NativeFunction); 2] = [
    ("doubleToRawLongBits", "(D)J", double_to_raw_long_bits),
    ("longBitsToDouble", "(J)D", long_bits_to_double),
];

pub(super) fn register_natives(registry: &NativeRegistry) {
    for (name, descriptor, function) in NATIVES {
        registry.register("java/lang/Double", name, descriptor, function);
    }
}

// public static native long doubleToRawLongBits(double value);
fn double_to_raw_long_bits(env: NativeEnv) -> NativeResult<Option<NativeVariable>> {
    let value = env.arg(0)?.get_double()?;
    let bits = value.to_bits() as i64;
    Ok(Some(NativeVariable::Long(bits)))
}

// public static native double longBitsToDouble(long bits);
fn long_bits_to_double(env: NativeEnv) -> NativeResult<Option<NativeVariable>> {
    let bits = env.arg(0)?.get_long()?;
    let value = f64::from_bits(bits as u64);
    Ok(Some(NativeVariable::Double(value)))
}
