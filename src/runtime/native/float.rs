use crate::runtime::{
    NativeEnv, NativeResult, NativeVariable,
    native::{NativeFunction, NativeRegistry},
};

const NATIVES: [(&str, &str, NativeFunction); 2] = [
    ("floatToRawIntBits", "(F)I", float_to_raw_int_bits),
    ("intBitsToFloat", "(I)F", int_bits_to_float),
];

pub(super) fn register_natives(registry: &NativeRegistry) {
    for (name, descriptor, function) in NATIVES {
        registry.register("java/lang/Float", name, descriptor, function);
    }
}

// public static native int floatToRawIntBits(float value);
fn float_to_raw_int_bits(env: NativeEnv) -> NativeResult<Option<NativeVariable>> {
    let value = env.arg(0)?.get_float()?;
    let bits = value.to_bits() as i32;
    Ok(Some(NativeVariable::Int(bits)))
}

// public static native float intBitsToFloat(int bits);
fn int_bits_to_float(env: NativeEnv) -> NativeResult<Option<NativeVariable>> {
    let bits = env.arg(0)?.get_int()?;
    let value = f32::from_bits(bits as u32);
    Ok(Some(NativeVariable::Float(value)))
}
