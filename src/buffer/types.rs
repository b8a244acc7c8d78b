use crate::raw::*;

/// A trait indicating that a type may be safely stored in an OpenCL buffer.
///
/// This trait may only be implemented for sized, `'static`, `Copy` types that
/// are valid for every possible bit pattern, since the device may write
/// arbitrary data into a buffer.
pub unsafe trait MemSafe: 'static + Sized + Copy + Unpin {
    /// Check whether a given OpenCL C type (e.g. `float` or `ulong`) is
    /// compatible with this Rust type. This is used as a sanity check when
    /// binding kernel arguments, not as a guarantee of correctness.
    fn is_param_type_compatible(c_type: &str) -> bool;
}

macro_rules! mem_safe {
    ( $( $ty:ty => $( $c_type:literal )|+ ),* $(,)? ) => {
        $(
            unsafe impl MemSafe for $ty {
                fn is_param_type_compatible(c_type: &str) -> bool {
                    matches!(c_type.trim(), $( $c_type )|+)
                }
            }
        )*
    };
}

mem_safe! {
    cl_char => "char",
    cl_uchar => "uchar" | "unsigned char",
    cl_int => "int",
    cl_uint => "uint" | "unsigned int",
    cl_long => "long",
    cl_ulong => "ulong" | "unsigned long",
    cl_float => "float",
    cl_double => "double",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_compatibility() {
        assert!(cl_float::is_param_type_compatible("float"));
        assert!(!cl_float::is_param_type_compatible("double"));
        assert!(cl_uint::is_param_type_compatible("unsigned int"));
        assert!(cl_int::is_param_type_compatible(" int "));
        assert!(!cl_int::is_param_type_compatible("uint"));
        assert!(cl_uchar::is_param_type_compatible("uchar"));
    }
}
