use crate::buffer::{Buffer, MemSafe};
use crate::raw::cl_mem;
use crate::{Error, Result};
use libc::size_t;
use std::fmt::{self, Display, Formatter};
use std::mem::{size_of, size_of_val};

/// A trait implemented by types that can be used as an individual kernel
/// argument
pub trait KernelArg {
    /// The type of value which is passed to the `clSetKernelArg` call
    type ArgType;

    /// Check whether a given OpenCL C type (e.g. `float` or `ulong`) is
    /// compatible with this kernel argument type.
    fn is_param_type_compatible(c_type: &str) -> bool;

    /// Get the data of this kernel argument, as a size and value to be passed
    /// to `clSetKernelArg`
    fn as_raw_kernel_arg(&self) -> (size_t, &Self::ArgType);
}

// values can be used as individual kernel args
impl<T: MemSafe> KernelArg for T {
    type ArgType = T;

    fn is_param_type_compatible(c_type: &str) -> bool {
        T::is_param_type_compatible(c_type)
    }

    fn as_raw_kernel_arg(&self) -> (size_t, &T) {
        (size_of_val(self), self)
    }
}

// buffers can be used as individual kernel args
impl<T: MemSafe> KernelArg for Buffer<T> {
    type ArgType = cl_mem;

    fn is_param_type_compatible(c_type: &str) -> bool {
        pointee_type(c_type)
            .map(T::is_param_type_compatible)
            .unwrap_or(false)
    }

    fn as_raw_kernel_arg(&self) -> (size_t, &cl_mem) {
        (size_of::<cl_mem>(), &self.handle)
    }
}

/// Get the pointee of an OpenCL C pointer type name, e.g. `float` for
/// `float*`
pub(crate) fn pointee_type(c_type: &str) -> Option<&str> {
    c_type.rsplitn(2, '*').nth(1).map(str::trim)
}

/// The index space a kernel is executed over: a global work size and an
/// optional local (work-group) size, each with 1 to 3 dimensions.
///
/// When no local size is given, the OpenCL implementation picks one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdRange {
    global: Vec<size_t>,
    local: Option<Vec<size_t>>,
}

impl NdRange {
    pub fn new(global: impl Into<Vec<size_t>>) -> Self {
        Self {
            global: global.into(),
            local: None,
        }
    }

    /// Set the local work size
    pub fn local(self, local: impl Into<Vec<size_t>>) -> Self {
        Self {
            local: Some(local.into()),
            ..self
        }
    }

    pub fn global_size(&self) -> &[size_t] {
        &self.global
    }

    pub fn local_size(&self) -> Option<&[size_t]> {
        self.local.as_deref()
    }

    pub fn dimensions(&self) -> usize {
        self.global.len()
    }

    /// Check that the range has 1 to 3 dimensions and that a local size, if
    /// any, has the same dimensionality.
    pub fn validate(&self) -> Result<()> {
        let dims = self.dimensions();
        if !(1..=3).contains(&dims) {
            return Err(Error::InvalidWorkDimension(dims));
        }

        match &self.local {
            Some(local) if local.len() != dims => Err(Error::WorkSizeMismatch {
                global: dims,
                local: local.len(),
            }),
            _ => Ok(()),
        }
    }
}

impl From<size_t> for NdRange {
    fn from(global: size_t) -> Self {
        NdRange::new(vec![global])
    }
}

fn fmt_sizes(f: &mut Formatter, sizes: &[size_t]) -> fmt::Result {
    f.write_str("[ ")?;
    for s in sizes {
        write!(f, "{} ", s)?;
    }
    f.write_str("]")
}

impl Display for NdRange {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("global ")?;
        fmt_sizes(f, &self.global)?;
        f.write_str(" and local ")?;
        match &self.local {
            Some(local) => fmt_sizes(f, local),
            None => f.write_str("[ auto ]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{cl_float, cl_int};

    #[test]
    fn test_pointee_type() {
        assert_eq!(pointee_type("float*"), Some("float"));
        assert_eq!(pointee_type("uint *"), Some("uint"));
        assert_eq!(pointee_type("int"), None);
    }

    #[test]
    fn test_buffer_arg_compatibility() {
        assert!(<Buffer<cl_float> as KernelArg>::is_param_type_compatible("float*"));
        assert!(!<Buffer<cl_float> as KernelArg>::is_param_type_compatible("float"));
        assert!(!<Buffer<cl_float> as KernelArg>::is_param_type_compatible("int*"));
        assert!(<cl_int as KernelArg>::is_param_type_compatible("int"));
        assert!(!<cl_int as KernelArg>::is_param_type_compatible("int*"));
    }

    #[test]
    fn test_scalar_raw_arg() {
        let v: cl_float = 2.5;
        let (size, value) = v.as_raw_kernel_arg();
        assert_eq!(size, 4);
        assert_eq!(*value, 2.5);
    }

    #[test]
    fn test_ndrange_validate() {
        assert!(NdRange::new(vec![1024]).validate().is_ok());
        assert!(NdRange::new(vec![64, 64]).local(vec![8, 8]).validate().is_ok());
        assert!(NdRange::from(10).validate().is_ok());

        match NdRange::new(vec![]).validate() {
            Err(Error::InvalidWorkDimension(0)) => {}
            other => panic!("unexpected result {:?}", other),
        }
        match NdRange::new(vec![1, 1, 1, 1]).validate() {
            Err(Error::InvalidWorkDimension(4)) => {}
            other => panic!("unexpected result {:?}", other),
        }
        match NdRange::new(vec![16, 16]).local(vec![4]).validate() {
            Err(Error::WorkSizeMismatch { global: 2, local: 1 }) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_ndrange_display() {
        assert_eq!(
            NdRange::new(vec![1024]).local(vec![32]).to_string(),
            "global [ 1024 ] and local [ 32 ]"
        );
        assert_eq!(
            NdRange::new(vec![8, 4]).to_string(),
            "global [ 8 4 ] and local [ auto ]"
        );
    }
}
