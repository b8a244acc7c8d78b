use super::Session;
use crate::buffer::{Buffer, MemSafe};
use crate::kernel::{pointee_type, Kernel, KernelArg, NdRange};
use crate::raw::{cl_double, cl_float, cl_int, cl_uchar, cl_uint};
use crate::{Error, Result};
use std::fmt::{self, Debug, Formatter};
use tynm::type_name;

/// A kernel argument as passed to `Session::setup_kernel`.
///
/// Arrays are copied to a freshly allocated device buffer when the kernel is
/// set up, and copied back by every `Session::run_kernel`. Constants are
/// passed by value.
pub enum Arg<'a> {
    DoubleArr(&'a mut [cl_double]),
    FloatArr(&'a mut [cl_float]),
    IntArr(&'a mut [cl_int]),
    /// Stored on the device as one `uchar` (or `char`/`bool`) per element
    BoolArr(&'a mut [bool]),
    IntConst(cl_int),
    FloatConst(cl_float),
    DoubleConst(cl_double),
}

impl Arg<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::DoubleArr(_) => "DoubleArr",
            Arg::FloatArr(_) => "FloatArr",
            Arg::IntArr(_) => "IntArr",
            Arg::BoolArr(_) => "BoolArr",
            Arg::IntConst(_) => "IntConst",
            Arg::FloatConst(_) => "FloatConst",
            Arg::DoubleConst(_) => "DoubleConst",
        }
    }

    /// Number of array elements, or `None` for constants
    pub fn len(&self) -> Option<usize> {
        match self {
            Arg::DoubleArr(a) => Some(a.len()),
            Arg::FloatArr(a) => Some(a.len()),
            Arg::IntArr(a) => Some(a.len()),
            Arg::BoolArr(a) => Some(a.len()),
            _ => None,
        }
    }
}

impl Debug for Arg<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Arg::IntConst(v) => write!(f, "IntConst({})", v),
            Arg::FloatConst(v) => write!(f, "FloatConst({})", v),
            Arg::DoubleConst(v) => write!(f, "DoubleConst({})", v),
            arr => write!(f, "{}[{}]", arr.kind(), arr.len().unwrap_or_default()),
        }
    }
}

/// A host slice together with the device buffer mirroring it
struct HostArray<'a, H, D: MemSafe> {
    host: &'a mut [H],
    buffer: Buffer<D>,
}

enum BoundArg<'a> {
    Double(HostArray<'a, cl_double, cl_double>),
    Float(HostArray<'a, cl_float, cl_float>),
    Int(HostArray<'a, cl_int, cl_int>),
    Bool(HostArray<'a, bool, cl_uchar>),
    Scalar,
}

impl BoundArg<'_> {
    fn release(self) -> Result<()> {
        match self {
            BoundArg::Double(a) => a.buffer.release(),
            BoundArg::Float(a) => a.buffer.release(),
            BoundArg::Int(a) => a.buffer.release(),
            BoundArg::Bool(a) => a.buffer.release(),
            BoundArg::Scalar => Ok(()),
        }
    }
}

/// A kernel with all of its arguments bound, as returned by
/// `Session::setup_kernel`.
///
/// The host arrays stay mutably borrowed until the prepared kernel is dropped
/// or released; read results after that.
pub struct PreparedKernel<'a> {
    kernel: Kernel,
    args: Vec<BoundArg<'a>>,
}

impl Debug for PreparedKernel<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("PreparedKernel")
            .field("kernel", &self.kernel)
            .field("num_args", &self.args.len())
            .finish()
    }
}

impl PreparedKernel<'_> {
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn num_args(&self) -> usize {
        self.args.len()
    }

    /// Release the device buffers and the kernel, returning the first error
    /// encountered.
    pub fn release(self) -> Result<()> {
        let mut result = Ok(());
        for arg in self.args {
            result = result.and(arg.release());
        }
        result.and(self.kernel.release())
    }
}

fn is_bool_param(c_type: &str) -> bool {
    pointee_type(c_type).map_or(false, |t| {
        matches!(t, "bool" | "char" | "uchar" | "unsigned char")
    })
}

// signed and unsigned 32-bit ints share a layout, and kernels commonly take
// their element count as `unsigned int`
fn is_int_type(c_type: &str) -> bool {
    matches!(c_type.trim(), "int" | "uint" | "unsigned int")
}

fn is_int_param(c_type: &str) -> bool {
    pointee_type(c_type).map_or(false, is_int_type)
}

impl Session {
    /// Compile `source`, create the kernel `name` and bind `args` to it in
    /// order, copying every array argument to the device.
    ///
    /// The number of arguments must match the kernel definition.
    pub fn setup_kernel<'a>(
        &mut self,
        source: &str,
        name: &str,
        args: impl IntoIterator<Item = Arg<'a>>,
    ) -> Result<PreparedKernel<'a>> {
        let kernel = self.create_kernel(source, name)?;
        let args: Vec<Arg<'a>> = args.into_iter().collect();

        let expected = kernel.num_args()? as usize;
        if expected != args.len() {
            return Err(Error::ArgCountMismatch {
                kernel: name.to_owned(),
                expected,
                actual: args.len(),
            });
        }

        let mut bound = Vec::with_capacity(args.len());
        for (index, arg) in args.into_iter().enumerate() {
            log::debug!("Binding argument #{} of {}: {:?}", index, name, arg);
            bound.push(self.bind_arg(&kernel, index as cl_uint, arg)?);
        }

        Ok(PreparedKernel {
            kernel,
            args: bound,
        })
    }

    /// Launch a prepared kernel, then copy every array argument back to its
    /// host slice.
    pub fn run_kernel(
        &mut self,
        prepared: &mut PreparedKernel<'_>,
        range: &NdRange,
    ) -> Result<()> {
        self.launch_kernel(&prepared.kernel, range)?;

        for arg in &mut prepared.args {
            match arg {
                BoundArg::Double(a) => self.dev_to_host(&a.buffer, &mut *a.host)?,
                BoundArg::Float(a) => self.dev_to_host(&a.buffer, &mut *a.host)?,
                BoundArg::Int(a) => self.dev_to_host(&a.buffer, &mut *a.host)?,
                BoundArg::Bool(a) => self.dev_to_host_bool(&a.buffer, &mut *a.host)?,
                BoundArg::Scalar => {}
            }
        }

        Ok(())
    }

    fn bind_arg<'a>(
        &mut self,
        kernel: &Kernel,
        index: cl_uint,
        arg: Arg<'a>,
    ) -> Result<BoundArg<'a>> {
        Ok(match arg {
            Arg::DoubleArr(host) => {
                let compatible = <Buffer<cl_double> as KernelArg>::is_param_type_compatible;
                BoundArg::Double(self.bind_array(kernel, index, host, compatible)?)
            }
            Arg::FloatArr(host) => {
                let compatible = <Buffer<cl_float> as KernelArg>::is_param_type_compatible;
                BoundArg::Float(self.bind_array(kernel, index, host, compatible)?)
            }
            Arg::IntArr(host) => {
                BoundArg::Int(self.bind_array(kernel, index, host, is_int_param)?)
            }
            Arg::BoolArr(host) => {
                kernel.check_arg_type(index, "[bool]", is_bool_param)?;
                let buffer = self.alloc_dev::<cl_uchar>(host.len())?;
                self.host_to_dev_bool(host, &buffer)?;
                kernel.set_arg(index, &buffer)?;
                BoundArg::Bool(HostArray { host, buffer })
            }
            Arg::IntConst(v) => bind_scalar(kernel, index, v, is_int_type)?,
            Arg::FloatConst(v) => {
                let compatible = <cl_float as MemSafe>::is_param_type_compatible;
                bind_scalar(kernel, index, v, compatible)?
            }
            Arg::DoubleConst(v) => {
                let compatible = <cl_double as MemSafe>::is_param_type_compatible;
                bind_scalar(kernel, index, v, compatible)?
            }
        })
    }

    fn bind_array<'a, T: MemSafe>(
        &mut self,
        kernel: &Kernel,
        index: cl_uint,
        host: &'a mut [T],
        compatible: fn(&str) -> bool,
    ) -> Result<HostArray<'a, T, T>> {
        kernel.check_arg_type(index, &format!("[{}]", type_name::<T>()), compatible)?;

        let buffer = self.alloc_dev::<T>(host.len())?;
        self.host_to_dev(host, &buffer)?;
        kernel.set_arg(index, &buffer)?;
        Ok(HostArray { host, buffer })
    }
}

fn bind_scalar<T: MemSafe>(
    kernel: &Kernel,
    index: cl_uint,
    value: T,
    compatible: fn(&str) -> bool,
) -> Result<BoundArg<'static>> {
    kernel.check_arg_type(index, &type_name::<T>(), compatible)?;
    kernel.set_arg(index, &value)?;
    Ok(BoundArg::Scalar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_kind_and_len() {
        let mut floats = [0.0f32; 8];
        let mut flags = [false; 3];

        let args = vec![
            Arg::FloatArr(&mut floats),
            Arg::BoolArr(&mut flags),
            Arg::IntConst(8),
            Arg::DoubleConst(0.5),
        ];

        let kinds: Vec<_> = args.iter().map(Arg::kind).collect();
        assert_eq!(kinds, ["FloatArr", "BoolArr", "IntConst", "DoubleConst"]);

        let lens: Vec<_> = args.iter().map(Arg::len).collect();
        assert_eq!(lens, [Some(8), Some(3), None, None]);
    }

    #[test]
    fn test_arg_debug() {
        let mut ints = [1, 2, 3];
        assert_eq!(format!("{:?}", Arg::IntArr(&mut ints)), "IntArr[3]");
        assert_eq!(format!("{:?}", Arg::FloatConst(1.5)), "FloatConst(1.5)");
    }

    #[test]
    fn test_bool_param_types() {
        assert!(is_bool_param("uchar*"));
        assert!(is_bool_param("bool*"));
        assert!(is_bool_param("char *"));
        assert!(!is_bool_param("uchar"));
        assert!(!is_bool_param("int*"));
    }

    #[test]
    fn test_int_accepts_unsigned() {
        for c_type in &["int", "uint", "unsigned int", " uint "] {
            assert!(is_int_type(c_type), "{}", c_type);
        }
        assert!(!is_int_type("long"));
        assert!(!is_int_type("int*"));

        assert!(is_int_param("int*"));
        assert!(is_int_param("uint*"));
        assert!(is_int_param("unsigned int *"));
        assert!(!is_int_param("uint"));
        assert!(!is_int_param("float*"));
    }
}
