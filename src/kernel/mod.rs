mod types;

use crate::info::sealed::OclInfoInternal;
use crate::info::OclInfo;
use crate::program::Program;
use crate::raw::{
    cl_int, cl_kernel, cl_kernel_arg_info, cl_kernel_info, cl_uint, functions::cl,
    CL_KERNEL_ARG_TYPE_NAME, CL_SUCCESS,
};
use crate::{Error, Result};
use libc::size_t;
use std::ffi::{c_void, CString};
use std::fmt::{self, Debug, Formatter};
use std::mem::ManuallyDrop;
pub(crate) use types::pointee_type;
pub use types::*;

/// An OpenCL kernel
#[derive(PartialEq, Eq, Hash)]
pub struct Kernel(pub(crate) cl_kernel);

unsafe impl Send for Kernel {}

impl Drop for Kernel {
    fn drop(&mut self) {
        if let Err(e) = release_kernel(self.0) {
            log::warn!("Error releasing OpenCL kernel: {:?}: {:?}", self.0, e);
        }
    }
}

fn release_kernel(id: cl_kernel) -> Result<()> {
    let cl = cl()?;
    unsafe { wrap_result!("clReleaseKernel" => cl.CL10.clReleaseKernel(id)) }
}

impl Debug for Kernel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("handle", &self.0)
            .field("function_name", &self.function_name().ok())
            .field("num_args", &self.num_args().ok())
            .finish()
    }
}

impl OclInfoInternal for Kernel {
    type Param = cl_kernel_info;
    const DEBUG_CONTEXT: &'static str = "clGetKernelInfo";

    unsafe fn raw_info_internal(
        &self,
        param_name: Self::Param,
        param_value_size: size_t,
        param_value: *mut c_void,
        param_value_size_ret: *mut size_t,
    ) -> Result<cl_int> {
        Ok(cl()?.CL10.clGetKernelInfo(
            self.0,
            param_name,
            param_value_size,
            param_value,
            param_value_size_ret,
        ))
    }
}

impl Kernel {
    pub fn raw(&self) -> cl_kernel {
        self.0
    }

    info_funcs! {
        pub fn function_name(&self) -> String = CL_KERNEL_FUNCTION_NAME;
        pub fn num_args(&self) -> cl_uint = CL_KERNEL_NUM_ARGS;
    }

    /// Set the argument at `index` to the given value
    pub fn set_arg<A: KernelArg>(&self, index: cl_uint, value: &A) -> Result<()> {
        let cl = cl()?;
        let (size, ptr) = value.as_raw_kernel_arg();

        unsafe {
            wrap_result!("clSetKernelArg" => cl.CL10.clSetKernelArg(
                self.0,
                index,
                size,
                ptr as *const _ as _
            ))
        }
    }

    /// Get the OpenCL C type name of the argument at `index`.
    ///
    /// Returns `Ok(None)` if the OpenCL library doesn't provide
    /// `clGetKernelArgInfo`.
    pub fn arg_type_name(&self, index: cl_uint) -> Result<Option<String>> {
        match cl()?.CL12 {
            Some(_) => KernelArgInfo { kernel: self, index }
                .get_info::<String>(CL_KERNEL_ARG_TYPE_NAME)
                .map(Some),
            None => Ok(None),
        }
    }

    /// Check that the argument at `index` is declared with an OpenCL C type
    /// accepted by `compatible`.
    ///
    /// Drivers only report argument types when they keep the information
    /// around, so failing to query the type is logged and treated as a pass.
    pub fn check_arg_type(
        &self,
        index: cl_uint,
        rust_type: &str,
        compatible: impl Fn(&str) -> bool,
    ) -> Result<()> {
        match self.arg_type_name(index) {
            Ok(Some(c_type)) if compatible(&c_type) => Ok(()),
            Ok(Some(c_type)) => Err(Error::ArgTypeMismatch {
                kernel: self.function_name().unwrap_or_default(),
                index: index as usize,
                c_type,
                rust_type: rust_type.to_owned(),
            }),
            Ok(None) => Ok(()),
            Err(e) => {
                log::debug!(
                    "Could not check type of argument #{} of kernel {:?}: {}",
                    index,
                    self,
                    e
                );
                Ok(())
            }
        }
    }

    /// Release this kernel, reporting any error instead of logging it
    pub fn release(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        release_kernel(this.0)
    }
}

struct KernelArgInfo<'a> {
    kernel: &'a Kernel,
    index: cl_uint,
}

impl OclInfoInternal for KernelArgInfo<'_> {
    type Param = cl_kernel_arg_info;
    const DEBUG_CONTEXT: &'static str = "clGetKernelArgInfo";

    unsafe fn raw_info_internal(
        &self,
        param_name: Self::Param,
        param_value_size: size_t,
        param_value: *mut c_void,
        param_value_size_ret: *mut size_t,
    ) -> Result<cl_int> {
        match &cl()?.CL12 {
            Some(cl12) => Ok(cl12.clGetKernelArgInfo(
                self.kernel.0,
                self.index,
                param_name,
                param_value_size,
                param_value,
                param_value_size_ret,
            )),
            None => Err(crate::ApiError::new(
                crate::raw::CL_INVALID_OPERATION,
                Self::DEBUG_CONTEXT,
            )
            .into()),
        }
    }
}

impl Program {
    /// Create a kernel with a given name.
    pub fn create_kernel(&self, name: &str) -> Result<Kernel> {
        let cl = cl()?;
        let c_name = CString::new(name).map_err(|_| Error::InvalidName(name.to_owned()))?;

        unsafe {
            let mut err = CL_SUCCESS;
            let kernel = cl
                .CL10
                .clCreateKernel(self.raw(), c_name.as_ptr(), &mut err as _);
            wrap_result!("clCreateKernel" => err)?;
            Ok(Kernel(kernel))
        }
    }
}
