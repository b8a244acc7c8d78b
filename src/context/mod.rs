//! Contexts
//!
//! A context owns the memory objects, programs and command queues created for
//! its devices.

use crate::device::Device;
use crate::info::sealed::OclInfoInternal;
use crate::raw::{cl_context, cl_context_info, cl_device_id, cl_int, functions::cl};
use crate::Result;
use std::fmt::{self, Debug, Formatter};
use std::mem::ManuallyDrop;
use std::os::raw::c_void;

/// An OpenCL context
#[derive(PartialEq, Eq, Hash)]
pub struct Context(pub(crate) cl_context);

unsafe impl Send for Context {}

impl Drop for Context {
    fn drop(&mut self) {
        if let Err(e) = release_context(self.0) {
            log::warn!("Error releasing OpenCL context {:?}: {:?}", self.0, e);
        }
    }
}

fn release_context(id: cl_context) -> Result<()> {
    let cl = cl()?;
    unsafe { wrap_result!("clReleaseContext" => cl.CL10.clReleaseContext(id)) }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.0)
            .field("devices", &self.devices().ok())
            .finish()
    }
}

impl OclInfoInternal for Context {
    type Param = cl_context_info;
    const DEBUG_CONTEXT: &'static str = "clGetContextInfo";

    unsafe fn raw_info_internal(
        &self,
        param_name: Self::Param,
        param_value_size: usize,
        param_value: *mut c_void,
        param_value_size_ret: *mut usize,
    ) -> Result<cl_int> {
        Ok(cl()?.CL10.clGetContextInfo(
            self.0,
            param_name,
            param_value_size,
            param_value,
            param_value_size_ret,
        ))
    }
}

impl Context {
    /// Get the raw handle for this context
    pub fn raw(&self) -> cl_context {
        self.0
    }

    info_funcs! {
        pub fn device_ids(&self) -> Vec<cl_device_id> = CL_CONTEXT_DEVICES;
    }

    pub fn devices(&self) -> Result<Vec<Device>> {
        Ok(self.device_ids()?.into_iter().map(Device).collect())
    }

    /// Release this context, reporting any error instead of logging it
    pub fn release(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        release_context(this.0)
    }
}
