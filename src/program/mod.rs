//! Programs
//!
//! In OpenCL, a `Program` exports kernels that can be executed to perform work
//! on specialized hardware.

mod types;

use crate::device::Device;
use crate::info::sealed::OclInfoInternal;
use crate::raw::{cl_device_id, cl_int, cl_program, cl_program_build_info, functions::cl};
use crate::Result;
use libc::size_t;
use std::ffi::c_void;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
pub use types::*;

/// An OpenCL program
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Program(pub(crate) cl_program);

unsafe impl Send for Program {}
unsafe impl Sync for Program {}

impl Drop for Program {
    fn drop(&mut self) {
        if let Err(e) = release_program(self.0) {
            log::warn!("Error releasing OpenCL program: {:?}: {:?}", self, e);
        }
    }
}

fn release_program(id: cl_program) -> Result<()> {
    let cl = cl()?;
    unsafe { wrap_result!("clReleaseProgram" => cl.CL10.clReleaseProgram(id)) }
}

impl Program {
    /// Get the raw handle for this program. Note that this handle is only a raw
    /// pointer and does not use RAII to ensure validity, so you must manually
    /// make sure that it's not released while still in use.
    pub fn raw(&self) -> cl_program {
        self.0
    }

    /// Get program build info for a given device
    pub fn build_info(&self, device: Device) -> ProgramBuildInfo {
        ProgramBuildInfo {
            device: device.raw(),
            program: self.0,
            program_ref: PhantomData,
        }
    }

    /// Get the build log for a given device
    pub fn build_log(&self, device: Device) -> Result<String> {
        self.build_info(device).log()
    }

    /// Release this program, reporting any error instead of logging it
    pub fn release(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        release_program(this.0)
    }
}

pub struct ProgramBuildInfo<'a> {
    device: cl_device_id,
    program: cl_program,
    program_ref: PhantomData<&'a Program>,
}

impl OclInfoInternal for ProgramBuildInfo<'_> {
    type Param = cl_program_build_info;
    const DEBUG_CONTEXT: &'static str = "clGetProgramBuildInfo";

    unsafe fn raw_info_internal(
        &self,
        param_name: Self::Param,
        param_value_size: size_t,
        param_value: *mut c_void,
        param_value_size_ret: *mut size_t,
    ) -> Result<cl_int> {
        Ok(cl()?.CL10.clGetProgramBuildInfo(
            self.program,
            self.device,
            param_name,
            param_value_size,
            param_value,
            param_value_size_ret,
        ))
    }
}

impl ProgramBuildInfo<'_> {
    info_funcs! {
        pub fn log(&self) -> String = CL_PROGRAM_BUILD_LOG;
    }
}

impl Debug for ProgramBuildInfo<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("ProgramBuildInfo")
            .field("program", &self.program)
            .field("device", &self.device)
            .finish()
    }
}
