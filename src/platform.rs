//! Platforms
//!
//! An OpenCL platform is an OpenCL driver providing access to specialized
//! hardware. A system can have zero or more platforms, and each platform can
//! provide zero or more devices.

use crate::device::{Device, DeviceType};
use crate::info::sealed::OclInfoInternal;
use crate::raw::{
    cl_int, cl_platform_id, cl_platform_info, functions::cl, CL_DEVICE_NOT_FOUND,
    CL_PLATFORM_NOT_FOUND_KHR, CL_SUCCESS,
};
use crate::{ApiError, Result};
use std::ffi::c_void;
use std::fmt::{self, Debug, Formatter};
use std::ptr::null_mut;

/// An OpenCL platform
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform(pub(crate) cl_platform_id);

unsafe impl Send for Platform {}
unsafe impl Sync for Platform {}

impl Debug for Platform {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Platform")
            .field("id", &self.0)
            .field("name", &self.name().ok())
            .finish()
    }
}

impl OclInfoInternal for Platform {
    type Param = cl_platform_info;
    const DEBUG_CONTEXT: &'static str = "clGetPlatformInfo";

    unsafe fn raw_info_internal(
        &self,
        param_name: Self::Param,
        param_value_size: usize,
        param_value: *mut c_void,
        param_value_size_ret: *mut usize,
    ) -> Result<cl_int> {
        Ok(cl()?.CL10.clGetPlatformInfo(
            self.0,
            param_name,
            param_value_size,
            param_value,
            param_value_size_ret,
        ))
    }
}

impl Platform {
    /// Get a list of OpenCL platforms available on this system.
    ///
    /// An ICD loader with no installed drivers reports
    /// `CL_PLATFORM_NOT_FOUND_KHR`, which is returned as an empty list.
    pub fn get_platforms() -> Result<Vec<Platform>> {
        let cl = cl()?;

        unsafe {
            let mut num_platforms = 0u32;

            match cl.CL10.clGetPlatformIDs(0, null_mut(), &mut num_platforms as _) {
                CL_SUCCESS => {}
                CL_PLATFORM_NOT_FOUND_KHR => return Ok(vec![]),
                code => return Err(ApiError::new(code, "clGetPlatformIDs").into()),
            }

            if num_platforms == 0 {
                return Ok(vec![]);
            }

            let mut ids = vec![null_mut(); num_platforms as usize];

            wrap_result!("clGetPlatformIDs" => cl.CL10.clGetPlatformIDs(
                num_platforms,
                ids.as_mut_ptr(),
                &mut num_platforms as _,
            ))?;

            ids.truncate(num_platforms as usize);
            Ok(ids.into_iter().map(Platform).collect())
        }
    }

    /// Get a list of OpenCL devices of the given type from this platform.
    ///
    /// A platform without any matching device returns an empty list.
    pub fn get_devices(self, typ: DeviceType) -> Result<Vec<Device>> {
        let cl = cl()?;

        unsafe {
            let mut num_devices = 0u32;

            match cl.CL10.clGetDeviceIDs(self.0, typ.raw(), 0, null_mut(), &mut num_devices as _) {
                CL_SUCCESS => {}
                CL_DEVICE_NOT_FOUND => return Ok(vec![]),
                code => return Err(ApiError::new(code, "clGetDeviceIDs").into()),
            }

            if num_devices == 0 {
                return Ok(vec![]);
            }

            let mut ids = vec![null_mut(); num_devices as usize];

            wrap_result!("clGetDeviceIDs" => cl.CL10.clGetDeviceIDs(
                self.0,
                typ.raw(),
                num_devices,
                ids.as_mut_ptr(),
                &mut num_devices as _,
            ))?;

            ids.truncate(num_devices as usize);
            Ok(ids.into_iter().map(Device).collect())
        }
    }

    /// Get the raw handle for this platform
    pub fn raw(self) -> cl_platform_id {
        self.0
    }

    info_funcs! {
        pub fn profile(&self) -> String = CL_PLATFORM_PROFILE;
        pub fn version(&self) -> String = CL_PLATFORM_VERSION;
        pub fn name(&self) -> String = CL_PLATFORM_NAME;
        pub fn vendor(&self) -> String = CL_PLATFORM_VENDOR;
    }
}
