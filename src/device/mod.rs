mod types;

use crate::context::Context;
use crate::info::sealed::OclInfoInternal;
use crate::platform::Platform;
use crate::raw::{
    cl_context_properties, cl_device_id, cl_device_info, cl_int, cl_platform_id, cl_uint,
    cl_ulong, functions::cl, CL_CONTEXT_PLATFORM, CL_SUCCESS,
};
use crate::{Error, Result};
use libc::size_t;
use std::fmt::{self, Debug, Formatter};
use std::os::raw::c_void;
use std::ptr::null_mut;
pub use types::*;

/// An OpenCL device
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Device(pub(crate) cl_device_id);

unsafe impl Send for Device {}
unsafe impl Sync for Device {}

impl Debug for Device {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.0)
            .field("name", &self.name().ok())
            .field("device_type", &self.device_type().ok())
            .finish()
    }
}

impl OclInfoInternal for Device {
    type Param = cl_device_info;
    const DEBUG_CONTEXT: &'static str = "clGetDeviceInfo";

    unsafe fn raw_info_internal(
        &self,
        param_name: Self::Param,
        param_value_size: usize,
        param_value: *mut c_void,
        param_value_size_ret: *mut usize,
    ) -> Result<cl_int> {
        Ok(cl()?.CL10.clGetDeviceInfo(
            self.0,
            param_name,
            param_value_size,
            param_value,
            param_value_size_ret,
        ))
    }
}

impl Device {
    /// Create a new context containing only this device, with its platform
    /// set as the context platform.
    pub fn create_context(&self) -> Result<Context> {
        let cl = cl()?;

        unsafe {
            let props: [cl_context_properties; 3] =
                [CL_CONTEXT_PLATFORM, self.platform_id()? as _, 0];
            let mut err = CL_SUCCESS;
            let id = cl.CL10.clCreateContext(
                props.as_ptr(),
                1,
                &self.0 as *const _,
                None,
                null_mut(),
                &mut err as _,
            );
            wrap_result!("clCreateContext" => err)?;
            Ok(Context(id))
        }
    }

    /// Get the raw handle for this device
    pub fn raw(self) -> cl_device_id {
        self.0
    }

    info_funcs! {
        pub fn device_type(&self) -> DeviceType = CL_DEVICE_TYPE;
        pub fn max_compute_units(&self) -> cl_uint = CL_DEVICE_MAX_COMPUTE_UNITS;
        pub fn max_work_item_dimensions(&self) -> cl_uint = CL_DEVICE_MAX_WORK_ITEM_DIMENSIONS;
        pub fn max_work_item_sizes(&self) -> Vec<size_t> = CL_DEVICE_MAX_WORK_ITEM_SIZES;
        pub fn max_work_group_size(&self) -> size_t = CL_DEVICE_MAX_WORK_GROUP_SIZE;
        pub fn max_clock_frequency(&self) -> cl_uint = CL_DEVICE_MAX_CLOCK_FREQUENCY;
        pub fn max_mem_alloc_size(&self) -> cl_ulong = CL_DEVICE_MAX_MEM_ALLOC_SIZE;
        pub fn global_mem_size(&self) -> cl_ulong = CL_DEVICE_GLOBAL_MEM_SIZE;
        pub fn local_mem_size(&self) -> cl_ulong = CL_DEVICE_LOCAL_MEM_SIZE;
        pub fn available(&self) -> bool = CL_DEVICE_AVAILABLE;
        pub fn name(&self) -> String = CL_DEVICE_NAME;
        pub fn vendor(&self) -> String = CL_DEVICE_VENDOR;
        pub fn driver_version(&self) -> String = CL_DRIVER_VERSION;
        pub fn version(&self) -> String = CL_DEVICE_VERSION;
        pub fn platform_id(&self) -> cl_platform_id = CL_DEVICE_PLATFORM;
    }

    pub fn platform(&self) -> Result<Platform> {
        self.platform_id().map(Platform)
    }

    /// Get the maximum number of work items per work group in dimension
    /// `dim`, which must be 0, 1 or 2.
    pub fn max_work_items(&self, dim: usize) -> Result<size_t> {
        if dim > 2 {
            return Err(Error::InvalidDimensionIndex(dim));
        }

        self.max_work_item_sizes()?
            .get(dim)
            .copied()
            .ok_or(Error::InvalidDimensionIndex(dim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_work_items_dimension_range() {
        // rejected before any OpenCL call, so a null device is fine
        let device = Device(null_mut());

        for dim in 3..6 {
            match device.max_work_items(dim) {
                Err(Error::InvalidDimensionIndex(d)) => assert_eq!(d, dim),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }
}
