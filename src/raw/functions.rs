//! Dynamically loaded OpenCL entry points

use super::*;
use dlopen::wrapper::Container;
use lazy_static::lazy_static;
use libc::size_t;
use std::ffi::OsString;
use std::os::raw::{c_char, c_void};

/// Environment variable naming an OpenCL library to try before the platform
/// defaults
pub const LIBRARY_ENV_VAR: &str = "SIMPLE_OCL_LIBRARY";

#[cfg(target_os = "windows")]
const DEFAULT_LIBRARY_NAMES: &[&str] = &["OpenCL.dll"];

#[cfg(target_os = "macos")]
const DEFAULT_LIBRARY_NAMES: &[&str] = &[
    "/System/Library/Frameworks/OpenCL.framework/OpenCL",
    "libOpenCL.dylib",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const DEFAULT_LIBRARY_NAMES: &[&str] = &["libOpenCL.so.1", "libOpenCL.so"];

pub type ContextNotifyFn = Option<
    extern "C" fn(errinfo: *const c_char, info: *const c_void, cb: size_t, data: *mut c_void),
>;

pub type ProgramNotifyFn = Option<extern "C" fn(program: cl_program, data: *mut c_void)>;

raw_functions! {
    CL10: CL10 {
        fn clGetPlatformIDs(
            num_entries: cl_uint,
            platforms: *mut cl_platform_id,
            num_platforms: *mut cl_uint,
        ) -> cl_int;
        fn clGetPlatformInfo(
            platform: cl_platform_id,
            param_name: cl_platform_info,
            param_value_size: size_t,
            param_value: *mut c_void,
            param_value_size_ret: *mut size_t,
        ) -> cl_int;
        fn clGetDeviceIDs(
            platform: cl_platform_id,
            device_type: cl_device_type,
            num_entries: cl_uint,
            devices: *mut cl_device_id,
            num_devices: *mut cl_uint,
        ) -> cl_int;
        fn clGetDeviceInfo(
            device: cl_device_id,
            param_name: cl_device_info,
            param_value_size: size_t,
            param_value: *mut c_void,
            param_value_size_ret: *mut size_t,
        ) -> cl_int;
        fn clCreateContext(
            properties: *const cl_context_properties,
            num_devices: cl_uint,
            devices: *const cl_device_id,
            pfn_notify: ContextNotifyFn,
            user_data: *mut c_void,
            errcode_ret: *mut cl_int,
        ) -> cl_context;
        fn clGetContextInfo(
            context: cl_context,
            param_name: cl_context_info,
            param_value_size: size_t,
            param_value: *mut c_void,
            param_value_size_ret: *mut size_t,
        ) -> cl_int;
        fn clReleaseContext(context: cl_context) -> cl_int;
        fn clCreateCommandQueue(
            context: cl_context,
            device: cl_device_id,
            properties: cl_command_queue_properties,
            errcode_ret: *mut cl_int,
        ) -> cl_command_queue;
        fn clReleaseCommandQueue(command_queue: cl_command_queue) -> cl_int;
        fn clFinish(command_queue: cl_command_queue) -> cl_int;
        fn clCreateBuffer(
            context: cl_context,
            flags: cl_mem_flags,
            size: size_t,
            host_ptr: *mut c_void,
            errcode_ret: *mut cl_int,
        ) -> cl_mem;
        fn clReleaseMemObject(memobj: cl_mem) -> cl_int;
        fn clEnqueueReadBuffer(
            command_queue: cl_command_queue,
            buffer: cl_mem,
            blocking_read: cl_bool,
            offset: size_t,
            size: size_t,
            ptr: *mut c_void,
            num_events_in_wait_list: cl_uint,
            event_wait_list: *const cl_event,
            event: *mut cl_event,
        ) -> cl_int;
        fn clEnqueueWriteBuffer(
            command_queue: cl_command_queue,
            buffer: cl_mem,
            blocking_write: cl_bool,
            offset: size_t,
            size: size_t,
            ptr: *const c_void,
            num_events_in_wait_list: cl_uint,
            event_wait_list: *const cl_event,
            event: *mut cl_event,
        ) -> cl_int;
        fn clCreateProgramWithSource(
            context: cl_context,
            count: cl_uint,
            strings: *const *const c_char,
            lengths: *const size_t,
            errcode_ret: *mut cl_int,
        ) -> cl_program;
        fn clBuildProgram(
            program: cl_program,
            num_devices: cl_uint,
            device_list: *const cl_device_id,
            options: *const c_char,
            pfn_notify: ProgramNotifyFn,
            user_data: *mut c_void,
        ) -> cl_int;
        fn clGetProgramBuildInfo(
            program: cl_program,
            device: cl_device_id,
            param_name: cl_program_build_info,
            param_value_size: size_t,
            param_value: *mut c_void,
            param_value_size_ret: *mut size_t,
        ) -> cl_int;
        fn clReleaseProgram(program: cl_program) -> cl_int;
        fn clCreateKernel(
            program: cl_program,
            kernel_name: *const c_char,
            errcode_ret: *mut cl_int,
        ) -> cl_kernel;
        fn clSetKernelArg(
            kernel: cl_kernel,
            arg_index: cl_uint,
            arg_size: size_t,
            arg_value: *const c_void,
        ) -> cl_int;
        fn clGetKernelInfo(
            kernel: cl_kernel,
            param_name: cl_kernel_info,
            param_value_size: size_t,
            param_value: *mut c_void,
            param_value_size_ret: *mut size_t,
        ) -> cl_int;
        fn clReleaseKernel(kernel: cl_kernel) -> cl_int;
        fn clEnqueueNDRangeKernel(
            command_queue: cl_command_queue,
            kernel: cl_kernel,
            work_dim: cl_uint,
            global_work_offset: *const size_t,
            global_work_size: *const size_t,
            local_work_size: *const size_t,
            num_events_in_wait_list: cl_uint,
            event_wait_list: *const cl_event,
            event: *mut cl_event,
        ) -> cl_int;
    }

    CL12: Option<CL12> {
        fn clGetKernelArgInfo(
            kernel: cl_kernel,
            arg_index: cl_uint,
            param_name: cl_kernel_arg_info,
            param_value_size: size_t,
            param_value: *mut c_void,
            param_value_size_ret: *mut size_t,
        ) -> cl_int;
    }
}

lazy_static! {
    static ref OPENCL: Result<Container<RawOpenCL>, dlopen::Error> = load_library();
}

fn library_candidates() -> Vec<OsString> {
    std::env::var_os(LIBRARY_ENV_VAR)
        .into_iter()
        .chain(DEFAULT_LIBRARY_NAMES.iter().map(|name| OsString::from(*name)))
        .collect()
}

fn load_library() -> Result<Container<RawOpenCL>, dlopen::Error> {
    let mut last_err = None;

    for name in library_candidates() {
        match unsafe { Container::<RawOpenCL>::load(&name) } {
            Ok(container) => {
                log::debug!("Loaded OpenCL library {:?}", name);
                if container.CL12.is_none() {
                    log::debug!("clGetKernelArgInfo unavailable, argument type checks disabled");
                }
                return Ok(container);
            }
            Err(e) => {
                log::trace!("Could not load OpenCL library {:?}: {}", name, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or(dlopen::Error::NullSymbol))
}

/// Attempt to load the system OpenCL library, if not already loaded.
///
/// The outcome of the first attempt is cached; later calls return the same
/// library or the same error.
pub fn load_opencl() -> Result<&'static RawOpenCL, &'static dlopen::Error> {
    OPENCL.as_ref().map(|container| &**container)
}

/// Get the loaded OpenCL function table, as a crate result
pub(crate) fn cl() -> crate::Result<&'static RawOpenCL> {
    load_opencl().map_err(crate::Error::LibraryUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_candidates_present() {
        let candidates = library_candidates();
        assert!(!candidates.is_empty());
        for name in DEFAULT_LIBRARY_NAMES {
            assert!(candidates.contains(&OsString::from(*name)));
        }
    }
}
