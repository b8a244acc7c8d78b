//! The convenience layer: pick a device, compile a kernel, copy its array
//! arguments over, run it, copy everything back.
//!
//! ```no_run
//! use simple_ocl::session::{Arg, Session};
//! use simple_ocl::kernel::NdRange;
//!
//! # fn main() -> simple_ocl::Result<()> {
//! const SOURCE: &str = r#"
//! __kernel void square(__global float *in, __global float *out, const int count) {
//!     int i = get_global_id(0);
//!     if (i < count) out[i] = in[i] * in[i];
//! }
//! "#;
//!
//! let mut data = vec![1.0f32, 2.0, 3.0, 4.0];
//! let mut results = vec![0.0f32; 4];
//!
//! let mut session = Session::init_gpu()?;
//! let mut kernel = session.setup_kernel(
//!     SOURCE,
//!     "square",
//!     vec![
//!         Arg::FloatArr(&mut data),
//!         Arg::FloatArr(&mut results),
//!         Arg::IntConst(4),
//!     ],
//! )?;
//! session.run_kernel(&mut kernel, &NdRange::new(vec![4]))?;
//! kernel.release()?;
//!
//! session.print_kernel_time();
//! session.free_device()?;
//! assert_eq!(results, [1.0, 4.0, 9.0, 16.0]);
//! # Ok(())
//! # }
//! ```

mod args;

use crate::buffer::{byte_size, Buffer, MemSafe};
use crate::context::Context;
use crate::device::{Device, DeviceType};
use crate::kernel::{Kernel, NdRange};
use crate::platform::Platform;
use crate::program::ProgramBuilder;
use crate::queue::Queue;
use crate::raw::{cl_uchar, cl_uint, cl_ulong};
use crate::timing::Timings;
use crate::util::mem_str;
use crate::{Error, Result};
use std::mem::size_of_val;
pub use args::*;

/// Log a message, and also print it to stdout in verbose mode
macro_rules! verbose {
    ( $verbose:expr, $($arg:tt)* ) => {{
        let msg = format!($($arg)*);
        log::debug!("{}", msg);
        if $verbose {
            println!("{}", msg);
        }
    }};
}

/// Options for selecting a device and building programs
#[derive(Debug, Clone)]
#[must_use]
pub struct SessionBuilder {
    device_type: DeviceType,
    verbose: bool,
    platform: Option<usize>,
    build_options: Option<String>,
}

impl SessionBuilder {
    pub fn new(device_type: DeviceType) -> Self {
        Self {
            device_type,
            verbose: false,
            platform: None,
            build_options: None,
        }
    }

    /// Print what's going on (platforms, devices, allocations, transfers and
    /// launches) to stdout.
    pub fn verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    /// Only consider the platform with the given index
    pub fn platform(self, index: usize) -> Self {
        Self {
            platform: Some(index),
            ..self
        }
    }

    /// Options passed to the OpenCL C compiler for every program
    pub fn build_options(self, options: impl Into<String>) -> Self {
        Self {
            build_options: Some(options.into()),
            ..self
        }
    }

    /// Select the first device of the requested type, on the first platform
    /// providing one, and set up a context and command queue for it.
    ///
    /// Platforms that fail to enumerate their devices are skipped.
    pub fn init(self) -> Result<Session> {
        let platforms = Platform::get_platforms()?;
        let verbose = self.verbose;
        let device_type = self.device_type;

        let chosen = first_with_device(platforms, self.platform, |index, platform| {
            let devices = platform.get_devices(device_type);
            match &devices {
                Ok(devices) if verbose => {
                    let name = platform_name(platform);
                    println!("{}", describe_platform(index, &name, &summaries(devices)));
                }
                Ok(_) => {}
                Err(e) => verbose!(verbose, "Platform[{}]: skipped, {}", index, e),
            }
            devices
        });

        let (index, platform, device) = chosen.ok_or(Error::NoDevice { device_type })?;
        verbose!(verbose, "{}", choosing_platform(index));
        log::debug!("Using {:?} on {:?}", device, platform);

        let context = device.create_context()?;
        let queue = Queue::create(&context, device)?;

        Ok(Session {
            platform,
            device,
            queue,
            context,
            verbose: self.verbose,
            build_options: self.build_options,
            timings: Timings::default(),
        })
    }
}

/// Walk `platforms` in order and return the first device of the first one
/// whose device list is non-empty. Platforms whose device query fails are
/// skipped, and `only` restricts the search to a single platform index.
fn first_with_device<P: Copy, D: Copy>(
    platforms: impl IntoIterator<Item = P>,
    only: Option<usize>,
    mut devices_of: impl FnMut(usize, P) -> Result<Vec<D>>,
) -> Option<(usize, P, D)> {
    for (index, platform) in platforms.into_iter().enumerate() {
        if only.map_or(false, |only| only != index) {
            continue;
        }

        match devices_of(index, platform) {
            Ok(devices) => {
                if let Some(&device) = devices.first() {
                    return Some((index, platform, device));
                }
            }
            Err(e) => log::debug!("Skipping platform {}: {}", index, e),
        }
    }

    None
}

/// The device properties shown while choosing a platform
#[derive(Debug, Clone, PartialEq)]
struct DeviceSummary {
    compute_units: cl_uint,
    max_local: Vec<usize>,
    global_mem: cl_ulong,
}

impl DeviceSummary {
    fn query(device: Device) -> Result<Self> {
        Ok(Self {
            compute_units: device.max_compute_units()?,
            max_local: device.max_work_item_sizes()?,
            global_mem: device.global_mem_size()?,
        })
    }
}

fn platform_name(platform: Platform) -> String {
    platform.name().unwrap_or_else(|e| {
        log::debug!("Could not query name of {:?}: {}", platform, e);
        String::from("(unknown)")
    })
}

fn summaries(devices: &[Device]) -> Vec<DeviceSummary> {
    devices
        .iter()
        .filter_map(|&device| match DeviceSummary::query(device) {
            Ok(summary) => Some(summary),
            Err(e) => {
                log::debug!("Could not describe {:?}: {}", device, e);
                None
            }
        })
        .collect()
}

fn describe_platform(index: usize, name: &str, devices: &[DeviceSummary]) -> String {
    let mut lines = vec![format!("Platform[{}]: {}", index, name)];

    if devices.is_empty() {
        lines.push(String::from("  no suitable device found"));
    }

    for (j, device) in devices.iter().enumerate() {
        let local = device
            .max_local
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("x");

        lines.push(format!("  Device[{}]: {} compute units", j, device.compute_units));
        lines.push(format!("             {} max local", local));
        lines.push(format!("             {} global mem", mem_str(device.global_mem)));
    }

    lines.join("\n")
}

fn choosing_platform(index: usize) -> String {
    format!(">> Choosing platform {}", index)
}

/// Booleans travel to the device as one `uchar` each, 0 or 1
fn bools_to_bytes(src: &[bool]) -> Vec<cl_uchar> {
    src.iter().map(|&b| b as cl_uchar).collect()
}

/// Any non-zero byte reads back as `true`
fn bytes_to_bools(src: &[cl_uchar], dest: &mut [bool]) {
    for (d, &b) in dest.iter_mut().zip(src) {
        *d = b != 0;
    }
}

/// A device together with its context and command queue, plus the timings of
/// everything run through it.
///
/// The command queue and context are released when the session is dropped,
/// or explicitly with `free_device`.
pub struct Session {
    platform: Platform,
    device: Device,
    // dropped in declaration order, so the queue goes before its context
    queue: Queue,
    context: Context,
    verbose: bool,
    build_options: Option<String>,
    timings: Timings,
}

impl Session {
    pub fn builder(device_type: DeviceType) -> SessionBuilder {
        SessionBuilder::new(device_type)
    }

    pub fn init_gpu() -> Result<Self> {
        Self::builder(DeviceType::GPU).init()
    }

    pub fn init_gpu_verbose() -> Result<Self> {
        Self::builder(DeviceType::GPU).verbose(true).init()
    }

    /// Use the host CPU as the device. Not every OpenCL implementation
    /// supports this.
    pub fn init_cpu() -> Result<Self> {
        Self::builder(DeviceType::CPU).init()
    }

    pub fn init_cpu_verbose() -> Result<Self> {
        Self::builder(DeviceType::CPU).verbose(true).init()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Maximum number of work items per work group of the selected device in
    /// dimension `dim` (0, 1 or 2)
    pub fn max_work_items(&self, dim: usize) -> Result<usize> {
        self.device.max_work_items(dim)
    }

    /// Allocate a device buffer for `len` elements
    pub fn alloc_dev<T: MemSafe>(&self, len: usize) -> Result<Buffer<T>> {
        verbose!(
            self.verbose,
            "allocating {} on the device",
            mem_str(byte_size::<T>(len)? as u64)
        );
        self.context.create_buffer(len)
    }

    pub fn host_to_dev<T: MemSafe>(&mut self, src: &[T], buffer: &Buffer<T>) -> Result<()> {
        verbose!(
            self.verbose,
            "transferring {} to device",
            mem_str(size_of_val(src) as u64)
        );
        let queue = &self.queue;
        self.timings.host_to_device.time(|| queue.write(buffer, src))
    }

    pub fn dev_to_host<T: MemSafe>(&mut self, buffer: &Buffer<T>, dest: &mut [T]) -> Result<()> {
        verbose!(
            self.verbose,
            "transferring {} to host",
            mem_str(size_of_val(dest) as u64)
        );
        let queue = &self.queue;
        self.timings.device_to_host.time(|| queue.read(buffer, dest))
    }

    /// Booleans are stored on the device as one `uchar` each, 0 or 1.
    pub fn host_to_dev_bool(&mut self, src: &[bool], buffer: &Buffer<cl_uchar>) -> Result<()> {
        self.host_to_dev(&bools_to_bytes(src), buffer)
    }

    /// Any non-zero byte on the device reads back as `true`.
    pub fn dev_to_host_bool(&mut self, buffer: &Buffer<cl_uchar>, dest: &mut [bool]) -> Result<()> {
        let mut bytes = vec![0 as cl_uchar; dest.len()];
        self.dev_to_host(buffer, &mut bytes)?;
        bytes_to_bools(&bytes, dest);
        Ok(())
    }

    /// Compile `source` and create the kernel called `name` from it
    pub fn create_kernel(&self, source: &str, name: &str) -> Result<Kernel> {
        let mut builder = ProgramBuilder::with_source(&self.context, source);
        if let Some(options) = &self.build_options {
            builder = builder.opt(options.as_str());
        }

        let program = builder.build()?;
        let kernel = program.create_kernel(name)?;
        log::debug!("Created kernel {:?}", kernel);
        Ok(kernel)
    }

    /// Execute `kernel` over `range` and wait for it to complete.
    ///
    /// Only the execution itself is timed, argument transfers are not.
    pub fn launch_kernel(&mut self, kernel: &Kernel, range: &NdRange) -> Result<()> {
        verbose!(self.verbose, "Trying to launch a kernel with {}", range);
        let queue = &self.queue;
        self.timings.kernel.time(|| {
            queue.enqueue_kernel(kernel, range)?;
            queue.finish()
        })
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Print the total wall-clock time spent in kernel executions
    pub fn print_kernel_time(&self) {
        println!("{}", self.timings.kernel_report());
    }

    /// Print the total wall-clock time spent in buffer transfers, in each
    /// direction
    pub fn print_transfer_times(&self) {
        println!("{}", self.timings.transfer_report());
    }

    /// Release the command queue and context, returning the first error
    /// encountered.
    pub fn free_device(self) -> Result<()> {
        let Session {
            queue,
            context,
            verbose,
            ..
        } = self;

        let queue_result = queue.release();
        let context_result = context.release();
        verbose!(verbose, "released the device");
        queue_result.and(context_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::CL_INVALID_PLATFORM;
    use crate::ApiError;

    #[test]
    fn test_describe_platform() {
        let devices = vec![DeviceSummary {
            compute_units: 20,
            max_local: vec![1024, 1024, 64],
            global_mem: 4 * 1024 * 1024 * 1024,
        }];

        assert_eq!(
            describe_platform(1, "NVIDIA CUDA", &devices),
            "Platform[1]: NVIDIA CUDA\n  \
             Device[0]: 20 compute units\n             \
             1024x1024x64 max local\n             \
             4.00 GB global mem"
        );
        assert_eq!(choosing_platform(1), ">> Choosing platform 1");
    }

    #[test]
    fn test_describe_platform_without_devices() {
        assert_eq!(
            describe_platform(0, "Portable Computing Language", &[]),
            "Platform[0]: Portable Computing Language\n  no suitable device found"
        );
    }

    #[test]
    fn test_failing_platform_is_skipped() {
        let chosen = first_with_device(vec!['a', 'b', 'c'], None, |index, _| match index {
            0 => Err(ApiError::new(CL_INVALID_PLATFORM, "clGetDeviceIDs").into()),
            1 => Ok(vec![]),
            _ => Ok(vec![10, 11]),
        });
        assert_eq!(chosen, Some((2, 'c', 10)));
    }

    #[test]
    fn test_platform_restriction() {
        let mut asked = Vec::new();
        let chosen = first_with_device(vec!['a', 'b', 'c'], Some(1), |index, _| {
            asked.push(index);
            Ok(vec![index])
        });
        assert_eq!(chosen, Some((1, 'b', 1)));
        assert_eq!(asked, [1]);

        let none = first_with_device(vec!['a'], None, |_, _| Ok(Vec::<usize>::new()));
        assert_eq!(none, None);
    }

    #[test]
    fn test_bool_bytes() {
        assert_eq!(bools_to_bytes(&[true, false, true]), [1, 0, 1]);

        let mut dest = [false, true, false, true];
        bytes_to_bools(&[0, 7, 1, 0], &mut dest);
        assert_eq!(dest, [false, true, true, false]);
    }
}
