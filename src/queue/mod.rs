//! Command queues
//!
//! All commands issued through this module are blocking: buffer transfers
//! return once the data has been copied, and `enqueue_kernel` is usually
//! followed by `finish`.

use crate::buffer::{Buffer, MemSafe};
use crate::context::Context;
use crate::device::Device;
use crate::kernel::{Kernel, NdRange};
use crate::raw::{cl_command_queue, functions::cl, CL_SUCCESS, CL_TRUE};
use crate::{ApiError, Error, Result};
use std::fmt::{self, Debug, Formatter};
use std::mem::{size_of_val, ManuallyDrop};
use std::ptr::{null, null_mut};

/// An in-order OpenCL command queue
#[derive(PartialEq, Eq, Hash)]
pub struct Queue(pub(crate) cl_command_queue);

unsafe impl Send for Queue {}

impl Drop for Queue {
    fn drop(&mut self) {
        if let Err(e) = release_queue(self.0) {
            log::warn!("Error releasing OpenCL command queue {:?}: {:?}", self, e);
        }
    }
}

fn release_queue(id: cl_command_queue) -> Result<()> {
    let cl = cl()?;
    unsafe { wrap_result!("clReleaseCommandQueue" => cl.CL10.clReleaseCommandQueue(id)) }
}

impl Debug for Queue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Queue").field(&self.0).finish()
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if actual > expected {
        return Err(Error::InvalidDataLength { expected, actual });
    }
    Ok(())
}

impl Queue {
    /// Create an in-order command queue without any special properties for
    /// the given device.
    pub fn create(context: &Context, device: Device) -> Result<Self> {
        let cl = cl()?;

        unsafe {
            let mut err = CL_SUCCESS;
            let queue =
                cl.CL10
                    .clCreateCommandQueue(context.raw(), device.raw(), 0, &mut err as _);
            wrap_result!("clCreateCommandQueue" => err)?;
            Ok(Queue(queue))
        }
    }

    pub fn raw(&self) -> cl_command_queue {
        self.0
    }

    /// Perform a blocking write of `src` to the start of the buffer.
    ///
    /// `src` may be shorter than the buffer, but not longer.
    pub fn write<T: MemSafe>(&self, buffer: &Buffer<T>, src: &[T]) -> Result<()> {
        check_len(buffer.len(), src.len())?;
        let cl = cl()?;

        unsafe {
            wrap_result!("clEnqueueWriteBuffer" => cl.CL10.clEnqueueWriteBuffer(
                self.0,
                buffer.raw(),
                CL_TRUE,
                0,
                size_of_val(src),
                src.as_ptr() as _,
                0,
                null(),
                null_mut(),
            ))
        }
    }

    /// Perform a blocking read from the start of the buffer into `dest`.
    ///
    /// `dest` may be shorter than the buffer, but not longer.
    pub fn read<T: MemSafe>(&self, buffer: &Buffer<T>, dest: &mut [T]) -> Result<()> {
        check_len(buffer.len(), dest.len())?;
        let cl = cl()?;

        unsafe {
            wrap_result!("clEnqueueReadBuffer" => cl.CL10.clEnqueueReadBuffer(
                self.0,
                buffer.raw(),
                CL_TRUE,
                0,
                size_of_val(dest),
                dest.as_mut_ptr() as _,
                0,
                null(),
                null_mut(),
            ))
        }
    }

    /// Enqueue a kernel for execution over the given range. The range is
    /// validated before anything is submitted.
    pub fn enqueue_kernel(&self, kernel: &Kernel, range: &NdRange) -> Result<()> {
        range.validate()?;
        let cl = cl()?;

        let local = range.local_size().map(|l| l.as_ptr()).unwrap_or(null());

        unsafe {
            match cl.CL10.clEnqueueNDRangeKernel(
                self.0,
                kernel.raw(),
                range.dimensions() as _,
                null(),
                range.global_size().as_ptr(),
                local,
                0,
                null(),
                null_mut(),
            ) {
                CL_SUCCESS => Ok(()),
                code => Err(Error::LaunchFailed {
                    range: range.to_string(),
                    source: ApiError::new(code, "clEnqueueNDRangeKernel"),
                }),
            }
        }
    }

    /// Block until all previously queued commands have completed
    pub fn finish(&self) -> Result<()> {
        let cl = cl()?;
        unsafe { wrap_result!("clFinish" => cl.CL10.clFinish(self.0)) }
    }

    /// Release this queue, reporting any error instead of logging it
    pub fn release(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        release_queue(this.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len() {
        assert!(check_len(10, 10).is_ok());
        assert!(check_len(10, 3).is_ok());
        match check_len(4, 5) {
            Err(Error::InvalidDataLength {
                expected: 4,
                actual: 5,
            }) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
