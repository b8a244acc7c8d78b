//! Device memory buffers

mod types;

use crate::context::Context;
use crate::raw::{cl_mem, functions::cl, CL_MEM_READ_WRITE, CL_SUCCESS};
use crate::{Error, Result};
use libc::size_t;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::mem::{size_of, ManuallyDrop};
use std::ptr::null_mut;
pub use types::*;

/// A read-write OpenCL buffer holding `len` elements of type `T`
pub struct Buffer<T: MemSafe> {
    _type: PhantomData<T>,
    pub(crate) handle: cl_mem,
    len: usize,
}

unsafe impl<T: MemSafe> Send for Buffer<T> {}

impl<T: MemSafe> Drop for Buffer<T> {
    fn drop(&mut self) {
        if let Err(e) = release_mem(self.handle) {
            log::warn!("Error releasing OpenCL mem object: {:?}: {:?}", self, e);
        }
    }
}

fn release_mem(handle: cl_mem) -> Result<()> {
    let cl = cl()?;
    unsafe { wrap_result!("clReleaseMemObject" => cl.CL10.clReleaseMemObject(handle)) }
}

impl<T: MemSafe> Debug for Buffer<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("handle", &self.handle)
            .field("type", &tynm::type_name::<T>())
            .field("len", &self.len)
            .finish()
    }
}

impl<T: MemSafe> Buffer<T> {
    pub fn raw(&self) -> cl_mem {
        self.handle
    }

    /// The number of elements this buffer holds
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The size of this buffer in bytes
    pub fn size(&self) -> size_t {
        self.len * size_of::<T>()
    }

    /// Release this buffer, reporting any error instead of logging it
    pub fn release(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        release_mem(this.handle)
    }
}

/// The size in bytes of `len` elements of type `T`, failing if it doesn't fit
/// in a `size_t`
pub fn byte_size<T: MemSafe>(len: usize) -> Result<size_t> {
    len.checked_mul(size_of::<T>())
        .ok_or(Error::InvalidDataLength {
            expected: size_t::MAX / size_of::<T>(),
            actual: len,
        })
}

impl Context {
    /// Allocate a read-write device buffer with space for `len` elements of
    /// type `T`. The initial contents of the buffer are unspecified.
    pub fn create_buffer<T: MemSafe>(&self, len: usize) -> Result<Buffer<T>> {
        let size = byte_size::<T>(len)?;
        let cl = cl()?;

        unsafe {
            let mut err = CL_SUCCESS;

            let handle = cl.CL10.clCreateBuffer(
                self.raw(),
                CL_MEM_READ_WRITE,
                size,
                null_mut(),
                &mut err as _,
            );

            wrap_result!("clCreateBuffer" => err)?;

            Ok(Buffer {
                _type: PhantomData,
                handle,
                len,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{cl_double, cl_uchar};

    #[test]
    fn test_byte_size() {
        assert_eq!(byte_size::<cl_double>(10).unwrap(), 80);
        assert_eq!(byte_size::<cl_uchar>(usize::MAX).unwrap(), usize::MAX);

        match byte_size::<cl_double>(usize::MAX / 4) {
            Err(Error::InvalidDataLength { expected, actual }) => {
                assert_eq!(expected, usize::MAX / 8);
                assert_eq!(actual, usize::MAX / 4);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
