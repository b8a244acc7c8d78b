//! Typed access to the `clGet___Info` family of functions

use crate::raw::{cl_bool, cl_uint, cl_ulong, CL_FALSE};
use crate::{Error, Result};
use libc::size_t;
use std::convert::TryInto;
use std::mem::size_of;
use std::ptr::null_mut;

pub(crate) mod sealed {
    use crate::raw::cl_int;
    use libc::size_t;
    use std::ffi::c_void;

    pub trait OclInfoInternal {
        type Param: Copy;

        const DEBUG_CONTEXT: &'static str;

        unsafe fn raw_info_internal(
            &self,
            param_name: Self::Param,
            param_value_size: size_t,
            param_value: *mut c_void,
            param_value_size_ret: *mut size_t,
        ) -> crate::Result<cl_int>;
    }
}

/// Queries answered by one of the `clGet___Info` functions
pub trait OclInfo: sealed::OclInfoInternal {
    /// Query a value of unknown size: first its size, then its bytes.
    fn get_info_raw(&self, param_name: Self::Param) -> Result<Vec<u8>> {
        unsafe {
            let mut size = 0;

            wrap_result!(Self::DEBUG_CONTEXT => self.raw_info_internal(
                param_name,
                0,
                null_mut(),
                &mut size as _
            )?)?;

            let mut data = vec![0u8; size];

            wrap_result!(Self::DEBUG_CONTEXT => self.raw_info_internal(
                param_name,
                size,
                data.as_mut_ptr() as *mut _,
                &mut size as _
            )?)?;

            if data.len() != size {
                return Err(Error::InvalidDataLength {
                    expected: data.len(),
                    actual: size,
                });
            }

            Ok(data)
        }
    }

    /// Query a fixed-size value in a single call. The reported size must be
    /// exactly `N` bytes.
    fn get_info_raw_sized<const N: usize>(&self, param_name: Self::Param) -> Result<[u8; N]> {
        unsafe {
            let mut array = [0u8; N];
            let mut size_ret = 0;

            wrap_result!(Self::DEBUG_CONTEXT => self.raw_info_internal(
                param_name,
                N,
                array.as_mut_ptr() as _,
                &mut size_ret as _
            )?)?;

            if size_ret != N {
                return Err(Error::InvalidDataLength {
                    expected: N,
                    actual: size_ret,
                });
            }

            Ok(array)
        }
    }

    /// Query a value and decode it as `T`
    fn get_info<T: FromOclInfo>(&self, param_name: Self::Param) -> Result<T>
    where
        Self: Sized,
    {
        T::read(self, param_name)
    }
}

impl<T: sealed::OclInfoInternal> OclInfo for T {}

/// Decoding of `clGet___Info` results
pub trait FromOclInfo: Sized {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self>;
}

impl FromOclInfo for String {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self> {
        let mut data = from.get_info_raw(param_name)?;

        if let Some(i) = data.iter().position(|&b| b == b'\0') {
            data.truncate(i);
        }

        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

impl FromOclInfo for cl_ulong {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self> {
        from.get_info_raw_sized(param_name).map(Self::from_ne_bytes)
    }
}

impl FromOclInfo for size_t {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self> {
        from.get_info_raw_sized(param_name).map(Self::from_ne_bytes)
    }
}

impl FromOclInfo for cl_uint {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self> {
        from.get_info_raw_sized(param_name).map(Self::from_ne_bytes)
    }
}

impl FromOclInfo for bool {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self> {
        from.get_info_raw_sized(param_name)
            .map(|d| cl_bool::from_ne_bytes(d) != CL_FALSE)
    }
}

impl FromOclInfo for Vec<size_t> {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self> {
        decode_size_ts(&from.get_info_raw(param_name)?)
    }
}

impl<P> FromOclInfo for *mut P {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self> {
        size_t::read(from, param_name).map(|p| p as _)
    }
}

impl<P> FromOclInfo for Vec<*mut P> {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self> {
        Ok(Vec::<size_t>::read(from, param_name)?
            .into_iter()
            .map(|p| p as _)
            .collect())
    }
}

fn decode_size_ts(raw: &[u8]) -> Result<Vec<size_t>> {
    raw.chunks(size_of::<size_t>())
        .map(|c| {
            c.try_into()
                .map(size_t::from_ne_bytes)
                .map_err(|_| Error::InvalidDataLength {
                    expected: size_of::<size_t>(),
                    actual: c.len(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_size_ts() {
        let mut raw = Vec::new();
        for v in &[1024usize, 64, 1] {
            raw.extend_from_slice(&v.to_ne_bytes());
        }
        assert_eq!(decode_size_ts(&raw).unwrap(), vec![1024, 64, 1]);
        assert!(decode_size_ts(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_size_ts_truncated() {
        let mut raw = 16usize.to_ne_bytes().to_vec();
        raw.push(0);

        match decode_size_ts(&raw) {
            Err(Error::InvalidDataLength { expected, actual }) => {
                assert_eq!(expected, size_of::<size_t>());
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
