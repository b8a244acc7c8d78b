use crate::device::DeviceType;
use crate::raw::{cl_int, error_name};
use std::fmt::{self, Debug, Display, Formatter};
use std::path::PathBuf;

/// An error code returned by an OpenCL API call
#[derive(thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    code: cl_int,
    context: &'static str,
}

impl ApiError {
    /// Create a new `ApiError` with the given error code and context
    pub fn new(code: cl_int, context: &'static str) -> Self {
        Self { code, context }
    }

    /// The raw OpenCL error code
    pub fn code(&self) -> cl_int {
        self.code
    }

    /// The OpenCL call that failed
    pub fn context(&self) -> &'static str {
        self.context
    }
}

impl Debug for ApiError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}: OpenCL error {} ({})",
            self.context,
            self.code,
            error_name(self.code).unwrap_or("unknown error code")
        )
    }
}

/// An error related to OpenCL
#[derive(thiserror::Error)]
pub enum Error {
    /// Error that occurred within an OpenCL API call
    #[error("{0}")]
    ApiError(#[from] ApiError),

    /// The OpenCL library could not be loaded
    #[error("Failed to load the OpenCL library: {0}")]
    LibraryUnavailable(&'static dlopen::Error),

    /// Data length mismatch
    #[error("Expected data length of {expected}, got data length {actual}")]
    InvalidDataLength { expected: usize, actual: usize },

    /// No platform offers a device of the requested type
    #[error("No OpenCL device of type {device_type:?} found on any platform")]
    NoDevice { device_type: DeviceType },

    /// Program compilation failed
    #[error("Failed to build program executable!\n{log}")]
    BuildFailed { log: String },

    /// A name passed to OpenCL contained an interior nul byte
    #[error("Name {0:?} contains a nul byte")]
    InvalidName(String),

    /// An NDRange with an unsupported number of dimensions
    #[error("Work dimension {0} is out of range, expected 1 to 3")]
    InvalidWorkDimension(usize),

    /// Global and local work sizes with different dimensionality
    #[error("Global work size has {global} dimensions but local work size has {local}")]
    WorkSizeMismatch { global: usize, local: usize },

    /// A device dimension index outside of `0..=2`
    #[error("Dimension index {0} is out of range, expected 0, 1 or 2")]
    InvalidDimensionIndex(usize),

    /// The number of kernel arguments doesn't match the kernel definition
    #[error("Kernel {kernel} takes {expected} arguments, but {actual} were given")]
    ArgCountMismatch {
        kernel: String,
        expected: usize,
        actual: usize,
    },

    /// A kernel argument whose OpenCL C type doesn't fit the host value
    #[error("Argument #{index} of kernel {kernel} has OpenCL type {c_type}, which is not compatible with {rust_type}")]
    ArgTypeMismatch {
        kernel: String,
        index: usize,
        c_type: String,
        rust_type: String,
    },

    /// Enqueueing a kernel failed
    #[error("Tried launching kernel with {range}: {source}")]
    LaunchFailed {
        range: String,
        #[source]
        source: ApiError,
    },

    /// A kernel source file couldn't be read
    #[error("Failed to read kernel source {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

/// An OpenCL result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{CL_INVALID_KERNEL_NAME, CL_OUT_OF_RESOURCES};

    #[test]
    fn test_api_error_display() {
        let e = ApiError::new(CL_INVALID_KERNEL_NAME, "clCreateKernel");
        assert_eq!(
            e.to_string(),
            "clCreateKernel: OpenCL error -46 (CL_INVALID_KERNEL_NAME)"
        );

        let e = ApiError::new(-12345, "clFinish");
        assert_eq!(
            e.to_string(),
            "clFinish: OpenCL error -12345 (unknown error code)"
        );
    }

    #[test]
    fn test_launch_error_display() {
        let e = Error::LaunchFailed {
            range: "global [ 7 ] and local [ 4 ]".into(),
            source: ApiError::new(CL_OUT_OF_RESOURCES, "clEnqueueNDRangeKernel"),
        };
        assert_eq!(
            e.to_string(),
            "Tried launching kernel with global [ 7 ] and local [ 4 ]: \
             clEnqueueNDRangeKernel: OpenCL error -5 (CL_OUT_OF_RESOURCES)"
        );
    }
}
