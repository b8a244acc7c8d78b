//! A small host-side layer over a dynamically loaded OpenCL library.
//!
//! The [`session`] module picks a device, compiles a kernel, copies its array
//! arguments to the device, runs it and copies the arrays back. The other
//! modules are the typed building blocks it is made of, and can be used
//! directly.

pub extern crate dlopen;

#[macro_use]
mod macros;

pub mod buffer;
pub mod context;
pub mod device;
mod error;
pub mod info;
pub mod kernel;
pub mod platform;
pub mod program;
pub mod queue;
pub mod raw;
pub mod session;
pub mod timing;
pub mod util;

pub use error::*;
pub use kernel::NdRange;
pub use raw::load_opencl;
pub use session::{Arg, PreparedKernel, Session, SessionBuilder};
