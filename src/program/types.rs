use crate::context::Context;
use crate::program::Program;
use crate::raw::{functions::cl, CL_BUILD_PROGRAM_FAILURE, CL_SUCCESS};
use crate::{ApiError, Error, Result};
use std::borrow::Cow;
use std::ffi::CString;
use std::ptr::{null, null_mut};

/// A partially built OpenCL program, compiled from a single source string
#[must_use]
pub struct ProgramBuilder<'a> {
    ctx: &'a Context,
    src: &'a [u8],
    opts: Option<Cow<'a, str>>,
}

impl<'a> ProgramBuilder<'a> {
    /// Begin building a program with a single source file
    pub fn with_source(ctx: &'a Context, src: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Self {
            ctx,
            src: src.as_ref(),
            opts: None,
        }
    }

    /// Append an option to be passed to the compiler
    pub fn opt(mut self, opts: impl Into<Cow<'a, str>>) -> Self {
        let opts: Cow<'a, str> = opts.into();
        match &mut self.opts {
            Some(old) => {
                *old += " ";
                *old += opts;
            }
            o => *o = Some(opts),
        };
        self
    }

    /// Build the program for every device in the context.
    ///
    /// If compilation fails, the build log of each device is collected into
    /// `Error::BuildFailed`.
    pub fn build(&self) -> Result<Program> {
        let cl = cl()?;

        unsafe {
            let mut err = CL_SUCCESS;

            let strings = [self.src.as_ptr() as *const _];
            let lengths = [self.src.len()];
            let program = cl.CL10.clCreateProgramWithSource(
                self.ctx.raw(),
                1,
                strings.as_ptr(),
                lengths.as_ptr(),
                &mut err as _,
            );
            wrap_result!("clCreateProgramWithSource" => err)?;

            // owned from here on, so early returns release it
            let program = Program(program);

            let opts = match &self.opts {
                Some(o) => Some(
                    CString::new(o.as_bytes()).map_err(|_| Error::InvalidName(o.to_string()))?,
                ),
                None => None,
            };

            match cl.CL10.clBuildProgram(
                program.raw(),
                0,
                null(),
                opts.as_ref().map(|o| o.as_ptr()).unwrap_or(null()),
                None,
                null_mut(),
            ) {
                CL_SUCCESS => Ok(program),
                CL_BUILD_PROGRAM_FAILURE => Err(Error::BuildFailed {
                    log: self.collect_build_logs(&program),
                }),
                code => Err(ApiError::new(code, "clBuildProgram").into()),
            }
        }
    }

    fn collect_build_logs(&self, program: &Program) -> String {
        let devices = match self.ctx.devices() {
            Ok(devices) => devices,
            Err(e) => return format!("(build log unavailable: {})", e),
        };

        devices
            .into_iter()
            .map(|device| match program.build_log(device) {
                Ok(log) => log,
                Err(e) => format!("(build log unavailable: {})", e),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
