/// Create a new opaque type
macro_rules! opaque_type {
    ( $name:ident ) => {
        #[doc(hidden)]
        pub struct $name {
            _opaque: (),
        }
    };

    ( $( $name:ident),* $(,)? ) => {
        $( opaque_type!{$name} )*
    };
}

/// Define OpenCL error code constants and a function to get the name of an
/// error code
macro_rules! error_codes {
    ( $($name:ident = $value:expr),* $(,)? ) => {
        $( pub const $name: cl_int = $value; )*

        /// Get the name of an OpenCL error code, returning `None` if the error
        /// code is unknown
        pub fn error_name(code: cl_int) -> Option<&'static str> {
            match code {
                $($name => Some(stringify!($name)),)*
                _ => None,
            }
        }
    };
}

/// Define raw OpenCL function bindings, grouped into API sets that are loaded
/// together
macro_rules! raw_functions {
    (
        $(
             $apiname:ident : $apity:ty {
                $(
                    fn $fname:ident ( $( $pname:ident : $pty:ty ),* $(,)? ) $( -> $rty:ty )? ;
                )*
            }
        )*
    ) => {
        use dlopen::wrapper::{WrapperApi, WrapperMultiApi};
        use dlopen_derive::{WrapperApi, WrapperMultiApi};

        $(
            #[allow(non_snake_case)]
            #[derive(WrapperApi)]
            pub struct $apiname {
                $(
                    $fname: unsafe extern "C" fn ( $( $pname : $pty ),* ) $( -> $rty )?
                ),*
            }

            impl std::fmt::Debug for $apiname {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    f.debug_struct(stringify!($apiname))
                        $( .field(stringify!($fname), &(self.$fname as *const ())) )*
                        .finish()
                }
            }
        )*

        #[allow(non_snake_case)]
        #[derive(Debug, WrapperMultiApi)]
        pub struct RawOpenCL {
            $( pub $apiname: $apity, )*
        }
    }
}

/// Convert an OpenCL status code into a `crate::Result<()>`, attaching the
/// name of the call as context
macro_rules! wrap_result {
    ( $ctx:expr => $e:expr ) => {
        match $e {
            crate::raw::CL_SUCCESS => Ok(()),
            code => Err(crate::Error::from(crate::ApiError::new(code, $ctx))),
        }
    };
}

/// Define typed info accessor functions backed by `OclInfo::get_info`
macro_rules! info_funcs {
    (
        $(
            $( #[ $outer:meta ] )*
            $vis:vis fn $name:ident(&self) -> $ty:ty = $param:ident;
        )*
    ) => {
        $(
            $( #[ $outer ] )*
            $vis fn $name(&self) -> crate::Result<$ty> {
                <Self as crate::info::OclInfo>::get_info::<$ty>(self, crate::raw::$param)
            }
        )*
    }
}

/// Define a bitfield newtype over an OpenCL flags type
macro_rules! bitfield {
    (
        $( #[ $outer:meta ] )*
        pub struct $name:ident($raw:ty) {
            $(
                $( #[ $inner:meta ] )*
                pub const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $( #[ $outer ] )*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) $raw);

        impl $name {
            $(
                $( #[ $inner ] )*
                pub const $flag: $name = $name($value);
            )*

            /// Get the raw value of this bitfield
            pub fn raw(self) -> $raw {
                self.0
            }

            /// Check whether every flag set in `other` is also set in `self`
            pub fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl From<$raw> for $name {
            fn from(raw: $raw) -> Self {
                $name(raw)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                let mut names: Vec<&'static str> = Vec::new();
                $(
                    if $value != 0 && self.contains($name::$flag) {
                        names.push(stringify!($flag));
                    }
                )*
                f.debug_set().entries(names).finish()
            }
        }
    };
}
