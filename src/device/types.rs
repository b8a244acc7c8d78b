use crate::info::{FromOclInfo, OclInfo};
use crate::raw::*;
use crate::Result;

bitfield! {
    /// A bitfield representing OpenCL device types
    pub struct DeviceType(cl_device_type) {
        pub const DEFAULT = CL_DEVICE_TYPE_DEFAULT;
        pub const CPU = CL_DEVICE_TYPE_CPU;
        pub const GPU = CL_DEVICE_TYPE_GPU;
        pub const ACCELERATOR = CL_DEVICE_TYPE_ACCELERATOR;
        pub const CUSTOM = CL_DEVICE_TYPE_CUSTOM;
        pub const ALL = CL_DEVICE_TYPE_ALL;
    }
}

impl DeviceType {
    /// A device type bitfield with no fields set
    pub const EMPTY: DeviceType = DeviceType(0);
}

impl FromOclInfo for DeviceType {
    fn read<T: OclInfo>(from: &T, param_name: T::Param) -> Result<Self> {
        cl_ulong::read(from, param_name).map(DeviceType)
    }
}

#[cfg(test)]
mod tests {
    use super::DeviceType;

    #[test]
    fn test_device_type_debug_fmt() {
        assert!(!dbg!(format!("{:?}", DeviceType::EMPTY)).contains("CPU"));
        assert!(dbg!(format!("{:?}", DeviceType::ALL)).contains("CPU"));
        assert!(dbg!(format!("{:?}", DeviceType::CPU | DeviceType::GPU)).contains("GPU"));
        assert!(!dbg!(format!("{:?}", DeviceType::GPU)).contains("CPU"));
    }

    #[test]
    fn test_device_type_contains() {
        assert!(DeviceType::ALL.contains(DeviceType::GPU));
        assert!((DeviceType::CPU | DeviceType::GPU).contains(DeviceType::CPU));
        assert!(!DeviceType::CPU.contains(DeviceType::GPU));
        assert!(DeviceType::GPU.contains(DeviceType::EMPTY));
    }
}
