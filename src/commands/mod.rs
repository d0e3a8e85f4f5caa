// Author: Lukas Bower
//! Typed encoders for the firmware commands the driver issues.

pub mod backing_store;
pub mod func;
pub mod nvm;
pub mod ver;

pub use backing_store::{
    encode_page_attr, query_backing_store, BackingStoreQcaps, ConfigureBackingStore, ContextMem,
    ContextMemInfo, ContextPages, PageSize, RingMem,
};
pub use func::{DriverRegister, DriverUnregister, FuncReset};
pub use nvm::{InstallResult, NvmDevInfo, NvmGetDevInfo, NvmInstallUpdate};
pub use ver::{Capabilities, FirmwareInfo, VerGet};
