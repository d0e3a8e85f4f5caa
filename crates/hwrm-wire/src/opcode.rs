// Author: Lukas Bower
//! Firmware command opcodes.

use core::fmt;

/// HWRM command opcode as carried in `req_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(pub u16);

macro_rules! opcodes {
    ($($name:ident = $value:expr,)*) => {
        impl Opcode {
            $(
                #[allow(missing_docs)]
                pub const $name: Self = Self($value);
            )*

            /// Returns the firmware name of the opcode, if known.
            #[must_use]
            pub const fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    VER_GET = 0x0000,
    FUNC_RESET = 0x0011,
    FUNC_QCAPS = 0x0015,
    FUNC_QCFG = 0x0016,
    FUNC_DRV_UNRGTR = 0x001a,
    FUNC_DRV_RGTR = 0x001d,
    PORT_PHY_CFG = 0x0020,
    PORT_PHY_QCFG = 0x0027,
    QUEUE_QPORTCFG = 0x0030,
    VNIC_ALLOC = 0x0040,
    RING_ALLOC = 0x0050,
    STAT_CTX_ALLOC = 0x00b0,
    FW_RESET = 0x00c0,
    FW_QSTATUS = 0x00c1,
    FUNC_RESOURCE_QCAPS = 0x0190,
    FUNC_BACKING_STORE_CFG = 0x0193,
    FUNC_BACKING_STORE_QCAPS = 0x0194,
    NVM_FLUSH = 0xfff0,
    NVM_GET_VARIABLE = 0xfff1,
    NVM_SET_VARIABLE = 0xfff2,
    NVM_INSTALL_UPDATE = 0xfff3,
    NVM_MODIFY = 0xfff4,
    NVM_VERIFY_UPDATE = 0xfff5,
    NVM_GET_DEV_INFO = 0xfff6,
    NVM_ERASE_DIR_ENTRY = 0xfff7,
    NVM_MOD_DIR_ENTRY = 0xfff8,
    NVM_FIND_DIR_ENTRY = 0xfff9,
    NVM_GET_DIR_ENTRIES = 0xfffa,
    NVM_GET_DIR_INFO = 0xfffb,
    NVM_RAW_DUMP = 0xfffc,
    NVM_READ = 0xfffd,
    NVM_WRITE = 0xfffe,
}

impl Opcode {
    /// Returns the raw opcode value.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl From<u16> for Opcode {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:04x}", self.0),
        }
    }
}
