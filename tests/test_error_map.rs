// CLASSIFICATION: COMMUNITY
// Filename: test_error_map.rs v0.1
// Date Modified: 2026-10-16
// Author: Lukas Bower

mod common;

use bnxt_hwrm::sim::{SimDevice, SimReply};
use bnxt_hwrm::wire::{FwStatus, Opcode};
use bnxt_hwrm::{map_status, ChannelConfig, ErrorKind, HwrmError};
use common::{channel, init_logging, Raw};
use proptest::prelude::*;

#[test]
fn known_codes_map_to_fixed_kinds() {
    let table = [
        (FwStatus::SUCCESS, None),
        (FwStatus::FAIL, Some(ErrorKind::GenericFailure)),
        (FwStatus::INVALID_PARAMS, Some(ErrorKind::InvalidArgument)),
        (FwStatus::RESOURCE_ACCESS_DENIED, Some(ErrorKind::PermissionDenied)),
        (FwStatus::RESOURCE_ALLOC_ERROR, Some(ErrorKind::OutOfResources)),
        (FwStatus::INVALID_FLAGS, Some(ErrorKind::InvalidArgument)),
        (FwStatus::INVALID_ENABLES, Some(ErrorKind::InvalidArgument)),
        (FwStatus::HWRM_ERROR, Some(ErrorKind::DeviceError)),
        (FwStatus::UNKNOWN_ERR, Some(ErrorKind::DeviceError)),
        (FwStatus::CMD_NOT_SUPPORTED, Some(ErrorKind::Unsupported)),
    ];
    for (status, kind) in table {
        assert_eq!(map_status(status), kind, "status {status}");
    }
    assert_eq!(table.len(), FwStatus::KNOWN.len());
}

#[test]
fn generic_failure_surfaces_through_channel() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Status(FwStatus::FAIL));
    let chan = channel(&dev, ChannelConfig::default());

    let err = chan.execute(&Raw::<16>(0)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::GenericFailure);
    assert_eq!(
        err,
        HwrmError::Firmware {
            opcode: Opcode::FUNC_QCFG,
            status: FwStatus::FAIL,
        }
    );
}

#[test]
fn driver_side_rejections_are_invalid_argument() {
    let err = HwrmError::InvalidRequest { reason: "test" };
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.status(), None);
}

#[test]
fn messages_name_the_opcode() {
    let err = HwrmError::Firmware {
        opcode: Opcode::FUNC_BACKING_STORE_CFG,
        status: FwStatus::INVALID_ENABLES,
    };
    assert_eq!(
        err.to_string(),
        "FUNC_BACKING_STORE_CFG failed with firmware status INVALID_ENABLES"
    );
}

proptest! {
    #[test]
    fn unknown_codes_are_device_errors(code in any::<u16>()) {
        let status = FwStatus(code);
        prop_assume!(!FwStatus::KNOWN.contains(&status));
        prop_assert_eq!(map_status(status), Some(ErrorKind::DeviceError));
    }

    #[test]
    fn every_nonzero_code_fails_through_channel(code in 1u16..) {
        let dev = SimDevice::new(move |_| SimReply::Status(FwStatus(code)));
        let chan = channel(&dev, ChannelConfig::default());
        let err = chan.execute(&Raw::<16>(0)).unwrap_err();
        prop_assert_eq!(err.status(), Some(FwStatus(code)));
        prop_assert_eq!(Some(err.kind()), map_status(FwStatus(code)));
    }
}
