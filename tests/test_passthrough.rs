// CLASSIFICATION: COMMUNITY
// Filename: test_passthrough.rs v0.1
// Date Modified: 2026-10-16
// Author: Lukas Bower

mod common;

use bnxt_hwrm::commands::{NvmGetDevInfo, NvmInstallUpdate};
use bnxt_hwrm::sim::{SimDevice, SimReply, SIM_RESP_ADDR};
use bnxt_hwrm::wire::nvm::{GetDevInfoOutput, InstallUpdateInput, InstallUpdateOutput};
use bnxt_hwrm::wire::{FwStatus, Opcode, RequestHeader, NVM_TIMEOUT_MS};
use bnxt_hwrm::{ChannelConfig, ErrorKind, HwrmError};
use common::{channel, init_logging};
use zerocopy::{FromZeros, IntoBytes};

fn request(opcode: Opcode) -> Vec<u8> {
    let mut header = RequestHeader::new_zeroed();
    header.req_type.set(opcode.value());
    let mut req = header.as_bytes().to_vec();
    req.extend_from_slice(&[0x77; 8]);
    req
}

#[test]
fn passthrough_copies_response_out() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Respond(vec![0x42; 40]));
    let chan = channel(&dev, ChannelConfig::default());
    let mut req = request(Opcode::PORT_PHY_QCFG);
    let mut resp = [0u8; 32];

    chan.passthrough(&mut req, &mut resp, 0).expect("passthrough");

    let header: RequestHeader = dev.requests()[0].parse();
    assert_eq!(header.resp_addr.get(), SIM_RESP_ADDR);
    assert_eq!(header.cmpl_ring.get(), 0);
    assert_eq!(header.target_id.get(), 0);
    assert_eq!(u16::from_le_bytes([resp[6], resp[7]]), 40);
    assert!(resp[8..].iter().all(|&b| b == 0x42));
}

#[test]
fn passthrough_budget_is_at_least_channel_default() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Stall);
    let chan = channel(&dev, ChannelConfig::default().with_timeout_ms(100));

    let err = chan
        .passthrough(&mut request(Opcode::FUNC_QCFG), &mut [], 10)
        .unwrap_err();
    assert!(matches!(err, HwrmError::Timeout { timeout_ms: 100, .. }));

    let err = chan
        .passthrough(&mut request(Opcode::FUNC_QCFG), &mut [], 250)
        .unwrap_err();
    assert!(matches!(err, HwrmError::Timeout { timeout_ms: 250, .. }));
    assert_eq!(dev.elapsed_ms(), 350);
    assert_eq!(chan.timeout_ms(), 100);
}

#[test]
fn passthrough_install_update_gets_nvm_budget() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Stall);
    let chan = channel(&dev, ChannelConfig::default());

    let err = chan
        .passthrough(&mut request(Opcode::NVM_INSTALL_UPDATE), &mut [], 10)
        .unwrap_err();

    assert!(matches!(err, HwrmError::Timeout { timeout_ms: NVM_TIMEOUT_MS, .. }));
    assert_eq!(dev.elapsed_ms(), u64::from(NVM_TIMEOUT_MS));
}

#[test]
fn passthrough_failure_leaves_output_untouched() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Status(FwStatus::RESOURCE_ACCESS_DENIED));
    let chan = channel(&dev, ChannelConfig::default());
    let mut resp = [0xccu8; 16];

    let err = chan
        .passthrough(&mut request(Opcode::FUNC_QCFG), &mut resp, 0)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(resp, [0xcc; 16]);
}

#[test]
fn passthrough_rejects_headerless_request() {
    let dev = SimDevice::always_ok();
    let chan = channel(&dev, ChannelConfig::default());

    let err = chan.passthrough(&mut [0u8; 8], &mut [], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(dev.doorbells(), 0);
}

#[test]
fn nvm_dev_info_decodes_geometry() {
    init_logging();
    let mut out = GetDevInfoOutput::new_zeroed();
    out.manufacturer_id.set(0xc2);
    out.device_id.set(0x2018);
    out.sector_size.set(4096);
    out.nvram_size.set(16 << 20);
    out.available_size.set(12 << 20);
    let dev = SimDevice::new(move |_| SimReply::respond(&out));
    let chan = channel(&dev, ChannelConfig::default());

    let info = chan.execute(&NvmGetDevInfo).expect("dev info");

    assert_eq!(dev.requests()[0].opcode, Opcode::NVM_GET_DEV_INFO);
    assert_eq!(info.manufacturer_id, 0xc2);
    assert_eq!(info.nvram_size, 16 << 20);
    assert_eq!(info.available_size, 12 << 20);
    assert_eq!(info.reserved_size, 0);
}

#[test]
fn nvm_commands_wait_five_minutes() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Stall);
    let chan = channel(&dev, ChannelConfig::default());

    let err = chan.execute(&NvmGetDevInfo).unwrap_err();

    assert!(matches!(err, HwrmError::Timeout { timeout_ms: NVM_TIMEOUT_MS, .. }));
    assert_eq!(chan.timeout_ms(), 1000);
}

#[test]
fn install_update_reports_reset_requirement() {
    init_logging();
    let mut out = InstallUpdateOutput::new_zeroed();
    out.installed_items.set(0x5);
    out.reset_required = 1;
    let dev = SimDevice::new(move |_| SimReply::respond(&out));
    let chan = channel(&dev, ChannelConfig::default());

    let result = chan
        .execute(&NvmInstallUpdate {
            install_type: 0x11,
            flags: 0,
        })
        .expect("install");

    let sent: InstallUpdateInput = dev.requests()[0].parse();
    assert_eq!(sent.install_type.get(), 0x11);
    assert_eq!(result.installed_items, 0x5);
    assert!(result.reset_required);
    assert_eq!(result.result, 0);
}
