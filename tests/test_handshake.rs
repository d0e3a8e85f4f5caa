// CLASSIFICATION: COMMUNITY
// Filename: test_handshake.rs v0.1
// Date Modified: 2026-10-16
// Author: Lukas Bower

mod common;

use bnxt_hwrm::commands::{DriverRegister, DriverUnregister, FuncReset};
use bnxt_hwrm::sim::{SimDevice, SimReply};
use bnxt_hwrm::wire::func::{FuncDrvRgtrInput, FuncDrvUnrgtrInput, FuncResetInput};
use bnxt_hwrm::wire::ver::{DevCapsCfg, VerGetInput, VerGetOutput};
use bnxt_hwrm::wire::Opcode;
use bnxt_hwrm::{ChannelConfig, HwrmError, PollStage};
use common::{channel, init_logging, Raw};
use zerocopy::FromZeros;

fn name(text: &str) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[..text.len()].copy_from_slice(text.as_bytes());
    out
}

fn modern_firmware() -> VerGetOutput {
    let mut out = VerGetOutput::new_zeroed();
    (out.hwrm_intf_maj, out.hwrm_intf_min, out.hwrm_intf_upd) = (1, 10, 2);
    (out.hwrm_fw_maj_8b, out.hwrm_fw_min_8b, out.hwrm_fw_bld_8b) = (218, 0, 169);
    out.hwrm_fw_major.set(218);
    out.hwrm_fw_minor.set(0);
    out.hwrm_fw_build.set(169);
    out.hwrm_fw_patch.set(4);
    out.hwrm_fw_name = name("bnxt_fw");
    out.active_pkg_name = name("218.0.166.0");
    (out.mgmt_fw_maj, out.mgmt_fw_min, out.mgmt_fw_bld) = (218, 0, 152);
    out.mgmt_fw_name = name("kong");
    out.chip_num.set(0x16d8);
    out.chip_rev = 1;
    out.max_req_win_len.set(256);
    out.max_ext_req_len.set(1024);
    out.def_req_timeout.set(0);
    out.dev_caps_cfg
        .set((DevCapsCfg::SHORT_CMD_SUPPORTED | DevCapsCfg::SHORT_CMD_REQUIRED).bits());
    out
}

fn firmware(ver: VerGetOutput) -> SimDevice {
    SimDevice::new(move |req| {
        if req.opcode == Opcode::VER_GET {
            SimReply::respond(&ver)
        } else {
            SimReply::ok()
        }
    })
}

#[test]
fn handshake_adopts_firmware_limits() {
    init_logging();
    let dev = firmware(modern_firmware());
    let chan = channel(&dev, ChannelConfig::default());

    let info = chan.handshake().expect("handshake");

    assert_eq!(info.intf_version.as_str(), "1.10.2");
    assert_eq!(info.fw_version.as_str(), "218.0.169.4/pkg 218.0.166.0");
    assert_eq!(info.fw_name.as_str(), "bnxt_fw");
    let mgmt = info.mgmt.as_ref().expect("mgmt firmware");
    assert_eq!(mgmt.version.as_str(), "218.0.152");
    assert_eq!(mgmt.name.as_str(), "kong");
    assert!(info.netctrl.is_none());
    assert!(info.roce.is_none());
    assert_eq!(info.chip.num, 0x16d8);
    assert_eq!(info.caps.spec_code, 0x010a02);
    assert!(info.caps.short_cmd_required());

    let limits = chan.limits();
    assert_eq!(limits.max_req_len, 256);
    assert_eq!(limits.max_ext_req_len, 1024);
    assert!(limits.short_cmd_required);
    assert_eq!(chan.timeout_ms(), 500);
    assert_eq!(chan.capabilities(), Some(info.caps));

    let sent: VerGetInput = dev.requests()[0].parse();
    assert_eq!(
        (sent.hwrm_intf_maj, sent.hwrm_intf_min, sent.hwrm_intf_upd),
        (1, 10, 2)
    );
}

#[test]
fn short_form_follows_handshake() {
    init_logging();
    let dev = firmware(modern_firmware());
    let chan = channel(&dev, ChannelConfig::default());
    chan.handshake().expect("handshake");

    chan.execute(&FuncReset).expect("reset");

    let reset = &dev.requests()[1];
    assert_eq!(reset.opcode, Opcode::FUNC_RESET);
    assert_eq!(reset.short.expect("short").size.get(), 24);
}

#[test]
fn supported_without_required_keeps_direct_form() {
    init_logging();
    let mut ver = modern_firmware();
    ver.dev_caps_cfg.set(DevCapsCfg::SHORT_CMD_SUPPORTED.bits());
    ver.def_req_timeout.set(750);
    let dev = firmware(ver);
    let chan = channel(&dev, ChannelConfig::default());

    let info = chan.handshake().expect("handshake");
    chan.execute(&FuncReset).expect("reset");

    assert!(!info.caps.short_cmd_required());
    assert!(dev.requests()[1].short.is_none());
    assert_eq!(chan.timeout_ms(), 750);
}

#[test]
fn pre_one_zero_firmware_keeps_default_limits() {
    init_logging();
    let mut ver = modern_firmware();
    (ver.hwrm_intf_maj, ver.hwrm_intf_min, ver.hwrm_intf_upd) = (0, 9, 0);
    ver.dev_caps_cfg.set(0);
    ver.active_pkg_name = [0; 16];
    let dev = firmware(ver);
    let chan = channel(&dev, ChannelConfig::default());

    let info = chan.handshake().expect("handshake");

    assert_eq!(info.fw_version.as_str(), "218.0.169.0");
    assert_eq!(chan.limits().max_req_len, 128);
    assert_eq!(chan.limits().max_ext_req_len, 128);
}

#[test]
fn old_spec_uses_legacy_version_fields() {
    init_logging();
    let mut ver = modern_firmware();
    (ver.hwrm_intf_maj, ver.hwrm_intf_min, ver.hwrm_intf_upd) = (1, 8, 3);
    ver.hwrm_fw_rsvd_8b = 9;
    ver.active_pkg_name = [0; 16];
    let dev = firmware(ver);
    let chan = channel(&dev, ChannelConfig::default());

    let info = chan.handshake().expect("handshake");
    assert_eq!(info.fw_version.as_str(), "218.0.169.9");
}

#[test]
fn tiny_extended_limit_is_raised_to_default() {
    init_logging();
    let mut ver = modern_firmware();
    ver.max_ext_req_len.set(0);
    let dev = firmware(ver);
    let chan = channel(&dev, ChannelConfig::default());

    chan.handshake().expect("handshake");
    assert_eq!(chan.limits().max_ext_req_len, 128);
    assert!(chan.execute(&Raw::<200>(0)).is_err());
}

#[test]
fn handshake_uses_fixed_budget() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Stall);
    let chan = channel(&dev, ChannelConfig::default().with_timeout_ms(50));

    let err = chan.handshake().unwrap_err();

    assert!(matches!(
        err,
        HwrmError::Timeout {
            stage: PollStage::Length,
            timeout_ms: 1000,
            ..
        }
    ));
    assert_eq!(dev.elapsed_ms(), 1000);
    assert!(chan.capabilities().is_none());
}

#[test]
fn registration_commands_encode_their_fields() {
    init_logging();
    let dev = SimDevice::always_ok();
    let chan = channel(&dev, ChannelConfig::default());

    chan.execute(&DriverRegister {
        os_type: 0x2a,
        version: (1, 2, 3),
    })
    .expect("register");
    chan.execute(&DriverUnregister { shutdown: true })
        .expect("unregister");
    chan.execute(&FuncReset).expect("reset");

    let requests = dev.requests();
    let rgtr: FuncDrvRgtrInput = requests[0].parse();
    assert_eq!(requests[0].opcode, Opcode::FUNC_DRV_RGTR);
    assert_eq!(rgtr.enables.get(), 0x3);
    assert_eq!(rgtr.os_type.get(), 0x2a);
    assert_eq!((rgtr.ver_maj, rgtr.ver_min, rgtr.ver_upd), (1, 2, 3));

    let unrgtr: FuncDrvUnrgtrInput = requests[1].parse();
    assert_eq!(requests[1].opcode, Opcode::FUNC_DRV_UNRGTR);
    assert_eq!(unrgtr.flags.get(), 0x1);

    let reset: FuncResetInput = requests[2].parse();
    assert_eq!(requests[2].opcode, Opcode::FUNC_RESET);
    assert_eq!(reset.enables.get(), 0);
}
