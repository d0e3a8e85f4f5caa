// CLASSIFICATION: COMMUNITY
// Filename: test_transport.rs v0.1
// Date Modified: 2026-10-16
// Author: Lukas Bower

mod common;

use bnxt_hwrm::sim::{SimDevice, SimReply, SIM_RESP_ADDR, SIM_STAGING_ADDR};
use bnxt_hwrm::wire::{FwStatus, RequestHeader, DOORBELL_OFFSET, SHORT_CMD_SIGNATURE};
use bnxt_hwrm::{ChannelConfig, ErrorKind, HwrmError, PollStage, TransportState};
use common::{channel, init_logging, Raw};
use proptest::prelude::*;

fn window_256() -> ChannelConfig {
    ChannelConfig::default().with_max_req_len(256)
}

#[test]
fn direct_request_fills_window_then_rings_doorbell() {
    init_logging();
    let dev = SimDevice::always_ok();
    let chan = channel(&dev, window_256());

    chan.execute(&Raw::<128>(0x5a)).expect("send");

    let writes = dev.window_writes();
    assert_eq!(writes.len(), 256 / 4 + 1);
    assert_eq!(writes.last(), Some(&(DOORBELL_OFFSET, 1)));
    for (idx, (offset, _)) in writes[..64].iter().enumerate() {
        assert_eq!(*offset, idx * 4);
    }

    let window = dev.window_bytes();
    let seen = &dev.requests()[0];
    assert!(seen.short.is_none());
    assert_eq!(&window[..128], &seen.bytes[..128]);
    assert!(window[16..128].iter().all(|&b| b == 0x5a));
    assert!(window[128..256].iter().all(|&b| b == 0));

    let header: RequestHeader = seen.parse();
    assert_eq!(header.req_type.get(), 0x0016);
    assert_eq!(header.cmpl_ring.get(), 0xffff);
    assert_eq!(header.target_id.get(), 0xffff);
    assert_eq!(header.resp_addr.get(), SIM_RESP_ADDR);
}

#[test]
fn oversized_request_switches_to_short_form() {
    init_logging();
    let dev = SimDevice::always_ok();
    let chan = channel(&dev, window_256().with_max_ext_req_len(512));
    dev.poke(SIM_STAGING_ADDR, &[0xff; 600]);

    chan.execute(&Raw::<300>(0x11)).expect("send");

    let seen = &dev.requests()[0];
    let desc = seen.short.expect("short descriptor");
    assert_eq!(desc.signature.get(), SHORT_CMD_SIGNATURE);
    assert_eq!(desc.size.get(), 300);
    assert_eq!(desc.req_type.get(), 0x0016);
    assert_eq!(desc.req_addr.get(), SIM_STAGING_ADDR);

    let staged = dev.region_bytes(SIM_STAGING_ADDR);
    assert_eq!(&staged[..300], seen.bytes.as_slice());
    assert!(staged[16..300].iter().all(|&b| b == 0x11));
    assert!(staged[300..512].iter().all(|&b| b == 0));
    assert!(staged[512..600].iter().all(|&b| b == 0xff));

    // Descriptor words only, then the doorbell.
    let writes = dev.window_writes();
    assert_eq!(writes.len(), 5);
    assert_eq!(writes[4], (DOORBELL_OFFSET, 1));
}

#[test]
fn firmware_mandated_short_form_applies_to_small_requests() {
    init_logging();
    let dev = SimDevice::always_ok();
    let chan = channel(&dev, ChannelConfig::default().with_short_cmd_required(true));

    chan.execute(&Raw::<24>(0x22)).expect("send");

    let desc = dev.requests()[0].short.expect("short descriptor");
    assert_eq!(desc.size.get(), 24);
    let staged = dev.region_bytes(SIM_STAGING_ADDR);
    assert!(staged[24..128].iter().all(|&b| b == 0));
}

#[test]
fn valid_response_is_returned_in_full() {
    init_logging();
    let dev = SimDevice::new(|_| {
        let mut body = vec![0u8; 64];
        for (idx, byte) in body.iter_mut().enumerate().skip(8) {
            *byte = idx as u8;
        }
        SimReply::Respond(body)
    });
    let chan = channel(&dev, ChannelConfig::default());

    let resp = chan.execute(&Raw::<32>(0)).expect("send");

    assert_eq!(resp.len(), 64);
    assert_eq!(u16::from_le_bytes([resp[0], resp[1]]), 0);
    assert_eq!(u16::from_le_bytes([resp[6], resp[7]]), 64);
    assert_eq!(resp[63], 1);
    assert_eq!(&resp[8..12], &[8, 9, 10, 11]);
    assert_eq!(chan.last_state(), TransportState::Success);
}

#[test]
fn silent_firmware_times_out_on_length() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Stall);
    let chan = channel(&dev, ChannelConfig::default().with_timeout_ms(1000));

    let err = chan.execute(&Raw::<16>(0)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(matches!(
        err,
        HwrmError::Timeout {
            stage: PollStage::Length,
            timeout_ms: 1000,
            ..
        }
    ));
    assert_eq!(dev.elapsed_ms(), 1000);
    assert_eq!(dev.window_writes().last(), Some(&(DOORBELL_OFFSET, 1)));
    assert_eq!(chan.last_state(), TransportState::Timeout);
}

#[test]
fn missing_marker_times_out_on_valid_stage() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::StallMarker(vec![0; 32]));
    let chan = channel(&dev, ChannelConfig::default().with_timeout_ms(40));

    let err = chan.execute(&Raw::<16>(0)).unwrap_err();

    assert!(matches!(
        err,
        HwrmError::Timeout {
            stage: PollStage::ValidMarker,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(dev.elapsed_ms(), 40);
}

#[test]
fn implausible_length_is_not_completion() {
    init_logging();
    let dev = SimDevice::new(|_| {
        let mut raw = vec![0u8; 16];
        raw[6..8].copy_from_slice(&5000u16.to_le_bytes());
        raw[15] = 1;
        SimReply::RespondRaw(raw)
    });
    let chan = channel(&dev, ChannelConfig::default().with_timeout_ms(25));

    let err = chan.execute(&Raw::<16>(0)).unwrap_err();
    assert!(matches!(
        err,
        HwrmError::Timeout {
            stage: PollStage::Length,
            ..
        }
    ));
}

#[test]
fn late_response_completes_within_budget() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Deferred {
        length_after_ms: 5,
        valid_after_ms: 9,
        bytes: vec![0; 24],
    });
    let chan = channel(&dev, ChannelConfig::default().with_timeout_ms(100));

    let resp = chan.execute(&Raw::<16>(0)).expect("send");

    assert_eq!(resp.len(), 24);
    assert_eq!(dev.elapsed_ms(), 9);
}

#[test]
fn firmware_status_is_mapped() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Status(FwStatus::RESOURCE_ALLOC_ERROR));
    let chan = channel(&dev, ChannelConfig::default());

    let err = chan.execute(&Raw::<16>(0)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OutOfResources);
    assert_eq!(err.status(), Some(FwStatus::RESOURCE_ALLOC_ERROR));
    assert_eq!(chan.last_state(), TransportState::FirmwareError);
}

#[test]
fn repeated_sends_get_fresh_sequence_numbers() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Respond(vec![0x33; 32]));
    let chan = channel(&dev, ChannelConfig::default());

    let first = chan.execute(&Raw::<48>(7)).expect("first");
    let second = chan.execute(&Raw::<48>(7)).expect("second");

    let seqs: Vec<u16> = dev.requests().iter().map(|req| req.seq).collect();
    assert_eq!(seqs, vec![0, 1]);
    assert_eq!(u16::from_le_bytes([first[4], first[5]]), 0);
    assert_eq!(u16::from_le_bytes([second[4], second[5]]), 1);
    assert_eq!(&first[8..31], &second[8..31]);
    assert_eq!(chan.next_seq(), 2);
}

#[test]
fn response_buffer_is_cleared_before_each_send() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Respond(vec![0xee; 64]));
    let chan = channel(&dev, ChannelConfig::default());
    chan.execute(&Raw::<16>(0)).expect("long reply");

    dev.set_firmware(|_| SimReply::ok());
    let resp = chan.execute(&Raw::<16>(0)).expect("short reply");

    assert_eq!(resp.len(), 16);
    let buffer = dev.region_bytes(SIM_RESP_ADDR);
    assert!(buffer[16..64].iter().all(|&b| b == 0));
}

#[test]
fn per_call_budget_does_not_stick() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Stall);
    let chan = channel(&dev, ChannelConfig::default().with_timeout_ms(30));

    let err = chan.execute_with_timeout(&Raw::<16>(0), 5).unwrap_err();
    assert!(matches!(err, HwrmError::Timeout { timeout_ms: 5, .. }));
    assert_eq!(chan.timeout_ms(), 30);

    let before = dev.elapsed_ms();
    chan.execute(&Raw::<16>(0)).unwrap_err();
    assert_eq!(dev.elapsed_ms() - before, 30);
}

#[test]
fn lowered_default_budget_bounds_later_calls() {
    init_logging();
    let dev = SimDevice::new(|_| SimReply::Stall);
    let chan = channel(&dev, ChannelConfig::default());
    assert_eq!(chan.timeout_ms(), 1000);

    chan.set_timeout_ms(20);
    let err = chan.execute(&Raw::<16>(0)).unwrap_err();
    assert!(matches!(
        err,
        HwrmError::Timeout {
            stage: PollStage::Length,
            timeout_ms: 20,
            ..
        }
    ));
    assert_eq!(dev.elapsed_ms(), 20);

    let before = dev.elapsed_ms();
    chan.execute(&Raw::<16>(0)).unwrap_err();
    assert_eq!(dev.elapsed_ms() - before, 20);
    assert_eq!(chan.timeout_ms(), 20);
}

#[test]
fn request_larger_than_any_path_is_rejected() {
    init_logging();
    let dev = SimDevice::always_ok();
    let chan = channel(&dev, ChannelConfig::default());

    let err = chan.execute(&Raw::<200>(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(dev.doorbells(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn window_holds_request_then_zeros(len in 16usize..=128, fill in any::<u8>()) {
        let dev = SimDevice::always_ok();
        let chan = channel(&dev, ChannelConfig::default());
        let mut stale = vec![0xffu8; 128];
        chan.passthrough(&mut stale, &mut [], 0).expect("stale");

        let mut req = vec![fill; len];
        req[..2].copy_from_slice(&0x0016u16.to_le_bytes());
        chan.passthrough(&mut req, &mut [], 0).expect("send");

        let window = dev.window_bytes();
        prop_assert_eq!(&window[..len], req.as_slice());
        prop_assert!(window[len..128].iter().all(|&b| b == 0));
    }
}
