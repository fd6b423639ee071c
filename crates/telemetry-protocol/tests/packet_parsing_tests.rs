//! Registry dispatch tests over full-size F1 25 datagrams.

use f1_telemetry_protocol::fixtures::{self, PlayerTelemetry};
use f1_telemetry_protocol::packets::EventDetails;
use f1_telemetry_protocol::{
    DecodeError, HEADER_SIZE, Packet, PacketHeader, PacketKind, PacketRegistry, RegistryKey,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn header(packet_id: u8) -> PacketHeader {
    PacketHeader {
        session_uid: 0xDEAD_BEEF_0000_0001,
        session_time: 42.5,
        frame_identifier: 1200,
        overall_frame_identifier: 1210,
        player_car_index: 3,
        ..PacketHeader::f1_25(packet_id)
    }
}

#[test]
fn car_telemetry_datagram_decodes_with_matching_header() -> TestResult {
    let hdr = header(6);
    let sample = PlayerTelemetry {
        speed_kmh: 287,
        throttle: 0.95,
        brake: 0.0,
        gear: 7,
        engine_rpm: 11_500,
        drs: 1,
    };
    let raw = fixtures::car_telemetry_packet(&hdr, &sample)?;
    assert_eq!(raw.len(), 1352);

    let packet = PacketRegistry::f1_25().decode(&raw)?;
    assert_eq!(packet.kind(), PacketKind::CarTelemetry);
    assert_eq!(*packet.header(), hdr);

    let Packet::CarTelemetry(telemetry) = packet else {
        return Err("expected car telemetry".into());
    };
    assert_eq!(telemetry.car_telemetry_data.len(), 22);
    let player = telemetry.player().ok_or("missing player")?;
    assert_eq!(player.speed, 287);
    assert_eq!(player.gear, 7);
    assert_eq!(player.drs, 1);
    assert!((player.throttle - 0.95).abs() < f32::EPSILON);
    Ok(())
}

#[test]
fn header_only_datagram_is_malformed_for_fixed_size_kind() {
    let mut raw = Vec::new();
    header(6).write_to(&mut raw);
    let result = PacketRegistry::f1_25().decode(&raw);
    assert_eq!(
        result,
        Err(DecodeError::Malformed {
            key: RegistryKey::new(2025, 1, 6),
            expected: 1352,
            actual: HEADER_SIZE,
        })
    );
}

#[test]
fn twenty_four_byte_datagram_is_truncated() {
    let mut raw = Vec::new();
    header(6).write_to(&mut raw);
    raw.truncate(24);
    assert_eq!(
        PacketRegistry::f1_25().decode(&raw),
        Err(DecodeError::Truncated {
            needed: HEADER_SIZE,
            available: 24
        })
    );
}

#[test]
fn oversized_datagram_is_malformed() -> TestResult {
    let mut raw = fixtures::f1_25_packet(PacketKind::Event)?;
    raw.push(0);
    let err = PacketRegistry::f1_25()
        .decode(&raw)
        .err()
        .ok_or("expected an error")?;
    assert!(matches!(
        err,
        DecodeError::Malformed {
            expected: 45,
            actual: 46,
            ..
        }
    ));
    Ok(())
}

#[test]
fn unknown_packet_id_is_reported_with_key() -> TestResult {
    let raw = fixtures::zeroed_packet(&PacketHeader::f1_25(42), 100);
    let err = PacketRegistry::f1_25()
        .decode(&raw)
        .err()
        .ok_or("expected an error")?;
    assert_eq!(
        err,
        DecodeError::UnknownPacketType(RegistryKey::new(2025, 1, 42))
    );
    Ok(())
}

#[test]
fn older_packet_format_is_unknown_until_registered() -> TestResult {
    let hdr = PacketHeader {
        packet_format: 2024,
        ..PacketHeader::f1_25(3)
    };
    let mut raw = fixtures::zeroed_packet(&hdr, 45);
    fixtures::write_at(&mut raw, HEADER_SIZE, b"SSTA")?;

    let mut registry = PacketRegistry::f1_25();
    assert!(matches!(
        registry.decode(&raw),
        Err(DecodeError::UnknownPacketType(_))
    ));

    let event = *registry.lookup(RegistryKey::f1_25(3))?;
    registry.register(hdr.registry_key(), event);
    let Packet::Event(packet) = registry.decode(&raw)? else {
        return Err("expected event".into());
    };
    assert_eq!(packet.details, EventDetails::SessionStarted);
    assert_eq!(packet.header.packet_format, 2024);
    Ok(())
}

#[test]
fn script_startup_accepts_any_payload_length() -> TestResult {
    let registry = PacketRegistry::f1_25();
    for note in ["", "f1ctl", "collector started on port 20777"] {
        let raw = f1_telemetry_protocol::packets::ScriptStartupPacket::encode(
            &PacketHeader::f1_25(99),
            note,
        );
        let Packet::ScriptStartup(packet) = registry.decode(&raw)? else {
            return Err("expected script startup".into());
        };
        assert_eq!(packet.note, note);
    }
    Ok(())
}

#[test]
fn header_decode_is_deterministic() -> TestResult {
    let raw = fixtures::f1_25_packet(PacketKind::LapData)?;
    let first = PacketHeader::decode(&raw)?;
    for _ in 0..10 {
        assert_eq!(PacketHeader::decode(&raw)?, first);
    }
    Ok(())
}

#[test]
fn decoded_packets_serialize_with_kind_tag() -> TestResult {
    let mut raw = fixtures::f1_25_packet(PacketKind::Event)?;
    fixtures::write_at(&mut raw, HEADER_SIZE, b"CHQF")?;
    let packet = PacketRegistry::f1_25().decode(&raw)?;
    let json = serde_json::to_value(&packet)?;
    assert_eq!(json["kind"], "event");
    assert_eq!(json["event_string_code"], "CHQF");
    assert_eq!(json["details"]["event"], "ChequeredFlag");
    Ok(())
}
