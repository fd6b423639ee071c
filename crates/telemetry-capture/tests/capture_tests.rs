//! Live capture, recording and cancellation over loopback UDP.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use f1_telemetry_capture::protocol::fixtures::{self, PlayerTelemetry};
use f1_telemetry_capture::protocol::{Packet, PacketHeader, PacketKind, PacketRegistry};
use f1_telemetry_capture::{
    CaptureError, CaptureOptions, FlushPolicy, LiveSource, LogReader, LogWriter, PacketSource,
    Recorder, ReplaySource, Source, SourceConfig,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn loopback() -> SocketAddr {
    (Ipv4Addr::LOCALHOST, 0).into()
}

fn join(handle: thread::JoinHandle<()>) -> Result<(), String> {
    handle
        .join()
        .map_err(|panic| format!("helper thread panicked: {panic:?}"))
}

#[test]
fn live_car_telemetry_datagram_decodes() -> TestResult {
    let mut live = LiveSource::bind(loopback())?;
    let header = PacketHeader {
        session_uid: 77,
        frame_identifier: 9,
        player_car_index: 0,
        ..PacketHeader::f1_25(6)
    };
    let datagram = fixtures::car_telemetry_packet(
        &header,
        &PlayerTelemetry {
            speed_kmh: 250,
            gear: 6,
            ..PlayerTelemetry::default()
        },
    )?;
    UdpSocket::bind(loopback())?.send_to(&datagram, live.local_addr())?;

    let packet = live.next_packet()?.ok_or("live source ended")?;
    assert_eq!(*packet.header(), header);
    let Packet::CarTelemetry(telemetry) = packet else {
        return Err("expected car telemetry".into());
    };
    assert_eq!(telemetry.player().map(|p| p.speed), Some(250));
    Ok(())
}

#[test]
fn live_decode_error_leaves_source_usable() -> TestResult {
    let mut live = LiveSource::bind(loopback())?;
    let sender = UdpSocket::bind(loopback())?;
    sender.send_to(&[0u8; 24], live.local_addr())?;
    sender.send_to(&fixtures::f1_25_packet(PacketKind::Event)?, live.local_addr())?;

    assert!(matches!(live.next_packet(), Err(e) if e.is_decode()));
    assert!(live.next_packet()?.is_some());
    Ok(())
}

#[test]
fn closing_blocked_live_source_yields_closed() -> TestResult {
    let mut live = LiveSource::bind(loopback())?;
    let handle = live.close_handle();
    let closer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        handle.close();
    });

    let started = Instant::now();
    let result = live.receive().map(<[u8]>::len);
    join(closer)?;
    assert!(matches!(result, Err(CaptureError::Closed)), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(10));
    Ok(())
}

#[test]
fn closing_waiting_replay_yields_closed() -> TestResult {
    let mut writer = LogWriter::new(Vec::new());
    writer.append(0.0, &[1])?;
    writer.append(60.0, &[2])?;
    let mut replay = ReplaySource::from_reader(std::io::Cursor::new(writer.into_inner()));
    assert!(replay.next_datagram()?.is_some());

    let handle = replay.close_handle();
    let closer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        handle.close();
    });
    let started = Instant::now();
    let result = replay.next_datagram().map(|d| d.map(<[u8]>::to_vec));
    join(closer)?;
    assert!(matches!(result, Err(CaptureError::Closed)), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(10));
    Ok(())
}

#[test]
fn recorded_session_replays_identically() -> TestResult {
    let dir = tempfile::tempdir()?;
    let live = LiveSource::bind(loopback())?;
    let target = live.local_addr();
    let mut recorder = Recorder::create_in(live, dir.path())?;

    let sender = UdpSocket::bind(loopback())?;
    let payloads: Vec<Vec<u8>> = vec![vec![0xAA; 8], vec![0xBB; 4], vec![0xCC; 1352]];
    for payload in &payloads {
        sender.send_to(payload, target)?;
        recorder.receive()?;
        thread::sleep(Duration::from_millis(20));
    }
    recorder.close()?;
    let path = recorder.path().ok_or("recorder has no path")?.to_path_buf();

    let records: Vec<_> = LogReader::new(std::fs::File::open(&path)?).collect::<Result<_, _>>()?;
    assert_eq!(records.len(), payloads.len());
    assert_eq!(records.first().map(|r| r.timestamp), Some(0.0));
    assert!(records.windows(2).all(|w| matches!(w, [a, b] if a.timestamp <= b.timestamp)));

    let mut replay = ReplaySource::open(&path)?.with_speed(10.0);
    for expected in &payloads {
        assert_eq!(replay.next_datagram()?, Some(expected.as_slice()));
    }
    assert_eq!(replay.next_datagram()?, None);
    Ok(())
}

#[test]
fn every_record_policy_is_visible_before_close() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.tlm");
    let live = LiveSource::bind(loopback())?;
    let target = live.local_addr();
    let mut recorder = Recorder::create(live, &path)?;
    assert_eq!(recorder.flush_policy(), FlushPolicy::EveryRecord);

    UdpSocket::bind(loopback())?.send_to(&[7; 10], target)?;
    recorder.receive()?;
    assert_eq!(std::fs::metadata(&path)?.len(), 12 + 10);
    Ok(())
}

#[test]
fn source_open_follows_configuration() -> TestResult {
    let dir = tempfile::tempdir()?;
    let options = CaptureOptions {
        bind_address: Some(Ipv4Addr::LOCALHOST.into()),
        port: Some(free_port()?),
        record: true,
        record_dir: dir.path().join("logs"),
        ..CaptureOptions::default()
    };
    let config = options.resolve()?;
    let source = Source::open(&config, Arc::new(PacketRegistry::f1_25()))?;
    assert_eq!(source.kind(), "recording");
    drop(source);

    let replay = SourceConfig::Replay {
        path: dir.path().join("missing.tlm"),
        speed: 1.0,
    };
    assert!(matches!(
        Source::open(&replay, Arc::new(PacketRegistry::f1_25())),
        Err(CaptureError::Log { .. })
    ));
    Ok(())
}

fn free_port() -> Result<u16, std::io::Error> {
    Ok(UdpSocket::bind(loopback())?.local_addr()?.port())
}
