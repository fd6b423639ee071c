//! Property tests for the replay log codec and timed replay.

use std::io::Cursor;
use std::thread;
use std::time::{Duration, Instant};

use f1_telemetry_capture::{CaptureError, LogReader, LogWriter, ReplaySource};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Arbitrary bytes read as a log never panic and never loop forever.
    #[test]
    fn prop_arbitrary_log_bytes_never_panic(
        data in proptest::collection::vec(any::<u8>(), 0..4096)
    ) {
        let len = data.len();
        let mut reader = LogReader::new(Cursor::new(data));
        let mut frames = 0usize;
        while let Ok(Some(_)) = reader.next_record() {
            frames += 1;
            prop_assert!(frames <= len / 12);
        }
    }

    /// Whatever is written reads back as the same frames in the same order.
    #[test]
    fn prop_written_frames_read_back(
        frames in proptest::collection::vec(
            (0.0f64..10_000.0, proptest::collection::vec(any::<u8>(), 0..256)),
            0..32,
        )
    ) {
        let mut writer = LogWriter::new(Vec::new());
        for (timestamp, payload) in &frames {
            writer.append(*timestamp, payload).map_err(|e| TestCaseError::fail(e.to_string()))?;
        }
        let mut reader = LogReader::new(Cursor::new(writer.into_inner()));
        for (timestamp, payload) in &frames {
            let record = reader
                .next_record()
                .map_err(|e| TestCaseError::fail(e.to_string()))?
                .ok_or_else(|| TestCaseError::fail("log ended early"))?;
            prop_assert_eq!(record.timestamp.to_bits(), timestamp.to_bits());
            prop_assert_eq!(&record.payload, payload);
        }
        prop_assert!(reader.next_record().map_err(|e| TestCaseError::fail(e.to_string()))?.is_none());
        prop_assert!(!reader.truncated_tail());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any timestamp bit pattern replays without panicking; frames stamped
    /// far in the future are cut short by closing the source.
    #[test]
    fn prop_replay_survives_any_timestamp(bits in any::<u64>(), payload in any::<u8>()) {
        let timestamp = f64::from_bits(bits);
        let mut writer = LogWriter::new(Vec::new());
        writer.append(timestamp, &[payload]).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut replay = ReplaySource::from_reader(Cursor::new(writer.into_inner())).with_speed(10.0);

        let handle = replay.close_handle();
        let closer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.close();
        });
        let started = Instant::now();
        let result = replay.next_frame().map(|frame| frame.map(<[u8]>::to_vec));
        closer.join().map_err(|_| TestCaseError::fail("closer thread panicked"))?;

        match result {
            Ok(Some(frame)) => prop_assert_eq!(frame, vec![payload]),
            Err(CaptureError::Closed) => {}
            other => return Err(TestCaseError::fail(format!("unexpected {other:?}"))),
        }
        prop_assert!(started.elapsed() < Duration::from_secs(5));
    }
}
