#![no_main]

use flowgate_events::codec::{BinaryEventCodec, EventLimit};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut codec = BinaryEventCodec::new();

    // Loading must either succeed or fail with a logged error, never panic
    for limit in [EventLimit::HeaderOnly, EventLimit::First(16), EventLimit::All] {
        match codec.load_from_reader(Cursor::new(data), limit) {
            Ok(table) => {
                assert!(table.number_of_events() <= table.number_of_original_events());
                let mut buffer = Vec::new();
                let _ = codec.save_to_writer(table, &mut buffer, EventLimit::All);
            }
            Err(_) => assert!(codec.log().has_errors()),
        }
    }
});
