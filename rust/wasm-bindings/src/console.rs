// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routes `tracing` events to the browser console
//!
//! Dropped records and faces are logged as warnings by the reconstruction
//! crates; in the browser they show up through `console.warn`.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Install the console subscriber once; later calls are no-ops
pub fn init_logging(max_level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_max_level(max_level)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Buffers one formatted event and hands it to the console on drop
pub struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let Some(text) = event_text(&self.buffer) else {
            return;
        };
        let text = wasm_bindgen::JsValue::from_str(&text);
        match self.level {
            Level::ERROR => web_sys::console::error_1(&text),
            Level::WARN => web_sys::console::warn_1(&text),
            Level::INFO => web_sys::console::info_1(&text),
            _ => web_sys::console::debug_1(&text),
        }
    }
}

pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buffer: Vec::new(),
        }
    }
}

/// Formatted event without its trailing newline; `None` when blank
fn event_text(buffer: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(buffer);
    let text = text.trim_end();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_text() {
        assert_eq!(event_text(b"WARN dropping face: loop #29\n").as_deref(), Some("WARN dropping face: loop #29"));
        assert_eq!(event_text(b"\n"), None);
        assert_eq!(event_text(b""), None);
    }
}
