use std::io::BufRead;

use crate::frame::Frame;

/// Frames read from newline-delimited JSON, one device frame per line.
///
/// Lines that fail to decode are logged and skipped. A read error ends the
/// stream.
pub struct JsonLinesSource<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    skipped: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Number of non-blank lines that did not decode into a frame.
    #[inline]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!("frame source: read failed after line {}: {}", self.line_no, err);
                    return None;
                }
            };
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match Frame::from_json(line) {
                Ok(frame) => return Some(frame),
                Err(err) => {
                    self.skipped += 1;
                    tracing::warn!("frame source: wrong format at line {}: {}", self.line_no, err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_blank_and_malformed_lines() {
        let input = concat!(
            r#"{"id": 1, "timestamp": 1000, "pointables": [{"id": 5, "handId": 2, "tipPosition": [1, 2, 3]}]}"#,
            "\n\n",
            "garbage\n",
            r#"{"id": 2, "timestamp": 2000, "pointables": []}"#,
            "\n",
        );

        let mut source = JsonLinesSource::new(Cursor::new(input));
        let frames: Vec<_> = source.by_ref().collect();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].pointables[0].tip_position, [1.0, 2.0, 3.0]);
        assert_eq!(frames[1].timestamp, 2000);
        assert_eq!(source.skipped(), 1);
    }
}
