//! Console transport implementation

use crate::core::{LogRecord, Result, Transport, TransportOptions};
use async_trait::async_trait;
use colored::{Color, Colorize};

/// Writes rendered output to the terminal
///
/// Records below the threshold are skipped. `warn`, `error` and `fatal` go to
/// stderr, everything else to stdout. Output is written immediately; the
/// console has no ordering requirement relative to other transports.
#[derive(Debug, Clone)]
pub struct ConsoleTransport {
    use_colors: bool,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn render(&self, record: &LogRecord) -> String {
        if !self.use_colors {
            return record.output().to_string();
        }
        match parse_hex(record.level().color()) {
            Some(color) => record.output().color(color).to_string(),
            None => record.output().to_string(),
        }
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn deliver(&self, record: &LogRecord, options: TransportOptions) -> Result<()> {
        if record.level().rank() < options.threshold {
            return Ok(());
        }

        let output = self.render(record);
        match record.level().name() {
            "warn" | "error" | "fatal" => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// `#rrggbb` (or `rrggbb`) to a true color
fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::TrueColor {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(
            parse_hex("#ffcc00"),
            Some(Color::TrueColor {
                r: 255,
                g: 204,
                b: 0
            })
        );
        assert_eq!(parse_hex("a70000"), Some(Color::TrueColor { r: 167, g: 0, b: 0 }));
        assert_eq!(parse_hex("red"), None);
        assert_eq!(parse_hex("#zz0000"), None);
    }
}
