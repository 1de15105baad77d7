//! Startup banner (WPBULK) with a vertical gradient, plus coloured output helpers.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Chat green (#25d366).
pub const CHAT_GREEN: (u8, u8, u8) = (0x25, 0xd3, 0x66);
/// Teal (#128c7e).
pub const TEAL: (u8, u8, u8) = (0x12, 0x8c, 0x7e);
pub const AMBER: (u8, u8, u8) = (0xff, 0xb3, 0x00);
pub const ALERT_RED: (u8, u8, u8) = (0xff, 0x45, 0x3a);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Print one line in the given colour.
pub fn print_colored(line: &str, (r, g, b): (u8, u8, u8)) {
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
    let _ = out.execute(Print(line));
    let _ = out.execute(Print("\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

/// `text` rendered in the standard figlet font, or plain if the font fails to load.
fn figlet_art(text: &str) -> String {
    let font = FIGfont::standard().ok();
    font.as_ref()
        .and_then(|f| f.convert(text))
        .map(|figure| figure.to_string())
        .unwrap_or_else(|| text.to_string())
}

/// "WPBULK" in the standard figlet font, teal fading into chat green, then the version.
pub fn print_welcome() {
    let art = figlet_art("WPBULK");
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        print_colored(line, lerp_rgb(TEAL, CHAT_GREEN, t));
    }

    print_colored(
        &format!("v{}  bulk messaging over web chat", env!("CARGO_PKG_VERSION")),
        CHAT_GREEN,
    );
}
