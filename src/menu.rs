//! Settings menu presenter.
//!
//! Pure rendering: a fixed sequence of lines derived from the current
//! [`SettingsRecord`], written through the [`ConsoleOut`] port. No state,
//! no error conditions.

use core::fmt::Write;

use crate::app::ports::ConsoleOut;
use crate::settings::SettingsRecord;

/// Render the full settings view: banner, current values, help footer.
pub fn render(settings: &SettingsRecord, out: &mut impl ConsoleOut) {
    out.write_line("");
    out.write_line("====== EtherPower Settings Menu ========");
    out.write_line("=      Current values are shown        =");
    out.write_line("=      Send new values like P=80       =");
    out.write_line("=      with a carriage return          =");
    out.write_line("========================================");
    out.write_line("");

    let mut line: heapless::String<96> = heapless::String::new();

    let _ = write!(
        line,
        "I={} (server IP address; octets A= to D=)",
        format_address(&settings.server_address)
    );
    out.write_line(&line);
    line.clear();

    let _ = write!(
        line,
        "N={} (server netmask; prefix length N=)",
        format_address(&settings.server_netmask)
    );
    out.write_line(&line);
    line.clear();

    let _ = write!(
        line,
        "P={} (server port; port 80 is default for HTTP)",
        settings.server_port
    );
    out.write_line(&line);
    line.clear();

    let _ = write!(
        line,
        "M={} (hardware MAC address; last byte M=)",
        format_identity(&settings.hardware_identity)
    );
    out.write_line(&line);

    out.write_line("");
    out.write_line("(Send...)");
    out.write_line("  ? to show current settings");
    out.write_line("  R to reset everything to defaults");
    out.write_line("  ! to reboot");
    out.write_line("");
}

/// Dotted-quad rendering, shared by the address and netmask lines.
pub fn format_address(octets: &[u8; 4]) -> heapless::String<15> {
    let mut s = heapless::String::new();
    let _ = write!(s, "{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3]);
    s
}

/// Colon-separated uppercase hex MAC rendering.
pub fn format_identity(identity: &[u8; 6]) -> heapless::String<17> {
    let mut s = heapless::String::new();
    for (i, byte) in identity.iter().enumerate() {
        if i > 0 {
            let _ = s.push(':');
        }
        let _ = write!(s, "{byte:02X}");
    }
    s
}
