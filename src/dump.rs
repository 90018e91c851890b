//! Human-readable dumps of segments for debugging.

use std::fmt::Write;

use crate::{Address, AddrSeg};

const BYTES_PER_ROW: usize = 16;

/// Describe `seg` and, when readable, its contents as hex rows.
///
/// ```text
/// AddrSeg 0x100..=0x103 (4 units)
///   0x100: 01 02 03 04
/// ```
pub fn describe<A: Address>(seg: AddrSeg<A>, data: Option<&[u8]>) -> String {
    let mut out = format!("AddrSeg {seg}\n");

    let Some(data) = data else {
        out.push_str("  <no data>\n");
        return out;
    };

    let mut addr = Some(seg.start);
    for row in data.chunks(BYTES_PER_ROW) {
        match addr {
            Some(a) => {
                let _ = write!(out, "  {a:#X}:");
            }
            None => out.push_str("  ?:"),
        }
        for byte in row {
            let _ = write!(out, " {byte:02X}");
        }
        out.push('\n');
        addr = addr
            .zip(A::from_usize(row.len()))
            .and_then(|(a, n)| a.checked_add(n));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_rows() {
        let seg = AddrSeg::from_addr_size(0x100u16, 18);
        let data: Vec<u8> = (0..18).collect();
        let text = describe(seg, Some(&data));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "AddrSeg 0x100..=0x111 (18 units)");
        assert_eq!(
            lines[1],
            "  0x100: 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F"
        );
        assert_eq!(lines[2], "  0x110: 10 11");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_describe_without_data() {
        let text = describe(AddrSeg::<u8>::default(), None);
        assert_eq!(text, "AddrSeg <invalid 0x0+0x0>\n  <no data>\n");
    }
}
