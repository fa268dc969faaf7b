use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Renders bytes as an offset-prefixed dump, sixteen bytes per line.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in bytes.chunks(BYTES_PER_LINE).enumerate() {
        if line > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:04x}:", line * BYTES_PER_LINE);
        for b in chunk {
            let _ = write!(out, " {b:02x}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[]), "");
        assert_eq!(hex(&[0xab, 0x01]), "0000: ab 01");
        let bytes: Vec<u8> = (0..18).collect();
        assert_eq!(
            hex(&bytes),
            "0000: 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f\n0010: 10 11"
        );
    }
}
