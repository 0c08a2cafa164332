//! Field notation used in ISSI string dumps.
//!
//! Binary values are written `%b0101`, hexadecimal values `%x0a3f`. Digit
//! counts are minimums: a value wider than the requested width is written in
//! full.

/// `%b0` or `%b1`.
pub fn binary_flag(value: u64) -> String {
    let flag = if value == 0 { "%b0" } else { "%b1" };
    flag.to_string()
}

/// `%b` followed by `digits` zero-padded binary digits.
pub fn binary(value: u64, digits: usize) -> String {
    format!("%b{value:0digits$b}")
}

/// `text: %b...`
pub fn text_binary(text: &str, value: u64, digits: usize) -> String {
    format!("{text}: {}", binary(value, digits))
}

/// `value (%b...)`
pub fn integer_binary(value: u64, digits: usize) -> String {
    format!("{value} ({})", binary(value, digits))
}

/// `text (%b...)`
pub fn text_integer_binary(text: &str, value: u64, digits: usize) -> String {
    format!("{text} ({})", binary(value, digits))
}

/// `%x` followed by `digits` zero-padded lower-case hex digits.
pub fn hex(value: u64, digits: usize) -> String {
    format!("%x{value:0digits$x}")
}

/// `value (%x...)`
pub fn integer_hex(value: u64, digits: usize) -> String {
    format!("{value} ({})", hex(value, digits))
}

/// `%x` followed by the first `nibbles` hex digits of `data`.
///
/// With an odd nibble count the low nibble of the last whole byte is appended.
pub fn hex_bytes(data: &[u8], nibbles: usize) -> String {
    let count = (nibbles / 2).min(data.len());
    let mut out = String::from("%x");
    for byte in &data[..count] {
        out.push_str(&format!("{byte:02x}"));
    }
    if nibbles % 2 != 0 && count > 0 {
        out.push_str(&format!("{:x}", data[count - 1] & 0x0F));
    }
    out
}
