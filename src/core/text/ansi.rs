//! ANSI escape recognition.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiCodeKind {
    Csi,
    Osc,
    Apc,
    Ss3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiCode {
    pub length: usize,
    pub kind: AnsiCodeKind,
}

/// Recognizes an escape sequence starting at byte `pos`.
pub fn extract_ansi_code(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    match bytes[pos + 1] {
        b'[' => extract_csi(bytes, pos),
        b']' => extract_string_terminated(bytes, pos, AnsiCodeKind::Osc),
        b'_' => extract_string_terminated(bytes, pos, AnsiCodeKind::Apc),
        b'O' if pos + 2 < bytes.len() => Some(AnsiCode {
            length: 3,
            kind: AnsiCodeKind::Ss3,
        }),
        _ => None,
    }
}

fn extract_csi(bytes: &[u8], pos: usize) -> Option<AnsiCode> {
    let end = bytes[pos + 2..]
        .iter()
        .position(|b| (0x40..=0x7e).contains(b))?;
    Some(AnsiCode {
        length: end + 3,
        kind: AnsiCodeKind::Csi,
    })
}

fn extract_string_terminated(bytes: &[u8], pos: usize, kind: AnsiCodeKind) -> Option<AnsiCode> {
    let mut idx = pos + 2;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            return Some(AnsiCode {
                length: idx + 1 - pos,
                kind,
            });
        }
        if bytes[idx] == 0x1b && idx + 1 < bytes.len() && bytes[idx + 1] == b'\\' {
            return Some(AnsiCode {
                length: idx + 2 - pos,
                kind,
            });
        }
        idx += 1;
    }
    None
}

/// Removes every recognized escape sequence.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(code) = extract_ansi_code(input, idx) {
            idx += code.length;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}
