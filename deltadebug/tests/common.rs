#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Offset of the 16 code bytes inside [`tiny_elf`].
pub const CODE_OFFSET: usize = 120;

/// Little-endian ELF64 for aarch64: header, one PT_LOAD, 16 code bytes
/// (`i * 17`), a null section and a `.text`-like section of type
/// `code_type` covering the code. 264 bytes.
pub fn tiny_elf(code_type: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&0xb7u16.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&0x400078u64.to_le_bytes());
    out.extend_from_slice(&64u64.to_le_bytes());
    out.extend_from_slice(&136u64.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    for half in [64u16, 56, 1, 64, 2, 0] {
        out.extend_from_slice(&half.to_le_bytes());
    }

    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&5u32.to_le_bytes());
    for word in [120u64, 0x400078, 0x400078, 16, 16, 0x1000] {
        out.extend_from_slice(&word.to_le_bytes());
    }

    out.extend((0u8..16).map(|b| b.wrapping_mul(17)));

    out.extend_from_slice(&[0; 64]);
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&code_type.to_le_bytes());
    for word in [6u64, 0x400078, 120, 16, 0, 4, 0] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    assert_eq!(out.len(), 264);
    out
}

/// `sh -c 'cat "$1"' sh`: echoes the appended candidate to stdout.
pub fn cat_command() -> Vec<String> {
    ["sh", "-c", "cat \"$1\"", "sh"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}
