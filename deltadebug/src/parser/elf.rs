// PY_SOURCE: src/delta_debugging/parsers/kaitai_struct.py:KaitaiStructParser
// PY_SOURCE: src/delta_debugging/parsers/kaitai_structs/elf.py:parse_elf

use std::fmt;

use object::read::elf::{FileHeader, ProgramHeader, SectionHeader};
use object::{elf, Endianness, FileKind};
use tracing::warn;

use super::{Node, Parser};
use crate::{Error, Result};

/// Splits an ELF image into header, program header table, section contents
/// and section header table.
///
/// Images without any section contents (stripped section headers) fall back
/// to the file-backed part of each segment.
#[derive(Debug, Clone, Copy)]
pub struct ElfParser {
    expand_bytes: bool,
}

impl Default for ElfParser {
    fn default() -> Self {
        Self { expand_bytes: true }
    }
}

impl ElfParser {
    pub fn new(expand_bytes: bool) -> Self {
        Self { expand_bytes }
    }

    fn parse_elf<Elf: FileHeader<Endian = Endianness>>(&self, data: &[u8]) -> Result<Node> {
        let header = Elf::parse(data)?;
        let endian = header.endian()?;
        let limit = data.len();
        let span = |name: String, start: u64, len: u64, depth: usize| {
            let start = usize::try_from(start).unwrap_or(limit).min(limit);
            let end = usize::try_from(len)
                .ok()
                .and_then(|len| start.checked_add(len))
                .unwrap_or(limit)
                .min(limit);
            Node::new(name, start, end, depth)
        };

        let mut root = Node::new("ELF", 0, limit, 0);
        root.children.push(span(
            "ELF Header".to_string(),
            0,
            header.e_ehsize(endian).into(),
            1,
        ));

        let phoff: u64 = header.e_phoff(endian).into();
        let phentsize = u64::from(header.e_phentsize(endian));
        let segments = header.program_headers(endian, data)?;
        let pht_end = phoff + phentsize * segments.len() as u64;
        if !segments.is_empty() {
            let mut table = span(
                "Program Header Table".to_string(),
                phoff,
                pht_end - phoff,
                1,
            );
            for i in 0..segments.len() as u64 {
                table
                    .children
                    .push(span(format!("PHDR[{i}]"), phoff + i * phentsize, phentsize, 2));
            }
            root.children.push(table);
        }

        let sections = header.section_headers(endian, data)?;
        let contents: Vec<Node> = sections
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                let size: u64 = s.sh_size(endian).into();
                s.sh_type(endian) != elf::SHT_NOBITS && size > 0
            })
            .map(|(i, s)| {
                span(
                    format!("SEC[{i}]"),
                    s.sh_offset(endian).into(),
                    s.sh_size(endian).into(),
                    2,
                )
            })
            .filter(|node| !node.is_empty())
            .collect();
        if !contents.is_empty() {
            root.children.push(group("Sections", contents));
        } else {
            warn!("no section contents found, using segments");
            let contents: Vec<Node> = segments
                .iter()
                .enumerate()
                .filter(|(_, p)| {
                    let offset: u64 = p.p_offset(endian).into();
                    let filesz: u64 = p.p_filesz(endian).into();
                    filesz > 0 && offset >= pht_end
                })
                .map(|(i, p)| {
                    span(
                        format!("SEG[{i}]"),
                        p.p_offset(endian).into(),
                        p.p_filesz(endian).into(),
                        2,
                    )
                })
                .filter(|node| !node.is_empty())
                .collect();
            if !contents.is_empty() {
                root.children.push(group("Segments", contents));
            }
        }

        let shoff: u64 = header.e_shoff(endian).into();
        let shentsize = u64::from(header.e_shentsize(endian));
        if !sections.is_empty() {
            let mut table = span(
                "Section Header Table".to_string(),
                shoff,
                shentsize * sections.len() as u64,
                1,
            );
            for i in 0..sections.len() as u64 {
                table
                    .children
                    .push(span(format!("SHT[{i}]"), shoff + i * shentsize, shentsize, 2));
            }
            root.children.push(table);
        }

        if self.expand_bytes {
            expand(&mut root);
        }
        Ok(root)
    }
}

fn group(name: &str, children: Vec<Node>) -> Node {
    let start = children.iter().map(|c| c.start).min().unwrap_or(0);
    let end = children.iter().map(|c| c.end).max().unwrap_or(start);
    let mut node = Node::new(name, start, end, 1);
    node.children = children;
    node
}

fn expand(node: &mut Node) {
    if node.is_leaf() {
        if node.len() > 1 {
            let depth = node.depth + 1;
            node.children = (node.start..node.end)
                .enumerate()
                .map(|(i, offset)| Node::new(format!("Byte[{i}]"), offset, offset + 1, depth))
                .collect();
        }
        return;
    }
    for child in &mut node.children {
        expand(child);
    }
}

impl fmt::Display for ElfParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElfParser for elf (expand_bytes={})", self.expand_bytes)
    }
}

impl Parser for ElfParser {
    fn parse(&self, data: &[u8]) -> Result<Node> {
        match FileKind::parse(data)? {
            FileKind::Elf32 => self.parse_elf::<elf::FileHeader32<Endianness>>(data),
            FileKind::Elf64 => self.parse_elf::<elf::FileHeader64<Endianness>>(data),
            _ => Err(Error::Unsupported("input is not an ELF file")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Little-endian ELF64: header, one PT_LOAD, 16 bytes of code, two
    /// section headers (null + the code section).
    fn tiny_elf(code_type: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
        out.extend_from_slice(&0xb7u16.to_le_bytes()); // EM_AARCH64
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&0x400078u64.to_le_bytes());
        out.extend_from_slice(&64u64.to_le_bytes()); // e_phoff
        out.extend_from_slice(&136u64.to_le_bytes()); // e_shoff
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&64u16.to_le_bytes());
        out.extend_from_slice(&56u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&64u16.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        assert_eq!(out.len(), 64);

        out.extend_from_slice(&1u32.to_le_bytes()); // PT_LOAD
        out.extend_from_slice(&5u32.to_le_bytes());
        out.extend_from_slice(&120u64.to_le_bytes());
        out.extend_from_slice(&0x400078u64.to_le_bytes());
        out.extend_from_slice(&0x400078u64.to_le_bytes());
        out.extend_from_slice(&16u64.to_le_bytes());
        out.extend_from_slice(&16u64.to_le_bytes());
        out.extend_from_slice(&0x1000u64.to_le_bytes());
        assert_eq!(out.len(), 120);

        out.extend((0u8..16).map(|b| b.wrapping_mul(17)));

        out.extend_from_slice(&[0; 64]);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&code_type.to_le_bytes());
        out.extend_from_slice(&6u64.to_le_bytes());
        out.extend_from_slice(&0x400078u64.to_le_bytes());
        out.extend_from_slice(&120u64.to_le_bytes());
        out.extend_from_slice(&16u64.to_le_bytes());
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&4u64.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());
        assert_eq!(out.len(), 264);
        out
    }

    #[test]
    fn splits_headers_sections_and_tables() {
        let root = ElfParser::new(false)
            .parse(&tiny_elf(elf::SHT_PROGBITS))
            .expect("parse");
        assert_eq!(
            root.render(),
            "ELF (start=0, end=264)\n\
             \x20 ELF Header (start=0, end=64)\n\
             \x20 Program Header Table (start=64, end=120)\n\
             \x20   PHDR[0] (start=64, end=120)\n\
             \x20 Sections (start=120, end=136)\n\
             \x20   SEC[1] (start=120, end=136)\n\
             \x20 Section Header Table (start=136, end=264)\n\
             \x20   SHT[0] (start=136, end=200)\n\
             \x20   SHT[1] (start=200, end=264)\n"
        );
    }

    #[test]
    fn falls_back_to_segments_without_section_contents() {
        let root = ElfParser::new(false)
            .parse(&tiny_elf(elf::SHT_NOBITS))
            .expect("parse");
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["ELF Header", "Program Header Table", "Segments", "Section Header Table"]
        );
        assert_eq!(root.children[2].children[0].name, "SEG[0]");
        assert_eq!(root.children[2].children[0].start, 120);
    }

    #[test]
    fn expand_bytes_splits_leaves() {
        let root = ElfParser::default()
            .parse(&tiny_elf(elf::SHT_PROGBITS))
            .expect("parse");
        let header = &root.children[0];
        assert_eq!(header.children.len(), 64);
        assert_eq!(header.children[3].name, "Byte[3]");
        assert_eq!((header.children[3].start, header.children[3].end), (3, 4));
        assert_eq!(header.children[3].depth, 2);
    }

    #[test]
    fn rejects_non_elf_input() {
        assert!(ElfParser::default().parse(b"#!/bin/sh\necho hi\n").is_err());
        assert_eq!(
            ElfParser::default().to_string(),
            "ElfParser for elf (expand_bytes=true)"
        );
    }
}
