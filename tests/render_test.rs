//! Integration tests for hex dump rendering.
//!
//! Buffers are built the way the companion encoder lays them out:
//! little-endian scalars, a 4-byte count before every sequence, and the
//! `Length`/`Prefix` framing in front of each message.

use byteorder::{ByteOrder, LittleEndian};

use wiredump::layout::iter::{layout_of, EncoderLayoutIterator};
use wiredump::layout::schema::{Element, ElementRef, FieldDef, FieldRef, Record};
use wiredump::layout::{eager, total_size, Annotation, AnnotationSource};
use wiredump::util::hex::{
    format_line_offset, render_from_list, render_from_record, render_from_source, HexDumpRenderer,
    Padding,
};
use wiredump::DumpError;

// ── Test message (duplicated from layout_test.rs since they're private) ──

struct IpAddr {
    ip: u32,
    port: u16,
}

impl Record for IpAddr {
    fn schema(&self) -> &[FieldDef] {
        const FIELDS: &[FieldDef] = &[FieldDef::scalar("IP"), FieldDef::scalar("Port")];
        FIELDS
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::scalar(&self.ip)),
            1 => Some(FieldRef::scalar(&self.port)),
            _ => None,
        }
    }
}

impl Element for IpAddr {
    fn as_element(&self) -> ElementRef<'_> {
        ElementRef::Record(self)
    }
}

struct GivePeersMessage {
    peers: Vec<IpAddr>,
}

impl Record for GivePeersMessage {
    fn schema(&self) -> &[FieldDef] {
        const FIELDS: &[FieldDef] = &[FieldDef::sequence("Peers")];
        FIELDS
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::Sequence(&self.peers)),
            _ => None,
        }
    }
}

const GIVP_PREFIX: [u8; 4] = *b"GIVP";

/// Encode a peers message with its framing.
fn encode_peers(msg: &GivePeersMessage) -> Vec<u8> {
    let payload_len = 4 + 4 + msg.peers.len() * 6;
    let mut buf = vec![0u8; 4 + payload_len];
    LittleEndian::write_u32(&mut buf[0..], payload_len as u32);
    buf[4..8].copy_from_slice(&GIVP_PREFIX);
    LittleEndian::write_u32(&mut buf[8..], msg.peers.len() as u32);
    for (i, peer) in msg.peers.iter().enumerate() {
        let at = 12 + i * 6;
        LittleEndian::write_u32(&mut buf[at..], peer.ip);
        LittleEndian::write_u16(&mut buf[at + 4..], peer.port);
    }
    buf
}

fn sample_peers() -> GivePeersMessage {
    GivePeersMessage {
        peers: vec![
            IpAddr {
                ip: 0x0100007f,
                port: 6000,
            },
            IpAddr {
                ip: 0x0200000a,
                port: 6001,
            },
        ],
    }
}

fn render_list(buffer: &[u8], list: &[Annotation]) -> Result<String, DumpError> {
    let mut out = Vec::new();
    render_from_list(buffer, list, &mut out)?;
    Ok(String::from_utf8(out).expect("valid utf8"))
}

/// Keep-alive ping: fixed layout, no sequences.
struct PingFrame;

impl AnnotationSource for PingFrame {
    fn annotations(&self) -> Vec<Annotation> {
        vec![
            Annotation::new("Length", 4),
            Annotation::new("Prefix", 4),
            Annotation::new("Nonce", 4),
        ]
    }
}

// ---------- Eager list ----------

#[test]
fn test_length_and_data_dump() {
    let buffer = [0x00, 0x00, 0x00, 0x04, 0xDE, 0xAD, 0xBE, 0xEF];
    let list = [Annotation::new("Length", 4), Annotation::new("Data", 4)];

    let text = render_list(&buffer, &list).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("0x0000 | 00 00 00 04"));
    assert!(lines[0].ends_with(" Length"));
    assert!(lines[1].starts_with("0x0004 | de ad be ef"));
    assert!(lines[1].ends_with(" Data"));
    assert_eq!(lines[2], "0x0008 | ");
    assert!(text.ends_with("0x0008 | \n"));
}

#[test]
fn test_fixed_layout_type_dumps_like_its_list() {
    let mut buffer = vec![0u8; 12];
    LittleEndian::write_u32(&mut buffer[0..], 8);
    buffer[4..8].copy_from_slice(b"PING");
    LittleEndian::write_u32(&mut buffer[8..], 42);

    let mut out = Vec::new();
    let consumed = render_from_source(&buffer, &PingFrame, &mut out).unwrap();
    assert_eq!(consumed, 12);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, render_list(&buffer, &PingFrame.annotations()).unwrap());
    assert!(text.contains("0x0008 | 2a 00 00 00"));
    assert!(text.ends_with(" Nonce\n0x000c | \n"));
}

#[test]
fn test_length_and_data_bare() {
    let buffer = [0x00, 0x00, 0x00, 0x04, 0xDE, 0xAD, 0xBE, 0xEF];
    let list = [Annotation::new("Length", 4), Annotation::new("Data", 4)];

    let mut out = Vec::new();
    HexDumpRenderer::new()
        .with_padding(Padding::Bare)
        .render(&buffer, eager(&list), &mut out)
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "0x0000 | 00 00 00 04 Length\n0x0004 | de ad be ef Data\n0x0008 | \n"
    );
}

#[test]
fn test_names_stay_aligned() {
    let buffer: Vec<u8> = (0..40).collect();
    let list = [
        Annotation::new("A", 1),
        Annotation::new("B", 7),
        Annotation::new("C", 32),
    ];
    let text = render_list(&buffer, &list).unwrap();
    let name_columns: Vec<usize> = text
        .lines()
        .filter(|l| l.ends_with(" A") || l.ends_with(" B") || l.ends_with(" C"))
        .map(|l| l.len() - 1)
        .collect();
    assert_eq!(name_columns.len(), 3);
    assert!(name_columns.iter().all(|&c| c == name_columns[0]));
}

#[test]
fn test_underflow_stops_before_overflowing_field() {
    let buffer = [1u8, 2, 3, 4, 5, 6];
    let list = [Annotation::new("Length", 4), Annotation::new("Body", 6)];

    let mut out = Vec::new();
    let err = render_from_list(&buffer, &list, &mut out).unwrap_err();
    assert!(matches!(err, DumpError::BufferUnderflow { offset: 4, size: 6, len: 6 }));

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains("01 02 03 04"));
    assert!(!text.contains("Body"));
    assert!(!text.contains("0x000a"));
}

#[test]
fn test_empty_list_prints_only_final_line() {
    assert_eq!(render_list(&[0xaa], &[]).unwrap(), "0x0000 | \n");
}

#[test]
fn test_long_field_offsets() {
    let buffer = vec![0u8; 40];
    let text = render_list(&buffer, &[Annotation::new("Blob", 40)]).unwrap();
    let offsets: Vec<&str> = text.lines().map(|l| &l[..6]).collect();
    assert_eq!(offsets, vec!["0x0000", "0x0010", "0x0020", "0x0028"]);
}

// ---------- Lazy record traversal ----------

#[test]
fn test_record_dump_consumes_whole_buffer() {
    let msg = sample_peers();
    let buffer = encode_peers(&msg);

    let mut out = Vec::new();
    let consumed = render_from_record(&buffer, &msg, &mut out).unwrap();
    assert_eq!(consumed, buffer.len());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("47 49 56 50"));
    assert!(text.contains("Peers#length"));
    assert!(text.contains("0x000c | 7f 00 00 01"));
    assert!(text.contains("Peers[1].Port"));
    assert!(text.ends_with(&format!("{}\n", format_line_offset(buffer.len()))));
}

#[test]
fn test_annotations_partition_buffer() {
    let msg = sample_peers();
    let buffer = encode_peers(&msg);
    let layout = layout_of(&msg).unwrap();

    assert_eq!(total_size(&layout), buffer.len());

    let mut offset = 0;
    for a in &layout {
        assert!(offset + a.size <= buffer.len());
        offset += a.size;
    }
    assert_eq!(offset, buffer.len());
}

#[test]
fn test_eager_and_lazy_render_identically() {
    let msg = sample_peers();
    let buffer = encode_peers(&msg);
    let layout = layout_of(&msg).unwrap();

    let mut lazy = Vec::new();
    HexDumpRenderer::new()
        .render(&buffer, EncoderLayoutIterator::new(&msg), &mut lazy)
        .unwrap();
    let mut list = Vec::new();
    render_from_list(&buffer, &layout, &mut list).unwrap();

    assert_eq!(lazy, list);
}

#[test]
fn test_record_dump_truncated_buffer() {
    let msg = sample_peers();
    let buffer = encode_peers(&msg);

    let mut out = Vec::new();
    let err = render_from_record(&buffer[..buffer.len() - 1], &msg, &mut out).unwrap_err();
    assert!(matches!(err, DumpError::BufferUnderflow { offset: 22, size: 2, .. }));
}
