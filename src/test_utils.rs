use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_test_logger() {
    INIT.call_once(|| {
        // Initialize logger only once
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Helper: create a minimal valid ZIP.
pub fn create_test_zip(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let zip_path = dir.join(name);
    let file = fs::File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (entry_name, content) in files {
        if entry_name.ends_with('/') {
            writer.add_directory(entry_name.to_string(), options).unwrap();
            continue;
        }
        writer.start_file(entry_name.to_string(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
    zip_path
}

/// Helper: encode a small RGBA image as PNG bytes.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgba8(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// Plist node for building test fixtures.
#[derive(Debug, Clone)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
    Data(Vec<u8>),
    Uid(u64),
    Array(Vec<Node>),
    Dict(Vec<(String, Node)>),
}

pub fn s(value: &str) -> Node {
    Node::Str(value.to_string())
}

pub fn dict(entries: &[(&str, Node)]) -> Node {
    Node::Dict(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

/// Wrap an object table in the usual NSKeyedArchiver envelope, root at UID 1.
pub fn keyed_archive(objects: Vec<Node>) -> Vec<u8> {
    write_bplist(&dict(&[
        ("$archiver", s("NSKeyedArchiver")),
        ("$objects", Node::Array(objects)),
        ("$top", dict(&[("root", Node::Uid(1))])),
        ("$version", Node::Int(100_000)),
    ]))
}

/// Minimal `bplist00` writer: 4-byte offsets, 2-byte object refs, no dedup.
pub fn write_bplist(top: &Node) -> Vec<u8> {
    let mut objects: Vec<Vec<u8>> = Vec::new();
    add_node(&mut objects, top);

    let mut out = b"bplist00".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for object in &objects {
        offsets.push(out.len() as u32);
        out.extend_from_slice(object);
    }
    let table_offset = out.len() as u64;
    for offset in offsets {
        out.extend_from_slice(&offset.to_be_bytes());
    }
    out.extend_from_slice(&[0u8; 6]);
    out.push(4);
    out.push(2);
    out.extend_from_slice(&(objects.len() as u64).to_be_bytes());
    out.extend_from_slice(&0u64.to_be_bytes());
    out.extend_from_slice(&table_offset.to_be_bytes());
    out
}

fn add_node(objects: &mut Vec<Vec<u8>>, node: &Node) -> u16 {
    let index = objects.len();
    objects.push(Vec::new());

    let bytes = match node {
        Node::Null => vec![0x00],
        Node::Bool(false) => vec![0x08],
        Node::Bool(true) => vec![0x09],
        Node::Int(v) => int_bytes(*v),
        Node::Real(v) => {
            let mut b = vec![0x23];
            b.extend_from_slice(&v.to_be_bytes());
            b
        }
        Node::Str(text) if text.is_ascii() => {
            let mut b = length_header(0x50, text.len());
            b.extend_from_slice(text.as_bytes());
            b
        }
        Node::Str(text) => {
            let units: Vec<u16> = text.encode_utf16().collect();
            let mut b = length_header(0x60, units.len());
            for unit in units {
                b.extend_from_slice(&unit.to_be_bytes());
            }
            b
        }
        Node::Data(data) => {
            let mut b = length_header(0x40, data.len());
            b.extend_from_slice(data);
            b
        }
        Node::Uid(v) => {
            let mut b = vec![0x83];
            b.extend_from_slice(&(*v as u32).to_be_bytes());
            b
        }
        Node::Array(items) => {
            let refs: Vec<u16> = items.iter().map(|item| add_node(objects, item)).collect();
            let mut b = length_header(0xA0, refs.len());
            for r in refs {
                b.extend_from_slice(&r.to_be_bytes());
            }
            b
        }
        Node::Dict(entries) => {
            let keys: Vec<u16> = entries
                .iter()
                .map(|(k, _)| add_node(objects, &Node::Str(k.clone())))
                .collect();
            let values: Vec<u16> = entries.iter().map(|(_, v)| add_node(objects, v)).collect();
            let mut b = length_header(0xD0, keys.len());
            for r in keys.into_iter().chain(values) {
                b.extend_from_slice(&r.to_be_bytes());
            }
            b
        }
    };

    objects[index] = bytes;
    index as u16
}

fn length_header(marker: u8, len: usize) -> Vec<u8> {
    if len < 15 {
        return vec![marker | len as u8];
    }
    let mut b = vec![marker | 0x0F];
    b.extend_from_slice(&int_bytes(len as i64));
    b
}

fn int_bytes(v: i64) -> Vec<u8> {
    let mut b = Vec::new();
    if (0..=0xFF).contains(&v) {
        b.push(0x10);
        b.push(v as u8);
    } else if (0..=0xFFFF).contains(&v) {
        b.push(0x11);
        b.extend_from_slice(&(v as u16).to_be_bytes());
    } else if (0..=0xFFFF_FFFF).contains(&v) {
        b.push(0x12);
        b.extend_from_slice(&(v as u32).to_be_bytes());
    } else {
        b.push(0x13);
        b.extend_from_slice(&v.to_be_bytes());
    }
    b
}
