//! Sample SDK module shared by the integration tests and the benchmark.
//!
//! The module mirrors what an SDK build produces: a resource table for package `0x02` with a
//! string, a layout and a style, compiled layouts referencing those resources, raw XML that must
//! stay untouched, and two dex files of which one only holds the generated `RPackage` class.

#![allow(dead_code)]

use bundlescope::prelude::*;

pub const SDK_PACKAGE_NAME: &str = "com.example.sdk";

pub const SDK_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
          package="com.example.sdk">
    <uses-sdk android:minSdkVersion="21" android:targetSdkVersion="34"/>
    <application android:label="@string/sdk_name"/>
</manifest>"#;

const TYPE_REFERENCE: u8 = 0x01;
const TYPE_ATTRIBUTE: u8 = 0x02;
const TYPE_STRING: u8 = 0x03;
const TYPE_INT_HEX: u8 = 0x11;

fn chunk(chunk_type: u16, header: &[u8], body: &[u8]) -> Vec<u8> {
    let header_size = 8 + header.len();
    let size = header_size + body.len();
    let mut data = Vec::with_capacity(size);
    data.extend_from_slice(&chunk_type.to_le_bytes());
    data.extend_from_slice(&(header_size as u16).to_le_bytes());
    data.extend_from_slice(&(size as u32).to_le_bytes());
    data.extend_from_slice(header);
    data.extend_from_slice(body);
    data
}

fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn res_value(data_type: u8, value: u32) -> Vec<u8> {
    let mut data = vec![8, 0, 0, data_type];
    data.extend_from_slice(&value.to_le_bytes());
    data
}

fn empty_string_pool() -> Vec<u8> {
    chunk(0x0001, &words(&[0, 0, 0x100, 0, 0]), &[])
}

/// Resource table of package `package_id` with:
///
/// - `string/0000` = literal string index 0
/// - `layout/0000` = reference to `0xPP020001`
/// - `style/0000`  = bag with parent `0xPP030001`, item `android:textColor` -> `0xPP040000`
///   and item `0xPP010000` -> int `0xPP001234`
pub fn resource_table(package_id: u8) -> Vec<u8> {
    let p = u32::from(package_id) << 24;

    let mut entries = Vec::new();
    let mut offsets = Vec::new();

    // simple entry: string literal
    offsets.push(entries.len() as u32);
    entries.extend_from_slice(&8u16.to_le_bytes());
    entries.extend_from_slice(&0u16.to_le_bytes());
    entries.extend_from_slice(&0u32.to_le_bytes());
    entries.extend(res_value(TYPE_STRING, 0));

    // simple entry: reference
    offsets.push(entries.len() as u32);
    entries.extend_from_slice(&8u16.to_le_bytes());
    entries.extend_from_slice(&0u16.to_le_bytes());
    entries.extend_from_slice(&1u32.to_le_bytes());
    entries.extend(res_value(TYPE_REFERENCE, p | 0x0002_0001));

    // map entry
    offsets.push(entries.len() as u32);
    entries.extend_from_slice(&16u16.to_le_bytes());
    entries.extend_from_slice(&1u16.to_le_bytes());
    entries.extend_from_slice(&2u32.to_le_bytes());
    entries.extend(words(&[p | 0x0003_0001, 2]));
    entries.extend(words(&[0x0101_0098]));
    entries.extend(res_value(TYPE_REFERENCE, p | 0x0004_0000));
    entries.extend(words(&[p | 0x0001_0000]));
    entries.extend(res_value(TYPE_INT_HEX, p | 0x0000_1234));

    let mut types = Vec::new();
    for (type_id, offset) in [(1u8, offsets[0]), (2, offsets[1]), (3, offsets[2])] {
        let entry = single_entry(&entries, offset);
        let mut header = vec![type_id, 0, 0, 0];
        header.extend(words(&[1, 8 + 12 + 64 + 4]));
        header.extend(words(&[64]));
        header.resize(12 + 64, 0);
        let mut body = words(&[0]);
        body.extend(entry);
        types.extend(chunk(0x0201, &header, &body));
    }

    let mut package_header = words(&[u32::from(package_id)]);
    let mut name: Vec<u16> = SDK_PACKAGE_NAME.encode_utf16().collect();
    name.resize(128, 0);
    package_header.extend(name.iter().flat_map(|unit| unit.to_le_bytes()));
    package_header.extend(words(&[288, 0, 288 + 28, 0, 0]));

    let mut package_body = empty_string_pool();
    package_body.extend(empty_string_pool());
    package_body.extend(types);
    let package = chunk(0x0200, &package_header, &package_body);

    let mut table_body = empty_string_pool();
    table_body.extend(package);
    chunk(0x0002, &words(&[1]), &table_body)
}

/// Extracts the entry starting at `offset` from the concatenated entry data.
fn single_entry(entries: &[u8], offset: u32) -> Vec<u8> {
    let start = offset as usize;
    let size = u16::from_le_bytes([entries[start], entries[start + 1]]) as usize;
    let flags = u16::from_le_bytes([entries[start + 2], entries[start + 3]]);
    let len = if flags & 1 != 0 {
        let count = u32::from_le_bytes(entries[start + 12..start + 16].try_into().unwrap());
        size + count as usize * 12
    } else {
        size + 8
    };
    entries[start..start + len].to_vec()
}

/// Compiled XML document with one element carrying `attributes` as `(data_type, data)`.
pub fn compiled_xml(resource_map: &[u32], attributes: &[(u8, u32)]) -> Vec<u8> {
    let node = |chunk_type: u16, ext: &[u8]| {
        // line number, comment
        chunk(chunk_type, &words(&[1, u32::MAX]), ext)
    };

    let mut start = words(&[u32::MAX, 0]);
    for value in [20u16, 20, attributes.len() as u16, 0, 0, 0] {
        start.extend_from_slice(&value.to_le_bytes());
    }
    for &(data_type, data) in attributes {
        start.extend(words(&[u32::MAX, 0, u32::MAX]));
        start.extend(res_value(data_type, data));
    }

    let mut body = empty_string_pool();
    if !resource_map.is_empty() {
        body.extend(chunk(0x0180, &[], &words(resource_map)));
    }
    body.extend(node(0x0102, &start));
    body.extend(node(0x0103, &words(&[u32::MAX, 0])));
    chunk(0x0003, &[], &body)
}

/// Dex file defining the classes named by `descriptors`.
pub fn dex(descriptors: &[&str]) -> Vec<u8> {
    let count = descriptors.len();
    let string_ids = 0x70;
    let type_ids = string_ids + count * 4;
    let class_defs = type_ids + count * 4;
    let mut string_data_at = class_defs + count * 32;

    let mut data = vec![0u8; 0x70];
    data[..8].copy_from_slice(b"dex\n035\0");
    data[0x24..0x28].copy_from_slice(&0x70u32.to_le_bytes());
    data[0x28..0x2C].copy_from_slice(&0x1234_5678u32.to_le_bytes());
    for (at, value) in [
        (0x38, count),
        (0x3C, string_ids),
        (0x40, count),
        (0x44, type_ids),
        (0x60, count),
        (0x64, class_defs),
    ] {
        data[at..at + 4].copy_from_slice(&(value as u32).to_le_bytes());
    }

    let mut string_data = Vec::new();
    for descriptor in descriptors {
        data.extend_from_slice(&(string_data_at as u32).to_le_bytes());
        let mut item = vec![descriptor.len() as u8];
        item.extend_from_slice(descriptor.as_bytes());
        item.push(0);
        string_data_at += item.len();
        string_data.extend(item);
    }
    for index in 0..count as u32 {
        data.extend_from_slice(&index.to_le_bytes());
    }
    for index in 0..count as u32 {
        let mut class_def = [0u8; 32];
        class_def[..4].copy_from_slice(&index.to_le_bytes());
        data.extend_from_slice(&class_def);
    }
    data.extend(string_data);
    let file_size = data.len() as u32;
    data[0x20..0x24].copy_from_slice(&file_size.to_le_bytes());
    data
}

/// The sample SDK module compiled for package `package_id`.
pub fn sdk_module(package_id: u8) -> BundleModule {
    let p = u32::from(package_id) << 24;

    let layout = compiled_xml(
        &[0x0101_00D4, p | 0x0004_0002],
        &[
            (TYPE_REFERENCE, p | 0x0001_0000),
            (TYPE_REFERENCE, 0x0106_000B),
            (TYPE_ATTRIBUTE, p | 0x0004_0002),
            (TYPE_INT_HEX, p | 0x0000_0010),
        ],
    );
    let nested = compiled_xml(&[], &[(TYPE_REFERENCE, p | 0x0002_0001)]);
    let raw = compiled_xml(&[], &[(TYPE_REFERENCE, p | 0x0001_0000)]);

    BundleModule::builder()
        .name(ModuleName::new("base").unwrap())
        .manifest(AndroidManifest::parse(SDK_MANIFEST).unwrap())
        .add_entry(ModuleEntry::new("resources.arsc", resource_table(package_id)))
        .add_entry(ModuleEntry::new("res/layout/main.xml", layout))
        .add_entry(ModuleEntry::new("res/layout-land/v21/main.xml", nested))
        .add_entry(ModuleEntry::new("res/raw/payload.xml", raw))
        .add_entry(ModuleEntry::new("res/drawable/icon.png", vec![0x89, b'P', b'N', b'G']))
        .add_entry(ModuleEntry::new(
            "dex/classes.dex",
            dex(&["Lcom/example/sdk/Api;", "Lcom/example/sdk/Impl;"]),
        ))
        .add_entry(ModuleEntry::new(
            "dex/classes2.dex",
            dex(&["Lcom/example/sdk/RPackage;"]),
        ))
        .add_entry(ModuleEntry::new("assets/config.json", b"{}".to_vec()))
        .build()
        .unwrap()
}

pub fn dependency(package_id: u32) -> RuntimeEnabledSdk {
    RuntimeEnabledSdk::builder()
        .package_name(SDK_PACKAGE_NAME)
        .version(1, 0)
        .resources_package_id(package_id)
        .build()
        .unwrap()
}

/// Every 4 byte window of `data` read as little-endian `u32`.
pub fn u32_values(data: &[u8]) -> Vec<u32> {
    data.windows(4)
        .map(|window| u32::from_le_bytes([window[0], window[1], window[2], window[3]]))
        .collect()
}
