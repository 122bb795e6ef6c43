//! Minimal dex files.

/// Builds a version 035 dex file defining one class per descriptor.
///
/// Only the header, string ids, type ids, class defs and string data are populated.
pub fn dex_with_classes(descriptors: &[&str]) -> Vec<u8> {
    const HEADER_SIZE: usize = 0x70;

    let count = descriptors.len();
    let string_ids_off = HEADER_SIZE;
    let type_ids_off = string_ids_off + count * 4;
    let class_defs_off = type_ids_off + count * 4;
    let string_data_off = class_defs_off + count * 32;

    let mut string_data = Vec::new();
    let mut string_offsets = Vec::new();
    for descriptor in descriptors {
        string_offsets.push((string_data_off + string_data.len()) as u32);
        // uleb128 length, lengths below 128 only
        string_data.push(descriptor.len() as u8);
        string_data.extend_from_slice(descriptor.as_bytes());
        string_data.push(0);
    }

    let file_size = string_data_off + string_data.len();
    let mut data = vec![0u8; HEADER_SIZE];
    data[..8].copy_from_slice(b"dex\n035\0");

    let mut put = |offset: usize, value: usize| {
        data[offset..offset + 4].copy_from_slice(&(value as u32).to_le_bytes());
    };
    put(0x20, file_size);
    put(0x24, HEADER_SIZE);
    put(0x28, 0x1234_5678);
    put(0x38, count);
    put(0x3C, if count > 0 { string_ids_off } else { 0 });
    put(0x40, count);
    put(0x44, if count > 0 { type_ids_off } else { 0 });
    put(0x60, count);
    put(0x64, if count > 0 { class_defs_off } else { 0 });

    for offset in string_offsets {
        data.extend_from_slice(&offset.to_le_bytes());
    }
    for index in 0..count as u32 {
        data.extend_from_slice(&index.to_le_bytes());
    }
    for index in 0..count as u32 {
        let mut class_def = [0u8; 32];
        class_def[..4].copy_from_slice(&index.to_le_bytes());
        // superclass_idx, source_file_idx: NO_INDEX
        class_def[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        class_def[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        data.extend_from_slice(&class_def);
    }
    data.extend_from_slice(&string_data);
    data
}
