#![no_main]

use bundlescope::{
    dex::DexFile,
    resources::{PackageId, ResourceTablePackageIdRemapper, XmlPackageIdRemapper},
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(target) = PackageId::new(0x7F) else {
        return;
    };

    if let Ok(remapped) = ResourceTablePackageIdRemapper::new(target).remap_table(data) {
        assert_eq!(remapped.len(), data.len());
    }

    let xml = XmlPackageIdRemapper::new(target).with_source_package_id(0x02);
    if let Ok(remapped) = xml.remap_document(data) {
        assert_eq!(xml.remap_document(&remapped).ok(), Some(remapped));
    }

    if let Ok(dex) = DexFile::parse(data) {
        let _ = dex.class_descriptors();
    }
});
