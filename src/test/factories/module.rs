//! Module and manifest fixtures.

use crate::{
    manifest::AndroidManifest,
    module::{BundleModule, ModuleEntry, ModuleName},
};

pub const SDK_PACKAGE_NAME: &str = "com.example.sdk";

pub const SDK_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
          package="com.example.sdk">
    <uses-sdk android:minSdkVersion="21" android:targetSdkVersion="34"/>
    <application android:label="@string/app_name"/>
</manifest>"#;

pub fn sdk_manifest() -> AndroidManifest {
    AndroidManifest::parse(SDK_MANIFEST).unwrap()
}

/// A feature module named `base` holding `entries`.
pub fn module_with_entries(entries: Vec<ModuleEntry>) -> BundleModule {
    BundleModule::builder()
        .name(ModuleName::new("base").unwrap())
        .manifest(sdk_manifest())
        .entries(entries)
        .build()
        .unwrap()
}
