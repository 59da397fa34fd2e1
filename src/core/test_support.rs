// src/core/test_support.rs

//! On-disk profile tree fixtures shared by the engine tests.

use crate::{
    constants::META_FILE_SUFFIX,
    core::{paths, secure_storage::DefaultBackendProvider},
    models::{
        ClientSettings, ProfileAttributes, ProfileMeta, ProfileSchema, ProfileTypeConfiguration,
        PropertySchema, SchemaType,
    },
    state::AppState,
};
use serde_json::Value;
use std::{collections::BTreeMap, fs, path::Path};

pub(crate) fn attrs(value: Value) -> ProfileAttributes {
    value.as_object().cloned().unwrap()
}

fn property(kind: &str, secure: bool) -> PropertySchema {
    PropertySchema {
        property_type: Some(SchemaType::Single(kind.to_string())),
        description: None,
        secure,
        option_definition: None,
    }
}

/// Declares `profile_type` with a `host`/`port`/`user`/`password` schema (`host` required,
/// `user` and `password` secure).
pub(crate) fn write_type(home: &Path, profile_type: &str, default_profile: Option<&str>) {
    let mut properties = BTreeMap::new();
    properties.insert("host".to_string(), property("string", false));
    properties.insert("port".to_string(), property("number", false));
    properties.insert("user".to_string(), property("string", true));
    properties.insert("password".to_string(), property("string", true));

    let meta = ProfileMeta {
        default_profile: default_profile.map(str::to_string),
        configuration: ProfileTypeConfiguration {
            profile_type: profile_type.to_string(),
            schema: ProfileSchema {
                schema_type: Some("object".to_string()),
                title: Some(format!("{} profile", profile_type)),
                description: None,
                properties,
                required: vec!["host".to_string()],
            },
        },
    };

    let dir = paths::type_dir(home, profile_type);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{}{}", profile_type, META_FILE_SUFFIX)),
        serde_yaml::to_string(&meta).unwrap(),
    )
    .unwrap();
}

pub(crate) fn write_profile(home: &Path, profile_type: &str, name: &str, yaml: &str) {
    let dir = paths::type_dir(home, profile_type);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.yaml", name)), yaml).unwrap();
}

/// Application state rooted at `home` with `zosmf` registered and no secure storage configured.
pub(crate) fn app_state(home: &Path) -> AppState {
    let settings = ClientSettings {
        cli_home: Some(home.to_string_lossy().into_owned()),
        ..ClientSettings::default()
    };
    AppState::from_settings(settings, Box::new(DefaultBackendProvider)).unwrap()
}
