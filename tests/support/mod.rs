//! Shared helpers for integration tests.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::io::{Cursor, Write};

use relayup::{PathEnvError, PathStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// In-memory search-path store so tests never touch the process
/// environment.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub vars: HashMap<String, OsString>,
}

impl MemoryStore {
    pub fn with_var(name: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.vars.insert(name.to_string(), OsString::from(value));
        store
    }

    pub fn value(&self, name: &str) -> Option<&OsStr> {
        self.vars.get(name).map(OsString::as_os_str)
    }
}

impl PathStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<OsString>, PathEnvError> {
        Ok(self.vars.get(name).cloned())
    }

    fn write(&mut self, name: &str, value: &OsStr) -> Result<(), PathEnvError> {
        self.vars.insert(name.to_string(), value.to_os_string());
        Ok(())
    }
}

/// Builds an in-memory zip archive from `(entry_name, contents)` pairs.
/// Entry names ending in `/` become directory entries.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add directory");
        } else {
            writer.start_file(*name, options).expect("start file");
            writer.write_all(contents).expect("write entry");
        }
    }

    writer.finish().expect("finish archive").into_inner()
}

/// Starts a mock server serving `archive` as `/relay.zip`, returning the
/// server and the full archive URL.
pub async fn serve_archive(archive: Vec<u8>) -> (MockServer, String) {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/relay.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(&mock_server)
        .await;
    let url = format!("{}/relay.zip", mock_server.uri());
    (mock_server, url)
}
