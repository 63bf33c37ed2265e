//! Testing utilities for modshare workspace
//!
//! Shared fixtures: drafts, files and clients connected to one in-memory
//! backend.

#![allow(missing_docs)]

use modshare_client::{ClientConfig, MemoryBackend, ModshareClient, NewMod, Session};
use modshare_core::{
    generate_unlisted_id, FileComposer, ModDraft, ModFile, Principal, TEXT_CONTENT_TYPE,
};
use std::sync::Arc;

pub const TEST_ORIGIN: &str = "https://mods.example";

pub fn fix_json() -> ModFile {
    ModFile::new("fix.json", "application/json", vec![b' '; 512])
}

pub fn text_file(name: &str) -> ModFile {
    ModFile::new(name, TEXT_CONTENT_TYPE, b"notes".to_vec())
}

pub fn binary_files(count: usize) -> Vec<ModFile> {
    (0..count)
        .map(|i| ModFile::new(format!("part{i}.bin"), "application/octet-stream", vec![0u8; 16]))
        .collect()
}

pub fn long_text(chars: usize) -> String {
    "a".repeat(chars)
}

/// Draft of the "Torch Fix" mod with one attached file
pub fn torch_fix_draft() -> ModDraft {
    let mut files = FileComposer::new();
    files.replace_files(vec![fix_json()]).unwrap();
    ModDraft {
        game_name: "Minecraft".into(),
        title: "Torch Fix".into(),
        version: "1.0.0".into(),
        description: "Fixes torch placement".into(),
        prompt: "Fix the bug".into(),
        files,
    }
}

pub fn torch_fix_request(id: &str) -> NewMod {
    NewMod {
        id: id.into(),
        title: "Torch Fix".into(),
        description: "Fixes torch placement".into(),
        prompt: "Fix the bug".into(),
        version: "1.0.0".into(),
        game_name: "Minecraft".into(),
        files: vec![fix_json()],
        unlisted_id: generate_unlisted_id(),
    }
}

/// One shared backend seen by several callers
#[derive(Debug, Clone)]
pub struct TestWorld {
    pub backend: MemoryBackend,
    pub config: ClientConfig,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            backend: MemoryBackend::new(),
            config: ClientConfig::default()
                .with_origin(TEST_ORIGIN)
                .with_ad_duration(std::time::Duration::from_secs(3)),
        }
    }

    /// Client signed in as `name`
    pub fn client(&self, name: &str) -> ModshareClient {
        let identity = Principal::new(name);
        let view = self.backend.as_caller(identity.clone());
        let session = Arc::new(Session::connected(identity, Arc::new(view)));
        ModshareClient::new(session, self.config.clone())
    }

    /// Client with no live connection
    pub fn signed_out(&self) -> ModshareClient {
        ModshareClient::new(Arc::new(Session::new()), self.config.clone())
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
