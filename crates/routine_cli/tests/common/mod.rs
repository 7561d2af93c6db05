#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("routines.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    pub fn write_store(&self, routines: serde_json::Value) {
        write_json(
            &self.store_path(),
            serde_json::json!({
                "schema_version": 2,
                "routines": routines
            }),
        );
    }

    pub fn read_store(&self) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(self.store_path()).expect("read store"))
            .expect("store json")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_routine"))
            .args(args)
            .env("ROUTINEAPP_STORE_PATH", self.store_path())
            .env("ROUTINEAPP_CONFIG_PATH", self.config_path())
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to run routine")
    }
}

pub fn write_json(path: &Path, value: serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
