use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_project_file(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("fleet.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    #[allow(dead_code)]
    pub fn write_state(&self, content: &str) {
        let dir = self.root.path().join(".fleetform");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("state.json"), content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }
}

pub const VALID_PROJECT: &str = r#"
settings:
  region: us-east-1
fleets:
  arena:
    build_id: b-1
    ec2_instance_type: c5.large
    name: fleet-A
    ec2_inbound_permissions:
      - from_port: 7777
        to_port: 7780
        ip_range: 0.0.0.0/0
        protocol: UDP
"#;
