//! Output utilities for CLI tools.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context as _;
use serde::Serialize;

/// Where command output goes: stdout, or a file.
#[derive(Debug, Clone, Default)]
pub struct Output {
    pub file: Option<PathBuf>,
}

impl Output {
    /// Creates a new output configuration.
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    /// Writes `value` as YAML.
    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let output = serde_yaml::to_string(value)?;
        match &self.file {
            Some(path) => std::fs::write(path, output)
                .with_context(|| format!("write {}", path.display()))?,
            None => print!("{}", output),
        }
        Ok(())
    }

    /// Writes raw bytes to the output file. Binary data is never printed to
    /// stdout.
    pub fn write_binary(&self, data: &[u8]) -> anyhow::Result<()> {
        let Some(path) = &self.file else {
            anyhow::bail!("binary output needs a file");
        };
        let mut file =
            File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_write_yaml_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        let output = Output::new(Some(path.clone()));

        let mut value = BTreeMap::new();
        value.insert("profile", "Slt");
        output.write(&value).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "profile: Slt\n");
    }

    #[test]
    fn test_write_binary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pcm");
        Output::new(Some(path.clone())).write_binary(&[1, 2, 3]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);

        assert!(Output::default().write_binary(&[1]).is_err());
    }
}
