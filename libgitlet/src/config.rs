use crate::error::GitletResult;
use crate::lockfile::write_atomic;
use std::collections::BTreeMap;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config";

const DEFAULT_USER_NAME: &str = "gitlet";
const DEFAULT_USER_EMAIL: &str = "gitlet@localhost";
const DEFAULT_BRANCH_KEY: &str = "init.default-branch";

/// Per-repository key/value settings (§4.13), ambient stack only: it never
/// participates in object identity, merge, or checkout. Unlike the reference
/// implementation, a freshly initialised repository gets usable placeholder
/// defaults rather than hard-erroring on a missing identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    values: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let mut values = BTreeMap::new();
        values.insert("user.name".to_owned(), DEFAULT_USER_NAME.to_owned());
        values.insert("user.email".to_owned(), DEFAULT_USER_EMAIL.to_owned());
        values.insert(DEFAULT_BRANCH_KEY.to_owned(), crate::refs::DEFAULT_BRANCH.to_owned());
        Self { values }
    }
}

impl Config {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn default_branch(&self) -> &str {
        self.get(DEFAULT_BRANCH_KEY).unwrap_or(crate::refs::DEFAULT_BRANCH)
    }

    pub fn load(path: &Path) -> GitletResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::default();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("corrupt config file: malformed line `{}`", line))?;
            config.set(key.to_owned(), value.to_owned());
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> GitletResult<()> {
        let mut contents = String::new();
        for (key, value) in &self.values {
            contents.push_str(&format!("{}={}\n", key, value));
        }
        write_atomic(path, contents.as_bytes())
    }
}
