use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Anything that can answer "is this exact username/password pair allowed?".
pub trait CredentialStore: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read credential file {0}: {1}")]
    Read(PathBuf, io::Error),
}

/// Credentials loaded once from a whitespace-separated text file.
///
/// The first `username password` pair in the file is a column header and is
/// skipped. A trailing username without a password is ignored.
#[derive(Debug, Default, Clone)]
pub struct CredentialFile {
    pairs: HashSet<(String, String)>,
}

impl CredentialFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| CredentialError::Read(path.to_path_buf(), e))?;

        Ok(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let tokens: Vec<&str> = contents.split_whitespace().collect();
        let pairs = tokens
            .chunks_exact(2)
            .skip(1)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()));

        Self::from_pairs(pairs)
    }

    pub fn from_pairs<I, U, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(username, password)| (username.into(), password.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl CredentialStore for CredentialFile {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.pairs
            .contains(&(username.to_string(), password.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Username\tPassword\nMaolin\t111111\nJason\t222222\nMike 333333\n";

    #[test]
    fn test_parse_skips_header() {
        let store = CredentialFile::parse(SAMPLE);

        assert_eq!(store.len(), 3);
        assert!(!store.verify("Username", "Password"));
        assert!(store.verify("Maolin", "111111"));
        assert!(store.verify("Mike", "333333"));
    }

    #[test]
    fn test_verify_requires_exact_pair() {
        let store = CredentialFile::parse(SAMPLE);

        assert!(!store.verify("Maolin", "222222"));
        assert!(!store.verify("maolin", "111111"));
        assert!(!store.verify("Maolin", "111111 "));
        assert!(!store.verify("", ""));
    }

    #[test]
    fn test_dangling_username_is_ignored() {
        let store = CredentialFile::parse("user pass\nalice secret\nbob");
        assert_eq!(store.len(), 1);
        assert!(!store.verify("bob", ""));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CredentialFile::load("/definitely/not/here/Authentication.txt").unwrap_err();
        assert!(err.to_string().contains("Authentication.txt"));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("minesweeper-auth-{}.txt", std::process::id()));
        std::fs::write(&path, SAMPLE).unwrap();

        let store = CredentialFile::load(&path).unwrap();
        assert!(store.verify("Jason", "222222"));

        std::fs::remove_file(&path).unwrap();
    }
}
