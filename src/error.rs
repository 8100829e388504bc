use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to open, read or write a user-supplied file.
#[derive(Debug, Error)]
pub enum FileAccessError {
    #[error("file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("no permission to access '{}'", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileAccessError {
    /// Classifies an I/O error raised while accessing `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => FileAccessError::NotFound { path },
            io::ErrorKind::PermissionDenied => FileAccessError::PermissionDenied { path },
            _ => FileAccessError::Io { path, source: err },
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    File(#[from] FileAccessError),

    #[error("invalid subnet '{value}' on line {line}: {source}")]
    InvalidSubnet {
        line: usize,
        value: String,
        #[source]
        source: ipnet::AddrParseError,
    },
}

#[derive(Debug, Error)]
pub enum NetInfoError {
    #[error("error running 'ip' command: {0:#}")]
    Command(anyhow::Error),

    #[error("error decoding JSON from 'ip' command output: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid address {address}/{prefix_len} on interface {iface}")]
    InvalidAddress {
        iface: String,
        address: String,
        prefix_len: u8,
    },

    #[error("no IPv4 address found on a non-loopback interface")]
    NoIpv4Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_io_kinds() {
        let path = Path::new("/tmp/subnets.txt");

        let err = FileAccessError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, FileAccessError::NotFound { .. }));
        assert_eq!(err.to_string(), "file '/tmp/subnets.txt' not found");

        let err = FileAccessError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, FileAccessError::PermissionDenied { .. }));
        assert_eq!(err.to_string(), "no permission to access '/tmp/subnets.txt'");

        let err = FileAccessError::from_io(path, io::Error::new(io::ErrorKind::Other, "disk gone"));
        assert!(matches!(err, FileAccessError::Io { .. }));
        assert!(err.to_string().contains("disk gone"));
    }
}
