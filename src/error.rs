use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GutLegError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GutLegError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> GutLegError {
        GutLegError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GutLegError::Input("ds must be positive".to_owned());
        assert_eq!(format!("{err}"), "Input error: ds must be positive");

        let err = GutLegError::io(
            "gut.vertex",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = format!("{err}");
        assert!(msg.contains("gut.vertex"));
        assert!(msg.contains("denied"));
    }
}
