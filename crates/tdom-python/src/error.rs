use thiserror::Error;

#[derive(Debug, Error)]
pub enum PythonError {
    #[error("failed to parse Python source: {0}")]
    Parse(String),
}
