#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl ReadError {
    #[must_use]
    pub fn is_no_connection(&self) -> bool {
        matches!(self, ReadError::Storage(StorageError::NoConnection))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error("no session")]
    NoSession,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_read_error_from_storage_error() {
        assert!(matches!(
            ReadError::from(StorageError::NoSession),
            ReadError::Storage(StorageError::NoSession)
        ));
        assert!(ReadError::from(StorageError::NoConnection).is_no_connection());
        assert!(!ReadError::Other("foo".into()).is_no_connection());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ReadError::from(StorageError::NoConnection).to_string(),
            "no connection"
        );
        assert_eq!(
            ReadError::from(StorageError::Other("disk full".into())).to_string(),
            "disk full"
        );
    }
}
