//! Process exit codes
//!
//! Every command maps its outcome onto one of these codes so scripts can
//! tell failure classes apart without parsing output.

/// Exit code returned by the `ossadm` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Completed, including a removal declined at its prompt
    Success = 0,
    GeneralError = 1,
    /// Invalid arguments or target
    UsageError = 2,
    NetworkError = 3,
    AuthError = 4,
    NotFound = 5,
    /// For example a bucket that is not empty
    Conflict = 6,
    UnsupportedFeature = 7,
    /// Interrupted with Ctrl-C
    Interrupted = 130,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ExitCode::Success),
            1 => Some(ExitCode::GeneralError),
            2 => Some(ExitCode::UsageError),
            3 => Some(ExitCode::NetworkError),
            4 => Some(ExitCode::AuthError),
            5 => Some(ExitCode::NotFound),
            6 => Some(ExitCode::Conflict),
            7 => Some(ExitCode::UnsupportedFeature),
            130 => Some(ExitCode::Interrupted),
            _ => None,
        }
    }

    /// Exit code for a core error
    pub fn from_error(error: &ossadm_core::Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(ExitCode::GeneralError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossadm_core::{Error, ResourceScope};

    #[test]
    fn test_round_trip_known_codes() {
        for code in [0, 1, 2, 3, 4, 5, 6, 7, 130] {
            assert_eq!(ExitCode::from_i32(code).map(ExitCode::as_i32), Some(code));
        }
        assert_eq!(ExitCode::from_i32(42), None);
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::Argument("bad".into())),
            ExitCode::UsageError
        );
        assert_eq!(
            ExitCode::from_error(&Error::AliasNotFound("x".into())),
            ExitCode::NotFound
        );

        let exhausted = Error::resource(
            ResourceScope::Bucket,
            "b",
            3,
            Error::Conflict("Bucket not empty".into()),
        );
        assert_eq!(ExitCode::from_error(&exhausted), ExitCode::Conflict);
    }
}
