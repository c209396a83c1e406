//! Seeder Error Types

use mongodb::error::ErrorKind;
use thiserror::Error;

/// Server error code for a missing privilege.
const UNAUTHORIZED: i32 = 13;
/// Server error code for rejected credentials.
const AUTHENTICATION_FAILED: i32 = 18;
/// Server error code returned by `createUser` for an existing user.
const USER_ALREADY_EXISTS: i32 = 51003;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// Connection, server selection, or query failure.
    #[error("Database unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// The connected identity lacks the privilege for the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The database already holds a principal with this name.
    #[error("Principal already exists: {0}")]
    DuplicatePrincipal(String),

    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),
}

impl SeedError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn invalid_principal(message: impl Into<String>) -> Self {
        Self::InvalidPrincipal(message.into())
    }

    pub fn is_collaborator_unavailable(&self) -> bool {
        matches!(self, Self::CollaboratorUnavailable(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicatePrincipal(_))
    }

    /// Map a server command error code onto the seeder taxonomy.
    pub(crate) fn from_server_code(code: i32, message: String) -> Self {
        match code {
            UNAUTHORIZED | AUTHENTICATION_FAILED => Self::PermissionDenied(message),
            USER_ALREADY_EXISTS => Self::DuplicatePrincipal(message),
            _ => Self::CollaboratorUnavailable(message),
        }
    }
}

impl From<mongodb::error::Error> for SeedError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Command(command) => {
                let message = format!("{} ({}): {}", command.code_name, command.code, command.message);
                Self::from_server_code(command.code, message)
            }
            ErrorKind::Authentication { .. } => Self::PermissionDenied(err.to_string()),
            _ => Self::CollaboratorUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_code_classification() {
        assert!(SeedError::from_server_code(13, "not authorized".into()).is_permission_denied());
        assert!(SeedError::from_server_code(18, "auth failed".into()).is_permission_denied());
        assert!(SeedError::from_server_code(51003, "exists".into()).is_duplicate());
        assert!(SeedError::from_server_code(76, "not running with --replSet".into())
            .is_collaborator_unavailable());
    }

    fn command_error(code: i32, code_name: &str) -> mongodb::error::Error {
        let command: mongodb::error::CommandError = mongodb::bson::from_document(mongodb::bson::doc! {
            "code": code,
            "codeName": code_name,
            "errmsg": "server said no",
        })
        .unwrap();
        mongodb::error::Error::from(ErrorKind::Command(command))
    }

    #[test]
    fn test_driver_command_errors_are_classified() {
        let denied = SeedError::from(command_error(13, "Unauthorized"));
        assert_eq!(
            denied,
            SeedError::PermissionDenied("Unauthorized (13): server said no".to_string())
        );

        assert!(SeedError::from(command_error(18, "AuthenticationFailed")).is_permission_denied());
        assert!(SeedError::from(command_error(51003, "UserAlreadyExists")).is_duplicate());
        assert!(SeedError::from(command_error(76, "NoReplicationEnabled")).is_collaborator_unavailable());
    }

    #[test]
    fn test_driver_transport_errors_are_unavailable() {
        let io = mongodb::error::Error::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        let err = SeedError::from(io);
        assert!(err.is_collaborator_unavailable());
        assert!(err.to_string().contains("connection refused"));

        let custom = mongodb::error::Error::custom("harness hook failed");
        assert!(SeedError::from(custom).is_collaborator_unavailable());
    }

    #[test]
    fn test_display_keeps_message() {
        let err = SeedError::unavailable("server selection timeout");
        assert_eq!(err.to_string(), "Database unavailable: server selection timeout");
    }
}
