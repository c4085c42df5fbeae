//! Classification of GameLift SDK failures

use aws_sdk_gamelift::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use fleetform_core::{RemoteError, RemoteErrorKind};

/// Map a GameLift error code onto a [`RemoteErrorKind`].
pub fn kind_for_code(code: &str) -> RemoteErrorKind {
    match code {
        "NotFoundException" => RemoteErrorKind::NotFound,
        "UnauthorizedException"
        | "AccessDeniedException"
        | "UnrecognizedClientException"
        | "ExpiredTokenException" => RemoteErrorKind::Unauthorized,
        "ConflictException" | "InvalidFleetStatusException" => RemoteErrorKind::Conflict,
        "InvalidRequestException" | "ValidationException" => RemoteErrorKind::MalformedInput,
        "ThrottlingException" | "TooManyRequestsException" => RemoteErrorKind::Throttled,
        "InternalServiceException" | "ServiceUnavailableException" => {
            RemoteErrorKind::TransientNetwork
        }
        _ => RemoteErrorKind::Unknown,
    }
}

pub(crate) fn classify<E, R>(err: SdkError<E, R>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let kind = match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            RemoteErrorKind::TransientNetwork
        }
        SdkError::ServiceError(_) => err.code().map_or(RemoteErrorKind::Unknown, kind_for_code),
        _ => RemoteErrorKind::Unknown,
    };
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    RemoteError::new(kind, message)
}

/// A request the SDK refused to build, such as a permission missing a port.
pub(crate) fn malformed(err: BuildError) -> RemoteError {
    RemoteError::new(RemoteErrorKind::MalformedInput, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_code() {
        assert_eq!(kind_for_code("NotFoundException"), RemoteErrorKind::NotFound);
        assert_eq!(
            kind_for_code("UnauthorizedException"),
            RemoteErrorKind::Unauthorized
        );
        assert_eq!(
            kind_for_code("InvalidFleetStatusException"),
            RemoteErrorKind::Conflict
        );
        assert_eq!(
            kind_for_code("InvalidRequestException"),
            RemoteErrorKind::MalformedInput
        );
        assert_eq!(
            kind_for_code("ThrottlingException"),
            RemoteErrorKind::Throttled
        );
        assert_eq!(
            kind_for_code("InternalServiceException"),
            RemoteErrorKind::TransientNetwork
        );
        assert_eq!(
            kind_for_code("LimitExceededException"),
            RemoteErrorKind::Unknown
        );
    }
}
