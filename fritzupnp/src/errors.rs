use thiserror::Error;

/// Errors raised while discovering a device or invoking one of its actions.
#[derive(Error, Debug)]
pub enum UpnpError {
    #[error("could not fetch {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("could not decode {document}: {reason}")]
    ParseFailed { document: String, reason: String },

    #[error("unexpected status code {status_code} for {uri}")]
    ResponseError { uri: String, status_code: u16 },

    #[error("invalid SOAP response for {action}: {reason}")]
    InvalidResponse { action: String, reason: String },

    #[error("could not convert argument {argument}: {source}")]
    ConversionFailed {
        argument: String,
        #[source]
        source: ConversionError,
    },

    #[error("action {0} requires input arguments, only output-only actions can be called")]
    InputArgumentsUnsupported(String),

    #[error("could not build SOAP request for {action}: {reason}")]
    RequestBuild { action: String, reason: String },

    #[error("could not load service {service_type}: {source}")]
    ServiceLoad {
        service_type: String,
        #[source]
        source: Box<UpnpError>,
    },

    #[error("could not load {manifest}: {source}")]
    ManifestLoad {
        manifest: String,
        #[source]
        source: Box<UpnpError>,
    },
}

/// Errors raised by the wire type converter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("unknown datatype: {0}")]
    UnknownDataType(String),

    #[error("could not parse '{value}' as {data_type}: {source}")]
    InvalidUnsigned {
        value: String,
        data_type: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Coarse classification of an [`UpnpError`], independent of the context
/// layers wrapped around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FetchFailed,
    ParseFailed,
    ResponseError,
    InvalidResponse,
    ConversionFailed,
    Unsupported,
}

impl UpnpError {
    pub fn parse_failed(document: &str, reason: impl ToString) -> Self {
        UpnpError::ParseFailed {
            document: document.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_response(action: &str, reason: impl ToString) -> Self {
        UpnpError::InvalidResponse {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Kind of the innermost error, looking through `ServiceLoad` and
    /// `ManifestLoad`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpnpError::ServiceLoad { source, .. } | UpnpError::ManifestLoad { source, .. } => {
                source.kind()
            }
            UpnpError::FetchFailed { .. } => ErrorKind::FetchFailed,
            UpnpError::ParseFailed { .. } => ErrorKind::ParseFailed,
            UpnpError::ResponseError { .. } => ErrorKind::ResponseError,
            UpnpError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            UpnpError::ConversionFailed { .. } => ErrorKind::ConversionFailed,
            UpnpError::InputArgumentsUnsupported(_) | UpnpError::RequestBuild { .. } => {
                ErrorKind::Unsupported
            }
        }
    }

    /// The innermost error below any context wrappers.
    pub fn root_cause(&self) -> &UpnpError {
        match self {
            UpnpError::ServiceLoad { source, .. } | UpnpError::ManifestLoad { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_looks_through_wrappers() {
        let err = UpnpError::ManifestLoad {
            manifest: "tr64desc.xml".to_string(),
            source: Box::new(UpnpError::ServiceLoad {
                service_type: "urn:dslforum-org:service:DeviceInfo:1".to_string(),
                source: Box::new(UpnpError::ResponseError {
                    uri: "http://fritz.box:49000/deviceinfoSCPD.xml".to_string(),
                    status_code: 404,
                }),
            }),
        };

        assert_eq!(err.kind(), ErrorKind::ResponseError);
        assert!(matches!(
            err.root_cause(),
            UpnpError::ResponseError {
                status_code: 404,
                ..
            }
        ));

        let message = err.to_string();
        assert!(message.contains("tr64desc.xml"));
        assert!(message.contains("DeviceInfo"));
        assert!(message.contains("404"));
    }

    #[test]
    fn test_conversion_error_message_names_datatype() {
        let err = ConversionError::UnknownDataType("dateTime".to_string());
        assert_eq!(err.to_string(), "unknown datatype: dateTime");
    }
}
