//! SOAP 1.1 envelopes for UPnP action calls.
//!
//! - [`build_soap_request`] builds the request envelope for an action call.
//! - [`parse_action_response`] streams a response body and collects the
//!   values of the elements named after the action's arguments.

mod builder;
mod response;

pub use builder::build_soap_request;
pub use response::parse_action_response;

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_ENCODING_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";
