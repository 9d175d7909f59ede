use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::UpnpError;
use crate::services::ServiceEndpoint;
use crate::soap::{build_soap_request, parse_action_response};
use crate::state_variables::StateVariable;
use crate::variable_types::StateValue;

/// Output values of one action call, keyed by state variable name.
pub type ActionResult = HashMap<String, StateValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Only the exact string `in` denotes an input argument.
    pub fn from_wire(direction: &str) -> Self {
        if direction == "in" {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

/// An argument of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub direction: Direction,
    pub related_state_variable: String,
    /// The state variable named by `related_state_variable`, or `None` when
    /// the service does not declare it.
    pub state_variable: Option<Arc<StateVariable>>,
}

/// A remotely invocable operation of a service.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub arguments: Vec<Arc<Argument>>,
    pub argument_map: HashMap<String, Arc<Argument>>,
    service: Arc<ServiceEndpoint>,
}

impl Action {
    pub(crate) fn new(
        name: String,
        arguments: Vec<Arc<Argument>>,
        service: Arc<ServiceEndpoint>,
    ) -> Self {
        let argument_map = arguments
            .iter()
            .map(|arg| (arg.name.clone(), Arc::clone(arg)))
            .collect();

        Self {
            name,
            arguments,
            argument_map,
            service,
        }
    }

    pub fn argument(&self, name: &str) -> Option<&Arc<Argument>> {
        self.argument_map.get(name)
    }

    /// Service type of the owning service, used as SOAP namespace.
    pub fn service_type(&self) -> &str {
        &self.service.service_type
    }

    pub fn control_url(&self) -> &str {
        &self.service.control_url
    }

    /// Whether the action looks like a pure query: it has at least one
    /// argument and none of them is an input.
    pub fn is_get_only(&self) -> bool {
        !self.arguments.is_empty() && !self.has_input_arguments()
    }

    fn has_input_arguments(&self) -> bool {
        self.arguments.iter().any(|a| a.direction == Direction::In)
    }

    /// Invoke the action on the device.
    ///
    /// Only actions without input arguments can be called.
    pub fn call(&self) -> Result<ActionResult, UpnpError> {
        if self.has_input_arguments() {
            return Err(UpnpError::InputArgumentsUnsupported(self.name.clone()));
        }

        let body = build_soap_request(&self.service.service_type, &self.name, &[]).map_err(
            |e| UpnpError::RequestBuild {
                action: self.name.clone(),
                reason: e.to_string(),
            },
        )?;

        let soap_action = format!("{}#{}", self.service.service_type, self.name);
        let response = self
            .service
            .connection
            .post_soap(&self.service.control_url, &soap_action, &body)
            .inspect_err(|e| warn!(action = %soap_action, "Action call failed: {}", e))?;

        let result = self.parse_soap_response(&response)?;
        debug!(action = %soap_action, values = result.len(), "Action call succeeded");
        Ok(result)
    }

    /// Decode a response body for this action.
    pub fn parse_soap_response(&self, body: &str) -> Result<ActionResult, UpnpError> {
        parse_action_response(&self.name, body, &self.argument_map)
    }
}
