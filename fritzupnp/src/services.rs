use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::actions::{Action, Argument, Direction};
use crate::description::{ServiceDescription, parse_scpd_document};
use crate::errors::UpnpError;
use crate::state_variables::StateVariable;
use crate::transport::Connection;

/// Upward context an action needs at call time: where to send the request
/// and which namespace to use. It owns nothing of the model.
#[derive(Debug)]
pub struct ServiceEndpoint {
    pub connection: Arc<Connection>,
    pub service_type: String,
    pub control_url: String,
}

/// A service of a device with its action and state variable catalog.
#[derive(Debug, Clone)]
pub struct Service {
    pub service_type: String,
    pub service_id: String,
    pub control_url: String,
    pub event_sub_url: String,
    pub scpd_url: String,
    device_udn: String,
    endpoint: Arc<ServiceEndpoint>,
    actions: HashMap<String, Action>,
    state_variables: Vec<Arc<StateVariable>>,
}

impl Service {
    /// A service with an empty catalog, owned by the device `device_udn`.
    pub fn new(
        description: ServiceDescription,
        device_udn: &str,
        connection: &Arc<Connection>,
    ) -> Self {
        let endpoint = Arc::new(ServiceEndpoint {
            connection: Arc::clone(connection),
            service_type: description.service_type.clone(),
            control_url: description.control_url.clone(),
        });

        Self {
            service_type: description.service_type,
            service_id: description.service_id,
            control_url: description.control_url,
            event_sub_url: description.event_sub_url,
            scpd_url: description.scpd_url,
            device_udn: device_udn.to_string(),
            endpoint,
            actions: HashMap::new(),
            state_variables: Vec::new(),
        }
    }

    /// Fetch the service description from the device and build the catalog.
    pub fn load_catalog(&mut self) -> Result<(), UpnpError> {
        let xml = self.endpoint.connection.fetch(&self.scpd_url)?;
        self.parse_catalog(&xml)
    }

    /// Build the action and state variable tables from an SCPD document.
    ///
    /// Every argument is linked to the state variable it names. Arguments
    /// naming an undeclared variable keep an empty link.
    pub fn parse_catalog(&mut self, xml: &str) -> Result<(), UpnpError> {
        let scpd = parse_scpd_document(xml, &self.scpd_url)?;

        self.state_variables = scpd
            .state_table
            .variables
            .into_iter()
            .map(|v| {
                Arc::new(StateVariable {
                    name: v.name,
                    data_type: v.data_type,
                    default_value: v.default_value,
                })
            })
            .collect();

        self.actions = HashMap::with_capacity(scpd.action_list.actions.len());
        for action in scpd.action_list.actions {
            let arguments = action
                .argument_list
                .arguments
                .into_iter()
                .map(|arg| {
                    let state_variable = self.state_variable(&arg.related_state_variable).cloned();
                    if state_variable.is_none() {
                        trace!(
                            service = %self.service_type,
                            action = %action.name,
                            argument = %arg.name,
                            related = %arg.related_state_variable,
                            "Unresolved related state variable"
                        );
                    }

                    Arc::new(Argument {
                        direction: Direction::from_wire(&arg.direction),
                        name: arg.name,
                        related_state_variable: arg.related_state_variable,
                        state_variable,
                    })
                })
                .collect();

            let action = Action::new(action.name, arguments, Arc::clone(&self.endpoint));
            self.actions.insert(action.name.clone(), action);
        }

        debug!(
            service = %self.service_type,
            actions = self.actions.len(),
            variables = self.state_variables.len(),
            "Service catalog built"
        );
        Ok(())
    }

    /// UDN of the device this service belongs to.
    pub fn device_udn(&self) -> &str {
        &self.device_udn
    }

    pub fn actions(&self) -> &HashMap<String, Action> {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// Actions that can be invoked without input, sorted by name.
    pub fn get_only_actions(&self) -> Vec<&Action> {
        let mut actions: Vec<&Action> = self.actions.values().filter(|a| a.is_get_only()).collect();
        actions.sort_by(|a, b| a.name.cmp(&b.name));
        actions
    }

    pub fn state_variables(&self) -> &[Arc<StateVariable>] {
        &self.state_variables
    }

    pub fn state_variable(&self, name: &str) -> Option<&Arc<StateVariable>> {
        self.state_variables.iter().find(|v| v.name == name)
    }
}
