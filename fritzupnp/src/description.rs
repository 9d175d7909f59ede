//! Wire structures of device manifests and service descriptions (SCPD).
//!
//! These mirror the XML documents one-to-one and are only used while the
//! model is being built. Missing elements default to empty values.

use serde::Deserialize;

use crate::errors::UpnpError;

/// `<root>` element of a device manifest (`igddesc.xml`, `tr64desc.xml`).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeviceDocument {
    pub device: DeviceDescription,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceDescription {
    #[serde(rename = "deviceType")]
    pub device_type: String,
    #[serde(rename = "friendlyName")]
    pub friendly_name: String,
    pub manufacturer: String,
    #[serde(rename = "manufacturerURL")]
    pub manufacturer_url: String,
    #[serde(rename = "modelDescription")]
    pub model_description: String,
    #[serde(rename = "modelName")]
    pub model_name: String,
    #[serde(rename = "modelNumber")]
    pub model_number: String,
    #[serde(rename = "modelURL")]
    pub model_url: String,
    #[serde(rename = "UDN")]
    pub udn: String,
    #[serde(rename = "presentationURL")]
    pub presentation_url: String,
    #[serde(rename = "serviceList")]
    pub service_list: ServiceList,
    #[serde(rename = "deviceList")]
    pub device_list: DeviceList,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceList {
    #[serde(rename = "service")]
    pub services: Vec<ServiceDescription>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceList {
    #[serde(rename = "device")]
    pub devices: Vec<DeviceDescription>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceDescription {
    #[serde(rename = "serviceType")]
    pub service_type: String,
    #[serde(rename = "serviceId")]
    pub service_id: String,
    #[serde(rename = "controlURL")]
    pub control_url: String,
    #[serde(rename = "eventSubURL")]
    pub event_sub_url: String,
    #[serde(rename = "SCPDURL")]
    pub scpd_url: String,
}

/// `<scpd>` element of a service description.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScpdDocument {
    #[serde(rename = "actionList")]
    pub action_list: ActionList,
    #[serde(rename = "serviceStateTable")]
    pub state_table: StateTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionList {
    #[serde(rename = "action")]
    pub actions: Vec<ActionDescription>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionDescription {
    pub name: String,
    #[serde(rename = "argumentList")]
    pub argument_list: ArgumentList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArgumentList {
    #[serde(rename = "argument")]
    pub arguments: Vec<ArgumentDescription>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArgumentDescription {
    pub name: String,
    pub direction: String,
    #[serde(rename = "relatedStateVariable")]
    pub related_state_variable: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StateTable {
    #[serde(rename = "stateVariable")]
    pub variables: Vec<StateVariableDescription>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StateVariableDescription {
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: String,
    #[serde(rename = "defaultValue")]
    pub default_value: String,
}

/// Decode a device manifest. `document` names the source in errors.
pub fn parse_device_document(xml: &str, document: &str) -> Result<DeviceDocument, UpnpError> {
    quick_xml::de::from_str(xml).map_err(|e| UpnpError::parse_failed(document, e))
}

/// Decode a service description. `document` names the source in errors.
pub fn parse_scpd_document(xml: &str, document: &str) -> Result<ScpdDocument, UpnpError> {
    quick_xml::de::from_str(xml).map_err(|e| UpnpError::parse_failed(document, e))
}
