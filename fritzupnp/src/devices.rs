use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::description::DeviceDescription;
use crate::errors::UpnpError;
use crate::services::Service;
use crate::transport::Connection;

/// A device of the manifest tree with its services and sub-devices.
#[derive(Debug, Clone)]
pub struct Device {
    pub device_type: String,
    pub friendly_name: String,
    pub manufacturer: String,
    pub manufacturer_url: String,
    pub model_description: String,
    pub model_name: String,
    pub model_number: String,
    pub model_url: String,
    pub udn: String,
    pub presentation_url: String,
    pub services: Vec<Arc<Service>>,
    pub devices: Vec<Device>,
    connection: Arc<Connection>,
}

impl Device {
    /// Device tree without service catalogs, straight from the manifest.
    pub fn from_description(description: DeviceDescription, connection: &Arc<Connection>) -> Self {
        let services = description
            .service_list
            .services
            .into_iter()
            .map(|s| Arc::new(Service::new(s, &description.udn, connection)))
            .collect();

        let devices = description
            .device_list
            .devices
            .into_iter()
            .map(|d| Device::from_description(d, connection))
            .collect();

        Self {
            device_type: description.device_type,
            friendly_name: description.friendly_name,
            manufacturer: description.manufacturer,
            manufacturer_url: description.manufacturer_url,
            model_description: description.model_description,
            model_name: description.model_name,
            model_number: description.model_number,
            model_url: description.model_url,
            udn: description.udn,
            presentation_url: description.presentation_url,
            services,
            devices,
            connection: Arc::clone(connection),
        }
    }

    /// Device tree with every service catalog fetched and built.
    ///
    /// Services of a device are loaded before its sub-devices, one request
    /// at a time. Each loaded service is also registered in `registry`
    /// under its service type. The first failure aborts the whole load.
    pub fn load(
        description: DeviceDescription,
        connection: &Arc<Connection>,
        registry: &mut HashMap<String, Arc<Service>>,
    ) -> Result<Self, UpnpError> {
        let mut services = Vec::with_capacity(description.service_list.services.len());
        for service_description in description.service_list.services {
            let mut service = Service::new(service_description, &description.udn, connection);
            service
                .load_catalog()
                .map_err(|e| UpnpError::ServiceLoad {
                    service_type: service.service_type.clone(),
                    source: Box::new(e),
                })?;

            let service = Arc::new(service);
            registry.insert(service.service_type.clone(), Arc::clone(&service));
            services.push(service);
        }

        let mut devices = Vec::with_capacity(description.device_list.devices.len());
        for sub_device in description.device_list.devices {
            devices.push(Device::load(sub_device, connection, registry)?);
        }

        debug!(
            device = %description.friendly_name,
            services = services.len(),
            devices = devices.len(),
            "Device loaded"
        );

        Ok(Self {
            device_type: description.device_type,
            friendly_name: description.friendly_name,
            manufacturer: description.manufacturer,
            manufacturer_url: description.manufacturer_url,
            model_description: description.model_description,
            model_name: description.model_name,
            model_number: description.model_number,
            model_url: description.model_url,
            udn: description.udn,
            presentation_url: description.presentation_url,
            services,
            devices,
            connection: Arc::clone(connection),
        })
    }

    /// Base URL of the root this device was loaded from.
    pub fn base_url(&self) -> &str {
        self.connection.base_url()
    }

    /// Depth-first iterator over this device and all of its descendants.
    pub fn walk(&self) -> DeviceWalk<'_> {
        DeviceWalk { stack: vec![self] }
    }
}

pub struct DeviceWalk<'a> {
    stack: Vec<&'a Device>,
}

impl<'a> Iterator for DeviceWalk<'a> {
    type Item = &'a Device;

    fn next(&mut self) -> Option<Self::Item> {
        let device = self.stack.pop()?;
        self.stack.extend(device.devices.iter().rev());
        Some(device)
    }
}
