use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::description::parse_device_document;
use crate::devices::Device;
use crate::errors::UpnpError;
use crate::services::Service;
use crate::transport::{Connection, Credentials};

/// The two manifests a gateway publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manifest {
    /// Standard UPnP IGD description.
    Upnp,
    /// TR-64 description.
    Tr64,
}

impl Manifest {
    pub fn path(&self) -> &'static str {
        match self {
            Manifest::Upnp => "igddesc.xml",
            Manifest::Tr64 => "tr64desc.xml",
        }
    }
}

/// The assembled model of a device: its device tree and every service found
/// anywhere in it, indexed by service type.
///
/// A `Root` is built once and never modified afterwards; rediscovery builds
/// a new one.
#[derive(Debug, Clone)]
pub struct Root {
    connection: Arc<Connection>,
    device: Device,
    services: HashMap<String, Arc<Service>>,
}

impl Root {
    /// Fetch `manifest` and load the device tree and all service catalogs.
    pub fn load(connection: Arc<Connection>, manifest: Manifest) -> Result<Self, UpnpError> {
        let path = manifest.path();
        let xml = connection.fetch(path)?;
        let document = parse_device_document(&xml, path)?;

        let mut services = HashMap::new();
        let device = Device::load(document.device, &connection, &mut services)?;

        info!(
            manifest = %path,
            device = %device.friendly_name,
            services = services.len(),
            "Manifest loaded"
        );

        Ok(Self::from_parts(connection, device, services))
    }

    pub(crate) fn from_parts(
        connection: Arc<Connection>,
        device: Device,
        services: HashMap<String, Arc<Service>>,
    ) -> Self {
        Self {
            connection,
            device,
            services,
        }
    }

    /// Load both manifests and merge them. TR-64 services replace UPnP
    /// services of the same type.
    pub fn discover(connection: Arc<Connection>) -> Result<Self, UpnpError> {
        let upnp = Self::load(Arc::clone(&connection), Manifest::Upnp).map_err(|e| {
            UpnpError::ManifestLoad {
                manifest: Manifest::Upnp.path().to_string(),
                source: Box::new(e),
            }
        })?;

        let tr64 = Self::load(connection, Manifest::Tr64).map_err(|e| UpnpError::ManifestLoad {
            manifest: Manifest::Tr64.path().to_string(),
            source: Box::new(e),
        })?;

        Ok(upnp.merge(tr64))
    }

    /// Merge the services of `other` into this root. Entries of `other`
    /// win on service type collisions; the device tree of `self` is kept.
    pub fn merge(mut self, other: Root) -> Self {
        self.services.extend(other.services);
        self
    }

    pub fn base_url(&self) -> &str {
        self.connection.base_url()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.connection.credentials()
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn services(&self) -> &HashMap<String, Arc<Service>> {
        &self.services
    }

    pub fn service(&self, service_type: &str) -> Option<&Arc<Service>> {
        self.services.get(service_type)
    }

    /// Service types sorted alphabetically.
    pub fn service_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.services.keys().map(|k| k.as_str()).collect();
        types.sort_unstable();
        types
    }
}

/// Load the complete model of the device at `address:port`.
///
/// Both `igddesc.xml` and `tr64desc.xml` are fetched and merged. A
/// non-empty `username` enables digest authentication for action calls.
pub fn load_services(
    address: &str,
    port: u16,
    username: &str,
    password: &str,
) -> Result<Root, UpnpError> {
    let connection = Connection::new(address, port, username, password);
    Root::discover(Arc::new(connection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::parse_device_document;

    fn root(manifest: &str, friendly_name: &str) -> Root {
        let connection = Arc::new(Connection::new("127.0.0.1", 49000, "", ""));
        let doc = parse_device_document(manifest, "test.xml").unwrap();
        let device = Device::from_description(doc.device, &connection);
        let services = device
            .walk()
            .flat_map(|d| d.services.iter())
            .map(|s| (s.service_type.clone(), Arc::clone(s)))
            .collect();
        assert_eq!(device.friendly_name, friendly_name);
        Root::from_parts(connection, device, services)
    }

    fn manifest(name: &str, services: &[(&str, &str)]) -> String {
        let services: String = services
            .iter()
            .map(|(st, ctrl)| {
                format!(
                    "<service><serviceType>{}</serviceType><controlURL>{}</controlURL></service>",
                    st, ctrl
                )
            })
            .collect();
        format!(
            "<root><device><friendlyName>{}</friendlyName><serviceList>{}</serviceList></device></root>",
            name, services
        )
    }

    #[test]
    fn test_manifest_paths() {
        assert_eq!(Manifest::Upnp.path(), "igddesc.xml");
        assert_eq!(Manifest::Tr64.path(), "tr64desc.xml");
    }

    #[test]
    fn test_merge_prefers_tr64_entries() {
        let shared = "urn:schemas-upnp-org:service:WANIPConnection:1";
        let upnp = root(
            &manifest(
                "igd",
                &[
                    (shared, "/igdupnp/control/WANIPConn1"),
                    ("urn:schemas-any-com:service:Any:1", "/igdupnp/control/any"),
                ],
            ),
            "igd",
        );
        let tr64 = root(
            &manifest(
                "tr64",
                &[
                    (shared, "/upnp/control/wanipconnection1"),
                    ("urn:dslforum-org:service:DeviceInfo:1", "/upnp/control/deviceinfo"),
                ],
            ),
            "tr64",
        );
        let tr64_shared = Arc::clone(tr64.service(shared).unwrap());

        let merged = upnp.merge(tr64);

        assert_eq!(merged.services().len(), 3);
        let service = merged.service(shared).unwrap();
        assert!(Arc::ptr_eq(service, &tr64_shared));
        assert_eq!(service.control_url, "/upnp/control/wanipconnection1");
        assert_eq!(merged.device().friendly_name, "igd");
        assert_eq!(
            merged.service_types(),
            vec![
                "urn:dslforum-org:service:DeviceInfo:1",
                "urn:schemas-any-com:service:Any:1",
                shared,
            ]
        );
    }
}
