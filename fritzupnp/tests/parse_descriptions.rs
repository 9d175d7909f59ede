use std::sync::Arc;

use fritzupnp::description::{parse_device_document, parse_scpd_document};
use fritzupnp::{Connection, Device, Direction};

const IGDDESC: &str = include_str!("testdata/igddesc.xml");
const TR64DESC: &str = include_str!("testdata/tr64desc.xml");
const DEVICEINFO_SCPD: &str = include_str!("testdata/deviceinfoSCPD.xml");

fn device_from(xml: &str, document: &str) -> Device {
    let doc = parse_device_document(xml, document).unwrap();
    let connection = Arc::new(Connection::new("fritz.box", 49000, "", ""));
    Device::from_description(doc.device, &connection)
}

#[test]
fn test_parse_igddesc() {
    let root_device = device_from(IGDDESC, "igddesc.xml");

    // Root level
    assert_eq!(
        root_device.device_type,
        "urn:schemas-upnp-org:device:InternetGatewayDevice:1"
    );
    assert_eq!(root_device.friendly_name, "FRITZ!Box Fon WLAN 7360");
    assert_eq!(root_device.manufacturer, "AVM Berlin");
    assert_eq!(root_device.manufacturer_url, "http://www.avm.de");
    assert_eq!(root_device.model_description, "FRITZ!Box Fon WLAN 7360");
    assert_eq!(root_device.model_name, "FRITZ!Box Fon WLAN 7360");
    assert_eq!(root_device.model_number, "avme");
    assert_eq!(root_device.model_url, "http://www.avm.de");
    assert_eq!(root_device.udn, "uuid:75802409-bccb-40e7-8e6c-0123456789AB");
    assert_eq!(root_device.presentation_url, "http://fritz.box");

    // Root level services
    assert_eq!(root_device.services.len(), 1);
    let service = &root_device.services[0];
    assert_eq!(service.service_type, "urn:schemas-any-com:service:Any:1");
    assert_eq!(service.service_id, "urn:any-com:serviceId:any1");
    assert_eq!(service.control_url, "/igdupnp/control/any");
    assert_eq!(service.event_sub_url, "/igdupnp/control/any");
    assert_eq!(service.scpd_url, "/any.xml");
    assert_eq!(service.device_udn(), root_device.udn);

    // Second level device
    assert_eq!(root_device.devices.len(), 1);
    let device = &root_device.devices[0];
    assert_eq!(device.device_type, "urn:schemas-upnp-org:device:WANDevice:1");
    assert_eq!(device.friendly_name, "WANDevice - FRITZ!Box Fon WLAN 7360");
    assert_eq!(device.manufacturer, "AVM Berlin");
    assert_eq!(device.manufacturer_url, "www.avm.de");
    assert_eq!(device.model_name, "WANDevice - FRITZ!Box Fon WLAN 7360");
    assert_eq!(device.model_number, "avme");
    assert_eq!(device.udn, "uuid:76802409-bccb-40e7-8e6b-0123456789AB");
    assert_eq!(device.presentation_url, "");

    // Second level services
    assert_eq!(device.services.len(), 1);
    let service = &device.services[0];
    assert_eq!(
        service.service_type,
        "urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1"
    );
    assert_eq!(service.service_id, "urn:upnp-org:serviceId:WANCommonIFC1");
    assert_eq!(service.control_url, "/igdupnp/control/WANCommonIFC1");
    assert_eq!(service.event_sub_url, "/igdupnp/control/WANCommonIFC1");
    assert_eq!(service.scpd_url, "/igdicfgSCPD.xml");

    // Third level device
    assert_eq!(device.devices.len(), 1);
    let device = &device.devices[0];
    assert_eq!(
        device.device_type,
        "urn:schemas-upnp-org:device:WANConnectionDevice:1"
    );
    assert_eq!(
        device.friendly_name,
        "WANConnectionDevice - FRITZ!Box Fon WLAN 7360"
    );
    assert_eq!(device.udn, "uuid:76802409-bccb-40e7-8e6a-0123456789AB");
    assert!(device.devices.is_empty());

    // Third level services
    assert_eq!(device.services.len(), 3);
    let service = &device.services[0];
    assert_eq!(
        service.service_type,
        "urn:schemas-upnp-org:service:WANDSLLinkConfig:1"
    );
    assert_eq!(service.service_id, "urn:upnp-org:serviceId:WANDSLLinkC1");
    assert_eq!(service.control_url, "/igdupnp/control/WANDSLLinkC1");
    assert_eq!(service.event_sub_url, "/igdupnp/control/WANDSLLinkC1");
    assert_eq!(service.scpd_url, "/igddslSCPD.xml");
    assert_eq!(device.services[2].scpd_url, "/igd2ipv6fwcSCPD.xml");
}

#[test]
fn test_parse_tr64desc() {
    let root_device = device_from(TR64DESC, "tr64desc.xml");

    assert_eq!(
        root_device.device_type,
        "urn:dslforum-org:device:InternetGatewayDevice:1"
    );
    assert_eq!(root_device.friendly_name, "FRITZ!Box Fon WLAN 7360");
    assert_eq!(root_device.manufacturer, "AVM");
    assert_eq!(root_device.services.len(), 6);

    let devices = &root_device.devices;
    assert_eq!(devices.len(), 2);

    assert_eq!(devices[0].model_name, "LANDevice - FRITZ!Box Fon WLAN 7360");
    assert_eq!(devices[0].services.len(), 5);
    assert!(devices[0].devices.is_empty());

    assert_eq!(devices[1].model_name, "WANDevice - FRITZ!Box Fon WLAN 7360");
    assert_eq!(devices[1].services.len(), 2);
    assert_eq!(devices[1].devices.len(), 1);
    assert_eq!(devices[1].devices[0].services.len(), 4);

    let total: usize = root_device.walk().map(|d| d.services.len()).sum();
    assert_eq!(total, 17);
}

#[test]
fn test_parse_deviceinfo_scpd() {
    let scpd = parse_scpd_document(DEVICEINFO_SCPD, "/deviceinfoSCPD.xml").unwrap();

    assert_eq!(scpd.action_list.actions.len(), 4);
    assert_eq!(scpd.state_table.variables.len(), 6);

    let get_info = &scpd.action_list.actions[0];
    assert_eq!(get_info.name, "GetInfo");
    assert_eq!(get_info.argument_list.arguments.len(), 5);
    assert_eq!(
        Direction::from_wire(&get_info.argument_list.arguments[0].direction),
        Direction::Out
    );

    let port = scpd
        .state_table
        .variables
        .iter()
        .find(|v| v.name == "X_AVM-DE_SecurityPort")
        .unwrap();
    assert_eq!(port.data_type, "ui2");
    assert_eq!(port.default_value, "49443");
}
