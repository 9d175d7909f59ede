//! Decoding of SOAP action responses

use std::collections::HashMap;
use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use tracing::trace;

use crate::actions::{ActionResult, Argument};
use crate::errors::UpnpError;
use crate::variable_types::convert_value;

/// Decode the body of an action response.
///
/// Every element whose local name is an argument of the action is read as
/// text and converted according to the argument's state variable. Values
/// are keyed by state variable name. Unrelated elements, and arguments
/// without a resolved state variable, are skipped.
pub fn parse_action_response(
    action: &str,
    xml: &str,
    arguments: &HashMap<String, Arc<Argument>>,
) -> Result<ActionResult, UpnpError> {
    let mut result = ActionResult::new();
    let mut reader = Reader::from_str(xml);

    loop {
        let event = reader
            .read_event()
            .map_err(|e| UpnpError::parse_failed(&format!("{} response", action), e))?;

        let (name, value) = match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !arguments.contains_key(&name) {
                    continue;
                }
                let value = read_text(action, &name, &mut reader)?;
                (name, value)
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !arguments.contains_key(&name) {
                    continue;
                }
                (name, String::new())
            }
            Event::Eof => return Ok(result),
            _ => continue,
        };

        let Some(argument) = arguments.get(&name) else {
            continue;
        };
        let Some(variable) = &argument.state_variable else {
            trace!(
                action = %action,
                argument = %name,
                related = %argument.related_state_variable,
                "Skipping argument without state variable"
            );
            continue;
        };

        let converted =
            convert_value(&value, variable).map_err(|source| UpnpError::ConversionFailed {
                argument: name.clone(),
                source,
            })?;
        result.insert(variable.name.clone(), converted);
    }
}

/// Read the character data of the current element up to its end tag.
fn read_text(action: &str, element: &str, reader: &mut Reader<&[u8]>) -> Result<String, UpnpError> {
    let mut value = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| UpnpError::parse_failed(&format!("{} response", action), e))?;

        match event {
            Event::Text(e) => {
                let text = e
                    .decode()
                    .map_err(|err| UpnpError::invalid_response(action, err))?;
                value.push_str(&text);
            }
            Event::CData(e) => {
                let text = e
                    .decode()
                    .map_err(|err| UpnpError::invalid_response(action, err))?;
                value.push_str(&text);
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|err| UpnpError::invalid_response(action, err))?
                {
                    value.push(ch);
                } else {
                    let entity = e
                        .decode()
                        .map_err(|err| UpnpError::invalid_response(action, err))?;
                    match resolve_predefined_entity(&entity) {
                        Some(resolved) => value.push_str(resolved),
                        None => {
                            return Err(UpnpError::invalid_response(
                                action,
                                format!("unknown entity &{}; in <{}>", entity, element),
                            ));
                        }
                    }
                }
            }
            Event::End(_) => return Ok(value),
            Event::Eof => {
                return Err(UpnpError::invalid_response(
                    action,
                    format!("unexpected end of document inside <{}>", element),
                ));
            }
            other => {
                return Err(UpnpError::invalid_response(
                    action,
                    format!("unexpected {:?} inside <{}>", other, element),
                ));
            }
        }
    }
}
