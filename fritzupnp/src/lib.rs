//! # fritzupnp
//!
//! Discovery and invocation of the UPnP / TR-64 control surface of a
//! gateway.
//!
//! [`load_services`] fetches the UPnP (`igddesc.xml`) and TR-64
//! (`tr64desc.xml`) manifests of a device, walks their device trees, loads
//! every service description (SCPD) and returns one [`Root`] with all
//! services indexed by service type. Actions of the model can then be
//! invoked with [`Action::call`], which returns the output values converted
//! to [`StateValue`]s.
//!
//! ## Example
//!
//! ```no_run
//! use fritzupnp::load_services;
//!
//! let root = load_services("fritz.box", 49000, "admin", "secret")?;
//!
//! for service_type in root.service_types() {
//!     let service = &root.services()[service_type];
//!     for action in service.get_only_actions() {
//!         let result = action.call()?;
//!         for (name, value) in &result {
//!             println!("{} {} {} = {}", service_type, action.name, name, value);
//!         }
//!     }
//! }
//! # Ok::<(), fritzupnp::UpnpError>(())
//! ```
//!
//! The model is immutable once built and can be shared between threads;
//! concurrent calls never touch shared state.

pub mod actions;
pub mod description;
pub mod devices;
pub mod digest;
pub mod errors;
pub mod root;
pub mod services;
pub mod soap;
pub mod state_variables;
pub mod transport;
pub mod variable_types;

use std::time::Duration;

pub use actions::{Action, ActionResult, Argument, Direction};
pub use devices::Device;
pub use errors::{ConversionError, ErrorKind, UpnpError};
pub use root::{Manifest, Root, load_services};
pub use services::Service;
pub use state_variables::StateVariable;
pub use transport::{Connection, Credentials};
pub use variable_types::{StateValue, convert_value};

/// Per-request timeout applied to description fetches and action calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
