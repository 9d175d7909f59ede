/// A variable declared in a service's state table.
///
/// The default value is informational only and never enforced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateVariable {
    pub name: String,
    pub data_type: String,
    pub default_value: String,
}
