use secrecy::SecretString;

/// Connection parameters for one inverter.
///
/// The stable device label lives outside this struct (it names the
/// coordinator in the registry and never changes); everything here may
/// be replaced by an options edit.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Network address of the inverter (bare host, host:port, or URL).
    pub address: String,
    pub username: String,
    pub password: SecretString,
}

impl DeviceConfig {
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
            password,
        }
    }
}
