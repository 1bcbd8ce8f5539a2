// State fetching
//
// The inverter reports its state as a two-level mapping of
// `section -> field -> value`, plus one list-valued `timeline` section
// of event records. `init` fetches and stores everything; `update`
// fetches the fast-changing sections and merges them over the stored
// base. Consumers read the accumulated state through `storage()`.

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::ImeonClient;
use crate::error::Error;

impl ImeonClient {
    /// Full initialization fetch.
    ///
    /// `GET /api/data` -- retrieves every section (including the static
    /// `inverter` identity block) and replaces the stored state.
    pub async fn init(&mut self) -> Result<(), Error> {
        debug!("full state initialization");
        let data = self.get("data").await?;

        let Value::Object(sections) = data else {
            return Err(Error::Deserialization {
                message: "expected a section object in data payload".into(),
                body: data.to_string(),
            });
        };

        self.storage = sections;
        Ok(())
    }

    /// Incremental update fetch.
    ///
    /// `GET /api/data?scan=fast` -- retrieves the fast-changing sections
    /// only and merges them field-by-field over the stored base state.
    /// Requires a prior [`init`](Self::init).
    pub async fn update(&mut self) -> Result<(), Error> {
        if self.storage.is_empty() {
            return Err(Error::NotInitialized);
        }

        debug!("incremental state update");
        let data = self.get("data?scan=fast").await?;

        let Value::Object(sections) = data else {
            return Err(Error::Deserialization {
                message: "expected a section object in data payload".into(),
                body: data.to_string(),
            });
        };

        for (section, incoming) in sections {
            let Value::Object(incoming_fields) = incoming else {
                // Lists (timeline) and scalars replace wholesale.
                self.storage.insert(section, incoming);
                continue;
            };

            // Merge object sections field-by-field so partial scans
            // don't drop fields the fast path doesn't report.
            if let Some(Value::Object(existing)) = self.storage.get_mut(&section) {
                for (field, v) in incoming_fields {
                    existing.insert(field, v);
                }
            } else {
                self.storage.insert(section, Value::Object(incoming_fields));
            }
        }

        Ok(())
    }

    /// The nested section state accumulated so far.
    pub fn storage(&self) -> &Map<String, Value> {
        &self.storage
    }

    /// Whether the `inverter` section's identity field is populated.
    ///
    /// Once it is, the cheap incremental update path is safe; until then
    /// (first contact, or device-side state loss) a full `init` is needed.
    pub fn has_inverter_identity(&self) -> bool {
        self.storage
            .get("inverter")
            .and_then(|section| section.get("inverter"))
            .is_some_and(|v| !v.is_null())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use url::Url;

    use super::*;

    fn client_with_storage(storage: Value) -> ImeonClient {
        let mut client = ImeonClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:8088").unwrap(),
        );
        if let Value::Object(map) = storage {
            client.storage = map;
        }
        client
    }

    #[test]
    fn identity_absent_on_empty_storage() {
        let client = client_with_storage(json!({}));
        assert!(!client.has_inverter_identity());
    }

    #[test]
    fn identity_absent_when_null() {
        let client = client_with_storage(json!({ "inverter": { "inverter": null } }));
        assert!(!client.has_inverter_identity());
    }

    #[test]
    fn identity_present_when_populated() {
        let client = client_with_storage(json!({ "inverter": { "inverter": "IMEON 9.12" } }));
        assert!(client.has_inverter_identity());
    }

    #[tokio::test]
    async fn update_without_init_is_an_error() {
        let mut client = client_with_storage(json!({}));
        let result = client.update().await;
        assert!(matches!(result, Err(Error::NotInitialized)));
    }
}
