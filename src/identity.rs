use crate::constant::CLIENT_ID_DEFAULT;

/// Identifies one consumer against a destination: `{destination, clientId, filter}`.
///
/// `destination` selects a logical stream on the server; `client_id`
/// distinguishes concurrent consumers sharing credentials; `filter` is a
/// regex over `schema.table` the server uses to prune events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub destination: String,
    pub client_id: i64,
    pub filter: String,
}

impl ClientIdentity {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            client_id: CLIENT_ID_DEFAULT,
            filter: String::new(),
        }
    }

    pub fn with_client_id(mut self, client_id: i64) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
}
