//! Permission management plugin.
//!
//! Mounts CRUD routes under `/_permission/{username}` backed by the
//! permissions index, created at mount time if missing.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::plugin::{BoxError, PluginUnit};
use crate::plugins::records::{access_fields, crud_routes, Op, Record};
use crate::routing::Route;
use crate::store::DocumentIndex;

/// Credentials with scoped access to indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permission {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// User that issued this permission.
    pub creator: String,
    pub op: Op,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<String>>,
}

impl Record for Permission {
    const ID_PARAM: &'static str = "username";

    fn set_id(&mut self, id: &str) {
        self.username = id.to_string();
    }

    fn updatable_fields(&self) -> Map<String, Value> {
        access_fields(&self.acl, self.op, &self.indices)
    }

    fn redacted(mut self) -> Self {
        self.password = None;
        self
    }
}

fn mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "username": { "type": "keyword" },
                "password": { "type": "keyword", "index": false },
                "creator": { "type": "keyword" },
                "op": { "type": "keyword" },
                "acl": { "type": "keyword" },
                "indices": { "type": "keyword" }
            }
        }
    })
}

pub struct PermissionsPlugin {
    store: Arc<DocumentIndex>,
}

impl PermissionsPlugin {
    pub const NAME: &'static str = "permissions";

    pub fn new(store: DocumentIndex) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[async_trait]
impl PluginUnit for PermissionsPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn routes(&self) -> Vec<Route> {
        crud_routes::<Permission>("/_permission", self.store.clone())
    }

    async fn initialize(&self) -> Result<(), BoxError> {
        self.store.ensure_index(&mapping()).await?;
        Ok(())
    }
}
