//! User management plugin.
//!
//! Mounts CRUD routes under `/_user/{user_id}` backed by the users index,
//! which is created at mount time if it does not exist yet.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::plugin::{BoxError, PluginUnit};
use crate::plugins::records::{access_fields, crud_routes, Op, Record};
use crate::routing::Route;
use crate::store::DocumentIndex;

/// A gateway user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub email: String,
    pub op: Op,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<String>>,
}

impl Record for User {
    const ID_PARAM: &'static str = "user_id";

    fn set_id(&mut self, id: &str) {
        self.user_id = id.to_string();
    }

    fn updatable_fields(&self) -> Map<String, Value> {
        let mut fields = access_fields(&self.acl, self.op, &self.indices);
        if !self.email.is_empty() {
            fields.insert("email".into(), json!(self.email));
        }
        fields
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
                "user_id": { "type": "keyword" },
                "password": { "type": "keyword", "index": false },
                "email": { "type": "keyword" },
                "op": { "type": "keyword" },
                "acl": { "type": "keyword" },
                "indices": { "type": "keyword" }
            }
        }
    })
}

pub struct UsersPlugin {
    store: Arc<DocumentIndex>,
}

impl UsersPlugin {
    pub const NAME: &'static str = "users";

    pub fn new(store: DocumentIndex) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[async_trait]
impl PluginUnit for UsersPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn routes(&self) -> Vec<Route> {
        crud_routes::<User>("/_user", self.store.clone())
    }

    async fn initialize(&self) -> Result<(), BoxError> {
        self.store.ensure_index(&mapping()).await?;
        Ok(())
    }
}
