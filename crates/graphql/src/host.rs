//! Host side of the pipeline: the current schema and the per-request
//! envelope accessor.

use std::sync::{Arc, RwLock};

use {
    async_graphql::dynamic::Schema,
    sofa_common::{Envelope, GetEnveloped, Plugin, ServerContext},
    tracing::info,
};

use crate::envelope::SchemaEnvelope;

/// Register it ahead of the sofa plugins so it tracks schema changes, and
/// pass it to `Pipeline::init` as the envelope accessor.
#[derive(Default)]
pub struct SchemaHost {
    schema: RwLock<Option<Schema>>,
}

impl SchemaHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_schema(&self, schema: Schema) {
        *self.schema.write().unwrap_or_else(|e| e.into_inner()) = Some(schema);
    }

    pub fn schema(&self) -> Option<Schema> {
        self.schema.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl GetEnveloped for SchemaHost {
    fn get_enveloped(&self, server_context: &Arc<ServerContext>) -> Arc<dyn Envelope> {
        Arc::new(SchemaEnvelope::new(self.schema(), Arc::clone(server_context)))
    }
}

impl Plugin<Schema> for SchemaHost {
    fn name(&self) -> &str {
        "graphql-host"
    }

    fn on_schema_change(&self, schema: &Arc<Schema>) -> anyhow::Result<()> {
        self.set_schema(Schema::clone(schema));
        info!("graphql schema replaced");
        Ok(())
    }
}
