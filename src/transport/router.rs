use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::payload::{self, CommandError};
use crate::app_system::{ErrorEnvelope, ErrorTranslator, Status, TransportContext, INTERNAL_MESSAGE};
use crate::clients::CatalogClient;
use crate::product_actor::ProductError;

/// The named commands the catalog answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CreateProduct,
    GetAllProducts,
    GetProductById,
    UpdateProduct,
    DeleteProduct,
    ValidateProducts,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Self::CreateProduct,
        Self::GetAllProducts,
        Self::GetProductById,
        Self::UpdateProduct,
        Self::DeleteProduct,
        Self::ValidateProducts,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateProduct => "create_product",
            Self::GetAllProducts => "get_all_product",
            Self::GetProductById => "get_product_by_id",
            Self::UpdateProduct => "update_product",
            Self::DeleteProduct => "delete_product",
            Self::ValidateProducts => "validate_products",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transport adapter for asynchronous commands: validates the payload,
/// calls the catalog, and answers with a JSON value or an [`ErrorEnvelope`].
#[derive(Clone)]
pub struct CommandRouter {
    catalog: CatalogClient,
    translator: ErrorTranslator,
}

impl CommandRouter {
    pub fn new(catalog: CatalogClient) -> Self {
        Self {
            catalog,
            translator: ErrorTranslator::new(TransportContext::Command),
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn dispatch(&self, command: &str, payload: Value) -> Result<Value, ErrorEnvelope> {
        let Some(command) = Command::from_name(command) else {
            debug!("No handler for command");
            return Err(CommandError::UnknownCommand(command.to_string()).into());
        };
        self.route(command, payload).await
    }

    async fn route(&self, command: Command, payload: Value) -> Result<Value, ErrorEnvelope> {
        match command {
            Command::CreateProduct => {
                let create = payload::decode_create(payload)?;
                self.reply(self.catalog.create_product(create).await)
            }
            Command::GetAllProducts => {
                let pagination = payload::decode_pagination(payload)?;
                self.reply(self.catalog.get_all_products(pagination).await)
            }
            Command::GetProductById => {
                let id = payload::decode_id(payload)?;
                self.reply(self.catalog.get_product_by_id(id).await)
            }
            Command::UpdateProduct => {
                let (id, patch) = payload::decode_update(payload)?;
                self.reply(self.catalog.update_product(id, patch).await)
            }
            Command::DeleteProduct => {
                let id = payload::decode_id(payload)?;
                self.reply(self.catalog.delete_product(id).await)
            }
            Command::ValidateProducts => {
                let ids = payload::decode_ids(payload)?;
                self.reply(self.catalog.validate_products(ids).await)
            }
        }
    }

    fn reply<T: Serialize>(&self, result: Result<T, ProductError>) -> Result<Value, ErrorEnvelope> {
        let value = result.map_err(|e| ErrorEnvelope::from(self.translator.translate(&e)))?;
        serde_json::to_value(value).map_err(|e| {
            error!(error = %e, "Failed to encode reply");
            ErrorEnvelope::new(Status::InternalError, INTERNAL_MESSAGE)
        })
    }
}
