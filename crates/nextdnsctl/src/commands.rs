//! Command dispatch
//!
//! Each command is one lifecycle call on the registry plus the matching
//! change to the state file. Output on stdout is JSON; logs go to stderr.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use nextdns_core::{
    DataSourceHandler, FileStateStore, ResourceData, ResourceHandler, ResourceRegistry, StateRecord,
    StateStore,
};

use crate::cli::Commands;

/// Registry and state file for one invocation
pub struct Session {
    pub registry: ResourceRegistry,
    pub store: FileStateStore,
}

fn address(type_name: &str, name: &str) -> String {
    format!("{}.{}", type_name, name)
}

async fn read_document(file: &Path) -> Result<Value> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", file.display()))
}

fn print(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl Session {
    async fn recorded(&self, address: &str) -> Result<StateRecord> {
        self.store
            .get(address)
            .await?
            .with_context(|| format!("{} is not in the state file", address))
    }

    async fn record(&self, address: &str, type_name: &str, data: ResourceData<Value>) -> Result<()> {
        let record = StateRecord::new(type_name, data);
        self.store.set(address, &record).await?;
        self.store.flush().await?;
        print(&record.attributes)
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Schema { type_name } => self.schema(type_name.as_deref()),

            Commands::Create {
                type_name,
                name,
                file,
            } => {
                let address = address(&type_name, &name);
                if self.store.get(&address).await?.is_some() {
                    bail!("{} already exists; use update", address);
                }
                let handler = self.registry.resource(&type_name)?;
                let desired = read_document(&file).await?;

                let data = handler.create(&desired).await?;
                info!("Created {} (id {})", address, data.id);
                self.record(&address, &type_name, data).await
            }

            Commands::Read { type_name, name } => {
                let address = address(&type_name, &name);
                let handler = self.registry.resource(&type_name)?;
                let current = self.recorded(&address).await?.resource_data();

                match handler.read(&current).await? {
                    Some(data) => self.record(&address, &type_name, data).await,
                    None => {
                        warn!("{} no longer exists remotely; dropping it from state", address);
                        self.store.delete(&address).await?;
                        self.store.flush().await?;
                        Ok(())
                    }
                }
            }

            Commands::Update {
                type_name,
                name,
                file,
            } => {
                let address = address(&type_name, &name);
                let handler = self.registry.resource(&type_name)?;
                let current = self.recorded(&address).await?.resource_data();
                let desired = read_document(&file).await?;

                let data = handler.update(&current, &desired).await?;
                info!("Updated {}", address);
                self.record(&address, &type_name, data).await
            }

            Commands::Delete { type_name, name } => {
                let address = address(&type_name, &name);
                let handler = self.registry.resource(&type_name)?;
                let current = self.recorded(&address).await?.resource_data();

                let remaining = handler.delete(&current).await?;
                self.store.delete(&address).await?;
                self.store.flush().await?;
                info!("Deleted {}", address);

                if let Some(data) = remaining {
                    print(&data.state)?;
                }
                Ok(())
            }

            Commands::Import {
                type_name,
                name,
                id,
            } => {
                let address = address(&type_name, &name);
                let handler = self.registry.resource(&type_name)?;

                let Some(data) = handler.import(&id).await? else {
                    bail!("profile {} not found", id);
                };
                info!("Imported {} from profile {}", address, id);
                self.record(&address, &type_name, data).await
            }

            Commands::Data {
                type_name,
                profile_id,
            } => {
                let source = self.registry.data_source(&type_name)?;
                let data = source.read(&profile_id).await?;
                print(&data.state)
            }

            Commands::List => {
                let mut listing = Vec::new();
                for address in self.store.list().await? {
                    if let Some(record) = self.store.get(&address).await? {
                        listing.push(json!({
                            "address": address,
                            "id": record.id,
                            "last_refreshed": record.last_refreshed,
                        }));
                    }
                }
                print(&Value::Array(listing))
            }
        }
    }

    fn schema(&self, type_name: Option<&str>) -> Result<()> {
        if let Some(type_name) = type_name {
            let schema = if self.registry.has_resource(type_name) {
                self.registry.resource(type_name)?.schema()
            } else {
                self.registry.data_source(type_name)?.schema()
            };
            return print(&serde_json::to_value(schema)?);
        }

        let mut resources = Map::new();
        for name in self.registry.list_resources() {
            let schema = self.registry.resource(name)?.schema();
            resources.insert(name.to_string(), serde_json::to_value(schema)?);
        }
        let mut data_sources = Map::new();
        for name in self.registry.list_data_sources() {
            let schema = self.registry.data_source(name)?.schema();
            data_sources.insert(name.to_string(), serde_json::to_value(schema)?);
        }
        print(&json!({"resources": resources, "data_sources": data_sources}))
    }
}
