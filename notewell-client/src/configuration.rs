use notewell::bridge::{InMemoryChangeBridge, SharedBridge};
use notewell::gateway::{InMemoryGateway, PostgresGatewayBuilder, SharedGateway};
use notewell::note::OwnerId;
use sqlx::postgres::PgConnectOptions;
use std::sync::Arc;

#[derive(serde::Deserialize, Debug)]
pub enum GatewayType {
    InMemory,
    PostgreSQL,
}

#[derive(serde::Deserialize, Debug)]
pub struct Settings {
    database: Option<DatabaseSettings>,
    pub owner: String,
    pub debug: bool,
    gatewaytype: GatewayType,
    populateinmemorygateway: bool,
}

impl Settings {
    pub fn owner_id(&self) -> OwnerId {
        OwnerId::from(self.owner.as_str())
    }

    /// Build the gateway and the matching change bridge for the configured
    /// backend.
    pub async fn get_remote(&self) -> (SharedGateway, SharedBridge) {
        match self.gatewaytype {
            GatewayType::InMemory => {
                let gateway = Arc::new(InMemoryGateway::new());
                let bridge: SharedBridge =
                    Arc::new(InMemoryChangeBridge::new(Arc::clone(&gateway)));
                let gateway: SharedGateway = gateway;
                if self.populateinmemorygateway {
                    notewell::gateway::util::populate_demo_notes(&gateway, &self.owner_id())
                        .await;
                }
                (gateway, bridge)
            }
            GatewayType::PostgreSQL => {
                let db_options = CONFIGURATION.database.as_ref().expect("When gatewaytype is set to PostgreSQL, you must configure the keys under database").options();
                let postgres = PostgresGatewayBuilder::new(db_options).build().await;
                let bridge: SharedBridge = Arc::new(postgres.change_bridge());
                (Arc::new(postgres), bridge)
            }
        }
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub port: String,
    pub host: String,
    pub name: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl DatabaseSettings {
    pub fn options(&self) -> PgConnectOptions {
        self.options_without_db().database(&self.name)
    }

    pub fn options_without_db(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port.parse().expect("Failed to parse port number"));
        if let Some(ref username) = self.username {
            let password = self
                .password
                .as_ref()
                .expect("Password expected when a username is set");
            options.username(username).password(password)
        } else {
            options
        }
    }
}

lazy_static! {
    pub static ref CONFIGURATION: Settings =
        get_configuration().expect("Failed to read configuration.yml.");
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let config = config::Config::builder()
        .set_default("debug", false)?
        .set_default("owner", "local")?
        .set_default("gatewaytype", "InMemory")?
        .set_default("populateinmemorygateway", true)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::default()
                .prefix("notewell")
                .separator("_"),
        )
        .build()?;
    config.try_deserialize()
}
