use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

/// The env config vars needed for the collection lookup.
#[derive(Debug, Deserialize)]
pub struct LookupEnv {
    lookup_url: String,
    postcode: String,
    address_value: String,
}

pub struct LookupConfig {
    /// The council's "find your next collection day" page.
    pub lookup_url: String,
    pub postcode: String,
    /// The `<option value>` of the address in the lookup dropdown, not the
    /// house number.
    pub address_value: String,
}

impl LookupConfig {
    pub fn new() -> anyhow::Result<Self> {
        let lookup_env = LookupEnv::load_from_env()?;
        Ok(Self {
            lookup_url: lookup_env.lookup_url,
            postcode: lookup_env.postcode,
            address_value: lookup_env.address_value,
        })
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
