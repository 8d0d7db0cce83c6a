//! Continent → country table for the country pickers.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::CountryCode;

const BUILTIN_REGIONS: &str = include_str!("../regions.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Country {
    pub code: CountryCode,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Continent {
    pub name: String,
    pub countries: Vec<Country>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionCatalog {
    #[serde(rename = "continent")]
    pub continents: Vec<Continent>,
}

impl RegionCatalog {
    /// The table shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_REGIONS).context("Built-in region table is invalid")
    }

    pub fn parse(toml_src: &str) -> Result<Self> {
        let catalog: RegionCatalog =
            toml::from_str(toml_src).context("Failed to parse region table")?;
        Ok(catalog)
    }

    pub fn continent(&self, name: &str) -> Option<&Continent> {
        self.continents
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn country(&self, code: &CountryCode) -> Option<&Country> {
        self.continents
            .iter()
            .flat_map(|c| c.countries.iter())
            .find(|c| &c.code == code)
    }
}
