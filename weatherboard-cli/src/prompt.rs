//! Interactive pickers built on `inquire`.

use anyhow::{Context, Result, anyhow};
use inquire::{Confirm, CustomType, Select};

use weatherboard_core::{
    CountryCode, GeocoderId, RegionCatalog, model::Coordinates,
};

pub fn pick_geocoder(current: Option<GeocoderId>) -> Result<GeocoderId> {
    let options: Vec<&str> = GeocoderId::all().iter().map(GeocoderId::as_str).collect();
    let start = current
        .and_then(|id| GeocoderId::all().iter().position(|g| *g == id))
        .unwrap_or(0);

    let picked = Select::new("Geocoder:", options)
        .with_starting_cursor(start)
        .raw_prompt()
        .context("Geocoder selection cancelled")?;

    Ok(GeocoderId::all()[picked.index])
}

/// Continent first, then one of its countries.
pub fn pick_country(catalog: &RegionCatalog) -> Result<CountryCode> {
    let continents: Vec<&str> = catalog.continents.iter().map(|c| c.name.as_str()).collect();
    let continent = Select::new("Continent:", continents)
        .raw_prompt()
        .context("Continent selection cancelled")?;
    let continent = &catalog.continents[continent.index];

    if continent.countries.is_empty() {
        return Err(anyhow!("No countries listed for {}", continent.name));
    }

    let countries: Vec<String> = continent
        .countries
        .iter()
        .map(|c| format!("{} ({})", c.name, c.code))
        .collect();
    let country = Select::new("Country:", countries)
        .raw_prompt()
        .context("Country selection cancelled")?;

    Ok(continent.countries[country.index].code.clone())
}

pub fn maybe_pick_country(catalog: &RegionCatalog) -> Result<Option<CountryCode>> {
    let wanted = Confirm::new("Restrict searches to a default country?")
        .with_default(false)
        .prompt()?;

    if wanted {
        pick_country(catalog).map(Some)
    } else {
        Ok(None)
    }
}

pub fn maybe_device_position(current: Option<Coordinates>) -> Result<Option<Coordinates>> {
    let wanted = Confirm::new("Pin a fixed device position (used before IP lookup)?")
        .with_default(current.is_some())
        .prompt()?;

    if !wanted {
        return Ok(None);
    }

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_error_message("Please type a number, e.g. 48.85")
        .prompt()?;
    let longitude = CustomType::<f64>::new("Longitude:")
        .with_error_message("Please type a number, e.g. 2.35")
        .prompt()?;

    let position = Coordinates::new(latitude, longitude)?;
    Ok(Some(position))
}
