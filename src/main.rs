#![forbid(unsafe_code)]

extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate reqwest;
extern crate serde;
extern crate time;

#[macro_use]
mod timed;
mod client;
mod clock;
mod config;
mod format;
mod history;

use crate::client::open_meteo::OpenMeteoClient;
use crate::client::{Coordinates, WeatherService};
use crate::config::{Config, StorageKind};
use crate::format::format_weather;
use crate::history::{JsonArrayStorage, PlainTextStorage, Storage, save_weather};

use clap::{Arg, ArgMatches, Command};
use env_logger::Env;

use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

fn main() {
    let env = Env::default().filter_or("WEATHER_HISTORY_LOG", "info");
    env_logger::init_from_env(env);

    let matches = cli().get_matches();

    if let Err(err) = run(&matches) {
        error!("{err}");
        process::exit(1);
    }
}

fn cli() -> Command {
    Command::new("weather-history")
        .version("0.1")
        .author("Chris Lieb")
        .about("Look up the current weather and keep a history of every reading")
        .arg(Arg::new("config").short('c').long("config"))
        .arg(
            Arg::new("lat")
                .long("lat")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f32)),
        )
        .arg(
            Arg::new("lon")
                .long("lon")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f32)),
        )
        .arg(Arg::new("city").long("city"))
        .arg(
            Arg::new("storage")
                .short('s')
                .long("storage")
                .value_parser(["plain", "json"]),
        )
        .arg(
            Arg::new("history_file")
                .short('f')
                .long("history-file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let conf = load_config(matches)?;
    info!(
        "Using {:?} history in {}",
        conf.storage,
        conf.history_file.display()
    );

    let storage: Box<dyn Storage> = match conf.storage {
        StorageKind::Plain => Box::new(PlainTextStorage::new(conf.history_file.clone())),
        StorageKind::Json => Box::new(JsonArrayStorage::open_or_create(
            conf.history_file.clone(),
        )?),
    };

    let mut client: Box<dyn WeatherService> = Box::new(OpenMeteoClient::new(
        conf.city.clone(),
        Duration::from_secs(conf.timeout_secs),
    )?);
    let coordinates = Coordinates {
        latitude: conf.latitude,
        longitude: conf.longitude,
    };

    let weather = timed!(
        "Fetching weather for {}",
        conf.city => (|| client.get_weather(&coordinates))
    )?;
    print!("{}", format_weather(&weather));

    timed!(
        "Saving weather to {}",
        conf.history_file.display() => (|| save_weather(&weather, storage.as_ref()))
    )?;

    Ok(())
}

/// Build the effective configuration: built-in defaults, then the config file, then flags.
fn load_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let mut conf = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(city) = matches.get_one::<String>("city") {
        conf.city = city.clone();
    }
    if let Some(lat) = matches.get_one::<f32>("lat") {
        conf.latitude = *lat;
    }
    if let Some(lon) = matches.get_one::<f32>("lon") {
        conf.longitude = *lon;
    }
    if let Some(storage) = matches.get_one::<String>("storage") {
        conf.storage = StorageKind::from_name(storage)
            .ok_or_else(|| format!("Unknown storage {storage}"))?;
    }
    if let Some(history_file) = matches.get_one::<PathBuf>("history_file") {
        conf.history_file = history_file.clone();
    }

    Ok(conf)
}
