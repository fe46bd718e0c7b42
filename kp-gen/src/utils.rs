//! File helpers shared by the command-line front end.

use std::fs::File;
use std::io::{
    self,
    BufReader,
    Write,
};
use std::path::Path;

use anyhow::{
    Context,
    Result,
};
use kp_core::errors::EmptyResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{
    debug,
    instrument,
};

use crate::network::{
    Network,
    NetworkFile,
};

/// Reads a JSON document from `path`.
#[instrument]
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))
}

/// Writes `value` as pretty JSON to `path`, or to stdout when no path is given.
#[instrument(skip(value))]
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> EmptyResult {
    let content = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            writeln!(file, "{content}")?;
            debug!("JSON written to: {}", path.display());
        },
        None => writeln!(io::stdout().lock(), "{content}")?,
    }
    Ok(())
}

/// Loads a network file with string node names.
pub fn load_network(path: &Path) -> Result<Network<String>> {
    let file: NetworkFile<String> = read_json(path)?;
    let network = Network::from(file);
    debug!(nodes = network.node_count(), links = network.link_count(), "loaded network");
    Ok(network)
}

/// Writes `network` back out in the network file format.
pub fn save_network(network: &Network<String>, path: Option<&Path>) -> EmptyResult {
    write_json(&NetworkFile::from(network), path)
}
