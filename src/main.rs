use std::{env, path::PathBuf};

use anyhow::Result;
use log::info;
use neural_notebook::{config::NotebookConfig, walkthrough};

const CONFIG_ENV: &str = "NOTEBOOK_CONFIG";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = env::args_os()
        .nth(1)
        .or_else(|| env::var_os(CONFIG_ENV))
        .map(PathBuf::from);

    let config = match path {
        Some(path) => {
            info!("loading config from {}", path.display());
            NotebookConfig::from_path(&path)?
        }
        None => NotebookConfig::default(),
    };

    walkthrough::run(&config)
}
