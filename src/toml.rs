//! Very basic functionality to read and write some configuration into a toml configuration file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConfigToml {
    /// file path and file name of the seed database, usually named "all_5_states_undecided_machines_with_global_header"
    #[serde(default = "default_seed_db_file")]
    seed_db_filename_path: String,

    /// directory where the output index files of a run are written
    #[serde(default = "default_output_path")]
    output_path: String,

    /// optional file path of the undecided-index file used to filter runs
    #[serde(default = "default_undecided_index_file")]
    undecided_index_filename_path: String,
}

impl ConfigToml {
    pub fn read_toml() -> ConfigToml {
        if Path::new(CONFIG_FILE).exists() {
            let config_content = fs::read_to_string(CONFIG_FILE)
                .expect("Config file {CONFIG_FILE} could not be read.");
            let config: ConfigToml = toml::from_str(&config_content)
                .expect("Config file {CONFIG_FILE} could not be parsed.");
            config
        } else {
            let default_config = ConfigToml::default();
            let toml_string = toml::to_string_pretty(&default_config)
                .expect("Failed to serialize default config");
            let write_result = fs::write(CONFIG_FILE, toml_string);
            if write_result.is_err() {
                println!(
                    "ERROR: Config file {CONFIG_FILE} was not found and could not be written. Using default values, some functionality might not be available."
                );
            }
            default_config
        }
    }

    pub fn seed_db_filename_path(&self) -> &str {
        &self.seed_db_filename_path
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub fn undecided_index_filename_path(&self) -> &str {
        &self.undecided_index_filename_path
    }
}

impl Default for ConfigToml {
    fn default() -> Self {
        ConfigToml {
            seed_db_filename_path: default_seed_db_file(),
            output_path: default_output_path(),
            undecided_index_filename_path: default_undecided_index_file(),
        }
    }
}

fn default_seed_db_file() -> String {
    "../all_5_states_undecided_machines_with_global_header".to_string()
}

fn default_output_path() -> String {
    "output/".to_string()
}

fn default_undecided_index_file() -> String {
    String::new()
}
