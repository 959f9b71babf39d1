use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub extension: String,
    pub delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_dir: PathBuf::from("./data"),
            extension: "csv".to_string(),
            delimiter: ',',
        }
    }
}
