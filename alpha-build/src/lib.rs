//! Board build tools.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, Error, ErrorKind, Result},
    path::Path,
};

/// Prefix of a setting comment.
const SETTING_PREFIX: &str = "// ALPHA-";

/// Reads board settings from comments in a source file.
///
/// A setting line has the form: `// ALPHA-SETTING: value`
pub fn read_settings(path: &Path) -> Result<HashMap<String, String>> {
    let file = File::open(path)?;
    parse_settings(BufReader::new(file))
}

/// Parses board settings from source lines.
pub fn parse_settings(reader: impl BufRead) -> Result<HashMap<String, String>> {
    let mut settings = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if let Some(line) = line.strip_prefix(SETTING_PREFIX) {
            if let Some((name, value)) = line.split_once(':') {
                settings.insert(name.trim().to_ascii_uppercase(), value.trim().to_string());
            }
        }
    }

    Ok(settings)
}

/// Gets a required setting.
pub fn required<'a>(settings: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    settings
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("board setting ALPHA-{name} is missing")))
}
