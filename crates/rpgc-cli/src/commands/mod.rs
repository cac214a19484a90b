pub mod clean;
pub mod parse;
pub mod play;
pub mod prompt;
pub mod stats;
pub mod validate;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use rpgc_session::{CompanionSession, FileStorage, SessionConfig};

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))
}

/// Open the session stored in `dir`.
fn open_session(dir: &Path, user: Option<&str>, seed: Option<u64>) -> CompanionSession {
    let mut config = SessionConfig::default();
    if let Some(user) = user {
        config = config.with_user_name(user);
    }
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    CompanionSession::new(config, Box::new(FileStorage::new(dir)))
}
