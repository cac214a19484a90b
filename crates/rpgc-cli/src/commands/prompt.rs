use std::path::Path;

use rpgc_session::render_prompt;

pub fn run(dir: &Path, user: Option<&str>) -> Result<(), String> {
    let session = super::open_session(dir, user, None);
    let messages = session.next_prompt();
    if messages.is_empty() {
        println!("  Nothing to inject (extension disabled).");
        return Ok(());
    }
    println!("{}", render_prompt(&messages));
    Ok(())
}
