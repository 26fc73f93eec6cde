use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn client_log_path(log_dir: &Path, username: &str) -> PathBuf {
    log_dir.join(format!("{username}.coxswain.log"))
}

pub fn append_client_log(log_dir: &Path, username: &str, level: &str, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": super::now_secs(),
        "level": level,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    let path = client_log_path(log_dir, username);
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}
