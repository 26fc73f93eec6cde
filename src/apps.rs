use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use zip::ZipArchive;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("app directory {path} is not available: {source}")]
    AppDirUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open app archive {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("app archive entry `{entry}` escapes the install directory")]
    UnsafeEntry { entry: String },
    #[error("app archive {path} has no usable name")]
    UnnamedArchive { path: String },
    #[error("app template {path} is missing")]
    MissingTemplate { path: String },
}

pub type SampleRecord = BTreeMap<String, String>;

pub fn list_apps(app_dir: &Path) -> Result<Vec<String>, AppError> {
    let entries = fs::read_dir(app_dir).map_err(|source| AppError::AppDirUnavailable {
        path: app_dir.display().to_string(),
        source,
    })?;
    let mut apps = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AppError::Io {
            path: app_dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|v| v.to_str()) {
            apps.push(name.to_string());
        }
    }
    apps.sort();
    Ok(apps)
}

pub fn install_app(app_dir: &Path, archive_path: &Path) -> Result<String, AppError> {
    let name = archive_path
        .file_stem()
        .and_then(|v| v.to_str())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::UnnamedArchive {
            path: archive_path.display().to_string(),
        })?
        .to_string();

    let file = fs::File::open(archive_path).map_err(|source| AppError::Io {
        path: archive_path.display().to_string(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| AppError::Archive {
        path: archive_path.display().to_string(),
        source,
    })?;

    let install_root = app_dir.join(&name);
    fs::create_dir_all(&install_root).map_err(|source| AppError::Io {
        path: install_root.display().to_string(),
        source,
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|source| AppError::Archive {
            path: archive_path.display().to_string(),
            source,
        })?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(AppError::UnsafeEntry {
                entry: entry.name().to_string(),
            });
        };
        let destination = install_root.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&destination).map_err(|source| AppError::Io {
                path: destination.display().to_string(),
                source,
            })?;
            continue;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source| AppError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let mut output = fs::File::create(&destination).map_err(|source| AppError::Io {
            path: destination.display().to_string(),
            source,
        })?;
        io::copy(&mut entry, &mut output).map_err(|source| AppError::Io {
            path: destination.display().to_string(),
            source,
        })?;
    }

    Ok(name)
}

pub fn render_app_file(
    app_dir: &Path,
    file_name: &str,
    sample: &SampleRecord,
) -> Result<String, AppError> {
    let path = app_dir.join(file_name);
    if !path.exists() {
        return Err(AppError::MissingTemplate {
            path: path.display().to_string(),
        });
    }
    let template = fs::read_to_string(&path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(render_template(&template, sample))
}

// `{{ key }}` placeholders are replaced from the sample record; unknown
// placeholders pass through unchanged.
pub fn render_template(template: &str, sample: &SampleRecord) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match sample.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(&after[..end]);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
