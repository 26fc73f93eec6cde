use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use zip::ZipArchive;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open dependency archive {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("dependency archive entry `{entry}` escapes the archive directory")]
    UnsafeEntry { entry: String },
    #[error("failed to spawn copy tool `{tool}`: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("copy tool `{tool}` exited with status {status} uploading {path}")]
    CopyFailed {
        tool: String,
        status: i32,
        path: String,
    },
}

#[derive(Debug, Clone)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub extracted: Vec<PathBuf>,
}

// Entries of the dependency archive that are not already present next to
// it are extracted so the upload covers every imported file; extracted
// files are removed again by the caller after upload.
pub fn extract_missing_dependencies(archive_path: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let root = archive_path.parent().unwrap_or_else(|| Path::new("."));
    let file = fs::File::open(archive_path).map_err(|source| StorageError::Io {
        path: archive_path.display().to_string(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| StorageError::Archive {
        path: archive_path.display().to_string(),
        source,
    })?;

    let mut created = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|source| StorageError::Archive {
            path: archive_path.display().to_string(),
            source,
        })?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(StorageError::UnsafeEntry {
                entry: entry.name().to_string(),
            });
        };
        let destination = root.join(relative);
        if destination.exists() || entry.is_dir() {
            continue;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let mut output = fs::File::create(&destination).map_err(|source| StorageError::Io {
            path: destination.display().to_string(),
            source,
        })?;
        io::copy(&mut entry, &mut output).map_err(|source| StorageError::Io {
            path: destination.display().to_string(),
            source,
        })?;
        created.push(destination);
    }
    Ok(created)
}

pub fn upload_files(
    bucket: &str,
    copy_tool: &str,
    files: &[PathBuf],
) -> Result<Vec<String>, StorageError> {
    if bucket.contains("://") {
        return upload_with_tool(bucket, copy_tool, files);
    }
    upload_to_directory(Path::new(bucket), files)
}

pub fn upload_workflow_inputs(
    bucket: &str,
    copy_tool: &str,
    workflow: &Path,
    inputs: &Path,
    dependencies: Option<&Path>,
) -> Result<UploadReport, StorageError> {
    let extracted = match dependencies {
        Some(archive) => extract_missing_dependencies(archive)?,
        None => Vec::new(),
    };

    let mut files = vec![workflow.to_path_buf(), inputs.to_path_buf()];
    files.extend(extracted.iter().cloned());
    let uploaded = upload_files(bucket, copy_tool, &files)?;

    for path in &extracted {
        let _ = fs::remove_file(path);
    }

    Ok(UploadReport {
        uploaded,
        extracted,
    })
}

fn upload_with_tool(
    bucket: &str,
    copy_tool: &str,
    files: &[PathBuf],
) -> Result<Vec<String>, StorageError> {
    let destination = format!("{}/", bucket.trim_end_matches('/'));
    let mut uploaded = Vec::new();
    for file in files {
        let status = Command::new(copy_tool)
            .arg("cp")
            .arg(file)
            .arg(&destination)
            .status()
            .map_err(|source| StorageError::Spawn {
                tool: copy_tool.to_string(),
                source,
            })?;
        if !status.success() {
            return Err(StorageError::CopyFailed {
                tool: copy_tool.to_string(),
                status: status.code().unwrap_or(-1),
                path: file.display().to_string(),
            });
        }
        uploaded.push(uploaded_name(&destination, file));
    }
    Ok(uploaded)
}

fn upload_to_directory(bucket: &Path, files: &[PathBuf]) -> Result<Vec<String>, StorageError> {
    fs::create_dir_all(bucket).map_err(|source| StorageError::Io {
        path: bucket.display().to_string(),
        source,
    })?;
    let mut uploaded = Vec::new();
    for file in files {
        let name = file
            .file_name()
            .and_then(|v| v.to_str())
            .unwrap_or("upload");
        let destination = bucket.join(name);
        fs::copy(file, &destination).map_err(|source| StorageError::Io {
            path: file.display().to_string(),
            source,
        })?;
        uploaded.push(destination.display().to_string());
    }
    Ok(uploaded)
}

fn uploaded_name(destination: &str, file: &Path) -> String {
    let name = file
        .file_name()
        .and_then(|v| v.to_str())
        .unwrap_or("upload");
    format!("{destination}{name}")
}
