use crate::apps::{render_app_file, AppError, SampleRecord};
use crate::shared::atomic_write_file;
use std::fs;
use std::path::{Path, PathBuf};

pub const SAMPLE_ID_COLUMN: &str = "sample_id";

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("samples file {path} is empty")]
    EmptySheet { path: String },
    #[error("samples file row {line} has {found} columns, header has {expected}")]
    RowWidth {
        line: usize,
        found: usize,
        expected: usize,
    },
    #[error("samples file must contain a `sample_id` column")]
    MissingSampleId,
    #[error("project path {path} already exists")]
    ProjectExists { path: String },
    #[error(transparent)]
    App(#[from] AppError),
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub project_path: PathBuf,
    pub samples: Vec<SampleRecord>,
    pub manifest_path: PathBuf,
}

pub fn parse_samples(path: &Path) -> Result<Vec<SampleRecord>, BatchError> {
    let raw = fs::read_to_string(path).map_err(|source| BatchError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| BatchError::EmptySheet {
            path: path.display().to_string(),
        })?
        .split(',')
        .map(str::trim)
        .collect();

    let mut samples = Vec::new();
    for (index, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != header.len() {
            return Err(BatchError::RowWidth {
                line: index + 2,
                found: fields.len(),
                expected: header.len(),
            });
        }
        let mut record = SampleRecord::new();
        for (column, value) in header.iter().zip(fields) {
            record.insert(column.to_string(), value.to_string());
        }
        samples.push(record);
    }
    Ok(samples)
}

pub fn run_batch(
    app_dir: &Path,
    project_name: &str,
    samples_path: &Path,
    working_dir: &Path,
) -> Result<BatchReport, BatchError> {
    let project_path = working_dir.join(project_name);
    create_fresh_dir(&project_path)?;

    let samples = parse_samples(samples_path)?;
    let mut built = Vec::new();

    for sample in samples {
        let Some(sample_id) = sample
            .get(SAMPLE_ID_COLUMN)
            .filter(|value| !value.trim().is_empty())
        else {
            return Err(BatchError::MissingSampleId);
        };

        let sample_path = project_path.join(sample_id);
        create_fresh_dir(&sample_path)?;

        let mut record = sample.clone();
        record.insert("project_name".to_string(), project_name.to_string());

        let inputs = render_app_file(app_dir, "inputs", &record)?;
        write_file(&sample_path.join("inputs"), inputs.as_bytes())?;

        let workflow = render_app_file(app_dir, "workflow.wdl", &record)?;
        write_file(&sample_path.join("workflow.wdl"), workflow.as_bytes())?;

        let dependencies = app_dir.join("tasks.zip");
        if dependencies.exists() {
            fs::copy(&dependencies, sample_path.join("tasks.zip")).map_err(|source| {
                BatchError::Io {
                    path: dependencies.display().to_string(),
                    source,
                }
            })?;
        }

        built.push(record);
    }

    let manifest_path = project_path.join("submitted.csv");
    let manifest = render_manifest(&built);
    atomic_write_file(&manifest_path, manifest.as_bytes()).map_err(|source| BatchError::Io {
        path: manifest_path.display().to_string(),
        source,
    })?;

    Ok(BatchReport {
        project_path,
        samples: built,
        manifest_path,
    })
}

fn render_manifest(samples: &[SampleRecord]) -> String {
    let Some(first) = samples.first() else {
        return String::new();
    };
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();
    let mut out = String::new();
    out.push_str(&columns.join(","));
    out.push('\n');
    for sample in samples {
        let row: Vec<&str> = columns
            .iter()
            .map(|column| sample.get(*column).map(String::as_str).unwrap_or(""))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn create_fresh_dir(path: &Path) -> Result<(), BatchError> {
    if path.exists() {
        return Err(BatchError::ProjectExists {
            path: path.display().to_string(),
        });
    }
    fs::create_dir_all(path).map_err(|source| BatchError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), BatchError> {
    fs::write(path, content).map_err(|source| BatchError::Io {
        path: path.display().to_string(),
        source,
    })
}
