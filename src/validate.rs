use serde_json::Value;
use std::fs;
use std::path::Path;

// Validation reports findings as human-readable strings; an empty list
// means the inputs document is acceptable for submission.
pub fn validate_inputs(workflow: &Path, inputs: &Path) -> Vec<String> {
    let mut errors = Vec::new();

    let workflow_source = match fs::read_to_string(workflow) {
        Ok(source) => source,
        Err(err) => {
            errors.push(format!(
                "unable to read workflow file {}: {err}",
                workflow.display()
            ));
            return errors;
        }
    };

    let inputs_raw = match fs::read_to_string(inputs) {
        Ok(raw) => raw,
        Err(err) => {
            errors.push(format!(
                "unable to read inputs file {}: {err}",
                inputs.display()
            ));
            return errors;
        }
    };

    let document: Value = match serde_json::from_str(&inputs_raw) {
        Ok(value) => value,
        Err(err) => {
            errors.push(format!("inputs file is not valid JSON: {err}"));
            return errors;
        }
    };

    let Some(entries) = document.as_object() else {
        errors.push("inputs document must be a JSON object".to_string());
        return errors;
    };

    if entries.is_empty() {
        errors.push("inputs document contains no entries".to_string());
    }

    let workflow_name = declared_workflow_name(&workflow_source);
    for (key, value) in entries {
        if value.is_null() {
            errors.push(format!("input `{key}` has a null value"));
        }
        match &workflow_name {
            Some(name) => {
                let qualified = key
                    .split('.')
                    .next()
                    .map(|prefix| prefix == name)
                    .unwrap_or(false);
                if !qualified {
                    errors.push(format!(
                        "input `{key}` is not qualified by workflow `{name}`"
                    ));
                }
            }
            None => {
                if !key.contains('.') {
                    errors.push(format!(
                        "input `{key}` is not a qualified workflow input name"
                    ));
                }
            }
        }
    }

    errors
}

pub fn declared_workflow_name(source: &str) -> Option<String> {
    for line in source.lines() {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix("workflow") else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let name: String = rest
            .trim_start()
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .collect();
        if !name.is_empty() {
            return Some(name);
        }
    }
    None
}
