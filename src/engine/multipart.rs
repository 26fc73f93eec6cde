use super::EngineError;

#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    buffer: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Result<Self, EngineError> {
        let mut seed = [0u8; 16];
        getrandom::getrandom(&mut seed).map_err(|err| EngineError::Transport {
            message: format!("failed to generate multipart boundary: {err}"),
        })?;
        let suffix: String = seed.iter().map(|byte| format!("{byte:02x}")).collect();
        Ok(Self {
            boundary: format!("coxswain-{suffix}"),
            buffer: Vec::new(),
        })
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn add_text(&mut self, name: &str, value: &str) {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
        ));
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.extend_from_slice(b"\r\n");
    }

    pub fn add_file(&mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        ));
        self.buffer.extend_from_slice(data);
        self.buffer.extend_from_slice(b"\r\n");
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buffer
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.buffer
    }

    fn open_part(&mut self, headers: &str) {
        self.buffer
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.buffer.extend_from_slice(headers.as_bytes());
    }
}
