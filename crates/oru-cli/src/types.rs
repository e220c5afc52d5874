use std::path::PathBuf;

use oru_cli::pipeline::ObjectReport;
use oru_transform::DecodedMessage;

#[derive(Debug)]
pub struct DecodeResult {
    pub files: Vec<FileDecode>,
    pub has_errors: bool,
}

#[derive(Debug)]
pub struct FileDecode {
    pub path: PathBuf,
    pub outcome: Result<DecodedMessage, String>,
}

#[derive(Debug)]
pub struct EventResult {
    pub table: String,
    pub output_file: PathBuf,
    pub reports: Vec<ObjectReport>,
    pub has_errors: bool,
}
