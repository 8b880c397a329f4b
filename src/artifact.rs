use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::Result;
use crate::pipeline::orchestrator::ConversionResult;

/// A generated document on disk, ready to hand to the requester.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub file_path: PathBuf,
}

/// Writes the generated document under `output_dir`, named from the record
/// type and the first bytes of the document's SHA-256 so identical
/// conversions land on the same file.
pub fn write_artifact(output_dir: &Path, result: &ConversionResult) -> Result<Artifact> {
    let mut hasher = Sha256::new();
    hasher.update(result.xml.as_bytes());
    let digest = hex::encode(hasher.finalize());

    let file_name = format!(
        "{}_output_{}.xml",
        snake_type(&result.type_name),
        &digest[..8]
    );

    fs::create_dir_all(output_dir)?;
    let file_path = output_dir.join(&file_name);
    fs::write(&file_path, result.xml.as_bytes())?;
    info!("Artifact written: {}", file_path.display());

    Ok(Artifact { file_name, file_path })
}

fn snake_type(type_name: &str) -> String {
    type_name.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_xml(xml: &str) -> ConversionResult {
        ConversionResult {
            type_name: "Sales Order".to_string(),
            xml: xml.to_string(),
            rows_total: 0,
            rows_valid: 0,
            rows_skipped: 0,
            diagnostics: Vec::new(),
            suggested_filename: "Sales_Order_Output.xml".to_string(),
        }
    }

    #[test]
    fn artifact_name_derives_from_type_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_artifact(dir.path(), &result_with_xml("<ENVELOPE/>")).unwrap();

        assert!(artifact.file_name.starts_with("sales_order_output_"));
        assert!(artifact.file_name.ends_with(".xml"));
        assert!(artifact.file_path.exists());
    }

    #[test]
    fn identical_documents_reuse_the_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_artifact(dir.path(), &result_with_xml("<ENVELOPE/>")).unwrap();
        let second = write_artifact(dir.path(), &result_with_xml("<ENVELOPE/>")).unwrap();
        let different = write_artifact(dir.path(), &result_with_xml("<ENVELOPE></ENVELOPE>")).unwrap();

        assert_eq!(first.file_name, second.file_name);
        assert_ne!(first.file_name, different.file_name);
    }
}
