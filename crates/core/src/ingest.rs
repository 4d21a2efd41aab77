use crate::{ContractDocument, IndexError};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

/// File name without its last extension; `contract-<position>` when that
/// leaves nothing. `position` is 1-based upload order.
pub fn contract_id_from_filename(file_name: &str, position: usize) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _extension)) => stem,
        None => file_name,
    };

    let stem = stem.trim();
    if stem.is_empty() {
        format!("contract-{position}")
    } else {
        stem.to_string()
    }
}

pub struct SkippedUpload {
    pub path: PathBuf,
    pub reason: String,
}

pub struct UploadBatch {
    pub documents: Vec<ContractDocument>,
    pub skipped_files: Vec<SkippedUpload>,
}

pub fn read_contract(path: &Path, position: usize) -> Result<ContractDocument, IndexError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IndexError::InvalidArgument(format!("path has no file name: {}", path.display()))
        })?;

    let bytes = fs::read(path)?;
    Ok(ContractDocument {
        contract_id: contract_id_from_filename(file_name, position),
        bytes,
    })
}

/// Reads every path; unreadable files are reported, never fatal.
pub fn load_contracts(paths: &[PathBuf]) -> UploadBatch {
    let mut documents = Vec::new();
    let mut skipped_files = Vec::new();

    for (index, path) in paths.iter().enumerate() {
        match read_contract(path, index + 1) {
            Ok(document) => documents.push(document),
            Err(error) => skipped_files.push(SkippedUpload {
                path: path.clone(),
                reason: error.to_string(),
            }),
        }
    }

    UploadBatch {
        documents,
        skipped_files,
    }
}

/// Expands folders into the PDFs they contain; plain files pass through.
pub fn collect_upload_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, IndexError> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(discover_pdf_files(input));
        } else {
            paths.push(input.clone());
        }
    }

    if paths.is_empty() {
        return Err(IndexError::InvalidArgument(
            "no pdf files found in the given paths".to_string(),
        ));
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn discover_pdf_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("a.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(nested.join("b.PDF"))
            .and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(base.join("notes.txt")).and_then(|mut file| file.write_all(b"x"))?;

        let files = discover_pdf_files(base);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn contract_id_drops_last_extension_only() {
        assert_eq!(contract_id_from_filename("nda.pdf", 1), "nda");
        assert_eq!(contract_id_from_filename("nda.v2.pdf", 1), "nda.v2");
        assert_eq!(contract_id_from_filename("README", 1), "README");
        assert_eq!(contract_id_from_filename(".pdf", 4), "contract-4");
    }

    #[test]
    fn missing_files_are_skipped_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let present = dir.path().join("Lease Agreement.pdf");
        fs::write(&present, b"%PDF-1.4\n%fake")?;
        let missing = dir.path().join("missing.pdf");

        let batch = load_contracts(&[present, missing]);

        assert_eq!(batch.documents.len(), 1);
        assert_eq!(batch.documents[0].contract_id, "Lease Agreement");
        assert_eq!(batch.skipped_files.len(), 1);
        Ok(())
    }

    #[test]
    fn collecting_an_empty_folder_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let result = collect_upload_paths(&[dir.path().to_path_buf()]);
        assert!(result.is_err());
        Ok(())
    }
}
