//! Submission writer

use std::path::Path;
use tracing::info;

use crate::errors::{PipelineError, Result};

pub const HEADER: [&str; 2] = ["bidder_id", "prediction"];

/// Check that the template and the test partition list the same actors in
/// the same order
pub fn ensure_order(template: &[String], test_ids: &[String]) -> Result<()> {
    if let Some((position, (expected, actual))) = template
        .iter()
        .zip(test_ids)
        .enumerate()
        .find(|(_, (t, a))| t != a)
    {
        return Err(PipelineError::TemplateOrder {
            position,
            template: expected.clone(),
            test: actual.clone(),
        });
    }
    if template.len() != test_ids.len() {
        return Err(PipelineError::TemplateLength {
            template: template.len(),
            test: test_ids.len(),
        });
    }
    Ok(())
}

/// Encode `bidder_id,prediction` rows as CSV bytes
pub fn encode_submission(ids: &[String], predictions: &[f64]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for (id, p) in ids.iter().zip(predictions) {
        writer.write_record([id.as_str(), p.to_string().as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| PipelineError::Encode(csv::Error::from(e.into_error())))
}

/// Write the submission file and return the BLAKE3 hex digest of its bytes
pub fn write_submission(path: &Path, ids: &[String], predictions: &[f64]) -> Result<String> {
    if ids.len() != predictions.len() {
        return Err(PipelineError::PredictionCount {
            ids: ids.len(),
            predictions: predictions.len(),
        });
    }

    let bytes = encode_submission(ids, predictions)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    std::fs::write(path, &bytes).map_err(|e| PipelineError::io(path, e))?;

    let digest = hex::encode(blake3::hash(&bytes).as_bytes());
    info!(
        "Wrote {} predictions to {} (blake3 {})",
        ids.len(),
        path.display(),
        digest
    );
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_order_check_names_first_difference() {
        assert!(ensure_order(&ids(&["a", "b"]), &ids(&["a", "b"])).is_ok());

        match ensure_order(&ids(&["a", "b", "c"]), &ids(&["a", "c", "b"])) {
            Err(PipelineError::TemplateOrder {
                position,
                template,
                test,
            }) => {
                assert_eq!(position, 1);
                assert_eq!(template, "b");
                assert_eq!(test, "c");
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            ensure_order(&ids(&["a"]), &ids(&["a", "b"])),
            Err(PipelineError::TemplateLength { template: 1, test: 2 })
        ));
    }

    #[test]
    fn test_encoded_layout() {
        let bytes = encode_submission(&ids(&["b1", "b2"]), &[0.25, 1.0]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "bidder_id,prediction\nb1,0.25\nb2,1\n"
        );
    }

    #[test]
    fn test_write_returns_content_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("submission.csv");

        let digest = write_submission(&path, &ids(&["b1"]), &[0.5]).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(digest, hex::encode(blake3::hash(&written).as_bytes()));
        assert_eq!(digest.len(), 64);

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            write_submission(&path, &ids(&["b1", "b2"]), &[0.5]),
            Err(PipelineError::PredictionCount {
                ids: 2,
                predictions: 1
            })
        ));
        assert!(!path.exists());
    }
}
