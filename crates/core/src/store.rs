use crate::models::{SnippetMetadata, StoreMatch};
use crate::StoreError;
use serde_json::Value;

/// Validates a raw metadata object read back from a store.
pub fn metadata_from_value(id: &str, value: Option<&Value>) -> Result<SnippetMetadata, StoreError> {
    let object = value
        .and_then(Value::as_object)
        .ok_or_else(|| StoreError::InvalidMetadata {
            id: id.to_string(),
            details: "metadata missing".to_string(),
        })?;

    let field = |name: &str| {
        object
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::InvalidMetadata {
                id: id.to_string(),
                details: format!("field `{name}` missing or not a string"),
            })
    };

    Ok(SnippetMetadata {
        contract_id: field("contract_id")?,
        keyword: field("keyword")?,
        snippet_text: field("snippet_text")?,
    })
}

pub fn check_dimension(expected: usize, vector: &[f32]) -> Result<(), StoreError> {
    if vector.len() != expected {
        return Err(StoreError::Dimension {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// Descending by score; ties by keyword, then contract id. Stable.
pub fn rank_matches(matches: &mut [StoreMatch]) {
    matches.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| left.metadata.keyword.cmp(&right.metadata.keyword))
            .then_with(|| left.metadata.contract_id.cmp(&right.metadata.contract_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(contract_id: &str, keyword: &str, score: f64) -> StoreMatch {
        StoreMatch {
            id: format!("{contract_id}::{keyword}"),
            score,
            metadata: SnippetMetadata {
                contract_id: contract_id.to_string(),
                keyword: keyword.to_string(),
                snippet_text: String::new(),
            },
        }
    }

    #[test]
    fn metadata_requires_all_string_fields() {
        let good = json!({"contract_id": "nda", "keyword": "Term", "snippet_text": "Term: 2y"});
        let parsed = metadata_from_value("nda::Term", Some(&good)).expect("valid metadata");
        assert_eq!(parsed.snippet_text, "Term: 2y");

        let missing = json!({"contract_id": "nda", "keyword": "Term"});
        assert!(matches!(
            metadata_from_value("nda::Term", Some(&missing)),
            Err(StoreError::InvalidMetadata { .. })
        ));

        let wrong_type = json!({"contract_id": 7, "keyword": "Term", "snippet_text": "x"});
        assert!(metadata_from_value("7::Term", Some(&wrong_type)).is_err());
        assert!(metadata_from_value("x", None).is_err());
    }

    #[test]
    fn ranking_breaks_ties_by_keyword_then_contract() {
        let mut matches = vec![
            entry("b", "Term", 0.5),
            entry("a", "Term", 0.5),
            entry("z", "Governing Law", 0.5),
            entry("c", "Payment", 0.9),
        ];
        rank_matches(&mut matches);

        let ids: Vec<_> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c::Payment", "z::Governing Law", "a::Term", "b::Term"]);
    }
}
