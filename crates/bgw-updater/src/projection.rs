//! Field projection handlers
//!
//! Pure mappings from one decoded row to one partial-update document. Each
//! field kind knows the exact column layout it expects; a row with fewer
//! columns is a decode error, with no partial recovery.
//!
//! Labels are the one collection-sensitive projection: a target collection
//! carrying a label prefix gets the prefix concatenated onto the definition
//! text, so shared union collections can distinguish the source namespace.

use mongodb::bson::doc;

use crate::catalog::{CollectionRef, FieldKind};
use crate::client::Row;
use crate::error::DecodeError;
use crate::store::UpdateDoc;

/// Project one row into `(entity_id, partial_update)` for one target
/// collection.
pub fn project(
    kind: FieldKind,
    row: &Row,
    collection: &CollectionRef,
) -> Result<(String, UpdateDoc), DecodeError> {
    match kind {
        FieldKind::Labels => {
            let [id, label, definition] = columns(row, kind)?;
            let definition = if collection.prefix.is_empty() {
                definition.to_string()
            } else {
                format!("{}{}", collection.prefix, definition)
            };
            Ok((
                id.to_string(),
                UpdateDoc::Set(doc! {
                    "prefLabel": label,
                    "lcLabel": label.to_lowercase(),
                    "definition": definition,
                }),
            ))
        }
        FieldKind::Synonyms => {
            let [id, synonym] = columns(row, kind)?;
            Ok((
                id.to_string(),
                UpdateDoc::AddToSet(doc! {
                    "synonyms": synonym,
                    "lcSynonyms": synonym.to_lowercase(),
                }),
            ))
        }
        FieldKind::Scores => {
            let [id, from, to] = columns(row, kind)?;
            let from_score = parse_int(from, 1, kind)?;
            let to_score = parse_int(to, 2, kind)?;
            let ref_score = from_score + to_score;
            Ok((
                id.to_string(),
                UpdateDoc::Set(doc! {
                    "refScore": ref_score,
                    "toScore": to_score,
                    "fromScore": from_score,
                }),
            ))
        }
        FieldKind::Taxon => {
            let [id, taxon] = columns(row, kind)?;
            Ok((id.to_string(), UpdateDoc::Set(doc! { "taxon": taxon })))
        }
        FieldKind::Instances => {
            let [id, instance] = columns(row, kind)?;
            Ok((
                id.to_string(),
                UpdateDoc::AddToSet(doc! { "instances": instance }),
            ))
        }
        FieldKind::AnnotationScore => {
            let [id, score] = columns(row, kind)?;
            let score = parse_int(score, 1, kind)?;
            Ok((
                id.to_string(),
                UpdateDoc::Set(doc! { "annotationScore": score }),
            ))
        }
    }
}

fn columns<const N: usize>(row: &Row, kind: FieldKind) -> Result<[&str; N], DecodeError> {
    if row.len() < N {
        return Err(DecodeError::ColumnCount {
            field: kind.name(),
            expected: N,
            got: row.len(),
        });
    }
    Ok(std::array::from_fn(|i| row.column(i).unwrap_or_default()))
}

fn parse_int(value: &str, column: usize, kind: FieldKind) -> Result<i64, DecodeError> {
    value.parse::<i64>().map_err(|_| DecodeError::Integer {
        field: kind.name(),
        column,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unprefixed() -> CollectionRef {
        CollectionRef::new("prot")
    }

    #[test]
    fn labels_set_pref_label_and_lowercase_variant() {
        let row = Row::parse("P01308\tInsulin\tA peptide hormone");
        let (id, update) = project(FieldKind::Labels, &row, &unprefixed()).unwrap();
        assert_eq!(id, "P01308");
        assert_eq!(
            update,
            UpdateDoc::Set(doc! {
                "prefLabel": "Insulin",
                "lcLabel": "insulin",
                "definition": "A peptide hormone",
            })
        );
    }

    #[test]
    fn labels_prefix_is_concatenated_onto_the_definition() {
        let row = Row::parse("GO:0008150\tbiological_process\tAny process");
        let collection = CollectionRef::with_prefix("goall", "Biological Process");
        let (_, update) = project(FieldKind::Labels, &row, &collection).unwrap();
        assert_eq!(
            update.fields().get_str("definition").unwrap(),
            "Biological ProcessAny process"
        );
    }

    #[test]
    fn synonyms_add_to_set_with_lowercase_variant() {
        let row = Row::parse("P01308\tINS");
        let (id, update) = project(FieldKind::Synonyms, &row, &unprefixed()).unwrap();
        assert_eq!(id, "P01308");
        assert_eq!(
            update,
            UpdateDoc::AddToSet(doc! { "synonyms": "INS", "lcSynonyms": "ins" })
        );
    }

    #[test]
    fn scores_compute_ref_score_as_the_sum() {
        let row = Row::parse("P01308\t7\t35");
        let (_, update) = project(FieldKind::Scores, &row, &unprefixed()).unwrap();
        assert_eq!(
            update,
            UpdateDoc::Set(doc! { "refScore": 42i64, "toScore": 35i64, "fromScore": 7i64 })
        );
    }

    #[test]
    fn taxon_sets_a_single_scalar() {
        let row = Row::parse("P01308\thttp://purl.obolibrary.org/obo/NCBITaxon_9606");
        let (_, update) = project(FieldKind::Taxon, &row, &unprefixed()).unwrap();
        assert_eq!(
            update,
            UpdateDoc::Set(doc! { "taxon": "http://purl.obolibrary.org/obo/NCBITaxon_9606" })
        );
    }

    #[test]
    fn instances_accumulate_into_a_set() {
        let row = Row::parse("P01308\tuniprot-evidence-1");
        let (_, update) = project(FieldKind::Instances, &row, &unprefixed()).unwrap();
        assert_eq!(
            update,
            UpdateDoc::AddToSet(doc! { "instances": "uniprot-evidence-1" })
        );
    }

    #[test]
    fn annotation_score_is_an_integer_scalar() {
        let row = Row::parse("P01308\t5");
        let (_, update) = project(FieldKind::AnnotationScore, &row, &unprefixed()).unwrap();
        assert_eq!(update, UpdateDoc::Set(doc! { "annotationScore": 5i64 }));
    }

    #[test]
    fn short_row_is_a_column_count_error() {
        let row = Row::parse("P01308\tInsulin");
        let err = project(FieldKind::Labels, &row, &unprefixed()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ColumnCount { field: "labels", expected: 3, got: 2 }
        ));
    }

    #[test]
    fn non_integer_score_is_an_integer_error() {
        let row = Row::parse("P01308\tseven\t35");
        let err = project(FieldKind::Scores, &row, &unprefixed()).unwrap_err();
        assert!(matches!(err, DecodeError::Integer { column: 1, .. }));
    }
}
