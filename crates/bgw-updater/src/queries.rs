//! SPARQL query construction
//!
//! Builders for the queries each field-type job issues, the count-only
//! transformation used by the batching planner, and the endpoint URL
//! carrying a query with its optional row window.
//!
//! Queries select into tab-separated result sets whose first column is
//! always the entity URI; the remaining columns follow the layout the
//! matching projection handler expects.

const PREFIXES: &str = "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#> \
                        PREFIX skos: <http://www.w3.org/2004/02/skos/core#>";

const GRAPH_BASE: &str = "http://rdf.biogateway.eu/graph";

/// Query for preferred label and definition: columns uri, label, definition
pub fn name_label_query(graph: &str, constraint: &str) -> String {
    format!(
        "{PREFIXES} SELECT ?uri ?label ?definition FROM <{GRAPH_BASE}/{graph}> WHERE {{ \
         {constraint} \
         ?uri skos:prefLabel ?label . \
         ?uri skos:definition ?definition . }}"
    )
}

/// Query for a single predicate's value: columns uri, value
pub fn field_query(graph: &str, predicate: &str, constraint: &str) -> String {
    format!(
        "{PREFIXES} SELECT ?uri ?value FROM <{GRAPH_BASE}/{graph}> WHERE {{ \
         {constraint} \
         ?uri {predicate} ?value . }}"
    )
}

/// Query for reference scores: columns uri, fromScore, toScore
pub fn scores_query(graph: &str, constraint: &str) -> String {
    format!(
        "{PREFIXES} SELECT ?uri ?fromScore ?toScore FROM <{GRAPH_BASE}/{graph}> WHERE {{ \
         {constraint} \
         ?uri <http://schema.org/fromScore> ?fromScore . \
         ?uri <http://schema.org/toScore> ?toScore . }}"
    )
}

/// Constraint clause scoping a GO query to one ontology namespace
pub fn go_namespace_constraint(namespace: &str) -> String {
    format!(
        "?uri <http://www.geneontology.org/formats/oboInOwl#hasOBONamespace> \"{namespace}\" ."
    )
}

/// Transform a query into its count-only variant.
///
/// Replaces the projection list with `(COUNT(*) AS ?count)` while keeping the
/// FROM clause and solution pattern intact, so the count covers exactly the
/// rows the original query would stream.
pub fn count_query(query: &str) -> String {
    match (query.find("SELECT"), query.find("FROM")) {
        (Some(select), Some(from)) if select < from => {
            format!(
                "{}SELECT (COUNT(*) AS ?count) {}",
                &query[..select],
                &query[from..]
            )
        }
        _ => format!("SELECT (COUNT(*) AS ?count) WHERE {{ {{ {query} }} }}"),
    }
}

/// Build the endpoint URL for a query with an optional row window.
///
/// `base_url` is `hostname:port` (a scheme prefix is honored when present,
/// which test endpoints rely on). `limit`/`offset` append LIMIT/OFFSET
/// clauses to the query before encoding.
pub fn endpoint_url(
    base_url: &str,
    query: &str,
    limit: Option<u64>,
    offset: Option<u64>,
) -> String {
    let mut query = query.to_string();
    if let Some(limit) = limit {
        query.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = offset {
        query.push_str(&format!(" OFFSET {offset}"));
    }

    let base = if base_url.starts_with("http://") || base_url.starts_with("https://") {
        base_url.to_string()
    } else {
        format!("http://{base_url}")
    };

    format!(
        "{}/sparql?query={}&format={}",
        base.trim_end_matches('/'),
        urlencoding::encode(&query),
        urlencoding::encode("text/tab-separated-values"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_label_query_includes_graph_and_constraint() {
        let query = name_label_query("prot", "?uri rdfs:subClassOf <x> .");
        assert!(query.contains("FROM <http://rdf.biogateway.eu/graph/prot>"));
        assert!(query.contains("?uri rdfs:subClassOf <x> ."));
        assert!(query.contains("skos:prefLabel"));
        assert!(query.contains("skos:definition"));
    }

    #[test]
    fn field_query_carries_the_predicate() {
        let query = field_query("gene", "skos:altLabel", "");
        assert!(query.contains("?uri skos:altLabel ?value ."));
        assert!(query.contains("FROM <http://rdf.biogateway.eu/graph/gene>"));
    }

    #[test]
    fn count_query_replaces_projection_only() {
        let query = name_label_query("prot", "");
        let count = count_query(&query);
        assert!(count.contains("SELECT (COUNT(*) AS ?count) FROM"));
        assert!(count.contains("skos:prefLabel"));
        assert!(!count.contains("SELECT ?uri"));
    }

    #[test]
    fn count_query_wraps_unrecognized_shapes() {
        let count = count_query("ASK { ?s ?p ?o }");
        assert!(count.starts_with("SELECT (COUNT(*) AS ?count) WHERE {"));
    }

    #[test]
    fn endpoint_url_appends_window_clauses() {
        let url = endpoint_url("localhost:8890", "SELECT ?s WHERE { ?s ?p ?o }", Some(100), Some(200));
        assert!(url.starts_with("http://localhost:8890/sparql?query="));
        assert!(url.contains(&*urlencoding::encode("LIMIT 100")));
        assert!(url.contains(&*urlencoding::encode("OFFSET 200")));
        assert!(url.ends_with(&format!("&format={}", urlencoding::encode("text/tab-separated-values"))));
    }

    #[test]
    fn endpoint_url_omits_absent_window() {
        let url = endpoint_url("localhost:8890", "SELECT ?s WHERE { ?s ?p ?o }", None, None);
        assert!(!url.contains(&*urlencoding::encode("LIMIT")));
        assert!(!url.contains(&*urlencoding::encode("OFFSET")));
    }

    #[test]
    fn endpoint_url_honors_scheme_prefix() {
        let url = endpoint_url("http://127.0.0.1:9999", "SELECT ?s WHERE {}", None, None);
        assert!(url.starts_with("http://127.0.0.1:9999/sparql?query="));
    }

    #[test]
    fn go_constraint_quotes_the_namespace() {
        let constraint = go_namespace_constraint("biological_process");
        assert!(constraint.contains("hasOBONamespace"));
        assert!(constraint.contains("\"biological_process\""));
    }
}
