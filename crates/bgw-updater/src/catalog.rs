//! Data type catalog
//!
//! The catalog names every graph the updater knows how to cache, which
//! collections each graph feeds, the SPARQL constraint scoping its queries,
//! and which field types apply to it. It is built once at startup and never
//! mutated; CLI filters produce a new list instead of adjusting shared
//! instances in place.

use clap::ValueEnum;

use crate::queries;

/// One category of derived data an update job maintains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Labels,
    Synonyms,
    Scores,
    Taxon,
    Instances,
    AnnotationScore,
}

impl FieldKind {
    /// Human-readable field name used in progress and failure messages
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Labels => "labels",
            FieldKind::Synonyms => "synonyms",
            FieldKind::Scores => "scores",
            FieldKind::Taxon => "taxon",
            FieldKind::Instances => "instances",
            FieldKind::AnnotationScore => "annotation score",
        }
    }

    /// Build the SPARQL query fetching this field for the given data type
    pub fn query(self, data_type: &DataType) -> String {
        let graph = &data_type.graph;
        let constraint = &data_type.constraint;
        match self {
            FieldKind::Labels => queries::name_label_query(graph, constraint),
            FieldKind::Synonyms => queries::field_query(graph, "skos:altLabel", constraint),
            FieldKind::Scores => queries::scores_query(graph, constraint),
            FieldKind::Taxon => queries::field_query(
                graph,
                "<http://purl.obolibrary.org/obo/BFO_0000052>",
                constraint,
            ),
            FieldKind::Instances => queries::field_query(
                graph,
                "<http://schema.org/evidenceOrigin>",
                constraint,
            ),
            FieldKind::AnnotationScore => queries::field_query(
                graph,
                "<http://schema.org/evidenceLevel>",
                constraint,
            ),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// CLI value restricting a run to a single field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldFilter {
    #[value(name = "label")]
    Label,
    #[value(name = "scores")]
    Scores,
    #[value(name = "taxon")]
    Taxon,
    #[value(name = "instances")]
    Instances,
    #[value(name = "annotationScores")]
    AnnotationScores,
}

/// A target collection plus the optional prefix applied to definitions
/// written into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub name: String,
    pub prefix: String,
}

impl CollectionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
        }
    }

    pub fn with_prefix(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
        }
    }
}

/// Field-type applicability flags for one data type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags {
    pub labels: bool,
    pub scores: bool,
    pub taxon: bool,
    pub instances: bool,
    pub annotation_scores: bool,
}

impl FieldFlags {
    /// Flags with only the CLI-selected field type active.
    ///
    /// The selected flag is forced on even when the data type did not carry
    /// it; this matches the updater's historical behavior of coercing flags
    /// before any job starts.
    pub fn restricted_to(filter: FieldFilter) -> Self {
        let mut flags = Self::default();
        match filter {
            FieldFilter::Label => flags.labels = true,
            FieldFilter::Scores => flags.scores = true,
            FieldFilter::Taxon => flags.taxon = true,
            FieldFilter::Instances => flags.instances = true,
            FieldFilter::AnnotationScores => flags.annotation_scores = true,
        }
        flags
    }

    pub fn any(self) -> bool {
        self.labels || self.scores || self.taxon || self.instances || self.annotation_scores
    }
}

/// A named graph of the remote dataset and everything needed to update it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    /// Graph identifier on the endpoint, e.g. "prot"
    pub graph: String,
    /// Collections this graph feeds; never empty
    pub collections: Vec<CollectionRef>,
    /// SPARQL constraint clause scoping every query, possibly empty
    pub constraint: String,
    pub fields: FieldFlags,
}

impl DataType {
    pub fn new(
        graph: impl Into<String>,
        collections: Vec<CollectionRef>,
        constraint: impl Into<String>,
        fields: FieldFlags,
    ) -> Self {
        let data_type = Self {
            graph: graph.into(),
            collections,
            constraint: constraint.into(),
            fields,
        };
        debug_assert!(!data_type.collections.is_empty());
        data_type
    }

    /// Field kinds to schedule for this data type, in catalog order.
    ///
    /// Labels and synonyms always run as a pair: both derive from the same
    /// `labels` flag.
    pub fn scheduled_kinds(&self) -> Vec<FieldKind> {
        let mut kinds = Vec::new();
        if self.fields.labels {
            kinds.push(FieldKind::Labels);
            kinds.push(FieldKind::Synonyms);
        }
        if self.fields.scores {
            kinds.push(FieldKind::Scores);
        }
        if self.fields.taxon {
            kinds.push(FieldKind::Taxon);
        }
        if self.fields.instances {
            kinds.push(FieldKind::Instances);
        }
        if self.fields.annotation_scores {
            kinds.push(FieldKind::AnnotationScore);
        }
        kinds
    }
}

/// The static catalog of everything the updater caches
pub fn default_catalog() -> Vec<DataType> {
    vec![
        DataType::new(
            "prot",
            vec![CollectionRef::new("prot")],
            "?uri rdfs:subClassOf <http://semanticscience.org/resource/SIO_010043> .",
            FieldFlags {
                labels: true,
                scores: true,
                taxon: true,
                instances: true,
                annotation_scores: true,
            },
        ),
        DataType::new(
            "gene",
            vec![CollectionRef::new("gene")],
            "?uri rdfs:subClassOf <http://semanticscience.org/resource/SIO_010035> .",
            FieldFlags {
                labels: true,
                scores: true,
                taxon: true,
                instances: true,
                annotation_scores: false,
            },
        ),
        DataType::new(
            "omim",
            vec![CollectionRef::new("omim")],
            "",
            FieldFlags {
                labels: true,
                scores: true,
                ..Default::default()
            },
        ),
        DataType::new(
            "go",
            vec![
                CollectionRef::new("gobp"),
                CollectionRef::with_prefix("goall", "Biological Process"),
            ],
            queries::go_namespace_constraint("biological_process"),
            FieldFlags {
                labels: true,
                scores: true,
                ..Default::default()
            },
        ),
        DataType::new(
            "go",
            vec![
                CollectionRef::new("gocc"),
                CollectionRef::with_prefix("goall", "Cellular Component"),
            ],
            queries::go_namespace_constraint("cellular_component"),
            FieldFlags {
                labels: true,
                scores: true,
                ..Default::default()
            },
        ),
        DataType::new(
            "go",
            vec![
                CollectionRef::new("gomf"),
                CollectionRef::with_prefix("goall", "Molecular Function"),
            ],
            queries::go_namespace_constraint("molecular_function"),
            FieldFlags {
                labels: true,
                scores: true,
                ..Default::default()
            },
        ),
        DataType::new(
            "prot2prot",
            vec![CollectionRef::new("prot2prot")],
            "",
            FieldFlags {
                labels: true,
                instances: true,
                ..Default::default()
            },
        ),
        DataType::new(
            "prot2onto",
            vec![CollectionRef::new("prot2onto")],
            "",
            FieldFlags {
                labels: true,
                ..Default::default()
            },
        ),
        DataType::new(
            "tfac2gene",
            vec![CollectionRef::new("tfac2gene")],
            "",
            FieldFlags {
                labels: true,
                ..Default::default()
            },
        ),
    ]
}

/// Apply CLI filters to the catalog, producing a new list.
///
/// `graph` keeps only matching data types; `field` replaces every surviving
/// data type's flags with the restricted set. The input catalog is consumed,
/// never mutated in place.
pub fn filtered_catalog(
    catalog: Vec<DataType>,
    graph: Option<&str>,
    field: Option<FieldFilter>,
) -> Vec<DataType> {
    catalog
        .into_iter()
        .filter(|data_type| graph.is_none_or(|g| data_type.graph == g))
        .map(|data_type| match field {
            Some(filter) => DataType {
                fields: FieldFlags::restricted_to(filter),
                ..data_type
            },
            None => data_type,
        })
        .collect()
}
