//! UniProtKB search. Composes a free-form query with optional organism and
//! length filters, delegates the call to a [`UniProtTransport`], and returns
//! either compact summaries or the raw field-projected payload.

pub mod transport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::HandlerError;
use crate::stream::ChunkSink;
use crate::tools::descriptor::{ParamKind, ParameterSpec, ToolDescriptor};
use crate::tools::handler::ToolHandler;
use crate::types::{Arguments, ToolRequest};

pub use transport::{SearchPage, SearchRequest, UniProtClient, UniProtTransport};

pub const TOOL_NAME: &str = "UniProt_search";
pub const DEFAULT_LIMIT: u32 = 25;
pub const MAX_LIMIT: u32 = 500;

/// Taxonomy IDs for the organism shorthands callers use most.
const ORGANISM_ALIASES: &[(&str, &str)] = &[
    ("human", "9606"),
    ("mouse", "10090"),
    ("rat", "10116"),
    ("yeast", "559292"),
];

/// Typed arguments for [`TOOL_NAME`]. Unset options serialize as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniProtSearch {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organism: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl UniProtSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn into_request(self) -> Result<ToolRequest, serde_json::Error> {
        ToolRequest::from_args(TOOL_NAME, &self)
    }
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        TOOL_NAME,
        "Search UniProtKB and return protein entries. Supports field searches, \
         ranges, wildcards, boolean operators, and parentheses for grouping.",
    )
    .param(
        ParameterSpec::required("query", ParamKind::String)
            .describe("Search query, e.g. 'insulin', 'gene:TP53 AND organism_id:9606'")
            .pattern(r"\S"),
    )
    .param(
        ParameterSpec::optional("organism", ParamKind::String)
            .describe("Organism filter: 'human', 'mouse', 'rat', 'yeast' or a taxonomy ID"),
    )
    .param(
        ParameterSpec::optional("limit", ParamKind::Integer)
            .describe("Maximum results to return")
            .with_default(DEFAULT_LIMIT)
            .min(1.0)
            .max(MAX_LIMIT as f64),
    )
    .param(
        ParameterSpec::optional("fields", ParamKind::Sequence)
            .describe("Field names to return; when set, the raw API payload is returned")
            .with_items(ParamKind::String)
            .with_default(json!([])),
    )
    .param(
        ParameterSpec::optional("min_length", ParamKind::Integer)
            .describe("Minimum sequence length")
            .min(0.0),
    )
    .param(
        ParameterSpec::optional("max_length", ParamKind::Integer)
            .describe("Maximum sequence length")
            .min(0.0),
    )
}

/// Join the query and filters with AND. The user query is parenthesized
/// when filters are added so its own boolean operators keep their meaning.
pub fn compose_query(search: &UniProtSearch) -> Result<String, HandlerError> {
    let query = search.query.trim();
    if query.is_empty() {
        return Err(HandlerError::InvalidInput("query is empty".into()));
    }

    let mut filters = Vec::new();
    if let Some(clause) = search.organism.as_deref().and_then(organism_clause) {
        filters.push(clause);
    }
    match (search.min_length, search.max_length) {
        (Some(min), Some(max)) if min > max => {
            return Err(HandlerError::InvalidInput(format!(
                "min_length {min} exceeds max_length {max}"
            )))
        }
        (Some(min), Some(max)) => filters.push(format!("length:[{min} TO {max}]")),
        (Some(min), None) => filters.push(format!("length:[{min} TO *]")),
        (None, Some(max)) => filters.push(format!("length:[* TO {max}]")),
        (None, None) => {}
    }

    if filters.is_empty() {
        return Ok(query.to_string());
    }
    Ok(format!("({query}) AND {}", filters.join(" AND ")))
}

fn organism_clause(organism: &str) -> Option<String> {
    let organism = organism.trim();
    if organism.is_empty() {
        return None;
    }
    let lower = organism.to_lowercase();
    if let Some((_, taxon)) = ORGANISM_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return Some(format!("organism_id:{taxon}"));
    }
    if organism.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("organism_id:{organism}"));
    }
    Some(format!("organism_name:\"{}\"", organism.replace('"', "")))
}

/// Compact view of one UniProtKB record.
pub fn summarize(record: &Value) -> Value {
    let description = &record["proteinDescription"];
    let protein_name = description["recommendedName"]["fullName"]["value"]
        .as_str()
        .or_else(|| description["submissionNames"][0]["fullName"]["value"].as_str());
    let gene_names: Vec<&str> = record["genes"]
        .as_array()
        .map(|genes| {
            genes
                .iter()
                .filter_map(|g| g["geneName"]["value"].as_str())
                .collect()
        })
        .unwrap_or_default();

    json!({
        "accession": record["primaryAccession"],
        "id": record["uniProtkbId"],
        "protein_name": protein_name,
        "gene_names": gene_names,
        "organism": record["organism"]["scientificName"],
        "length": record["sequence"]["length"],
    })
}

fn summary_line(summary: &Value) -> String {
    let text = |v: &Value| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
    format!(
        "{}\t{}\t{}\t{}\t{}\n",
        text(&summary["accession"]),
        text(&summary["id"]),
        text(&summary["protein_name"]),
        text(&summary["organism"]),
        text(&summary["length"]),
    )
}

pub struct UniProtSearchTool {
    transport: Box<dyn UniProtTransport>,
}

impl UniProtSearchTool {
    pub fn new(transport: impl UniProtTransport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    fn parse(args: &Arguments) -> Result<UniProtSearch, HandlerError> {
        let search: UniProtSearch = serde_json::from_value(Value::Object(args.clone()))
            .map_err(|e| HandlerError::InvalidInput(e.to_string()))?;
        if let Some(limit) = search.limit {
            if !(1..=MAX_LIMIT).contains(&limit) {
                return Err(HandlerError::InvalidInput(format!(
                    "limit {limit} is outside 1..={MAX_LIMIT}"
                )));
            }
        }
        Ok(search)
    }

    async fn execute(
        &self,
        args: &Arguments,
        mut sink: Option<&mut dyn ChunkSink>,
    ) -> Result<Value, HandlerError> {
        let search = Self::parse(args)?;
        let request = SearchRequest {
            query: compose_query(&search)?,
            size: search.limit.unwrap_or(DEFAULT_LIMIT),
            fields: search.fields.unwrap_or_default(),
        };
        debug!(query = %request.query, "composed uniprot query");

        let page = self.transport.search(&request).await?;
        let records = page.records();

        if !request.fields.is_empty() {
            if let Some(sink) = sink.as_deref_mut() {
                for record in records {
                    sink.send(&format!("{record}\n"));
                }
            }
            return Ok(page.payload);
        }

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let summary = summarize(record);
            if let Some(sink) = sink.as_deref_mut() {
                sink.send(&summary_line(&summary));
            }
            results.push(summary);
        }

        Ok(json!({
            "total_results": page.total_results.unwrap_or(results.len() as u64),
            "returned": results.len(),
            "results": results,
        }))
    }
}

#[async_trait]
impl ToolHandler for UniProtSearchTool {
    async fn call(&self, args: &Arguments) -> Result<Value, HandlerError> {
        self.execute(args, None).await
    }

    async fn call_streaming(
        &self,
        args: &Arguments,
        sink: &mut dyn ChunkSink,
    ) -> Result<Value, HandlerError> {
        self.execute(args, Some(sink)).await
    }
}
