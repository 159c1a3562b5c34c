pub mod collection;
pub mod docs;
pub mod flatten;
pub mod normalize;

use collection::EndpointDescriptor;
use docs::ResponseTable;

/// Two independent passes: collection JSON → endpoints, markdown → responses.
pub fn parse_sources(
    collection_json: &str,
    markdown: &str,
) -> serde_json::Result<(Vec<EndpointDescriptor>, ResponseTable)> {
    let collection = collection::parse_collection(collection_json)?;
    let endpoints = collection::extract_endpoints(&collection);
    let responses = docs::extract_responses(markdown);
    Ok((endpoints, responses))
}
