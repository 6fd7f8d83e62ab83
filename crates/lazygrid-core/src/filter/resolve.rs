//! Property path resolution with "did you mean" suggestions.

use lazygrid_store::{EntityMetadata, PropertyResolution};
use strsim::levenshtein;

use super::error::{FilterError, FilterResult};

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Resolves `path` through `metadata`, failing on unknown paths.
pub(crate) fn resolve_property<M>(metadata: &M, path: &str) -> FilterResult<PropertyResolution>
where
    M: EntityMetadata + ?Sized,
{
    let resolution = metadata.resolve_property(path);
    if resolution.exists {
        Ok(resolution)
    } else {
        let suggestion = find_similar_name(path, metadata.property_names());
        Err(FilterError::property_resolution(path, suggestion))
    }
}

/// Finds the best matching name from a list of candidates using Levenshtein distance.
///
/// Returns `None` when nothing is within [`MAX_SUGGESTION_DISTANCE`] or the
/// best candidate is an exact match.
pub(crate) fn find_similar_name<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .into_iter()
        .filter(|name| !name.is_empty())
        .map(|name| (name, levenshtein(&query_lower, &name.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match.to_string())
    } else {
        None
    }
}
