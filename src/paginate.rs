//! Stable pagination over eagerly materialized result lists.

use crate::aspectarian_errors::AspectarianError;

/// Slice `items[offset..offset + limit]` and report the true total length.
///
/// `limit` and `offset` are signed because they arrive from the wire;
/// negative values fail with
/// [`AspectarianError::InvalidArgument`] instead of wrapping. An offset past
/// the end yields an empty page, never an error.
pub fn paginate<T: Clone>(
    items: &[T],
    limit: i64,
    offset: i64,
) -> Result<(Vec<T>, usize), AspectarianError> {
    if limit < 0 {
        return Err(AspectarianError::InvalidArgument(format!(
            "limit must be non-negative, got {limit}"
        )));
    }
    if offset < 0 {
        return Err(AspectarianError::InvalidArgument(format!(
            "offset must be non-negative, got {offset}"
        )));
    }

    let total = items.len();
    let start = (offset as usize).min(total);
    let end = start.saturating_add(limit as usize).min(total);
    Ok((items[start..end].to_vec(), total))
}
