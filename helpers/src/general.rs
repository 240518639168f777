use std::cmp::Ordering;

/// InputValueError is used if some simulation option or parameter does not fulfill the posed
/// requirements, e.g., a probability outside of [0.0, 1.0].
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid input value")]
pub struct InputValueError;

pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that sort the array x. The sort is stable, i.e. equal values keep
/// their original order.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut idxs: Vec<usize> = (0..x.len()).collect();

    match order {
        SortOrder::Ascending => {
            idxs.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal))
        }
        SortOrder::Descending => {
            idxs.sort_by(|&a, &b| x[b].partial_cmp(&x[a]).unwrap_or(Ordering::Equal))
        }
    };

    idxs
}
