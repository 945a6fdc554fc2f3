use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Maximum number of check-in photos per listing
pub const MAX_CHECK_IN_PHOTOS: usize = 5;

/// A photo shown in the guest page's check-in walkthrough
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct CheckInPhoto {
    pub id: Uuid,
    pub listing_id: Uuid,
    /// URL of the file in managed object storage
    pub photo_url: String,
    pub caption: Option<String>,
    /// Position in the guest-facing sequence, 0-based and dense
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewPhotoRequest {
    pub photo_url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdatePhotoRequest {
    pub caption: Option<String>,
}

/// Moves the photo at index `from` to index `to`
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct MovePhotoRequest {
    pub from: usize,
    pub to: usize,
}

/// Computes the new `display_order` of every photo after a move
///
/// `ordered` holds photo ids in their current display order. The result pairs
/// each id with its new position, covering `0..n` exactly once.
pub fn reorder_positions(ordered: &[Uuid], from: usize, to: usize) -> AppResult<Vec<(Uuid, i32)>> {
    let len = ordered.len();
    if from >= len || to >= len {
        return Err(AppError::InvalidInput(format!(
            "Cannot move photo from {} to {}: listing has {} photos",
            from, to, len
        )));
    }

    let mut ids = ordered.to_vec();
    let moved = ids.remove(from);
    ids.insert(to, moved);

    Ok(ids
        .into_iter()
        .enumerate()
        .map(|(position, id)| (id, position as i32))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_first_to_last() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let positions = reorder_positions(&ids, 0, 2).unwrap();

        // New sequence is [1, 2, 0] in terms of the original indices
        assert_eq!(positions, vec![(ids[1], 0), (ids[2], 1), (ids[0], 2)]);
    }

    #[test]
    fn test_move_last_to_first() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let positions = reorder_positions(&ids, 3, 0).unwrap();
        let order: Vec<Uuid> = positions.iter().map(|(id, _)| *id).collect();

        assert_eq!(order, vec![ids[3], ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn test_positions_are_dense() {
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let mut orders: Vec<i32> = reorder_positions(&ids, 1, 3)
            .unwrap()
            .into_iter()
            .map(|(_, order)| order)
            .collect();
        orders.sort();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_same_index_is_noop() {
        let ids: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        let positions = reorder_positions(&ids, 1, 1).unwrap();
        assert_eq!(positions, vec![(ids[0], 0), (ids[1], 1)]);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let ids: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        assert!(matches!(
            reorder_positions(&ids, 0, 2),
            Err(AppError::InvalidInput(_))
        ));
        assert!(reorder_positions(&[], 0, 0).is_err());
    }
}
