//! Per-page byte budgets for multi-page documents.
//!
//! The total target is reduced by a fixed per-page overhead allowance; what
//! remains is split across pages in proportion to rendered pixel area, with
//! every page guaranteed at least a minimum budget.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Budget planning failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    /// The document has nothing to allocate to.
    #[error("Document has no pages")]
    NoPages,

    /// The per-page overhead alone consumes the whole target.
    #[error(
        "Target too small for document overhead: {target} bytes cannot cover {reserved} bytes \
         reserved for {page_count} pages; choose a larger target"
    )]
    TargetTooSmall {
        target: usize,
        reserved: usize,
        page_count: usize,
    },

    /// What is left after overhead cannot give every page its minimum.
    #[error(
        "Target too small: {image_budget} bytes of image budget cannot give {page_count} pages \
         {min_page_budget} bytes each; choose a larger target"
    )]
    BelowPageMinimum {
        image_budget: usize,
        page_count: usize,
        min_page_budget: usize,
    },
}

/// What the allocator knows about a page. Built once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub index: usize,
    /// Rendered width in pixels.
    pub width: u32,
    /// Rendered height in pixels.
    pub height: u32,
}

impl PageDescriptor {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Bytes left for image data once `overhead` per page is reserved.
pub fn image_budget(
    target: usize,
    page_count: usize,
    overhead: usize,
) -> Result<usize, BudgetError> {
    if page_count == 0 {
        return Err(BudgetError::NoPages);
    }
    let reserved = overhead.saturating_mul(page_count);
    match target.checked_sub(reserved) {
        Some(budget) if budget > 0 => Ok(budget),
        _ => Err(BudgetError::TargetTooSmall {
            target,
            reserved,
            page_count,
        }),
    }
}

/// Image budget for `page_count` pages, rejected unless every page can get
/// `min_page_budget`.
///
/// Needs only the page count, so documents can be checked before rendering.
pub fn feasible_image_budget(
    target: usize,
    page_count: usize,
    overhead: usize,
    min_page_budget: usize,
) -> Result<usize, BudgetError> {
    let budget = image_budget(target, page_count, overhead)?;
    check_page_minimum(budget, page_count, min_page_budget)?;
    Ok(budget)
}

fn check_page_minimum(
    image_budget: usize,
    page_count: usize,
    min_page_budget: usize,
) -> Result<(), BudgetError> {
    if min_page_budget.saturating_mul(page_count) > image_budget {
        return Err(BudgetError::BelowPageMinimum {
            image_budget,
            page_count,
            min_page_budget,
        });
    }
    Ok(())
}

/// Split `image_budget` across `pages` in proportion to their area.
///
/// Each page gets `floor(image_budget * area / total_area)`. Pages whose
/// share falls below `min_page_budget` are pinned at the minimum and the
/// remainder is re-split across the other pages.
///
/// # Arguments
///
/// * `pages` - Rendered page sizes; only their pixel areas matter
/// * `image_budget` - Bytes available for all page images together
/// * `min_page_budget` - Lower bound for every page
///
/// # Returns
///
/// One budget per page, in input order, summing to at most `image_budget`.
///
/// # Errors
///
/// [`BudgetError::NoPages`] for an empty slice and
/// [`BudgetError::BelowPageMinimum`] when `min_page_budget * pages.len()`
/// exceeds `image_budget`.
pub fn allocate(
    pages: &[PageDescriptor],
    image_budget: usize,
    min_page_budget: usize,
) -> Result<Vec<usize>, BudgetError> {
    if pages.is_empty() {
        return Err(BudgetError::NoPages);
    }
    check_page_minimum(image_budget, pages.len(), min_page_budget)?;

    let mut pinned = vec![false; pages.len()];
    loop {
        let pinned_count = pinned.iter().filter(|p| **p).count();
        let remaining = (image_budget - min_page_budget * pinned_count) as u128;
        let free_area: u128 = pages
            .iter()
            .zip(&pinned)
            .filter(|(_, p)| !**p)
            .map(|(page, _)| u128::from(page.area()))
            .sum();

        let shares: Vec<usize> = pages
            .iter()
            .zip(&pinned)
            .map(|(page, p)| {
                if *p {
                    min_page_budget
                } else if free_area == 0 {
                    // Degenerate zero-area pages split evenly
                    (remaining / (pages.len() - pinned_count) as u128) as usize
                } else {
                    (remaining * u128::from(page.area()) / free_area) as usize
                }
            })
            .collect();

        let mut newly_pinned = false;
        for (share, p) in shares.iter().zip(pinned.iter_mut()) {
            if !*p && *share < min_page_budget {
                *p = true;
                newly_pinned = true;
            }
        }
        if !newly_pinned {
            return Ok(shares);
        }
    }
}

/// Image budget and per-page budgets for a whole document.
pub fn plan_page_budgets(
    pages: &[PageDescriptor],
    target: usize,
    overhead: usize,
    min_page_budget: usize,
) -> Result<Vec<usize>, BudgetError> {
    let budget = feasible_image_budget(target, pages.len(), overhead, min_page_budget)?;
    let per_page = allocate(pages, budget, min_page_budget)?;
    log::info!(
        "image budget {} bytes across {} pages: {:?}",
        budget,
        pages.len(),
        per_page
    );
    Ok(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: usize, width: u32, height: u32) -> PageDescriptor {
        PageDescriptor {
            index,
            width,
            height,
        }
    }

    #[test]
    fn test_three_equal_pages_thirty_kb() {
        let pages = [page(0, 1190, 1684), page(1, 1190, 1684), page(2, 1190, 1684)];

        let budget = image_budget(30 * 1024, 3, 2048).unwrap();
        assert_eq!(budget, 24576);

        let per_page = allocate(&pages, budget, 512).unwrap();
        assert_eq!(per_page, vec![8192, 8192, 8192]);
    }

    #[test]
    fn test_budget_is_proportional_to_area() {
        let pages = [page(0, 100, 100), page(1, 100, 300)];
        let per_page = allocate(&pages, 40_000, 512).unwrap();
        assert_eq!(per_page, vec![10_000, 30_000]);
    }

    #[test]
    fn test_target_below_overhead_fails() {
        assert_eq!(
            image_budget(5000, 3, 2048),
            Err(BudgetError::TargetTooSmall {
                target: 5000,
                reserved: 6144,
                page_count: 3
            })
        );
        // Exactly the overhead leaves nothing for images
        assert!(image_budget(6144, 3, 2048).is_err());
    }

    #[test]
    fn test_feasibility_from_page_count_alone() {
        // 7 KB over 3 pages leaves 1024 bytes, short of 3 * 512
        assert_eq!(
            feasible_image_budget(7 * 1024, 3, 2048, 512),
            Err(BudgetError::BelowPageMinimum {
                image_budget: 1024,
                page_count: 3,
                min_page_budget: 512
            })
        );
        assert!(matches!(
            feasible_image_budget(5 * 1024, 3, 2048, 512),
            Err(BudgetError::TargetTooSmall { .. })
        ));
        assert_eq!(feasible_image_budget(30 * 1024, 3, 2048, 512), Ok(24576));
    }

    #[test]
    fn test_no_pages() {
        assert_eq!(image_budget(10_000, 0, 2048), Err(BudgetError::NoPages));
        assert_eq!(allocate(&[], 10_000, 512), Err(BudgetError::NoPages));
    }

    #[test]
    fn test_small_page_is_pinned_and_rest_resplit() {
        // Tiny page would get 99 bytes proportionally
        let pages = [page(0, 10, 10), page(1, 100, 100)];
        let per_page = allocate(&pages, 10_000, 512).unwrap();

        assert_eq!(per_page, vec![512, 9488]);
        assert!(per_page.iter().sum::<usize>() <= 10_000);
    }

    #[test]
    fn test_budget_below_page_minimum_fails() {
        let pages = [page(0, 10, 10), page(1, 10, 10)];
        assert!(matches!(
            allocate(&pages, 1000, 512),
            Err(BudgetError::BelowPageMinimum { .. })
        ));
    }

    #[test]
    fn test_plan_page_budgets() {
        let pages = [page(0, 200, 200), page(1, 200, 200)];
        let per_page = plan_page_budgets(&pages, 20 * 1024, 2048, 512).unwrap();
        assert_eq!(per_page, vec![8192, 8192]);
    }

    #[test]
    fn test_error_message_mentions_target() {
        let err = image_budget(1024, 2, 2048).unwrap_err();
        assert!(err.to_string().starts_with("Target too small"));
    }
}
