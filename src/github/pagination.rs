//! Page planning for the repository listing endpoint.
//!
//! The profile payload reports `public_repos`, so the number of repository
//! pages is known before the first page is requested. `PagePlan` captures
//! that arithmetic and validates the page size against GitHub's limits.

use std::ops::RangeInclusive;

use super::error::IntakeError;

/// Largest page size GitHub accepts for repository listings.
pub const MAX_PER_PAGE: u8 = 100;

/// Planned sequence of repository pages for one account.
///
/// # Example
///
/// ```
/// use roster::github::pagination::PagePlan;
///
/// let plan = PagePlan::for_repository_count(250, 100).expect("valid page size");
/// assert_eq!(plan.page_count(), 3);
/// assert_eq!(plan.pages().collect::<Vec<_>>(), [1, 2, 3]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    /// Items per page.
    per_page: u8,
    /// Number of pages to request.
    page_count: u32,
}

impl PagePlan {
    /// Plans the pages needed to list `repository_count` repositories.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidPagination`] when `per_page` is zero or
    /// exceeds [`MAX_PER_PAGE`].
    pub fn for_repository_count(repository_count: u32, per_page: u8) -> Result<Self, IntakeError> {
        validate_per_page(per_page)?;
        Ok(Self {
            per_page,
            page_count: repository_count.div_ceil(u32::from(per_page)),
        })
    }

    /// Returns the number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Returns the number of pages in the plan.
    #[must_use]
    pub const fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Returns true when no page needs to be requested.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.page_count == 0
    }

    /// Iterates the 1-based page numbers in request order.
    #[must_use]
    pub const fn pages(&self) -> RangeInclusive<u32> {
        1..=self.page_count
    }
}

/// Validates a requested page size.
///
/// # Errors
///
/// Returns [`IntakeError::InvalidPagination`] when `per_page` is outside
/// `1..=100`.
pub fn validate_per_page(per_page: u8) -> Result<(), IntakeError> {
    if per_page == 0 {
        return Err(IntakeError::InvalidPagination {
            message: "per_page must be at least 1".to_owned(),
        });
    }

    if per_page > MAX_PER_PAGE {
        return Err(IntakeError::InvalidPagination {
            message: format!("per_page must not exceed {MAX_PER_PAGE}"),
        });
    }

    Ok(())
}
