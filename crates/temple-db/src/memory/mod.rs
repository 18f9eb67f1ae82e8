//! In-memory repositories
//!
//! `HashMap`-backed implementations of the temple-core repository traits.
//! They back the `memory` storage backend and the engine tests; contents
//! are lost when the process exits.

mod check_in;
mod event;
mod registration;

pub use check_in::MemoryCheckInRepository;
pub use event::MemoryEventRepository;
pub use registration::MemoryRegistrationRepository;

use async_trait::async_trait;
use temple_core::traits::{HealthProbe, Page, PageRequest, RepoResult};

/// Always-reachable storage probe for the memory backend
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryHealthProbe;

#[async_trait]
impl HealthProbe for MemoryHealthProbe {
    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

/// Slice an already filtered and ordered result set into one page
fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let items = items.into_iter().skip(offset).take(limit).collect();
    Page::new(items, total, page)
}
