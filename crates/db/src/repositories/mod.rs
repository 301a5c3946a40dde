mod job_repo;
mod variant_repo;

pub use job_repo::JobRepo;
pub use variant_repo::VariantRepo;
