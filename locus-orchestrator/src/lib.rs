//! Locus orchestrator
//!
//! The request pipeline of the line-of-code service. A request names a
//! remote repository (`?github=owner/name`, `?gitlab=owner/name`) or posts
//! an archive. The pipeline gates remote repositories on existence and
//! size, fetches the tree into a workspace owned by that request, runs the
//! counting engine over it and answers with per-language rows plus a
//! `Total` row. The workspace is removed on every exit path.
//!
//! - `domain`: value objects, entities, the aggregation rule and the
//!   collaborator traits
//! - `application`: the remote and upload use cases
//! - `infrastructure`: workspace guard, order tokens, git, 7-Zip, scc and
//!   the hosting-service providers
//! - `presentation`: the axum router, dispatcher and error envelope

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
