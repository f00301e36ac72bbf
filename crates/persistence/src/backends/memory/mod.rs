//! In-memory backend implementation.
//!
//! Keeps users, properties, reservations and reviews in ordered maps behind a
//! single `RwLock`. It applies the same filter coercions as the SQL backends
//! and enforces the constraints the SQL schema declares (unique email,
//! existing owner, guest and property references), which makes it suitable
//! for tests, demos and fixture-driven development.
//!
//! City matching folds ASCII case only, like SQLite `LIKE`. PostgreSQL
//! `ILIKE` also folds non-ASCII letters, so `ÉCOLE` finds `école` there but
//! not here.

mod backend;
mod storage;

pub use backend::{MemoryBackend, MemoryFixtures};
