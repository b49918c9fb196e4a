//! Host implementations: the sequential references every benchmark times
//! and verifies against, and the rayon pool versions.

pub mod rayon_reduce;
pub mod rayon_selection;
pub mod sequential;
